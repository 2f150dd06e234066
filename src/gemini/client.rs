use dioxus::logger::tracing::{info, error};
use anyhow::{Result, Context};
use crate::config::AppConfig;
use super::{
    GenerateContentRequest, GenerateContentResponse, GeneratedImage, ImageProvider, png_data_uri
};

const NO_GENERATED_IMAGE: &str = "No image generated from Gemini.";
const NO_EDITED_IMAGE: &str = "No edited image returned.";

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self::from_config(&AppConfig::load())
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    async fn generate_content(&self, prompt: &str, images: &[String]) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest::new(prompt, images);
        let image_count = request.contents[0].parts.len() - 1;

        info!("Sending request to Gemini model {} with {} image(s)", self.model, image_count);

        let api_key = self.api_key.as_ref()
            .context("Gemini API key not configured")?;
        let response = self.client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            error!("Gemini API returned error: Status {}, Content: {}", status, error_text);
            anyhow::bail!("Gemini API error: Status {}: {}", status, error_text);
        }

        response.json::<GenerateContentResponse>().await
            .context("Failed to parse Gemini API response")
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps the first inline image as a PNG data URI or fails with `missing`.
fn image_from_response(response: &GenerateContentResponse, missing: &'static str) -> Result<String> {
    response.first_inline_image()
        .map(png_data_uri)
        .context(missing)
}

impl ImageProvider for GeminiClient {
    async fn generate(&self, prompt: &str, reference_images: &[String]) -> Result<GeneratedImage> {
        let response = self.generate_content(prompt, reference_images).await?;
        let image_url = image_from_response(&response, NO_GENERATED_IMAGE)?;
        Ok(GeneratedImage {
            image_url,
            prompt: prompt.to_string(),
            description: prompt.to_string(),
        })
    }

    async fn edit(&self, prompt: &str, images: &[String]) -> Result<GeneratedImage> {
        let response = self.generate_content(prompt, images).await?;
        let image_url = image_from_response(&response, NO_EDITED_IMAGE)?;
        Ok(GeneratedImage {
            image_url,
            prompt: prompt.to_string(),
            description: format!("Edited: {}", prompt),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use wiremock::matchers::{header, method, path};

    const GENERATE_PATH: &str = "/models/gemini-test:generateContent";

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::from_config(&AppConfig {
            api_key: Some("test-key".to_string()),
            theme: Theme::Dark,
            model: "gemini-test".to_string(),
            base_url: server.uri(),
        })
    }

    async fn mount(server: &MockServer, reply: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(reply)
            .expect(1)
            .mount(server)
            .await;
    }

    fn response(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_edit_image_reports_exact_message() {
        let text_only = response(r#"{"candidates":[{"content":{"parts":[{"text":"no"}]}}]}"#);
        let err = image_from_response(&text_only, NO_EDITED_IMAGE).unwrap_err();
        assert_eq!(err.to_string(), "No edited image returned.");
    }

    #[test]
    fn returned_image_is_rewrapped_as_png() {
        let with_image = response(r#"{"candidates":[{"content":{"parts":[
            {"inlineData":{"mimeType":"image/jpeg","data":"SGVsbG8="}}
        ]}}]}"#);
        let url = image_from_response(&with_image, NO_GENERATED_IMAGE).unwrap();
        assert_eq!(url, "data:image/png;base64,SGVsbG8=");
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_sending() {
        let config = AppConfig {
            api_key: None,
            theme: Theme::Dark,
            model: "m".to_string(),
            base_url: "http://127.0.0.1:9/".to_string(),
        };
        let client = GeminiClient::from_config(&config);
        assert_eq!(client.base_url, "http://127.0.0.1:9");

        let err = client.edit("p", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "Gemini API key not configured");
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(500).set_body_string("boom")).await;

        let err = client_for(&server).generate("p", &[]).await.unwrap_err();

        assert_eq!(err.to_string(), "Gemini API error: Status 500 Internal Server Error: boom");
    }

    #[tokio::test]
    async fn text_only_edit_reply_has_no_image() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot do that"}]}}]
        });
        mount(&server, ResponseTemplate::new(200).set_body_json(body)).await;

        let images = vec!["data:image/png;base64,QQ==".to_string()];
        let err = client_for(&server).edit("sketch", &images).await.unwrap_err();

        assert_eq!(err.to_string(), "No edited image returned.");
    }

    #[tokio::test]
    async fn generated_image_comes_back_as_png_data_uri() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"text": "here you go"},
                {"inlineData": {"mimeType": "image/png", "data": "SGVsbG8="}}
            ]}}]
        });
        mount(&server, ResponseTemplate::new(200).set_body_json(body)).await;

        let image = client_for(&server).generate("a red fox", &[]).await.unwrap();

        assert_eq!(image.image_url, "data:image/png;base64,SGVsbG8=");
        assert_eq!(image.prompt, "a red fox");
        assert_eq!(image.description, "a red fox");
    }
}
