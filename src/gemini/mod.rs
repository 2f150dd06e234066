use serde::{Deserialize, Serialize};
use anyhow::Result;

mod client;
mod api_manager;

pub use {
    client::GeminiClient,
    api_manager::ApiManager
};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// An image returned by a provider, already wrapped as a `data:` URI.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedImage {
    pub image_url: String,
    pub prompt: String,
    pub description: String,
}

pub trait ImageProvider {
    /// Creates an image from `prompt`, optionally guided by reference images.
    async fn generate(&self, prompt: &str, reference_images: &[String]) -> Result<GeneratedImage>;
    /// Edits or combines `images` according to `prompt`.
    async fn edit(&self, prompt: &str, images: &[String]) -> Result<GeneratedImage>;
}

// Request/response bodies of the `generateContent` endpoint
#[derive(Serialize, Debug)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentRequest {
    /// Prompt text first, then one inline part per usable data URI.
    pub fn new(prompt: &str, images: &[String]) -> Self {
        let mut parts = vec![Part { text: Some(prompt.to_string()), inline_data: None }];
        parts.extend(
            images.iter()
                .filter_map(|image| parse_data_uri(image))
                .map(|inline_data| Part { text: None, inline_data: Some(inline_data) })
        );
        Self {
            contents: vec![Content { role: Some("user".to_string()), parts }],
        }
    }
}

impl GenerateContentResponse {
    /// Base64 payload of the first inline image in the first candidate.
    pub fn first_inline_image(&self) -> Option<&str> {
        self.candidates.first()?
            .content.as_ref()?
            .parts.iter()
            .find_map(|part| {
                part.inline_data.as_ref()
                    .filter(|inline| !inline.data.is_empty())
                    .map(|inline| inline.data.as_str())
            })
    }
}

/// Splits `data:<mime>;base64,<payload>` into mime type and payload.
/// Anything that is not a `data:` URI yields `None`.
pub fn parse_data_uri(uri: &str) -> Option<InlineData> {
    let rest = uri.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;
    let mime_type = header.split(';').next().unwrap_or_default();
    Some(InlineData {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

pub fn png_data_uri(base64_data: &str) -> String {
    format!("data:image/png;base64,{}", base64_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_is_split_into_mime_and_payload() {
        let parsed = parse_data_uri("data:image/jpeg;base64,QUJD").unwrap();
        assert_eq!(parsed.mime_type, "image/jpeg");
        assert_eq!(parsed.data, "QUJD");
    }

    #[test]
    fn non_data_uris_are_skipped_in_requests() {
        let images = vec![
            "https://example.com/cat.png".to_string(),
            "data:image/png;base64,AAAA".to_string(),
            "data:image/png;base64".to_string(),
        ];
        let request = GenerateContentRequest::new("a cat", &images);
        let parts = &request.contents[0].parts;

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].text.as_deref(), Some("a cat"));
        assert_eq!(parts[1].inline_data.as_ref().unwrap().data, "AAAA");
    }

    #[test]
    fn request_serializes_with_camel_case_inline_data() {
        let request = GenerateContentRequest::new("x", &["data:image/webp;base64,Zm9v".to_string()]);
        let json = serde_json::to_value(&request).unwrap();
        let inline = &json["contents"][0]["parts"][1]["inlineData"];
        assert_eq!(inline["mimeType"], "image/webp");
        assert_eq!(inline["data"], "Zm9v");
        assert!(json["contents"][0]["parts"][0].get("inlineData").is_none());
    }

    #[test]
    fn first_inline_image_skips_text_parts() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{
            "candidates": [
                {"content": {"parts": [
                    {"text": "Here you go"},
                    {"inlineData": {"mimeType": "image/png", "data": "first"}},
                    {"inlineData": {"mimeType": "image/png", "data": "second"}}
                ]}},
                {"content": {"parts": [{"inlineData": {"data": "other"}}]}}
            ]
        }"#).unwrap();
        assert_eq!(response.first_inline_image(), Some("first"));
    }

    #[test]
    fn text_only_response_has_no_image() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{
            "candidates": [{"content": {"parts": [{"text": "I can't draw that"}]}}]
        }"#).unwrap();
        assert_eq!(response.first_inline_image(), None);

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.first_inline_image(), None);
    }
}
