use dioxus::logger::tracing::warn;
use crate::gemini::{ApiManager, DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// Anything other than `light` falls back to dark.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("light") {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn window_theme(self) -> dioxus::desktop::tao::window::Theme {
        match self {
            Theme::Light => dioxus::desktop::tao::window::Theme::Light,
            Theme::Dark => dioxus::desktop::tao::window::Theme::Dark,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub theme: Theme,
    pub model: String,
    pub base_url: String,
}

impl AppConfig {
    /// Reads `.env`, then the process environment, then the keyring, then
    /// the key baked in at build time.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::from_lookup(|name| std::env::var(name).ok());

        if config.api_key.is_none() {
            config.api_key = match ApiManager::new() {
                Ok(manager) => manager.get_google_key().ok(),
                Err(e) => {
                    warn!("Keyring unavailable: {}", e);
                    None
                }
            };
        }
        if config.api_key.is_none() {
            config.api_key = option_env!("API_KEY")
                .filter(|key| !key.is_empty())
                .map(str::to_string);
        }
        config
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        AppConfig {
            api_key: non_empty("API_KEY").or_else(|| non_empty("GEMINI_API_KEY")),
            theme: non_empty("THEME").map(|t| Theme::parse(&t)).unwrap_or_default(),
            model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_empty("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.api_key, None);
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn api_key_prefers_api_key_over_gemini_api_key() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("API_KEY", "primary"),
            ("GEMINI_API_KEY", "secondary"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("primary"));

        let config = AppConfig::from_lookup(lookup_from(&[
            ("API_KEY", "  "),
            ("GEMINI_API_KEY", "secondary"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("secondary"));
    }

    #[test]
    fn theme_and_model_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("THEME", "Light"),
            ("GEMINI_MODEL", "gemini-test"),
        ]));
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.model, "gemini-test");
        assert_eq!(Theme::parse("sepia"), Theme::Dark);
    }
}
