use dioxus::prelude::*;
use crate::{
    config::AppConfig,
    gemini::ApiManager
};

const CAPABILITIES: [(&str, &str); 4] = [
    ("Text to image", "Create new images from a written prompt."),
    ("Image editing", "Change an uploaded image with natural language."),
    ("Multi-image composition", "Combine several connected images into one."),
    ("Reference generation", "Guide a new image with connected reference images."),
];

#[derive(Clone, Copy, PartialEq)]
enum Section {
    ApiKey,
    Model,
}

#[component]
pub fn SettingsPopup(
    popup_open: Signal<bool>,
) -> Element {
    let mut selected_section = use_signal(|| Section::ApiKey);

    let tab_style = |section: Section| format!(
        "padding: 12px 16px; text-align: left; border: none; border-radius: 6px; cursor: pointer; \
        background: {}; color: var(--text-primary);",
        if selected_section() == section { "var(--ui)" } else { "transparent" }
    );

    rsx! {
        // Backdrop
        div {
            style: "position: fixed; top: 0; left: 0; width: 100%; height: 100%;
                   background: rgba(0,0,0,0.3); z-index: 200; display: flex;
                   justify-content: center; align-items: center;",
            onclick: move |_| popup_open.set(false),

            div {
                style: "background: var(--bg-alt); border: 1px solid var(--ui);
                       border-radius: 8px; width: 60%; height: 80%; padding: 20px; display: flex;",
                onclick: move |e| e.stop_propagation(),

                div {
                    style: "width: 20%; border-right: 1px solid var(--ui);
                           padding: 20px; display: flex; flex-direction: column; gap: 8px;",

                    button {
                        style: tab_style(Section::ApiKey),
                        onclick: move |_| selected_section.set(Section::ApiKey),
                        "API Key"
                    }
                    button {
                        style: tab_style(Section::Model),
                        onclick: move |_| selected_section.set(Section::Model),
                        "Model"
                    }
                }

                div {
                    style: "flex: 1; display: flex; flex-direction: column; overflow-y: auto;",
                    {match selected_section() {
                        Section::ApiKey => rsx! { ApiKeySection {} },
                        Section::Model => rsx! { ModelSection {} },
                    }}
                }
            }
        }
    }
}

#[component]
fn ApiKeySection() -> Element {
    let mut google_key = use_signal(String::new);
    let mut save_status = use_signal(String::new);
    // Only whether a key exists; the value is never shown
    let mut key_exists = use_signal(|| false);

    use_effect(move || {
        if let Ok(key_manager) = ApiManager::new() {
            key_exists.set(key_manager.get_google_key().is_ok());
        }
    });

    let save_key = move |_| {
        let key_manager = match ApiManager::new() {
            Ok(manager) => manager,
            Err(e) => {
                save_status.set(format!("Failed to initialize key manager: {}", e));
                return;
            }
        };

        let key = google_key().trim().to_string();
        if key.is_empty() {
            save_status.set("Enter a key first.".to_string());
            return;
        }
        match key_manager.save_google_key(&key) {
            Ok(()) => {
                google_key.set(String::new());
                key_exists.set(true);
                save_status.set("API key saved. New runs will use it.".to_string());
            }
            Err(e) => save_status.set(format!("Error: {:#}", e)),
        }
    };

    let delete_key = move |_| {
        let result = ApiManager::new().and_then(|manager| manager.delete_google_key());
        match result {
            Ok(()) => {
                key_exists.set(false);
                save_status.set("API key removed.".to_string());
            }
            Err(e) => save_status.set(format!("Error: {:#}", e)),
        }
    };

    rsx! {
        div {
            style: "flex: 1; padding: 20px; display: flex; flex-direction: column; gap: 20px;",

            div {
                style: "display: flex; flex-direction: column; gap: 12px;",

                h4 {
                    style: "margin: 0; color: var(--text-primary);",
                    "Google Gemini API Key:"
                }

                if key_exists() {
                    div {
                        style: "display: flex; align-items: center; gap: 12px;",
                        span {
                            style: "color: var(--text-secondary);",
                            "API key is configured"
                        }
                        button {
                            style: "padding: 6px 12px; background: transparent; color: var(--text-error);
                                   border: 1px solid var(--text-error); border-radius: 4px; cursor: pointer;",
                            onclick: move |_| key_exists.set(false),
                            "Replace"
                        }
                        button {
                            style: "padding: 6px 12px; background: transparent; color: var(--text-error);
                                   border: 1px solid var(--text-error); border-radius: 4px; cursor: pointer;",
                            onclick: delete_key,
                            "Remove"
                        }
                    }
                } else {
                    input {
                        r#type: "password",
                        placeholder: "Enter your Gemini API key",
                        style: "padding: 12px; border: 1px solid var(--ui); border-radius: 6px;
                               background: var(--bg-primary); color: var(--text-primary); font-size: 14px;",
                        value: "{google_key}",
                        oninput: move |e| google_key.set(e.value())
                    }
                    button {
                        style: "padding: 12px 24px; background: var(--ui); color: var(--text-primary);
                               border: none; border-radius: 6px; cursor: pointer; font-weight: 500;
                               align-self: flex-start;",
                        onclick: save_key,
                        "Save API Key"
                    }
                }
            }

            if !save_status().is_empty() {
                div {
                    style: "padding: 12px; border-radius: 6px; background: var(--ui); color: var(--text-primary); font-size: 14px;",
                    "{save_status}"
                }
            }
        }
    }
}

#[component]
fn ModelSection() -> Element {
    let config = use_hook(AppConfig::load);
    let key_source = if config.api_key.is_some() { "configured" } else { "missing" };
    let theme = config.theme.css_class();

    let rows = [
        ("Model", config.model.clone()),
        ("Endpoint", config.base_url.clone()),
        ("API key", key_source.to_string()),
        ("Theme", theme.to_string()),
    ];

    rsx! {
        div {
            style: "flex: 1; padding: 20px; display: flex; flex-direction: column; gap: 20px;",

            div {
                style: "display: flex; flex-direction: column; gap: 8px;",
                h4 { style: "margin: 0; color: var(--text-primary);", "Capabilities" }
                for (title, detail) in CAPABILITIES {
                    div {
                        key: "{title}",
                        style: "display: flex; flex-direction: column; padding: 8px 12px; border-radius: 6px; background: var(--ui);",
                        span { style: "color: var(--text-primary); font-weight: bold;", "{title}" }
                        span { style: "color: var(--text-secondary); font-size: 13px;", "{detail}" }
                    }
                }
            }

            div {
                style: "display: flex; flex-direction: column; gap: 8px;",
                h4 { style: "margin: 0; color: var(--text-primary);", "Configuration" }
                for (name, value) in rows {
                    div {
                        key: "{name}",
                        style: "display: flex; justify-content: space-between; gap: 12px; font-size: 13px;",
                        span { style: "color: var(--text-secondary);", "{name}" }
                        span { style: "color: var(--text-primary); word-break: break-all;", "{value}" }
                    }
                }
                div {
                    style: "color: var(--text-secondary); font-size: 12px;",
                    "Set GEMINI_MODEL, GEMINI_BASE_URL, THEME or API_KEY in the environment or a .env file."
                }
            }
        }
    }
}
