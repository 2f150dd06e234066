use dioxus::prelude::*;
use dioxus::desktop::{Config, WindowBuilder};
use dioxus::logger::tracing::{info, warn};

mod components;
mod config;
mod examples;
mod file_manager;
mod gemini;

use components::{SettingsPopup, Sidebar, Canvas, CanvasState,
    WorkflowManager, Workflow, NodeType
};
use config::AppConfig;

const MAIN_CSS: Asset = asset!("/assets/main.css");

/// How many result log entries the panel shows.
const VISIBLE_RESULTS: usize = 5;

fn main() {
    let theme = AppConfig::load().theme;

    #[cfg(feature = "desktop")]
    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            Config::new()
                .with_window(
                    WindowBuilder::new()
                        .with_title("pixflow")
                        .with_theme(Some(theme.window_theme()))
                )
                .with_disable_context_menu(true)
                .with_menu(None)
        )
        .launch(App);
}

#[component]
fn App() -> Element {
    let canvas_state = use_signal(CanvasState::default);

    let workflow_state = use_signal(|| {
        file_manager::load_default_workflow().unwrap_or_default()
    });

    let popup_open = use_signal(|| false);
    let sidebar_open = use_signal(|| true);
    let dragged_node_type = use_signal(|| None::<NodeType>);
    let theme_class = use_hook(|| AppConfig::load().theme.css_class());

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        div {
            class: "app-container {theme_class}",
            Toolbar {
                workflow_state,
                popup_open,
                sidebar_open
            }

            div {
                class: "canvas-container",
                Canvas {
                    canvas_state,
                    workflow_state,
                    dragged_node_type,
                    WorkflowManager {canvas_state, workflow_state}
                }
            }
            if sidebar_open() {
                Sidebar {
                    workflow_state,
                    dragged_node_type
                }
            }
            ResultsPanel { workflow_state }
            if *popup_open.read() {
                SettingsPopup {
                    popup_open,
                }
            }
        }
    }
}

#[component]
fn Toolbar(
    workflow_state: Signal<Workflow>,
    popup_open: Signal<bool>,
    sidebar_open: Signal<bool>,
) -> Element {
    let mut toggle_panel = move || {
        popup_open.set(!popup_open());
    };

    let save_workflow = move |_| {
        spawn(async move {
            let Some(file) = rfd::AsyncFileDialog::new()
                .add_filter("Workflow", &["json"])
                .set_file_name("workflow.json")
                .save_file()
                .await
            else {
                return;
            };
            let result = file_manager::save_workflow_to(file.path(), &workflow_state.read());
            match result {
                Ok(()) => info!("Workflow saved to {:?}", file.path()),
                Err(e) => warn!("Failed to save workflow: {:#}", e),
            }
        });
    };

    let load_workflow = move |_| {
        spawn(async move {
            let Some(file) = rfd::AsyncFileDialog::new()
                .add_filter("Workflow", &["json"])
                .pick_file()
                .await
            else {
                return;
            };
            match file_manager::load_workflow_from(file.path()) {
                Ok(workflow) => workflow_state.set(workflow),
                Err(e) => warn!("Failed to load workflow: {:#}", e),
            }
        });
    };

    let button_style = "padding: 8px 16px; background: transparent; color: var(--text-primary); \
        border: none; cursor: pointer;";
    let running = workflow_state.read().is_running;

    rsx! {
        div {
            class: "toolbar",
            style: "position: absolute; top: 10px; right: 10px; z-index: 100; display: flex; gap: 2px; align-items: center;",

            if running {
                span {
                    class: "running-indicator",
                    style: "padding: 8px 16px; color: var(--text-link); font-weight: bold;",
                    "Running..."
                }
            }

            button {
                class: "sidebar-button",
                style: "{button_style}",
                onclick: move |_| sidebar_open.set(!sidebar_open()),
                if sidebar_open() { "Hide nodes" } else { "Show nodes" }
            }

            button {
                class: "clear-button",
                style: "{button_style}",
                onclick: move |_| workflow_state.write().clear_workflow(),
                "Clear"
            }

            button {
                class: "save-button",
                style: "{button_style}",
                onclick: move |_| {
                    if let Err(e) = file_manager::save_default_workflow(&workflow_state.read()) {
                        warn!("Failed to save workflow: {:#}", e);
                    } else {
                        info!("Workflow saved successfully");
                    }
                },
                "Save"
            }

            button {
                class: "export-button",
                style: "{button_style}",
                onclick: save_workflow,
                "Export"
            }

            button {
                class: "load-button",
                style: "{button_style}",
                onclick: load_workflow,
                "Load"
            }

            button {
                class: "settings-button",
                style: "padding: 8px 12px; background: transparent; color: var(--text-primary);
                    border: none; cursor: pointer;",
                onclick: move |_| toggle_panel(),
                "⚙"
            }
        }
    }
}

#[component]
fn ResultsPanel(workflow_state: Signal<Workflow>) -> Element {
    let recent: Vec<(usize, String)> = {
        let ws = workflow_state.read();
        let skip = ws.results.len().saturating_sub(VISIBLE_RESULTS);
        ws.results.iter().cloned().enumerate().skip(skip).collect()
    };

    if recent.is_empty() {
        return rsx! {};
    }

    rsx! {
        div {
            class: "results-panel",
            style: "position: absolute; bottom: 10px; right: 10px; z-index: 100; width: 320px;
                    background-color: var(--bg-alt); border-radius: 8px; padding: 10px 12px;
                    display: flex; flex-direction: column; gap: 4px; font-size: 12px;",
            onmousedown: |evt| evt.stop_propagation(),
            div { style: "font-weight: bold; color: var(--text-primary);", "Results" }
            for (index, entry) in recent {
                div {
                    key: "{index}",
                    style: "color: var(--text-secondary); white-space: nowrap; overflow: hidden; text-overflow: ellipsis;",
                    "{entry}"
                }
            }
        }
    }
}
