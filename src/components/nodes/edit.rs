use dioxus::prelude::*;
use dioxus::logger::tracing::warn;
use std::collections::BTreeSet;
use crate::components::{
    nodes::{Node, NodePatch},
    workflow::{run_node, Workflow}
};

/// How many input thumbnails are shown before collapsing into "+N more".
const VISIBLE_THUMBNAILS: usize = 4;

/// Which of the connected input images the user has switched off.
/// Indices refer to the order of [`Workflow::upstream_outputs`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSelection {
    inputs: Vec<String>,
    excluded: BTreeSet<usize>,
}

impl InputSelection {
    /// Takes the current inputs; exclusions are dropped when they changed.
    pub fn sync(&mut self, inputs: Vec<String>) -> bool {
        if self.inputs == inputs {
            return false;
        }
        self.inputs = inputs;
        self.excluded.clear();
        true
    }

    pub fn toggle(&mut self, index: usize) {
        if !self.excluded.remove(&index) && index < self.inputs.len() {
            self.excluded.insert(index);
        }
    }

    pub fn is_excluded(&self, index: usize) -> bool {
        self.excluded.contains(&index)
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn active_count(&self) -> usize {
        self.inputs.len() - self.excluded.len()
    }

    /// Filters `current` by the exclusions, which only hold while
    /// `current` still matches the inputs they were made against.
    pub fn active_inputs(&self, current: Vec<String>) -> Vec<String> {
        if self.excluded.is_empty() || current != self.inputs {
            return current;
        }
        current
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !self.excluded.contains(index))
            .map(|(_, image)| image)
            .collect()
    }
}

#[component]
pub fn EditImageNode(
    node: Node,
    workflow_state: Signal<Workflow>,
) -> Element {
    let mut selection = use_signal(InputSelection::default);
    let memo_id = node.id.clone();
    let connected = use_memo(move || workflow_state.read().upstream_outputs(&memo_id));

    use_effect(move || {
        let inputs = connected();
        selection.write().sync(inputs);
    });

    let prompt = node.prompt().unwrap_or_default().to_string();
    let current = selection.read().clone();
    let total = current.inputs().len();
    let active = current.active_count();
    let hidden = total.saturating_sub(VISIBLE_THUMBNAILS);
    let thumbnails: Vec<(usize, String, bool)> = current.inputs()
        .iter()
        .take(VISIBLE_THUMBNAILS)
        .enumerate()
        .map(|(index, image)| (index, image.clone(), current.is_excluded(index)))
        .collect();
    let can_edit = !node.is_processing && active > 0 && !prompt.trim().is_empty();

    let prompt_id = node.id.clone();
    let on_prompt_change = move |event: Event<FormData>| {
        if let Err(e) = workflow_state.write().update_node(&prompt_id, NodePatch::default().prompt(event.value())) {
            warn!("Failed to update prompt: {}", e);
        }
    };
    let run_id = node.id.clone();
    let on_edit = move |_| {
        let current = selection.read().clone();
        spawn(run_node(workflow_state, run_id.clone(), current));
    };

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 6px; height: 100%;",

            if total == 0 {
                div {
                    style: "font-size: 12px; color: var(--text-secondary); text-align: center; padding: 12px; border: 1px dashed var(--text-secondary); border-radius: 4px;",
                    "Connect image nodes to edit them"
                }
            } else {
                div {
                    style: "display: flex; gap: 4px; align-items: center;",
                    for (index, image, excluded) in thumbnails {
                        div {
                            key: "{index}",
                            style: "position: relative; width: 56px; height: 56px;",
                            img {
                                src: "{image}",
                                draggable: "false",
                                style: if excluded {
                                    "width: 100%; height: 100%; object-fit: cover; border-radius: 4px; opacity: 0.3;"
                                } else {
                                    "width: 100%; height: 100%; object-fit: cover; border-radius: 4px;"
                                },
                            }
                            button {
                                style: "position: absolute; top: 0; right: 0; border: none; border-radius: 4px; cursor: pointer;
                                        font-size: 10px; background-color: var(--bg-alt); color: var(--text-primary);",
                                title: if excluded { "Use this image" } else { "Skip this image" },
                                onclick: move |_| selection.write().toggle(index),
                                onmousedown: |evt| evt.stop_propagation(),
                                if excluded { "+" } else { "✕" }
                            }
                        }
                    }
                    if hidden > 0 {
                        div {
                            style: "font-size: 12px; color: var(--text-secondary);",
                            "+{hidden} more"
                        }
                    }
                }
                div {
                    style: "font-size: 12px; color: var(--text-secondary);",
                    "Using {active} of {total} images"
                }
            }

            textarea {
                class: "text-box",
                value: "{prompt}",
                placeholder: "Describe how to edit or combine the images...",
                oninput: on_prompt_change,
                onmousedown: |evt| evt.stop_propagation(),
                onwheel: |evt| evt.stop_propagation()
            }

            if let Some(error) = &node.error {
                div {
                    style: "color: var(--text-error); font-size: 12px; padding: 4px;",
                    "{error}"
                }
            }

            button {
                style: "background-color: var(--bg-alt); color: var(--text-primary); border: none;
                        padding: 8px 12px; border-radius: 4px; cursor: pointer; font-weight: bold;",
                disabled: !can_edit,
                onclick: on_edit,
                onmousedown: |evt| evt.stop_propagation(),
                if node.is_processing { "Editing..." } else { "Edit" }
            }

            if let Some(image) = node.generated_image() {
                img {
                    src: "{image}",
                    draggable: "false",
                    style: "max-width: 100%; max-height: 120px; border-radius: 4px; object-fit: contain;",
                }
            }
        }
    }
}
