use dioxus::prelude::*;
use dioxus::logger::tracing::warn;
use crate::components::{
    nodes::{InputSelection, Node, NodePatch},
    workflow::{run_node, Workflow}
};

#[component]
pub fn GenerateImageNode(
    node: Node,
    workflow_state: Signal<Workflow>,
) -> Element {
    let memo_id = node.id.clone();
    let reference_count = use_memo(move || workflow_state.read().upstream_outputs(&memo_id).len());

    let references = reference_count();
    let prompt = node.prompt().unwrap_or_default().to_string();
    let can_generate = !node.is_processing && !prompt.trim().is_empty();

    let prompt_id = node.id.clone();
    let on_prompt_change = move |event: Event<FormData>| {
        if let Err(e) = workflow_state.write().update_node(&prompt_id, NodePatch::default().prompt(event.value())) {
            warn!("Failed to update prompt: {}", e);
        }
    };
    let run_id = node.id.clone();
    let on_generate = move |_| {
        spawn(run_node(workflow_state, run_id.clone(), InputSelection::default()));
    };

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 6px; height: 100%;",

            textarea {
                class: "text-box",
                value: "{prompt}",
                placeholder: "Describe the image you want to create...",
                oninput: on_prompt_change,
                onmousedown: |evt| evt.stop_propagation(),
                onwheel: |evt| evt.stop_propagation()
            }

            if references > 0 {
                div {
                    style: "font-size: 12px; color: var(--text-secondary);",
                    "Using {references} reference images"
                }
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
                disabled: !can_generate,
                onclick: on_generate,
                onmousedown: |evt| evt.stop_propagation(),
                if node.is_processing { "Generating..." } else { "Generate" }
            }

            if let Some(image) = node.generated_image() {
                img {
                    src: "{image}",
                    draggable: "false",
                    style: "max-width: 100%; max-height: 160px; border-radius: 4px; object-fit: contain;",
                }
            }
        }
    }
}
