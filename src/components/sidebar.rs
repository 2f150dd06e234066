use dioxus::prelude::*;
use dioxus::logger::tracing::info;
use crate::{
    components::{nodes::NodeType, workflow::Workflow},
    examples::{builtin_examples, WorkflowExample}
};

const HOW_TO: [&str; 4] = [
    "Drag a node onto the canvas or right-click the canvas to add one.",
    "Drag from a node's right socket onto another node to connect them.",
    "Upload images first, then run the nodes that consume them.",
    "Grab an input socket to move its latest connection.",
];

#[component]
pub fn Sidebar(
    workflow_state: Signal<Workflow>,
    dragged_node_type: Signal<Option<NodeType>>,
) -> Element {
    let palette = NodeType::PALETTE.map(|node_type| {
        (node_type, node_type.type_name(), node_type.title(), node_type.description())
    });
    let section_title = "margin: 0 0 8px 0; font-size: 12px; text-transform: uppercase; \
        letter-spacing: 0.05em; color: var(--text-secondary);";
    let card_style = "padding: 10px 12px; border-radius: 6px; background-color: var(--ui); \
        display: flex; flex-direction: column; gap: 4px; user-select: none;";

    let example_cards = builtin_examples().into_iter().map(|example| {
        let WorkflowExample { id, name, description, nodes, edges } = example;
        rsx! {
            div {
                key: "{id}",
                style: "{card_style} cursor: pointer;",
                onclick: move |_| {
                    info!("Loading example {}", id);
                    workflow_state.write().load_workflow(nodes.clone(), edges.clone());
                },
                span { style: "font-weight: bold; color: var(--text-primary);", "{name}" }
                span { style: "font-size: 12px; color: var(--text-secondary);", "{description}" }
            }
        }
    });

    rsx! {
        div {
            class: "sidebar",
            style: "position: absolute; top: 0; left: 0; bottom: 0; width: 260px; z-index: 50;
                    background-color: var(--bg-alt); padding: 60px 16px 16px 16px; box-sizing: border-box;
                    display: flex; flex-direction: column; gap: 20px; overflow-y: auto;",
            onmousedown: |evt| evt.stop_propagation(),
            onwheel: |evt| evt.stop_propagation(),

            div {
                h4 { style: "{section_title}", "Nodes" }
                div {
                    style: "display: flex; flex-direction: column; gap: 8px;",
                    for (node_type, type_name, title, description) in palette {
                        div {
                            key: "{type_name}",
                            style: "{card_style} cursor: grab;",
                            draggable: "true",
                            ondragstart: move |_| dragged_node_type.set(Some(node_type)),
                            ondragend: move |_| dragged_node_type.set(None),
                            span { style: "font-weight: bold; color: var(--text-primary);", "{title}" }
                            span { style: "font-size: 12px; color: var(--text-secondary);", "{description}" }
                        }
                    }
                }
            }

            div {
                h4 { style: "{section_title}", "Examples" }
                div {
                    style: "display: flex; flex-direction: column; gap: 8px;",
                    {example_cards}
                }
            }

            div {
                h4 { style: "{section_title}", "How to use" }
                ol {
                    style: "margin: 0; padding-left: 18px; display: flex; flex-direction: column; gap: 6px;
                            font-size: 12px; color: var(--text-secondary);",
                    for step in HOW_TO {
                        li { key: "{step}", "{step}" }
                    }
                }
            }
        }
    }
}
