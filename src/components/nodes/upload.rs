use dioxus::prelude::*;
use dioxus::logger::tracing::{info, warn};
use crate::{
    components::{
        nodes::{InputSelection, Node, NodeKind, NodePatch},
        workflow::{run_node, Workflow}
    },
    file_manager::{encode_data_uri, IMAGE_EXTENSIONS}
};

#[component]
pub fn ImageUploadNode(
    node: Node,
    workflow_state: Signal<Workflow>,
) -> Element {
    let (uploaded_image, file_name) = match &node.kind {
        NodeKind::ImageUpload { uploaded_image, file_name } => (uploaded_image.clone(), file_name.clone()),
        _ => (None, None),
    };

    let select_id = node.id.clone();
    let on_file_select = move |_| {
        let node_id = select_id.clone();

        spawn(async move {
            let Some(file) = rfd::AsyncFileDialog::new()
                .add_filter("Images", &IMAGE_EXTENSIONS)
                .pick_file()
                .await
            else {
                return;
            };
            let file_name = file.file_name();
            let bytes = file.read().await;
            info!("Loaded {} ({} bytes)", file_name, bytes.len());

            let patch = NodePatch::default().upload(encode_data_uri(&file_name, &bytes), file_name);
            if let Err(e) = workflow_state.write().update_node(&node_id, patch) {
                warn!("Upload target vanished: {}", e);
                return;
            }
            // Publishing the upload is what makes it visible downstream
            run_node(workflow_state, node_id, InputSelection::default()).await;
        });
    };

    let remove_id = node.id.clone();
    let on_remove = move |_| {
        let patch = NodePatch::default().clear_upload().output(None).error(None);
        if let Err(e) = workflow_state.write().update_node(&remove_id, patch) {
            warn!("Failed to clear upload: {}", e);
        }
    };

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 6px; height: 100%;",
            if let Some(image) = uploaded_image {
                div {
                    style: "position: relative; flex-grow: 1; display: flex; align-items: center; justify-content: center; overflow: hidden;",
                    img {
                        src: "{image}",
                        style: "max-width: 100%; max-height: 180px; border-radius: 4px; object-fit: contain;",
                        draggable: "false",
                    }
                    button {
                        style: "position: absolute; top: 4px; right: 4px; background-color: var(--bg-alt); color: var(--text-error);
                                border: none; border-radius: 4px; cursor: pointer; padding: 2px 8px;",
                        title: "Remove image",
                        onclick: on_remove,
                        onmousedown: |evt| evt.stop_propagation(),
                        "✕"
                    }
                }
                if let Some(name) = file_name {
                    div {
                        style: "font-size: 12px; color: var(--text-secondary); word-break: break-all; text-align: center;",
                        "{name}"
                    }
                }
            } else {
                button {
                    style: "flex-grow: 1; background-color: var(--bg-alt); color: var(--text-primary); border: 1px dashed var(--text-secondary);
                            padding: 8px 12px; border-radius: 4px; cursor: pointer; font-weight: bold;",
                    onclick: on_file_select,
                    onmousedown: |evt| evt.stop_propagation(),
                    "Click to upload an image"
                }
            }
        }
    }
}
