use dioxus::prelude::*;
use dioxus::logger::tracing::info;
use crate::{
    components::nodes::{Node, NodeKind},
    file_manager::write_image
};

#[component]
pub fn ImageResultNode(node: Node) -> Element {
    let mut save_error = use_signal(|| None::<String>);

    let NodeKind::ImageResult { image_url, prompt, description, generated_at } = node.kind.clone() else {
        return rsx! {};
    };

    let save_url = image_url.clone();
    let save_name = format!("{}.png", node.id);
    let on_save = move |_| {
        let image = save_url.clone();
        let file_name = save_name.clone();
        save_error.set(None);

        spawn(async move {
            let Some(file) = rfd::AsyncFileDialog::new()
                .add_filter("PNG Image", &["png"])
                .set_file_name(file_name)
                .save_file()
                .await
            else {
                return;
            };
            match write_image(file.path(), &image).await {
                Ok(()) => info!("Image saved to {:?}", file.path()),
                Err(e) => save_error.set(Some(format!("{:#}", e))),
            }
        });
    };

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 6px; height: 100%;",
            img {
                src: "{image_url}",
                draggable: "false",
                style: "max-width: 100%; max-height: 220px; border-radius: 4px; object-fit: contain; align-self: center;",
            }
            if !prompt.is_empty() {
                div {
                    style: "font-size: 12px; color: var(--text-primary); word-break: break-word;",
                    "{prompt}"
                }
            }
            if !description.is_empty() && description != prompt {
                div {
                    style: "font-size: 12px; color: var(--text-secondary); word-break: break-word;",
                    "{description}"
                }
            }
            div {
                style: "display: flex; justify-content: space-between; align-items: center; margin-top: auto;",
                span {
                    style: "font-size: 11px; color: var(--text-secondary);",
                    "{generated_at}"
                }
                button {
                    style: "background-color: var(--bg-alt); color: var(--text-primary); border: none;
                            padding: 6px 12px; border-radius: 4px; cursor: pointer; font-weight: bold;",
                    onclick: on_save,
                    onmousedown: |evt| evt.stop_propagation(),
                    "Save"
                }
            }
            if let Some(error) = save_error() {
                div {
                    style: "color: var(--text-warning); font-size: 12px; padding: 4px;",
                    "{error}"
                }
            }
        }
    }
}
