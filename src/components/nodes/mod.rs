use dioxus::prelude::*;
use serde::{Serialize, Deserialize};
use crate::{
    components::{
        canvas::CanvasState,
        connections::{get_port_world_pos, Port},
        workflow::Workflow,
        nodes::{
            upload::ImageUploadNode,
            edit::EditImageNode,
            generate::GenerateImageNode,
            result::ImageResultNode
        }
    },
    gemini::GeneratedImage
};

mod upload;
mod edit;
mod generate;
mod result;

pub use edit::InputSelection;

/// Unit discriminator of a node kind, used by palettes and menus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    ImageUpload,
    EditImage,
    GenerateImage,
    ImageResult,
}

impl NodeType {
    /// Kinds a user can place on the canvas; result nodes are only spawned.
    pub const PALETTE: [NodeType; 3] = [NodeType::ImageUpload, NodeType::EditImage, NodeType::GenerateImage];

    pub fn type_name(self) -> &'static str {
        match self {
            NodeType::ImageUpload => "imageUpload",
            NodeType::EditImage => "editImage",
            NodeType::GenerateImage => "generateImage",
            NodeType::ImageResult => "imageResult",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            NodeType::ImageUpload => "Image Upload",
            NodeType::EditImage => "Edit Image",
            NodeType::GenerateImage => "Generate Image",
            NodeType::ImageResult => "Image Result",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            NodeType::ImageUpload => "Upload images to start your workflow",
            NodeType::EditImage => "Edit and combine multiple images with AI",
            NodeType::GenerateImage => "Generate new images from text prompts",
            NodeType::ImageResult => "Shows a generated image",
        }
    }

    pub fn accepts_input(self) -> bool {
        matches!(self, NodeType::EditImage | NodeType::GenerateImage)
    }

    fn size(self) -> (f64, f64) {
        match self {
            NodeType::ImageUpload => (260.0, 300.0),
            NodeType::EditImage | NodeType::GenerateImage => (300.0, 440.0),
            NodeType::ImageResult => (300.0, 400.0),
        }
    }

    fn empty_kind(self) -> NodeKind {
        match self {
            NodeType::ImageUpload => NodeKind::ImageUpload { uploaded_image: None, file_name: None },
            NodeType::EditImage => NodeKind::EditImage { prompt: String::new(), generated_image: None },
            NodeType::GenerateImage => NodeKind::GenerateImage { prompt: String::new(), generated_image: None },
            NodeType::ImageResult => NodeKind::ImageResult {
                image_url: String::new(),
                prompt: String::new(),
                description: String::new(),
                generated_at: String::new(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NodeKind {
    ImageUpload {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uploaded_image: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
    },
    EditImage {
        #[serde(default)]
        prompt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        generated_image: Option<String>,
    },
    GenerateImage {
        #[serde(default)]
        prompt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        generated_image: Option<String>,
    },
    ImageResult {
        image_url: String,
        #[serde(default)]
        prompt: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        generated_at: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub is_processing: bool,
    #[serde(skip)]
    pub drag_offset_x: f64,
    #[serde(skip)]
    pub drag_offset_y: f64,
}

/// Partial update for [`Node::apply`]. Fields that do not exist on the
/// target's kind are ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodePatch {
    pub label: Option<String>,
    pub prompt: Option<String>,
    pub upload: Option<Option<(String, String)>>,
    pub output: Option<Option<String>>,
    pub error: Option<Option<String>>,
}

impl NodePatch {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn upload(mut self, image: impl Into<String>, file_name: impl Into<String>) -> Self {
        self.upload = Some(Some((image.into(), file_name.into())));
        self
    }

    pub fn clear_upload(mut self) -> Self {
        self.upload = Some(None);
        self
    }

    pub fn output(mut self, output: Option<String>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn error(mut self, error: Option<String>) -> Self {
        self.error = Some(error);
        self
    }
}

impl Node {
    pub fn new(id: &str, node_type: NodeType, position_x: f64, position_y: f64) -> Self {
        let (width, height) = node_type.size();
        Node {
            id: id.to_string(),
            kind: node_type.empty_kind(),
            position_x,
            position_y,
            width,
            height,
            label: node_type.title().to_string(),
            output: None,
            error: None,
            is_processing: false,
            drag_offset_x: 0.0,
            drag_offset_y: 0.0,
        }
    }

    pub fn result(id: &str, label: &str, position_x: f64, position_y: f64, image: GeneratedImage, generated_at: String) -> Self {
        let mut node = Node::new(id, NodeType::ImageResult, position_x, position_y);
        node.label = label.to_string();
        node.output = Some(image.image_url.clone());
        node.kind = NodeKind::ImageResult {
            image_url: image.image_url,
            prompt: image.prompt,
            description: image.description,
            generated_at,
        };
        node
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::ImageUpload { .. } => NodeType::ImageUpload,
            NodeKind::EditImage { .. } => NodeType::EditImage,
            NodeKind::GenerateImage { .. } => NodeType::GenerateImage,
            NodeKind::ImageResult { .. } => NodeType::ImageResult,
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::EditImage { prompt, .. }
            | NodeKind::GenerateImage { prompt, .. }
            | NodeKind::ImageResult { prompt, .. } => Some(prompt),
            NodeKind::ImageUpload { .. } => None,
        }
    }

    pub fn generated_image(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::EditImage { generated_image, .. }
            | NodeKind::GenerateImage { generated_image, .. } => generated_image.as_deref(),
            _ => None,
        }
    }

    pub fn set_generated_image(&mut self, image_url: String) {
        if let NodeKind::EditImage { generated_image, .. } | NodeKind::GenerateImage { generated_image, .. } = &mut self.kind {
            *generated_image = Some(image_url);
        }
    }

    pub fn apply(&mut self, patch: NodePatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(new_prompt) = patch.prompt {
            if let NodeKind::EditImage { prompt, .. } | NodeKind::GenerateImage { prompt, .. } = &mut self.kind {
                *prompt = new_prompt;
            }
        }
        if let Some(upload) = patch.upload {
            if let NodeKind::ImageUpload { uploaded_image, file_name } = &mut self.kind {
                let (image, name) = upload.unzip();
                *uploaded_image = image;
                *file_name = name;
            }
        }
        if let Some(output) = patch.output {
            self.output = output;
        }
        if let Some(error) = patch.error {
            self.error = error;
        }
    }

    /// Drops everything execution produced; prompts are kept.
    pub fn reset(&mut self) {
        self.error = None;
        self.is_processing = false;
        match &mut self.kind {
            NodeKind::ImageUpload { uploaded_image, file_name } => {
                *uploaded_image = None;
                *file_name = None;
                self.output = None;
            },
            NodeKind::EditImage { generated_image, .. } | NodeKind::GenerateImage { generated_image, .. } => {
                *generated_image = None;
                self.output = None;
            },
            NodeKind::ImageResult { .. } => {}
        }
    }
}

#[component]
pub fn NodeComponent(
    node_id: String,
    workflow_state: Signal<Workflow>,
    canvas_state: Signal<CanvasState>,
) -> Element {
    let mut node_context_menu_visible = use_signal(|| false);
    let mut node_context_menu_pos_x = use_signal(|| 0.0);
    let mut node_context_menu_pos_y = use_signal(|| 0.0);

    let memo_id = node_id.clone();
    let current_node_opt = use_memo(move || workflow_state.read().node(&memo_id).cloned());

    let order_id = node_id.clone();
    let input_order_number = use_memo(move || {
        let ws = workflow_state.read();
        // If any target of this node has several inputs, show our slot there
        ws.edges.iter()
            .filter(|edge| edge.source == order_id)
            .find_map(|edge| ws.get_input_order_number(&order_id, &edge.target))
    });

    let Some(node) = current_node_opt() else {
        return rsx! {};
    };

    let select_id = node.id.clone();
    let on_mouse_down = move |event: Event<MouseData>| {
        match event.trigger_button() {
            Some(dioxus::html::input_data::MouseButton::Secondary) => {
                event.stop_propagation();
                let coords = event.element_coordinates();
                node_context_menu_pos_x.set(coords.x);
                node_context_menu_pos_y.set(coords.y);
                node_context_menu_visible.set(true);
            }
            _ => {
                event.stop_propagation();
                event.prevent_default();
                if node_context_menu_visible() {
                    node_context_menu_visible.set(false);
                }
                let (mouse_x, mouse_y) = event.page_coordinates().into();
                let mut ws = workflow_state.write();
                ws.selected_node_id = Some(select_id.clone());
                ws.start_dragging_node(&select_id, mouse_x, mouse_y, &canvas_state.read());
            }
        }
    };
    let connection_id = node.id.clone();
    let on_start_connection = move |event: Event<MouseData>| {
        event.prevent_default();
        let mut ws_writer = workflow_state.write();
        let cs_reader = canvas_state.read();

        if let Some(node) = ws_writer.node(&connection_id) {
            let (port_world_x, port_world_y) = get_port_world_pos(node, Port::Output);
            let (port_center_page_x, port_center_page_y) = cs_reader.world_to_page_coords(port_world_x, port_world_y);
            ws_writer.start_drawing_connection(&connection_id, port_center_page_x, port_center_page_y, &cs_reader);
        }
    };
    let redirect_id = node.id.clone();
    let on_connection_redirect = move |event: Event<MouseData>| {
        event.prevent_default();
        workflow_state.write().redirect_connection(&redirect_id);
    };
    let delete_id = node.id.clone();
    let on_delete = move |_| {
        workflow_state.write().remove_node(&delete_id);
    };
    let close_id = node.id.clone();
    let on_close = move |event: Event<MouseData>| {
        event.stop_propagation();
        workflow_state.write().remove_node(&close_id);
    };
    let reset_id = node.id.clone();
    let on_reset = move |_| {
        if let Some(node) = workflow_state.write().node_mut(&reset_id) {
            node.reset();
        }
    };
    let disconnect_id = node.id.clone();
    let on_disconnect = move |_| {
        workflow_state.write().remove_edges_to_node(&disconnect_id);
    };
    let enter_id = node.id.clone();
    let leave_id = node.id.clone();

    let canvas_zoom = canvas_state.read().zoom;
    let node_type = node.node_type();

    let processing_border = if node.is_processing {
        "background-image: linear-gradient(90deg, var(--text-link) 0%, var(--text-link) 100%);
        background-size: 0% 3px;
        background-repeat: no-repeat;
        background-position: bottom left;
        animation: executing 2s ease-in-out infinite;"
    } else {
        ""
    };

    let selected = workflow_state.read().selected_node_id.as_deref() == Some(node.id.as_str());
    let node_style = format!(
        "position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; \
        background-color: var(--ui); border-radius: 8px; border: 1px solid {}; \
        display: flex; flex-direction: column; overflow: hidden; z-index: 1;",
        node.position_x, node.position_y, node.width, node.height,
        if selected { "var(--text-link)" } else { "transparent" }
    );

    let body = match &node.kind {
        NodeKind::ImageUpload { .. } => rsx! {
            ImageUploadNode { node: node.clone(), workflow_state }
        },
        NodeKind::EditImage { .. } => rsx! {
            EditImageNode { node: node.clone(), workflow_state }
        },
        NodeKind::GenerateImage { .. } => rsx! {
            GenerateImageNode { node: node.clone(), workflow_state }
        },
        NodeKind::ImageResult { .. } => rsx! {
            ImageResultNode { node: node.clone() }
        },
    };

    rsx! {
        div {
            class: "node",
            style: "{node_style}",
            onmousedown: on_mouse_down,
            onmouseenter: move |_| {
                let mut ws = workflow_state.write();
                if ws.drawing_connection_state.active {
                    ws.set_connection_target(&enter_id);
                }
            },
            onmouseleave: move |event| {
                event.prevent_default();
                event.stop_propagation();
                let mut ws = workflow_state.write();
                if ws.drawing_connection_state.target_node_id.as_deref() == Some(leave_id.as_str()) {
                    ws.clear_connection_target();
                }
            },
            NodeSocket {
                canvas_zoom,
                on_start_connection,
                on_connection_redirect,
                input: node_type.accepts_input(),
                output: true
            }
            div {
                class: "node-header",
                style: format!("position: relative; padding: 8px 12px; background-color: var(--ui); font-weight: bold; user-select: none; text-align: center; {}", processing_border),
                "{node.label}"

                if let Some(order) = input_order_number() {
                    div {
                        style: "position: absolute; top: 0px; left: 0px; color: var(--text-link);
                               width: 24px; height: 100%; border-radius: 8px; display: flex; align-items: center;
                               justify-content: center; font-size: 16px; font-weight: bold;",
                        "{order}"
                    }
                }

                div {
                    style: "position: absolute; top: 50%; right: 8px; transform: translateY(-50%);
                            width: 20px; height: 20px; cursor: pointer; display: flex; align-items: center;
                            justify-content: center; font-size: 14px; color: var(--text-error);",
                    title: "Delete node",
                    onmousedown: on_close,
                    "✕"
                }
            }
            div { class: "node-content", style: "flex: 1; padding: 10px; display: flex; flex-direction: column; overflow-y: auto;",
                {body}
            }
            if *node_context_menu_visible.read() {
                NodeContextMenu {
                    visible: node_context_menu_visible,
                    position_x: node_context_menu_pos_x,
                    position_y: node_context_menu_pos_y,
                    on_delete,
                    on_reset,
                    on_disconnect
                }
            }
        }
    }
}

#[component]
pub fn NodeSocket(
    canvas_zoom: f64,
    on_start_connection: EventHandler<Event<MouseData>>,
    on_connection_redirect: EventHandler<Event<MouseData>>,
    input: bool,
    output: bool
) -> Element {
    let socket_size = (12.0 / canvas_zoom).clamp(12.0, 25.0);

    let socket_style = format!(
        "width: {}px; height: {}px; border-radius: 4px; position: absolute; \
        cursor: crosshair; background-color: var(--text-link); top: 50%; z-index: 2;",
        socket_size, socket_size
    );

    rsx! {
        if input {
            div {
                class: "node-input-socket",
                style: "{socket_style} left: 0; transform: translate(-50%, -50%);",
                onmousedown: move |event| {
                    event.stop_propagation();
                    on_connection_redirect.call(event);
                }
            }
        }

        if output {
            div {
                class: "node-output-socket",
                style: "{socket_style} right: 0; transform: translate(50%, -50%);",
                onmousedown: move |event| {
                    event.stop_propagation();
                    on_start_connection.call(event);
                }
            }
        }
    }
}

#[component]
pub fn NodeContextMenu(
    visible: Signal<bool>,
    position_x: Signal<f64>,
    position_y: Signal<f64>,
    on_delete: EventHandler<()>,
    on_reset: EventHandler<()>,
    on_disconnect: EventHandler<()>,
) -> Element {
    let menu_item_style = "padding: 8px 15px; cursor: pointer; user-select: none; \
        display: flex; align-items: center; justify-content: space-between;";

    let menu_style = format!(
        "position: absolute; top: {}px; left: {}px; background-color: var(--text-primary); \
        border: 1px solid #ccc; box-shadow: 0 2px 5px rgba(0,0,0,0.2); \
        z-index: 200; padding: 5px 0; border-radius: 8px; min-width: 150px; \
        font-family: system-ui, -apple-system, sans-serif; font-size: 14px;",
        position_y(), position_x()
    );

    let items: [(&str, EventHandler<()>); 3] = [
        ("Delete", on_delete),
        ("Disconnect inputs", on_disconnect),
        ("Reset", on_reset),
    ];

    rsx! {
        div {
            style: "{menu_style}",
            onmousedown: move |event| {
                event.stop_propagation();
            },

            for (label, handler) in items {
                div {
                    key: "{label}",
                    style: "{menu_item_style}",
                    onclick: move |_| {
                        handler.call(());
                        visible.set(false);
                    },
                    span {
                        style: "color: var(--ui);",
                        "{label}"
                    }
                }
            }
        }
    }
}
