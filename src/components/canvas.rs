use dioxus::prelude::*;
use dioxus::logger::tracing::{info, warn};
use crate::components::{
    workflow::Workflow,
    nodes::NodeType,
};

// Canvas state
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasState {
    pub offset_x: f64,
    pub offset_y: f64,
    pub zoom: f64,
    pub dragging: bool,
    pub drag_start_x: f64,
    pub drag_start_y: f64,
    pub last_offset_x: f64,
    pub last_offset_y: f64,
}

impl Default for CanvasState {
    fn default() -> Self {
        CanvasState {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
            dragging: false,
            drag_start_x: 0.0,
            drag_start_y: 0.0,
            last_offset_x: 0.0,
            last_offset_y: 0.0,
        }
    }
}

impl CanvasState {
    pub const MIN_ZOOM: f64 = 0.1;
    pub const MAX_ZOOM: f64 = 10.0;

    /// Converts page coordinates (e.g., mouse events) to world coordinates.
    pub fn page_to_world_coords(&self, page_x: f64, page_y: f64) -> (f64, f64) {
        (
            (page_x - self.offset_x) / self.zoom,
            (page_y - self.offset_y) / self.zoom,
        )
    }

    /// Converts world coordinates to page coordinates.
    pub fn world_to_page_coords(&self, world_x: f64, world_y: f64) -> (f64, f64) {
        (
            world_x * self.zoom + self.offset_x,
            world_y * self.zoom + self.offset_y,
        )
    }

    /// Zooms by `factor` while keeping the world point under the cursor fixed.
    pub fn zoom_around(&mut self, mouse_x: f64, mouse_y: f64, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        let (world_mouse_x, world_mouse_y) = self.page_to_world_coords(mouse_x, mouse_y);

        self.offset_x = mouse_x - world_mouse_x * new_zoom;
        self.offset_y = mouse_y - world_mouse_y * new_zoom;
        self.zoom = new_zoom;
    }
}

#[component]
pub fn Canvas(
    canvas_state: Signal<CanvasState>,
    workflow_state: Signal<Workflow>,
    dragged_node_type: Signal<Option<NodeType>>,
    children: Element
) -> Element {
    let mut context_menu_visible = use_signal(|| false);
    let mut context_menu_pos_x = use_signal(|| 0.0);
    let mut context_menu_pos_y = use_signal(|| 0.0);
    let mut last_right_click_page_pos = use_signal(|| (0.0, 0.0));
    // Source of a connection that was dropped on empty canvas
    let mut pending_connection_source = use_signal(|| None::<String>);

    let on_add_node_from_menu = move |node_type: NodeType| {
        let (page_x, page_y) = *last_right_click_page_pos.read();
        let world_pos = canvas_state.read().page_to_world_coords(page_x, page_y);
        let mut ws = workflow_state.write();
        let node_id = ws.create_node(node_type, world_pos.0, world_pos.1);

        if let Some(source) = pending_connection_source.take() {
            if node_type.accepts_input() {
                match ws.connect(&source, &node_id) {
                    Ok(edge_id) => info!("Connection {} created", edge_id),
                    Err(e) => warn!("Failed to create connection: {}", e),
                }
            }
        }
    };

    let mut open_menu_at = move |x: f64, y: f64| {
        context_menu_pos_x.set(x);
        context_menu_pos_y.set(y);
        context_menu_visible.set(true);
        last_right_click_page_pos.set((x, y));
    };

    // Mouse event handlers for panning
    let on_mouse_down = move |event: Event<MouseData>| {
        match event.trigger_button() {
            Some(dioxus::html::input_data::MouseButton::Secondary) => {
                let coords = event.element_coordinates();
                pending_connection_source.set(None);
                open_menu_at(coords.x, coords.y);
            }
            Some(dioxus::html::input_data::MouseButton::Primary) => {
                if context_menu_visible() {
                    context_menu_visible.set(false);
                }
                workflow_state.write().selected_node_id = None;

                let mut state = canvas_state.write();
                state.dragging = true;
                let start_coords = event.element_coordinates();
                state.drag_start_x = start_coords.x;
                state.drag_start_y = start_coords.y;
                // Store the offset *before* this drag started
                state.last_offset_x = state.offset_x;
                state.last_offset_y = state.offset_y;
            }
            _ => {}
        }
    };

    let on_mouse_move = move |event: Event<MouseData>| {
        let cs_read = canvas_state.read();
        let ws_read = workflow_state.read();

        if ws_read.drawing_connection_state.active {
            let (mouse_x, mouse_y) = event.page_coordinates().into();
            drop(ws_read);
            workflow_state.write().update_drawing_connection(mouse_x, mouse_y, &cs_read);
            return;
        }

        if ws_read.dragging_node_id.is_some() {
            let (mouse_x, mouse_y) = event.page_coordinates().into();
            drop(ws_read);
            workflow_state.write().drag_node(mouse_x, mouse_y, &cs_read);
            return;
        }

        if cs_read.dragging {
            let dx = event.data().client_coordinates().x - cs_read.drag_start_x;
            let dy = event.data().client_coordinates().y - cs_read.drag_start_y;
            let new_x = cs_read.last_offset_x + dx;
            let new_y = cs_read.last_offset_y + dy;

            drop(cs_read);

            let mut state_write = canvas_state.write();
            state_write.offset_x = new_x;
            state_write.offset_y = new_y;
        }
    };

    let on_mouse_up = move |event: Event<MouseData>| {
        let mut ws = workflow_state.write();

        if ws.drawing_connection_state.active {
            if ws.drawing_connection_state.target_node_id.is_none() {
                // Dropped on empty canvas: offer to create the target here
                let coords = event.element_coordinates();
                pending_connection_source.set(Some(ws.drawing_connection_state.source_node_id.clone()));
                open_menu_at(coords.x, coords.y);
                ws.cancel_drawing_connection();
            } else {
                match ws.complete_drawing_connection() {
                    Ok(edge_id) => info!("Connection {} created", edge_id),
                    Err(e) => warn!("Failed to create connection: {}", e),
                }
            }
        }

        if ws.dragging_node_id.is_some() {
            ws.end_dragging_node();
        }

        canvas_state.write().dragging = false;
    };

    let on_wheel = move |event: Event<WheelData>| {
        event.stop_propagation();

        let mouse_x = event.data().element_coordinates().x;
        let mouse_y = event.data().element_coordinates().y;

        let wheel_delta = match event.data().delta() {
            dioxus::html::geometry::WheelDelta::Pixels(vector) => vector.y * -0.01,
            dioxus::html::geometry::WheelDelta::Lines(vector) => vector.y * -0.05,
            dioxus::html::geometry::WheelDelta::Pages(vector) => vector.y * -0.2,
        };

        canvas_state.write().zoom_around(mouse_x, mouse_y, 1.0 + wheel_delta);
    };

    let on_drop = move |event: Event<DragData>| {
        event.prevent_default();
        let Some(node_type) = dragged_node_type.take() else { return };

        let (page_x, page_y) = event.page_coordinates().into();
        let (world_x, world_y) = canvas_state.read().page_to_world_coords(page_x, page_y);
        let node_id = workflow_state.write().create_node(node_type, world_x, world_y);
        info!("Dropped {} as {}", node_type.type_name(), node_id);
    };

    let state = canvas_state.read();
    let transform_style = format!(
        "transform: translate({}px, {}px) scale({}); transform-origin: 0 0;",
        state.offset_x, state.offset_y, state.zoom
    );
    drop(state);

    rsx! {
        div {
            class: "canvas-background",
            style: "width: 100%; height: 100%; position: absolute; overflow: hidden;",
            onmousedown: on_mouse_down,
            onmousemove: on_mouse_move,
            onmouseup: on_mouse_up,
            onmouseleave: on_mouse_up,
            onwheel: on_wheel,
            ondragover: move |event| event.prevent_default(),
            ondrop: on_drop,

            div {
                class: "canvas-elements",
                style: "position: absolute; {transform_style}",
                {children}
            }

            if *context_menu_visible.read() {
                CanvasContextMenu {
                    visible: context_menu_visible,
                    position_x: context_menu_pos_x,
                    position_y: context_menu_pos_y,
                    on_add_node: on_add_node_from_menu
                }
            }
        }
    }
}

// Context Menu Component for adding nodes
#[component]
pub fn CanvasContextMenu(
    visible: Signal<bool>,
    position_x: Signal<f64>,
    position_y: Signal<f64>,
    on_add_node: EventHandler<NodeType>,
) -> Element {
    let menu_item_style = "padding: 8px 15px; cursor: pointer; user-select: none; \
        display: flex; flex-direction: column; gap: 2px;";

    let menu_style = format!(
        "position: absolute; top: {}px; left: {}px; background-color: var(--text-primary); \
        border: 1px solid #ccc; box-shadow: 0 2px 5px rgba(0,0,0,0.2); \
        z-index: 100; padding: 5px 0; border-radius: 8px; min-width: 200px; \
        font-family: system-ui, -apple-system, sans-serif; font-size: 14px;",
        position_y(), position_x()
    );
    let palette = NodeType::PALETTE.map(|node_type| {
        (node_type, node_type.type_name(), node_type.title(), node_type.description())
    });

    rsx! {
        div {
            style: "{menu_style}",
            onmousedown: move |event| {
                event.stop_propagation();
            },

            for (node_type, type_name, title, description) in palette {
                div {
                    key: "{type_name}",
                    style: "{menu_item_style}",
                    onclick: move |_| {
                        on_add_node.call(node_type);
                        visible.set(false);
                    },
                    span {
                        style: "color: var(--ui); font-weight: bold;",
                        "{title}"
                    }
                    span {
                        style: "color: var(--ui); font-size: 11px;",
                        "{description}"
                    }
                }
            }
        }
    }
}
