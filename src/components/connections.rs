use dioxus::prelude::*;
use serde::{Deserialize, Serialize};
use crate::components::nodes::Node;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        Edge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    Input,
    Output,
}

#[derive(Clone, Default, Debug, PartialEq)]
pub struct ConnectionDrawingState {
    pub active: bool,
    pub source_node_id: String,
    pub source_port_world_pos: (f64, f64),
    pub current_mouse_world_pos: (f64, f64),
    pub target_node_id: Option<String>,
}

impl ConnectionDrawingState {
    // Cubic curve; the svg sits 5000px up/left of the world origin
    fn build_path(from_x: f64, from_y: f64, to_x: f64, to_y: f64) -> String {
        let bend = ((to_x - from_x).abs() / 2.0).max(40.0);
        format!(
            "M {},{} C {},{} {},{} {},{}",
            from_x + 5000.0, from_y + 5000.0,
            from_x + bend + 5000.0, from_y + 5000.0,
            to_x - bend + 5000.0, to_y + 5000.0,
            to_x + 5000.0, to_y + 5000.0
        )
    }

    fn get_drawing_line_path(&self) -> String {
        let (from_x, from_y) = self.source_port_world_pos;
        let (to_x, to_y) = self.current_mouse_world_pos;
        Self::build_path(from_x, from_y, to_x, to_y)
    }
}

#[component]
pub fn ConnectionsRenderer(
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    drawing_state: ConnectionDrawingState,
) -> Element {
    let find = |id: &str| nodes.iter().find(|node| node.id == id);

    // Dangling edges are not drawn
    let connection_lines = edges.iter().filter_map(|edge| {
        let from_node = find(&edge.source)?;
        let to_node = find(&edge.target)?;

        let (from_x, from_y) = get_port_world_pos(from_node, Port::Output);
        let (to_x, to_y) = get_port_world_pos(to_node, Port::Input);

        let path_data = ConnectionDrawingState::build_path(from_x, from_y, to_x, to_y);

        Some(rsx! {
            path {
                key: "edge-{edge.id}",
                d: "{path_data}",
                stroke: "var(--text-link)",
                "stroke-width": "2",
                fill: "none",
            }
        })
    });

    let drawing_line = drawing_state.active.then(|| {
        let path_data = drawing_state.get_drawing_line_path();

        rsx! {
            path {
                d: "{path_data}",
                stroke: "var(--text-link)",
                "stroke-width": "2.5",
                "stroke-dasharray": "6 4",
                fill: "none",
            }
        }
    });

    rsx! {
        svg {
            style: "position: absolute; top: -5000px; left: -5000px; width: 10000px; height: 10000px; pointer-events: none; z-index: 5;",
            xmlns: "http://www.w3.org/2000/svg",
            {connection_lines}
            {drawing_line}
        }
    }
}

pub fn get_port_world_pos(node: &Node, port: Port) -> (f64, f64) {
    match port {
        Port::Input => (
            node.position_x,
            node.position_y + node.height / 2.0,
        ),
        Port::Output => (
            node.position_x + node.width,
            node.position_y + node.height / 2.0,
        ),
    }
}
