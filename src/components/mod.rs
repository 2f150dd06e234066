mod canvas;
mod nodes;
mod connections;
mod workflow;
mod settings;
mod sidebar;

pub use {
    canvas::{Canvas, CanvasState},
    connections::Edge,
    workflow::{WorkflowManager, Workflow},
    nodes::{Node, NodePatch, NodeType},
    settings::SettingsPopup,
    sidebar::Sidebar
};
