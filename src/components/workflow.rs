use dioxus::prelude::*;
use dioxus::logger::tracing::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::{
    components::{
        canvas::CanvasState,
        nodes::{InputSelection, Node, NodeKind, NodePatch, NodeType, NodeComponent},
        connections::{Edge, Port, get_port_world_pos, ConnectionDrawingState, ConnectionsRenderer}
    },
    gemini::{GeminiClient, GeneratedImage, ImageProvider}
};

/// Horizontal distance between an executed node and the result node it spawns.
pub const RESULT_NODE_OFFSET_X: f64 = 400.0;
pub const NO_INPUT_IMAGES: &str = "No input images found for editing.";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("node '{0}' not found")]
    NodeNotFound(String),

    #[error("cannot connect node '{0}' to itself")]
    SelfConnection(String),

    #[error("nodes '{from}' and '{to}' are already connected")]
    DuplicateConnection { from: String, to: String },

    #[error("edge endpoint '{0}' does not exist")]
    UnknownEndpoint(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingPrompt,
    NoUploadedImage,
    NotExecutable,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionOutcome {
    Completed { result_node_id: Option<String> },
    Skipped(SkipReason),
    /// The message was also written to the node's `error` field.
    Failed(String),
}

/// The API call an execution is waiting on.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingCall {
    Edit { prompt: String, images: Vec<String> },
    Generate { prompt: String, references: Vec<String> },
}

impl PendingCall {
    pub async fn dispatch<P: ImageProvider>(&self, provider: &P) -> anyhow::Result<GeneratedImage> {
        match self {
            PendingCall::Edit { prompt, images } => provider.edit(prompt, images).await,
            PendingCall::Generate { prompt, references } => provider.generate(prompt, references).await,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            PendingCall::Edit { prompt, .. } | PendingCall::Generate { prompt, .. } => prompt,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionStep {
    Finished(ExecutionOutcome),
    Call(PendingCall),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip)]
    pub is_running: bool,
    #[serde(skip)]
    pub results: Vec<String>,
    #[serde(skip)]
    pub selected_node_id: Option<String>,
    #[serde(skip)]
    pub dragging_node_id: Option<String>,
    #[serde(skip)]
    pub drawing_connection_state: ConnectionDrawingState,
}

fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn generation_time() -> String {
    chrono::Local::now().format("%-I:%M:%S %p").to_string()
}

impl Workflow {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    /// Appends without checking that the id is free.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn create_node(&mut self, node_type: NodeType, position_x: f64, position_y: f64) -> String {
        let id = self.unique_id(node_type.type_name());
        self.add_node(Node::new(&id, node_type, position_x, position_y));
        id
    }

    fn unique_id(&self, prefix: &str) -> String {
        let base = format!("{}-{}", prefix, unix_millis());
        if self.node(&base).is_none() {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.node(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> Result<(), WorkflowError> {
        let node = self.node_mut(id).ok_or_else(|| WorkflowError::NodeNotFound(id.to_string()))?;
        node.apply(patch);
        Ok(())
    }

    pub fn remove_node(&mut self, id: &str) {
        self.nodes.retain(|node| node.id != id);
        self.edges.retain(|edge| edge.source != id && edge.target != id);

        if self.selected_node_id.as_deref() == Some(id) {
            self.selected_node_id = None;
        }
        if self.dragging_node_id.as_deref() == Some(id) {
            self.dragging_node_id = None;
        }
        if self.drawing_connection_state.active && self.drawing_connection_state.source_node_id == id {
            self.cancel_drawing_connection();
        }
    }

    pub fn remove_edge(&mut self, edge_id: &str) {
        self.edges.retain(|edge| edge.id != edge_id);
    }

    pub fn remove_edges_to_node(&mut self, node_id: &str) {
        self.edges.retain(|edge| edge.target != node_id);
    }

    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
    }

    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
    }

    pub fn set_running(&mut self, running: bool) {
        self.is_running = running;
    }

    pub fn add_result(&mut self, result: impl Into<String>) {
        self.results.push(result.into());
    }

    pub fn clear_workflow(&mut self) {
        *self = Workflow::default();
    }

    pub fn load_workflow(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        *self = Workflow {
            nodes,
            edges,
            ..Workflow::default()
        };
    }

    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, WorkflowError> {
        if source == target {
            return Err(WorkflowError::SelfConnection(source.to_string()));
        }
        for endpoint in [source, target] {
            if self.node(endpoint).is_none() {
                return Err(WorkflowError::UnknownEndpoint(endpoint.to_string()));
            }
        }
        if self.edges.iter().any(|edge| edge.source == source && edge.target == target) {
            return Err(WorkflowError::DuplicateConnection {
                from: source.to_string(),
                to: target.to_string(),
            });
        }

        let id = format!("edge-{}-{}", source, target);
        self.edges.push(Edge::new(&id, source, target));
        Ok(id)
    }

    /// Outputs of the direct predecessors of `node_id`, in edge order.
    /// Missing sources and empty outputs are skipped.
    pub fn upstream_outputs(&self, node_id: &str) -> Vec<String> {
        self.edges.iter()
            .filter(|edge| edge.target == node_id)
            .filter_map(|edge| self.node(&edge.source))
            .filter_map(|node| node.output.clone())
            .filter(|output| !output.is_empty())
            .collect()
    }

    /// Marks the node as processing and resolves what it needs.
    /// Everything that needs no API call finishes here.
    ///
    /// Prompts are trimmed before the emptiness check, so a whitespace-only
    /// prompt is skipped instead of being sent.
    pub fn begin_execution(&mut self, node_id: &str, selection: &InputSelection) -> Result<ExecutionStep, WorkflowError> {
        let inputs = selection.active_inputs(self.upstream_outputs(node_id));

        let node = self.node_mut(node_id).ok_or_else(|| WorkflowError::NodeNotFound(node_id.to_string()))?;
        node.is_processing = true;
        node.error = None;

        let mut log_entry = None;
        let step = match &node.kind {
            NodeKind::ImageUpload { uploaded_image: Some(image), file_name } => {
                log_entry = Some(format!("Uploaded: {}", file_name.as_deref().unwrap_or("image")));
                node.output = Some(image.clone());
                node.is_processing = false;
                ExecutionStep::Finished(ExecutionOutcome::Completed { result_node_id: None })
            }
            NodeKind::ImageUpload { uploaded_image: None, .. } => {
                node.is_processing = false;
                ExecutionStep::Finished(ExecutionOutcome::Skipped(SkipReason::NoUploadedImage))
            }
            NodeKind::EditImage { prompt, .. } | NodeKind::GenerateImage { prompt, .. }
                if prompt.trim().is_empty() =>
            {
                node.is_processing = false;
                ExecutionStep::Finished(ExecutionOutcome::Skipped(SkipReason::MissingPrompt))
            }
            NodeKind::EditImage { .. } if inputs.is_empty() => {
                node.is_processing = false;
                node.error = Some(NO_INPUT_IMAGES.to_string());
                ExecutionStep::Finished(ExecutionOutcome::Failed(NO_INPUT_IMAGES.to_string()))
            }
            NodeKind::EditImage { prompt, .. } => ExecutionStep::Call(PendingCall::Edit {
                prompt: prompt.clone(),
                images: inputs,
            }),
            NodeKind::GenerateImage { prompt, .. } => ExecutionStep::Call(PendingCall::Generate {
                prompt: prompt.clone(),
                references: inputs,
            }),
            NodeKind::ImageResult { .. } => {
                node.is_processing = false;
                ExecutionStep::Finished(ExecutionOutcome::Skipped(SkipReason::NotExecutable))
            }
        };
        if let Some(entry) = log_entry {
            self.add_result(entry);
        }
        Ok(step)
    }

    /// Writes the outcome of `call` back to the node and spawns a result
    /// node on success. Results for nodes deleted mid-flight are dropped.
    pub fn complete_execution(
        &mut self,
        node_id: &str,
        call: &PendingCall,
        result: anyhow::Result<GeneratedImage>,
    ) -> Result<ExecutionOutcome, WorkflowError> {
        let node = self.node_mut(node_id).ok_or_else(|| WorkflowError::NodeNotFound(node_id.to_string()))?;
        node.is_processing = false;

        let image = match result {
            Ok(image) => image,
            Err(e) => {
                let message = format!("{:#}", e);
                let message = if message.trim().is_empty() { "Unknown error".to_string() } else { message };
                node.error = Some(message.clone());
                return Ok(ExecutionOutcome::Failed(message));
            }
        };

        node.output = Some(image.image_url.clone());
        node.set_generated_image(image.image_url.clone());
        let (position_x, position_y) = (node.position_x, node.position_y);

        let (prefix, label, entry) = match call {
            PendingCall::Edit { prompt, .. } => ("edited-result", "Edited Image", format!("Edited image: {}", prompt)),
            PendingCall::Generate { prompt, .. } => ("result", "Generated Image", format!("Generated: {}", prompt)),
        };
        self.add_result(entry);

        let result_id = self.unique_id(prefix);
        self.add_node(Node::result(
            &result_id,
            label,
            position_x + RESULT_NODE_OFFSET_X,
            position_y,
            image,
            generation_time(),
        ));
        Ok(ExecutionOutcome::Completed { result_node_id: Some(result_id) })
    }

    pub async fn execute_node<P: ImageProvider>(&mut self, node_id: &str, provider: &P) -> Result<ExecutionOutcome, WorkflowError> {
        self.execute_node_with(node_id, &InputSelection::default(), provider).await
    }

    pub async fn execute_node_with<P: ImageProvider>(
        &mut self,
        node_id: &str,
        selection: &InputSelection,
        provider: &P,
    ) -> Result<ExecutionOutcome, WorkflowError> {
        match self.begin_execution(node_id, selection)? {
            ExecutionStep::Finished(outcome) => Ok(outcome),
            ExecutionStep::Call(call) => {
                let result = call.dispatch(provider).await;
                self.complete_execution(node_id, &call, result)
            }
        }
    }

    pub fn start_dragging_node(&mut self, node_id: &str, mouse_page_x: f64, mouse_page_y: f64, canvas: &CanvasState) {
        let mouse_world_pos = canvas.page_to_world_coords(mouse_page_x, mouse_page_y);
        if let Some(node) = self.node_mut(node_id) {
            node.drag_offset_x = mouse_world_pos.0 - node.position_x;
            node.drag_offset_y = mouse_world_pos.1 - node.position_y;
            self.dragging_node_id = Some(node_id.to_string());
        }
    }

    pub fn drag_node(&mut self, mouse_page_x: f64, mouse_page_y: f64, canvas: &CanvasState) {
        let Some(node_id) = self.dragging_node_id.clone() else { return };
        let mouse_world_pos = canvas.page_to_world_coords(mouse_page_x, mouse_page_y);
        if let Some(node) = self.node_mut(&node_id) {
            node.position_x = mouse_world_pos.0 - node.drag_offset_x;
            node.position_y = mouse_world_pos.1 - node.drag_offset_y;
        }
    }

    pub fn end_dragging_node(&mut self) {
        self.dragging_node_id = None;
    }

    /// 1-based position of `node_id` among the inputs of `target_node_id`,
    /// only when the target has more than one input.
    pub fn get_input_order_number(&self, node_id: &str, target_node_id: &str) -> Option<usize> {
        let sources: Vec<&str> = self.edges.iter()
            .filter(|edge| edge.target == target_node_id && self.node(&edge.source).is_some())
            .map(|edge| edge.source.as_str())
            .collect();

        if sources.len() <= 1 {
            return None;
        }
        sources.iter()
            .position(|source| *source == node_id)
            .map(|pos| pos + 1)
    }

    pub fn start_drawing_connection(&mut self, source_node_id: &str, port_page_x: f64, port_page_y: f64, canvas: &CanvasState) {
        if self.node(source_node_id).is_some() {
            let source_port_world_pos = canvas.page_to_world_coords(port_page_x, port_page_y);
            self.drawing_connection_state = ConnectionDrawingState {
                active: true,
                source_node_id: source_node_id.to_string(),
                source_port_world_pos,
                current_mouse_world_pos: source_port_world_pos,
                target_node_id: None,
            };
        }
    }

    /// Detaches the latest connection into `target_node_id` and continues
    /// drawing it from its source.
    pub fn redirect_connection(&mut self, target_node_id: &str) {
        let Some(edge) = self.edges.iter().rev().find(|edge| edge.target == target_node_id).cloned() else {
            return;
        };
        let Some(source_node) = self.node(&edge.source) else {
            self.remove_edge(&edge.id);
            return;
        };
        let source_port_world_pos = get_port_world_pos(source_node, Port::Output);

        let current_mouse_pos = if self.drawing_connection_state.active {
            self.drawing_connection_state.current_mouse_world_pos
        } else if let Some(target_node) = self.node(target_node_id) {
            get_port_world_pos(target_node, Port::Input)
        } else {
            source_port_world_pos
        };

        self.drawing_connection_state = ConnectionDrawingState {
            active: true,
            source_node_id: edge.source.clone(),
            source_port_world_pos,
            current_mouse_world_pos: current_mouse_pos,
            target_node_id: None,
        };
        self.remove_edge(&edge.id);
    }

    pub fn update_drawing_connection(&mut self, mouse_page_x: f64, mouse_page_y: f64, canvas: &CanvasState) {
        self.drawing_connection_state.current_mouse_world_pos = canvas.page_to_world_coords(mouse_page_x, mouse_page_y);
    }

    pub fn complete_drawing_connection(&mut self) -> Result<String, WorkflowError> {
        let source = self.drawing_connection_state.source_node_id.clone();
        let result = match self.drawing_connection_state.target_node_id.clone() {
            Some(target) => self.connect(&source, &target),
            None => Err(WorkflowError::UnknownEndpoint(String::new())),
        };
        self.cancel_drawing_connection();
        result
    }

    pub fn cancel_drawing_connection(&mut self) {
        self.drawing_connection_state = ConnectionDrawingState::default();
    }

    pub fn set_connection_target(&mut self, target_id: &str) {
        let accepts_input = self.node(target_id).is_some_and(|node| node.node_type().accepts_input());
        if self.drawing_connection_state.source_node_id != target_id && accepts_input {
            self.drawing_connection_state.target_node_id = Some(target_id.to_string());
        }
    }

    pub fn clear_connection_target(&mut self) {
        self.drawing_connection_state.target_node_id = None;
    }
}

/// Runs one node against Gemini without holding the signal across the call.
pub async fn run_node(mut workflow_state: Signal<Workflow>, node_id: String, selection: InputSelection) {
    let step = workflow_state.write().begin_execution(&node_id, &selection);
    let call = match step {
        Ok(ExecutionStep::Call(call)) => call,
        Ok(ExecutionStep::Finished(outcome)) => {
            info!("Node {} finished without API call: {:?}", node_id, outcome);
            return;
        }
        Err(e) => {
            warn!("Failed to execute node: {}", e);
            return;
        }
    };

    workflow_state.write().set_running(true);
    let client = GeminiClient::new();
    let result = call.dispatch(&client).await;

    let mut ws = workflow_state.write();
    match ws.complete_execution(&node_id, &call, result) {
        Ok(ExecutionOutcome::Failed(message)) => warn!("Node {} failed: {}", node_id, message),
        Ok(outcome) => info!("Node {} executed: {:?}", node_id, outcome),
        Err(e) => warn!("Discarding result of '{}': {}", call.prompt(), e),
    }
    let still_processing = ws.nodes.iter().any(|node| node.is_processing);
    ws.set_running(still_processing);
}

// Main Workflow Management Component
#[component]
pub fn WorkflowManager(
    canvas_state: Signal<CanvasState>,
    workflow_state: Signal<Workflow>
) -> Element {
    let (current_nodes, node_ids_to_render, edges_to_render, drawing_state) = {
        let ws_read = workflow_state.read();
        (
            ws_read.nodes.clone(),
            ws_read.nodes.iter().map(|node| node.id.clone()).collect::<Vec<_>>(),
            ws_read.edges.clone(),
            ws_read.drawing_connection_state.clone(),
        )
    };

    rsx! {
        div {
            ConnectionsRenderer {
                nodes: current_nodes,
                edges: edges_to_render,
                drawing_state: drawing_state,
            }

            for node_id in node_ids_to_render {
                NodeComponent {
                    key: "{node_id}",
                    node_id: node_id.clone(),
                    workflow_state: workflow_state,
                    canvas_state: canvas_state,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::examples::find_example;
    use std::sync::Mutex;

    struct MockProvider {
        reply: Result<String, String>,
        calls: Mutex<Vec<(&'static str, String, Vec<String>)>>,
    }

    impl MockProvider {
        fn returning(image_url: &str) -> Self {
            Self { reply: Ok(image_url.to_string()), calls: Mutex::new(Vec::new()) }
        }

        fn failing(message: &str) -> Self {
            Self { reply: Err(message.to_string()), calls: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> Vec<(&'static str, String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }

        fn respond(&self, kind: &'static str, prompt: &str, images: &[String], description: String) -> anyhow::Result<GeneratedImage> {
            self.calls.lock().unwrap().push((kind, prompt.to_string(), images.to_vec()));
            match &self.reply {
                Ok(image_url) => Ok(GeneratedImage {
                    image_url: image_url.clone(),
                    prompt: prompt.to_string(),
                    description,
                }),
                Err(message) => Err(anyhow::anyhow!(message.clone())),
            }
        }
    }

    impl ImageProvider for MockProvider {
        async fn generate(&self, prompt: &str, reference_images: &[String]) -> anyhow::Result<GeneratedImage> {
            self.respond("generate", prompt, reference_images, prompt.to_string())
        }

        async fn edit(&self, prompt: &str, images: &[String]) -> anyhow::Result<GeneratedImage> {
            self.respond("edit", prompt, images, format!("Edited: {}", prompt))
        }
    }

    const RETURNED: &str = "data:image/png;base64,UkVTVUxU";

    fn uploaded(id: &str, image: Option<&str>) -> Node {
        let mut node = Node::new(id, NodeType::ImageUpload, 0.0, 0.0);
        node.output = image.map(str::to_string);
        node
    }

    fn edit_node(id: &str, prompt: &str, x: f64, y: f64) -> Node {
        let mut node = Node::new(id, NodeType::EditImage, x, y);
        node.apply(NodePatch::default().prompt(prompt));
        node
    }

    fn generate_node(id: &str, prompt: &str) -> Node {
        let mut node = Node::new(id, NodeType::GenerateImage, 100.0, 50.0);
        node.apply(NodePatch::default().prompt(prompt));
        node
    }

    #[test]
    fn removing_a_node_prunes_every_incident_edge() {
        let mut wf = Workflow::default();
        for id in ["a", "b", "c"] {
            wf.add_node(uploaded(id, None));
        }
        wf.add_node(edit_node("e", "p", 0.0, 0.0));
        wf.set_edges(vec![
            Edge::new("1", "a", "e"),
            Edge::new("2", "e", "b"),
            Edge::new("3", "b", "c"),
            Edge::new("4", "c", "e"),
        ]);

        wf.remove_node("e");

        assert!(wf.node("e").is_none());
        assert!(wf.edges.iter().all(|edge| edge.source != "e" && edge.target != "e"));
        assert_eq!(wf.edges, vec![Edge::new("3", "b", "c")]);
    }

    #[test]
    fn update_on_unknown_id_leaves_nodes_untouched() {
        let mut wf = Workflow::default();
        wf.add_node(edit_node("e", "before", 0.0, 0.0));
        let before = wf.nodes.clone();

        let result = wf.update_node("missing", NodePatch::default().prompt("after"));

        assert_eq!(result, Err(WorkflowError::NodeNotFound("missing".to_string())));
        assert_eq!(wf.nodes, before);
    }

    #[test]
    fn update_merges_only_fields_that_fit_the_kind() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("u", None));
        wf.add_node(edit_node("e", "old", 0.0, 0.0));

        wf.update_node("e", NodePatch::default().prompt("new").label("Renamed")).unwrap();
        wf.update_node("u", NodePatch::default().prompt("ignored")).unwrap();

        let edit = wf.node("e").unwrap();
        assert_eq!(edit.prompt(), Some("new"));
        assert_eq!(edit.label, "Renamed");
        assert_eq!(wf.node("u").unwrap().prompt(), None);
        assert_eq!(wf.node("u").unwrap().kind, NodeKind::ImageUpload { uploaded_image: None, file_name: None });
    }

    #[test]
    fn upstream_outputs_skip_empty_sources_and_keep_edge_order() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("late", Some("data:image/png;base64,TEFURQ==")));
        wf.add_node(uploaded("pending", None));
        wf.add_node(uploaded("blank", Some("")));
        wf.add_node(uploaded("early", Some("data:image/png;base64,RUFSTFk=")));
        wf.add_node(edit_node("e", "combine", 0.0, 0.0));
        wf.set_edges(vec![
            Edge::new("1", "early", "e"),
            Edge::new("2", "pending", "e"),
            Edge::new("3", "ghost", "e"),
            Edge::new("4", "blank", "e"),
            Edge::new("5", "late", "e"),
        ]);

        assert_eq!(
            wf.upstream_outputs("e"),
            vec!["data:image/png;base64,RUFSTFk=".to_string(), "data:image/png;base64,TEFURQ==".to_string()]
        );
    }

    #[tokio::test]
    async fn edit_without_predecessors_fails_on_the_node() {
        let mut wf = Workflow::default();
        wf.add_node(edit_node("e", "make it blue", 0.0, 0.0));
        let provider = MockProvider::returning(RETURNED);

        let outcome = wf.execute_node("e", &provider).await.unwrap();

        assert_eq!(outcome, ExecutionOutcome::Failed(NO_INPUT_IMAGES.to_string()));
        let node = wf.node("e").unwrap();
        assert_eq!(node.error.as_deref(), Some("No input images found for editing."));
        assert!(!node.is_processing);
        assert_eq!(wf.nodes.len(), 1);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn successful_edit_spawns_one_result_node_beside_the_source() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("u", Some("data:image/png;base64,SU4=")));
        wf.add_node(edit_node("e", "oil painting", 500.0, 120.0));
        wf.connect("u", "e").unwrap();
        let provider = MockProvider::returning(RETURNED);

        let outcome = wf.execute_node("e", &provider).await.unwrap();

        let result_id = match &outcome {
            ExecutionOutcome::Completed { result_node_id: Some(id) } => id.clone(),
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(wf.nodes.len(), 3);
        let result = wf.nodes.last().unwrap();
        assert_eq!(result.id, result_id);
        assert!(result.id.starts_with("edited-result-"));
        assert_eq!(result.node_type(), NodeType::ImageResult);
        assert_eq!((result.position_x, result.position_y), (900.0, 120.0));
        assert_eq!(result.output.as_deref(), Some(RETURNED));
        assert_eq!(result.label, "Edited Image");
        let NodeKind::ImageResult { image_url, prompt, description, .. } = &result.kind else {
            panic!("result node has wrong kind");
        };
        assert_eq!(image_url, RETURNED);
        assert_eq!(prompt, "oil painting");
        assert_eq!(description, "Edited: oil painting");

        let edit = wf.node("e").unwrap();
        assert_eq!(edit.output.as_deref(), Some(RETURNED));
        assert_eq!(edit.kind, NodeKind::EditImage {
            prompt: "oil painting".to_string(),
            generated_image: Some(RETURNED.to_string()),
        });
        assert!(!edit.is_processing);
        assert_eq!(wf.results, vec!["Edited image: oil painting".to_string()]);
        assert_eq!(provider.calls(), vec![("edit", "oil painting".to_string(), vec!["data:image/png;base64,SU4=".to_string()])]);
    }

    #[tokio::test]
    async fn generate_without_references_spawns_generated_result() {
        let mut wf = Workflow::default();
        wf.add_node(generate_node("g", "neon city"));
        let provider = MockProvider::returning(RETURNED);

        wf.execute_node("g", &provider).await.unwrap();

        assert_eq!(wf.nodes.len(), 2);
        let result = &wf.nodes[1];
        assert!(result.id.starts_with("result-"));
        assert_eq!(result.label, "Generated Image");
        assert_eq!((result.position_x, result.position_y), (500.0, 50.0));
        assert_eq!(result.output.as_deref(), Some(RETURNED));
        assert_eq!(wf.results, vec!["Generated: neon city".to_string()]);
        assert_eq!(provider.calls(), vec![("generate", "neon city".to_string(), vec![])]);
    }

    #[tokio::test]
    async fn edit_response_without_image_leaves_output_unset() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("u", Some("data:image/png;base64,SU4=")));
        wf.add_node(edit_node("e", "sharpen", 0.0, 0.0));
        wf.connect("u", "e").unwrap();
        let provider = MockProvider::failing("No edited image returned.");

        let outcome = wf.execute_node("e", &provider).await.unwrap();

        assert_eq!(outcome, ExecutionOutcome::Failed("No edited image returned.".to_string()));
        let edit = wf.node("e").unwrap();
        assert_eq!(edit.output, None);
        assert_eq!(edit.error.as_deref(), Some("No edited image returned."));
        assert!(!edit.is_processing);
        assert_eq!(wf.nodes.len(), 2);
        assert!(wf.results.is_empty());
    }

    #[tokio::test]
    async fn failed_node_can_be_run_again() {
        let mut wf = Workflow::default();
        wf.add_node(generate_node("g", "sunset"));

        wf.execute_node("g", &MockProvider::failing("")).await.unwrap();
        assert_eq!(wf.node("g").unwrap().error.as_deref(), Some("Unknown error"));

        wf.execute_node("g", &MockProvider::returning(RETURNED)).await.unwrap();
        let node = wf.node("g").unwrap();
        assert_eq!(node.error, None);
        assert_eq!(node.output.as_deref(), Some(RETURNED));
    }

    #[tokio::test]
    async fn upload_execution_publishes_the_image() {
        let mut wf = Workflow::default();
        let mut node = Node::new("u", NodeType::ImageUpload, 0.0, 0.0);
        node.apply(NodePatch::default().upload("data:image/jpeg;base64,Q0FU", "cat.jpg"));
        wf.add_node(node);
        wf.add_node(uploaded("empty", None));
        let provider = MockProvider::returning(RETURNED);

        let done = wf.execute_node("u", &provider).await.unwrap();
        let skipped = wf.execute_node("empty", &provider).await.unwrap();

        assert_eq!(done, ExecutionOutcome::Completed { result_node_id: None });
        assert_eq!(wf.node("u").unwrap().output.as_deref(), Some("data:image/jpeg;base64,Q0FU"));
        assert_eq!(wf.results, vec!["Uploaded: cat.jpg".to_string()]);

        assert_eq!(skipped, ExecutionOutcome::Skipped(SkipReason::NoUploadedImage));
        assert!(!wf.node("empty").unwrap().is_processing);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn blank_prompt_is_skipped_without_error() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("u", Some("data:image/png;base64,SU4=")));
        wf.add_node(edit_node("e", "   ", 0.0, 0.0));
        wf.add_node(generate_node("g", ""));
        wf.connect("u", "e").unwrap();
        let provider = MockProvider::returning(RETURNED);

        for id in ["e", "g"] {
            let outcome = wf.execute_node(id, &provider).await.unwrap();
            assert_eq!(outcome, ExecutionOutcome::Skipped(SkipReason::MissingPrompt));
            let node = wf.node(id).unwrap();
            assert!(!node.is_processing);
            assert_eq!(node.error, None);
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn executing_unknown_node_is_reported() {
        let mut wf = Workflow::default();
        let before = wf.clone();

        let result = wf.execute_node("nope", &MockProvider::returning(RETURNED)).await;

        assert_eq!(result, Err(WorkflowError::NodeNotFound("nope".to_string())));
        assert_eq!(wf, before);
    }

    #[tokio::test]
    async fn excluded_inputs_are_not_sent() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("a", Some("data:image/png;base64,QQ==")));
        wf.add_node(uploaded("b", Some("data:image/png;base64,Qg==")));
        wf.add_node(edit_node("e", "merge", 0.0, 0.0));
        wf.connect("a", "e").unwrap();
        wf.connect("b", "e").unwrap();
        let provider = MockProvider::returning(RETURNED);
        let mut selection = InputSelection::default();
        selection.sync(wf.upstream_outputs("e"));

        selection.toggle(0);
        wf.execute_node_with("e", &selection, &provider).await.unwrap();
        assert_eq!(provider.calls()[0].2, vec!["data:image/png;base64,Qg==".to_string()]);

        selection.toggle(1);
        let outcome = wf.execute_node_with("e", &selection, &provider).await.unwrap();
        assert_eq!(outcome, ExecutionOutcome::Failed(NO_INPUT_IMAGES.to_string()));
    }

    #[tokio::test]
    async fn exclusions_made_before_an_upstream_change_are_dropped() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("a", Some("data:image/png;base64,QQ==")));
        wf.add_node(uploaded("b", Some("data:image/png;base64,Qg==")));
        wf.add_node(edit_node("e", "merge", 0.0, 0.0));
        wf.connect("a", "e").unwrap();
        wf.connect("b", "e").unwrap();
        let mut selection = InputSelection::default();
        selection.sync(wf.upstream_outputs("e"));
        selection.toggle(0);

        wf.node_mut("a").unwrap().output = Some("data:image/png;base64,Qw==".to_string());
        let provider = MockProvider::returning(RETURNED);
        wf.execute_node_with("e", &selection, &provider).await.unwrap();

        assert_eq!(provider.calls()[0].2, vec![
            "data:image/png;base64,Qw==".to_string(),
            "data:image/png;base64,Qg==".to_string(),
        ]);
    }

    #[test]
    fn result_for_deleted_node_is_discarded() {
        let mut wf = Workflow::default();
        wf.add_node(generate_node("g", "forest"));
        let ExecutionStep::Call(call) = wf.begin_execution("g", &InputSelection::default()).unwrap() else {
            panic!("generate should need an API call");
        };
        assert!(wf.node("g").unwrap().is_processing);

        wf.remove_node("g");
        let image = GeneratedImage {
            image_url: RETURNED.to_string(),
            prompt: "forest".to_string(),
            description: "forest".to_string(),
        };
        let result = wf.complete_execution("g", &call, Ok(image));

        assert_eq!(result, Err(WorkflowError::NodeNotFound("g".to_string())));
        assert!(wf.nodes.is_empty());
        assert!(wf.results.is_empty());
    }

    #[test]
    fn connect_rejects_self_duplicate_and_unknown_endpoints() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("u", None));
        wf.add_node(edit_node("e", "p", 0.0, 0.0));

        assert_eq!(wf.connect("u", "e"), Ok("edge-u-e".to_string()));
        assert_eq!(wf.connect("e", "e"), Err(WorkflowError::SelfConnection("e".to_string())));
        assert_eq!(
            wf.connect("u", "e"),
            Err(WorkflowError::DuplicateConnection { from: "u".to_string(), to: "e".to_string() })
        );
        assert_eq!(wf.connect("u", "x"), Err(WorkflowError::UnknownEndpoint("x".to_string())));
        assert_eq!(wf.edges.len(), 1);
    }

    #[test]
    fn remove_edges_to_node_keeps_outgoing_edges() {
        let mut wf = Workflow::default();
        wf.set_edges(vec![
            Edge::new("1", "a", "b"),
            Edge::new("2", "b", "c"),
            Edge::new("3", "d", "b"),
        ]);

        wf.remove_edges_to_node("b");
        assert_eq!(wf.edges, vec![Edge::new("2", "b", "c")]);

        wf.remove_edge("2");
        assert!(wf.edges.is_empty());
    }

    #[test]
    fn loading_an_example_replaces_graph_and_resets_log() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("stale", None));
        wf.add_result("Generated: old");
        wf.set_running(true);

        let example = find_example("image-editing").unwrap();
        wf.load_workflow(example.nodes.clone(), example.edges.clone());

        assert_eq!(wf.nodes, example.nodes);
        assert_eq!(wf.edges, example.edges);
        assert_eq!(wf.nodes.len(), 2);
        assert_eq!(wf.edges.len(), 1);
        assert_eq!(wf.edges[0].source, "upload-1");
        assert_eq!(wf.edges[0].target, "edit-1");
        assert!(wf.results.is_empty());
        assert!(!wf.is_running);
    }

    #[test]
    fn clear_workflow_empties_everything() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("u", None));
        wf.set_edges(vec![Edge::new("1", "u", "u")]);
        wf.add_result("Uploaded: image");
        wf.set_running(true);

        wf.clear_workflow();

        assert_eq!(wf, Workflow::default());
    }

    #[test]
    fn created_nodes_get_distinct_ids() {
        let mut wf = Workflow::default();
        let first = wf.create_node(NodeType::EditImage, 10.0, 20.0);
        let second = wf.create_node(NodeType::EditImage, 10.0, 20.0);

        assert_ne!(first, second);
        assert!(first.starts_with("editImage-"));
        assert_eq!(wf.nodes.len(), 2);
    }

    #[test]
    fn input_order_follows_edge_order() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("a", None));
        wf.add_node(uploaded("b", None));
        wf.add_node(edit_node("e", "p", 0.0, 0.0));
        wf.connect("b", "e").unwrap();
        assert_eq!(wf.get_input_order_number("b", "e"), None);

        wf.connect("a", "e").unwrap();
        assert_eq!(wf.get_input_order_number("b", "e"), Some(1));
        assert_eq!(wf.get_input_order_number("a", "e"), Some(2));
    }

    #[test]
    fn redirect_detaches_latest_incoming_connection() {
        let mut wf = Workflow::default();
        wf.add_node(uploaded("a", None));
        wf.add_node(uploaded("b", None));
        wf.add_node(edit_node("e", "p", 0.0, 0.0));
        wf.connect("a", "e").unwrap();
        wf.connect("b", "e").unwrap();

        wf.redirect_connection("e");

        assert_eq!(wf.edges, vec![Edge::new("edge-a-e", "a", "e")]);
        assert!(wf.drawing_connection_state.active);
        assert_eq!(wf.drawing_connection_state.source_node_id, "b");
    }
}
