use crate::components::{Edge, Node, NodePatch, NodeType};

/// A canned workflow offered in the sidebar.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkflowExample {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

fn prompted(id: &str, node_type: NodeType, x: f64, y: f64, label: &str, prompt: &str) -> Node {
    let mut node = Node::new(id, node_type, x, y).with_label(label);
    node.apply(NodePatch::default().prompt(prompt));
    node
}

pub fn builtin_examples() -> Vec<WorkflowExample> {
    vec![
        WorkflowExample {
            id: "text-to-image",
            name: "Text to Image",
            description: "Generate an image from a text prompt",
            nodes: vec![prompted(
                "gen-1",
                NodeType::GenerateImage,
                100.0,
                100.0,
                "Generate Image",
                "A cyberpunk city street at night with neon lights and rain reflections, photorealistic 8k",
            )],
            edges: Vec::new(),
        },
        WorkflowExample {
            id: "image-editing",
            name: "Image Editing",
            description: "Upload and modify an image",
            nodes: vec![
                Node::new("upload-1", NodeType::ImageUpload, 100.0, 100.0).with_label("Upload Image"),
                prompted(
                    "edit-1",
                    NodeType::EditImage,
                    500.0,
                    100.0,
                    "Edit Image",
                    "Make the image look like a oil painting by Van Gogh",
                ),
            ],
            edges: vec![Edge::new("e1", "upload-1", "edit-1")],
        },
        WorkflowExample {
            id: "image-variation",
            name: "Image Variation",
            description: "Generate variation from input",
            nodes: vec![
                Node::new("upload-var-1", NodeType::ImageUpload, 100.0, 100.0).with_label("Reference Image"),
                prompted(
                    "gen-var-1",
                    NodeType::GenerateImage,
                    500.0,
                    100.0,
                    "Generate Variation",
                    "A similar composition but in the style of Studio Ghibli anime",
                ),
            ],
            edges: vec![Edge::new("e2", "upload-var-1", "gen-var-1")],
        },
    ]
}

pub fn find_example(id: &str) -> Option<WorkflowExample> {
    builtin_examples().into_iter().find(|example| example.id == id)
}
