use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::path::{Path, PathBuf};
use std::fs;
use crate::components::Workflow;

const WORKFLOW_FILENAME: &str = "default.json";

/// Extensions offered by the upload dialog.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// Get the application directory, creating it if it doesn't exist
fn get_app_directory() -> Result<PathBuf> {
    let app_dir = if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("pixflow")
    } else {
        // Fallback to current directory if we can't get system data dir
        std::env::current_dir()?.join(".pixflow")
    };

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir)
}

fn get_workflows_directory() -> Result<PathBuf> {
    let workflows_dir = get_app_directory()?.join("workflows");

    if !workflows_dir.exists() {
        fs::create_dir_all(&workflows_dir)?;
    }

    Ok(workflows_dir)
}

/// Save the workflow to the default file
pub fn save_default_workflow(workflow: &Workflow) -> Result<()> {
    save_workflow_to(&get_workflows_directory()?.join(WORKFLOW_FILENAME), workflow)
}

/// Load the workflow from the default file
pub fn load_default_workflow() -> Result<Workflow> {
    load_workflow_from(&get_workflows_directory()?.join(WORKFLOW_FILENAME))
}

pub fn save_workflow_to(path: &Path, workflow: &Workflow) -> Result<()> {
    let json_content = serde_json::to_string_pretty(workflow)?;
    fs::write(path, json_content)
        .with_context(|| format!("Failed to write workflow to {}", path.display()))
}

pub fn load_workflow_from(path: &Path) -> Result<Workflow> {
    let json_content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read workflow from {}", path.display()))?;
    let saved: Workflow = serde_json::from_str(&json_content)
        .context("Workflow file is not valid")?;

    // Rebuild so transient state never survives a reload
    let mut workflow = Workflow::default();
    workflow.load_workflow(saved.nodes, saved.edges);
    Ok(workflow)
}

pub fn mime_for_file_name(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

pub fn encode_data_uri(file_name: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for_file_name(file_name), STANDARD.encode(bytes))
}

pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let Some(rest) = uri.strip_prefix("data:") else {
        bail!("Not a data URI");
    };
    let (_, payload) = rest.split_once(',').context("Data URI has no payload")?;
    STANDARD.decode(payload.trim()).context("Image data is not valid base64")
}

/// Writes the bytes behind an image `data:` URI to `path`.
pub async fn write_image(path: &Path, data_uri: &str) -> Result<()> {
    let bytes = decode_data_uri(data_uri)?;
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to save image to {}", path.display()))
}
