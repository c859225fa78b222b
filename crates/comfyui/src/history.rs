//! Parsing of `GET /history/{prompt_id}` responses.
//!
//! ComfyUI returns `{}` while a prompt is queued or running. Once it
//! finishes, the entry keyed by the prompt id carries a `status` object
//! and an `outputs` map of node id to produced files.

use serde::Deserialize;

/// One file produced by a `SaveImage` (or similar) node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputImage {
    pub filename: String,
    #[serde(default)]
    pub subfolder: String,
    /// Storage bucket on the ComfyUI side (`output`, `temp`, `input`).
    #[serde(rename = "type", default = "default_folder_type")]
    pub folder_type: String,
}

fn default_folder_type() -> String {
    "output".to_string()
}

/// Execution state derived from a history response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryState {
    /// No history entry yet: still queued or executing.
    Pending,
    /// Finished successfully, with its output images in node order.
    Completed(Vec<OutputImage>),
    /// Finished with an execution error.
    Failed(String),
}

/// Interpret the history JSON for `prompt_id`.
pub fn parse_history(prompt_id: &str, history: &serde_json::Value) -> HistoryState {
    let Some(entry) = history.get(prompt_id) else {
        return HistoryState::Pending;
    };

    let status = entry.get("status");
    let status_str = status
        .and_then(|s| s.get("status_str"))
        .and_then(|s| s.as_str());
    if status_str == Some("error") {
        return HistoryState::Failed(error_message(status));
    }
    let completed = status
        .and_then(|s| s.get("completed"))
        .and_then(|c| c.as_bool())
        .unwrap_or(true);
    if !completed {
        return HistoryState::Pending;
    }

    let mut images = Vec::new();
    if let Some(outputs) = entry.get("outputs").and_then(|o| o.as_object()) {
        let mut node_ids: Vec<&String> = outputs.keys().collect();
        node_ids.sort_by_key(|id| id.parse::<u64>().unwrap_or(u64::MAX));
        for node_id in node_ids {
            let Some(node_images) = outputs[node_id].get("images").and_then(|i| i.as_array())
            else {
                continue;
            };
            images.extend(
                node_images
                    .iter()
                    .filter_map(|img| serde_json::from_value::<OutputImage>(img.clone()).ok()),
            );
        }
    }
    HistoryState::Completed(images)
}

/// Pull the `exception_message` out of an `execution_error` status message.
fn error_message(status: Option<&serde_json::Value>) -> String {
    status
        .and_then(|s| s.get("messages"))
        .and_then(|m| m.as_array())
        .and_then(|messages| {
            messages.iter().find_map(|msg| {
                let pair = msg.as_array()?;
                if pair.first()?.as_str()? != "execution_error" {
                    return None;
                }
                pair.get(1)?
                    .get("exception_message")?
                    .as_str()
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| "ComfyUI reported an execution error".to_string())
}
