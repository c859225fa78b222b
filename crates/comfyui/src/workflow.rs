//! txt2img workflow templates in ComfyUI's API (prompt) format.
//!
//! A template is a node graph with one `CLIPTextEncode` node receiving the
//! user prompt and one `KSampler` node receiving a fresh seed per render.

use std::path::Path;

use rand::Rng;
use serde_json::{json, Value};

/// Node id of the positive prompt in the built-in graph.
pub const DEFAULT_PROMPT_NODE: &str = "6";
/// Node id of the sampler in the built-in graph.
pub const DEFAULT_SEED_NODE: &str = "3";
/// Checkpoint used by the built-in graph.
pub const DEFAULT_CHECKPOINT: &str = "v1-5-pruned-emaonly.safetensors";

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Failed to read workflow file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workflow file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workflow has no node '{node}' with an '{input}' input")]
    MissingNode { node: String, input: &'static str },
}

/// A workflow graph plus the node ids that receive per-render values.
#[derive(Debug, Clone)]
pub struct WorkflowTemplate {
    graph: Value,
    prompt_node: String,
    seed_node: Option<String>,
}

impl WorkflowTemplate {
    /// Wrap an existing graph, checking the target nodes exist.
    pub fn new(
        graph: Value,
        prompt_node: impl Into<String>,
        seed_node: Option<String>,
    ) -> Result<Self, WorkflowError> {
        let template = Self {
            graph,
            prompt_node: prompt_node.into(),
            seed_node,
        };
        template.input_exists(&template.prompt_node, "text")?;
        if let Some(seed) = &template.seed_node {
            template.input_exists(seed, "seed")?;
        }
        Ok(template)
    }

    /// The stock Stable Diffusion 1.5 txt2img graph (512x512, 20 steps).
    pub fn default_txt2img() -> Self {
        Self {
            graph: default_graph(DEFAULT_CHECKPOINT),
            prompt_node: DEFAULT_PROMPT_NODE.to_string(),
            seed_node: Some(DEFAULT_SEED_NODE.to_string()),
        }
    }

    /// Load a graph exported with ComfyUI's "Save (API Format)".
    pub async fn from_file(
        path: &Path,
        prompt_node: impl Into<String>,
        seed_node: Option<String>,
    ) -> Result<Self, WorkflowError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let graph: Value = serde_json::from_str(&raw)?;
        Self::new(graph, prompt_node, seed_node)
    }

    /// Produce a submit-ready graph for `prompt` with a random seed.
    pub fn render(&self, prompt: &str) -> Value {
        let seed: u64 = rand::rng().random_range(0..(1u64 << 53));
        self.render_with_seed(prompt, seed)
    }

    /// Produce a submit-ready graph for `prompt` with the given seed.
    pub fn render_with_seed(&self, prompt: &str, seed: u64) -> Value {
        let mut graph = self.graph.clone();
        if let Some(inputs) = graph
            .get_mut(&self.prompt_node)
            .and_then(|n| n.get_mut("inputs"))
        {
            inputs["text"] = Value::String(prompt.to_string());
        }
        if let Some(seed_node) = &self.seed_node {
            if let Some(inputs) = graph.get_mut(seed_node).and_then(|n| n.get_mut("inputs")) {
                inputs["seed"] = json!(seed);
            }
        }
        graph
    }

    fn input_exists(&self, node: &str, input: &'static str) -> Result<(), WorkflowError> {
        let present = self
            .graph
            .get(node)
            .and_then(|n| n.get("inputs"))
            .and_then(|i| i.as_object())
            .is_some_and(|i| i.contains_key(input));
        if present {
            Ok(())
        } else {
            Err(WorkflowError::MissingNode {
                node: node.to_string(),
                input,
            })
        }
    }
}

fn default_graph(checkpoint: &str) -> Value {
    json!({
        "3": {
            "class_type": "KSampler",
            "inputs": {
                "seed": 0,
                "steps": 20,
                "cfg": 7.5,
                "sampler_name": "euler",
                "scheduler": "normal",
                "denoise": 1.0,
                "model": ["4", 0],
                "positive": ["6", 0],
                "negative": ["7", 0],
                "latent_image": ["5", 0]
            }
        },
        "4": {
            "class_type": "CheckpointLoaderSimple",
            "inputs": { "ckpt_name": checkpoint }
        },
        "5": {
            "class_type": "EmptyLatentImage",
            "inputs": { "width": 512, "height": 512, "batch_size": 1 }
        },
        "6": {
            "class_type": "CLIPTextEncode",
            "inputs": { "text": "", "clip": ["4", 1] }
        },
        "7": {
            "class_type": "CLIPTextEncode",
            "inputs": { "text": "", "clip": ["4", 1] }
        },
        "8": {
            "class_type": "VAEDecode",
            "inputs": { "samples": ["3", 0], "vae": ["4", 2] }
        },
        "9": {
            "class_type": "SaveImage",
            "inputs": { "filename_prefix": "genstudio", "images": ["8", 0] }
        }
    })
}
