//! ComfyUI REST client used as the image-generation oracle.
//!
//! Provides the HTTP API wrapper, the txt2img workflow template with
//! prompt injection, and parsing of execution history into output files.

pub mod api;
pub mod history;
pub mod workflow;
