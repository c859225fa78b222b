//! Generation record model and DTOs.

use genstudio_core::error::CoreError;
use genstudio_core::generation::GenerationStatus;
use genstudio_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full row from the `content_generations` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct ContentGeneration {
    pub id: DbId,
    pub user_id: String,
    pub prompt: String,
    pub status: String,
    pub video_paths: Vec<String>,
    pub image_paths: Vec<String>,
    pub generated_at: Timestamp,
    /// Time of the terminal update; `None` while `Processing`.
    pub finished_at: Option<Timestamp>,
}

impl ContentGeneration {
    /// Parsed status. Rows are constrained to known values by a CHECK.
    pub fn status(&self) -> Result<GenerationStatus, CoreError> {
        self.status.parse()
    }
}

/// Terminal update applied by the orchestrator.
#[derive(Debug, Clone)]
pub struct FinishGeneration {
    pub status: GenerationStatus,
    pub image_paths: Vec<String>,
    pub video_paths: Vec<String>,
}

impl FinishGeneration {
    pub fn completed(image_paths: Vec<String>, video_paths: Vec<String>) -> Self {
        Self {
            status: GenerationStatus::Completed,
            image_paths,
            video_paths,
        }
    }

    /// Error transition; no paths are persisted.
    pub fn failed() -> Self {
        Self {
            status: GenerationStatus::Error,
            image_paths: Vec::new(),
            video_paths: Vec::new(),
        }
    }
}
