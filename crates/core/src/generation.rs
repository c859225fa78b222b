//! Generation request validation and record statuses.
//!
//! A generation record is created as [`GenerationStatus::Processing`] and
//! moves to `Completed` or `Error`. The Content Store's terminal update only
//! matches `Processing` rows (plus rows a concurrent identical request just
//! finished), so a finished record never reverts. Statuses are persisted as
//! their display names (`"Processing"`, `"Completed"`, `"Error"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Number of images and videos produced per accepted request.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Message returned when a request has been accepted for generation.
pub const GENERATION_STARTED_MESSAGE: &str = "Content generation started";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a generation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationStatus {
    Processing,
    Completed,
    Error,
}

impl GenerationStatus {
    /// Persisted / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Processing" => Ok(Self::Processing),
            "Completed" => Ok(Self::Completed),
            "Error" => Ok(Self::Error),
            other => Err(CoreError::Validation(format!(
                "Unknown generation status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of `POST /generate/`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerationRequest {
    #[validate(length(min = 1, message = "prompt must not be empty"))]
    pub prompt: String,
    #[validate(length(min = 1, max = 255, message = "user_id must be 1-255 characters"))]
    pub user_id: String,
    #[serde(default)]
    pub notification_time: Option<String>,
}

impl GenerationRequest {
    /// Validate field constraints and reject whitespace-only prompts.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        if self.prompt.trim().is_empty() {
            return Err(CoreError::Validation(
                "prompt: prompt must not be empty".to_string(),
            ));
        }
        crate::naming::validate_user_segment(&self.user_id)
    }
}

/// Accept response body for `POST /generate/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationAccepted {
    pub message: String,
    pub status: GenerationStatus,
}

impl GenerationAccepted {
    pub fn started() -> Self {
        Self {
            message: GENERATION_STARTED_MESSAGE.to_string(),
            status: GenerationStatus::Processing,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
