//! Video Generation Stub.
//!
//! Returns synthetic paths under `{user_id}/videos/` without producing or
//! checking any file. A real backend replaces the body of [`VideoGenerator::generate`]
//! and keeps its contract: `count` ordered paths.

use genstudio_core::naming::{media_path, MediaKind};

use crate::error::GenerationError;

#[derive(Debug, Default, Clone, Copy)]
pub struct VideoGenerator;

impl VideoGenerator {
    pub fn new() -> Self {
        Self
    }

    pub async fn generate(
        &self,
        user_id: &str,
        _prompt: &str,
        count: usize,
    ) -> Result<Vec<String>, GenerationError> {
        let paths = (0..count)
            .map(|index| {
                let timestamp = chrono::Utc::now().timestamp_micros();
                media_path(user_id, MediaKind::Video, timestamp, index)
            })
            .collect();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_requested_number_of_ordered_paths() {
        let paths = VideoGenerator::new().generate("u1", "a cat", 5).await.unwrap();
        assert_eq!(paths.len(), 5);
        for (i, path) in paths.iter().enumerate() {
            assert!(path.starts_with("u1/videos/"), "{path}");
            assert!(path.ends_with(&format!("_{i}.mp4")), "{path}");
        }
    }

    #[tokio::test]
    async fn zero_count_is_empty() {
        assert!(VideoGenerator::new().generate("u1", "x", 0).await.unwrap().is_empty());
    }
}
