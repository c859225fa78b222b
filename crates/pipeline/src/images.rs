//! Image Generation Adapter.
//!
//! [`ImageGenerator`] asks an [`ImageOracle`] for one image per call and
//! saves each under `{content_root}/{user_id}/images/`. A batch is all or
//! nothing: the first failure deletes whatever the batch already wrote.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use genstudio_comfyui::api::ComfyUIApi;
use genstudio_comfyui::workflow::WorkflowTemplate;
use genstudio_core::naming::{media_dir, media_path, MediaKind};
use tokio::io::AsyncWriteExt;

use crate::error::{GenerationError, OracleError};

// ---------------------------------------------------------------------------
// Oracle seam
// ---------------------------------------------------------------------------

/// Opaque text-to-image model: one encoded image per call.
#[async_trait]
pub trait ImageOracle: Send + Sync {
    async fn render(&self, prompt: &str) -> Result<Vec<u8>, OracleError>;
}

/// Oracle backed by a ComfyUI server running a txt2img workflow.
pub struct ComfyUIOracle {
    api: ComfyUIApi,
    template: WorkflowTemplate,
    poll_interval: Duration,
}

impl ComfyUIOracle {
    pub fn new(api: ComfyUIApi, template: WorkflowTemplate, poll_interval: Duration) -> Self {
        Self {
            api,
            template,
            poll_interval,
        }
    }
}

#[async_trait]
impl ImageOracle for ComfyUIOracle {
    async fn render(&self, prompt: &str) -> Result<Vec<u8>, OracleError> {
        let workflow = self.template.render(prompt);
        let submitted = self.api.submit_workflow(&workflow).await?;
        tracing::debug!(
            prompt_id = %submitted.prompt_id,
            queue_position = submitted.number,
            "Workflow queued on ComfyUI",
        );

        let images = self
            .api
            .wait_for_images(&submitted.prompt_id, self.poll_interval)
            .await?;
        // wait_for_images never returns an empty list.
        let first = images
            .first()
            .ok_or_else(|| OracleError::Unavailable("no output image".into()))?;
        Ok(self.api.view(first).await?)
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Produces batches of saved images for a prompt.
#[derive(Clone)]
pub struct ImageGenerator {
    oracle: Arc<dyn ImageOracle>,
    content_root: PathBuf,
}

impl ImageGenerator {
    pub fn new(oracle: Arc<dyn ImageOracle>, content_root: impl Into<PathBuf>) -> Self {
        Self {
            oracle,
            content_root: content_root.into(),
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// Generate `count` images and return their root-relative paths in order.
    ///
    /// Files are created with `create_new`, so a name collision fails the
    /// batch instead of overwriting an earlier image.
    pub async fn generate(
        &self,
        user_id: &str,
        prompt: &str,
        count: usize,
    ) -> Result<Vec<String>, GenerationError> {
        let dir = media_dir(&self.content_root, user_id, MediaKind::Image);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            let reason = format!("create {}: {e}", dir.display());
            tracing::error!(user_id, error = %reason, "Error generating images");
            return Err(GenerationError::ImageGenerationFailed(reason));
        }

        let mut written = Vec::with_capacity(count);
        for index in 0..count {
            match self.generate_one(user_id, prompt, index).await {
                Ok(path) => written.push(path),
                Err(reason) => {
                    tracing::error!(user_id, index, error = %reason, "Error generating images");
                    self.discard(&written).await;
                    return Err(GenerationError::ImageGenerationFailed(reason));
                }
            }
        }
        Ok(written)
    }

    /// Best-effort removal of previously written images.
    pub async fn discard(&self, paths: &[String]) {
        for path in paths {
            let absolute = self.content_root.join(path);
            if let Err(e) = tokio::fs::remove_file(&absolute).await {
                tracing::warn!(path = %absolute.display(), error = %e, "Failed to remove image");
            }
        }
    }

    async fn generate_one(&self, user_id: &str, prompt: &str, index: usize) -> Result<String, String> {
        let bytes = self.oracle.render(prompt).await.map_err(|e| e.to_string())?;
        if image::guess_format(&bytes).is_err() {
            return Err(OracleError::NotAnImage.to_string());
        }

        let timestamp = chrono::Utc::now().timestamp_micros();
        let relative = media_path(user_id, MediaKind::Image, timestamp, index);
        let absolute = self.content_root.join(&relative);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&absolute)
            .await
            .map_err(|e| format!("open {}: {e}", absolute.display()))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| format!("write {}: {e}", absolute.display()))?;
        file.flush()
            .await
            .map_err(|e| format!("flush {}: {e}", absolute.display()))?;

        Ok(relative)
    }
}
