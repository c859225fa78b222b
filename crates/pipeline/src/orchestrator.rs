//! Generation Orchestrator.
//!
//! Drives one accepted request from `Processing` to a terminal state:
//! image and video generation run concurrently, neither cancels the other,
//! and the joint outcome is written once. Only a recorded completion
//! triggers the notification sink. There is no retry and no timeout.

use std::sync::Arc;

use genstudio_core::generation::{GenerationStatus, DEFAULT_BATCH_SIZE};
use genstudio_core::types::DbId;
use genstudio_db::models::content_generation::FinishGeneration;
use genstudio_events::bus::{GENERATION_COMPLETED, GENERATION_FAILED};
use genstudio_events::{EventBus, NotificationSink, PlatformEvent};
use serde::Serialize;
use tracing::Instrument;

use crate::images::ImageGenerator;
use crate::store::GenerationStore;
use crate::videos::VideoGenerator;

/// Everything an orchestrator unit needs about its request.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    /// Id of the `Processing` record inserted for this request.
    pub record_id: DbId,
    pub user_id: String,
    pub prompt: String,
    pub notification_time: Option<String>,
}

/// Result of one orchestrator unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// Record moved to `Completed` with these paths.
    Completed {
        image_paths: Vec<String>,
        video_paths: Vec<String>,
    },
    /// Record moved to `Error`.
    Failed { reason: String },
    /// The terminal update itself failed; the record is still `Processing`.
    Unrecorded {
        intended: GenerationStatus,
        error: String,
    },
    /// The unit panicked before writing any outcome.
    Aborted { reason: String },
}

impl GenerationOutcome {
    /// Short label for logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
            Self::Unrecorded { .. } => "unrecorded",
            Self::Aborted { .. } => "aborted",
        }
    }
}

pub struct GenerationOrchestrator {
    store: Arc<dyn GenerationStore>,
    images: ImageGenerator,
    videos: VideoGenerator,
    notifier: Arc<dyn NotificationSink>,
    events: Arc<EventBus>,
    batch_size: usize,
}

impl GenerationOrchestrator {
    pub fn new(
        store: Arc<dyn GenerationStore>,
        images: ImageGenerator,
        videos: VideoGenerator,
        notifier: Arc<dyn NotificationSink>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            store,
            images,
            videos,
            notifier,
            events,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the number of images and videos per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run the full workflow for `job` and report what was recorded.
    pub async fn run(&self, job: GenerationJob) -> GenerationOutcome {
        let span = tracing::info_span!(
            "generation",
            record_id = job.record_id,
            user_id = %job.user_id,
        );
        self.run_inner(job).instrument(span).await
    }

    async fn run_inner(&self, job: GenerationJob) -> GenerationOutcome {
        tracing::info!(batch_size = self.batch_size, "Generation started");

        let (images, videos) = tokio::join!(
            self.images.generate(&job.user_id, &job.prompt, self.batch_size),
            self.videos.generate(&job.user_id, &job.prompt, self.batch_size),
        );

        match (images, videos) {
            (Ok(image_paths), Ok(video_paths)) => {
                self.complete(&job, image_paths, video_paths).await
            }
            (images, videos) => {
                let mut reasons = Vec::new();
                match images {
                    Ok(paths) => self.images.discard(&paths).await,
                    Err(e) => reasons.push(e.to_string()),
                }
                if let Err(e) = videos {
                    reasons.push(e.to_string());
                }
                self.fail(&job, reasons.join("; ")).await
            }
        }
    }

    async fn complete(
        &self,
        job: &GenerationJob,
        image_paths: Vec<String>,
        video_paths: Vec<String>,
    ) -> GenerationOutcome {
        let finish = FinishGeneration::completed(image_paths, video_paths);
        match self
            .store
            .finish(job.record_id, &job.user_id, &job.prompt, &finish)
            .await
        {
            Ok(rows) => {
                tracing::info!(
                    rows,
                    images = finish.image_paths.len(),
                    videos = finish.video_paths.len(),
                    "Generation completed",
                );

                if let Err(e) = self
                    .notifier
                    .notify(&job.user_id, job.notification_time.as_deref())
                    .await
                {
                    tracing::warn!(error = %e, "Completion notification failed");
                }

                self.events.publish(
                    PlatformEvent::new(GENERATION_COMPLETED)
                        .with_user(job.user_id.clone())
                        .with_record(job.record_id)
                        .with_payload(serde_json::json!({
                            "image_paths": finish.image_paths,
                            "video_paths": finish.video_paths,
                        })),
                );

                GenerationOutcome::Completed {
                    image_paths: finish.image_paths,
                    video_paths: finish.video_paths,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to record completed generation");
                self.images.discard(&finish.image_paths).await;
                self.fail(job, format!("store update failed: {e}")).await
            }
        }
    }

    async fn fail(&self, job: &GenerationJob, reason: String) -> GenerationOutcome {
        tracing::error!(reason = %reason, "Error processing generation");

        let outcome = match self
            .store
            .finish(
                job.record_id,
                &job.user_id,
                &job.prompt,
                &FinishGeneration::failed(),
            )
            .await
        {
            Ok(_) => GenerationOutcome::Failed {
                reason: reason.clone(),
            },
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to record generation error; record remains Processing",
                );
                GenerationOutcome::Unrecorded {
                    intended: GenerationStatus::Error,
                    error: e.to_string(),
                }
            }
        };

        self.events.publish(
            PlatformEvent::new(GENERATION_FAILED)
                .with_user(job.user_id.clone())
                .with_record(job.record_id)
                .with_payload(serde_json::json!({
                    "reason": reason,
                    "recorded": matches!(outcome, GenerationOutcome::Failed { .. }),
                })),
        );

        outcome
    }
}
