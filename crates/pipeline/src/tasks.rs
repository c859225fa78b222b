//! Supervised registry of in-flight orchestrator units.
//!
//! Each accepted request becomes one tracked task. While it runs it is
//! listed by [`GenerationTasks::in_flight`]; when it ends, its outcome is
//! sent as a [`TaskReport`] on the report channel, including panics. On
//! shutdown the tracker is closed and running units get a bounded wait.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use genstudio_core::types::{DbId, Timestamp};
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tokio_util::task::TaskTracker;

use crate::orchestrator::{GenerationJob, GenerationOrchestrator, GenerationOutcome};

/// Operator view of a running unit.
#[derive(Debug, Clone, Serialize)]
pub struct InFlightGeneration {
    pub record_id: DbId,
    pub user_id: String,
    pub prompt: String,
    pub started_at: Timestamp,
}

/// Sent once per unit when it finishes.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub record_id: DbId,
    pub user_id: String,
    pub outcome: GenerationOutcome,
    pub elapsed: Duration,
}

pub struct GenerationTasks {
    orchestrator: Arc<GenerationOrchestrator>,
    tracker: TaskTracker,
    in_flight: Arc<RwLock<HashMap<DbId, InFlightGeneration>>>,
    reports: mpsc::UnboundedSender<TaskReport>,
}

impl GenerationTasks {
    /// Create the registry and the receiving end of its report channel.
    pub fn new(
        orchestrator: Arc<GenerationOrchestrator>,
    ) -> (Self, mpsc::UnboundedReceiver<TaskReport>) {
        let (reports, receiver) = mpsc::unbounded_channel();
        let tasks = Self {
            orchestrator,
            tracker: TaskTracker::new(),
            in_flight: Arc::new(RwLock::new(HashMap::new())),
            reports,
        };
        (tasks, receiver)
    }

    /// Register `job` as in flight and start its orchestrator unit.
    ///
    /// Registration completes before this returns, so the unit is visible
    /// to [`in_flight`](Self::in_flight) as soon as the caller responds.
    pub async fn spawn(&self, job: GenerationJob) {
        let record_id = job.record_id;
        let user_id = job.user_id.clone();

        self.in_flight.write().await.insert(
            record_id,
            InFlightGeneration {
                record_id,
                user_id: user_id.clone(),
                prompt: job.prompt.clone(),
                started_at: chrono::Utc::now(),
            },
        );

        let orchestrator = Arc::clone(&self.orchestrator);
        let in_flight = Arc::clone(&self.in_flight);
        let reports = self.reports.clone();

        self.tracker.spawn(async move {
            let started = Instant::now();
            // Run on a child task so a panic is caught as a JoinError.
            let outcome = match tokio::spawn(async move { orchestrator.run(job).await }).await {
                Ok(outcome) => outcome,
                Err(e) => GenerationOutcome::Aborted {
                    reason: e.to_string(),
                },
            };

            in_flight.write().await.remove(&record_id);
            // The receiver is gone only during shutdown.
            let _ = reports.send(TaskReport {
                record_id,
                user_id,
                outcome,
                elapsed: started.elapsed(),
            });
        });
    }

    /// Snapshot of running units, oldest first.
    pub async fn in_flight(&self) -> Vec<InFlightGeneration> {
        let mut units: Vec<_> = self.in_flight.read().await.values().cloned().collect();
        units.sort_by_key(|u| (u.started_at, u.record_id));
        units
    }

    /// Stop accepting work and wait up to `timeout` for running units.
    ///
    /// Returns `true` if every unit finished in time. Units still running
    /// afterwards keep their records in `Processing`.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let remaining = self.tracker.len();
        if remaining > 0 {
            tracing::info!(remaining, "Waiting for in-flight generations");
        }
        tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok()
    }
}

/// Drain the report channel, logging each finished unit.
///
/// Exits once every sender is dropped.
pub async fn log_reports(mut receiver: mpsc::UnboundedReceiver<TaskReport>) {
    while let Some(report) = receiver.recv().await {
        let elapsed_ms = report.elapsed.as_millis() as u64;
        match &report.outcome {
            GenerationOutcome::Completed { .. } | GenerationOutcome::Failed { .. } => {
                tracing::info!(
                    record_id = report.record_id,
                    user_id = %report.user_id,
                    outcome = report.outcome.label(),
                    elapsed_ms,
                    "Generation unit finished",
                );
            }
            GenerationOutcome::Unrecorded { error, .. } => {
                tracing::error!(
                    record_id = report.record_id,
                    user_id = %report.user_id,
                    error = %error,
                    elapsed_ms,
                    "Generation unit finished but its outcome was not recorded",
                );
            }
            GenerationOutcome::Aborted { reason } => {
                tracing::error!(
                    record_id = report.record_id,
                    user_id = %report.user_id,
                    reason = %reason,
                    elapsed_ms,
                    "Generation unit aborted",
                );
            }
        }
    }
}
