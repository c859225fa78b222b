//! Durable audit-log persistence.
//!
//! [`UserLogPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and appends every user-scoped [`PlatformEvent`] to `user_logs`, using the
//! event type as the action. Events without a user are skipped.

use genstudio_db::repositories::UserLogRepo;
use genstudio_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

/// Background service that writes user-scoped events to the audit log.
pub struct UserLogPersistence;

impl UserLogPersistence {
    /// Run the persistence loop.
    ///
    /// Exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let Some(user_id) = event.user_id.as_deref() else {
                        continue;
                    };
                    if let Err(e) = UserLogRepo::insert(&pool, user_id, &event.event_type).await {
                        tracing::error!(
                            error = %e,
                            user_id,
                            event_type = %event.event_type,
                            "Failed to persist audit entry"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Audit persistence lagged, some events were not recorded"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, audit persistence shutting down");
                    break;
                }
            }
        }
    }
}
