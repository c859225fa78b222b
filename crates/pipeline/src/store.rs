//! Terminal-update seam between the orchestrator and the Content Store.

use async_trait::async_trait;
use genstudio_core::types::DbId;
use genstudio_db::models::content_generation::FinishGeneration;
use genstudio_db::repositories::ContentGenerationRepo;
use genstudio_db::DbPool;

/// Writes a record's terminal outcome.
///
/// Implemented for the Postgres pool; tests substitute an in-memory store.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Apply `outcome` to the unfinished records keyed by `(user_id, prompt)`.
    /// `record_id` is the record the calling unit inserted.
    async fn finish(
        &self,
        record_id: DbId,
        user_id: &str,
        prompt: &str,
        outcome: &FinishGeneration,
    ) -> Result<u64, sqlx::Error>;
}

#[async_trait]
impl GenerationStore for DbPool {
    async fn finish(
        &self,
        record_id: DbId,
        user_id: &str,
        prompt: &str,
        outcome: &FinishGeneration,
    ) -> Result<u64, sqlx::Error> {
        ContentGenerationRepo::finish(self, record_id, user_id, prompt, outcome).await
    }
}
