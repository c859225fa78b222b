//! Repository for the `content_generations` table.
//!
//! Terminal updates are keyed by `(user_id, prompt)`, not by record id.
//! Two in-flight requests with the same pair therefore update each other's
//! rows; whichever terminal update runs last wins for both. Records that
//! finished before the updating unit's record was created are not touched.

use genstudio_core::generation::GenerationStatus;
use genstudio_core::types::DbId;
use sqlx::PgPool;

use crate::models::content_generation::{ContentGeneration, FinishGeneration};

const COLUMNS: &str =
    "id, user_id, prompt, status, video_paths, image_paths, generated_at, finished_at";

/// Provides the Content Store operations for generation records.
pub struct ContentGenerationRepo;

impl ContentGenerationRepo {
    /// Insert a new record in `Processing` state, stamped with the current time.
    pub async fn create_processing(
        pool: &PgPool,
        user_id: &str,
        prompt: &str,
    ) -> Result<ContentGeneration, sqlx::Error> {
        let query = format!(
            "INSERT INTO content_generations (user_id, prompt, status, generated_at)
             VALUES ($1, $2, $3, NOW())
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentGeneration>(&query)
            .bind(user_id)
            .bind(prompt)
            .bind(GenerationStatus::Processing.as_str())
            .fetch_one(pool)
            .await
    }

    /// Write the terminal status and path lists for the records matching
    /// `(user_id, prompt)` that are either still `Processing` or were
    /// finished after record `record_id` was created. Returns the number of
    /// rows updated.
    ///
    /// `record_id` is the record the calling unit inserted. Records that
    /// finished before it existed belong to earlier requests and keep their
    /// outcome.
    pub async fn finish(
        pool: &PgPool,
        record_id: DbId,
        user_id: &str,
        prompt: &str,
        outcome: &FinishGeneration,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE content_generations
             SET status = $4, video_paths = $5, image_paths = $6, finished_at = NOW()
             WHERE user_id = $2 AND prompt = $3
               AND (status = $7
                    OR finished_at >= (SELECT generated_at FROM content_generations WHERE id = $1))",
        )
        .bind(record_id)
        .bind(user_id)
        .bind(prompt)
        .bind(outcome.status.as_str())
        .bind(&outcome.video_paths)
        .bind(&outcome.image_paths)
        .bind(GenerationStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List a user's records, newest `generated_at` first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<ContentGeneration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_generations
             WHERE user_id = $1
             ORDER BY generated_at DESC, id DESC"
        );
        sqlx::query_as::<_, ContentGeneration>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find a record by its id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ContentGeneration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_generations WHERE id = $1");
        sqlx::query_as::<_, ContentGeneration>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
