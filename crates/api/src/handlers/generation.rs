use axum::extract::State;
use axum::Json;
use genstudio_core::generation::{GenerationAccepted, GenerationRequest};
use genstudio_db::repositories::ContentGenerationRepo;
use genstudio_events::bus::GENERATION_REQUESTED;
use genstudio_events::PlatformEvent;
use genstudio_pipeline::GenerationJob;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /generate/
///
/// Accepts a prompt for asynchronous generation. The `Processing` record
/// is committed before the orchestrator unit is spawned, and the response
/// does not wait for the unit.
pub async fn generate_content(
    State(state): State<AppState>,
    Json(input): Json<GenerationRequest>,
) -> AppResult<Json<GenerationAccepted>> {
    input.check()?;

    let user_dir = state.config.content_root.join(&input.user_id);
    tokio::fs::create_dir_all(&user_dir).await.map_err(|e| {
        AppError::InternalError(format!("Failed to create {}: {e}", user_dir.display()))
    })?;

    let record =
        ContentGenerationRepo::create_processing(&state.pool, &input.user_id, &input.prompt)
            .await?;
    tracing::info!(record_id = record.id, user_id = %record.user_id, "Generation accepted");

    state.event_bus.publish(
        PlatformEvent::new(GENERATION_REQUESTED)
            .with_user(&record.user_id)
            .with_record(record.id)
            .with_payload(json!({ "prompt": record.prompt })),
    );

    state
        .tasks
        .spawn(GenerationJob {
            record_id: record.id,
            user_id: input.user_id,
            prompt: input.prompt,
            notification_time: input.notification_time,
        })
        .await;

    Ok(Json(GenerationAccepted::started()))
}
