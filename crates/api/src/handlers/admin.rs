use axum::extract::State;
use axum::Json;
use genstudio_pipeline::InFlightGeneration;

use crate::response::DataResponse;
use crate::state::AppState;

/// GET /admin/generations
///
/// Orchestrator units that have been spawned and have not yet reported,
/// oldest first.
pub async fn list_in_flight(
    State(state): State<AppState>,
) -> Json<DataResponse<Vec<InFlightGeneration>>> {
    Json(DataResponse {
        data: state.tasks.in_flight().await,
    })
}
