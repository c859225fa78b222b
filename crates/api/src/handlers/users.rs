use axum::extract::State;
use axum::Json;
use genstudio_core::error::CoreError;
use genstudio_core::naming::validate_user_segment;
use genstudio_db::models::user::CreateUser;
use genstudio_db::repositories::UserRepo;
use genstudio_events::bus::USER_CREATED;
use genstudio_events::PlatformEvent;
use validator::Validate;

use crate::error::AppResult;
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /users/
///
/// Registers a user. A duplicate `user_id` is rejected with 409 by the
/// primary key.
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<Json<MessageResponse>> {
    input.validate().map_err(CoreError::from)?;
    validate_user_segment(&input.user_id)?;

    let user = UserRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = %user.user_id, "User registered");

    state
        .event_bus
        .publish(PlatformEvent::new(USER_CREATED).with_user(&user.user_id));

    Ok(Json(MessageResponse {
        message: "User created successfully",
    }))
}
