//! User entity model and DTOs.

use genstudio_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub notification_time: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for registering a user (`POST /users/`).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 255, message = "user_id must be 1-255 characters"))]
    pub user_id: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[serde(default)]
    pub notification_time: Option<String>,
}
