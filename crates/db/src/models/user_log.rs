use genstudio_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Append-only audit entry from the `user_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserLog {
    pub id: DbId,
    pub user_id: String,
    pub action: String,
    pub timestamp: Timestamp,
}
