//! Repository for the append-only `user_logs` audit table.

use genstudio_core::types::DbId;
use sqlx::PgPool;

use crate::models::user_log::UserLog;

pub struct UserLogRepo;

impl UserLogRepo {
    /// Append an audit entry. Returns the new row id.
    pub async fn insert(pool: &PgPool, user_id: &str, action: &str) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO user_logs (user_id, action) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(action)
        .fetch_one(pool)
        .await
    }

    /// Audit entries for a user in insertion order.
    pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<UserLog>, sqlx::Error> {
        sqlx::query_as::<_, UserLog>(
            "SELECT id, user_id, action, timestamp FROM user_logs
             WHERE user_id = $1
             ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
