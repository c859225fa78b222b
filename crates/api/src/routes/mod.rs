pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the application route tree.
///
/// ```text
/// /                                    landing page (GET)
/// /generate/                           accept a generation request (POST)
/// /users/                              register a user (POST)
/// /content/{user_id}                   generation records, newest first (GET)
/// /generated_content/{*file_path}      generated media file (GET)
/// /admin/generations                   running orchestrator units (GET)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::landing::index))
        .route("/generate/", post(handlers::generation::generate_content))
        .route("/users/", post(handlers::users::create_user))
        .route("/content/{user_id}", get(handlers::content::list_content))
        .route(
            "/generated_content/{*file_path}",
            get(handlers::content::serve_generated_file),
        )
        .route("/admin/generations", get(handlers::admin::list_in_flight))
}
