//! Handlers for reading generation records and serving generated media.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use genstudio_core::error::CoreError;
use genstudio_core::naming::{content_type_for_extension, resolve_content_path};
use genstudio_db::models::content_generation::ContentGeneration;
use genstudio_db::repositories::ContentGenerationRepo;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /content/{user_id}
///
/// Every record for the user, newest first. Unknown users get `[]`.
pub async fn list_content(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<ContentGeneration>>> {
    let records = ContentGenerationRepo::list_for_user(&state.pool, &user_id).await?;
    Ok(Json(records))
}

/// GET /generated_content/{*file_path}
///
/// Streams a file from the content root. The path must be relative with
/// only normal components (400 otherwise), and after symlinks are resolved
/// it must still sit under the content root.
pub async fn serve_generated_file(
    State(state): State<AppState>,
    Path(file_path): Path<String>,
) -> AppResult<Response> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "File",
            id: file_path.clone(),
        })
    };

    let candidate = resolve_content_path(&state.config.content_root, &file_path)?;

    let root = canonicalize(&state.config.content_root)
        .await?
        .ok_or_else(not_found)?;
    let resolved = canonicalize(&candidate).await?.ok_or_else(not_found)?;
    if !resolved.starts_with(&root) {
        return Err(AppError::BadRequest(format!(
            "{file_path} resolves outside the content directory"
        )));
    }

    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    let file = tokio::fs::File::open(&resolved)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    let stream = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for_extension(&file_path))
        .header(header::CONTENT_LENGTH, metadata.len().to_string())
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::InternalError(e.to_string()))
}

/// `Ok(None)` when nothing exists at `path`.
async fn canonicalize(path: &std::path::Path) -> AppResult<Option<std::path::PathBuf>> {
    match tokio::fs::canonicalize(path).await {
        Ok(p) => Ok(Some(p)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::InternalError(format!(
            "Failed to resolve {}: {e}",
            path.display()
        ))),
    }
}
