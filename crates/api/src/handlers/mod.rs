//! Request handlers. Each delegates to a repository in `genstudio_db` or
//! to the generation pipeline and maps errors via [`AppError`](crate::error::AppError).

pub mod admin;
pub mod content;
pub mod generation;
pub mod landing;
pub mod users;
