//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod content_generation_repo;
pub mod user_log_repo;
pub mod user_repo;

pub use content_generation_repo::ContentGenerationRepo;
pub use user_log_repo::UserLogRepo;
pub use user_repo::UserRepo;
