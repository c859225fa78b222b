pub mod content_generation;
pub mod user;
pub mod user_log;
