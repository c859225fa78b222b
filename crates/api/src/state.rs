use std::sync::Arc;

use genstudio_events::EventBus;
use genstudio_pipeline::GenerationTasks;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (the Content Store).
    pub pool: genstudio_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Registry of running orchestrator units.
    pub tasks: Arc<GenerationTasks>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
}
