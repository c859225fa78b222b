#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use genstudio_comfyui::workflow::{DEFAULT_PROMPT_NODE, DEFAULT_SEED_NODE};
use genstudio_db::models::content_generation::ContentGeneration;
use genstudio_db::repositories::ContentGenerationRepo;
use genstudio_events::{EventBus, LogNotifier, UserLogPersistence};
use genstudio_pipeline::error::OracleError;
use genstudio_pipeline::images::{ImageGenerator, ImageOracle};
use genstudio_pipeline::videos::VideoGenerator;
use genstudio_pipeline::{GenerationOrchestrator, GenerationTasks};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use genstudio_api::config::{ComfyUIConfig, ServerConfig};
use genstudio_api::router::build_app_router;
use genstudio_api::state::AppState;

/// PNG signature plus the start of an IHDR chunk; enough for format sniffing.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// Oracle double: returns a PNG after `delay`, or fails every call.
pub struct StubOracle {
    pub delay: Duration,
    pub fail: bool,
}

impl StubOracle {
    pub fn ok() -> Self {
        Self {
            delay: Duration::ZERO,
            fail: false,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            delay: Duration::ZERO,
            fail: true,
        }
    }
}

#[async_trait]
impl ImageOracle for StubOracle {
    async fn render(&self, _prompt: &str) -> Result<Vec<u8>, OracleError> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(OracleError::Unavailable("model offline".into()));
        }
        Ok(PNG_BYTES.to_vec())
    }
}

/// Build a test `ServerConfig` with safe defaults rooted at `content_root`.
pub fn test_config(content_root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        db_max_connections: 5,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        content_root: content_root.to_path_buf(),
        batch_size: 5,
        comfyui: ComfyUIConfig {
            url: "http://127.0.0.1:1".to_string(),
            workflow_path: None,
            prompt_node: DEFAULT_PROMPT_NODE.to_string(),
            seed_node: DEFAULT_SEED_NODE.to_string(),
            poll_interval_ms: 10,
        },
    }
}

/// A running application wired to the test database and a temp content root.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub content: TempDir,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with(pool, StubOracle::ok())
}

/// Build the full application router with all middleware layers.
///
/// Mirrors `main.rs`: the audit persistence subscriber and the report
/// logger run in the background.
pub fn build_test_app_with(pool: PgPool, oracle: StubOracle) -> TestApp {
    let content = tempfile::tempdir().unwrap();
    let config = test_config(content.path());

    let event_bus = Arc::new(EventBus::default());
    tokio::spawn(UserLogPersistence::run(pool.clone(), event_bus.subscribe()));

    let orchestrator = GenerationOrchestrator::new(
        Arc::new(pool.clone()),
        ImageGenerator::new(Arc::new(oracle), content.path()),
        VideoGenerator::new(),
        Arc::new(LogNotifier),
        Arc::clone(&event_bus),
    )
    .with_batch_size(config.batch_size);
    let (tasks, reports) = GenerationTasks::new(Arc::new(orchestrator));
    tokio::spawn(genstudio_pipeline::log_reports(reports));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        tasks: Arc::new(tasks),
        event_bus,
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        content,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Poll the store until no record for `user_id` is still `Processing`.
pub async fn wait_for_terminal(pool: &PgPool, user_id: &str) -> Vec<ContentGeneration> {
    for _ in 0..200 {
        let records = ContentGenerationRepo::list_for_user(pool, user_id)
            .await
            .unwrap();
        if !records.is_empty() && records.iter().all(|r| r.status != "Processing") {
            return records;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("generation for {user_id} did not reach a terminal state");
}
