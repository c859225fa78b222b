use std::path::PathBuf;
use std::time::Duration;

use genstudio_comfyui::workflow::{DEFAULT_PROMPT_NODE, DEFAULT_SEED_NODE};
use genstudio_core::generation::DEFAULT_BATCH_SIZE;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// database URL, which `main` reads separately.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Maximum pooled database connections (default: `20`).
    pub db_max_connections: u32,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for running generations (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Directory holding generated media (default: `generated_content`).
    pub content_root: PathBuf,
    /// Images and videos produced per request (default: `5`).
    pub batch_size: usize,
    pub comfyui: ComfyUIConfig,
}

/// Connection and workflow settings for the image oracle.
#[derive(Debug, Clone)]
pub struct ComfyUIConfig {
    pub url: String,
    /// API-format workflow JSON. The built-in txt2img graph when unset.
    pub workflow_path: Option<PathBuf>,
    pub prompt_node: String,
    pub seed_node: String,
    pub poll_interval_ms: u64,
}

impl ComfyUIConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `8000`                     |
    /// | `DB_MAX_CONNECTIONS`       | `20`                       |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`    | `30`                       |
    /// | `CONTENT_ROOT`             | `generated_content`        |
    /// | `GENERATION_BATCH_SIZE`    | `5`                        |
    /// | `COMFYUI_URL`              | `http://127.0.0.1:8188`    |
    /// | `COMFYUI_WORKFLOW_PATH`    | unset                      |
    /// | `COMFYUI_PROMPT_NODE`      | `6`                        |
    /// | `COMFYUI_SEED_NODE`        | `3`                        |
    /// | `COMFYUI_POLL_INTERVAL_MS` | `500`                      |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "8000")
            .parse()
            .expect("PORT must be a valid u16");

        let db_max_connections: u32 = env_or("DB_MAX_CONNECTIONS", "20")
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", "30")
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let content_root = PathBuf::from(env_or("CONTENT_ROOT", "generated_content"));

        let batch_size: usize = env_or("GENERATION_BATCH_SIZE", &DEFAULT_BATCH_SIZE.to_string())
            .parse()
            .expect("GENERATION_BATCH_SIZE must be a valid usize");
        assert!(batch_size > 0, "GENERATION_BATCH_SIZE must be at least 1");

        let comfyui = ComfyUIConfig {
            url: env_or("COMFYUI_URL", "http://127.0.0.1:8188"),
            workflow_path: std::env::var("COMFYUI_WORKFLOW_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            prompt_node: env_or("COMFYUI_PROMPT_NODE", DEFAULT_PROMPT_NODE),
            seed_node: env_or("COMFYUI_SEED_NODE", DEFAULT_SEED_NODE),
            poll_interval_ms: env_or("COMFYUI_POLL_INTERVAL_MS", "500")
                .parse()
                .expect("COMFYUI_POLL_INTERVAL_MS must be a valid u64"),
        };

        Self {
            host,
            port,
            db_max_connections,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            content_root,
            batch_size,
            comfyui,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
