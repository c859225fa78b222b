use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use genstudio_comfyui::api::ComfyUIApi;
use genstudio_comfyui::workflow::WorkflowTemplate;
use genstudio_events::{EmailConfig, EmailNotifier, EventBus, LogNotifier, NotificationSink};
use genstudio_pipeline::images::{ComfyUIOracle, ImageGenerator};
use genstudio_pipeline::videos::VideoGenerator;
use genstudio_pipeline::{GenerationOrchestrator, GenerationTasks};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genstudio_api::config::ServerConfig;
use genstudio_api::router::build_app_router;
use genstudio_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "genstudio_api=debug,genstudio_pipeline=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        content_root = %config.content_root.display(),
        batch_size = config.batch_size,
        "Loaded server configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = genstudio_db::create_pool(&database_url, config.db_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    genstudio_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    genstudio_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    tokio::fs::create_dir_all(&config.content_root)
        .await
        .expect("Failed to create content root");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let persistence_handle = tokio::spawn(genstudio_events::UserLogPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));
    tracing::info!("Event bus and audit persistence started");

    // --- Image oracle ---
    let template = match &config.comfyui.workflow_path {
        Some(path) => WorkflowTemplate::from_file(
            path,
            config.comfyui.prompt_node.clone(),
            Some(config.comfyui.seed_node.clone()),
        )
        .await
        .unwrap_or_else(|e| panic!("Failed to load workflow {}: {e}", path.display())),
        None => WorkflowTemplate::default_txt2img(),
    };
    let oracle = ComfyUIOracle::new(
        ComfyUIApi::new(config.comfyui.url.clone()),
        template,
        config.comfyui.poll_interval(),
    );
    tracing::info!(url = %config.comfyui.url, "ComfyUI oracle configured");

    // --- Notifications ---
    let notifier: Arc<dyn NotificationSink> = match EmailConfig::from_env() {
        Some(email) => {
            tracing::info!(smtp_host = %email.smtp_host, "Email notifications enabled");
            Arc::new(EmailNotifier::new(pool.clone(), email))
        }
        None => Arc::new(LogNotifier),
    };

    // --- Generation pipeline ---
    let orchestrator = GenerationOrchestrator::new(
        Arc::new(pool.clone()),
        ImageGenerator::new(Arc::new(oracle), config.content_root.clone()),
        VideoGenerator::new(),
        notifier,
        Arc::clone(&event_bus),
    )
    .with_batch_size(config.batch_size);
    let (tasks, reports) = GenerationTasks::new(Arc::new(orchestrator));
    let tasks = Arc::new(tasks);
    let reporter_handle = tokio::spawn(genstudio_pipeline::log_reports(reports));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        tasks: Arc::clone(&tasks),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let drained = tasks
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;
    if drained {
        tracing::info!("All generations finished");
    } else {
        let abandoned = tasks.in_flight().await;
        tracing::warn!(
            count = abandoned.len(),
            "Abandoning running generations; their records stay Processing",
        );
    }

    // The reporter exits once every report sender is dropped.
    drop(tasks);
    let _ = tokio::time::timeout(Duration::from_secs(5), reporter_handle).await;

    // Drop the event bus sender to close the broadcast channel.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), persistence_handle).await;
    tracing::info!("Event services shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
