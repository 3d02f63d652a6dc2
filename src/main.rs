mod app_state;
mod config;
mod models;
mod routes;
mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::lexicon::Lexicon;
use services::orchestrator::{Orchestrator, OrchestratorConfig};
use services::resolver::SignResolver;
use services::storage::S3Store;
use services::transcriber::WhisperTranscriber;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing speech2sign server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("jobs_submitted_total", "Total audio jobs submitted");
    metrics::describe_counter!(
        "jobs_completed_total",
        "Total jobs completed, labeled by transcript source"
    );
    metrics::describe_counter!(
        "jobs_failed_total",
        "Total jobs that reached the terminal failed state"
    );
    metrics::describe_counter!(
        "fallback_invocations_total",
        "Times the local fallback transcription engine was invoked"
    );
    metrics::describe_histogram!(
        "fallback_transcription_seconds",
        "Time spent in local fallback transcription"
    );
    metrics::describe_counter!("sign_lookup_cache_hits_total", "Sign resolver cache hits");

    // Initialize object store clients (one per bucket)
    tracing::info!("Initializing object store clients");
    let uploads = Arc::new(
        S3Store::new(
            &config.upload_bucket,
            &config.s3_endpoint,
            &config.s3_region,
            &config.s3_access_key,
            &config.s3_secret_key,
        )
        .expect("Failed to initialize upload bucket client"),
    );
    let results = Arc::new(
        S3Store::new(
            &config.results_bucket,
            &config.s3_endpoint,
            &config.s3_region,
            &config.s3_access_key,
            &config.s3_secret_key,
        )
        .expect("Failed to initialize results bucket client"),
    );

    // Initialize the sign resolver against the external lookup service
    tracing::info!("Initializing sign resolver");
    let resolver = Arc::new(
        SignResolver::new(
            &config.sign_lookup_base_url,
            Duration::from_secs(config.lookup_timeout_secs),
            Lexicon::global(),
        )
        .expect("Failed to initialize sign resolver"),
    );

    // Initialize the local fallback transcription engine
    tracing::info!(model = %config.whisper_model_path, "Initializing local fallback engine");
    let engine = Arc::new(WhisperTranscriber::new(&config.whisper_model_path));

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&results),
        engine,
        resolver,
        OrchestratorConfig {
            wait_budget: Duration::from_secs(config.result_wait_secs),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            sync_wait_extension: Duration::from_secs(config.sync_wait_extra_secs),
        },
    ));

    let max_upload_bytes = config.max_upload_bytes;
    let bind_addr = config.bind_addr.clone();

    // Create shared application state
    let state = AppState::new(uploads, results, orchestrator, config);

    // Build API routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/v1/jobs", post(routes::jobs::submit_audio))
        .route("/api/v1/jobs/{job_id}", get(routes::jobs::job_status))
        .route("/api/v1/text", post(routes::jobs::submit_text))
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes));

    tracing::info!("Starting speech2sign on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
