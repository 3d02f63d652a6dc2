use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;
use crate::services::storage::ObjectStore;
use crate::services::transcriber;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub object_store: ComponentHealth,
    pub ffmpeg: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

/// GET /health — health check with dependency status.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    // A head probe on any key verifies the results bucket is reachable;
    // whether the key exists is irrelevant here.
    let start = std::time::Instant::now();
    let store_check = match state.results.head("healthcheck").await {
        Ok(_) => ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(_) => ComponentHealth {
            status: "error".to_string(),
            latency_ms: None,
        },
    };

    let ffmpeg_start = std::time::Instant::now();
    let ffmpeg_check = if transcriber::ffmpeg_available().await {
        ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(ffmpeg_start.elapsed().as_millis() as u64),
        }
    } else {
        ComponentHealth {
            status: "error".to_string(),
            latency_ms: None,
        }
    };

    let all_healthy = store_check.status == "ok" && ffmpeg_check.status == "ok";
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if all_healthy {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            object_store: store_check,
            ffmpeg: ffmpeg_check,
        },
    };

    (status_code, Json(response))
}
