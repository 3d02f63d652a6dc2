use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::api::{StatusResponse, SubmitResponse, TextRequest};
use crate::services::orchestrator::result_key;
use crate::services::storage::ObjectStore;

const ALLOWED_EXTENSIONS: &[&str] = &["wav", "mp3", "mp4", "m4a", "flac", "webm", "ogg"];

#[derive(Debug, Deserialize)]
pub struct SubmitQuery {
    /// Block until the job settles (bounded) instead of returning at once.
    #[serde(default)]
    pub wait: bool,
}

/// POST /api/v1/jobs — Upload an audio file for transcription and mapping.
///
/// Staging the audio in the upload bucket is what invokes the primary
/// provider; it watches that bucket and writes its result document on its
/// own. The orchestration task spawned here only supervises the outcome.
pub async fn submit_audio(
    State(state): State<AppState>,
    Query(query): Query<SubmitQuery>,
    mut multipart: Multipart,
) -> Result<Json<SubmitResponse>, StatusCode> {
    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() == Some("audio_file") {
            let filename = field.file_name().unwrap_or("").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            upload = Some((filename, content_type, data.to_vec()));
        }
    }

    let (filename, content_type, audio) = upload.ok_or(StatusCode::BAD_REQUEST)?;
    if audio.is_empty() || !allowed_file(&filename) {
        return Err(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    let job_id = Uuid::new_v4().simple().to_string();
    let filename = sanitize_filename(&filename);
    let audio_key = format!("{job_id}_{filename}");

    state
        .uploads
        .put(&audio_key, &audio, &content_type)
        .await
        .map_err(|e| {
            tracing::error!(job_id = %job_id, error = %e, "failed to stage audio upload");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    metrics::counter!("jobs_submitted_total").increment(1);
    tracing::info!(job_id = %job_id, audio_key = %audio_key, "audio staged; starting orchestration");

    state
        .orchestrator
        .spawn(job_id.clone(), audio, content_type, filename);

    if query.wait {
        return Ok(Json(
            match state.orchestrator.wait_for_result(&job_id).await {
                Some(_) => SubmitResponse {
                    job_id,
                    ready: true,
                    message: "Processing complete.".to_string(),
                },
                None => SubmitResponse {
                    job_id,
                    ready: false,
                    message: "Still processing; poll for status.".to_string(),
                },
            },
        ));
    }

    Ok(Json(SubmitResponse {
        job_id,
        ready: false,
        message: "File uploaded successfully. Processing...".to_string(),
    }))
}

/// POST /api/v1/text — Map raw text to a sign sequence immediately.
pub async fn submit_text(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Result<Json<SubmitResponse>, StatusCode> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let result = state.orchestrator.process_text(text).await.map_err(|e| {
        tracing::error!(error = %e, "failed to persist text result");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(SubmitResponse {
        job_id: result.job_id,
        ready: true,
        message: "Text processed.".to_string(),
    }))
}

/// GET /api/v1/jobs/{job_id} — Check job status.
///
/// A provider-error document is deliberately reported as "processing": the
/// local fallback is (or was) still in flight and may overwrite it. Only
/// the explicit terminal `failed` document surfaces as an error.
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Json<StatusResponse> {
    let document = match state.results.get(&result_key(&job_id)).await {
        Ok(Some(bytes)) => serde_json::from_slice::<Value>(&bytes).ok(),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "status check could not reach result store");
            None
        }
    };

    let response = match document {
        None => StatusResponse {
            job_id,
            status: "processing".to_string(),
            result: None,
            message: Some("Your audio is being processed...".to_string()),
        },
        Some(document) => match document.get("status").and_then(Value::as_str) {
            Some("error") => StatusResponse {
                job_id,
                status: "processing".to_string(),
                result: None,
                message: Some("Primary processing error detected. Retrying locally...".to_string()),
            },
            Some("failed") => {
                let message = document
                    .get("error_message")
                    .and_then(Value::as_str)
                    .unwrap_or("Processing failed.")
                    .to_string();
                StatusResponse {
                    job_id,
                    status: "error".to_string(),
                    result: None,
                    message: Some(message),
                }
            }
            _ => StatusResponse {
                job_id,
                status: "completed".to_string(),
                result: Some(document),
                message: None,
            },
        },
    };

    Json(response)
}

fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Keep the original filename readable in store keys without trusting it.
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "audio".to_string()
    } else {
        cleaned
    }
}
