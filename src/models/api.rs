use serde::{Deserialize, Serialize};

/// Request body for POST /api/v1/text.
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Response after submitting audio or text for processing.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
    /// Whether a result document already exists (always true for text,
    /// only true for audio when the caller opted into synchronous waiting
    /// and the job settled within the wait window).
    pub ready: bool,
    pub message: String,
}

/// Response for querying job status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub job_id: String,
    /// "processing" | "completed" | "error"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
