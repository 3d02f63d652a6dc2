use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::sign::SignEntry;

/// Status recorded inside a persisted result document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    /// Written by the primary provider when its own pipeline failed.
    /// Callers see "processing" for these documents while the local
    /// fallback gets a chance to overwrite them.
    Error,
    /// Terminal: the primary provider never delivered and the local
    /// fallback failed too. Nothing will overwrite this document.
    Failed,
}

/// Which pipeline produced the transcript behind a result document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
    PrimaryProvider,
    LocalFallback,
    DirectText,
}

/// The canonical result document persisted at `{job_id}_result.json`.
///
/// The primary provider writes documents of the same shape; this type is
/// only used for documents authored locally. Provider documents are read
/// as loose JSON since their optional fields vary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: String,
    pub transcribed_text: String,
    pub sign_sequence: Vec<SignEntry>,
    pub status: JobStatus,
    pub source: TranscriptSource,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
