//! Job orchestrator.
//!
//! One orchestration run per submitted audio job: wait for the primary
//! provider's result document to appear in the results bucket, and when it
//! doesn't (or reports an error), transcribe locally, map the transcript to
//! signs and persist the canonical result document. The text path skips the
//! waiting entirely. The orchestrator is the sole local writer of result
//! documents.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;
use uuid::Uuid;

use crate::models::job::{JobResult, JobStatus, TranscriptSource};
use crate::services::mapper::map_text_to_signs;
use crate::services::resolver::SignResolver;
use crate::services::storage::{ObjectStore, StorageError};
use crate::services::transcriber::TranscribeEngine;

/// Timing knobs for the wait/poll/fallback state machine.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Total time to wait for the primary provider before falling back.
    pub wait_budget: Duration,
    /// Interval between result-document polls.
    pub poll_interval: Duration,
    /// Extra budget granted to synchronous waiters beyond `wait_budget`,
    /// covering the local transcription that may still be running.
    pub sync_wait_extension: Duration,
}

/// What a single poll of the results bucket observed.
enum PrimaryPoll {
    /// No document yet (or the store was unreachable; treated the same).
    Missing,
    /// A document with `status: "error"` — the provider's pipeline failed.
    Errored,
    /// A usable document is present.
    Ready,
}

pub struct Orchestrator<S, E> {
    results: Arc<S>,
    engine: Arc<E>,
    resolver: Arc<SignResolver>,
    config: OrchestratorConfig,
}

/// Key of the result document for a job.
pub fn result_key(job_id: &str) -> String {
    format!("{job_id}_result.json")
}

impl<S: ObjectStore, E: TranscribeEngine> Orchestrator<S, E> {
    pub fn new(
        results: Arc<S>,
        engine: Arc<E>,
        resolver: Arc<SignResolver>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            results,
            engine,
            resolver,
            config,
        }
    }

    /// Start a detached, supervised orchestration task for an audio job.
    ///
    /// Fire-and-forget from the caller's perspective: the submission
    /// request returns immediately while this runs to completion. A second
    /// task awaits the join handle so an aborted run is at least logged.
    pub fn spawn(
        self: &Arc<Self>,
        job_id: String,
        audio: Vec<u8>,
        content_type: String,
        original_filename: String,
    ) {
        let orchestrator = Arc::clone(self);
        let supervised_id = job_id.clone();
        let handle = tokio::spawn(async move {
            orchestrator
                .run(&job_id, &audio, &content_type, &original_filename)
                .await;
        });
        tokio::spawn(async move {
            if let Err(e) = handle.await {
                tracing::error!(job_id = %supervised_id, error = %e, "orchestration task aborted");
            }
        });
    }

    /// The per-job state machine: WaitingOnPrimary -> Completed | FallingBack.
    pub async fn run(&self, job_id: &str, audio: &[u8], content_type: &str, original_filename: &str) {
        tracing::info!(
            job_id,
            budget_secs = self.config.wait_budget.as_secs(),
            "waiting for primary provider result"
        );

        let mut waited = Duration::ZERO;
        loop {
            match self.poll_primary(job_id).await {
                PrimaryPoll::Ready => {
                    tracing::info!(job_id, "primary provider result detected");
                    metrics::counter!("jobs_completed_total", "source" => "primary_provider")
                        .increment(1);
                    return;
                }
                PrimaryPoll::Errored => {
                    tracing::warn!(job_id, "primary provider reported an error; falling back early");
                    break;
                }
                PrimaryPoll::Missing => {
                    if waited >= self.config.wait_budget {
                        tracing::warn!(
                            job_id,
                            "primary provider result did not appear in time; falling back"
                        );
                        break;
                    }
                    sleep(self.config.poll_interval).await;
                    waited += self.config.poll_interval;
                }
            }
        }

        self.fall_back(job_id, audio, content_type, original_filename)
            .await;
    }

    /// Direct text path: map immediately and persist a completed document.
    pub async fn process_text(&self, text: &str) -> Result<JobResult, StorageError> {
        let job_id = Uuid::new_v4().simple().to_string();
        let sign_sequence = map_text_to_signs(text, &self.resolver).await;

        let result = JobResult {
            job_id,
            transcribed_text: text.to_string(),
            sign_sequence,
            status: JobStatus::Completed,
            source: TranscriptSource::DirectText,
            created_at: chrono::Utc::now(),
            original_filename: None,
            error_message: None,
        };
        self.persist(&result).await?;

        metrics::counter!("jobs_completed_total", "source" => "direct_text").increment(1);
        Ok(result)
    }

    /// Synchronous waiter: block until the job settles or the extended
    /// budget elapses. A provider-error document means "keep waiting" (the
    /// fallback may still overwrite it); `None` means still processing —
    /// never an error.
    pub async fn wait_for_result(&self, job_id: &str) -> Option<Value> {
        let key = result_key(job_id);
        let budget = self.config.wait_budget + self.config.sync_wait_extension;
        let mut waited = Duration::ZERO;

        while waited < budget {
            if let Ok(Some(bytes)) = self.results.get(&key).await {
                if let Ok(document) = serde_json::from_slice::<Value>(&bytes) {
                    match document.get("status").and_then(Value::as_str) {
                        // Provider error: wait for the fallback overwrite.
                        Some("error") => {}
                        _ => return Some(document),
                    }
                }
                // Unreadable document: keep waiting as well.
            }
            sleep(self.config.poll_interval).await;
            waited += self.config.poll_interval;
        }
        None
    }

    async fn poll_primary(&self, job_id: &str) -> PrimaryPoll {
        let key = result_key(job_id);

        match self.results.head(&key).await {
            Ok(false) => return PrimaryPoll::Missing,
            Ok(true) => {}
            Err(e) => {
                tracing::warn!(job_id, error = %e, "result store unreachable; treating as absent");
                return PrimaryPoll::Missing;
            }
        }

        let bytes = match self.results.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return PrimaryPoll::Missing,
            Err(e) => {
                tracing::warn!(job_id, error = %e, "failed to read result document");
                return PrimaryPoll::Missing;
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(document) => match document.get("status").and_then(Value::as_str) {
                Some("error") => PrimaryPoll::Errored,
                _ => PrimaryPoll::Ready,
            },
            Err(e) => {
                // A document exists but isn't valid JSON; completion is
                // defined by the document's appearance, so count it.
                tracing::warn!(job_id, error = %e, "result document is not valid JSON");
                PrimaryPoll::Ready
            }
        }
    }

    /// FallingBack state: local transcription, then either a completed
    /// document or the explicit terminal failure document. Either write may
    /// overwrite a provider error document — the one sanctioned overwrite.
    async fn fall_back(&self, job_id: &str, audio: &[u8], content_type: &str, original_filename: &str) {
        metrics::counter!("fallback_invocations_total").increment(1);
        tracing::info!(job_id, "invoking local fallback transcription");

        let start = std::time::Instant::now();
        let transcript = self.engine.transcribe(audio, content_type).await;
        metrics::histogram!("fallback_transcription_seconds").record(start.elapsed().as_secs_f64());

        let result = match transcript {
            Some(text) => {
                let sign_sequence = map_text_to_signs(&text, &self.resolver).await;
                JobResult {
                    job_id: job_id.to_string(),
                    transcribed_text: text,
                    sign_sequence,
                    status: JobStatus::Completed,
                    source: TranscriptSource::LocalFallback,
                    created_at: chrono::Utc::now(),
                    original_filename: Some(original_filename.to_string()),
                    error_message: None,
                }
            }
            None => JobResult {
                job_id: job_id.to_string(),
                transcribed_text: String::new(),
                sign_sequence: Vec::new(),
                status: JobStatus::Failed,
                source: TranscriptSource::LocalFallback,
                created_at: chrono::Utc::now(),
                original_filename: Some(original_filename.to_string()),
                error_message: Some(
                    "primary provider did not deliver a result and local transcription failed"
                        .to_string(),
                ),
            },
        };

        match self.persist(&result).await {
            Ok(()) => match result.status {
                JobStatus::Completed => {
                    tracing::info!(job_id, "fallback result persisted");
                    metrics::counter!("jobs_completed_total", "source" => "local_fallback")
                        .increment(1);
                }
                _ => {
                    tracing::warn!(job_id, "terminal failure document persisted");
                    metrics::counter!("jobs_failed_total").increment(1);
                }
            },
            Err(e) => {
                tracing::error!(job_id, error = %e, "failed to persist fallback result");
            }
        }
    }

    /// Durably write the result document before anyone can observe the job
    /// as settled; completion is defined by this document's presence.
    async fn persist(&self, result: &JobResult) -> Result<(), StorageError> {
        let body = serde_json::to_vec(result)?;
        self.results
            .put(&result_key(&result.job_id), &body, "application/json")
            .await
    }
}
