use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::orchestrator::Orchestrator;
use crate::services::storage::S3Store;
use crate::services::transcriber::WhisperTranscriber;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub uploads: Arc<S3Store>,
    pub results: Arc<S3Store>,
    pub orchestrator: Arc<Orchestrator<S3Store, WhisperTranscriber>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        uploads: Arc<S3Store>,
        results: Arc<S3Store>,
        orchestrator: Arc<Orchestrator<S3Store, WhisperTranscriber>>,
        config: AppConfig,
    ) -> Self {
        Self {
            uploads,
            results,
            orchestrator,
            config: Arc::new(config),
        }
    }
}
