//! Test doubles shared across integration tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use wiremock::MockServer;

use speech2sign::services::lexicon::Lexicon;
use speech2sign::services::orchestrator::OrchestratorConfig;
use speech2sign::services::resolver::SignResolver;
use speech2sign::services::storage::{ObjectStore, StorageError};
use speech2sign::services::transcriber::TranscribeEngine;

/// In-memory stand-in for the S3-compatible result store.
pub struct InMemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

impl ObjectStore for InMemoryStore {
    fn put(
        &self,
        key: &str,
        data: &[u8],
        _content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        self.insert(key, data.to_vec());
        async { Ok(()) }
    }

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send {
        let value = self.get_raw(key);
        async move { Ok(value) }
    }

    fn head(&self, key: &str) -> impl Future<Output = Result<bool, StorageError>> + Send {
        let exists = self.objects.lock().unwrap().contains_key(key);
        async move { Ok(exists) }
    }
}

/// Transcription engine stub with call-count instrumentation.
pub struct StubEngine {
    transcript: Option<String>,
    calls: AtomicUsize,
}

impl StubEngine {
    pub fn returning(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            transcript: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TranscribeEngine for StubEngine {
    fn transcribe(
        &self,
        _audio: &[u8],
        _content_type: &str,
    ) -> impl Future<Output = Option<String>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let transcript = self.transcript.clone();
        async move { transcript }
    }
}

/// A resolver pointed at a fresh mock lookup service. Unmatched requests
/// get a 404, so every token degrades to the lexicon or a placeholder
/// unless the test mounts an explicit mock.
pub async fn mock_resolver() -> (MockServer, SignResolver) {
    let server = MockServer::start().await;
    let resolver = SignResolver::new(&server.uri(), Duration::from_secs(2), Lexicon::global())
        .expect("resolver init");
    (server, resolver)
}

/// Short timing knobs so orchestrator tests settle quickly.
pub fn test_orchestrator_config() -> OrchestratorConfig {
    OrchestratorConfig {
        wait_budget: Duration::from_millis(200),
        poll_interval: Duration::from_millis(25),
        sync_wait_extension: Duration::from_millis(200),
    }
}

/// A lookup page shaped like the external sign service's markup.
pub fn video_page(src: &str) -> String {
    format!(
        "<html><body><div class=\"sign\"><video controls><source src=\"{src}\" type=\"video/mp4\"></video></div></body></html>"
    )
}
