use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// S3-compatible endpoint URL for both buckets
    pub s3_endpoint: String,

    /// S3 region name (custom endpoints usually accept "auto")
    #[serde(default = "default_s3_region")]
    pub s3_region: String,

    /// S3 access key ID
    pub s3_access_key: String,

    /// S3 secret access key
    pub s3_secret_key: String,

    /// Bucket the raw audio is staged into; the primary transcription
    /// provider watches this bucket and writes result documents on its own.
    #[serde(default = "default_upload_bucket")]
    pub upload_bucket: String,

    /// Bucket the result documents land in ({job_id}_result.json)
    #[serde(default = "default_results_bucket")]
    pub results_bucket: String,

    /// Base URL of the external sign video lookup service
    #[serde(default = "default_sign_lookup_base_url")]
    pub sign_lookup_base_url: String,

    /// Timeout for a single external sign lookup request (seconds)
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,

    /// How long to wait for the primary provider before falling back (seconds)
    #[serde(default = "default_result_wait_secs")]
    pub result_wait_secs: u64,

    /// Interval between result-document polls (seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Extra budget granted to synchronous waiters on top of the fallback
    /// window, so a local transcription has time to land (seconds)
    #[serde(default = "default_sync_wait_extra_secs")]
    pub sync_wait_extra_secs: u64,

    /// Path to the Whisper ggml model used by the local fallback engine
    #[serde(default = "default_whisper_model_path")]
    pub whisper_model_path: String,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_s3_region() -> String {
    "auto".to_string()
}

fn default_upload_bucket() -> String {
    "stt-upload-bucket".to_string()
}

fn default_results_bucket() -> String {
    "stt-processed-bucket".to_string()
}

fn default_sign_lookup_base_url() -> String {
    "https://www.signbsl.com".to_string()
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

fn default_result_wait_secs() -> u64 {
    60
}

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_sync_wait_extra_secs() -> u64 {
    120
}

fn default_whisper_model_path() -> String {
    "models/ggml-base.en.bin".to_string()
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
