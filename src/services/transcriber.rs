//! Local fallback transcription engine.
//!
//! Decodes an arbitrary audio byte stream to mono 16 kHz 16-bit PCM with
//! ffmpeg, then runs an offline Whisper recognizer over it. Used only when
//! the primary provider fails to deliver in time. Every failure path
//! collapses to `None` plus a diagnostic log line; nothing leaks past the
//! engine boundary.

use std::future::Future;
use std::os::raw::{c_char, c_void};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use hound::WavReader;
use tokio::process::Command;
use tokio::sync::OnceCell;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Sample rate the recognizer expects.
const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Seam for the orchestrator: anything that can turn staged audio bytes
/// into a transcript, or `None` when it cannot.
pub trait TranscribeEngine: Send + Sync + 'static {
    fn transcribe(
        &self,
        audio: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Option<String>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audio decode failed: {0}")]
    Decode(String),

    #[error("failed to read decoded WAV: {0}")]
    Wav(#[from] hound::Error),

    #[error("speech recognizer unavailable: {0}")]
    Recognizer(String),

    #[error("recognizer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Offline Whisper-backed engine. The model is loaded lazily on first use
/// and shared for the rest of the process lifetime; a missing model file
/// is reported per call, so dropping the model in later fixes itself.
pub struct WhisperTranscriber {
    model_path: PathBuf,
    ctx: OnceCell<Arc<WhisperContext>>,
}

impl WhisperTranscriber {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ctx: OnceCell::new(),
        }
    }

    async fn context(&self) -> Result<&Arc<WhisperContext>, TranscribeError> {
        self.ctx
            .get_or_try_init(|| async {
                let path = self.model_path.clone();
                if !path.is_file() {
                    return Err(TranscribeError::Recognizer(format!(
                        "Whisper model not found at '{}'",
                        path.display()
                    )));
                }
                let path_str = path
                    .to_str()
                    .ok_or_else(|| {
                        TranscribeError::Recognizer("model path is not valid UTF-8".to_string())
                    })?
                    .to_string();

                let ctx = tokio::task::spawn_blocking(move || {
                    init_whisper_logging();
                    WhisperContext::new_with_params(&path_str, WhisperContextParameters::default())
                })
                .await?
                .map_err(|e| TranscribeError::Recognizer(e.to_string()))?;

                Ok(Arc::new(ctx))
            })
            .await
    }

    async fn transcribe_inner(
        &self,
        audio: &[u8],
        content_type: &str,
    ) -> Result<String, TranscribeError> {
        tracing::debug!(
            content_type,
            bytes = audio.len(),
            "transcoding staged audio for local recognition"
        );

        // Scratch files live for the duration of this call only.
        let scratch = tempfile::tempdir()?;
        let in_path = scratch.path().join("input");
        let out_path = scratch.path().join("decoded.wav");
        tokio::fs::write(&in_path, audio).await?;

        let status = Command::new("ffmpeg")
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(&in_path)
            .args(["-ac", "1", "-ar", "16000"])
            .arg(&out_path)
            .status()
            .await
            .map_err(|e| TranscribeError::Decode(format!("ffmpeg not available: {e}")))?;
        if !status.success() {
            return Err(TranscribeError::Decode(format!(
                "ffmpeg exited with {status}"
            )));
        }

        let samples = {
            let wav_path = out_path.clone();
            tokio::task::spawn_blocking(move || samples_from_wav(&wav_path)).await??
        };

        let ctx = Arc::clone(self.context().await?);
        let transcript = tokio::task::spawn_blocking(move || run_recognizer(&ctx, &samples))
            .await?
            .map_err(|e| TranscribeError::Recognizer(e.to_string()))?;

        Ok(transcript)
    }
}

impl TranscribeEngine for WhisperTranscriber {
    fn transcribe(
        &self,
        audio: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Option<String>> + Send {
        async move {
            match self.transcribe_inner(audio, content_type).await {
                Ok(transcript) => {
                    let trimmed = transcript.trim();
                    if trimmed.is_empty() {
                        tracing::warn!("local transcription produced an empty transcript");
                        None
                    } else {
                        tracing::info!(chars = trimmed.len(), "local transcription complete");
                        Some(trimmed.to_string())
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "local transcription failed");
                    None
                }
            }
        }
    }
}

/// Read the decoded WAV and normalize i16 PCM to f32 in [-1.0, 1.0].
fn samples_from_wav(path: &Path) -> Result<Vec<f32>, TranscribeError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels != 1 || spec.sample_rate != TARGET_SAMPLE_RATE || spec.bits_per_sample != 16 {
        return Err(TranscribeError::Decode(format!(
            "unexpected WAV format: {} channel(s), {} Hz, {} bits",
            spec.channels, spec.sample_rate, spec.bits_per_sample
        )));
    }

    let mut samples = Vec::with_capacity(reader.len() as usize);
    for sample in reader.samples::<i16>() {
        let pcm = sample?;
        samples.push(pcm as f32 / i16::MAX as f32);
    }
    Ok(samples)
}

fn run_recognizer(
    ctx: &WhisperContext,
    samples: &[f32],
) -> Result<String, whisper_rs::WhisperError> {
    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_n_threads(num_cpus::get() as i32);
    params.set_language(Some("en"));
    params.set_no_context(true);
    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    let mut state = ctx.create_state()?;
    state.full(params, samples)?;

    let mut transcript = String::new();
    for segment in state.as_iter() {
        transcript.push_str(segment.to_str()?);
        transcript.push(' ');
    }
    Ok(transcript)
}

/// Check whether the external decode tool is on PATH (for health checks).
pub async fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// A no-op log callback used to silence whisper.cpp's stderr chatter.
unsafe extern "C" fn whisper_log_callback(_level: u32, _msg: *const c_char, _data: *mut c_void) {}

fn init_whisper_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    });
}
