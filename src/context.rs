//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::gemini::GeminiGenerator;
use crate::adapters::recording::image_generator::RecordingImageGenerator;
use crate::adapters::replaying::image_generator::ReplayingImageGenerator;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::error::GenerationError;
use crate::ports::ImageGenerator;

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Image generator port.
    pub generator: Box<dyn ImageGenerator>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write cassette files to disk.
    ///
    /// Every generator sharing the recorder must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, GenerationError> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| {
                GenerationError::Cassette("Recording adapter still has references".into())
            })?
            .into_inner()
            .map_err(|e| GenerationError::Cassette(format!("Recorder lock poisoned: {e}")))?;
        recorder
            .finish()
            .map_err(|e| GenerationError::Cassette(format!("Failed to write cassette: {e}")))
    }
}

impl ServiceContext {
    /// Create a live context, optionally against a non-default API host.
    #[must_use]
    pub fn live(base_url: Option<&str>) -> Self {
        let generator = match base_url {
            Some(url) => GeminiGenerator::with_base_url(url),
            None => GeminiGenerator::new(),
        };
        Self { generator: Box::new(generator) }
    }

    /// Create a recording context that wraps a live adapter with a recorder.
    ///
    /// The cassette is written under `.pixprompt/cassettes/<timestamp>/`.
    #[must_use]
    pub fn recording(base_url: Option<&str>) -> (Self, RecordingSession) {
        let live_ctx = Self::live(base_url);

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = PathBuf::from(".pixprompt/cassettes").join(&timestamp);

        let path = output_dir.join("image_generator.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-image_generator"),
            get_commit_hash(),
        )));

        let recording_gen = RecordingImageGenerator::new(live_ctx.generator, Arc::clone(&recorder));

        let ctx = Self { generator: Box::new(recording_gen) };
        (ctx, RecordingSession { recorder })
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, GenerationError> {
        let replayer = load_cassette(path).map_err(GenerationError::Cassette)?;
        let generator = ReplayingImageGenerator::new(Arc::new(Mutex::new(replayer)));
        Ok(Self { generator: Box::new(generator) })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
