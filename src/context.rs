//! Service context that bundles the generation port with its mode.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::http::HttpGenerationService;
use crate::adapters::recording::generation_service::RecordingGenerationService;
use crate::adapters::replaying::generation_service::ReplayingGenerationService;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::error::AppError;
use crate::ports::GenerationService;

/// Bundles the port trait object used by a session.
pub struct ServiceContext {
    /// Generation service port.
    pub service: Arc<dyn GenerationService>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write the cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<std::path::PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Live HTTP context for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL.
    pub fn live(endpoint: &str) -> Result<Self, AppError> {
        let service = HttpGenerationService::new(endpoint).map_err(AppError::Config)?;
        tracing::debug!(endpoint = %service.endpoint(), "live generation service");
        Ok(Self { service: Arc::new(service) })
    }

    /// Live context whose calls are also written to a cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL.
    pub fn recording(endpoint: &str) -> Result<(Self, RecordingSession), AppError> {
        let live = HttpGenerationService::new(endpoint).map_err(AppError::Config)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = std::path::PathBuf::from(".shotgen/cassettes")
            .join(&timestamp)
            .join("generation_service.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-generation_service"),
            get_commit_hash(),
        )));

        let service = RecordingGenerationService::new(Box::new(live), Arc::clone(&recorder));
        Ok((Self { service: Arc::new(service) }, RecordingSession { recorder }))
    }

    /// Context serving responses from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, AppError> {
        let replayer = load_cassette(path)
            .map_err(|e| AppError::Config(format!("Failed to load cassette: {e}")))?;
        let service = ReplayingGenerationService::new(Arc::new(Mutex::new(replayer)));
        Ok(Self { service: Arc::new(service) })
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
