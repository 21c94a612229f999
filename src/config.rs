//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::adapters::live::http::DEFAULT_ENDPOINT;
use crate::params::AspectRatio;

/// Default upper bound on waiting for the generation service.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Generation service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Initial form values.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Where and how long to talk to the generation service.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Endpoint receiving the multipart request.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Initial form values from the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Aspect ratio selected at startup.
    pub aspect_ratio: AspectRatio,
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// The service endpoint, preferring the `SHOTGEN_ENDPOINT` environment variable.
    #[must_use]
    pub fn endpoint(&self) -> String {
        std::env::var("SHOTGEN_ENDPOINT")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.service.endpoint.clone())
    }

    /// The request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `SHOTGEN_CONFIG` environment variable
/// 3. `~/.config/shotgen/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("SHOTGEN_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/shotgen/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/shotgen/config.toml")
    } else {
        PathBuf::from("shotgen.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.service.endpoint, "http://localhost:8000/api/generate");
        assert_eq!(config.service.timeout_secs, 60);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.defaults.aspect_ratio, AspectRatio::Square);
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.service.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn load_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[service]
endpoint = "https://shots.example.com/api/generate"
timeout_secs = 90

[defaults]
aspect_ratio = "16:9"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.service.endpoint, "https://shots.example.com/api/generate");
        assert_eq!(config.timeout(), Duration::from_secs(90));
        assert_eq!(config.defaults.aspect_ratio, AspectRatio::Landscape);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[service]\ntimeout_secs = 5\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.service.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.service.timeout_secs, 5);
        assert_eq!(config.defaults.aspect_ratio, AspectRatio::Square);
    }

    #[test]
    fn load_invalid_ratio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\naspect_ratio = \"21:9\"\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}
