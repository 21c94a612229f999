//! Error types for shotgen.

use std::time::Duration;

use thiserror::Error;

/// Message shown when a failure carries no usable detail.
pub const FALLBACK_MESSAGE: &str = "Failed to generate image";

/// Errors raised while talking to the generation service.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The service answered with a non-success status.
    #[error("API error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Human-readable detail extracted from the response body, if any.
        detail: Option<String>,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// No response arrived within the request bound.
    #[error("Generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The service answered with a success status but an unusable body.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// A replayed interaction recorded an error.
    #[error("Replayed error: {0}")]
    Replayed(String),
}

impl GenerateError {
    /// The message to show the user for this failure.
    ///
    /// Service-provided detail wins; timeouts get their own wording;
    /// everything else falls back to [`FALLBACK_MESSAGE`].
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { detail: Some(detail), .. } if !detail.trim().is_empty() => detail.clone(),
            Self::Timeout(_) => self.to_string(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Errors raised by the file picker before a file reaches the upload slot.
#[derive(Debug, Error)]
pub enum PickError {
    /// The file extension is not an accepted image type.
    #[error("Unsupported file type '{0}'. Accepted: .jpeg, .jpg, .png, .webp")]
    UnsupportedType(String),

    /// The file exceeds the size ceiling.
    #[error("File is too large ({size} bytes). Maximum is {max} bytes")]
    TooLarge {
        /// Actual file size in bytes.
        size: u64,
        /// Size ceiling in bytes.
        max: u64,
    },

    /// The file could not be read.
    #[error("Could not read {path}: {source}")]
    Read {
        /// The path that was picked.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Top-level application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The picked file was rejected.
    #[error(transparent)]
    Pick(#[from] PickError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The submission was rejected before reaching the network.
    #[error("{0}")]
    Validation(String),

    /// The generation finished without an image.
    #[error("{0}")]
    GenerationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_detail_is_user_message() {
        let err = GenerateError::Api { status: 400, detail: Some("invalid prompt".into()) };
        assert_eq!(err.user_message(), "invalid prompt");
    }

    #[test]
    fn api_without_detail_falls_back() {
        let err = GenerateError::Api { status: 500, detail: None };
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);

        let blank = GenerateError::Api { status: 500, detail: Some("   ".into()) };
        assert_eq!(blank.user_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn timeout_message_names_the_bound() {
        let err = GenerateError::Timeout(Duration::from_secs(60));
        assert_eq!(err.user_message(), "Generation timed out after 60s");
    }

    #[test]
    fn malformed_falls_back() {
        let err = GenerateError::Malformed("missing image_url".into());
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    }
}
