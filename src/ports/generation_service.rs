//! Generation service port for the remote product-shot API.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::params::AspectRatio;

/// One bundled (image, prompt, ratio) submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// File name of the source image.
    pub file_name: String,
    /// Media type of the source image (e.g., `"image/png"`).
    pub mime_type: String,
    /// Raw source image bytes.
    #[serde(with = "base64_bytes")]
    pub image: Arc<[u8]>,
    /// Scene description.
    pub prompt: String,
    /// Requested output framing.
    pub aspect_ratio: AspectRatio,
}

/// Successful service answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Resolvable reference to the generated image.
    pub image_url: String,
}

/// Boxed future type returned by [`GenerationService::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GenerationResponse, GenerateError>> + Send + 'a>>;

/// Turns a source image and a prompt into a generated image reference.
pub trait GenerationService: Send + Sync {
    /// Submit one generation request.
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_>;
}

/// Serde helper for shared image bytes as base64 strings in cassettes.
mod base64_bytes {
    use std::sync::Arc;

    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Arc<[u8]>, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Arc<[u8]>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(&s)
            .map(Arc::from)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_image_serializes_as_base64() {
        let request = GenerationRequest {
            file_name: "mug.jpg".into(),
            mime_type: "image/jpeg".into(),
            image: Arc::from(vec![0xFF, 0xD8, 0xFF, 0xE0]),
            prompt: "mug on wooden table".into(),
            aspect_ratio: AspectRatio::Square,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["image"], "/9j/4A==");
        assert_eq!(json["aspect_ratio"], "1:1");

        let back: GenerationRequest = serde_json::from_value(json).unwrap();
        assert_eq!(&*back.image, &[0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(back.prompt, "mug on wooden table");
    }

    #[test]
    fn response_ignores_extra_fields() {
        let parsed: GenerationResponse =
            serde_json::from_str(r#"{"success": true, "image_url": "/static/generated/a.png"}"#)
                .unwrap();
        assert_eq!(parsed.image_url, "/static/generated/a.png");
    }
}
