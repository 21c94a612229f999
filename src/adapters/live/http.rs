//! Live adapter for the product-shot generation HTTP endpoint.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::GenerateError;
use crate::ports::generation_service::{
    GenerateFuture, GenerationRequest, GenerationResponse, GenerationService,
};

/// Default endpoint of a locally running generation backend.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api/generate";

/// Posts multipart generation requests to a single endpoint.
pub struct HttpGenerationService {
    client: Client,
    endpoint: Url,
}

impl HttpGenerationService {
    /// Create a service targeting `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not an absolute URL.
    pub fn new(endpoint: &str) -> Result<Self, String> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| format!("Invalid endpoint '{endpoint}': {e}"))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    /// The endpoint requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl GenerationService for HttpGenerationService {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let image = Part::bytes(request.image.to_vec())
                .file_name(request.file_name.clone())
                .mime_str(&request.mime_type)?;

            let form = Form::new()
                .part("image", image)
                .text("prompt", request.prompt.clone())
                .text("aspect_ratio", request.aspect_ratio.token());

            tracing::debug!(
                endpoint = %self.endpoint,
                file = %request.file_name,
                bytes = request.image.len(),
                aspect_ratio = %request.aspect_ratio,
                "posting generation request"
            );

            let response = self.client.post(self.endpoint.clone()).multipart(form).send().await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                tracing::debug!(
                    status = status.as_u16(),
                    body = %truncate(&response_text),
                    "generation rejected"
                );
                return Err(GenerateError::Api {
                    status: status.as_u16(),
                    detail: extract_detail(&response_text),
                });
            }

            let parsed: SuccessBody = serde_json::from_str(&response_text).map_err(|e| {
                GenerateError::Malformed(format!(
                    "Failed to parse response: {e}. Body: {}",
                    truncate(&response_text)
                ))
            })?;

            let image_url = resolve_reference(&self.endpoint, &parsed.image_url);
            Ok(GenerationResponse { image_url })
        })
    }
}

/// Resolve a returned image reference against the endpoint.
///
/// Absolute references are returned verbatim; relative ones such as
/// `/static/generated/x.png` are joined onto the endpoint's origin.
#[must_use]
pub fn resolve_reference(endpoint: &Url, reference: &str) -> String {
    if Url::parse(reference).is_ok() {
        return reference.to_string();
    }
    endpoint.join(reference).map_or_else(|_| reference.to_string(), String::from)
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"detail": "..."}` and the list form
/// `{"detail": [{"msg": "..."}, ...]}`.
#[must_use]
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let detail = match parsed.detail? {
        Detail::Text(text) => text,
        Detail::Items(items) => {
            items.into_iter().filter_map(|i| i.msg).collect::<Vec<_>>().join("; ")
        }
    };
    let detail = detail.trim();
    (!detail.is_empty()).then(|| detail.to_string())
}

fn truncate(body: &str) -> String {
    if body.len() > 500 {
        let cut = (0..=500).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

// --- Wire types ---

#[derive(Deserialize)]
struct SuccessBody {
    image_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<Detail>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Text(String),
    Items(Vec<DetailItem>),
}

#[derive(Deserialize)]
struct DetailItem {
    msg: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    use super::*;
    use crate::params::AspectRatio;

    fn endpoint() -> Url {
        Url::parse(DEFAULT_ENDPOINT).unwrap()
    }

    #[test]
    fn absolute_reference_kept_verbatim() {
        assert_eq!(resolve_reference(&endpoint(), "https://x/y.png"), "https://x/y.png");
    }

    #[test]
    fn relative_reference_joined_to_origin() {
        assert_eq!(
            resolve_reference(&endpoint(), "/static/generated/abc_generated.png"),
            "http://localhost:8000/static/generated/abc_generated.png"
        );
    }

    #[test]
    fn detail_string() {
        let detail = extract_detail(r#"{"detail":"invalid prompt"}"#);
        assert_eq!(detail.as_deref(), Some("invalid prompt"));
    }

    #[test]
    fn detail_list_joined() {
        let body =
            r#"{"detail":[{"loc":["body","prompt"],"msg":"field required"},{"msg":"bad ratio"}]}"#;
        assert_eq!(extract_detail(body).as_deref(), Some("field required; bad ratio"));
    }

    #[test]
    fn detail_missing_or_unparseable() {
        assert!(extract_detail(r#"{"error":"boom"}"#).is_none());
        assert!(extract_detail("<html>502 Bad Gateway</html>").is_none());
        assert!(extract_detail(r#"{"detail":""}"#).is_none());
    }

    #[test]
    fn invalid_endpoint_rejected() {
        assert!(HttpGenerationService::new("not a url").is_err());
        assert!(HttpGenerationService::new(DEFAULT_ENDPOINT).is_ok());
    }

    #[test]
    fn truncate_long_bodies() {
        let long = "x".repeat(600);
        let cut = truncate(&long);
        assert_eq!(cut.len(), 503);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate("short"), "short");
    }

    /// Serve one canned HTTP response on a loopback port and hand back the raw
    /// request that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });
        (Url::parse(&format!("http://{addr}/api/generate")).unwrap(), server)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
            if request_complete(&data) {
                break;
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn request_complete(data: &[u8]) -> bool {
        let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&data[..end]).to_ascii_lowercase();
        if head.contains("transfer-encoding: chunked") {
            return data.ends_with(b"0\r\n\r\n");
        }
        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        data.len() >= end + 4 + length
    }

    fn service(endpoint: Url) -> HttpGenerationService {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpGenerationService { client, endpoint }
    }

    fn mug_request() -> GenerationRequest {
        GenerationRequest {
            file_name: "mug.png".into(),
            mime_type: "image/png".into(),
            image: Arc::from(&b"not really a png"[..]),
            prompt: "mug on wooden table".into(),
            aspect_ratio: AspectRatio::Landscape,
        }
    }

    #[tokio::test]
    async fn posts_multipart_fields_and_resolves_relative_reference() {
        let (endpoint, server) =
            serve_once("200 OK", r#"{"image_url":"/static/generated/abc_generated.png"}"#).await;
        let origin = format!("http://{}", endpoint.authority());

        let response = service(endpoint).generate(&mug_request()).await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("POST /api/generate HTTP/1.1"));
        let lowered = request.to_ascii_lowercase();
        assert!(lowered.contains("content-type: multipart/form-data; boundary="));
        assert!(request.contains(r#"name="image"; filename="mug.png""#));
        assert!(request.contains("Content-Type: image/png"));
        assert!(request.contains("not really a png"));
        assert!(request.contains("name=\"prompt\"\r\n\r\nmug on wooden table\r\n"));
        assert!(request.contains("name=\"aspect_ratio\"\r\n\r\n16:9\r\n"));
        assert_eq!(
            response.image_url,
            format!("{origin}/static/generated/abc_generated.png")
        );
    }

    #[tokio::test]
    async fn error_status_carries_detail() {
        let (endpoint, server) =
            serve_once("400 Bad Request", r#"{"detail":"invalid prompt"}"#).await;

        let err = service(endpoint).generate(&mug_request()).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(
            err,
            GenerateError::Api { status: 400, detail: Some(ref d) } if d == "invalid prompt"
        ));
        assert_eq!(err.user_message(), "invalid prompt");
    }

    #[tokio::test]
    async fn success_without_image_url_is_malformed() {
        let (endpoint, server) = serve_once("200 OK", r#"{"status":"ok"}"#).await;

        let err = service(endpoint).generate(&mug_request()).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, GenerateError::Malformed(_)));
        assert_eq!(err.user_message(), crate::error::FALLBACK_MESSAGE);
    }
}
