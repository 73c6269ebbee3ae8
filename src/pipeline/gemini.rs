//! HTTP client for the Generative Language `generateContent` endpoint.
//!
//! One POST per call, no retry. Non-2xx responses are decoded as the Google
//! error envelope (`{"error": {"message": …}}`) so quota and auth messages
//! reach the user unchanged.

use crate::config::TransformConfig;
use crate::error::TransformError;
use crate::pipeline::model::{GenerateContentRequest, GenerateContentResponse, ImageModel};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variables consulted, in order, when no key is configured.
pub const API_KEY_ENV_VARS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

/// [`ImageModel`] backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Build a client from the transform config.
    pub fn from_config(config: &TransformConfig) -> Result<Self, TransformError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint: endpoint_for_model(&config.api_base, &config.model),
            api_key: config.api_key.clone(),
        })
    }

    /// The full `…:generateContent` URL this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Resolve the credential. Read on every call so a key exported after
    /// start-up is still picked up.
    fn api_key(&self) -> String {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return key.clone();
        }
        API_KEY_ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| {
                warn!(
                    "No API key configured (checked {}); sending request without one",
                    API_KEY_ENV_VARS.join(", ")
                );
                String::new()
            })
    }
}

#[async_trait]
impl ImageModel for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, TransformError> {
        debug!("POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, self.api_key())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status.as_u16(), &body);
            warn!("Gemini API returned {}: {}", status, message);
            return Err(TransformError::transport(message));
        }

        serde_json::from_str(&body).map_err(|e| {
            TransformError::transport(format!("Unexpected response from image model: {e}"))
        })
    }
}

/// `{api_base}/models/{model}:generateContent`, tolerating a `models/` prefix.
pub fn endpoint_for_model(api_base: &str, model: &str) -> String {
    let model = model.trim();
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!("{}/models/{}:generateContent", api_base.trim_end_matches('/'), model)
}

/// Message to surface for a non-2xx response.
fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<GoogleError>(body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {status}: {}", body.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_building() {
        assert_eq!(
            endpoint_for_model("https://example.com/v1beta/", "gemini-2.5-flash-image"),
            "https://example.com/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
        assert_eq!(
            endpoint_for_model("https://example.com/v1beta", "models/foo"),
            "https://example.com/v1beta/models/foo:generateContent"
        );
    }

    #[test]
    fn google_error_envelope_passed_through() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(error_message(429, body), "quota exceeded");
    }

    #[test]
    fn non_json_error_body() {
        assert_eq!(error_message(502, "Bad Gateway\n"), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn configured_key_wins() {
        let config = TransformConfig::builder().api_key("k-123").build().unwrap();
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.api_key(), "k-123");
    }

    #[test]
    fn client_endpoint_from_config() {
        let config = TransformConfig::builder()
            .api_base("http://127.0.0.1:9/v1beta")
            .model("test-model")
            .build()
            .unwrap();
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9/v1beta/models/test-model:generateContent"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let config = TransformConfig::builder()
            .api_base("http://127.0.0.1:9/v1beta")
            .api_key("k")
            .api_timeout_secs(5)
            .build()
            .unwrap();
        let client = GeminiClient::from_config(&config).unwrap();
        let req = GenerateContentRequest::image_edit(
            &crate::payload::ImagePayload::new("image/png", "AAEC"),
            "x",
        );
        let err = client.generate_content(&req).await.unwrap_err();
        assert!(matches!(err, TransformError::Transport { ref message } if !message.is_empty()));
    }

    // ── Loopback server ──────────────────────────────────────────────────────

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one HTTP response on a local port. The handle yields the
    /// raw request (head and body) the client sent.
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw);
                if let Some(split) = text.find("\r\n\r\n") {
                    let expected = text[..split]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + expected {
                        break;
                    }
                }
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (format!("http://{addr}/v1beta"), handle)
    }

    fn client_for(api_base: &str) -> GeminiClient {
        let config = TransformConfig::builder()
            .api_base(api_base)
            .model("test-model")
            .api_key("k-loop")
            .api_timeout_secs(10)
            .build()
            .unwrap();
        GeminiClient::from_config(&config).unwrap()
    }

    fn edit_request() -> GenerateContentRequest {
        GenerateContentRequest::image_edit(
            &crate::payload::ImagePayload::new("image/jpeg", "AAEC"),
            "make it formal",
        )
    }

    #[tokio::test]
    async fn success_response_is_decoded_and_request_is_well_formed() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[
            {"text":"here you go"},
            {"inlineData":{"mimeType":"image/png","data":"T1VU"}}
        ]},"finishReason":"STOP"}]}"#;
        let (base, server) = serve_once("200 OK", body).await;

        let resp = client_for(&base).generate_content(&edit_request()).await.unwrap();
        let image = resp.first_image().unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.data, "T1VU");

        let raw = server.await.unwrap();
        let lower = raw.to_ascii_lowercase();
        assert!(raw.starts_with("POST /v1beta/models/test-model:generateContent HTTP/1.1"), "{raw}");
        assert!(lower.contains("x-goog-api-key: k-loop"), "{raw}");
        assert!(lower.contains("content-type: application/json"), "{raw}");

        let (_, json) = raw.split_once("\r\n\r\n").unwrap();
        let sent: serde_json::Value = serde_json::from_str(json).unwrap();
        let parts = &sent["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "AAEC");
        assert_eq!(parts[1]["text"], "make it formal");
    }

    #[tokio::test]
    async fn error_status_surfaces_google_message() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let (base, server) = serve_once("429 Too Many Requests", body).await;

        let err = client_for(&base).generate_content(&edit_request()).await.unwrap_err();
        assert_eq!(err, TransformError::transport("quota exceeded"));
        assert_eq!(err.to_string(), "quota exceeded");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn success_with_non_json_body_is_transport_error() {
        let (base, server) = serve_once("200 OK", "<html>gateway</html>").await;

        let err = client_for(&base).generate_content(&edit_request()).await.unwrap_err();
        assert!(
            matches!(err, TransformError::Transport { ref message } if message.starts_with("Unexpected response")),
            "{err:?}"
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn empty_candidates_reach_caller_as_no_candidate() {
        let (base, server) = serve_once("200 OK", r#"{"candidates":[]}"#).await;

        let resp = client_for(&base).generate_content(&edit_request()).await.unwrap();
        assert_eq!(resp.first_image().unwrap_err(), TransformError::NoCandidate);
        server.await.unwrap();
    }
}
