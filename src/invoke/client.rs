//! Bounded remote call: one attempt against an edge function with an
//! enforced wall-clock deadline.

use crate::config::{functions, PipelineConfig};
use crate::errors::PipelineError;
use crate::outline::ParsedDocument;
use async_trait::async_trait;
use std::time::Duration;

/// Issues exactly one timeout-bounded call to a named remote operation.
///
/// Implementations perform no retries and mutate no shared state; retry
/// behavior is layered on by [`crate::invoke::invoke_with_retry`].
#[async_trait]
pub trait EdgeInvoker: Send + Sync {
    /// Posts `body` to `function` and returns the decoded JSON response.
    ///
    /// Fails with [`PipelineError::Timeout`] if the deadline elapses,
    /// [`PipelineError::Transport`] for connection faults and non-2xx
    /// statuses (capturing the response body for diagnostics).
    async fn invoke(
        &self,
        function: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, PipelineError>;
}

/// HTTP implementation over the backend's `/functions/v1/` endpoints.
#[derive(Debug, Clone)]
pub struct HttpEdgeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpEdgeClient {
    /// Creates a client for the given backend.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Creates a client from a pipeline configuration.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    fn function_url(&self, function: &str) -> String {
        format!(
            "{}/functions/v1/{}",
            self.base_url.trim_end_matches('/'),
            function
        )
    }

    /// Extracts plain text from an uploaded document.
    ///
    /// The upload path's collaborator: a single attempt with no retry
    /// budget, since the caller re-submits the file on failure.
    pub async fn parse_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, PipelineError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_owned());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.function_url(functions::PARSE_DOCUMENT))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(PipelineError::connection)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::http(status.as_u16(), body));
        }

        let parsed: ParsedDocument = response
            .json()
            .await
            .map_err(|err| PipelineError::InvalidResponse {
                message: err.to_string(),
            })?;
        Ok(parsed.text)
    }
}

#[async_trait]
impl EdgeInvoker for HttpEdgeClient {
    async fn invoke(
        &self,
        function: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, PipelineError> {
        let response = self
            .http
            .post(self.function_url(function))
            .bearer_auth(&self.api_key)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| classify_send_error(&err, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::http(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|err| PipelineError::connection(err))
    }
}

fn classify_send_error(err: &reqwest::Error, timeout: Duration) -> PipelineError {
    if err.is_timeout() {
        PipelineError::Timeout {
            seconds: timeout.as_secs(),
        }
    } else {
        PipelineError::connection(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn function_urls_tolerate_trailing_slash() {
        let client = HttpEdgeClient::new("https://backend.example/", "key");
        assert_eq!(
            client.function_url(functions::ANALYZE_TRANSCRIPT),
            "https://backend.example/functions/v1/analyze-transcript"
        );
    }

    /// Serves exactly one request with a canned response, then closes.
    async fn one_shot_server(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            // Drain headers plus the declared body before answering, so the
            // client never sees the connection close mid-write.
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if let Some(end) = request
                    .windows(4)
                    .position(|w| w == b"\r\n\r\n")
                    .map(|p| p + 4)
                {
                    let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let content_length = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn parse_document_returns_extracted_text() {
        let base_url = one_shot_server("200 OK", r#"{"text": "contenido extraído"}"#).await;
        let client = HttpEdgeClient::new(base_url, "key");

        let text = client
            .parse_document("notas.pdf", b"%PDF-1.4".to_vec())
            .await
            .unwrap();

        assert_eq!(text, "contenido extraído");
    }

    #[tokio::test]
    async fn parse_document_maps_non_2xx_to_transport() {
        let base_url = one_shot_server(
            "500 Internal Server Error",
            r#"{"error": "unsupported format"}"#,
        )
        .await;
        let client = HttpEdgeClient::new(base_url, "key");

        let err = client
            .parse_document("notas.pdf", b"garbage".to_vec())
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("HTTP 500:"));
    }

    #[tokio::test]
    async fn parse_document_rejects_undecodable_body() {
        let base_url = one_shot_server("200 OK", "not json").await;
        let client = HttpEdgeClient::new(base_url, "key");

        let err = client
            .parse_document("notas.pdf", b"bytes".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidResponse { .. }));
    }
}
