//! Captcha solving.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CaptchaError;

/// Reads the text out of a captcha image.
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    /// Returns the characters in the image.
    async fn classify(&self, image: &[u8]) -> Result<String, CaptchaError>;
}

#[derive(Serialize)]
struct OcrRequest {
    image: String,
}

#[derive(Deserialize)]
struct OcrResponse {
    code: Option<String>,
}

/// Solver backed by an OCR HTTP service.
///
/// Posts `{"image": "<base64>"}` and reads `{"code": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpCaptchaSolver {
    client: Client,
    endpoint: String,
}

impl HttpCaptchaSolver {
    /// Creates a solver for the given endpoint.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CaptchaError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CaptchaError::Unavailable(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl CaptchaSolver for HttpCaptchaSolver {
    async fn classify(&self, image: &[u8]) -> Result<String, CaptchaError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&OcrRequest {
                image: STANDARD.encode(image),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptchaError::Unavailable(format!("OCR service returned {status}")));
        }

        let body: OcrResponse = response
            .json()
            .await
            .map_err(|e| CaptchaError::Unreadable(e.to_string()))?;

        let code = body.code.unwrap_or_default().trim().to_string();
        debug!(length = code.len(), "Captcha classified");
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_http_solver_reads_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ocr"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": " ab3d "})))
            .expect(1)
            .mount(&server)
            .await;

        let solver =
            HttpCaptchaSolver::new(format!("{}/ocr", server.uri()), Duration::from_secs(5)).unwrap();

        assert_eq!(solver.classify(b"png").await.unwrap(), "ab3d");
    }

    #[tokio::test]
    async fn test_http_solver_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let solver = HttpCaptchaSolver::new(server.uri(), Duration::from_secs(5)).unwrap();

        assert!(matches!(
            solver.classify(b"png").await,
            Err(CaptchaError::Unavailable(_))
        ));
    }
}
