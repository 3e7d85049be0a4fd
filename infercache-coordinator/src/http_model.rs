//! Remote inference backend reached over HTTP.
//!
//! Wire format:
//!
//! ```text
//! POST {endpoint}   {"text": "<payload>"}
//! 200 OK            {"result": "<output>"}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use infercache_core::constants::DEFAULT_MODEL_TIMEOUT;
use infercache_core::error::{InferError, Result};
use infercache_core::traits::InferenceModel;

/// Longest slice of an error body carried into an error message.
const MAX_ERROR_BODY: usize = 256;

#[derive(Serialize)]
struct InferRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct InferResponse {
    result: String,
}

/// Forwards payloads to an external inference server.
///
/// Every transport error, non-2xx status, timeout, or malformed body is
/// reported as [`InferError::ComputeFailure`].
#[derive(Clone, Debug)]
pub struct HttpModel {
    endpoint: reqwest::Url,
    http_client: reqwest::Client,
}

impl HttpModel {
    /// Creates a backend with the default request timeout.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_MODEL_TIMEOUT)
    }

    /// Creates a backend with a custom request timeout.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| InferError::Config(format!("invalid model endpoint '{}': {}", endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(InferError::Config(format!(
                "model endpoint must be http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            http_client,
        })
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl InferenceModel for HttpModel {
    #[instrument(skip(self, input), fields(endpoint = %self.endpoint))]
    async fn infer(&self, input: &str) -> Result<String> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&InferRequest { text: input })
            .send()
            .await
            .map_err(|e| InferError::ComputeFailure(format!("inference backend unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let mut text = response.text().await.unwrap_or_default();
            if let Some((idx, _)) = text.char_indices().nth(MAX_ERROR_BODY) {
                text.truncate(idx);
            }
            return Err(InferError::ComputeFailure(format!(
                "inference backend returned {}: {}",
                status, text
            )));
        }

        let body: InferResponse = response
            .json()
            .await
            .map_err(|e| InferError::ComputeFailure(format!("invalid inference response: {}", e)))?;

        debug!(output_len = body.result.len(), "Remote inference complete");
        Ok(body.result)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn model_for(server: &MockServer) -> HttpModel {
        HttpModel::with_timeout(&format!("{}/infer", server.uri()), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_http_model_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/infer"))
            .and(body_json(json!({ "text": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "HELLO" })))
            .expect(1)
            .mount(&server)
            .await;

        let model = model_for(&server).await;
        assert_eq!(model.infer("hello").await.unwrap(), "HELLO");
        assert_eq!(model.name(), "http");
    }

    #[tokio::test]
    async fn test_http_model_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let model = model_for(&server).await;
        let err = model.infer("hello").await.unwrap_err();
        assert!(matches!(err, InferError::ComputeFailure(_)));
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("model loading"));
    }

    #[tokio::test]
    async fn test_http_model_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "x" })))
            .mount(&server)
            .await;

        let model = model_for(&server).await;
        let err = model.infer("hello").await.unwrap_err();
        assert!(matches!(err, InferError::ComputeFailure(_)));
    }

    #[tokio::test]
    async fn test_http_model_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "result": "late" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let model =
            HttpModel::with_timeout(&format!("{}/infer", server.uri()), Duration::from_millis(50)).unwrap();
        let err = model.infer("hello").await.unwrap_err();
        assert!(matches!(err, InferError::ComputeFailure(_)));
    }

    #[test]
    fn test_http_model_rejects_bad_endpoint() {
        assert!(matches!(HttpModel::new("not a url"), Err(InferError::Config(_))));
        assert!(matches!(HttpModel::new("ftp://host/infer"), Err(InferError::Config(_))));
        assert!(HttpModel::new("http://127.0.0.1:9000/infer").is_ok());
    }
}
