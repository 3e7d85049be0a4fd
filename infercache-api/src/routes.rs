//! API route configuration.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::auth;
use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
///
/// Every route requires the `X-API-KEY` header.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Inference
        .route("/predict", post(handlers::predict))
        .route("/predict/", post(handlers::predict))

        // Health check
        .route("/health", get(handlers::health_check))
        .route("/health/", get(handlers::health_check))

        // Cache administration
        .route("/cache/stats", get(handlers::cache_stats))
        .route("/cache", delete(handlers::clear_cache))

        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_api_key))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use infercache_coordinator::TemplateModel;
    use infercache_core::error::{InferError, Result};
    use infercache_core::traits::InferenceModel;

    use crate::state::ApiConfig;

    const KEY: &str = "test-key";

    fn test_config() -> ApiConfig {
        ApiConfig {
            auth_key: Some(KEY.into()),
            ..ApiConfig::default()
        }
    }

    fn test_app() -> Router {
        test_app_with(test_config(), Arc::new(TemplateModel::new()))
    }

    fn test_app_with(config: ApiConfig, model: Arc<dyn InferenceModel>) -> Router {
        create_router(Arc::new(AppState::with_model(config, model)))
    }

    fn predict_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .header("x-api-key", KEY)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Fails the first call, then answers like the template model.
    struct FlakyModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InferenceModel for FlakyModel {
        async fn infer(&self, input: &str) -> Result<String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(InferError::ComputeFailure("model not ready".into()));
            }
            Ok(format!("Processed text: {input}"))
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_app()
            .oneshot(get_request("/health", Some(KEY)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "template");
        assert_eq!(body["cache_ttl_seconds"], 500);
    }

    #[tokio::test]
    async fn test_health_check_trailing_slash() {
        let response = test_app()
            .oneshot(get_request("/health/", Some(KEY)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let response = test_app()
            .oneshot(get_request("/health", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "FORBIDDEN");
        assert_eq!(body["error"]["message"], "Invalid API Key");
    }

    #[tokio::test]
    async fn test_wrong_api_key() {
        let response = test_app()
            .oneshot(get_request("/health", Some("wrong-key")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unconfigured_key_rejects_everything() {
        let app = test_app_with(ApiConfig::default(), Arc::new(TemplateModel::new()));
        let response = app.oneshot(get_request("/health", Some(""))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_predict_miss_then_hit() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(predict_request(r#"{"text": "hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "result": "Processed text: hello", "cache_hit": false })
        );

        let response = app
            .oneshot(predict_request(r#"{"text": "hello"}"#))
            .await
            .unwrap();
        assert_eq!(
            json_body(response).await,
            json!({ "result": "Processed text: hello", "cache_hit": true })
        );
    }

    #[tokio::test]
    async fn test_predict_trailing_slash() {
        let request = Request::builder()
            .method("POST")
            .uri("/predict/")
            .header("content-type", "application/json")
            .header("x-api-key", KEY)
            .body(Body::from(r#"{"text": "hi"}"#))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_predict_requires_api_key() {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text": "hello"}"#))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_predict_empty_text() {
        let response = test_app()
            .oneshot(predict_request(r#"{"text": "   "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_predict_malformed_json() {
        let response = test_app()
            .oneshot(predict_request(r#"{"text": "#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_predict_missing_field() {
        let response = test_app()
            .oneshot(predict_request(r#"{"prompt": "hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_predict_compute_failure_is_not_cached() {
        let app = test_app_with(
            test_config(),
            Arc::new(FlakyModel {
                calls: AtomicUsize::new(0),
            }),
        );

        let response = app
            .clone()
            .oneshot(predict_request(r#"{"text": "hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "COMPUTE_FAILED");

        let response = app
            .oneshot(predict_request(r#"{"text": "hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["cache_hit"], false);
    }

    #[tokio::test]
    async fn test_cache_stats_and_clear() {
        let app = test_app();

        app.clone()
            .oneshot(predict_request(r#"{"text": "hello"}"#))
            .await
            .unwrap();
        app.clone()
            .oneshot(predict_request(r#"{"text": "hello"}"#))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(get_request("/cache/stats", Some(KEY)))
            .await
            .unwrap();
        let stats = json_body(response).await;
        assert_eq!(stats["cache"]["total_entries"], 1);
        assert_eq!(stats["requests"]["hits"], 1);
        assert_eq!(stats["requests"]["misses"], 1);

        let clear = Request::builder()
            .method("DELETE")
            .uri("/cache")
            .header("x-api-key", KEY)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(clear).await.unwrap();
        assert_eq!(json_body(response).await["cleared"], 1);

        let response = app
            .oneshot(predict_request(r#"{"text": "hello"}"#))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["cache_hit"], false);
    }

    #[tokio::test]
    async fn test_clear_requires_api_key() {
        let clear = Request::builder()
            .method("DELETE")
            .uri("/cache")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(clear).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
