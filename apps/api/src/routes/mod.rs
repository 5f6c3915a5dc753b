pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::reply::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/generate-reply", post(handlers::handle_generate_reply))
        .route("/generate-response", post(handlers::handle_generate_reply))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::oracle::rest::{vertex_endpoint, RestTransport};
    use crate::oracle::testing::RecordingOracle;
    use crate::oracle::token::{AccessToken, StaticTokenProvider};
    use crate::oracle::CompletionOracle;
    use crate::reply::catalog::PromptCatalog;
    use crate::reply::gateway::{compose, CompletionGateway, CompositionMode};

    fn router_with(oracle: Arc<dyn CompletionOracle>, mode: CompositionMode) -> Router {
        build_router(AppState {
            gateway: Arc::new(CompletionGateway::new(
                Arc::new(PromptCatalog::builtin()),
                oracle,
                mode,
            )),
        })
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_reports_running() {
        let router = router_with(Arc::new(RecordingOracle::echo()), CompositionMode::Inline);
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Customer Support AI API is running.");
    }

    #[tokio::test]
    async fn test_both_generate_paths_return_reply() {
        for path in ["/generate-reply", "/generate-response"] {
            let oracle = Arc::new(RecordingOracle::echo());
            let router = router_with(oracle.clone(), CompositionMode::Inline);

            let (status, body) = send(
                router,
                post_json(path, r#"{"prompt": "hello", "category": "etc"}"#),
            )
            .await;

            assert_eq!(status, StatusCode::OK, "{path}");
            assert!(body["reply"].as_str().unwrap().contains("hello"));
            assert_eq!(oracle.calls().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_is_client_error_without_upstream_call() {
        let oracle = Arc::new(RecordingOracle::echo());
        let router = router_with(oracle.clone(), CompositionMode::Inline);

        let (status, body) = send(router, post_json("/generate-reply", r#"{"prompt": ""}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_structured_client_error() {
        let oracle = Arc::new(RecordingOracle::echo());
        let router = router_with(oracle.clone(), CompositionMode::Inline);

        let (status, body) = send(router, post_json("/generate-reply", "{not json")).await;

        assert!(status.is_client_error());
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_category_still_succeeds() {
        let oracle = Arc::new(RecordingOracle::replying("Thanks for writing in."));
        let router = router_with(oracle, CompositionMode::SystemInstruction);

        let (status, body) = send(
            router,
            post_json(
                "/generate-reply",
                r#"{"prompt": "where is my reward", "category": "mystery"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Thanks for writing in.");
    }

    #[tokio::test]
    async fn test_whitespace_reply_is_empty_success() {
        let oracle = Arc::new(RecordingOracle::replying(" \n\t "));
        let router = router_with(oracle, CompositionMode::Inline);

        let (status, body) =
            send(router, post_json("/generate-reply", r#"{"prompt": "hello"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_generic_server_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let http = crate::oracle::http_client(Duration::from_secs(5)).unwrap();
        let transport = RestTransport::new(
            http,
            vertex_endpoint(Some(&base_url), "p1", "r1", "google", "m1"),
            Arc::new(StaticTokenProvider::new(AccessToken::new("t").unwrap())),
        );
        let router = router_with(Arc::new(transport), CompositionMode::Inline);

        let (status, body) =
            send(router, post_json("/generate-reply", r#"{"prompt": "hello"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "An internal server error occurred");
        assert!(body["error"].get("detail").is_none());
    }

    #[tokio::test]
    async fn test_rest_rate_limit_surfaces_as_server_error_after_one_attempt() {
        let mut server = mockito::Server::new_async().await;
        let path = "/v1/projects/p1/locations/r1/publishers/google/models/m1:generateContent";
        let mock = server
            .mock("POST", path)
            .with_status(429)
            .with_body(r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#)
            .expect(1)
            .create_async()
            .await;

        let http = crate::oracle::http_client(Duration::from_secs(5)).unwrap();
        let transport = RestTransport::new(
            http,
            vertex_endpoint(Some(&server.url()), "p1", "r1", "google", "m1"),
            Arc::new(StaticTokenProvider::new(AccessToken::new("t").unwrap())),
        );
        let router = router_with(Arc::new(transport), CompositionMode::Inline);

        let (status, body) =
            send(router, post_json("/generate-reply", r#"{"prompt": "hello"}"#)).await;

        assert!(status.is_server_error());
        assert!(body.get("reply").is_none());
        assert!(body["error"]["detail"]
            .as_str()
            .unwrap()
            .contains("RESOURCE_EXHAUSTED"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rest_five_star_instruction_reaches_upstream_body() {
        let mut server = mockito::Server::new_async().await;
        let path = "/v1/projects/p1/locations/r1/publishers/google/models/m1:generateContent";
        let catalog = PromptCatalog::builtin();
        let expected = compose(
            catalog.lookup(Some("review_5_star")),
            "Love it",
            CompositionMode::Inline,
        );
        let mock = server
            .mock("POST", path)
            .match_body(mockito::Matcher::Json(json!({
                "contents": [{"role": "user", "parts": [{"text": expected.text}]}]
            })))
            .with_status(200)
            .with_body(
                json!({"candidates": [{"content": {"parts": [{"text": "Thank you so much!"}]}}]})
                    .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let http = crate::oracle::http_client(Duration::from_secs(5)).unwrap();
        let transport = RestTransport::new(
            http,
            vertex_endpoint(Some(&server.url()), "p1", "r1", "google", "m1"),
            Arc::new(StaticTokenProvider::new(AccessToken::new("t").unwrap())),
        );
        let router = router_with(Arc::new(transport), CompositionMode::Inline);

        let (status, body) = send(
            router,
            post_json(
                "/generate-reply",
                r#"{"prompt": "Love it", "category": "review_5_star"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Thank you so much!");
        mock.assert_async().await;
    }
}
