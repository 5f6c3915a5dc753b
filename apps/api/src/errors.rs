use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::oracle::GatewayError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Failures never reach the caller as a 200 with error text in `reply`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

const GENERIC_MESSAGE: &str = "An internal server error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Gateway(GatewayError::Auth(e)) => {
                tracing::error!("Credential error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AUTH_ERROR",
                    "Failed to acquire credentials for the model service".to_string(),
                    None,
                )
            }
            AppError::Gateway(GatewayError::UpstreamHttp { status, body }) => {
                tracing::warn!("Upstream HTTP error {status}: {body}");
                // Mirror upstream 5xx; everything else is 502.
                let mirrored = StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (
                    mirrored,
                    "UPSTREAM_HTTP_ERROR",
                    format!("Model service returned status {status}"),
                    Some(body.clone()),
                )
            }
            AppError::Gateway(GatewayError::UpstreamProtocol(msg)) => {
                tracing::error!("Upstream protocol error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_PROTOCOL_ERROR",
                    "Model service returned an unexpected response".to_string(),
                    Some(msg.clone()),
                )
            }
            AppError::Gateway(GatewayError::Timeout) => {
                tracing::error!("Upstream call timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "UPSTREAM_TIMEOUT",
                    "Model service did not respond in time".to_string(),
                    None,
                )
            }
            AppError::Gateway(e @ (GatewayError::Transport(_) | GatewayError::Unknown(_))) => {
                tracing::error!("Gateway error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    GENERIC_MESSAGE.to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(detail) = detail {
            error["detail"] = Value::String(detail);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::token::AuthError;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_is_bad_request() {
        let (status, body) = render(AppError::Validation("prompt cannot be empty".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "prompt cannot be empty");
    }

    #[tokio::test]
    async fn test_upstream_rate_limit_maps_to_bad_gateway_with_body() {
        let (status, body) = render(AppError::Gateway(GatewayError::UpstreamHttp {
            status: 429,
            body: "RESOURCE_EXHAUSTED".into(),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["detail"], "RESOURCE_EXHAUSTED");
    }

    #[tokio::test]
    async fn test_upstream_server_error_status_is_mirrored() {
        let (status, _) = render(AppError::Gateway(GatewayError::UpstreamHttp {
            status: 503,
            body: "overloaded".into(),
        }))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_auth_error_is_server_error() {
        let (status, body) = render(AppError::Gateway(GatewayError::Auth(AuthError::new(
            "gcloud missing",
        ))))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "AUTH_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_error_does_not_leak_detail() {
        let (status, body) = render(AppError::Gateway(GatewayError::Unknown(
            "secret stack trace".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("secret stack trace"));
    }

    #[tokio::test]
    async fn test_timeout_is_gateway_timeout() {
        let (status, body) = render(AppError::Gateway(GatewayError::Timeout)).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["code"], "UPSTREAM_TIMEOUT");
    }

    #[tokio::test]
    async fn test_protocol_error_is_bad_gateway() {
        let (status, body) = render(AppError::Gateway(GatewayError::UpstreamProtocol(
            "response has no candidates".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "UPSTREAM_PROTOCOL_ERROR");
    }
}
