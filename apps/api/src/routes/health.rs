use axum::Json;
use serde_json::{json, Value};

/// GET /
/// Liveness probe with a fixed status message.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "status": "Customer Support AI API is running."
    }))
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME")
    }))
}
