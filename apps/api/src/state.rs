use std::sync::Arc;

use crate::reply::gateway::CompletionGateway;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup; nothing in it is mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<CompletionGateway>,
}
