//! REST transport: bearer-authenticated POST to a versioned `generateContent`
//! endpoint of a regional model host.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::token::TokenProvider;
use super::wire::GenerateContentRequest;
use super::{exchange, CompletionOracle, ComposedPrompt, GatewayError};

/// Builds `{base}/v1/projects/{project}/locations/{region}/publishers/{publisher}/models/{model}:generateContent`.
///
/// `base_url` defaults to the regional host `https://{region}-aiplatform.googleapis.com`.
pub fn vertex_endpoint(
    base_url: Option<&str>,
    project_id: &str,
    region: &str,
    publisher: &str,
    model: &str,
) -> String {
    let base = match base_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => format!("https://{region}-aiplatform.googleapis.com"),
    };
    format!(
        "{base}/v1/projects/{project_id}/locations/{region}/publishers/{publisher}/models/{model}:generateContent"
    )
}

pub struct RestTransport {
    http: Client,
    endpoint: String,
    tokens: Arc<dyn TokenProvider>,
}

impl RestTransport {
    pub fn new(http: Client, endpoint: String, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            endpoint,
            tokens,
        }
    }
}

#[async_trait]
impl CompletionOracle for RestTransport {
    async fn complete(&self, prompt: &ComposedPrompt) -> Result<String, GatewayError> {
        let token = self.tokens.fetch().await?;
        debug!("POST {}", self.endpoint);

        let body = GenerateContentRequest::from_prompt(prompt);
        let request = self.http.post(&self.endpoint).bearer_auth(token.secret());

        exchange(request, &body).await
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}
