//! Oracle client layer: the single point of entry for calls to the hosted model.
//!
//! ARCHITECTURAL RULE: handlers and the gateway never talk HTTP to the model
//! service directly. Both transports live here and implement [`CompletionOracle`].
//!
//! Each call is exactly one attempt. There is no retry or backoff at this layer:
//! a non-2xx status or a body without reply text is a hard failure.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use thiserror::Error;
use tracing::debug;

pub mod direct;
pub mod rest;
#[cfg(test)]
pub(crate) mod testing;
pub mod token;
pub mod wire;

use self::token::AuthError;
use self::wire::{GenerateContentRequest, GenerateContentResponse};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Credential acquisition failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Upstream returned status {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    #[error("Upstream response did not match the expected schema: {0}")]
    UpstreamProtocol(String),

    #[error("Upstream call timed out")]
    Timeout,

    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Unexpected gateway failure: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else if e.is_connect() || e.is_request() {
            GatewayError::Transport(e)
        } else {
            GatewayError::Unknown(e.to_string())
        }
    }
}

/// The material sent to the oracle for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// Routed to the transport's system-instruction field when present.
    pub system_instruction: Option<String>,
    pub text: String,
}

/// A hosted text-completion model: composed prompt in, reply text out.
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    async fn complete(&self, prompt: &ComposedPrompt) -> Result<String, GatewayError>;

    /// Short transport label used in logs.
    fn name(&self) -> &'static str;
}

/// Builds the shared outbound HTTP client. The timeout bounds the whole exchange.
pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

/// Sends one `generateContent` request and extracts `candidates[0].content.parts[0].text`.
pub(crate) async fn exchange(
    request: RequestBuilder,
    body: &GenerateContentRequest<'_>,
) -> Result<String, GatewayError> {
    let response = request.json(body).send().await?;
    let status = response.status();
    let raw = response.text().await?;

    if !status.is_success() {
        debug!("Oracle returned {}: {}", status, raw);
        return Err(GatewayError::UpstreamHttp {
            status: status.as_u16(),
            body: raw,
        });
    }

    let parsed: GenerateContentResponse = serde_json::from_str(&raw)
        .map_err(|e| GatewayError::UpstreamProtocol(format!("response is not valid JSON: {e}")))?;

    let reply = parsed.reply_text()?;
    debug!("Oracle call succeeded: reply_chars={}", reply.chars().count());

    Ok(reply.to_string())
}
