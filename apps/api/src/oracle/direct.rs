//! Direct-handle transport: obtain a model handle by name, optionally bind a
//! system instruction, submit text, read back the reply.
//!
//! Authenticates with an API key header against the public generative-language API.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;

use super::wire::GenerateContentRequest;
use super::{exchange, CompletionOracle, ComposedPrompt, GatewayError};

pub const DEFAULT_DIRECT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct DirectClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for DirectClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl DirectClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn model<'a>(&'a self, name: &'a str) -> GenerativeModel<'a> {
        GenerativeModel {
            client: self,
            name,
            system_instruction: None,
        }
    }
}

/// A named model bound to a client. Cheap to create per request.
#[derive(Debug)]
pub struct GenerativeModel<'a> {
    client: &'a DirectClient,
    name: &'a str,
    system_instruction: Option<&'a str>,
}

impl<'a> GenerativeModel<'a> {
    pub fn with_system_instruction(mut self, instruction: &'a str) -> Self {
        self.system_instruction = Some(instruction);
        self
    }

    /// Bare names resolve under `models/`; qualified names such as
    /// `tunedModels/abc` are used as given.
    pub fn endpoint(&self) -> String {
        if self.name.contains('/') {
            format!("{}/{}:generateContent", self.client.base_url, self.name)
        } else {
            format!("{}/models/{}:generateContent", self.client.base_url, self.name)
        }
    }

    pub async fn generate_content(&self, text: &str) -> Result<String, GatewayError> {
        let mut body = GenerateContentRequest::user_turn(text);
        if let Some(instruction) = self.system_instruction {
            body = body.with_system_instruction(instruction);
        }

        let request = self
            .client
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.client.api_key);

        exchange(request, &body).await
    }
}

/// [`CompletionOracle`] over a [`DirectClient`] and a fixed model name.
#[derive(Debug, Clone)]
pub struct DirectTransport {
    client: DirectClient,
    model: String,
}

impl DirectTransport {
    pub fn new(client: DirectClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionOracle for DirectTransport {
    async fn complete(&self, prompt: &ComposedPrompt) -> Result<String, GatewayError> {
        let mut model = self.client.model(&self.model);
        if let Some(instruction) = prompt.system_instruction.as_deref() {
            model = model.with_system_instruction(instruction);
        }
        model.generate_content(&prompt.text).await
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}
