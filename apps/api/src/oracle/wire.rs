//! Wire schema for `generateContent`, shared by both transports.
//!
//! The response side is strict: every field on the path to the reply text is
//! optional in the schema, and a missing link is reported as
//! [`GatewayError::UpstreamProtocol`] rather than a panic.

use serde::{Deserialize, Serialize};

use super::{ComposedPrompt, GatewayError};

const USER_ROLE: &str = "user";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
    pub parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Part<'a> {
    pub text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    /// A single user turn carrying `text`.
    pub fn user_turn(text: &'a str) -> Self {
        Self {
            contents: vec![Content {
                role: Some(USER_ROLE),
                parts: vec![Part { text }],
            }],
            system_instruction: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: &'a str) -> Self {
        self.system_instruction = Some(Content {
            role: None,
            parts: vec![Part { text: instruction }],
        });
        self
    }

    pub fn from_prompt(prompt: &'a ComposedPrompt) -> Self {
        let request = Self::user_turn(&prompt.text);
        match prompt.system_instruction.as_deref() {
            Some(instruction) => request.with_system_instruction(instruction),
            None => request,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Returns `candidates[0].content.parts[0].text`.
    /// An empty string is a valid reply.
    pub fn reply_text(&self) -> Result<&str, GatewayError> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| GatewayError::UpstreamProtocol("response has no candidates".into()))?;

        let content = candidate.content.as_ref().ok_or_else(|| {
            GatewayError::UpstreamProtocol(format!(
                "first candidate has no content (finish_reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        content
            .parts
            .first()
            .and_then(|part| part.text.as_deref())
            .ok_or_else(|| {
                GatewayError::UpstreamProtocol("first candidate has no text part".into())
            })
    }
}
