//! Completion gateway: resolve the category instruction, compose the text for
//! the configured composition mode, and make one oracle call.
//!
//! Flow: catalog.lookup → compose → oracle.complete → reply text.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::oracle::{CompletionOracle, ComposedPrompt, GatewayError};
use crate::reply::catalog::PromptCatalog;

/// Section labels for inline composition.
pub const INQUIRY_LABEL: &str = "### Customer inquiry";
pub const ANSWER_LABEL: &str = "### Answer";

/// How the instruction and the caller's text are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionMode {
    /// Instruction on the system channel, caller text verbatim as the user turn.
    SystemInstruction,
    /// Instruction and caller text in one user turn, delimited by labeled sections.
    Inline,
}

impl FromStr for CompositionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" | "system_instruction" => Ok(CompositionMode::SystemInstruction),
            "inline" => Ok(CompositionMode::Inline),
            other => Err(format!(
                "unknown prompt composition '{other}' (expected 'system' or 'inline')"
            )),
        }
    }
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionMode::SystemInstruction => f.write_str("system"),
            CompositionMode::Inline => f.write_str("inline"),
        }
    }
}

/// Combines `instruction` and `user_prompt` per `mode`. Pure.
pub fn compose(instruction: &str, user_prompt: &str, mode: CompositionMode) -> ComposedPrompt {
    match mode {
        CompositionMode::SystemInstruction => ComposedPrompt {
            system_instruction: Some(instruction.to_string()),
            text: user_prompt.to_string(),
        },
        CompositionMode::Inline => ComposedPrompt {
            system_instruction: None,
            text: format!(
                "{instruction}\n\n{INQUIRY_LABEL}\n{user_prompt}\n\n{ANSWER_LABEL}\n"
            ),
        },
    }
}

pub struct CompletionGateway {
    catalog: Arc<PromptCatalog>,
    oracle: Arc<dyn CompletionOracle>,
    composition: CompositionMode,
}

impl CompletionGateway {
    pub fn new(
        catalog: Arc<PromptCatalog>,
        oracle: Arc<dyn CompletionOracle>,
        composition: CompositionMode,
    ) -> Self {
        Self {
            catalog,
            oracle,
            composition,
        }
    }

    /// Generates a reply for `user_prompt`. Unknown categories use the default
    /// instruction. A blank reply from the oracle is returned as an empty string.
    pub async fn generate(
        &self,
        user_prompt: &str,
        category: Option<&str>,
    ) -> Result<String, GatewayError> {
        let span = info_span!(
            "generate",
            request_id = %Uuid::new_v4(),
            category = category.unwrap_or("-"),
            oracle = self.oracle.name()
        );

        async move {
            if let Some(tag) = category.filter(|t| !self.catalog.contains(t)) {
                debug!("Unknown category '{tag}', using default instruction");
            }

            let instruction = self.catalog.lookup(category);
            let composed = compose(instruction, user_prompt, self.composition);

            info!(
                "Composed prompt: composition={}, chars={}",
                self.composition,
                composed.text.chars().count()
            );
            debug!(
                system_instruction = composed.system_instruction.as_deref().unwrap_or(""),
                text = %composed.text,
                "Composed prompt"
            );

            match self.oracle.complete(&composed).await {
                Ok(reply) if reply.trim().is_empty() => {
                    warn!("Oracle returned an empty reply");
                    Ok(String::new())
                }
                Ok(reply) => {
                    info!("Reply generated: chars={}", reply.chars().count());
                    debug!(reply = %reply, "Generated reply");
                    Ok(reply)
                }
                Err(e) => {
                    debug!("Reply generation failed: {e}");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}
