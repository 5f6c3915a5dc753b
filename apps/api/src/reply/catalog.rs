//! Prompt catalog: category tag → role-specific instruction.
//!
//! Built once at startup and read-only afterwards. Lookup never fails; an
//! absent or unknown tag yields the default instruction.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

/// Instruction used when no category matches.
pub const DEFAULT_INSTRUCTION: &str = "You are a customer-support agent for a mobile game; \
    respond helpfully and politely to the following inquiry.";

/// Built-in role scripts. Tags are the values clients send as `category`.
const BUILTIN_PROMPTS: &[(&str, &str)] = &[
    (
        "bug_report",
        "You are a QA support specialist for a mobile game. The user is reporting a bug. \
        Apologize for the inconvenience, thank them for the report, ask for any missing \
        details (device model, OS version, app version, steps to reproduce), and let them \
        know the development team will investigate.",
    ),
    (
        "account_issue",
        "You are an account support specialist for a mobile game. The user has a problem \
        with their account (login, linking, recovery, or lost progress). Reassure them, \
        explain the recovery steps in order, and ask for the identifying information the \
        team needs without requesting passwords.",
    ),
    (
        "billing",
        "You are a billing support specialist for a mobile game. The user has a question \
        or problem about a purchase or payment. Acknowledge the issue, explain how \
        purchase verification and refunds work through the app store, and ask for the \
        order number and purchase date.",
    ),
    (
        "gameplay_question",
        "You are a friendly game guide for a mobile game. The user is asking how \
        something in the game works. Answer clearly and concisely, and point them to \
        in-game help or community resources when useful.",
    ),
    (
        "event_reward",
        "You are an event operations manager for a mobile game. The user is asking about \
        an in-game event or a reward they expected. Explain the event conditions and \
        reward timing, and if a reward is missing, ask for their player ID so the team \
        can check.",
    ),
    (
        "content_suggestion",
        "You are a community manager for a mobile game. The user is suggesting new \
        content or improvements. Thank them sincerely, show that the idea was understood, \
        and let them know it will be shared with the development team without promising \
        a release date.",
    ),
    (
        "review_5_star",
        "You are the communication manager for a mobile game. The user left a positive \
        5-star review. Express heartfelt thanks and write a warm reply inviting them to \
        keep enjoying the game.",
    ),
    (
        "review_4_star_or_below",
        "You are the communication manager for a mobile game. The user left a review of \
        4 stars or fewer without stating a specific complaint. Thank them for playing, \
        acknowledge there is room to improve, and invite them to share what would make \
        the game better.",
    ),
    (
        "etc",
        "You are a customer-support agent for a mobile game. The inquiry does not fit a \
        specific category. Read it carefully, respond politely, and direct the user to \
        the right support channel if you cannot resolve it directly.",
    ),
];

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryPrompt {
    pub tag: String,
    pub instruction: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("category tag must not be empty")]
    EmptyTag,

    #[error("duplicate category tag '{0}'")]
    DuplicateTag(String),

    #[error("instruction for category '{0}' is empty")]
    EmptyInstruction(String),
}

/// On-disk catalog format, e.g.
/// `{"default_instruction": "...", "prompts": [{"tag": "billing", "instruction": "..."}]}`.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    default_instruction: Option<String>,
    prompts: Vec<CategoryPrompt>,
}

#[derive(Debug, Clone)]
pub struct PromptCatalog {
    prompts: HashMap<String, String>,
    default_instruction: String,
}

impl PromptCatalog {
    /// The built-in role scripts.
    pub fn builtin() -> Self {
        Self {
            prompts: BUILTIN_PROMPTS
                .iter()
                .map(|(tag, instruction)| (tag.to_string(), instruction.to_string()))
                .collect(),
            default_instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }

    /// Builds a catalog, rejecting empty or duplicate tags and empty instructions.
    pub fn from_entries(
        default_instruction: String,
        entries: impl IntoIterator<Item = CategoryPrompt>,
    ) -> Result<Self, CatalogError> {
        let mut prompts = HashMap::new();
        for entry in entries {
            let tag = entry.tag.trim().to_string();
            if tag.is_empty() {
                return Err(CatalogError::EmptyTag);
            }
            if entry.instruction.trim().is_empty() {
                return Err(CatalogError::EmptyInstruction(tag));
            }
            if prompts.contains_key(&tag) {
                return Err(CatalogError::DuplicateTag(tag));
            }
            prompts.insert(tag, entry.instruction);
        }

        Ok(Self {
            prompts,
            default_instruction,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).context("Prompt catalog is not valid JSON")?;
        let default_instruction = file
            .default_instruction
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string());
        Ok(Self::from_entries(default_instruction, file.prompts)?)
    }

    /// Loads a catalog file, replacing the built-in role scripts entirely.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt catalog {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Invalid prompt catalog {}", path.display()))
    }

    /// Instruction for `tag`, or the default instruction.
    pub fn lookup(&self, tag: Option<&str>) -> &str {
        tag.and_then(|t| self.prompts.get(t.trim()))
            .map(String::as_str)
            .unwrap_or(self.default_instruction.as_str())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.prompts.contains_key(tag.trim())
    }

    pub fn default_instruction(&self) -> &str {
        &self.default_instruction
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
