use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

use crate::oracle::direct::DEFAULT_DIRECT_BASE_URL;
use crate::reply::gateway::CompositionMode;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PUBLISHER: &str = "google";

/// A configuration value that must never be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Where the REST transport gets its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// `gcloud auth print-access-token`
    Gcloud,
    File(PathBuf),
    Env(Secret),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleConfig {
    Direct {
        api_key: Secret,
        base_url: String,
    },
    Rest {
        project_id: String,
        region: String,
        publisher: String,
        base_url: Option<String>,
        token_source: TokenSource,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub model_id: String,
    pub oracle: OracleConfig,
    pub composition: CompositionMode,
    pub catalog_path: Option<PathBuf>,
    pub upstream_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| anyhow!("Required environment variable '{key}' is not set"))
        };

        let model_id = require("MODEL_ID")?;
        if is_placeholder(&model_id) {
            bail!("MODEL_ID is still a placeholder ('{model_id}'); set the real model identifier");
        }

        let oracle = match get("ORACLE_TRANSPORT").as_deref().unwrap_or("rest") {
            "direct" => OracleConfig::Direct {
                api_key: Secret(require("GOOGLE_API_KEY")?),
                base_url: get("DIRECT_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_DIRECT_BASE_URL.to_string()),
            },
            "rest" => OracleConfig::Rest {
                project_id: require("PROJECT_ID")?,
                region: require("REGION")?,
                publisher: get("MODEL_PUBLISHER").unwrap_or_else(|| DEFAULT_PUBLISHER.to_string()),
                base_url: get("REST_BASE_URL"),
                token_source: match get("TOKEN_SOURCE").as_deref().unwrap_or("gcloud") {
                    "gcloud" => TokenSource::Gcloud,
                    "file" => TokenSource::File(PathBuf::from(require("TOKEN_FILE")?)),
                    "env" => TokenSource::Env(Secret(require("ACCESS_TOKEN")?)),
                    other => bail!(
                        "TOKEN_SOURCE must be 'gcloud', 'file' or 'env' (got '{other}')"
                    ),
                },
            },
            other => bail!("ORACLE_TRANSPORT must be 'direct' or 'rest' (got '{other}')"),
        };

        // The REST body carries a single turn by default; the direct handle takes a system instruction.
        let composition = match get("PROMPT_COMPOSITION") {
            Some(raw) => raw
                .parse::<CompositionMode>()
                .map_err(|e| anyhow!("PROMPT_COMPOSITION: {e}"))?,
            None => match oracle {
                OracleConfig::Direct { .. } => CompositionMode::SystemInstruction,
                OracleConfig::Rest { .. } => CompositionMode::Inline,
            },
        };

        let timeout_secs = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .context("UPSTREAM_TIMEOUT_SECS must be a positive number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            model_id,
            oracle,
            composition,
            catalog_path: get("PROMPT_CATALOG_PATH").map(PathBuf::from),
            upstream_timeout: Duration::from_secs(timeout_secs),
            port,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Bracketed template values such as `[YOUR-TUNED-MODEL-ID]`.
fn is_placeholder(value: &str) -> bool {
    value.starts_with('[') && value.ends_with(']')
}
