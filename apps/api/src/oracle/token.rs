//! Bearer credentials for the REST transport.
//!
//! [`TokenProvider`] is the seam: the REST transport only sees `fetch()`, so the
//! CLI shim can be swapped for a native credential library without touching it.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct AuthError(String);

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Trims surrounding whitespace; an empty token is rejected.
    pub fn new(raw: &str) -> Result<Self, AuthError> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(AuthError::new("credential source produced an empty token"));
        }
        Ok(Self(token.to_string()))
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch(&self) -> Result<AccessToken, AuthError>;
}

/// Runs an external auth tool and takes its stdout as the token.
#[derive(Debug, Clone)]
pub struct CommandTokenProvider {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandTokenProvider {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// `gcloud auth print-access-token`
    pub fn gcloud(timeout: Duration) -> Self {
        Self::new(
            "gcloud",
            vec!["auth".to_string(), "print-access-token".to_string()],
            timeout,
        )
    }
}

#[async_trait]
impl TokenProvider for CommandTokenProvider {
    async fn fetch(&self) -> Result<AccessToken, AuthError> {
        debug!("Fetching access token via `{}`", self.program);

        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| {
                AuthError::new(format!(
                    "`{}` did not finish within {}s",
                    self.program,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AuthError::new(format!("failed to run `{}`: {e}", self.program)))?;

        if !output.status.success() {
            return Err(AuthError::new(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        AccessToken::new(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Reads the token from a local credential file on every fetch.
#[derive(Debug, Clone)]
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenProvider for FileTokenProvider {
    async fn fetch(&self) -> Result<AccessToken, AuthError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AuthError::new(format!(
                "failed to read token file {}: {e}",
                self.path.display()
            ))
        })?;
        AccessToken::new(&raw)
    }
}

/// A token supplied once at startup.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn fetch(&self) -> Result<AccessToken, AuthError> {
        Ok(self.token.clone())
    }
}
