//! In-process oracle for tests: records every composed prompt it receives.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionOracle, ComposedPrompt, GatewayError};

enum Behavior {
    /// Replies with the composed text it was given.
    Echo,
    Reply(String),
    Fail(Box<dyn Fn() -> GatewayError + Send + Sync>),
}

pub(crate) struct RecordingOracle {
    behavior: Behavior,
    calls: Mutex<Vec<ComposedPrompt>>,
}

impl RecordingOracle {
    fn with(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn echo() -> Self {
        Self::with(Behavior::Echo)
    }

    pub(crate) fn replying(text: &str) -> Self {
        Self::with(Behavior::Reply(text.to_string()))
    }

    pub(crate) fn failing(error: impl Fn() -> GatewayError + Send + Sync + 'static) -> Self {
        Self::with(Behavior::Fail(Box::new(error)))
    }

    pub(crate) fn calls(&self) -> Vec<ComposedPrompt> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionOracle for RecordingOracle {
    async fn complete(&self, prompt: &ComposedPrompt) -> Result<String, GatewayError> {
        self.calls.lock().unwrap().push(prompt.clone());
        match &self.behavior {
            Behavior::Echo => Ok(prompt.text.clone()),
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(make_error) => Err(make_error()),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
