use super::Rewriter;
use crate::error::{Error, Result};
use std::sync::{Arc, Mutex};

/// Mock behavior for the mock rewriter
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Answer every call with fixed texts
    Success {
        rewritten: String,
        explanation: String,
    },
    /// Fail every call as the remote service would
    AlwaysError,
    /// Respond without any choices
    NoChoices,
    /// Rewrite successfully, then fail the explanation call
    ExplainError,
    /// Never respond
    Hang,
}

impl Default for MockBehavior {
    fn default() -> Self {
        MockBehavior::Success {
            rewritten: "Mock rewrite".to_string(),
            explanation: "Mock explanation".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriterCall {
    Rewrite {
        language: String,
        code: String,
        instruction: String,
    },
    Explain {
        instruction: String,
        rewritten: String,
    },
}

/// Scripted rewriter for tests. Clones share behavior and recorded calls.
#[derive(Clone, Default)]
pub struct MockRewriter {
    behavior: Arc<Mutex<MockBehavior>>,
    calls: Arc<Mutex<Vec<RewriterCall>>>,
}

impl MockRewriter {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn answering(rewritten: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self::new(MockBehavior::Success {
            rewritten: rewritten.into(),
            explanation: explanation.into(),
        })
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.lock_behavior() = behavior;
    }

    pub fn calls(&self) -> Vec<RewriterCall> {
        self.lock_calls().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    fn lock_behavior(&self) -> std::sync::MutexGuard<'_, MockBehavior> {
        self.behavior.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<RewriterCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: RewriterCall) -> MockBehavior {
        self.lock_calls().push(call);
        self.lock_behavior().clone()
    }
}

#[async_trait::async_trait]
impl Rewriter for MockRewriter {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn rewrite(&self, language: &str, code: &str, instruction: &str) -> Result<String> {
        let behavior = self.record(RewriterCall::Rewrite {
            language: language.to_string(),
            code: code.to_string(),
            instruction: instruction.to_string(),
        });

        match behavior {
            MockBehavior::Success { rewritten, .. } => Ok(rewritten),
            MockBehavior::ExplainError => Ok("Mock rewrite".to_string()),
            MockBehavior::AlwaysError => Err(Error::collaborator(anyhow::anyhow!(
                "Mock rewrite error"
            ))),
            MockBehavior::NoChoices => Err(Error::NoCompletionReceived),
            MockBehavior::Hang => std::future::pending().await,
        }
    }

    async fn explain(&self, instruction: &str, rewritten: &str) -> Result<String> {
        let behavior = self.record(RewriterCall::Explain {
            instruction: instruction.to_string(),
            rewritten: rewritten.to_string(),
        });

        match behavior {
            MockBehavior::Success { explanation, .. } => Ok(explanation),
            MockBehavior::AlwaysError | MockBehavior::ExplainError => Err(Error::collaborator(
                anyhow::anyhow!("Mock explain error"),
            )),
            MockBehavior::NoChoices => Err(Error::NoCompletionReceived),
            MockBehavior::Hang => std::future::pending().await,
        }
    }
}
