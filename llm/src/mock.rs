//! A scripted stand-in for a real backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::model::ModelId;
use crate::traits::{GenerationParams, LLMError, TextGenerator};

enum Step {
    Reply(String),
    Fail(LLMError),
    Stall(Duration),
}

/// Replays queued replies and failures in order, recording every call.
///
/// Clones share the same script and counters. Once the script runs out,
/// calls fail permanently.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<VecDeque<Step>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, step: Step) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(step);
        }
        self
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Step::Reply(text.into()))
    }

    pub fn fail(self, error: LLMError) -> Self {
        self.push(Step::Fail(error))
    }

    /// Sleep for `delay` and then fail transiently.
    pub fn stall(self, delay: Duration) -> Self {
        self.push(Step::Stall(delay))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedBackend {
    async fn complete(
        &self,
        _model: &ModelId,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let step = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match step {
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::Fail(error)) => Err(error),
            Some(Step::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Err(LLMError::Transient("stalled".into()))
            }
            None => Err(LLMError::Permanent("script exhausted".into())),
        }
    }
}
