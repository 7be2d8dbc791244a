//! Retried, validated calls to a [`TextGenerator`].

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ModelCatalog, ModelId};
use crate::retry::RetryPolicy;
use crate::traits::{GenerationParams, LLMError, TextGenerator};

/// A completed suggestion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub prompt_used: String,
    pub model_identifier: ModelId,
    /// Exactly what the service returned.
    pub raw_response_text: String,
    pub timestamp: DateTime<Utc>,
    /// Backend calls made, including the successful one.
    pub attempts: u32,
}

/// Final outcome of a request that did not produce a suggestion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{error} (after {attempts} attempt(s))")]
pub struct SuggestError {
    /// Backend calls made. Zero when the request was rejected locally.
    pub attempts: u32,
    #[source]
    pub error: LLMError,
}

impl SuggestError {
    pub fn retryable(&self) -> bool {
        self.error.is_retryable()
    }
}

pub struct SuggestionClient<G> {
    backend: G,
    catalog: ModelCatalog,
    policy: RetryPolicy,
}

impl<G: TextGenerator> SuggestionClient<G> {
    pub fn new(backend: G, catalog: ModelCatalog) -> Self {
        Self {
            backend,
            catalog,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn backend(&self) -> &G {
        &self.backend
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send `prompt` to `model`, retrying transient failures with backoff.
    ///
    /// Unknown models and blank prompts fail before any call is made.
    /// Permanent failures are returned after the attempt that produced them.
    pub async fn suggest(
        &self,
        prompt: &str,
        model: &ModelId,
        params: &GenerationParams,
    ) -> Result<Suggestion, SuggestError> {
        let rejected = |error| SuggestError { attempts: 0, error };
        self.catalog.check(model).map_err(rejected)?;
        if prompt.trim().is_empty() {
            return Err(rejected(LLMError::Permanent("prompt is empty".into())));
        }

        let max_attempts = self.policy.attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("suggestion attempt {attempt}/{max_attempts} to {model}");
            let call = self.backend.complete(model, prompt, params);
            let result = match tokio::time::timeout(self.policy.timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(LLMError::Transient(format!(
                    "no response within {:?}",
                    self.policy.timeout
                ))),
            };

            match result {
                Ok(text) => {
                    info!("suggestion from {model} after {attempt} attempt(s)");
                    return Ok(Suggestion {
                        prompt_used: prompt.to_string(),
                        model_identifier: model.clone(),
                        raw_response_text: text,
                        timestamp: Utc::now(),
                        attempts: attempt,
                    });
                }
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!("attempt {attempt} failed ({error}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
                Err(error) => {
                    return Err(SuggestError {
                        attempts: attempt,
                        error,
                    })
                }
            }
        }
    }
}
