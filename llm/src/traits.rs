use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ModelId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LLMError {
    /// Timeouts, rate limits, unreachable service. Worth retrying.
    #[error("temporary failure: {0}")]
    Transient(String),
    /// Bad model, bad prompt, bad credentials. Retrying will not help.
    #[error("{0}")]
    Permanent(String),
}

impl LLMError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LLMError::Transient(_))
    }

    pub fn message(&self) -> &str {
        match self {
            LLMError::Transient(msg) | LLMError::Permanent(msg) => msg,
        }
    }
}

/// Validated sampling parameters sent with every request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    max_tokens: u32,
    temperature: f32,
}

impl GenerationParams {
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;
    pub const DEFAULT_TEMPERATURE: f32 = 0.6;

    /// `max_tokens` must be positive and `temperature` within `0.0..=1.0`.
    pub fn new(max_tokens: u32, temperature: f32) -> Result<Self, LLMError> {
        if max_tokens == 0 {
            return Err(LLMError::Permanent("max_tokens must be positive".into()));
        }
        if !(0.0..=1.0).contains(&temperature) {
            return Err(LLMError::Permanent(format!(
                "temperature must be between 0 and 1, got {temperature}"
            )));
        }
        Ok(Self {
            max_tokens,
            temperature,
        })
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }
}

/// One request in, one completion out.
///
/// Implementations return the service's text unmodified and classify every
/// failure as [`LLMError::Transient`] or [`LLMError::Permanent`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(
        &self,
        model: &ModelId,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LLMError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn complete(
        &self,
        model: &ModelId,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LLMError> {
        (**self).complete(model, prompt, params).await
    }
}
