//! Client side of the hosted text-generation service.
//!
//! [`TextGenerator`] is the seam every backend implements: the OpenAI-style
//! [`HostedClient`], the local [`OllamaClient`] and the [`ScriptedBackend`]
//! used in tests. [`SuggestionClient`] wraps any of them with model
//! validation, a per-attempt timeout and bounded exponential backoff.

pub mod backend;
pub mod client;
pub mod mock;
pub mod model;
pub mod retry;
pub mod suggest;
pub mod traits;

pub use backend::{BackendKind, HttpBackend};
pub use client::{HostedClient, OllamaClient};
pub use mock::ScriptedBackend;
pub use model::{
    ModelCatalog, ModelId, DEFAULT_HOSTED_MODEL, DEFAULT_OLLAMA_MODEL, HOSTED_MODELS,
};
pub use retry::RetryPolicy;
pub use suggest::{SuggestError, Suggestion, SuggestionClient};
pub use traits::{GenerationParams, LLMError, TextGenerator};
