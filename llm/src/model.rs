//! Model identifiers and the catalog of models a backend accepts.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::traits::LLMError;

/// Models served by the hosted chat completions API.
pub const HOSTED_MODELS: &[&str] = &[
    "mistral-large-latest",
    "mistral-medium-latest",
    "mistral-small-latest",
    "ministral-8b-latest",
    "ministral-3b-latest",
    "open-mistral-nemo",
    "open-mistral-7b",
    "open-mixtral-8x7b",
    "open-mixtral-8x22b",
];

pub const DEFAULT_HOSTED_MODEL: &str = "mistral-large-latest";
pub const DEFAULT_OLLAMA_MODEL: &str = "mistral";

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelId(String);

impl ModelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ModelId {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(LLMError::Permanent(format!(
                "invalid model identifier '{s}'"
            )));
        }
        Ok(Self(id.to_string()))
    }
}

impl TryFrom<String> for ModelId {
    type Error = LLMError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which model identifiers a backend will be asked to serve.
///
/// An open catalog accepts any well-formed identifier and leaves the
/// decision to the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelCatalog {
    known: Option<BTreeSet<ModelId>>,
}

impl ModelCatalog {
    pub fn hosted() -> Self {
        Self {
            known: Some(
                HOSTED_MODELS
                    .iter()
                    .map(|name| ModelId(name.to_string()))
                    .collect(),
            ),
        }
    }

    pub fn open() -> Self {
        Self { known: None }
    }

    pub fn with_model(mut self, model: ModelId) -> Self {
        if let Some(known) = self.known.as_mut() {
            known.insert(model);
        }
        self
    }

    pub fn contains(&self, model: &ModelId) -> bool {
        self.known.as_ref().map_or(true, |known| known.contains(model))
    }

    /// Reject identifiers the backend does not serve.
    pub fn check(&self, model: &ModelId) -> Result<(), LLMError> {
        if self.contains(model) {
            Ok(())
        } else {
            Err(LLMError::Permanent(format!("unknown model '{model}'")))
        }
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelId> {
        self.known.iter().flatten()
    }
}
