use std::fmt;

use llm::SuggestError;
use prompt::CompositionError;
use records::StoreError;
use thiserror::Error;

/// Where in the pipeline a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Store,
    Composition,
    Suggestion,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Store => "store",
            Stage::Composition => "composition",
            Stage::Suggestion => "suggestion",
        })
    }
}

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("store failed: {0}. {}", hint(store_retryable(.0)))]
    Store(#[from] StoreError),
    #[error("composition failed: {0}. {}", hint(false))]
    Composition(#[from] CompositionError),
    #[error("suggestion failed: {0}. {}", hint(suggestion_retryable(.0)))]
    Suggestion(#[from] SuggestError),
}

fn store_retryable(err: &StoreError) -> bool {
    matches!(err, StoreError::Connection(_))
}

fn suggestion_retryable(err: &SuggestError) -> bool {
    err.retryable()
}

fn hint(retryable: bool) -> &'static str {
    if retryable {
        "Trying again may help"
    } else {
        "Trying again will not help"
    }
}

impl JournalError {
    pub fn stage(&self) -> Stage {
        match self {
            JournalError::Store(_) => Stage::Store,
            JournalError::Composition(_) => Stage::Composition,
            JournalError::Suggestion(_) => Stage::Suggestion,
        }
    }

    /// Whether repeating the same action might succeed.
    pub fn retryable(&self) -> bool {
        match self {
            JournalError::Store(e) => store_retryable(e),
            JournalError::Composition(_) => false,
            JournalError::Suggestion(e) => suggestion_retryable(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::LLMError;

    #[test]
    fn messages_name_the_stage_and_retry_outlook() {
        let err = JournalError::from(SuggestError {
            attempts: 3,
            error: LLMError::Transient("HTTP 429".into()),
        });
        assert_eq!(err.stage(), Stage::Suggestion);
        assert!(err.retryable());
        let text = err.to_string();
        assert!(text.starts_with("suggestion failed:"), "{text}");
        assert!(text.ends_with("Trying again may help"), "{text}");

        let err = JournalError::from(CompositionError::InstructionTooLong {
            length: 10,
            budget: 5,
        });
        assert_eq!(err.stage(), Stage::Composition);
        assert!(!err.retryable());

        let err = JournalError::from(StoreError::NotFound(7));
        assert_eq!(err.stage(), Stage::Store);
        assert!(err.to_string().contains("class 7 not found"));
        assert!(err.to_string().ends_with("Trying again will not help"));
    }
}
