//! The yoga class journal: log classes, look at the numbers, ask for ideas.
//!
//! [`Journal`] wires a [`RecordStore`] to the aggregator, the prompt composer
//! and a [`SuggestionClient`]. Each call runs one pass through that chain and
//! reports failures tagged with the [`Stage`] they came from.

pub mod cache;
pub mod error;
pub mod pipeline;
pub mod report;

pub use cache::SuggestionCache;
pub use error::{JournalError, Stage};
pub use pipeline::{Journal, SEQUENCE_MIN_STUDENTS};
pub use report::Dashboard;

pub use llm::{GenerationParams, ModelId, Suggestion, SuggestionClient, TextGenerator};
pub use prompt::{compose, Composer, PromptContext, Task};
pub use records::{ClassFilter, RecordStore};
pub use stats::{aggregate, AggregateRow, Dimension};
