//! Turning aggregate statistics into a prompt for the language model.
//!
//! [`compose`] renders [`stats::AggregateRow`]s as `label: value` pairs under
//! a fixed instruction chosen by [`Task`], keeping the whole prompt inside a
//! character budget. [`parse_context`] reads the pairs back and
//! [`extract_idea`] pulls the headline out of a model reply so it can be
//! remembered.

pub mod compose;
pub mod extract;
pub mod task;

pub use compose::{
    compose, label, parse_context, CompositionError, Composer, PromptContext, DEFAULT_BUDGET,
};
pub use extract::extract_idea;
pub use task::{Instruction, Task, MAX_PREVIOUS_IDEAS};
