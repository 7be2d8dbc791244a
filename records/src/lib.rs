//! Class log records and the stores that hold them.
//!
//! A [`RecordStore`] persists [`ClassRecord`]s together with the small
//! reference tables (studios, class types, themes) and the history of ideas
//! the language model has already produced. [`Database`] is the SQLite
//! implementation; [`MemoryStore`] keeps everything in process and is used by
//! tests and demos.

pub mod error;
pub mod filter;
pub mod memory;
pub mod model;
pub mod reference;
pub mod samples;
pub mod sqlite;
pub mod store;

pub use error::StoreError;
pub use filter::ClassFilter;
pub use memory::MemoryStore;
pub use model::{
    ClassId, ClassRecord, ClassType, Energy, GeneratedIdea, IdeaKind, Location, NewClass,
    SequenceNotes, Theme, VibeOutOfRange, VibeRating,
};
pub use sqlite::Database;
pub use store::RecordStore;
