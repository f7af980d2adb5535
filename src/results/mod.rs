//! Result types and container for cited sources
//!
//! Defines the source records shown alongside an answer.

mod container;
mod types;

pub use container::SourceList;
pub use types::*;
