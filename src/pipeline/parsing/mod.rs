//! Line-oriented recovery of structured lab results.
//!
//! The parser is total: a line it cannot interpret is skipped and recorded,
//! never an error. Each stage is a pure function over the reconstructed line
//! sequence; per-parse diagnostics travel in the returned [`ParseOutcome`]
//! rather than any global state.

pub mod analytes;
pub mod assemble;
pub mod cascade;
pub mod catalog;
pub mod multiline;
pub mod orchestrator;
pub mod plausibility;
pub mod reflow;
pub mod types;

pub use orchestrator::*;
pub use types::*;
