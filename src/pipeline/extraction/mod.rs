pub mod correction;
pub mod geometry;
pub mod orchestrator;
pub mod sanitize;
pub mod types;

pub use orchestrator::*;
pub use sanitize::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("page source failed: {0}")]
    PageSource(String),

    #[error("text recognition failed: {0}")]
    Recognition(String),

    #[error("page {0} out of range")]
    PageOutOfRange(usize),

    #[error("document has no pages")]
    EmptyDocument,
}
