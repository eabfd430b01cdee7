//! labparse — best-effort recovery of structured lab-test results from
//! clean or OCR-noisy report text.
//!
//! The pipeline promotes a document to plain text page by page (native text
//! first, OCR fallback per page), reconstructs fragmented lines, then runs a
//! cascade of structural templates with multi-line resolvers and a
//! plausibility gate. Content never raises: lines that match nothing are
//! skipped and reported for tuning.

pub mod pipeline;

pub use pipeline::extraction::{
    CancelFlag, DocumentExtractor, ExtractionError, ExtractionMethod, ExtractionOutcome,
    ExtractionWarning, FragmentBox, OcrFragment, PageSource, PageText, TextRecognizer,
};
pub use pipeline::parsing::{
    parse_lines, parse_text, LabResult, ParseOutcome, RawLine, TraceEvent,
};
pub use pipeline::{process_document, process_document_parallel, DocumentParse};
