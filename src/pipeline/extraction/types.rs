use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ExtractionError;

/// Result of promoting a single document to plain text, page by page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub document_id: Uuid,
    pub pages: Vec<PageText>,
    pub full_text: String,
    pub page_count: usize,
}

/// How a page's text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    NativeText,
    Ocr,
}

/// Per-page extraction result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub page_number: usize,
    pub text: String,
    pub method: ExtractionMethod,
    pub warnings: Vec<ExtractionWarning>,
}

/// Warnings about extraction quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtractionWarning {
    OcrFailed { page: usize, reason: String },
    EmptyPage { page: usize },
}

/// Normalized bounding rectangle of a recognized token.
///
/// Coordinates are 0–1 fractions of the page with a bottom-left origin:
/// `y` grows toward the top of the page, so the first reading-order row has
/// the largest `y`. Recognizer adapters with a top-left convention must flip
/// `y` before handing fragments in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FragmentBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A single OCR-recognized token, prior to line reconstruction.
/// Consumed entirely by the geometric reconstructor, never exposed downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrFragment {
    pub text: String,
    pub bounds: FragmentBox,
}

/// Page-text-or-image source abstraction (the document decoding layer).
pub trait PageSource {
    fn page_count(&self) -> Result<usize, ExtractionError>;

    /// Native text for a page, if the document carries any.
    /// `None` or empty content means the page needs OCR.
    fn native_text(&self, page_index: usize) -> Result<Option<String>, ExtractionError>;

    /// Rasterize a page for the text recognizer.
    fn render_page(&self, page_index: usize) -> Result<Vec<u8>, ExtractionError>;
}

/// Text recognizer abstraction (allows mocking for tests).
pub trait TextRecognizer {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<OcrFragment>, ExtractionError>;
}
