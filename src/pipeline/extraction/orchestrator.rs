use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;
use uuid::Uuid;

use super::correction::correct_analyte_terms;
use super::geometry::reconstruct_lines;
use super::sanitize::sanitize_extracted_text;
use super::types::{
    ExtractionMethod, ExtractionOutcome, ExtractionWarning, PageSource, PageText, TextRecognizer,
};
use super::ExtractionError;

/// Cooperative cancellation for multi-page extraction.
///
/// Cancelling abandons pages that have not started; a page already handed to
/// the recognizer runs to completion. Partial results (completed pages only)
/// are a valid, non-error outcome.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Promotes a document to plain text, page by page.
///
/// Each page uses native text when the source carries any, and falls back to
/// render-then-recognize with geometric line reconstruction otherwise. The
/// recognizer is a trait object, enabling dependency injection.
pub struct DocumentExtractor {
    recognizer: Arc<dyn TextRecognizer + Send + Sync>,
}

impl DocumentExtractor {
    pub fn new(recognizer: Arc<dyn TextRecognizer + Send + Sync>) -> Self {
        Self { recognizer }
    }

    /// Extract all pages sequentially, in document order.
    pub fn extract(
        &self,
        document_id: &Uuid,
        source: &dyn PageSource,
        cancel: &CancelFlag,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let page_count = source.page_count()?;
        if page_count == 0 {
            return Err(ExtractionError::EmptyDocument);
        }

        let mut pages = Vec::with_capacity(page_count);
        for index in 0..page_count {
            if cancel.is_cancelled() {
                tracing::info!(
                    document_id = %document_id,
                    completed = pages.len(),
                    remaining = page_count - index,
                    "extraction cancelled, keeping completed pages"
                );
                break;
            }
            pages.push(extract_page(source, &*self.recognizer, index));
        }

        Ok(assemble_outcome(document_id, pages))
    }

    /// Extract pages concurrently, one blocking task per page.
    ///
    /// Results are merged by page index, never by completion order —
    /// downstream line merging depends on document order. Pages not yet
    /// started when `cancel` fires are abandoned.
    pub async fn extract_parallel(
        &self,
        document_id: &Uuid,
        source: Arc<dyn PageSource + Send + Sync>,
        cancel: &CancelFlag,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let page_count = source.page_count()?;
        if page_count == 0 {
            return Err(ExtractionError::EmptyDocument);
        }

        let mut tasks = JoinSet::new();
        for index in 0..page_count {
            let source = Arc::clone(&source);
            let recognizer = Arc::clone(&self.recognizer);
            let cancel = cancel.clone();
            tasks.spawn_blocking(move || {
                if cancel.is_cancelled() {
                    return (index, None);
                }
                (index, Some(extract_page(&*source, &*recognizer, index)))
            });
        }

        let mut indexed: Vec<(usize, PageText)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Some(page))) => indexed.push((index, page)),
                Ok((_, None)) => {}
                Err(e) => tracing::warn!(error = %e, "page extraction task failed to join"),
            }
        }

        indexed.sort_by_key(|(index, _)| *index);
        let pages = indexed.into_iter().map(|(_, page)| page).collect();

        Ok(assemble_outcome(document_id, pages))
    }
}

/// Extract one page, downgrading any failure to an empty page with a warning.
/// A failed page contributes zero lines; the rest of the document continues.
fn extract_page(source: &dyn PageSource, recognizer: &dyn TextRecognizer, index: usize) -> PageText {
    match try_extract_page(source, recognizer, index) {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(page = index + 1, error = %e, "page extraction failed");
            PageText {
                page_number: index + 1,
                text: String::new(),
                method: ExtractionMethod::Ocr,
                warnings: vec![ExtractionWarning::OcrFailed {
                    page: index + 1,
                    reason: e.to_string(),
                }],
            }
        }
    }
}

fn try_extract_page(
    source: &dyn PageSource,
    recognizer: &dyn TextRecognizer,
    index: usize,
) -> Result<PageText, ExtractionError> {
    if let Some(native) = source.native_text(index)? {
        if !native.trim().is_empty() {
            tracing::debug!(page = index + 1, "using native page text");
            return Ok(page_from_text(
                index,
                sanitize_extracted_text(&native),
                ExtractionMethod::NativeText,
            ));
        }
    }

    // The page reports no native content: fall back to OCR.
    tracing::debug!(page = index + 1, "no native text, falling back to OCR");
    let image = source.render_page(index)?;
    let fragments = recognizer.recognize(&image)?;
    let text = reconstruct_lines(&fragments).join("\n");
    let text = correct_analyte_terms(&sanitize_extracted_text(&text));

    Ok(page_from_text(index, text, ExtractionMethod::Ocr))
}

fn page_from_text(index: usize, text: String, method: ExtractionMethod) -> PageText {
    let warnings = if text.trim().is_empty() {
        vec![ExtractionWarning::EmptyPage { page: index + 1 }]
    } else {
        vec![]
    };
    PageText {
        page_number: index + 1,
        text,
        method,
        warnings,
    }
}

fn assemble_outcome(document_id: &Uuid, pages: Vec<PageText>) -> ExtractionOutcome {
    let full_text = pages
        .iter()
        .map(|p| p.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let page_count = pages.len();

    tracing::info!(
        document_id = %document_id,
        pages = page_count,
        text_length = full_text.len(),
        "document extraction complete"
    );

    ExtractionOutcome {
        document_id: *document_id,
        pages,
        full_text,
        page_count,
    }
}
