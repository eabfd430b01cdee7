pub mod diagnostic;
pub mod extraction;
pub mod parsing;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use extraction::{
    CancelFlag, DocumentExtractor, ExtractionError, ExtractionOutcome, PageSource, TextRecognizer,
};
use parsing::ParseOutcome;

/// Combined outcome of one document run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentParse {
    pub extraction: ExtractionOutcome,
    pub parse: ParseOutcome,
}

/// Promote a document to text and parse lab results out of it, sequentially.
///
/// The only fallible edges are the collaborator calls behind `PageSource`
/// and `TextRecognizer`; content never raises. Best-effort: whatever could
/// not be interpreted lands in the parse outcome's unmatched lines.
pub fn process_document(
    document_id: &Uuid,
    source: &dyn PageSource,
    recognizer: Arc<dyn TextRecognizer + Send + Sync>,
    cancel: &CancelFlag,
) -> Result<DocumentParse, ExtractionError> {
    let extractor = DocumentExtractor::new(recognizer);
    let extraction = extractor.extract(document_id, source, cancel)?;
    let parse = parsing::parse_text(&extraction.full_text);

    diagnostic::dump_document(document_id, &extraction, &parse);

    Ok(DocumentParse { extraction, parse })
}

/// Page-parallel variant of [`process_document`]. Pages are recognized
/// concurrently and re-merged in page order before parsing.
pub async fn process_document_parallel(
    document_id: &Uuid,
    source: Arc<dyn PageSource + Send + Sync>,
    recognizer: Arc<dyn TextRecognizer + Send + Sync>,
    cancel: &CancelFlag,
) -> Result<DocumentParse, ExtractionError> {
    let extractor = DocumentExtractor::new(recognizer);
    let extraction = extractor
        .extract_parallel(document_id, source, cancel)
        .await?;
    let parse = parsing::parse_text(&extraction.full_text);

    diagnostic::dump_document(document_id, &extraction, &parse);

    Ok(DocumentParse { extraction, parse })
}

#[cfg(test)]
mod tests {
    use super::extraction::{ExtractionMethod, FragmentBox, OcrFragment};
    use super::*;

    struct ScriptedSource {
        native: Vec<Option<&'static str>>,
    }

    impl PageSource for ScriptedSource {
        fn page_count(&self) -> Result<usize, ExtractionError> {
            Ok(self.native.len())
        }

        fn native_text(&self, page_index: usize) -> Result<Option<String>, ExtractionError> {
            Ok(self.native[page_index].map(str::to_string))
        }

        fn render_page(&self, page_index: usize) -> Result<Vec<u8>, ExtractionError> {
            Ok(vec![page_index as u8])
        }
    }

    struct ScriptedRecognizer {
        fragments: Vec<OcrFragment>,
    }

    impl TextRecognizer for ScriptedRecognizer {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<OcrFragment>, ExtractionError> {
            Ok(self.fragments.clone())
        }
    }

    fn frag(text: &str, x: f64, y: f64) -> OcrFragment {
        OcrFragment {
            text: text.to_string(),
            bounds: FragmentBox {
                x,
                y,
                width: 0.1,
                height: 0.03,
            },
        }
    }

    #[test]
    fn native_document_end_to_end() {
        let source = ScriptedSource {
            native: vec![Some("05/01/2025 ALT 31.00 U/L\nPotassium: 4.2 mmol/L (3.5-5.0)")],
        };
        let recognizer = Arc::new(ScriptedRecognizer { fragments: vec![] });

        let run = process_document(&Uuid::new_v4(), &source, recognizer, &CancelFlag::new())
            .unwrap();

        assert_eq!(run.parse.results.len(), 2);
        assert_eq!(run.parse.results[0].name, "ALT");
        assert_eq!(run.parse.results[1].name, "Potassium");
        assert_eq!(run.parse.results[1].reference_range, "3.5-5.0");
    }

    #[test]
    fn scanned_document_end_to_end() {
        // No native text: the page falls back to OCR fragments, which the
        // geometric pass rebuilds into lines before parsing.
        let source = ScriptedSource {
            native: vec![None],
        };
        let recognizer = Arc::new(ScriptedRecognizer {
            fragments: vec![
                frag("116.00", 0.3, 0.40),
                frag("AST", 0.1, 0.41),
                frag("H", 0.6, 0.40),
                frag("Glucose", 0.1, 0.80),
                frag("95", 0.4, 0.80),
                frag("mg/dL", 0.6, 0.80),
            ],
        });

        let run = process_document(&Uuid::new_v4(), &source, recognizer, &CancelFlag::new())
            .unwrap();

        let names: Vec<&str> = run.parse.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Glucose", "AST"]);
        assert_eq!(run.extraction.pages[0].method, ExtractionMethod::Ocr);
    }

    #[tokio::test]
    async fn parallel_run_matches_sequential_output() {
        let native = vec![
            Some("Sodium 140 mmol/L"),
            Some("Potassium 4.2 mmol/L"),
            Some("Chloride 102 mmol/L"),
        ];
        let sequential_source = ScriptedSource {
            native: native.clone(),
        };
        let recognizer: Arc<dyn TextRecognizer + Send + Sync> =
            Arc::new(ScriptedRecognizer { fragments: vec![] });
        let id = Uuid::new_v4();

        let sequential = process_document(
            &id,
            &sequential_source,
            Arc::clone(&recognizer),
            &CancelFlag::new(),
        )
        .unwrap();

        let parallel = process_document_parallel(
            &id,
            Arc::new(ScriptedSource { native }),
            recognizer,
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        assert_eq!(sequential.parse.results, parallel.parse.results);
        assert_eq!(sequential.extraction.full_text, parallel.extraction.full_text);
    }
}
