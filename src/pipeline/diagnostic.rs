//! Pipeline diagnostic dump — writes per-document artifacts to disk.
//!
//! Enables inspection of what each stage recovered: the extracted page text
//! and the full parse outcome with its trace and unmatched lines.
//!
//! **Activation**: disabled unless the `LABPARSE_DUMP_DIR` env var names a
//! directory. Dumping is best-effort — a failed write logs a warning and the
//! pipeline continues.
//!
//! **Output structure**:
//! ```text
//! {dump_dir}/{doc_id}/
//!   01-extraction.json
//!   02-parse.json
//! ```

use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::extraction::ExtractionOutcome;
use super::parsing::ParseOutcome;

/// Env var naming the base dump directory.
const DUMP_DIR_ENV: &str = "LABPARSE_DUMP_DIR";

fn resolve_base_dir() -> Option<PathBuf> {
    std::env::var(DUMP_DIR_ENV).ok().map(PathBuf::from)
}

/// Returns the dump directory for a document, or `None` if diagnostics are
/// disabled. Creates the directory tree on first call; returns `None` (with
/// a warning) if creation fails — never panics, never blocks the pipeline.
pub fn dump_dir_for(document_id: &Uuid) -> Option<PathBuf> {
    let base = resolve_base_dir()?;
    let dir = base.join(document_id.to_string());

    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(
            path = %dir.display(),
            error = %e,
            "diagnostic dump: failed to create directory"
        );
        return None;
    }

    Some(dir)
}

/// Write a JSON artifact (any serde-serializable value). Never panics.
pub fn dump_json<T: serde::Serialize>(dir: &Path, filename: &str, value: &T) {
    let path = dir.join(filename);
    match serde_json::to_string_pretty(value) {
        Ok(json) => match std::fs::write(&path, json.as_bytes()) {
            Ok(()) => tracing::debug!(
                path = %path.display(),
                size = json.len(),
                "diagnostic dump: JSON written"
            ),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "diagnostic dump: failed to write JSON"
            ),
        },
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "diagnostic dump: failed to serialize JSON"
        ),
    }
}

/// Dump both stage outcomes for one document, when diagnostics are enabled.
pub fn dump_document(document_id: &Uuid, extraction: &ExtractionOutcome, parse: &ParseOutcome) {
    let Some(dir) = dump_dir_for(document_id) else {
        return;
    };
    dump_json(&dir, "01-extraction.json", extraction);
    dump_json(&dir, "02-parse.json", parse);
}
