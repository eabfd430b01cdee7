//! Result assembly.
//!
//! Normalizes an accepted candidate into the output record shape, attaching
//! provenance text for auditability. No deduplication happens here — that
//! belongs to the caller.

use chrono::NaiveDate;

use super::types::{Candidate, LabResult, RawLine};

/// Date layouts worth normalizing for provenance. Anything else passes
/// through as raw text.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m-%d-%Y",
    "%d.%m.%Y",
];

/// Build the final record. The upstream numeric parse already guarantees a
/// finite value, but it is re-checked here: a non-finite value must never be
/// emitted.
pub fn assemble(candidate: Candidate, source: &RawLine) -> Option<LabResult> {
    if !candidate.value.is_finite() {
        return None;
    }

    let unit = candidate
        .unit
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "N/A".to_string());

    let reference_range = candidate
        .reference_range
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "N/A".to_string());

    let provenance = build_provenance(
        candidate.date.as_deref(),
        candidate.flag.as_deref(),
        candidate.via_fallback,
        source,
    );

    Some(LabResult {
        name: candidate.name.trim().to_string(),
        value: candidate.value,
        unit,
        reference_range,
        provenance,
    })
}

fn build_provenance(
    date: Option<&str>,
    flag: Option<&str>,
    via_fallback: bool,
    source: &RawLine,
) -> String {
    let mut parts = Vec::new();

    if let Some(date) = date {
        parts.push(normalize_date(date));
    }
    if let Some(flag) = flag {
        parts.push(format!("flag {flag}"));
    }
    if via_fallback {
        parts.push("fallback parsing".to_string());
    }
    if parts.is_empty() {
        parts.push(format!("line {}", source.index + 1));
    }

    parts.join("; ").trim().to_string()
}

fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    trimmed.to_string()
}
