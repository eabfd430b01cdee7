use serde::{Deserialize, Serialize};

/// A line of source text with its position in document reading order.
/// Ordering is significant and survives reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    pub index: usize,
    pub text: String,
}

impl RawLine {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// One structured laboratory-test record.
///
/// `unit` and `reference_range` are `"N/A"` when the source carried none.
/// `provenance` is opaque free text (source date, flag note, fallback marker)
/// kept for auditability; callers must not parse it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub reference_range: String,
    pub provenance: String,
}

/// Everything one parse invocation produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub results: Vec<LabResult>,
    /// Lines that were visited but matched nothing, for heuristic tuning.
    pub unmatched_lines: Vec<String>,
    pub trace: Vec<TraceEvent>,
}

/// Diagnostic trace of parser decisions, returned alongside the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceEvent {
    PatternMatched { line: usize, pattern: String },
    FallbackAccepted { line: usize },
    CandidateRejected { line: usize, reason: String },
    LinesMerged { line: usize, absorbed: usize },
    MultiLineResolved { line: usize, shape: String, consumed: usize },
    LineSkipped { line: usize },
}

/// A structurally matched candidate before assembly into a [`LabResult`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub flag: Option<String>,
    pub reference_range: Option<String>,
    pub date: Option<String>,
    pub via_fallback: bool,
}
