//! Pattern cascade over a single line.
//!
//! Templates are tried in catalog order; the first template to produce an
//! accepted candidate wins. When the whole catalog misses, a permissive
//! free-text fallback scans for the first numeric substring — it is the
//! primary source of false positives, so the plausibility filter is
//! mandatory there, not optional.

use std::sync::LazyLock;

use regex::Regex;

use super::analytes;
use super::catalog::{CaptureRole, PATTERNS};
use super::plausibility;
use super::types::{Candidate, RawLine, TraceEvent};

static RE_FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("invalid number pattern"));

/// Parse one line through the cascade, then the free-text fallback.
pub fn parse_line(line: &RawLine, trace: &mut Vec<TraceEvent>) -> Option<Candidate> {
    let text = line.text.trim();
    if text.is_empty() {
        return None;
    }

    for pattern in PATTERNS.iter() {
        let Some(routed) = pattern.capture_roles(text) else {
            continue;
        };
        // A matched-but-malformed value token is a non-match, not an error:
        // the cascade simply moves on to the next template.
        let Some(candidate) = candidate_from_roles(&routed) else {
            continue;
        };
        if let Some(reason) = plausibility::rejection_reason(&candidate) {
            trace.push(TraceEvent::CandidateRejected {
                line: line.index,
                reason: reason.to_string(),
            });
            continue;
        }
        trace.push(TraceEvent::PatternMatched {
            line: line.index,
            pattern: pattern.name.to_string(),
        });
        return Some(candidate);
    }

    let candidate = fallback_scan(text)?;
    if let Some(reason) = plausibility::rejection_reason(&candidate) {
        trace.push(TraceEvent::CandidateRejected {
            line: line.index,
            reason: reason.to_string(),
        });
        return None;
    }
    trace.push(TraceEvent::FallbackAccepted { line: line.index });
    Some(candidate)
}

/// Build a candidate from role-routed captures.
/// Returns `None` when the value group fails to parse as a finite float.
pub fn candidate_from_roles(routed: &[(CaptureRole, &str)]) -> Option<Candidate> {
    let mut candidate = Candidate::default();
    let mut has_value = false;

    for (role, text) in routed {
        match role {
            CaptureRole::Value => {
                candidate.value = parse_value(text)?;
                has_value = true;
            }
            CaptureRole::Name => candidate.name = clean_name(text),
            CaptureRole::Date => candidate.date = Some(text.trim().to_string()),
            CaptureRole::Unit => candidate.unit = Some(text.trim().to_string()),
            CaptureRole::Flag => candidate.flag = Some(text.trim().to_string()),
            CaptureRole::ReferenceRange => {
                candidate.reference_range = Some(text.trim().to_string())
            }
        }
    }

    has_value.then_some(candidate)
}

/// Parse a numeric token, normalizing decimal commas.
pub fn parse_value(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Trim and collapse internal whitespace.
pub fn clean_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Locate the first numeric substring and parse it.
pub fn find_first_number(text: &str) -> Option<(f64, std::ops::Range<usize>)> {
    let m = RE_FIRST_NUMBER.find(text)?;
    let value = parse_value(m.as_str())?;
    Some((value, m.range()))
}

/// Last-resort scan: first numeric substring, preceding text as the name,
/// the first following token as the unit.
fn fallback_scan(text: &str) -> Option<Candidate> {
    let (value, span) = find_first_number(text)?;

    let name = refine_fallback_name(&text[..span.start]);
    let unit = text[span.end..]
        .split_whitespace()
        .next()
        .map(|token| token.to_string());

    Some(Candidate {
        name,
        value,
        unit,
        via_fallback: true,
        ..Default::default()
    })
}

/// Clean a fallback name and, when it contains a known analyte, prefer the
/// span starting at that term — long noisy prefixes ("Final report Serum
/// Glucose") reduce to the informative tail.
fn refine_fallback_name(raw: &str) -> String {
    let cleaned = clean_name(raw);
    let trimmed = cleaned
        .trim_matches(|c: char| !c.is_alphanumeric() && !c.is_whitespace())
        .trim();

    for (offset, token) in trimmed.split_whitespace().map(|t| {
        let offset = t.as_ptr() as usize - trimmed.as_ptr() as usize;
        (offset, t)
    }) {
        if analytes::is_known_analyte(token.trim_matches(|c: char| !c.is_alphanumeric())) {
            return trimmed[offset..].trim().to_string();
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<Candidate> {
        parse_line(&RawLine::new(0, text), &mut Vec::new())
    }

    #[test]
    fn full_record_line_parses() {
        let c = parse("05/01/2025 ALT 31.00 U/L").unwrap();
        assert_eq!(c.name, "ALT");
        assert_eq!(c.value, 31.00);
        assert_eq!(c.unit.as_deref(), Some("U/L"));
        assert_eq!(c.date.as_deref(), Some("05/01/2025"));
        assert!(c.reference_range.is_none());
    }

    #[test]
    fn colon_form_carries_reference_range() {
        let c = parse("Potassium: 4.2 mmol/L (3.5-5.0)").unwrap();
        assert_eq!(c.name, "Potassium");
        assert_eq!(c.value, 4.2);
        assert_eq!(c.unit.as_deref(), Some("mmol/L"));
        assert_eq!(c.reference_range.as_deref(), Some("3.5-5.0"));
    }

    #[test]
    fn first_matching_template_wins() {
        let mut trace = Vec::new();
        let c = parse_line(&RawLine::new(3, "Sodium 140 mmol/L"), &mut trace).unwrap();
        assert_eq!(c.name, "Sodium");
        assert_eq!(
            trace,
            vec![TraceEvent::PatternMatched {
                line: 3,
                pattern: "name-value-unit".into()
            }]
        );
    }

    #[test]
    fn flag_routed_as_flag_not_unit() {
        let c = parse("AST 116.00 H").unwrap();
        assert_eq!(c.name, "AST");
        assert_eq!(c.flag.as_deref(), Some("H"));
        assert!(c.unit.is_none());
    }

    #[test]
    fn decimal_comma_normalized() {
        let c = parse("Hemoglobin: 14,2 g/dL").unwrap();
        assert_eq!(c.value, 14.2);
    }

    #[test]
    fn name_whitespace_collapsed() {
        let c = parse("Total   Cholesterol 185 mg/dL").unwrap();
        assert_eq!(c.name, "Total Cholesterol");
    }

    #[test]
    fn bare_date_yields_nothing() {
        // The fallback finds "12", but the empty name fails the filter.
        assert!(parse("12/25/2024").is_none());
    }

    #[test]
    fn date_fragment_value_rejected_by_filter() {
        // "Collected 05/01/2025": fallback value 05, unit "/" — a date part.
        assert!(parse("Collected 05/01/2025").is_none());
    }

    #[test]
    fn fallback_recovers_noisy_line() {
        let mut trace = Vec::new();
        let c = parse_line(
            &RawLine::new(7, "** Serum Glucose result 95.0 mg/dL reviewed"),
            &mut trace,
        )
        .unwrap();
        assert!(c.via_fallback);
        assert_eq!(c.value, 95.0);
        assert_eq!(c.unit.as_deref(), Some("mg/dL"));
        // The known-analyte boost trims the noisy prefix.
        assert_eq!(c.name, "Glucose result");
        assert!(trace.contains(&TraceEvent::FallbackAccepted { line: 7 }));
    }

    #[test]
    fn fallback_without_digits_yields_nothing() {
        assert!(parse("no numbers in this line at all").is_none());
    }

    #[test]
    fn rejection_recorded_in_trace() {
        let mut trace = Vec::new();
        let parsed = parse_line(&RawLine::new(2, "Seen 12"), &mut trace);
        assert!(parsed.is_none());
        assert!(trace
            .iter()
            .any(|e| matches!(e, TraceEvent::CandidateRejected { line: 2, .. })));
    }

    #[test]
    fn parse_value_rejects_malformed_tokens() {
        assert_eq!(parse_value("31.00"), Some(31.0));
        assert_eq!(parse_value("14,2"), Some(14.2));
        assert_eq!(parse_value("1,2,3"), None);
        assert_eq!(parse_value(""), None);
    }
}
