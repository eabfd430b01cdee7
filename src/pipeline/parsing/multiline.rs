//! Multi-line and pairing resolvers.
//!
//! When no single-line template matches the line at the cursor, a record may
//! still be spread over two or three adjacent lines. Three shapes are tried
//! in order; each reports exactly how many lines it consumed so the caller's
//! cursor advances correctly — a wrong count would silently corrupt all
//! downstream line indexing.

use super::cascade::{candidate_from_roles, clean_name, find_first_number};
use super::catalog::VALUE_PATTERNS;
use super::plausibility;
use super::reflow::{
    has_date_token, has_name_token, has_value_outside_date, has_value_token, is_date_only_line,
    is_name_only_line, strip_date_tokens,
};
use super::types::{Candidate, RawLine, TraceEvent};

/// A resolved candidate plus the exact number of lines it consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub candidate: Candidate,
    pub consumed: usize,
}

type Resolver = fn(&[RawLine], usize) -> Option<Candidate>;

const SHAPES: [(&str, usize, Resolver); 3] = [
    ("date-name-value-triple", 3, resolve_date_name_value),
    ("date-name-then-value", 2, resolve_date_name_then_value),
    ("name-then-value", 2, resolve_name_then_value),
];

/// Try the three resolution shapes at the cursor, filter each candidate, and
/// report the consumed-line count of the first acceptable one.
pub fn resolve(lines: &[RawLine], cursor: usize, trace: &mut Vec<TraceEvent>) -> Option<Resolution> {
    let line_index = lines.get(cursor)?.index;

    for (shape, consumed, resolver) in SHAPES {
        let Some(candidate) = resolver(lines, cursor) else {
            continue;
        };
        if let Some(reason) = plausibility::rejection_reason(&candidate) {
            trace.push(TraceEvent::CandidateRejected {
                line: line_index,
                reason: reason.to_string(),
            });
            continue;
        }
        trace.push(TraceEvent::MultiLineResolved {
            line: line_index,
            shape: shape.to_string(),
            consumed,
        });
        return Some(Resolution {
            candidate,
            consumed,
        });
    }

    None
}

/// Line N is a bare date, N+1 is name-shaped, N+2 carries the value.
fn resolve_date_name_value(lines: &[RawLine], cursor: usize) -> Option<Candidate> {
    let date_line = lines.get(cursor)?;
    let name_line = lines.get(cursor + 1)?;
    let value_line = lines.get(cursor + 2)?;

    if !is_date_only_line(date_line.text.trim()) || !is_name_only_line(name_line.text.trim()) {
        return None;
    }
    if !has_value_token(value_line.text.trim()) {
        return None;
    }

    let mut candidate = extract_value_parts(value_line.text.trim(), true)?;
    candidate.name = clean_name(&name_line.text);
    candidate.date = Some(date_line.text.trim().to_string());
    Some(candidate)
}

/// Line N carries both date and name, N+1 the value side.
fn resolve_date_name_then_value(lines: &[RawLine], cursor: usize) -> Option<Candidate> {
    let head = lines.get(cursor)?;
    let value_line = lines.get(cursor + 1)?;

    let head_text = head.text.trim();
    if !has_date_token(head_text)
        || !has_name_token(head_text)
        || has_value_outside_date(head_text)
    {
        return None;
    }

    let mut candidate = extract_value_parts(value_line.text.trim(), false)?;
    candidate.name = clean_name(&strip_date_tokens(head_text));
    candidate.date = head_text
        .split_whitespace()
        .find(|token| has_date_token(token))
        .map(|token| token.to_string());
    Some(candidate)
}

/// Line N is name-only, N+1 the value side — the common two-line OCR layout
/// with no date present.
fn resolve_name_then_value(lines: &[RawLine], cursor: usize) -> Option<Candidate> {
    let name_line = lines.get(cursor)?;
    let value_line = lines.get(cursor + 1)?;

    if !is_name_only_line(name_line.text.trim()) {
        return None;
    }

    let mut candidate = extract_value_parts(value_line.text.trim(), false)?;
    candidate.name = clean_name(&name_line.text);
    Some(candidate)
}

/// Extract value/unit/flag from a value-side line via the sub-pattern list
/// (value+unit+flag, value+unit, value+flag, bare value).
///
/// Only the triple resolver also accepts `number_fallback`: the first number
/// found anywhere on the line. The pairing shapes must not — a pair whose
/// "value line" carries its own leading name is a record in its own right,
/// and stealing it would corrupt the cursor.
fn extract_value_parts(text: &str, number_fallback: bool) -> Option<Candidate> {
    for pattern in VALUE_PATTERNS.iter() {
        if let Some(routed) = pattern.capture_roles(text) {
            if let Some(candidate) = candidate_from_roles(&routed) {
                return Some(candidate);
            }
        }
    }

    if !number_fallback {
        return None;
    }

    let (value, span) = find_first_number(text)?;
    let unit = text[span.end..]
        .split_whitespace()
        .next()
        .map(|token| token.to_string());
    Some(Candidate {
        value,
        unit,
        ..Default::default()
    })
}
