//! Fragmented-line reconstruction.
//!
//! OCR and native extraction both produce records broken across physical
//! lines — a date split from its row, a name stranded above its value. This
//! pass merges such fragments back into logical record lines. Output order
//! follows input order and the output is never longer than the input.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{RawLine, TraceEvent};

/// Lookahead budget after a bare date fragment (a 1–2 digit remnant).
const BARE_FRAGMENT_LOOKAHEAD: usize = 4;

/// Lookahead budget after a date line missing its name or value.
const DATE_LINE_LOOKAHEAD: usize = 3;

static RE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}|\d{4}-\d{2}-\d{2})\b")
        .expect("invalid date pattern")
});

static RE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]{3,}").expect("invalid name pattern"));

static RE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("invalid value pattern"));

static RE_BARE_DATE_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{1,2}\s*[/.\-]?\s*$").expect("invalid fragment pattern"));

static RE_BARE_UNIT_OR_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[A-Za-zµ][A-Za-zµ0-9.^\-]*[/%][A-Za-zµ0-9/%.^\-]*|[A-Za-zµ%]{1,3}|\*)\s*$")
        .expect("invalid unit pattern")
});

pub fn has_date_token(text: &str) -> bool {
    RE_DATE.is_match(text)
}

pub fn has_name_token(text: &str) -> bool {
    RE_NAME.is_match(text)
}

pub fn has_value_token(text: &str) -> bool {
    RE_VALUE.is_match(text)
}

/// True when a numeric token survives outside any date token — digits that
/// only spell a date do not count as a value.
pub fn has_value_outside_date(text: &str) -> bool {
    RE_VALUE.is_match(&strip_date_tokens(text))
}

/// Blank out every date token, leaving the rest of the line intact.
pub fn strip_date_tokens(text: &str) -> String {
    RE_DATE.replace_all(text, " ").into_owned()
}

/// A line carrying date, name, and a value beyond the date itself.
pub fn is_complete_record_line(text: &str) -> bool {
    has_date_token(text) && has_name_token(text) && has_value_outside_date(text)
}

/// A 1–2 digit day/month remnant, optionally with a trailing separator.
pub fn is_bare_date_fragment(text: &str) -> bool {
    RE_BARE_DATE_FRAGMENT.is_match(text)
}

/// A short token that reads as a unit or an abnormality flag.
pub fn is_bare_unit_or_flag(text: &str) -> bool {
    RE_BARE_UNIT_OR_FLAG.is_match(text)
}

/// A line with a name-shaped token and no digits at all.
pub fn is_name_only_line(text: &str) -> bool {
    has_name_token(text) && !has_value_token(text)
}

/// A line that is just a date.
pub fn is_date_only_line(text: &str) -> bool {
    has_date_token(text) && !has_name_token(text) && !has_value_outside_date(text)
}

/// Merge fragmented lines into logical record lines.
pub fn merge_fragmented_lines(lines: &[RawLine], trace: &mut Vec<TraceEvent>) -> Vec<RawLine> {
    let mut out: Vec<RawLine> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        let text = line.text.trim();

        if text.is_empty() {
            i += 1;
            continue;
        }

        if is_complete_record_line(text) {
            out.push(line.clone());
            i += 1;
            continue;
        }

        if is_bare_date_fragment(text) {
            if let Some((merged, consumed)) =
                forward_merge(lines, i, BARE_FRAGMENT_LOOKAHEAD, false)
            {
                trace.push(TraceEvent::LinesMerged {
                    line: line.index,
                    absorbed: consumed - 1,
                });
                out.push(merged);
                i += consumed;
            } else {
                out.push(line.clone());
                i += 1;
            }
            continue;
        }

        if has_date_token(text) {
            if let Some((merged, consumed)) = forward_merge(lines, i, DATE_LINE_LOOKAHEAD, true) {
                trace.push(TraceEvent::LinesMerged {
                    line: line.index,
                    absorbed: consumed - 1,
                });
                out.push(merged);
                i += consumed;
            } else {
                out.push(line.clone());
                i += 1;
            }
            continue;
        }

        if is_name_only_line(text) && backward_merge(&mut out, text, trace) {
            i += 1;
            continue;
        }

        out.push(line.clone());
        i += 1;
    }

    out
}

/// Concatenate lines after `start` until the combination satisfies
/// date+name+value, or the budget runs out and the attempt is abandoned.
///
/// With `absorb_units`, lines that read as a bare unit or flag are absorbed
/// outright without counting against the budget or needing the completeness
/// test — a unit alone can never complete a record.
fn forward_merge(
    lines: &[RawLine],
    start: usize,
    budget: usize,
    absorb_units: bool,
) -> Option<(RawLine, usize)> {
    let mut combined = lines[start].text.trim().to_string();
    let mut consumed = 1;
    let mut appended = 0;

    for next in &lines[start + 1..] {
        if appended >= budget {
            break;
        }
        let next_text = next.text.trim();
        if next_text.is_empty() {
            consumed += 1;
            continue;
        }

        if absorb_units && is_bare_unit_or_flag(next_text) {
            join_fragment(&mut combined, next_text);
            consumed += 1;
            continue;
        }

        join_fragment(&mut combined, next_text);
        consumed += 1;
        appended += 1;

        if is_complete_record_line(&combined) {
            return Some((
                RawLine {
                    index: lines[start].index,
                    text: combined,
                },
                consumed,
            ));
        }
    }

    None
}

/// Append `next` to `combined`, without a joining space when either side ends
/// or starts with a date separator — "05/" + "01/2025" must stay one token.
fn join_fragment(combined: &mut String, next: &str) {
    let glue_left = combined
        .chars()
        .last()
        .is_some_and(|c| matches!(c, '/' | '-' | '.'));
    let glue_right = next
        .chars()
        .next()
        .is_some_and(|c| matches!(c, '/' | '-' | '.'));
    if !glue_left && !glue_right {
        combined.push(' ');
    }
    combined.push_str(next);
}

/// Merge a name-only line backward into the last emitted line, but only when
/// that line was incomplete and the combination completes it.
fn backward_merge(out: &mut Vec<RawLine>, text: &str, trace: &mut Vec<TraceEvent>) -> bool {
    let Some(last) = out.last_mut() else {
        return false;
    };
    if is_complete_record_line(&last.text) {
        return false;
    }

    let combined = format!("{} {}", last.text.trim_end(), text);
    if !is_complete_record_line(&combined) {
        return false;
    }

    trace.push(TraceEvent::LinesMerged {
        line: last.index,
        absorbed: 1,
    });
    last.text = combined;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<RawLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| RawLine::new(i, *t))
            .collect()
    }

    fn merged_texts(texts: &[&str]) -> Vec<String> {
        merge_fragmented_lines(&lines(texts), &mut Vec::new())
            .into_iter()
            .map(|l| l.text)
            .collect()
    }

    #[test]
    fn complete_line_passes_through_unchanged() {
        assert_eq!(
            merged_texts(&["05/01/2025 ALT 31.00 U/L"]),
            vec!["05/01/2025 ALT 31.00 U/L"]
        );
    }

    #[test]
    fn split_date_remnant_merges_forward() {
        assert_eq!(
            merged_texts(&["05/", "01/2025 Glucose 95 mg/dL"]),
            vec!["05/01/2025 Glucose 95 mg/dL"]
        );
    }

    #[test]
    fn date_line_collects_name_and_value() {
        assert_eq!(
            merged_texts(&["05/01/2025", "Glucose", "95 mg/dL"]),
            vec!["05/01/2025 Glucose 95 mg/dL"]
        );
    }

    #[test]
    fn bare_unit_line_absorbed_outright() {
        assert_eq!(
            merged_texts(&["05/01/2025 Hemoglobin", "g/dL", "14.2"]),
            vec!["05/01/2025 Hemoglobin g/dL 14.2"]
        );
    }

    #[test]
    fn unmergeable_fragment_kept_standalone() {
        let out = merged_texts(&["31/", "no digits follow here", "just words", "and more", "words again"]);
        assert_eq!(out[0], "31/");
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn lone_date_with_nothing_after_is_kept() {
        assert_eq!(merged_texts(&["12/25/2024"]), vec!["12/25/2024"]);
    }

    #[test]
    fn merge_budget_is_bounded() {
        // Five junk lines exceed the date-line budget of three: abandoned.
        let out = merged_texts(&[
            "05/01/2025",
            "p1 q2",
            "r3 s4",
            "t5 u6",
            "Glucose 95 mg/dL",
        ]);
        assert_eq!(out[0], "05/01/2025");
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn output_never_longer_than_input() {
        let inputs: &[&[&str]] = &[
            &["05/01/2025", "Glucose", "95 mg/dL", "AST 12 U/L"],
            &["a", "b", "c"],
            &["05/", "01/2025 ALT 31 U/L", "Sodium 140"],
        ];
        for input in inputs {
            let out = merge_fragmented_lines(&lines(input), &mut Vec::new());
            assert!(out.len() <= input.len());
        }
    }

    #[test]
    fn merged_line_keeps_first_index() {
        let out = merge_fragmented_lines(
            &lines(&["05/01/2025", "Glucose", "95 mg/dL"]),
            &mut Vec::new(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].index, 0);
    }

    #[test]
    fn merges_are_traced() {
        let mut trace = Vec::new();
        merge_fragmented_lines(&lines(&["05/01/2025", "Glucose", "95 mg/dL"]), &mut trace);
        assert_eq!(
            trace,
            vec![TraceEvent::LinesMerged {
                line: 0,
                absorbed: 2
            }]
        );
    }

    #[test]
    fn backward_merge_completes_a_dateful_line() {
        let mut out = vec![RawLine::new(4, "05/01/2025 116.00")];
        let merged = backward_merge(&mut out, "AST", &mut Vec::new());
        assert!(merged);
        assert_eq!(out[0].text, "05/01/2025 116.00 AST");
    }

    #[test]
    fn backward_merge_refuses_already_complete_line() {
        let mut out = vec![RawLine::new(0, "05/01/2025 CRP 3.2")];
        let merged = backward_merge(&mut out, "Reactive", &mut Vec::new());
        assert!(!merged);
        assert_eq!(out[0].text, "05/01/2025 CRP 3.2");
    }

    #[test]
    fn backward_merge_needs_a_preceding_line() {
        let mut out = Vec::new();
        assert!(!backward_merge(&mut out, "Glucose", &mut Vec::new()));
        assert!(out.is_empty());
    }

    #[test]
    fn classifiers_agree_on_shapes() {
        assert!(is_date_only_line("05/01/2025"));
        assert!(!is_date_only_line("05/01/2025 Glucose"));
        assert!(is_name_only_line("Glucose"));
        assert!(!is_name_only_line("Glucose 95"));
        assert!(is_bare_date_fragment("05/"));
        assert!(is_bare_date_fragment(" 12 "));
        assert!(!is_bare_date_fragment("05/01/2025"));
        assert!(is_bare_unit_or_flag("mg/dL"));
        assert!(is_bare_unit_or_flag("H"));
        assert!(is_bare_unit_or_flag("%"));
        assert!(!is_bare_unit_or_flag("Glucose"));
        assert!(!is_bare_unit_or_flag("95"));
    }

    #[test]
    fn date_digits_are_not_a_value() {
        assert!(!has_value_outside_date("05/01/2025"));
        assert!(has_value_outside_date("05/01/2025 95"));
        assert!(has_value_token("05/01/2025"));
    }
}
