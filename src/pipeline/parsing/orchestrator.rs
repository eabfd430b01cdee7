//! Line-cursor driver for the parsing stages.

use super::assemble::assemble;
use super::cascade;
use super::multiline;
use super::reflow;
use super::types::{ParseOutcome, RawLine, TraceEvent};

/// Parse a reconstructed line sequence into lab results.
///
/// Every stage skips what it cannot interpret: a line matching nothing
/// advances the cursor by one and is recorded as unmatched. Content never
/// raises. The whole invocation is a pure function of its input, so parsing
/// the same lines twice yields identical outcomes.
pub fn parse_lines(lines: &[RawLine]) -> ParseOutcome {
    let mut trace = Vec::new();
    let lines = reflow::merge_fragmented_lines(lines, &mut trace);

    let mut results = Vec::new();
    let mut unmatched = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        let line = &lines[cursor];

        if let Some(candidate) = cascade::parse_line(line, &mut trace) {
            if let Some(result) = assemble(candidate, line) {
                results.push(result);
                cursor += 1;
                continue;
            }
        }

        if let Some(resolution) = multiline::resolve(&lines, cursor, &mut trace) {
            let consumed = resolution.consumed;
            if let Some(result) = assemble(resolution.candidate, line) {
                results.push(result);
                cursor += consumed;
                continue;
            }
        }

        trace.push(TraceEvent::LineSkipped { line: line.index });
        unmatched.push(line.text.clone());
        cursor += 1;
    }

    tracing::debug!(
        results = results.len(),
        unmatched = unmatched.len(),
        "line parsing complete"
    );

    ParseOutcome {
        results,
        unmatched_lines: unmatched,
        trace,
    }
}

/// Split flat text into indexed lines and parse.
pub fn parse_text(text: &str) -> ParseOutcome {
    let lines: Vec<RawLine> = text
        .lines()
        .enumerate()
        .map(|(index, line)| RawLine::new(index, line))
        .collect();
    parse_lines(&lines)
}
