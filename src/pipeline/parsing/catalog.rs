//! Structural line-pattern catalog.
//!
//! Each template is a data record naming its own semantic roles, so captured
//! groups are routed by role lookup — never by positional pattern index. The
//! catalog order is the cascade priority: most specific first.

use std::sync::LazyLock;

use regex::Regex;

/// Semantic role of one captured group in a line pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRole {
    Date,
    Name,
    Value,
    Unit,
    Flag,
    ReferenceRange,
}

/// One structural template.
///
/// `roles[i]` names the meaning of capture group `i + 1`. A match is usable
/// only when it actually carries that many captured groups, all present.
pub struct LinePattern {
    pub name: &'static str,
    pub regex: Regex,
    pub roles: &'static [CaptureRole],
}

impl LinePattern {
    /// Minimum captured groups (beyond the whole-match group) a match must
    /// carry before any group is indexed.
    pub fn min_captures(&self) -> usize {
        self.roles.len()
    }

    /// Match a line and route captured text by role.
    ///
    /// Returns `None` when the pattern does not match — or when the match
    /// carries fewer captured groups than the declared roles require. An
    /// under-captured match is discarded, never indexed into.
    pub fn capture_roles<'t>(&self, text: &'t str) -> Option<Vec<(CaptureRole, &'t str)>> {
        let caps = self.regex.captures(text)?;
        if caps.len() < self.min_captures() + 1 {
            return None;
        }

        let mut routed = Vec::with_capacity(self.roles.len());
        for (i, role) in self.roles.iter().enumerate() {
            let group = caps.get(i + 1)?;
            routed.push((*role, group.as_str()));
        }
        Some(routed)
    }
}

// Shared sub-expressions. All are group-free so each template declares
// exactly the captures its roles name.
const DATE: &str = r"(?:\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}|\d{4}-\d{2}-\d{2})";
const NAME: &str = r"[A-Za-z][A-Za-z0-9 .,'/%+\-]*?";
const VALUE: &str = r"\d+(?:[.,]\d+)?";
const UNIT: &str = r"(?:[A-Za-zµ%][A-Za-zµ%0-9/.^\-]+|%)";
const FLAG: &str = r"(?:HH|LL|H|L|A|\*)";
const RANGE: &str = r"(?:[<>≤≥]\s*\d+(?:[.,]\d+)?|\d+(?:[.,]\d+)?\s*[-–]\s*\d+(?:[.,]\d+)?)(?:\s*(?:[A-Za-zµ%][A-Za-zµ%0-9/.^\-]+|%))?";

fn pattern(name: &'static str, regex: String, roles: &'static [CaptureRole]) -> LinePattern {
    LinePattern {
        name,
        regex: Regex::new(&regex).expect("invalid line pattern"),
        roles,
    }
}

use CaptureRole::{Date, Flag, Name, ReferenceRange, Unit, Value};

/// The cascade catalog, most specific first. Flag templates come before
/// their unit-only counterparts: a trailing `H` is a flag, not a unit.
pub static PATTERNS: LazyLock<Vec<LinePattern>> = LazyLock::new(|| {
    vec![
        pattern(
            "date-name-value-unit",
            format!(r"^\s*({DATE})\s+({NAME})\s+({VALUE})\s+({UNIT})\s*$"),
            &[Date, Name, Value, Unit],
        ),
        pattern(
            "date-name-value",
            format!(r"^\s*({DATE})\s+({NAME})\s+({VALUE})\s*$"),
            &[Date, Name, Value],
        ),
        pattern(
            "name-colon-value-unit-range",
            format!(r"^\s*({NAME})\s*[:=]\s*({VALUE})\s*({UNIT})\s*\(\s*([^)]+?)\s*\)\s*$"),
            &[Name, Value, Unit, ReferenceRange],
        ),
        pattern(
            "name-colon-value-range",
            format!(r"^\s*({NAME})\s*[:=]\s*({VALUE})\s*\(\s*([^)]+?)\s*\)\s*$"),
            &[Name, Value, ReferenceRange],
        ),
        pattern(
            "name-colon-value-unit",
            format!(r"^\s*({NAME})\s*[:=]\s*({VALUE})\s*({UNIT})\s*$"),
            &[Name, Value, Unit],
        ),
        pattern(
            "name-colon-value",
            format!(r"^\s*({NAME})\s*[:=]\s*({VALUE})\s*$"),
            &[Name, Value],
        ),
        pattern(
            "name-value-unit-flag",
            format!(r"^\s*({NAME})\s+({VALUE})\s+({UNIT})\s+({FLAG})\s*$"),
            &[Name, Value, Unit, Flag],
        ),
        pattern(
            "name-value-unit-range",
            format!(r"^\s*({NAME})\s+({VALUE})\s+({UNIT})\s+({RANGE})\s*$"),
            &[Name, Value, Unit, ReferenceRange],
        ),
        pattern(
            "name-value-flag",
            format!(r"^\s*({NAME})\s+({VALUE})\s+({FLAG})\s*$"),
            &[Name, Value, Flag],
        ),
        pattern(
            "name-value-range",
            format!(r"^\s*({NAME})\s+({VALUE})\s+({RANGE})\s*$"),
            &[Name, Value, ReferenceRange],
        ),
        pattern(
            "name-value-unit",
            format!(r"^\s*({NAME})\s+({VALUE})\s+({UNIT})\s*$"),
            &[Name, Value, Unit],
        ),
        pattern(
            "name-value",
            format!(r"^\s*({NAME})\s+({VALUE})\s*$"),
            &[Name, Value],
        ),
    ]
});

/// Sub-templates for a line carrying only the value side of a record, used
/// by the multi-line resolvers.
pub static VALUE_PATTERNS: LazyLock<Vec<LinePattern>> = LazyLock::new(|| {
    vec![
        pattern(
            "value-unit-flag",
            format!(r"^\s*({VALUE})\s*({UNIT})\s+({FLAG})\s*$"),
            &[Value, Unit, Flag],
        ),
        pattern(
            "value-unit",
            format!(r"^\s*({VALUE})\s*({UNIT})\s*$"),
            &[Value, Unit],
        ),
        pattern(
            "value-flag",
            format!(r"^\s*({VALUE})\s+({FLAG})\s*$"),
            &[Value, Flag],
        ),
        pattern("value-only", format!(r"^\s*({VALUE})\s*$"), &[Value]),
    ]
});
