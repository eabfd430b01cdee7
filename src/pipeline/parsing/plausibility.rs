//! Plausibility filter: the acceptance gate between a structural match and
//! an emitted record.
//!
//! Two independent checks, both required. The date-component heuristic trades
//! recall for precision: a legitimate low-magnitude value with a degenerate
//! unit is occasionally rejected, which is an accepted limitation.

use super::types::Candidate;

/// A unit that is exactly one of these characters is a date separator.
const DATE_SEPARATORS: [char; 5] = ['/', '-', '.', '\\', '|'];

/// Characters (beyond digits) that make a unit read as a date/time fragment
/// rather than a measurement unit.
const NON_UNIT_CHARS: [char; 7] = ['/', '-', '.', '\\', '|', ':', ','];

/// Day-or-month range for short-unit rejection.
const DAY_MONTH_MIN: f64 = 1.0;
const DAY_MONTH_MAX: f64 = 31.0;

/// Plausible year range for short-unit rejection.
const YEAR_MIN: f64 = 1900.0;
const YEAR_MAX: f64 = 2030.0;

/// Units at most this long offer no evidence against a date reading.
const SHORT_UNIT_MAX_LEN: usize = 2;

/// Minimum cleaned-name length.
const MIN_NAME_LEN: usize = 2;

/// Why a candidate was rejected, or `None` when it passes both checks.
pub fn rejection_reason(candidate: &Candidate) -> Option<&'static str> {
    if is_probable_date_component(candidate.value, candidate.unit.as_deref().unwrap_or("")) {
        return Some("probable date component");
    }
    if !is_valid_name(&candidate.name) {
        return Some("invalid name");
    }
    None
}

/// A (value, unit) pair is rejected as a probable date fragment when:
/// the unit is a single separator character; or the unit is empty/short and
/// the value sits in a day/month or year range; or the unit consists solely
/// of digits and separators with no letters.
pub fn is_probable_date_component(value: f64, unit: &str) -> bool {
    let unit = unit.trim();

    let mut chars = unit.chars();
    if let (Some(first), None) = (chars.next(), chars.next()) {
        if DATE_SEPARATORS.contains(&first) {
            return true;
        }
    }

    if unit.chars().count() <= SHORT_UNIT_MAX_LEN {
        let day_or_month = (DAY_MONTH_MIN..=DAY_MONTH_MAX).contains(&value);
        let year = (YEAR_MIN..=YEAR_MAX).contains(&value);
        if day_or_month || year {
            return true;
        }
    }

    !unit.is_empty()
        && unit
            .chars()
            .all(|c| c.is_ascii_digit() || NON_UNIT_CHARS.contains(&c))
}

/// A cleaned name is valid when it keeps at least `MIN_NAME_LEN` characters
/// after whitespace/control normalization and contains at least one letter.
pub fn is_valid_name(name: &str) -> bool {
    let normalized: String = name
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string();

    normalized.chars().count() >= MIN_NAME_LEN && normalized.chars().any(|c| c.is_alphabetic())
}
