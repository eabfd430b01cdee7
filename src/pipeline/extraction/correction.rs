//! Post-OCR analyte-term correction.
//!
//! Fuzzy-matches words against the known-analyte catalog to fix common OCR
//! substitutions before parsing. A word is corrected only when it is at least
//! 5 characters long and has a single closest catalog term within edit
//! distance 2 — short words and ambiguous matches are left alone.

use crate::pipeline::parsing::analytes::KNOWN_ANALYTES;

/// Words shorter than this are never corrected.
const MIN_CORRECTION_LEN: usize = 5;

/// Maximum accepted Levenshtein distance for a correction.
const MAX_EDIT_DISTANCE: u32 = 2;

/// Correct OCR-mangled analyte names in a page of text.
/// Native text is trusted; call this on OCR-derived pages only.
pub fn correct_analyte_terms(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            word.push(ch);
        } else {
            flush_word(&mut out, &mut word);
            out.push(ch);
        }
    }
    flush_word(&mut out, &mut word);

    out
}

fn flush_word(out: &mut String, word: &mut String) {
    if word.is_empty() {
        return;
    }
    out.push_str(&correct_word(word));
    word.clear();
}

fn correct_word(word: &str) -> String {
    if word.chars().count() < MIN_CORRECTION_LEN {
        return word.to_string();
    }

    let lower = word.to_lowercase();
    if KNOWN_ANALYTES.binary_search(&lower.as_str()).is_ok() {
        return word.to_string();
    }

    let mut best: Option<&str> = None;
    let mut best_distance = MAX_EDIT_DISTANCE + 1;
    let mut ambiguous = false;

    for &term in KNOWN_ANALYTES {
        if term.chars().count() < MIN_CORRECTION_LEN {
            continue;
        }
        // Terms differing in length by more than the budget cannot match.
        let len_diff = (lower.chars().count() as i64 - term.chars().count() as i64).unsigned_abs();
        if len_diff > MAX_EDIT_DISTANCE as u64 {
            continue;
        }

        let distance = edit_distance(&lower, term);
        if distance < best_distance {
            best_distance = distance;
            best = Some(term);
            ambiguous = false;
        } else if distance == best_distance && best.is_some() {
            ambiguous = true;
        }
    }

    match best {
        Some(term) if !ambiguous => apply_case_pattern(word, term),
        _ => word.to_string(),
    }
}

/// Carry the original word's capitalization over to the corrected term.
fn apply_case_pattern(original: &str, correction: &str) -> String {
    if original
        .chars()
        .all(|c| c.is_uppercase() || !c.is_alphabetic())
    {
        return correction.to_uppercase();
    }

    if original.chars().next().is_some_and(|c| c.is_uppercase()) {
        let mut chars = correction.chars();
        return match chars.next() {
            Some(first) => {
                let mut s: String = first.to_uppercase().collect();
                s.extend(chars);
                s
            }
            None => correction.to_string(),
        };
    }

    correction.to_string()
}

fn edit_distance(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len() as u32;
    }
    if b.is_empty() {
        return a.len() as u32;
    }

    let mut prev: Vec<u32> = (0..=b.len() as u32).collect();
    let mut curr = vec![0u32; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = (i + 1) as u32;
        for (j, &cb) in b.iter().enumerate() {
            let cost = u32::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrects_common_ocr_substitutions() {
        // z-for-s and 1-for-l are typical recognizer errors.
        assert_eq!(correct_analyte_terms("Glucoze"), "Glucose");
        assert_eq!(correct_analyte_terms("Creatinlne"), "Creatinine");
        assert_eq!(correct_analyte_terms("Hemog1obin"), "Hemoglobin");
    }

    #[test]
    fn preserves_already_correct_terms() {
        assert_eq!(correct_analyte_terms("Glucose"), "Glucose");
        assert_eq!(correct_analyte_terms("creatinine"), "creatinine");
    }

    #[test]
    fn never_touches_short_words() {
        assert_eq!(correct_analyte_terms("ALT"), "ALT");
        assert_eq!(correct_analyte_terms("WBC"), "WBC");
        assert_eq!(correct_analyte_terms("mg"), "mg");
    }

    #[test]
    fn keeps_case_pattern() {
        assert_eq!(correct_analyte_terms("GLUCOZE"), "GLUCOSE");
        assert_eq!(correct_analyte_terms("glucoze"), "glucose");
        assert_eq!(correct_analyte_terms("Glucoze"), "Glucose");
    }

    #[test]
    fn leaves_unrelated_words_alone() {
        assert_eq!(correct_analyte_terms("Patient"), "Patient");
        assert_eq!(correct_analyte_terms("Laboratory"), "Laboratory");
        assert_eq!(correct_analyte_terms("morning"), "morning");
    }

    #[test]
    fn corrects_within_mixed_text() {
        let corrected = correct_analyte_terms("05/01/2025 Potasslum 4.2 mmol/L");
        assert!(corrected.contains("Potassium"));
        assert!(corrected.contains("4.2 mmol/L"));
        assert!(corrected.contains("05/01/2025"));
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("glucose", "glucoze"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }
}
