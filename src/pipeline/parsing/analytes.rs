//! Known-analyte catalog.
//!
//! Common analyte names and abbreviations seen on lab reports. Membership is
//! never required for acceptance — the catalog backs the fallback-name boost
//! and post-OCR term correction only.

/// Sorted for binary search. Must be lowercase for case-insensitive lookup.
pub const KNOWN_ANALYTES: &[&str] = &[
    "a1c",
    "albumin",
    "alp",
    "alt",
    "amylase",
    "ast",
    "basophils",
    "bicarbonate",
    "bilirubin",
    "bun",
    "calcium",
    "chloride",
    "cholesterol",
    "ck",
    "cortisol",
    "creatinine",
    "crp",
    "eosinophils",
    "esr",
    "ferritin",
    "fibrinogen",
    "folate",
    "ggt",
    "glucose",
    "hct",
    "hdl",
    "hematocrit",
    "hemoglobin",
    "hgb",
    "inr",
    "insulin",
    "iron",
    "ldh",
    "ldl",
    "lipase",
    "lymphocytes",
    "magnesium",
    "mch",
    "mchc",
    "mcv",
    "monocytes",
    "mpv",
    "neutrophils",
    "phosphate",
    "phosphorus",
    "platelets",
    "potassium",
    "prolactin",
    "psa",
    "pt",
    "ptt",
    "rbc",
    "rdw",
    "sodium",
    "t3",
    "t4",
    "testosterone",
    "transferrin",
    "triglycerides",
    "troponin",
    "tsh",
    "urea",
    "vitamin",
    "wbc",
];

/// Case-insensitive membership test against the catalog.
pub fn is_known_analyte(token: &str) -> bool {
    let lower = token.trim().to_lowercase();
    KNOWN_ANALYTES.binary_search(&lower.as_str()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_sorted() {
        // Binary search requires a sorted array.
        for window in KNOWN_ANALYTES.windows(2) {
            assert!(
                window[0] < window[1],
                "KNOWN_ANALYTES not sorted: {:?} >= {:?}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn membership_is_case_insensitive() {
        assert!(is_known_analyte("Glucose"));
        assert!(is_known_analyte("WBC"));
        assert!(is_known_analyte("ast"));
        assert!(!is_known_analyte("unobtainium"));
    }

    #[test]
    fn blank_token_is_not_an_analyte() {
        assert!(!is_known_analyte(""));
        assert!(!is_known_analyte("  "));
    }
}
