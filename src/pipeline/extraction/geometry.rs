//! Geometric line reconstruction for OCR fragments.
//!
//! Groups recognized tokens into reading-order lines by vertical and
//! horizontal proximity. Reconstruction is approximate: two real rows may
//! merge, one row may split. Downstream stages tolerate both — a bad line is
//! skipped there, never a failure here.

use super::types::OcrFragment;

/// Vertical tolerance for the coarse same-row banding pass (page fraction).
/// Fragments within this delta of the band anchor read left-to-right.
pub const ROW_BAND_TOLERANCE: f64 = 0.15;

/// Tighter vertical tolerance for joining fragments into one output line.
pub const LINE_GROUP_TOLERANCE: f64 = 0.08;

/// Reconstruct reading-order text lines from unordered OCR fragments.
///
/// Fragments are ordered top-of-page first (descending `y`, bottom-left
/// origin), banded into visual rows within `ROW_BAND_TOLERANCE`, sorted
/// left-to-right within a band, then joined with single spaces wherever the
/// vertical delta from the running row anchor stays below
/// `LINE_GROUP_TOLERANCE`. A delta beyond tolerance starts a new line.
pub fn reconstruct_lines(fragments: &[OcrFragment]) -> Vec<String> {
    let mut ordered: Vec<&OcrFragment> = fragments
        .iter()
        .filter(|f| !f.text.trim().is_empty())
        .collect();

    if ordered.is_empty() {
        return Vec::new();
    }

    // total_cmp keeps the sort total even for degenerate coordinates.
    ordered.sort_by(|a, b| b.bounds.y.total_cmp(&a.bounds.y));

    let mut bands: Vec<Vec<&OcrFragment>> = Vec::new();
    let mut band: Vec<&OcrFragment> = Vec::new();
    let mut band_anchor = ordered[0].bounds.y;

    for frag in ordered {
        if band.is_empty() {
            band_anchor = frag.bounds.y;
            band.push(frag);
        } else if (band_anchor - frag.bounds.y).abs() < ROW_BAND_TOLERANCE {
            band.push(frag);
        } else {
            bands.push(std::mem::take(&mut band));
            band_anchor = frag.bounds.y;
            band.push(frag);
        }
    }
    if !band.is_empty() {
        bands.push(band);
    }

    for band in &mut bands {
        band.sort_by(|a, b| a.bounds.x.total_cmp(&b.bounds.x));
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_anchor = 0.0_f64;

    for frag in bands.iter().flatten() {
        if line.is_empty() {
            line_anchor = frag.bounds.y;
            line.push_str(frag.text.trim());
        } else if (line_anchor - frag.bounds.y).abs() < LINE_GROUP_TOLERANCE {
            line.push(' ');
            line.push_str(frag.text.trim());
        } else {
            lines.push(std::mem::take(&mut line));
            line_anchor = frag.bounds.y;
            line.push_str(frag.text.trim());
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines
}
