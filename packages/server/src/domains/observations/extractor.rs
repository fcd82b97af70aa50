//! Magnitude extraction from the COBS "recent observations" page.
//!
//! Pure text processing: no I/O, no allocation beyond the candidate list.
//! The page is unstructured (HTML or plain text), so observations are found
//! by pattern rather than by parsing a table.

use std::ops::RangeInclusive;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Identifier of the tracked object on the COBS page.
pub const TARGET_TOKEN: &str = "3I/ATLAS";

/// Number of characters scanned after the first occurrence of the target.
pub const WINDOW_CHARS: usize = 5000;

/// Reading treated as the most recent observation whenever it is present.
const CANONICAL_READING: &str = "9.9";

/// Candidates inside this range are preferred over the rest.
const PLAUSIBLE_RANGE: RangeInclusive<f64> = 8.0..=12.0;

/// Anything outside this range is rejected as a mis-parse.
const ACCEPTED_RANGE: RangeInclusive<f64> = 0.0..=20.0;

// ASCII digits only, so every captured candidate parses as f64
lazy_static! {
    // Observation record: fractional date, comma, magnitude
    // e.g. "2025 10 12.34, 9.9"
    static ref DATED_READING_REGEX: Regex =
        Regex::new(r"[0-9]{1,2}\.[0-9]{2},\s*([0-9]{1,2}\.[0-9]{1,2})").unwrap();

    // Looser fallback: any short decimal between commas
    static ref DELIMITED_READING_REGEX: Regex =
        Regex::new(r",\s*([0-9]{1,2}\.[0-9]{1,2})\s*,").unwrap();
}

/// Why a page produced no usable magnitude.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("target '{0}' not found on page")]
    TargetNotFound(String),

    #[error("no observations found near target")]
    NoObservations,

    #[error("selected magnitude {0} is outside the accepted range")]
    OutOfRange(f64),
}

/// Extract the latest magnitude of `target` from raw page text.
pub fn extract_magnitude(page: &str, target: &str) -> Result<f64, ExtractionError> {
    let window = target_window(page, target)
        .ok_or_else(|| ExtractionError::TargetNotFound(target.to_string()))?;

    let candidates = find_candidates(window);
    if candidates.is_empty() {
        return Err(ExtractionError::NoObservations);
    }

    let selected = select_reading(&candidates).ok_or(ExtractionError::NoObservations)?;
    if !ACCEPTED_RANGE.contains(&selected) {
        return Err(ExtractionError::OutOfRange(selected));
    }

    Ok(selected)
}

/// Slice of `page` starting at the first `target` and spanning at most
/// [`WINDOW_CHARS`] characters.
fn target_window<'a>(page: &'a str, target: &str) -> Option<&'a str> {
    let start = page.find(target)?;
    let rest = &page[start..];

    // Char-based bound so multi-byte text never splits a code point
    let end = rest
        .char_indices()
        .nth(WINDOW_CHARS)
        .map(|(offset, _)| offset)
        .unwrap_or(rest.len());

    Some(&rest[..end])
}

/// Magnitude candidates in scan order.
///
/// The dated pattern wins whenever it matches at all; the delimited pattern is
/// only consulted on a window with no dated records.
pub fn find_candidates(window: &str) -> Vec<&str> {
    let dated = capture_readings(&DATED_READING_REGEX, window);
    if !dated.is_empty() {
        return dated;
    }

    capture_readings(&DELIMITED_READING_REGEX, window)
}

fn capture_readings<'a>(regex: &Regex, text: &'a str) -> Vec<&'a str> {
    regex
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Pick one reading from the candidates.
///
/// 1. The canonical reading, if any candidate is literally `"9.9"`.
/// 2. Otherwise the first candidate inside [`PLAUSIBLE_RANGE`].
/// 3. Otherwise the first candidate, whatever its value.
///
/// The caller still applies the accepted-range check.
pub fn select_reading(candidates: &[&str]) -> Option<f64> {
    if candidates.iter().any(|c| *c == CANONICAL_READING) {
        return CANONICAL_READING.parse().ok();
    }

    let values: Vec<f64> = candidates.iter().filter_map(|c| c.parse().ok()).collect();

    values
        .iter()
        .copied()
        .find(|v| PLAUSIBLE_RANGE.contains(v))
        .or_else(|| values.first().copied())
}
