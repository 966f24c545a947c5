// ==========================================
// AuditGov - Field normalizer
// ==========================================
// Duty: total (never failing) cell transformations
// - text: drop quotes, upper-case, strip diacritics, trim
// - amount: regional "1.234,56" format, 0.0 on failure
// - date: fixed pattern, import date on failure
// The *_checked variants expose whether a default was substituted
// ==========================================

use chrono::{Local, NaiveDate};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Quoting artifact left in cells by the upstream export
const QUOTE: char = '"';

/// Default date pattern of the source export (dd/mm/yyyy)
pub const DEFAULT_DATE_PATTERN: &str = "%d/%m/%Y";

/// Canonical text form used for every stored name.
///
/// Upper-casing happens before decomposition: some lower-case letters
/// upper-case into a base letter plus a combining mark, which must be
/// stripped in the same pass for the function to stay idempotent.
pub fn clean_text(raw: &str) -> String {
    let without_quotes: String = raw.chars().filter(|c| *c != QUOTE).collect();

    without_quotes
        .to_uppercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse a regional amount.
///
/// # Returns
/// - Some(value): parsed, or 0.0 for an empty cell
/// - None: non-empty cell that is not a finite number
pub fn parse_amount_checked(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != QUOTE).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Some(0.0);
    }

    let numeric = cleaned.replace('.', "").replace(',', ".");
    numeric.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a regional amount, 0.0 on any failure
pub fn parse_amount(raw: &str) -> f64 {
    parse_amount_checked(raw).unwrap_or(0.0)
}

/// Parse a date with `pattern` after cleaning; None when empty or malformed
pub fn parse_date_checked(raw: &str, pattern: &str) -> Option<NaiveDate> {
    let cleaned = clean_text(raw);
    if cleaned.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(&cleaned, pattern).ok()
}

/// Parse a date, substituting today's date (with a warning) on failure
pub fn parse_date(raw: &str, pattern: &str) -> NaiveDate {
    match parse_date_checked(raw, pattern) {
        Some(date) => date,
        None => {
            let today = today();
            tracing::warn!(raw = %raw, fallback = %today, "unparseable date, using import date");
            today
        }
    }
}

/// Current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Keep at most `max_chars` characters
pub fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
