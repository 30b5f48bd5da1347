// Utility helpers for parsing and display formatting.
//
// This module centralizes all the "dirty" cell handling so the rest of the
// code can assume clean, typed values. Spreadsheet exports are messy: amounts
// carry thousands separators, date columns mix several text formats with raw
// Excel serial numbers, and blank cells appear anywhere.
use chrono::{Days, NaiveDate};
use num_format::{Locale, ToFormattedString};

/// Text formats tried, in order, when parsing a date cell.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
];

/// Serial 60 is the fictitious 1900-02-29; anything at or below it is not a
/// date we accept. The upper bound is 9999-12-31.
const SERIAL_MIN: f64 = 61.0;
const SERIAL_MAX: f64 = 2_958_465.0;

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

/// Parse a date cell into a `NaiveDate`.
///
/// Tries the known text formats first, then falls back to interpreting the
/// value as an Excel serial day number (workbook cells stringify that way).
/// Returns `None` for anything unrecognizable; callers keep the record and
/// treat the field as an explicit unparseable marker.
pub fn parse_date_flexible(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    s.parse::<f64>().ok().and_then(excel_serial_to_date)
}

/// Convert an Excel serial day number into a date.
///
/// Serial day 0 is 1899-12-30 in the 1900 date system; fractional parts
/// encode the time of day and are truncated.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(SERIAL_MIN..=SERIAL_MAX).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Format a floating-point value with a fixed number of decimal places and
/// locale-aware thousands separators (e.g., `1,234,567.89`).
pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Thin wrapper around `num-format` for integer-like values. Used for counts
/// in console messages (e.g., `9,855 rows loaded`).
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_and_separated_numbers() {
        assert_eq!(parse_f64_safe("1234.5"), Some(1234.5));
        assert_eq!(parse_f64_safe(" 1,234,567.89 "), Some(1234567.89));
        assert_eq!(parse_f64_safe("-42"), Some(-42.0));
    }

    #[test]
    fn rejects_text_and_blank_numbers() {
        assert_eq!(parse_f64_safe(""), None);
        assert_eq!(parse_f64_safe("   "), None);
        assert_eq!(parse_f64_safe("n/a"), None);
        assert_eq!(parse_f64_safe("12 pcs"), None);
    }

    #[test]
    fn parses_common_date_formats() {
        let expected = date(2024, 3, 5);
        assert_eq!(parse_date_flexible("2024-03-05"), Some(expected));
        assert_eq!(parse_date_flexible("2024/03/05"), Some(expected));
        assert_eq!(parse_date_flexible("3/5/2024"), Some(expected));
        assert_eq!(parse_date_flexible("05-Mar-2024"), Some(expected));
        assert_eq!(parse_date_flexible("2024-03-05 13:45:00"), Some(expected));
        assert_eq!(parse_date_flexible("2024-03-05T13:45:00"), Some(expected));
    }

    #[test]
    fn parses_excel_serial_dates() {
        // 45301 days past 1899-12-30 is 2024-01-10.
        assert_eq!(parse_date_flexible("45301"), Some(date(2024, 1, 10)));
        // Fractional part is a time of day; same calendar date.
        assert_eq!(parse_date_flexible("45301.75"), Some(date(2024, 1, 10)));
    }

    #[test]
    fn serial_and_text_agree() {
        assert_eq!(
            parse_date_flexible("45301"),
            parse_date_flexible("2024-01-10")
        );
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_date_flexible("not a date"), None);
        assert_eq!(parse_date_flexible(""), None);
        assert_eq!(parse_date_flexible("13/45/2024"), None);
        // Below the serial window.
        assert_eq!(parse_date_flexible("42"), None);
    }

    #[test]
    fn formats_numbers_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(-9876.5, 2), "-9,876.50");
        assert_eq!(format_number(1200.0, 0), "1,200");
    }

    #[test]
    fn formats_integers() {
        assert_eq!(format_int(9855i64), "9,855");
        assert_eq!(format_int(7usize), "7");
    }
}
