use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Roman numerals for months 1–12, as printed in certificate numbers.
const ROMAN_MONTHS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// Institutional series segment of every certificate number.
pub const NUMBER_SERIES: &str = "E-SERT/ITEBA";

pub fn roman_month(month: u32) -> &'static str {
    ROMAN_MONTHS[month as usize - 1]
}

/// Format a certificate number: `{seq:03}/E-SERT/ITEBA/{roman month}/{year}`.
/// The width is a minimum — sequence 1000 simply widens to four digits.
pub fn format_number(seq: u32, issued_at: DateTime<Utc>) -> String {
    format!(
        "{:03}/{}/{}/{}",
        seq,
        NUMBER_SERIES,
        roman_month(issued_at.month()),
        issued_at.year()
    )
}

/// Replace every character outside `[A-Za-z0-9-]` with `-`, making a
/// certificate number safe as a filename or storage key segment.
pub fn safe_file_stem(number: &str) -> String {
    number
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

/// Storage key of a certificate's rendered PDF.
pub fn artifact_key(number: &str) -> String {
    format!("certificates/{}.pdf", safe_file_stem(number))
}

/// UTC bounds of a calendar year: `[Jan 1 00:00, next Jan 1 00:00)`.
pub fn year_bounds(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?.and_utc();
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        .and_hms_opt(0, 0, 0)?
        .and_utc();
    Some((start, end))
}
