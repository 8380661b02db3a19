//! Shared utility functions for VBOS crates.

/// Date-string helpers.
///
/// Dates arrive from the API as ISO strings with year-first ordering
/// (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`), so period keys are plain prefixes.
pub mod dates {
    use chrono::{Datelike, Local};

    /// Length of a `YYYY` key.
    pub const YEAR_KEY_LEN: usize = 4;

    /// Length of a `YYYY-MM` key.
    pub const MONTH_KEY_LEN: usize = 7;

    /// The `YYYY` prefix of an ISO date string, if it has one.
    pub fn year_key(date: &str) -> Option<&str> {
        let key = date.get(..YEAR_KEY_LEN)?;
        key.bytes().all(|b| b.is_ascii_digit()).then_some(key)
    }

    /// The `YYYY-MM` prefix of an ISO date string, if it has one.
    pub fn month_key(date: &str) -> Option<&str> {
        let key = date.get(..MONTH_KEY_LEN)?;
        year_key(key)?;
        let bytes = key.as_bytes();
        if bytes[4] != b'-' || !bytes[5].is_ascii_digit() || !bytes[6].is_ascii_digit() {
            return None;
        }
        Some(key)
    }

    /// Parse a four-digit year such as `"2020"`.
    pub fn parse_year(s: &str) -> Option<i32> {
        let s = s.trim();
        if s.len() != YEAR_KEY_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    }

    /// Parse a calendar month in `1..=12`.
    pub fn parse_month(s: &str) -> Option<u32> {
        s.trim().parse::<u32>().ok().filter(|m| (1..=12).contains(m))
    }

    /// The current local calendar year.
    pub fn current_year() -> i32 {
        Local::now().year()
    }

}

/// Number formatting for chart axes.
pub mod format {
    /// Format a value the way chart axis labels show it: `1.5M`, `2.3K`,
    /// or the plain number below a thousand.
    pub fn compact_number(v: f64) -> String {
        if v >= 1e6 {
            format!("{:.1}M", v / 1e6)
        } else if v >= 1e3 {
            format!("{:.1}K", v / 1e3)
        } else {
            format!("{}", v)
        }
    }

}
