//! Textual date/time patterns shared by the validators.
//!
//! These are pattern-level checks only: the date pattern bounds the year
//! to 18xx/19xx/20xx and the month to 01-12, but does not verify calendar
//! validity ("2023-02-29" passes). Because the format is fixed-width
//! `YYYY-MM-DD`, ordering comparisons on pattern-valid dates are
//! lexicographic.

use std::sync::LazyLock;

use regex::Regex;

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[12][890][0-9]{2}-(0[0-9]|1[0-2])-[0-3][0-9]$").expect("valid date pattern")
});

/// 24-hour clock, seconds may carry a decimal fraction.
static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-1][0-9]|2[0-4]):[0-5][0-9]:[0-5][0-9](\.[0-9]*)?$")
        .expect("valid time pattern")
});

/// True when `value` matches the template `YYYY-MM-DD` date format.
pub fn is_template_date(value: &str) -> bool {
    DATE_PATTERN.is_match(value)
}

/// True when `value` matches the template `HH:MM:SS[.frac]` time format.
pub fn is_template_time(value: &str) -> bool {
    TIME_PATTERN.is_match(value)
}
