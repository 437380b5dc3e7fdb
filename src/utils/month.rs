//! `MM-YYYY` month handling shared by request validation and the period query.

use crate::error::ValidationError;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Earliest accepted year.
pub const MIN_YEAR: i32 = 2000;

static MONTH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})-(\d{4})$").expect("month pattern is valid"));

/// Checks that `date` is a `MM-YYYY` month with a year of at least 2000.
pub fn validate_date(date: &str) -> Result<(), ValidationError> {
    parse_month(date).map(|_| ())
}

/// Parses a `MM-YYYY` string into the first day of that month.
pub fn parse_month(date: &str) -> Result<NaiveDate, ValidationError> {
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
        return Err(ValidationError::InvalidDateFormat);
    }

    let caps = MONTH_REGEX
        .captures(date)
        .ok_or(ValidationError::InvalidDateFormat)?;
    let month: u32 = caps[1]
        .parse()
        .map_err(|_| ValidationError::InvalidDateFormat)?;
    let year: i32 = caps[2]
        .parse()
        .map_err(|_| ValidationError::InvalidDateFormat)?;

    let first_day =
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(ValidationError::InvalidDateFormat)?;
    if first_day.year() < MIN_YEAR {
        return Err(ValidationError::InvalidDateFormat);
    }

    Ok(first_day)
}
