//! Post date lines

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{BuildError, Result};

lazy_static! {
    static ref DATE_PREFIX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap();
}

/// Parse the leading `YYYY-MM-DD` of a date line.
///
/// Anything after the date (a weekday, a time, a note) is ignored. A line
/// without the prefix, or with one that is not a real calendar day, is an
/// error.
pub fn parse_date(line: &str) -> Result<NaiveDate> {
    let matched = DATE_PREFIX
        .find(line)
        .ok_or_else(|| BuildError::DateFormat(line.to_string()))?;

    NaiveDate::parse_from_str(matched.as_str(), "%Y-%m-%d")
        .map_err(|_| BuildError::DateFormat(line.to_string()))
}
