//! Form input validation: ticker symbols and calendar dates.
//!
//! Validation runs before any network or file I/O; a rejected input aborts the
//! requested operation.

use crate::domain::error::ScanEqError;
use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

static TICKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.-]{1,10}$").expect("ticker pattern is a valid regex")
});

// chrono alone accepts a sign and unpadded fields.
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is a valid regex")
});

/// A ticker symbol of 1-10 letters, digits, dots or hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(input: &str) -> Result<Self, ScanEqError> {
        if TICKER_PATTERN.is_match(input) {
            Ok(Ticker(input.to_string()))
        } else {
            Err(ScanEqError::InvalidTicker {
                input: input.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a `YYYY-MM-DD` calendar date. Impossible dates (Feb 30) are rejected.
pub fn parse_date(input: &str) -> Result<NaiveDate, ScanEqError> {
    let invalid = || ScanEqError::InvalidDate {
        input: input.to_string(),
    };
    if !DATE_PATTERN.is_match(input) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| invalid())
}

/// Query window for a download. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScanEqError> {
        if start >= end {
            return Err(ScanEqError::InvalidDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ScanEqError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}
