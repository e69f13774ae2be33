//! OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Closing prices of a bar slice, in order.
pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// First repeated date in a date-ordered series, if any.
pub fn first_duplicate_date(bars: &[OhlcvBar]) -> Option<NaiveDate> {
    bars.windows(2)
        .find(|w| w[0].date == w[1].date)
        .map(|w| w[1].date)
}
