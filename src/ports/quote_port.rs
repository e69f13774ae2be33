//! Market data provider port trait.

use crate::domain::error::ScanEqError;
use crate::domain::input::{DateRange, Ticker};
use crate::domain::ohlcv::OhlcvBar;

pub trait QuotePort {
    /// Daily bars for `ticker` with `range.start <= date < range.end`, oldest first.
    ///
    /// An unknown symbol may come back as an empty vector rather than an error.
    fn fetch_daily(&self, ticker: &Ticker, range: &DateRange)
    -> Result<Vec<OhlcvBar>, ScanEqError>;
}
