//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ScanEqError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::input::Ticker;
use crate::domain::ohlcv::OhlcvBar;
use std::path::Path;

/// Everything a report needs about one finished backtest.
pub struct ReportContext<'a> {
    pub ticker: &'a Ticker,
    pub strategy: &'a str,
    pub bars: &'a [OhlcvBar],
    pub result: &'a BacktestResult,
    pub indicators: Vec<&'a IndicatorSeries>,
}

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(&self, ctx: &ReportContext<'_>, output_path: &Path) -> Result<(), ScanEqError>;
}
