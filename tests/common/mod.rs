#![allow(dead_code)]

use chrono::NaiveDate;
use scaneq::domain::error::ScanEqError;
use scaneq::domain::input::{DateRange, Ticker};
pub use scaneq::domain::ohlcv::OhlcvBar;
use scaneq::ports::quote_port::QuotePort;
use std::cell::RefCell;
use std::collections::HashMap;

/// Serves canned bars per ticker and records every request.
pub struct MockQuotePort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, DateRange)>>,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl QuotePort for MockQuotePort {
    fn fetch_daily(
        &self,
        ticker: &Ticker,
        range: &DateRange,
    ) -> Result<Vec<OhlcvBar>, ScanEqError> {
        self.requests
            .borrow_mut()
            .push((ticker.to_string(), *range));
        if let Some(reason) = self.errors.get(ticker.as_str()) {
            return Err(ScanEqError::Provider {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker.as_str())
            .map(|bars| {
                bars.iter()
                    .filter(|b| range.contains(b.date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// One bar per calendar day starting at `start_date`, with the given closes.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000 + i as i64,
        })
        .collect()
}

/// A slow sine wave with a sharp spike every 25 bars, alternating up and down.
///
/// The wave crosses its own moving averages several times and each spike
/// closes well outside a 20-bar, 2-sigma channel.
pub fn wave_bars(start_date: &str, count: usize) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let base = 100.0 + 10.0 * (i as f64 / 8.0).sin();
            match (i % 25, (i / 25) % 2) {
                (12, 0) => base + 40.0,
                (12, _) => base - 40.0,
                _ => base,
            }
        })
        .collect();
    bars_from_closes(start_date, &closes)
}
