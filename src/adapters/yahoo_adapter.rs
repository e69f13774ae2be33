//! Yahoo Finance chart API adapter.
//!
//! Queries `/v8/finance/chart/{symbol}` for daily bars. Timestamps are shifted
//! by the exchange's GMT offset before truncating to a calendar date, so a bar
//! stamped at the exchange open lands on its own trading day.

use crate::domain::error::ScanEqError;
use crate::domain::input::{DateRange, Ticker};
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::quote_port::QuotePort;
use chrono::{DateTime, NaiveDate, NaiveTime};
use log::{debug, info};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    // Absent when the range holds no trading days.
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

pub struct YahooAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ScanEqError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0")
            .timeout(timeout)
            .build()
            .map_err(|e| ScanEqError::Provider {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn chart_url(&self, ticker: &Ticker, range: &DateRange) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            ticker,
            unix_midnight(range.start),
            unix_midnight(range.end)
        )
    }
}

impl QuotePort for YahooAdapter {
    fn fetch_daily(
        &self,
        ticker: &Ticker,
        range: &DateRange,
    ) -> Result<Vec<OhlcvBar>, ScanEqError> {
        let url = self.chart_url(ticker, range);
        info!("Fetching Yahoo data from: {}", url);

        let provider = |e: reqwest::Error| ScanEqError::Provider {
            reason: e.to_string(),
        };
        let response = self.client.get(&url).send().map_err(provider)?;
        let status = response.status();
        let body = response.text().map_err(provider)?;

        // Unknown symbols answer 404 with a JSON error body; prefer its message.
        match parse_chart(&body, range) {
            Ok(bars) => {
                info!("Fetched {} bars for {}", bars.len(), ticker);
                Ok(bars)
            }
            Err(e) if status.is_success() => Err(e),
            Err(ScanEqError::Provider { reason }) if reason.starts_with("Yahoo API error") => {
                Err(ScanEqError::Provider { reason })
            }
            Err(_) => Err(ScanEqError::Provider {
                reason: format!("HTTP {status} from {url}"),
            }),
        }
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Decode a chart response body into bars inside `range`.
///
/// Rows with any null field are dropped. A response without a result, or with
/// no rows, yields an empty vector.
pub fn parse_chart(body: &str, range: &DateRange) -> Result<Vec<OhlcvBar>, ScanEqError> {
    let response: YahooResponse =
        serde_json::from_str(body).map_err(|e| ScanEqError::Provider {
            reason: format!("failed to parse response: {e}"),
        })?;

    if let Some(error) = response.chart.error {
        return Err(ScanEqError::Provider {
            reason: format!("Yahoo API error: {} - {}", error.code, error.description),
        });
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let offset = result.meta.gmtoffset;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut dropped = 0usize;

    for (i, &ts) in result.timestamp.iter().enumerate() {
        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) =
            (open, high, low, close, volume)
        else {
            dropped += 1;
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            dropped += 1;
            continue;
        };
        if !range.contains(date) {
            continue;
        }
        // Intraday updates for the current session can repeat the last date.
        if let Some(last) = bars.last_mut().filter(|b: &&mut OhlcvBar| b.date == date) {
            *last = OhlcvBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            };
            continue;
        }

        bars.push(OhlcvBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    if dropped > 0 {
        debug!("dropped {} incomplete rows", dropped);
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}
