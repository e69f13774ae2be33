//! CSV file store: one `<TICKER>_data.csv` per symbol.

use crate::domain::error::ScanEqError;
use crate::domain::input::{DATE_FORMAT, Ticker};
use crate::domain::ohlcv::{OhlcvBar, first_duplicate_date};
use crate::ports::store_port::StorePort;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: i64,
}

impl From<&OhlcvBar> for CsvRow {
    fn from(bar: &OhlcvBar) -> Self {
        CsvRow {
            date: bar.date.format(DATE_FORMAT).to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn malformed(path: &Path, reason: impl Into<String>) -> ScanEqError {
        ScanEqError::MalformedData {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

impl StorePort for CsvAdapter {
    fn path_for(&self, ticker: &Ticker) -> PathBuf {
        self.base_path.join(format!("{}_data.csv", ticker))
    }

    fn save(&self, ticker: &Ticker, bars: &[OhlcvBar]) -> Result<PathBuf, ScanEqError> {
        let path = self.path_for(ticker);
        if !self.base_path.as_os_str().is_empty() {
            fs::create_dir_all(&self.base_path)?;
        }

        let mut wtr = csv::Writer::from_path(&path).map_err(csv_io_error)?;
        for bar in bars {
            wtr.serialize(CsvRow::from(bar)).map_err(csv_io_error)?;
        }
        wtr.flush()?;

        debug!("wrote {} rows to {}", bars.len(), path.display());
        Ok(path)
    }

    fn load(&self, ticker: &Ticker) -> Result<Vec<OhlcvBar>, ScanEqError> {
        let path = self.path_for(ticker);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ScanEqError::MissingData {
                    ticker: ticker.to_string(),
                    path,
                });
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(Self::malformed(&path, format!("not valid UTF-8 text: {e}")));
            }
            Err(e) => return Err(e.into()),
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result.map_err(|e| Self::malformed(&path, e.to_string()))?;
            let date = NaiveDate::parse_from_str(row.date.trim(), DATE_FORMAT).map_err(|e| {
                Self::malformed(
                    &path,
                    format!("row {}: invalid date {:?}: {}", line + 1, row.date, e),
                )
            })?;

            bars.push(OhlcvBar {
                date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        if let Some(date) = first_duplicate_date(&bars) {
            return Err(Self::malformed(&path, format!("duplicate date {}", date)));
        }

        debug!("read {} rows from {}", bars.len(), path.display());
        Ok(bars)
    }
}

fn csv_io_error(e: csv::Error) -> ScanEqError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => ScanEqError::Io(io),
        other => ScanEqError::Io(io::Error::other(format!("{:?}", other))),
    }
}
