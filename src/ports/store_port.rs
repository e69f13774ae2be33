//! Price series persistence port trait.

use crate::domain::error::ScanEqError;
use crate::domain::input::Ticker;
use crate::domain::ohlcv::OhlcvBar;
use std::path::PathBuf;

pub trait StorePort {
    /// Location of the series for `ticker`, whether or not it exists yet.
    fn path_for(&self, ticker: &Ticker) -> PathBuf;

    /// Replace the stored series for `ticker`. Returns the path written.
    fn save(&self, ticker: &Ticker, bars: &[OhlcvBar]) -> Result<PathBuf, ScanEqError>;

    /// Read back the stored series. Fails with `MissingData` when nothing has
    /// been downloaded for `ticker`.
    fn load(&self, ticker: &Ticker) -> Result<Vec<OhlcvBar>, ScanEqError>;
}
