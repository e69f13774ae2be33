//! Bollinger band mean-reversion strategy.
//!
//! Flat: short a close above the upper band, buy a close below the lower band.
//! Long: close out once price closes above the upper band.
//! Short: close out once price closes below the lower band.

use super::{PositionSide, Signal, SignalRule};
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::ohlcv::OhlcvBar;

pub const PERIOD: usize = 20;
pub const STDDEV_MULT_X100: u32 = 200;

#[derive(Debug, Clone)]
pub struct BollingerReversion {
    period: usize,
    stddev_mult_x100: u32,
    bands: Option<IndicatorSeries>,
}

impl BollingerReversion {
    pub fn new(period: usize, stddev_mult_x100: u32) -> Self {
        Self {
            period,
            stddev_mult_x100,
            bands: None,
        }
    }
}

impl Default for BollingerReversion {
    fn default() -> Self {
        Self::new(PERIOD, STDDEV_MULT_X100)
    }
}

impl SignalRule for BollingerReversion {
    fn name(&self) -> &str {
        "Bollinger Bands"
    }

    fn min_bars(&self) -> usize {
        self.period
    }

    fn init(&mut self, bars: &[OhlcvBar]) {
        self.bands = Some(calculate_bollinger(bars, self.period, self.stddev_mult_x100));
    }

    fn next(&mut self, index: usize, bar: &OhlcvBar, position: PositionSide) -> Signal {
        let Some((upper, _, lower)) = self.bands.as_ref().and_then(|b| b.bands_at(index)) else {
            return Signal::Hold;
        };

        match position {
            PositionSide::Flat if bar.close > upper => Signal::Sell,
            PositionSide::Flat if bar.close < lower => Signal::Buy,
            PositionSide::Long if bar.close > upper => Signal::Close,
            PositionSide::Short if bar.close < lower => Signal::Close,
            _ => Signal::Hold,
        }
    }

    fn indicators(&self) -> Vec<&IndicatorSeries> {
        self.bands.iter().collect()
    }
}
