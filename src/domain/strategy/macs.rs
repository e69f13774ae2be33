//! Moving-average crossover strategy (MACS).
//!
//! Goes long when SMA(10) crosses above SMA(20) and short when it crosses
//! below. There is no exit other than the opposite crossover.

use super::{PositionSide, Signal, SignalRule, crosses_above, crosses_below};
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::OhlcvBar;

pub const SHORT_WINDOW: usize = 10;
pub const LONG_WINDOW: usize = 20;

#[derive(Debug, Clone)]
pub struct Macs {
    short_window: usize,
    long_window: usize,
    short: Option<IndicatorSeries>,
    long: Option<IndicatorSeries>,
}

impl Macs {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
            short: None,
            long: None,
        }
    }

    fn averages_at(&self, index: usize) -> Option<(f64, f64)> {
        let short = self.short.as_ref()?.simple_at(index)?;
        let long = self.long.as_ref()?.simple_at(index)?;
        Some((short, long))
    }
}

impl Default for Macs {
    fn default() -> Self {
        Self::new(SHORT_WINDOW, LONG_WINDOW)
    }
}

impl SignalRule for Macs {
    fn name(&self) -> &str {
        "MACS"
    }

    fn min_bars(&self) -> usize {
        self.short_window.max(self.long_window) + 1
    }

    fn init(&mut self, bars: &[OhlcvBar]) {
        self.short = Some(calculate_sma(bars, self.short_window));
        self.long = Some(calculate_sma(bars, self.long_window));
    }

    fn next(&mut self, index: usize, _bar: &OhlcvBar, _position: PositionSide) -> Signal {
        if index == 0 {
            return Signal::Hold;
        }
        let (Some((prev_short, prev_long)), Some((short, long))) =
            (self.averages_at(index - 1), self.averages_at(index))
        else {
            return Signal::Hold;
        };

        if crosses_above(prev_short, prev_long, short, long) {
            Signal::Buy
        } else if crosses_below(prev_short, prev_long, short, long) {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn indicators(&self) -> Vec<&IndicatorSeries> {
        self.short.iter().chain(self.long.iter()).collect()
    }
}
