//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the sample standard deviation (divides by N-1), matching a
//! pandas rolling window.
//!
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::stddev::{Deviation, mean, stddev};
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::{OhlcvBar, closes};

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let warmup = period.saturating_sub(1);
    let mult = stddev_mult_x100 as f64 / 100.0;
    let close = closes(bars);

    for i in 0..bars.len() {
        let date = bars[i].date;

        let bands = if period > 0 && i >= warmup {
            let window = &close[i + 1 - period..=i];
            match (mean(window), stddev(window, Deviation::Sample)) {
                (Some(middle), Some(sd)) => Some((middle + mult * sd, middle, middle - mult * sd)),
                _ => None,
            }
        } else {
            None
        };

        let (valid, (upper, middle, lower)) = match bands {
            Some(b) => (true, b),
            None => (false, (0.0, 0.0, 0.0)),
        };

        values.push(IndicatorPoint {
            date,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        values,
    }
}
