//! Standard deviation over a window of values.
//!
//! Population: sqrt(sum((x - mean)^2) / n)
//! Sample:     sqrt(sum((x - mean)^2) / (n - 1))
//!
//! Rolling-window statistics in pandas default to the sample form, which is
//! what the Bollinger rule uses; risk metrics use the population form.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deviation {
    Population,
    Sample,
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation, `None` when the divisor would be zero.
pub fn stddev(values: &[f64], deviation: Deviation) -> Option<f64> {
    let n = values.len();
    let divisor = match deviation {
        Deviation::Population => n,
        Deviation::Sample => n.checked_sub(1)?,
    };
    if divisor == 0 {
        return None;
    }

    let m = mean(values)?;
    let sum_sq: f64 = values
        .iter()
        .map(|v| {
            let diff = v - m;
            diff * diff
        })
        .sum();

    Some((sum_sq / divisor as f64).sqrt())
}
