//! Configuration validation.
//!
//! Every key is optional. A key that is present must parse and fall inside its
//! allowed range; otherwise the whole config is rejected before any work runs.

use crate::domain::error::ScanEqError;
use crate::ports::config_port::{ConfigPort, parse_flag};

pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Every `(section, key)` scaneq reads.
pub const KNOWN_KEYS: [(&str, &str); 11] = [
    ("data", "dir"),
    ("data", "provider_url"),
    ("data", "timeout_secs"),
    ("backtest", "cash"),
    ("backtest", "commission"),
    ("backtest", "trade_on_close"),
    ("backtest", "risk_free_rate"),
    ("chart", "dir"),
    ("chart", "width"),
    ("chart", "height"),
    ("log", "level"),
];

/// Keys that scaneq would silently ignore, usually typos.
pub fn unknown_keys(present: &[(String, String)]) -> Vec<String> {
    present
        .iter()
        .filter(|(section, key)| {
            !KNOWN_KEYS
                .iter()
                .any(|(s, k)| s.eq_ignore_ascii_case(section) && k.eq_ignore_ascii_case(key))
        })
        .map(|(section, key)| format!("[{section}] {key}"))
        .collect()
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), ScanEqError> {
    validate_cash(config)?;
    validate_commission(config)?;
    validate_trade_on_close(config)?;
    validate_risk_free_rate(config)?;
    validate_timeout(config)?;
    validate_chart_size(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ScanEqError {
    ScanEqError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, ScanEqError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(section, key, format!("{raw:?} is not a number"))),
    }
}

fn integer(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, ScanEqError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("{raw:?} is not a whole number"))),
    }
}

fn validate_cash(config: &dyn ConfigPort) -> Result<(), ScanEqError> {
    if let Some(value) = number(config, "backtest", "cash")? {
        if value <= 0.0 {
            return Err(invalid("backtest", "cash", "cash must be positive"));
        }
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), ScanEqError> {
    if let Some(value) = number(config, "backtest", "commission")? {
        if !(0.0..1.0).contains(&value) {
            return Err(invalid(
                "backtest",
                "commission",
                "commission must be a fraction between 0 and 1",
            ));
        }
    }
    Ok(())
}

fn validate_trade_on_close(config: &dyn ConfigPort) -> Result<(), ScanEqError> {
    match config.get_string("backtest", "trade_on_close") {
        None => Ok(()),
        Some(raw) => match parse_flag(&raw) {
            Some(_) => Ok(()),
            None => Err(invalid(
                "backtest",
                "trade_on_close",
                format!("{raw:?} is not a boolean"),
            )),
        },
    }
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), ScanEqError> {
    if let Some(value) = number(config, "backtest", "risk_free_rate")? {
        if !(0.0..1.0).contains(&value) {
            return Err(invalid(
                "backtest",
                "risk_free_rate",
                "risk_free_rate must be between 0 and 1",
            ));
        }
    }
    Ok(())
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), ScanEqError> {
    if let Some(value) = integer(config, "data", "timeout_secs")? {
        if value < 1 {
            return Err(invalid(
                "data",
                "timeout_secs",
                "timeout_secs must be at least 1",
            ));
        }
    }
    Ok(())
}

fn validate_chart_size(config: &dyn ConfigPort) -> Result<(), ScanEqError> {
    for key in ["width", "height"] {
        if let Some(value) = integer(config, "chart", key)? {
            if !(200..=10_000).contains(&value) {
                return Err(invalid(
                    "chart",
                    key,
                    format!("{key} must be between 200 and 10000 pixels"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_log_level(config: &dyn ConfigPort) -> Result<(), ScanEqError> {
    match config.get_string("log", "level") {
        Some(level) if !LOG_LEVELS.contains(&level.trim().to_lowercase().as_str()) => Err(
            invalid("log", "level", format!("expected one of {}", LOG_LEVELS.join(", "))),
        ),
        _ => Ok(()),
    }
}
