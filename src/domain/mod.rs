//! Core domain types and logic.

pub mod ohlcv;
pub mod input;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod indicator;
pub mod backtest;
pub mod metrics;
pub mod strategy;
pub mod config_validation;
pub mod error;
