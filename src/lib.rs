//! scaneq: download daily prices for a ticker and backtest canned strategies.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. [`cli`] wires them together and
//! [`shell`] puts an interactive form in front of the same operations.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod shell;
