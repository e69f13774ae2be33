//! Backtest engine and event loop.
//!
//! Replays a price series bar by bar through a [`SignalRule`]. Orders placed
//! on bar `i` fill at the open of bar `i + 1`, or at the close of bar `i` when
//! `trade_on_close` is set. Equity is marked at every close. A position still
//! open when the data ends is closed at the last close.

use chrono::NaiveDate;
use log::{debug, warn};

use super::execution::{
    EntryResult, ExecutionConfig, FillPoint, enter_long, enter_short, exit_position,
};
use super::ohlcv::OhlcvBar;
use super::portfolio::Portfolio;
use super::strategy::{PositionSide, Signal, SignalRule};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    /// Fraction of traded value charged per fill.
    pub commission: f64,
    pub trade_on_close: bool,
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: 10_000.0,
            commission: 0.002,
            trade_on_close: false,
            risk_free_rate: 0.0,
        }
    }
}

impl BacktestConfig {
    fn execution(&self) -> ExecutionConfig {
        ExecutionConfig {
            commission: self.commission,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillSide {
    Buy,
    Sell,
}

/// One executed order, kept for chart markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub side: FillSide,
    pub price: f64,
    pub quantity: i64,
    /// Opens a position (as opposed to closing one).
    pub opening: bool,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub strategy: String,
    pub portfolio: Portfolio,
    pub fills: Vec<Fill>,
    /// Bars closed while holding a position.
    pub bars_in_market: usize,
}

pub fn run_backtest(
    bars: &[OhlcvBar],
    rule: &mut dyn SignalRule,
    config: &BacktestConfig,
) -> BacktestResult {
    let exec = config.execution();
    let mut portfolio = Portfolio::new(config.initial_cash);
    let mut fills = Vec::new();
    let mut bars_in_market = 0usize;
    let mut pending: Option<Signal> = None;

    rule.init(bars);

    for (i, bar) in bars.iter().enumerate() {
        if let Some(signal) = pending.take() {
            let at = FillPoint {
                price: bar.open,
                date: bar.date,
                bar_index: i,
            };
            execute(signal, &mut portfolio, &mut fills, at, &exec);
        }

        let signal = rule.next(i, bar, portfolio.side());
        if signal != Signal::Hold {
            debug!("{} {:?} signal on {}", rule.name(), signal, bar.date);
            if config.trade_on_close {
                let at = FillPoint {
                    price: bar.close,
                    date: bar.date,
                    bar_index: i,
                };
                execute(signal, &mut portfolio, &mut fills, at, &exec);
            } else {
                pending = Some(signal);
            }
        }

        if portfolio.position.is_some() {
            bars_in_market += 1;
        }
        let equity = portfolio.total_equity(bar.close);
        portfolio.record_equity(bar.date, equity);
    }

    if let Some(signal) = pending {
        debug!("dropping {:?} order placed on the last bar", signal);
    }

    if let Some(last) = bars.last() {
        let at = FillPoint {
            price: last.close,
            date: last.date,
            bar_index: bars.len() - 1,
        };
        if let Some(exit) = exit_position(&mut portfolio, at, &exec, true) {
            fills.push(Fill {
                bar_index: at.bar_index,
                date: at.date,
                side: closing_side(exit.quantity),
                price: exit.exit_price,
                quantity: exit.quantity.abs(),
                opening: false,
            });
            let cash = portfolio.cash;
            if let Some(point) = portfolio.equity_curve.last_mut() {
                point.equity = cash;
            }
        }
    }

    BacktestResult {
        strategy: rule.name().to_string(),
        portfolio,
        fills,
        bars_in_market,
    }
}

fn closing_side(quantity: i64) -> FillSide {
    if quantity > 0 {
        FillSide::Sell
    } else {
        FillSide::Buy
    }
}

fn execute(
    signal: Signal,
    portfolio: &mut Portfolio,
    fills: &mut Vec<Fill>,
    at: FillPoint,
    exec: &ExecutionConfig,
) {
    let side = portfolio.side();
    let (close_first, open) = match (signal, side) {
        (Signal::Hold, _) => (false, None),
        (Signal::Close, PositionSide::Flat) => (false, None),
        (Signal::Close, _) => (true, None),
        (Signal::Buy, PositionSide::Long) | (Signal::Sell, PositionSide::Short) => (false, None),
        (Signal::Buy, PositionSide::Short) => (true, Some(FillSide::Buy)),
        (Signal::Sell, PositionSide::Long) => (true, Some(FillSide::Sell)),
        (Signal::Buy, PositionSide::Flat) => (false, Some(FillSide::Buy)),
        (Signal::Sell, PositionSide::Flat) => (false, Some(FillSide::Sell)),
    };

    if close_first {
        if let Some(exit) = exit_position(portfolio, at, exec, false) {
            debug!("closed {} units at {:.4} pnl {:.2}", exit.quantity, exit.exit_price, exit.pnl);
            fills.push(Fill {
                bar_index: at.bar_index,
                date: at.date,
                side: closing_side(exit.quantity),
                price: exit.exit_price,
                quantity: exit.quantity.abs(),
                opening: false,
            });
        }
    }

    let Some(open_side) = open else {
        return;
    };
    let result = match open_side {
        FillSide::Buy => enter_long(portfolio, at, exec),
        FillSide::Sell => enter_short(portfolio, at, exec),
    };
    match result {
        EntryResult::Entered {
            quantity,
            execution_price,
            cost,
            commission,
        } => {
            debug!(
                "opened {} units at {:.4} (value {:.2}, commission {:.2})",
                quantity, execution_price, cost, commission
            );
            fills.push(Fill {
                bar_index: at.bar_index,
                date: at.date,
                side: open_side,
                price: execution_price,
                quantity: quantity.abs(),
                opening: true,
            });
        }
        EntryResult::InsufficientCapital => {
            warn!(
                "insufficient cash ({:.2}) to open a position at {:.4} on {}",
                portfolio.cash, at.price, at.date
            );
        }
    }
}
