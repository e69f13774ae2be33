//! Trade execution and fill simulation.
//!
//! Entries size to all available cash in whole units, commission included.
//! Both long and short entries escrow their notional from cash; exits release
//! it together with the realised profit or loss.

use chrono::NaiveDate;

use super::portfolio::Portfolio;
use super::position::{ClosedTrade, Position};

/// Configuration for order execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Fraction of traded value charged on every fill (0.002 = 0.2%).
    pub commission: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig { commission: 0.002 }
    }
}

/// Where and when a fill happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillPoint {
    pub price: f64,
    pub date: NaiveDate,
    pub bar_index: usize,
}

pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    trade_value * config.commission
}

/// Whole units affordable with `cash` at `price`, commission included.
pub fn affordable_quantity(cash: f64, price: f64, config: &ExecutionConfig) -> i64 {
    if price <= 0.0 || cash <= 0.0 {
        return 0;
    }
    (cash / (price * (1.0 + config.commission))).floor() as i64
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        quantity: i64,
        execution_price: f64,
        cost: f64,
        commission: f64,
    },
    InsufficientCapital,
}

/// Enter a long position with all available cash.
pub fn enter_long(
    portfolio: &mut Portfolio,
    at: FillPoint,
    config: &ExecutionConfig,
) -> EntryResult {
    enter(portfolio, at, config, 1)
}

/// Enter a short position with all available cash as margin.
pub fn enter_short(
    portfolio: &mut Portfolio,
    at: FillPoint,
    config: &ExecutionConfig,
) -> EntryResult {
    enter(portfolio, at, config, -1)
}

fn enter(
    portfolio: &mut Portfolio,
    at: FillPoint,
    config: &ExecutionConfig,
    direction: i64,
) -> EntryResult {
    let quantity = affordable_quantity(portfolio.cash, at.price, config);
    if quantity == 0 {
        return EntryResult::InsufficientCapital;
    }

    let cost = quantity as f64 * at.price;
    let commission = calculate_commission(cost, config);
    let total_cost = cost + commission;

    if total_cost > portfolio.cash {
        return EntryResult::InsufficientCapital;
    }

    portfolio.cash -= total_cost;
    portfolio.open_position(Position {
        quantity: direction * quantity,
        entry_price: at.price,
        entry_date: at.date,
        entry_bar: at.bar_index,
        entry_commission: commission,
    });

    EntryResult::Entered {
        quantity: direction * quantity,
        execution_price: at.price,
        cost,
        commission,
    }
}

/// Result of an exit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub quantity: i64,
    pub exit_price: f64,
    pub exit_value: f64,
    pub exit_commission: f64,
    pub pnl: f64,
}

/// Close the open position, if any, and record the closed trade.
///
/// PnL includes the round-trip commission. Cash receives the escrowed entry
/// notional plus the price PnL, minus the exit commission.
pub fn exit_position(
    portfolio: &mut Portfolio,
    at: FillPoint,
    config: &ExecutionConfig,
    end_of_data: bool,
) -> Option<ExitResult> {
    let position = portfolio.take_position()?;

    let qty_abs = position.quantity.unsigned_abs() as f64;
    let exit_value = qty_abs * at.price;
    let exit_commission = calculate_commission(exit_value, config);

    let price_pnl = position.unrealized_pnl(at.price);
    let pnl = price_pnl - position.entry_commission - exit_commission;

    portfolio.cash += position.entry_notional() + price_pnl - exit_commission;

    portfolio.record_trade(ClosedTrade {
        quantity: position.quantity,
        entry_price: position.entry_price,
        exit_price: at.price,
        entry_date: position.entry_date,
        exit_date: at.date,
        entry_bar: position.entry_bar,
        exit_bar: at.bar_index,
        pnl,
        commission: position.entry_commission + exit_commission,
        end_of_data,
    });

    Some(ExitResult {
        quantity: position.quantity,
        exit_price: at.price,
        exit_value,
        exit_commission,
        pnl,
    })
}
