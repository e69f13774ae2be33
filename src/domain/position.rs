//! Position tracking.

use super::strategy::PositionSide;
use chrono::NaiveDate;

/// An open position. Positive quantity is long, negative is short.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub quantity: i64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub entry_bar: usize,
    pub entry_commission: f64,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.quantity > 0
    }

    pub fn is_short(&self) -> bool {
        self.quantity < 0
    }

    pub fn side(&self) -> PositionSide {
        if self.is_long() {
            PositionSide::Long
        } else if self.is_short() {
            PositionSide::Short
        } else {
            PositionSide::Flat
        }
    }

    /// Notional committed at entry: |quantity| * entry_price.
    pub fn entry_notional(&self) -> f64 {
        self.quantity.unsigned_abs() as f64 * self.entry_price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.entry_price)
    }

    /// Contribution to account equity at `price`.
    ///
    /// Both sides escrow their entry notional, so the value is that notional
    /// plus the open profit or loss. For a long this reduces to quantity * price.
    pub fn equity_value(&self, price: f64) -> f64 {
        self.entry_notional() + self.unrealized_pnl(price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub quantity: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_bar: usize,
    pub exit_bar: usize,
    /// Net of entry and exit commission.
    pub pnl: f64,
    pub commission: f64,
    /// Closed by the runner because the data ran out.
    pub end_of_data: bool,
}

impl ClosedTrade {
    pub fn is_long(&self) -> bool {
        self.quantity > 0
    }

    /// Net PnL as a fraction of the entry notional.
    pub fn return_pct(&self) -> f64 {
        let notional = self.quantity.unsigned_abs() as f64 * self.entry_price;
        if notional > 0.0 {
            self.pnl / notional
        } else {
            0.0
        }
    }
}
