//! Performance metrics and statistics.

use super::backtest::BacktestResult;
use super::indicator::stddev::{Deviation, mean, stddev};
use super::ohlcv::OhlcvBar;
use super::portfolio::EquityPoint;
use chrono::NaiveDate;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub duration_days: i64,
    pub exposure: f64,
    pub final_equity: f64,
    pub peak_equity: f64,
    pub total_return: f64,
    pub buy_and_hold_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: i64,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    /// Per-trade returns as fractions of entry notional.
    pub best_trade_return: f64,
    pub worst_trade_return: f64,
    pub avg_trade_return: f64,
    pub avg_trade_duration: f64,
    pub commissions: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult, bars: &[OhlcvBar], risk_free_rate: f64) -> Self {
        let portfolio = &result.portfolio;
        let equity_curve = &portfolio.equity_curve;
        let trades = &portfolio.closed_trades;
        let initial_capital = portfolio.initial_capital;

        let start = bars.first().map(|b| b.date);
        let end = bars.last().map(|b| b.date);
        let duration_days = match (start, end) {
            (Some(s), Some(e)) => (e - s).num_days(),
            _ => 0,
        };

        let exposure = if bars.is_empty() {
            0.0
        } else {
            result.bars_in_market as f64 / bars.len() as f64
        };

        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);
        let peak_equity = equity_curve
            .iter()
            .map(|p| p.equity)
            .fold(initial_capital, f64::max);

        let total_return = if initial_capital > 0.0 {
            (final_equity - initial_capital) / initial_capital
        } else {
            0.0
        };

        let buy_and_hold_return = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) if first.close > 0.0 => {
                (last.close - first.close) / first.close
            }
            _ => 0.0,
        };

        let trading_days = equity_curve.len() as f64;
        let years = trading_days / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return.is_finite() && total_return > -1.0
        {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);

        let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
        let (sharpe_ratio, sortino_ratio) = compute_risk_adjusted(equity_curve, daily_rf);

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_duration_days = 0i64;
        let mut commissions = 0.0_f64;
        let mut best_trade_return = f64::NEG_INFINITY;
        let mut worst_trade_return = f64::INFINITY;
        let mut sum_trade_return = 0.0_f64;

        for trade in trades {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }

            let ret = trade.return_pct();
            best_trade_return = best_trade_return.max(ret);
            worst_trade_return = worst_trade_return.min(ret);
            sum_trade_return += ret;

            total_duration_days += (trade.exit_date - trade.entry_date).num_days();
            commissions += trade.commission;
        }

        let total_trades = trades.len();
        let (best_trade_return, worst_trade_return, avg_trade_return) = if total_trades > 0 {
            (
                best_trade_return,
                worst_trade_return,
                sum_trade_return / total_trades as f64,
            )
        } else {
            (0.0, 0.0, 0.0)
        };
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };

        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        let avg_trade_duration = if total_trades > 0 {
            total_duration_days as f64 / total_trades as f64
        } else {
            0.0
        };

        Metrics {
            start,
            end,
            duration_days,
            exposure,
            final_equity,
            peak_equity,
            total_return,
            buy_and_hold_return,
            annualized_return,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            max_drawdown_duration,
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            best_trade_return,
            worst_trade_return,
            avg_trade_return,
            avg_trade_duration,
            commissions,
        }
    }
}

/// Maximum peak-to-trough decline and the longest run of bars spent below a peak.
fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, i64) {
    if equity_curve.is_empty() {
        return (0.0, 0);
    }

    let mut peak = equity_curve[0].equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0i64;
    let mut current_dd_duration = 0i64;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            max_dd = max_dd.max(dd);
            current_dd_duration += 1;
            max_dd_duration = max_dd_duration.max(current_dd_duration);
        }
    }

    (max_dd, max_dd_duration)
}

fn compute_risk_adjusted(equity_curve: &[EquityPoint], daily_rf: f64) -> (f64, f64) {
    if equity_curve.len() < 2 {
        return (0.0, 0.0);
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 { (curr - prev) / prev } else { 0.0 }
        })
        .collect();

    let (Some(avg), Some(sd)) = (mean(&returns), stddev(&returns, Deviation::Population)) else {
        return (0.0, 0.0);
    };

    let excess_return = avg - daily_rf;
    let annualizer = TRADING_DAYS_PER_YEAR.sqrt();

    let sharpe = if sd > 0.0 {
        (excess_return / sd) * annualizer
    } else {
        0.0
    };

    let downside_sum: f64 = returns
        .iter()
        .filter(|&&r| r < daily_rf)
        .map(|&r| (r - daily_rf).powi(2))
        .sum();
    let downside_sd = (downside_sum / returns.len() as f64).sqrt();

    let sortino = if downside_sd > 0.0 {
        (excess_return / downside_sd) * annualizer
    } else {
        0.0
    };

    (sharpe, sortino)
}
