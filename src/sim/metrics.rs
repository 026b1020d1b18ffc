use serde::Serialize;

const STD_FLOOR: f64 = 1e-10;

/// Derived statistics of one completed capital walk.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub win_rate: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub steps: usize,
}

/// Largest fractional peak-to-valley decline along the capital curve.
pub fn max_drawdown(capital_curve: &[f64]) -> f64 {
    let mut max_dd = 0.0;
    let mut peak = match capital_curve.first() {
        Some(&first) => first,
        None => return 0.0,
    };

    for &value in capital_curve {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Annualized sharpe over per-trade fractional returns, zero risk-free rate.
/// A spread below 1e-10 yields 0 instead of a blow-up.
pub fn sharpe_ratio(trade_returns: &[f64], trading_days_per_year: f64) -> f64 {
    if trade_returns.is_empty() {
        return 0.0;
    }
    let avg = mean(trade_returns);
    let spread = std_dev(trade_returns);
    if spread < STD_FLOOR {
        return 0.0;
    }
    avg * trading_days_per_year / (spread * trading_days_per_year.sqrt())
}

/// Geometric annualization of the walk's total growth over its step count.
pub fn annualized_return(
    initial: f64,
    final_capital: f64,
    steps: usize,
    trading_days_per_year: f64,
) -> f64 {
    if steps == 0 || initial <= 0.0 {
        return 0.0;
    }
    (final_capital / initial).powf(trading_days_per_year / steps as f64) - 1.0
}

pub fn win_rate(winning: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    winning as f64 / total as f64
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|&v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
