use crate::types::{ExitKind, LabeledEvent};
use serde::Serialize;

/// Aggregate view of a labeled event set, suitable for JSON reporting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BarrierDiagnostics {
    pub total_events: usize,
    pub profit_exits: usize,
    pub stop_exits: usize,
    pub vertical_exits: usize,
    pub profit_pct: f64,
    pub stop_pct: f64,
    pub vertical_pct: f64,
    pub volatility_min: f64,
    pub volatility_mean: f64,
    pub volatility_max: f64,
    pub mean_periods_profit: f64,
    pub mean_periods_stop: f64,
    pub mean_periods_vertical: f64,
    pub mean_profit_barrier: f64,
    pub mean_stop_barrier: f64,
    pub mean_profit_width_pct: f64,
    pub mean_stop_width_pct: f64,
}

impl BarrierDiagnostics {
    /// Summarize the labeled set. Non-finite entry volatilities and barrier
    /// levels are left out of the aggregates so warm-up events cannot poison
    /// the means.
    pub fn from_events(events: &[LabeledEvent]) -> Self {
        let mut diag = Self::default();
        diag.total_events = events.len();
        if events.is_empty() {
            return diag;
        }

        let mut periods_profit = Vec::new();
        let mut periods_stop = Vec::new();
        let mut periods_vertical = Vec::new();
        let mut volatilities = Vec::new();
        let mut profit_barriers = Vec::new();
        let mut stop_barriers = Vec::new();
        let mut profit_widths = Vec::new();
        let mut stop_widths = Vec::new();

        for event in events {
            match event.exit_kind() {
                ExitKind::ProfitTake => {
                    diag.profit_exits += 1;
                    periods_profit.push(event.periods_to_exit as f64);
                }
                ExitKind::StopLoss => {
                    diag.stop_exits += 1;
                    periods_stop.push(event.periods_to_exit as f64);
                }
                ExitKind::Vertical => {
                    diag.vertical_exits += 1;
                    periods_vertical.push(event.periods_to_exit as f64);
                }
            }

            if event.entry_volatility.is_finite() {
                volatilities.push(event.entry_volatility);
            }
            if event.profit_barrier.is_finite() && event.stop_barrier.is_finite() {
                profit_barriers.push(event.profit_barrier);
                stop_barriers.push(event.stop_barrier);
                if event.entry_price > 0.0 {
                    profit_widths.push(
                        (event.profit_barrier - event.entry_price) / event.entry_price * 100.0,
                    );
                    stop_widths.push(
                        (event.entry_price - event.stop_barrier) / event.entry_price * 100.0,
                    );
                }
            }
        }

        let total = diag.total_events as f64;
        diag.profit_pct = diag.profit_exits as f64 / total * 100.0;
        diag.stop_pct = diag.stop_exits as f64 / total * 100.0;
        diag.vertical_pct = diag.vertical_exits as f64 / total * 100.0;

        diag.volatility_min = volatilities.iter().cloned().fold(f64::INFINITY, f64::min);
        diag.volatility_max = volatilities
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        diag.volatility_mean = mean(&volatilities);
        if volatilities.is_empty() {
            diag.volatility_min = f64::NAN;
            diag.volatility_max = f64::NAN;
        }

        diag.mean_periods_profit = mean(&periods_profit);
        diag.mean_periods_stop = mean(&periods_stop);
        diag.mean_periods_vertical = mean(&periods_vertical);
        diag.mean_profit_barrier = mean(&profit_barriers);
        diag.mean_stop_barrier = mean(&stop_barriers);
        diag.mean_profit_width_pct = mean(&profit_widths);
        diag.mean_stop_width_pct = mean(&stop_widths);

        diag
    }

    pub fn log_summary(&self) {
        log::info!(
            "labels: {} total ({} profit / {} stop / {} vertical)",
            self.total_events,
            self.profit_exits,
            self.stop_exits,
            self.vertical_exits
        );
        log::info!(
            "entry volatility: min {:.6} mean {:.6} max {:.6}",
            self.volatility_min,
            self.volatility_mean,
            self.volatility_max
        );
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
