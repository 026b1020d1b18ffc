use super::metrics::{self, PerformanceSummary};
use crate::config::SimulationConfig;
use crate::types::LabeledEvent;
use serde::Serialize;

/// How a prediction stream translates into position sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizingMode {
    /// Directional labels near +/-1 commit the fixed hard fraction.
    Hard,
    /// Graded signals above the threshold commit a scaled, capped fraction.
    Soft,
}

/// One step of the capital walk that actually took a position.
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedTrade {
    pub entry_idx: usize,
    pub prediction: f64,
    pub position_pct: f64,
    pub realized_return: f64,
    pub pnl_fraction: f64,
    pub capital_after: f64,
    pub winning: bool,
}

/// Compounds capital event-by-event from a prediction stream and the labeled
/// events those predictions belong to. Each step sizes a position, applies
/// the realized barrier-to-barrier return, and snapshots the capital curve.
pub struct PortfolioSimulator {
    config: SimulationConfig,
    mode: SizingMode,
    pub capital: f64,
    pub peak_capital: f64,
    pub trough_capital: f64,
    pub capital_curve: Vec<f64>,
    pub trades: Vec<SimulatedTrade>,
    steps_walked: usize,
}

impl PortfolioSimulator {
    pub fn new(config: SimulationConfig, mode: SizingMode) -> Self {
        let initial = config.initial_capital;
        Self {
            config,
            mode,
            capital: initial,
            peak_capital: initial,
            trough_capital: initial,
            capital_curve: vec![initial],
            trades: Vec::new(),
            steps_walked: 0,
        }
    }

    /// Walk the prediction stream against its events, truncated to the
    /// shorter of the two.
    pub fn walk(&mut self, predictions: &[f64], events: &[LabeledEvent]) {
        let steps = predictions.len().min(events.len());
        for k in 0..steps {
            self.process_event(predictions[k], &events[k]);
        }
        log::debug!(
            "walked {} steps in {:?} mode: capital {:.2} -> {:.2}, {} trades",
            steps,
            self.mode,
            self.config.initial_capital,
            self.capital,
            self.trades.len()
        );
    }

    fn process_event(&mut self, prediction: f64, event: &LabeledEvent) {
        let position_pct = self.position_size(prediction);
        let realized_return = event.realized_return();
        let pnl_fraction = position_pct * realized_return;

        self.capital *= 1.0 + pnl_fraction;

        if position_pct.abs() > self.config.trade_epsilon {
            self.trades.push(SimulatedTrade {
                entry_idx: event.entry_idx,
                prediction,
                position_pct,
                realized_return,
                pnl_fraction,
                capital_after: self.capital,
                winning: pnl_fraction > 0.0,
            });
        }

        if self.capital > self.peak_capital {
            self.peak_capital = self.capital;
        }
        if self.capital < self.trough_capital {
            self.trough_capital = self.capital;
        }
        self.capital_curve.push(self.capital);
        self.steps_walked += 1;
    }

    /// Capital fraction committed for one prediction, signed by direction.
    fn position_size(&self, prediction: f64) -> f64 {
        match self.mode {
            SizingMode::Hard => {
                let tolerance = self.config.hard_label_tolerance;
                if (prediction - 1.0).abs() <= tolerance {
                    self.config.hard_position_pct
                } else if (prediction + 1.0).abs() <= tolerance {
                    -self.config.hard_position_pct
                } else {
                    0.0
                }
            }
            SizingMode::Soft => {
                if prediction.abs() > self.config.signal_threshold {
                    let magnitude = (prediction.abs() * self.config.soft_position_scale)
                        .min(self.config.soft_position_max);
                    prediction.signum() * magnitude
                } else {
                    0.0
                }
            }
        }
    }

    pub fn summary(&self) -> PerformanceSummary {
        let initial = self.config.initial_capital;
        let trade_returns: Vec<f64> = self.trades.iter().map(|t| t.pnl_fraction).collect();
        let winning = self.trades.iter().filter(|t| t.winning).count();

        PerformanceSummary {
            initial_capital: initial,
            final_capital: self.capital,
            total_return: (self.capital - initial) / initial,
            annualized_return: metrics::annualized_return(
                initial,
                self.capital,
                self.steps_walked,
                self.config.trading_days_per_year,
            ),
            max_drawdown: metrics::max_drawdown(&self.capital_curve),
            sharpe_ratio: metrics::sharpe_ratio(
                &trade_returns,
                self.config.trading_days_per_year,
            ),
            win_rate: metrics::win_rate(winning, self.trades.len()),
            total_trades: self.trades.len(),
            winning_trades: winning,
            steps: self.steps_walked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(entry_idx: usize, entry_price: f64, exit_price: f64) -> LabeledEvent {
        LabeledEvent {
            entry_idx,
            entry_time: String::new(),
            exit_idx: entry_idx + 1,
            exit_time: String::new(),
            entry_price,
            exit_price,
            hard_label: if exit_price > entry_price { 1 } else { -1 },
            ttbm_label: 0.0,
            periods_to_exit: 1,
            time_elapsed_ratio: 0.25,
            decay_factor: 1.0,
            profit_barrier: entry_price * 1.02,
            stop_barrier: entry_price * 0.99,
            entry_volatility: 0.01,
        }
    }

    fn config() -> SimulationConfig {
        SimulationConfig::default()
    }

    #[test]
    fn hard_mode_sizes_only_near_unit_labels() {
        let sim = PortfolioSimulator::new(config(), SizingMode::Hard);
        assert_eq!(sim.position_size(1.0), 0.1);
        assert_eq!(sim.position_size(0.95), 0.1);
        assert_eq!(sim.position_size(-1.05), -0.1);
        assert_eq!(sim.position_size(0.85), 0.0);
        assert_eq!(sim.position_size(0.0), 0.0);
    }

    #[test]
    fn soft_mode_scales_and_caps() {
        let sim = PortfolioSimulator::new(config(), SizingMode::Soft);
        // 0.5 * 0.2 = 0.1, under the 0.15 cap
        assert!((sim.position_size(0.5) - 0.1).abs() < 1e-12);
        // 1.0 * 0.2 = 0.2, capped at 0.15
        assert!((sim.position_size(1.0) - 0.15).abs() < 1e-12);
        assert!((sim.position_size(-0.9) + 0.15).abs() < 1e-12);
        // below the 0.1 threshold
        assert_eq!(sim.position_size(0.05), 0.0);
    }

    #[test]
    fn capital_compounds_over_traded_steps() {
        let mut sim = PortfolioSimulator::new(config(), SizingMode::Hard);
        let events = vec![
            event(0, 100.0, 105.0),
            event(10, 100.0, 102.0),
            event(20, 100.0, 101.0),
        ];
        sim.walk(&[1.0, -1.0, 0.0], &events);

        // 10000 * (1 + 0.1*0.05) * (1 - 0.1*0.02), third step untraded
        let expected = 10_000.0 * 1.005 * 0.998;
        assert!((sim.capital - expected).abs() < 1e-9);
        assert_eq!(sim.trades.len(), 2);
        assert!(sim.trades[0].winning);
        assert!(!sim.trades[1].winning);
        assert_eq!(sim.capital_curve.len(), 4);
        assert_eq!(sim.capital_curve[0], 10_000.0);
    }

    #[test]
    fn walk_truncates_to_shorter_input() {
        let mut sim = PortfolioSimulator::new(config(), SizingMode::Hard);
        let events = vec![event(0, 100.0, 101.0)];
        sim.walk(&[1.0, 1.0, 1.0], &events);
        assert_eq!(sim.steps_walked, 1);
        assert_eq!(sim.capital_curve.len(), 2);
    }

    #[test]
    fn peak_and_trough_track_the_walk() {
        let mut cfg = config();
        cfg.hard_position_pct = 1.0;
        let mut sim = PortfolioSimulator::new(cfg, SizingMode::Hard);
        let events = vec![
            event(0, 100.0, 110.0),
            event(10, 100.0, 80.0),
            event(20, 100.0, 110.0),
        ];
        sim.walk(&[1.0, 1.0, 1.0], &events);

        // 10000 -> 11000 -> 8800 -> 9680
        assert!((sim.peak_capital - 11_000.0).abs() < 1e-9);
        assert!((sim.trough_capital - 8_800.0).abs() < 1e-9);
        let summary = sim.summary();
        assert!((summary.max_drawdown - 2_200.0 / 11_000.0).abs() < 1e-12);
    }

    #[test]
    fn summary_reports_trade_statistics() {
        let mut sim = PortfolioSimulator::new(config(), SizingMode::Hard);
        let events = vec![event(0, 100.0, 105.0), event(10, 100.0, 98.0)];
        sim.walk(&[1.0, 1.0], &events);

        let summary = sim.summary();
        assert_eq!(summary.total_trades, 2);
        assert_eq!(summary.winning_trades, 1);
        assert!((summary.win_rate - 0.5).abs() < 1e-12);
        let expected_final = 10_000.0 * 1.005 * 0.998;
        assert!((summary.final_capital - expected_final).abs() < 1e-9);
        assert!(
            (summary.total_return - (expected_final - 10_000.0) / 10_000.0).abs() < 1e-12
        );
        assert_eq!(summary.steps, 2);
    }

    #[test]
    fn untraded_walk_leaves_capital_flat() {
        let mut sim = PortfolioSimulator::new(config(), SizingMode::Soft);
        let events = vec![event(0, 100.0, 105.0), event(10, 100.0, 95.0)];
        sim.walk(&[0.01, -0.02], &events);

        let summary = sim.summary();
        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.final_capital, 10_000.0);
        assert_eq!(summary.sharpe_ratio, 0.0);
        assert_eq!(summary.max_drawdown, 0.0);
    }
}
