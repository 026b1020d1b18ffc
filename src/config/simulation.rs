use super::traits::ConfigSection;
use crate::error::TribarrierError;
use serde::{Deserialize, Serialize};

/// Portfolio walk constants. Everything the simulator defaults lives here so
/// no sizing percentage or epsilon hides in the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    /// Capital fraction committed per trade in hard-label mode.
    pub hard_position_pct: f64,
    /// Tolerance around +/-1 for recognizing a hard prediction.
    pub hard_label_tolerance: f64,
    /// |prediction| below this produces no position in soft mode.
    pub signal_threshold: f64,
    /// Capital fraction scale applied to |prediction| in soft mode.
    pub soft_position_scale: f64,
    /// Cap on the soft-mode position fraction.
    pub soft_position_max: f64,
    /// |position| above this counts as a trade.
    pub trade_epsilon: f64,
    pub trading_days_per_year: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            hard_position_pct: 0.1,
            hard_label_tolerance: 0.1,
            signal_threshold: 0.1,
            soft_position_scale: 0.2,
            soft_position_max: 0.15,
            trade_epsilon: 1e-6,
            trading_days_per_year: 252.0,
        }
    }
}

impl ConfigSection for SimulationConfig {
    fn section_name() -> &'static str {
        "simulation"
    }

    fn validate(&self) -> Result<(), TribarrierError> {
        if self.initial_capital <= 0.0 {
            return Err(TribarrierError::invalid_config(
                "initial_capital",
                "must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.hard_position_pct) {
            return Err(TribarrierError::invalid_config(
                "hard_position_pct",
                "must lie in [0, 1]",
            ));
        }
        if self.soft_position_scale < 0.0 || self.soft_position_max < 0.0 {
            return Err(TribarrierError::invalid_config(
                "soft_position_scale",
                "soft sizing fractions must be non-negative",
            ));
        }
        if self.signal_threshold < 0.0 {
            return Err(TribarrierError::invalid_config(
                "signal_threshold",
                "must be non-negative",
            ));
        }
        if self.trading_days_per_year <= 0.0 {
            return Err(TribarrierError::invalid_config(
                "trading_days_per_year",
                "must be positive",
            ));
        }
        Ok(())
    }
}
