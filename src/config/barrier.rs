use super::traits::ConfigSection;
use crate::error::TribarrierError;
use serde::{Deserialize, Serialize};

/// Which labeler runs over the event set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelingKind {
    /// First-touch categorical label in {-1, 0, +1}.
    Hard,
    /// Time-to-Barrier Modification: hard label scaled by a decay of the
    /// normalized touch time, continuous in [-1, +1].
    Ttbm,
}

/// Decay family applied to the normalized time-to-barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayKind {
    Exponential,
    Linear,
    Hyperbolic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrierConfig {
    /// Profit barrier distance in entry-volatility multiples.
    pub profit_multiple: f64,
    /// Stop barrier distance in entry-volatility multiples.
    pub stop_multiple: f64,
    /// Vertical barrier: maximum holding period in bars (H).
    pub vertical_window: usize,
    /// Rolling window for the log-return volatility estimate (W).
    pub volatility_window: usize,
    /// Select events with the CUSUM filter instead of periodic sampling.
    pub use_cusum: bool,
    /// CUSUM trigger threshold on the volatility-normalized sums.
    pub cusum_threshold: f64,
    pub labeling_kind: LabelingKind,
    pub decay_kind: DecayKind,
    /// Exponential decay rate.
    pub lambda: f64,
    /// Linear decay slope.
    pub alpha: f64,
    /// Hyperbolic decay rate.
    pub beta: f64,
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            profit_multiple: 2.0,
            stop_multiple: 1.0,
            vertical_window: 10,
            volatility_window: 20,
            use_cusum: false,
            cusum_threshold: 5.0,
            labeling_kind: LabelingKind::Hard,
            decay_kind: DecayKind::Exponential,
            lambda: 1.0,
            alpha: 0.5,
            beta: 2.0,
        }
    }
}

impl ConfigSection for BarrierConfig {
    fn section_name() -> &'static str {
        "barrier"
    }

    fn validate(&self) -> Result<(), TribarrierError> {
        if self.profit_multiple <= 0.0 {
            return Err(TribarrierError::invalid_config(
                "profit_multiple",
                "must be positive",
            ));
        }
        if self.stop_multiple <= 0.0 {
            return Err(TribarrierError::invalid_config(
                "stop_multiple",
                "must be positive",
            ));
        }
        if self.vertical_window < 1 {
            return Err(TribarrierError::invalid_config(
                "vertical_window",
                "must be at least 1 bar",
            ));
        }
        if self.volatility_window < 2 {
            return Err(TribarrierError::invalid_config(
                "volatility_window",
                "must be at least 2 bars",
            ));
        }
        if self.use_cusum && self.cusum_threshold <= 0.0 {
            return Err(TribarrierError::invalid_config(
                "cusum_threshold",
                "must be positive when use_cusum is set",
            ));
        }
        if self.lambda <= 0.0 {
            return Err(TribarrierError::invalid_config(
                "lambda",
                "must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(TribarrierError::invalid_config(
                "alpha",
                "must lie in [0, 1]",
            ));
        }
        if self.beta <= 0.0 {
            return Err(TribarrierError::invalid_config("beta", "must be positive"));
        }
        Ok(())
    }
}
