use crate::config::{BarrierConfig, DecayKind};

/// Time-decay applied to the hard label magnitude. `t` is the normalized
/// time-to-barrier in [0, 1]; all families return 1 at t = 0 and shrink as
/// the touch arrives later.
#[derive(Debug, Clone, Copy)]
pub struct Decay {
    pub kind: DecayKind,
    pub lambda: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl Decay {
    pub fn from_config(config: &BarrierConfig) -> Self {
        Self {
            kind: config.decay_kind,
            lambda: config.lambda,
            alpha: config.alpha,
            beta: config.beta,
        }
    }

    pub fn factor(&self, t: f64) -> f64 {
        match self.kind {
            DecayKind::Exponential => (-self.lambda * t).exp(),
            DecayKind::Linear => (1.0 - self.alpha * t).max(0.0),
            DecayKind::Hyperbolic => 1.0 / (1.0 + self.beta * t),
        }
    }
}
