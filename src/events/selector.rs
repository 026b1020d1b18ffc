use crate::config::{BarrierConfig, EventConfig};
use crate::types::{EnrichedObservation, EventIndex};

/// Strategy for picking hypothetical trade-entry indices. Chosen once at
/// config time and carried as a tagged variant.
#[derive(Debug, Clone, PartialEq)]
pub enum EventSelector {
    /// Events at 0, k, 2k, ...
    Periodic { interval: usize },
    /// Periodic with interval derived from the vertical window.
    DynamicPeriodic { vertical_window: usize },
    /// CUSUM filter over volatility-normalized price changes.
    Cusum { threshold: f64 },
}

impl EventSelector {
    pub fn from_config(barrier: &BarrierConfig, events: &EventConfig) -> Self {
        if barrier.use_cusum {
            Self::Cusum {
                threshold: barrier.cusum_threshold,
            }
        } else if let Some(interval) = events.event_interval {
            Self::Periodic { interval }
        } else {
            Self::DynamicPeriodic {
                vertical_window: barrier.vertical_window,
            }
        }
    }

    /// Produce the ordered event index set for the enriched sequence.
    pub fn select(&self, observations: &[EnrichedObservation]) -> Vec<EventIndex> {
        let selected = match self {
            Self::Periodic { interval } => periodic_events(observations.len(), *interval),
            Self::DynamicPeriodic { vertical_window } => {
                let interval = (*vertical_window / 3).max(1);
                periodic_events(observations.len(), interval)
            }
            Self::Cusum { threshold } => {
                let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();
                let volatility: Vec<f64> = observations.iter().map(|o| o.volatility).collect();
                cusum_events(&prices, &volatility, *threshold)
            }
        };
        log::debug!("selected {} event indices via {:?}", selected.len(), self);
        selected
    }
}

fn periodic_events(n: usize, interval: usize) -> Vec<EventIndex> {
    if interval == 0 {
        return Vec::new();
    }
    (0..n).step_by(interval).collect()
}

/// Symmetric CUSUM filter.
///
/// Walks i = 1..N-1 accumulating volatility-normalized price changes into
/// an upper and a lower sum. Crossing the threshold in either direction
/// emits the index and resets both sums. Mismatched inputs or a
/// non-positive threshold yield an empty set rather than an error.
pub fn cusum_events(prices: &[f64], volatility: &[f64], threshold: f64) -> Vec<EventIndex> {
    if prices.len() != volatility.len() || prices.is_empty() {
        return Vec::new();
    }
    if threshold <= 0.0 {
        return Vec::new();
    }

    let mut events = Vec::new();
    let mut s_pos = 0.0_f64;
    let mut s_neg = 0.0_f64;

    for i in 1..prices.len() {
        let sigma = volatility[i];
        let x = if sigma > 0.0 {
            (prices[i] - prices[i - 1]) / sigma
        } else {
            0.0
        };

        s_pos = (s_pos + x).max(0.0);
        s_neg = (s_neg + x).min(0.0);

        if s_pos > threshold || s_neg < -threshold {
            events.push(i);
            s_pos = 0.0;
            s_neg = 0.0;
        }
    }

    events
}
