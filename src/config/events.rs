use super::traits::ConfigSection;
use crate::error::TribarrierError;
use serde::{Deserialize, Serialize};

/// Event sampling knobs that sit outside the barrier geometry. The CUSUM
/// switch itself lives on [`BarrierConfig`](super::BarrierConfig).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Fixed spacing for periodic selection. `None` derives a dynamic
    /// interval of max(1, H/3) from the vertical window.
    pub event_interval: Option<usize>,
    /// Minimum bar gap enforced by the overlap purger. `None` defaults to
    /// the vertical window H.
    pub min_event_gap: Option<usize>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            event_interval: None,
            min_event_gap: None,
        }
    }
}

impl ConfigSection for EventConfig {
    fn section_name() -> &'static str {
        "events"
    }

    fn validate(&self) -> Result<(), TribarrierError> {
        if let Some(interval) = self.event_interval {
            if interval == 0 {
                return Err(TribarrierError::invalid_config(
                    "event_interval",
                    "must be at least 1 when set",
                ));
            }
        }
        Ok(())
    }
}
