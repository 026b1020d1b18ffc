use super::decay::Decay;
use super::hard::HardBarrierLabeler;
use crate::types::{EnrichedObservation, EventIndex, LabeledEvent};

/// Time-to-barrier labeler. Runs the hard first-touch pass, then shrinks
/// the label magnitude by a decay of the normalized touch time, so earlier
/// touches carry more conviction. A vertical exit stays exactly 0.
pub struct TtbmLabeler {
    hard: HardBarrierLabeler,
    decay: Decay,
}

impl TtbmLabeler {
    pub fn new(hard: HardBarrierLabeler, decay: Decay) -> Self {
        Self { hard, decay }
    }

    pub fn label(
        &self,
        observations: &[EnrichedObservation],
        events: &[EventIndex],
    ) -> Vec<LabeledEvent> {
        let mut labeled = self.hard.label(observations, events);
        for event in &mut labeled {
            let factor = self.decay.factor(event.time_elapsed_ratio);
            event.decay_factor = factor;
            event.ttbm_label = (event.hard_label as f64 * factor).clamp(-1.0, 1.0);
        }
        labeled
    }
}
