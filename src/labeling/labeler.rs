use super::decay::Decay;
use super::hard::HardBarrierLabeler;
use super::ttbm::TtbmLabeler;
use crate::config::{BarrierConfig, LabelingKind};
use crate::types::{EnrichedObservation, EventIndex, LabeledEvent};

/// Labeler variant picked at config time.
pub enum EventLabeler {
    Hard(HardBarrierLabeler),
    Ttbm(TtbmLabeler),
}

impl EventLabeler {
    pub fn from_config(config: &BarrierConfig) -> Self {
        let hard = HardBarrierLabeler::new(
            config.profit_multiple,
            config.stop_multiple,
            config.vertical_window,
        );
        match config.labeling_kind {
            LabelingKind::Hard => Self::Hard(hard),
            LabelingKind::Ttbm => Self::Ttbm(TtbmLabeler::new(hard, Decay::from_config(config))),
        }
    }

    pub fn label(
        &self,
        observations: &[EnrichedObservation],
        events: &[EventIndex],
    ) -> Vec<LabeledEvent> {
        match self {
            Self::Hard(labeler) => labeler.label(observations, events),
            Self::Ttbm(labeler) => labeler.label(observations, events),
        }
    }
}
