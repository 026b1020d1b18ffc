use crate::types::{EnrichedObservation, EventIndex, LabeledEvent};

/// First-touch categorical labeler.
///
/// For each event the profit barrier sits at `p0 * (1 + m_p * sigma)` and
/// the stop barrier at `p0 * (1 - m_s * sigma)`; the path is scanned up to
/// the vertical window and the first barrier touched decides the label.
/// Profit wins when both barriers are touched on the same bar.
pub struct HardBarrierLabeler {
    pub profit_multiple: f64,
    pub stop_multiple: f64,
    pub vertical_window: usize,
}

impl HardBarrierLabeler {
    pub fn new(profit_multiple: f64, stop_multiple: f64, vertical_window: usize) -> Self {
        Self {
            profit_multiple,
            stop_multiple,
            vertical_window,
        }
    }

    /// Label every in-range event. Indices past the end of the series are
    /// skipped silently.
    pub fn label(
        &self,
        observations: &[EnrichedObservation],
        events: &[EventIndex],
    ) -> Vec<LabeledEvent> {
        let mut labeled = Vec::with_capacity(events.len());
        for &entry_idx in events {
            if let Some(event) = self.label_single_event(observations, entry_idx) {
                labeled.push(event);
            }
        }
        labeled
    }

    fn label_single_event(
        &self,
        observations: &[EnrichedObservation],
        entry_idx: usize,
    ) -> Option<LabeledEvent> {
        let entry = observations.get(entry_idx)?;
        let entry_price = entry.price;
        let sigma = entry.volatility;

        let profit_barrier = entry_price * (1.0 + self.profit_multiple * sigma);
        let stop_barrier = entry_price * (1.0 - self.stop_multiple * sigma);

        let last_idx = observations.len() - 1;
        let end_idx = (entry_idx + self.vertical_window).min(last_idx);

        // Earliest touch of each barrier. NaN volatility makes both barriers
        // NaN, so neither comparison fires and the event exits vertically.
        let mut profit_hit: Option<usize> = None;
        let mut stop_hit: Option<usize> = None;

        for i in (entry_idx + 1)..=end_idx {
            let price = observations[i].price;
            if profit_hit.is_none() && price >= profit_barrier {
                profit_hit = Some(i);
            }
            if stop_hit.is_none() && price <= stop_barrier {
                stop_hit = Some(i);
            }
            if profit_hit.is_some() && stop_hit.is_some() {
                break;
            }
        }

        let (hard_label, exit_idx) = match (profit_hit, stop_hit) {
            (Some(p), Some(s)) if p <= s => (1, p),
            (Some(_), Some(s)) => (-1, s),
            (Some(p), None) => (1, p),
            (None, Some(s)) => (-1, s),
            (None, None) => (0, end_idx),
        };

        let exit = &observations[exit_idx];
        let periods_to_exit = exit_idx - entry_idx;
        let time_elapsed_ratio =
            (periods_to_exit as f64 / self.vertical_window as f64).min(1.0);

        Some(LabeledEvent {
            entry_idx,
            entry_time: entry.timestamp.clone(),
            exit_idx,
            exit_time: exit.timestamp.clone(),
            entry_price,
            exit_price: exit.price,
            hard_label,
            ttbm_label: hard_label as f64,
            periods_to_exit,
            time_elapsed_ratio,
            decay_factor: 1.0,
            profit_barrier,
            stop_barrier,
            entry_volatility: sigma,
        })
    }
}
