use crate::types::LabeledEvent;
use serde::Serialize;

/// Leakage screen over a labeled event set: counts pairs whose horizon
/// windows `[entry, entry+H)` intersect and pairs closer than the
/// configured minimum gap.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndependenceReport {
    pub total_events: usize,
    pub overlapping_pairs: usize,
    pub gap_violations: usize,
    pub min_gap: usize,
    pub horizon: usize,
}

impl IndependenceReport {
    pub fn from_events(events: &[LabeledEvent], horizon: usize, min_gap: usize) -> Self {
        let mut report = Self {
            total_events: events.len(),
            min_gap,
            horizon,
            ..Self::default()
        };

        for (a, first) in events.iter().enumerate() {
            for second in events.iter().skip(a + 1) {
                let (lo, hi) = if first.entry_idx <= second.entry_idx {
                    (first.entry_idx, second.entry_idx)
                } else {
                    (second.entry_idx, first.entry_idx)
                };
                if hi < lo + horizon {
                    report.overlapping_pairs += 1;
                }
                if hi < lo + min_gap {
                    report.gap_violations += 1;
                }
            }
        }

        report
    }

    pub fn is_clean(&self) -> bool {
        self.overlapping_pairs == 0 && self.gap_violations == 0
    }

    pub fn log_warnings(&self) {
        if self.overlapping_pairs > 0 {
            log::warn!(
                "{} event pairs have overlapping horizon windows (possible label leakage)",
                self.overlapping_pairs
            );
        }
        if self.gap_violations > 0 {
            log::warn!(
                "{} event pairs violate the minimum gap of {}",
                self.gap_violations,
                self.min_gap
            );
        }
    }
}
