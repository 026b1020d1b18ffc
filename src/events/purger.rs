use crate::types::EventIndex;

/// Drop events whose label horizons would overlap.
///
/// Greedy prefix pass in ascending index order: an event is kept only when,
/// against every already-kept event, it starts at least `min_gap` later and
/// its half-open horizon window `[j, j+horizon)` does not intersect the kept
/// event's window. `min_gap` defaults to the horizon itself. Empty input
/// passes through unchanged.
pub fn purge_overlaps(
    events: &[EventIndex],
    horizon: usize,
    min_gap: Option<usize>,
) -> Vec<EventIndex> {
    let gap = min_gap.unwrap_or(horizon);

    let mut ordered = events.to_vec();
    ordered.sort_unstable();

    let mut kept: Vec<EventIndex> = Vec::new();

    for &candidate in &ordered {
        let conflicts = kept.iter().any(|&prior| {
            let gap_violated = candidate < prior + gap;
            let windows_overlap = candidate < prior + horizon;
            gap_violated || windows_overlap
        });
        if !conflicts {
            kept.push(candidate);
        }
    }

    kept
}
