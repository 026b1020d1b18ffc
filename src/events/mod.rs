pub mod purger;
pub mod selector;

pub use purger::purge_overlaps;
pub use selector::{cusum_events, EventSelector};
