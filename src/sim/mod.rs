pub mod metrics;
pub mod portfolio;

pub use metrics::PerformanceSummary;
pub use portfolio::{PortfolioSimulator, SimulatedTrade, SizingMode};
