pub mod barrier;
pub mod events;
pub mod features;
pub mod manager;
pub mod ml;
pub mod simulation;
pub mod traits;

pub use barrier::{BarrierConfig, DecayKind, LabelingKind};
pub use events::EventConfig;
pub use features::FeatureConfig;
pub use manager::{AppConfig, ConfigManager};
pub use ml::{LearnerConfig, MlConfig, Objective};
pub use simulation::SimulationConfig;
