pub mod boosted;
pub mod dataset;
pub mod learner;
pub mod pipeline;
pub mod split;

pub use boosted::GradientBoostedStumps;
pub use dataset::Dataset;
pub use learner::{LabelMapping, Learner};
pub use pipeline::{FoldScore, MlOutcome, MlPipeline};
pub use split::{ChronologicalSplit, ChronologicalSplitter, PurgedFold, PurgedKFold, SplitBounds};
