pub mod calculator;
pub mod extractor;
pub mod scaling;

pub use calculator::FeatureCalculator;
pub use extractor::{FeatureExtractor, LABEL_COLUMN, RETURN_COLUMN};
pub use scaling::RobustScaler;
