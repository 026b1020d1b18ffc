use super::traits::ConfigSection;
use crate::error::TribarrierError;
use serde::{Deserialize, Serialize};

/// Feature family toggles. Disabling a family drops its columns from the
/// extracted matrix, and any enhancement column missing a base is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub price_features: bool,
    pub momentum_features: bool,
    pub volatility_features: bool,
    pub temporal_features: bool,
    /// Regression-path derived columns (volume ratios, vol-adjusted returns).
    pub enhanced_features: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            price_features: true,
            momentum_features: true,
            volatility_features: true,
            temporal_features: true,
            enhanced_features: true,
        }
    }
}

impl ConfigSection for FeatureConfig {
    fn section_name() -> &'static str {
        "features"
    }

    fn validate(&self) -> Result<(), TribarrierError> {
        if !(self.price_features
            || self.momentum_features
            || self.volatility_features
            || self.temporal_features)
        {
            return Err(TribarrierError::invalid_config(
                "features",
                "at least one feature family must be enabled",
            ));
        }
        Ok(())
    }
}
