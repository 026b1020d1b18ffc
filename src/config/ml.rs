use super::traits::ConfigSection;
use crate::error::TribarrierError;
use serde::{Deserialize, Serialize};

/// Learning objective of the boosted ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    /// Integer hard labels; multi-class handled by transparent remapping.
    Classification,
    /// Real-valued TTBM labels.
    Regression,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MlConfig {
    pub objective: Objective,
    /// Fraction of usable rows reserved for the test block.
    pub test_size: f64,
    /// Fraction of usable rows reserved for the validation block.
    pub val_size: f64,
    /// Embargo bars excluded on each side of the validation block.
    pub embargo: usize,
    /// Folds for the purged k-fold cross-validation variant.
    pub cv_folds: usize,
    /// Drop rows whose observed return z-score exceeds this. `None` keeps all.
    pub return_outlier_z: Option<f64>,
    pub learner: LearnerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    /// Row fraction sampled per boosting round.
    pub subsample: f64,
    /// Worker threads used inside fit. The rest of the pipeline stays
    /// single-threaded.
    pub num_threads: usize,
    pub seed: u64,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            subsample: 1.0,
            num_threads: 1,
            seed: 42,
        }
    }
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            objective: Objective::Classification,
            test_size: 0.2,
            val_size: 0.1,
            embargo: 5,
            cv_folds: 5,
            return_outlier_z: None,
            learner: LearnerConfig::default(),
        }
    }
}

impl ConfigSection for MlConfig {
    fn section_name() -> &'static str {
        "ml"
    }

    fn validate(&self) -> Result<(), TribarrierError> {
        if !(0.0..1.0).contains(&self.test_size) {
            return Err(TribarrierError::invalid_config(
                "test_size",
                "must lie in [0, 1)",
            ));
        }
        if !(0.0..1.0).contains(&self.val_size) {
            return Err(TribarrierError::invalid_config(
                "val_size",
                "must lie in [0, 1)",
            ));
        }
        if self.test_size + self.val_size >= 1.0 {
            return Err(TribarrierError::invalid_config(
                "test_size",
                "test_size + val_size must leave room for training data",
            ));
        }
        if self.cv_folds < 2 {
            return Err(TribarrierError::invalid_config(
                "cv_folds",
                "needs at least 2 folds",
            ));
        }
        if let Some(z) = self.return_outlier_z {
            if z <= 0.0 {
                return Err(TribarrierError::invalid_config(
                    "return_outlier_z",
                    "must be positive when set",
                ));
            }
        }
        if self.learner.n_estimators == 0 {
            return Err(TribarrierError::invalid_config(
                "learner.n_estimators",
                "must be at least 1",
            ));
        }
        if self.learner.learning_rate <= 0.0 {
            return Err(TribarrierError::invalid_config(
                "learner.learning_rate",
                "must be positive",
            ));
        }
        if !(0.0 < self.learner.subsample && self.learner.subsample <= 1.0) {
            return Err(TribarrierError::invalid_config(
                "learner.subsample",
                "must lie in (0, 1]",
            ));
        }
        if self.learner.num_threads == 0 {
            return Err(TribarrierError::invalid_config(
                "learner.num_threads",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
