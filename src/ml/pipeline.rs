use super::boosted::GradientBoostedStumps;
use super::dataset::Dataset;
use super::learner::{LabelMapping, Learner};
use super::split::{ChronologicalSplitter, PurgedKFold, SplitBounds};
use crate::config::{MlConfig, Objective};
use crate::error::{Result, TribarrierError};
use polars::prelude::*;
use serde::Serialize;

const SIGNAL_FLOOR: f32 = 1e-6;

/// Train-then-predict orchestration over a feature frame.
///
/// Cleans the frame, splits it chronologically, fits the boosted learner
/// on the train block and emits signals for the test block: decoded class
/// labels for classification, max-normalized raw scores for regression.
pub struct MlPipeline {
    config: MlConfig,
}

/// Test-block output of one pipeline run. `test_source_rows` holds the
/// pre-cleaning frame row of each prediction so callers can line signals
/// up with the originating labeled events.
#[derive(Debug, Clone)]
pub struct MlOutcome {
    pub signals: Vec<f64>,
    pub class_predictions: Option<Vec<i32>>,
    pub probabilities: Option<Vec<f32>>,
    pub test_source_rows: Vec<usize>,
    pub bounds: SplitBounds,
    pub cleaned_samples: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoldScore {
    pub fold: usize,
    pub train_size: usize,
    pub validation_size: usize,
    pub accuracy: Option<f64>,
    pub mse: Option<f64>,
}

impl MlPipeline {
    pub fn new(config: MlConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, frame: &DataFrame) -> Result<MlOutcome> {
        let dataset = Dataset::from_frame(frame, self.config.return_outlier_z)?;
        let splitter = ChronologicalSplitter::new(
            self.config.test_size,
            self.config.val_size,
            self.config.embargo,
        );
        let bounds = splitter.bounds(dataset.len())?;
        let train = dataset.slice(bounds.train_range());
        let test = dataset.slice(bounds.test_range());

        log::info!(
            "training on {} samples, testing on {} ({} features, embargo {})",
            train.len(),
            test.len(),
            dataset.feature_names.len(),
            bounds.embargo
        );

        let mut learner =
            GradientBoostedStumps::new(self.config.learner.clone(), self.config.objective);

        match self.config.objective {
            Objective::Classification => {
                let mapping = LabelMapping::fit(&train.labels);
                let encoded = mapping.encode(&train.labels)?;
                learner
                    .fit(&train.features, &encoded)
                    .map_err(|e| with_stage(e, "fit", &train))?;

                let raw_classes = learner
                    .predict(&test.features)
                    .map_err(|e| with_stage(e, "predict", &test))?;
                let classes = mapping.decode(&raw_classes);
                let probabilities = learner
                    .predict_raw(&test.features)
                    .map_err(|e| with_stage(e, "predict_raw", &test))?;

                let signals = classes.iter().map(|&c| c as f64).collect();
                Ok(MlOutcome {
                    signals,
                    class_predictions: Some(classes),
                    probabilities: Some(probabilities),
                    test_source_rows: test.source_rows,
                    bounds,
                    cleaned_samples: dataset.len(),
                })
            }
            Objective::Regression => {
                learner
                    .fit(&train.features, &train.labels)
                    .map_err(|e| with_stage(e, "fit", &train))?;
                let raw = learner
                    .predict_raw(&test.features)
                    .map_err(|e| with_stage(e, "predict_raw", &test))?;

                Ok(MlOutcome {
                    signals: normalize_signals(&raw),
                    class_predictions: None,
                    probabilities: None,
                    test_source_rows: test.source_rows,
                    bounds,
                    cleaned_samples: dataset.len(),
                })
            }
        }
    }

    /// Purged k-fold evaluation: a fresh learner per fold, scored on the
    /// embargo-protected validation block.
    pub fn cross_validate(&self, frame: &DataFrame) -> Result<Vec<FoldScore>> {
        let dataset = Dataset::from_frame(frame, self.config.return_outlier_z)?;
        let folds = PurgedKFold::new(self.config.cv_folds, self.config.embargo)
            .fold_indices(dataset.len())?;

        let mut scores = Vec::with_capacity(folds.len());
        for fold in folds {
            let train = dataset.take(&fold.train_indices);
            let validation = dataset.slice(fold.validation.clone());
            if train.is_empty() || validation.is_empty() {
                continue;
            }

            let mut learner =
                GradientBoostedStumps::new(self.config.learner.clone(), self.config.objective);

            let score = match self.config.objective {
                Objective::Classification => {
                    let mapping = LabelMapping::fit(&train.labels);
                    let encoded = mapping.encode(&train.labels)?;
                    learner
                        .fit(&train.features, &encoded)
                        .map_err(|e| with_stage(e, "fit", &train))?;
                    let predicted = mapping.decode(
                        &learner
                            .predict(&validation.features)
                            .map_err(|e| with_stage(e, "predict", &validation))?,
                    );
                    let correct = predicted
                        .iter()
                        .zip(&validation.labels)
                        .filter(|(&p, &l)| p == l.round() as i32)
                        .count();
                    FoldScore {
                        fold: fold.fold,
                        train_size: train.len(),
                        validation_size: validation.len(),
                        accuracy: Some(correct as f64 / validation.len() as f64),
                        mse: None,
                    }
                }
                Objective::Regression => {
                    learner
                        .fit(&train.features, &train.labels)
                        .map_err(|e| with_stage(e, "fit", &train))?;
                    let predicted = learner
                        .predict_raw(&validation.features)
                        .map_err(|e| with_stage(e, "predict_raw", &validation))?;
                    let mse = predicted
                        .iter()
                        .zip(&validation.labels)
                        .map(|(&p, &l)| ((p - l) as f64).powi(2))
                        .sum::<f64>()
                        / validation.len() as f64;
                    FoldScore {
                        fold: fold.fold,
                        train_size: train.len(),
                        validation_size: validation.len(),
                        accuracy: None,
                        mse: Some(mse),
                    }
                }
            };

            scores.push(score);
        }

        Ok(scores)
    }
}

/// Divide every raw score by the maximum absolute score. A maximum below
/// 1e-6 zeroes the whole signal vector instead of amplifying noise.
fn normalize_signals(raw: &[f32]) -> Vec<f64> {
    let max_abs = raw.iter().fold(0.0_f32, |acc, v| acc.max(v.abs()));
    if max_abs < SIGNAL_FLOOR {
        return vec![0.0; raw.len()];
    }
    raw.iter().map(|&v| (v / max_abs) as f64).collect()
}

fn with_stage(err: TribarrierError, stage: &str, data: &Dataset) -> TribarrierError {
    match err {
        TribarrierError::Learner { .. } => err,
        other => TribarrierError::Learner {
            stage: format!(
                "{} on {} rows x {} features",
                stage,
                data.len(),
                data.feature_names.len()
            ),
            message: other.to_string(),
        },
    }
}
