use super::learner::{validate_fit_inputs, Learner};
use crate::config::{LearnerConfig, Objective};
use crate::error::{Result, TribarrierError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Depth-one regression tree: one feature, one threshold, two leaves.
/// Leaf values already carry the learning-rate shrinkage.
#[derive(Debug, Clone)]
struct Stump {
    feature: usize,
    threshold: f32,
    left_value: f32,
    right_value: f32,
}

impl Stump {
    fn predict(&self, row: &[f32]) -> f32 {
        if row[self.feature] <= self.threshold {
            self.left_value
        } else {
            self.right_value
        }
    }
}

#[derive(Debug, Clone, Default)]
struct BoostedModel {
    base: f32,
    stumps: Vec<Stump>,
}

impl BoostedModel {
    fn predict(&self, row: &[f32]) -> f32 {
        self.base + self.stumps.iter().map(|s| s.predict(row)).sum::<f32>()
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f32,
    left_mean: f32,
    right_mean: f32,
    improvement: f64,
}

/// Gradient-boosted stump ensemble over squared loss.
///
/// Regression fits one model on the raw targets. Classification expects
/// 0-based class indices: two classes share a single model whose score
/// approximates P(class 1), more classes get one-vs-rest models and
/// argmax prediction. Runs are deterministic for a fixed seed; the split
/// search fans out over features on a pool sized by `num_threads`.
pub struct GradientBoostedStumps {
    config: LearnerConfig,
    objective: Objective,
    models: Vec<BoostedModel>,
    num_classes: usize,
    n_features: usize,
    trained: bool,
}

impl GradientBoostedStumps {
    pub fn new(config: LearnerConfig, objective: Objective) -> Self {
        Self {
            config,
            objective,
            models: Vec::new(),
            num_classes: 0,
            n_features: 0,
            trained: false,
        }
    }

    fn validate_predict_inputs(&self, rows: &[Vec<f32>]) -> Result<()> {
        if !self.trained {
            return Err(TribarrierError::Learner {
                stage: "predict".to_string(),
                message: "model not fitted".to_string(),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != self.n_features {
                return Err(TribarrierError::InputShape(format!(
                    "row {} has {} features, model expects {}",
                    i,
                    row.len(),
                    self.n_features
                )));
            }
        }
        Ok(())
    }

    fn class_scores(&self, row: &[f32]) -> Vec<f32> {
        self.models.iter().map(|m| m.predict(row)).collect()
    }
}

impl Learner for GradientBoostedStumps {
    fn fit(&mut self, rows: &[Vec<f32>], labels: &[f32]) -> Result<()> {
        if self.trained {
            return Err(TribarrierError::Learner {
                stage: "fit".to_string(),
                message: "fit may only be called once per model".to_string(),
            });
        }
        self.n_features = validate_fit_inputs(rows, labels)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()
            .map_err(|e| TribarrierError::Learner {
                stage: "fit".to_string(),
                message: format!("thread pool: {}", e),
            })?;

        match self.objective {
            Objective::Regression => {
                self.num_classes = 0;
                let model =
                    pool.install(|| fit_squared_loss(rows, labels, &self.config, self.config.seed));
                self.models = vec![model];
            }
            Objective::Classification => {
                let max_class = labels.iter().map(|&l| l.round() as i32).max().unwrap_or(0);
                let min_class = labels.iter().map(|&l| l.round() as i32).min().unwrap_or(0);
                if min_class < 0 {
                    return Err(TribarrierError::InputValue(format!(
                        "classification labels must be 0-based class indices, got {}",
                        min_class
                    )));
                }
                self.num_classes = (max_class as usize) + 1;

                if self.num_classes <= 2 {
                    let model = pool
                        .install(|| fit_squared_loss(rows, labels, &self.config, self.config.seed));
                    self.models = vec![model];
                } else {
                    let mut models = Vec::with_capacity(self.num_classes);
                    for class in 0..self.num_classes {
                        let targets: Vec<f32> = labels
                            .iter()
                            .map(|&l| if l.round() as usize == class { 1.0 } else { 0.0 })
                            .collect();
                        let seed = self.config.seed.wrapping_add(class as u64);
                        let model =
                            pool.install(|| fit_squared_loss(rows, &targets, &self.config, seed));
                        models.push(model);
                    }
                    self.models = models;
                }
            }
        }

        self.trained = true;
        log::debug!(
            "fitted {} boosted model(s) of up to {} stumps on {}x{} matrix",
            self.models.len(),
            self.config.n_estimators,
            rows.len(),
            self.n_features
        );
        Ok(())
    }

    fn predict(&self, rows: &[Vec<f32>]) -> Result<Vec<i32>> {
        self.validate_predict_inputs(rows)?;

        let predictions = rows
            .iter()
            .map(|row| match self.objective {
                Objective::Regression => self.models[0].predict(row).round() as i32,
                Objective::Classification => {
                    if self.models.len() == 1 {
                        if self.num_classes <= 1 {
                            0
                        } else if self.models[0].predict(row) >= 0.5 {
                            1
                        } else {
                            0
                        }
                    } else {
                        let scores = self.class_scores(row);
                        let mut best = 0;
                        for (k, &score) in scores.iter().enumerate() {
                            if score > scores[best] {
                                best = k;
                            }
                        }
                        best as i32
                    }
                }
            })
            .collect();

        Ok(predictions)
    }

    fn predict_raw(&self, rows: &[Vec<f32>]) -> Result<Vec<f32>> {
        self.validate_predict_inputs(rows)?;

        let scores = rows
            .iter()
            .map(|row| match self.objective {
                Objective::Regression => self.models[0].predict(row),
                Objective::Classification => {
                    if self.models.len() == 1 {
                        self.models[0].predict(row).clamp(0.0, 1.0)
                    } else {
                        self.class_scores(row)
                            .into_iter()
                            .fold(f32::NEG_INFINITY, f32::max)
                            .clamp(0.0, 1.0)
                    }
                }
            })
            .collect();

        Ok(scores)
    }
}

/// Boost squared-loss residuals with shrunken stumps. Stops early when no
/// split improves the fit.
fn fit_squared_loss(
    rows: &[Vec<f32>],
    targets: &[f32],
    config: &LearnerConfig,
    seed: u64,
) -> BoostedModel {
    let n = rows.len();
    let n_features = rows[0].len();
    let mut rng = StdRng::seed_from_u64(seed);

    let base = targets.iter().sum::<f32>() / n as f32;
    let mut predictions = vec![base; n];
    let mut stumps: Vec<Stump> = Vec::new();

    for _ in 0..config.n_estimators {
        let residuals: Vec<f32> = targets
            .iter()
            .zip(&predictions)
            .map(|(t, p)| t - p)
            .collect();

        let sample: Vec<usize> = if config.subsample < 1.0 {
            (0..n).filter(|_| rng.gen::<f64>() < config.subsample).collect()
        } else {
            (0..n).collect()
        };
        if sample.len() < 2 {
            continue;
        }

        let best = (0..n_features)
            .into_par_iter()
            .filter_map(|feature| best_split_for_feature(rows, &residuals, &sample, feature))
            .max_by(|a, b| {
                a.improvement
                    .partial_cmp(&b.improvement)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(b.feature.cmp(&a.feature))
            });

        match best {
            Some(split) if split.improvement > 1e-12 => {
                let stump = Stump {
                    feature: split.feature,
                    threshold: split.threshold,
                    left_value: config.learning_rate as f32 * split.left_mean,
                    right_value: config.learning_rate as f32 * split.right_mean,
                };
                for (row, prediction) in rows.iter().zip(&mut predictions) {
                    *prediction += stump.predict(row);
                }
                stumps.push(stump);
            }
            _ => break,
        }
    }

    BoostedModel { base, stumps }
}

/// Best residual split on one feature by sum-of-squares reduction over
/// the sampled rows. Thresholds sit midway between distinct neighbors.
fn best_split_for_feature(
    rows: &[Vec<f32>],
    residuals: &[f32],
    sample: &[usize],
    feature: usize,
) -> Option<SplitCandidate> {
    let mut pairs: Vec<(f32, f32)> = sample
        .iter()
        .map(|&i| (rows[i][feature], residuals[i]))
        .collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let n = pairs.len();
    let total_sum: f64 = pairs.iter().map(|p| p.1 as f64).sum();

    let mut best: Option<SplitCandidate> = None;
    let mut left_sum = 0.0_f64;

    for split_at in 1..n {
        left_sum += pairs[split_at - 1].1 as f64;
        if pairs[split_at].0 == pairs[split_at - 1].0 {
            continue;
        }

        let left_count = split_at as f64;
        let right_count = (n - split_at) as f64;
        let right_sum = total_sum - left_sum;

        let improvement = left_sum * left_sum / left_count
            + right_sum * right_sum / right_count
            - total_sum * total_sum / n as f64;

        if best.as_ref().map_or(true, |b| improvement > b.improvement) {
            best = Some(SplitCandidate {
                feature,
                threshold: (pairs[split_at - 1].0 + pairs[split_at].0) / 2.0,
                left_mean: (left_sum / left_count) as f32,
                right_mean: (right_sum / right_count) as f32,
                improvement,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(n_estimators: usize) -> LearnerConfig {
        LearnerConfig {
            n_estimators,
            learning_rate: 0.3,
            subsample: 1.0,
            num_threads: 1,
            seed: 42,
        }
    }

    fn step_data() -> (Vec<Vec<f32>>, Vec<f32>) {
        // Single feature, clean step at x = 5.
        let rows: Vec<Vec<f32>> = (0..20).map(|i| vec![i as f32]).collect();
        let labels: Vec<f32> = (0..20).map(|i| if i < 5 { 0.0 } else { 1.0 }).collect();
        (rows, labels)
    }

    #[test]
    fn regression_learns_a_step_function() {
        let (rows, labels) = step_data();
        let mut model = GradientBoostedStumps::new(config(50), Objective::Regression);
        model.fit(&rows, &labels).unwrap();

        let raw = model.predict_raw(&rows).unwrap();
        assert!(raw[0] < 0.2, "left of step predicted {}", raw[0]);
        assert!(raw[19] > 0.8, "right of step predicted {}", raw[19]);
    }

    #[test]
    fn binary_classification_separates_classes() {
        let (rows, labels) = step_data();
        let mut model = GradientBoostedStumps::new(config(50), Objective::Classification);
        model.fit(&rows, &labels).unwrap();

        let classes = model.predict(&rows).unwrap();
        assert_eq!(&classes[..5], &[0, 0, 0, 0, 0]);
        assert_eq!(&classes[15..], &[1, 1, 1, 1, 1]);

        let raw = model.predict_raw(&rows).unwrap();
        assert!(raw.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn multiclass_uses_one_vs_rest() {
        // Three bands on one feature.
        let rows: Vec<Vec<f32>> = (0..30).map(|i| vec![i as f32]).collect();
        let labels: Vec<f32> = (0..30)
            .map(|i| if i < 10 { 0.0 } else if i < 20 { 1.0 } else { 2.0 })
            .collect();

        let mut model = GradientBoostedStumps::new(config(80), Objective::Classification);
        model.fit(&rows, &labels).unwrap();

        let classes = model.predict(&rows).unwrap();
        assert_eq!(classes[2], 0);
        assert_eq!(classes[15], 1);
        assert_eq!(classes[27], 2);
    }

    #[test]
    fn deterministic_under_fixed_seed() {
        let (rows, labels) = step_data();
        let mut subsampled = config(30);
        subsampled.subsample = 0.7;

        let mut first = GradientBoostedStumps::new(subsampled.clone(), Objective::Regression);
        first.fit(&rows, &labels).unwrap();
        let mut second = GradientBoostedStumps::new(subsampled, Objective::Regression);
        second.fit(&rows, &labels).unwrap();

        assert_eq!(
            first.predict_raw(&rows).unwrap(),
            second.predict_raw(&rows).unwrap()
        );
    }

    #[test]
    fn fit_twice_is_rejected() {
        let (rows, labels) = step_data();
        let mut model = GradientBoostedStumps::new(config(5), Objective::Regression);
        model.fit(&rows, &labels).unwrap();
        assert!(matches!(
            model.fit(&rows, &labels),
            Err(TribarrierError::Learner { .. })
        ));
    }

    #[test]
    fn predict_before_fit_is_rejected() {
        let model = GradientBoostedStumps::new(config(5), Objective::Regression);
        assert!(model.predict(&[vec![1.0]]).is_err());
    }

    #[test]
    fn predict_rejects_wrong_width() {
        let (rows, labels) = step_data();
        let mut model = GradientBoostedStumps::new(config(5), Objective::Regression);
        model.fit(&rows, &labels).unwrap();
        assert!(matches!(
            model.predict(&[vec![1.0, 2.0]]),
            Err(TribarrierError::InputShape(_))
        ));
    }

    #[test]
    fn negative_class_labels_are_rejected() {
        let rows = vec![vec![0.0], vec![1.0]];
        let mut model = GradientBoostedStumps::new(config(5), Objective::Classification);
        assert!(matches!(
            model.fit(&rows, &[-1.0, 1.0]),
            Err(TribarrierError::InputValue(_))
        ));
    }

    #[test]
    fn constant_targets_fit_to_base() {
        let rows: Vec<Vec<f32>> = (0..10).map(|i| vec![i as f32]).collect();
        let labels = vec![0.7; 10];
        let mut model = GradientBoostedStumps::new(config(20), Objective::Regression);
        model.fit(&rows, &labels).unwrap();
        let raw = model.predict_raw(&rows).unwrap();
        for value in raw {
            assert!((value - 0.7).abs() < 1e-6);
        }
    }
}
