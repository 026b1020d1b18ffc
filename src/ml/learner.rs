use crate::error::{Result, TribarrierError};

/// Boosted-model interface consumed by the ML pipeline.
///
/// The lifecycle is construct, `fit` exactly once, then `predict` /
/// `predict_raw` any number of times. Inputs are never mutated. Shape
/// mismatches and non-finite values are rejected at this boundary.
pub trait Learner {
    fn fit(&mut self, rows: &[Vec<f32>], labels: &[f32]) -> Result<()>;

    /// Class indices for classification, rounded scores for regression.
    fn predict(&self, rows: &[Vec<f32>]) -> Result<Vec<i32>>;

    /// Raw scores: probability-like for classification, real-valued for
    /// regression.
    fn predict_raw(&self, rows: &[Vec<f32>]) -> Result<Vec<f32>>;
}

/// Shared fit-input validation: consistent row widths, matching label
/// count, and finite values throughout. Returns the feature count.
pub fn validate_fit_inputs(rows: &[Vec<f32>], labels: &[f32]) -> Result<usize> {
    if rows.is_empty() {
        return Err(TribarrierError::InsufficientData(
            "no training rows".to_string(),
        ));
    }
    if rows.len() != labels.len() {
        return Err(TribarrierError::InputShape(format!(
            "{} rows vs {} labels",
            rows.len(),
            labels.len()
        )));
    }

    let n_features = rows[0].len();
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_features {
            return Err(TribarrierError::InputShape(format!(
                "row {} has {} features, expected {}",
                i,
                row.len(),
                n_features
            )));
        }
        if let Some(value) = row.iter().find(|v| !v.is_finite()) {
            return Err(TribarrierError::InputValue(format!(
                "non-finite feature {} in row {}",
                value, i
            )));
        }
    }
    if let Some((i, label)) = labels.iter().enumerate().find(|(_, l)| !l.is_finite()) {
        return Err(TribarrierError::InputValue(format!(
            "non-finite label {} at row {}",
            label, i
        )));
    }

    Ok(n_features)
}

/// Maps observed integer labels onto contiguous class indices 0..K-1 and
/// remembers the inverse. Classification labels always pass through here
/// so the learner only ever sees 0-based classes.
#[derive(Debug, Clone)]
pub struct LabelMapping {
    classes: Vec<i32>,
}

impl LabelMapping {
    pub fn fit(labels: &[f32]) -> Self {
        let mut classes: Vec<i32> = labels.iter().map(|&l| l.round() as i32).collect();
        classes.sort_unstable();
        classes.dedup();
        Self { classes }
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn is_multiclass(&self) -> bool {
        self.classes.len() > 2
    }

    pub fn encode(&self, labels: &[f32]) -> Result<Vec<f32>> {
        labels
            .iter()
            .map(|&label| {
                let value = label.round() as i32;
                self.classes
                    .iter()
                    .position(|&c| c == value)
                    .map(|idx| idx as f32)
                    .ok_or_else(|| {
                        TribarrierError::InputValue(format!(
                            "label {} not seen during mapping fit",
                            value
                        ))
                    })
            })
            .collect()
    }

    pub fn decode(&self, class_indices: &[i32]) -> Vec<i32> {
        class_indices
            .iter()
            .map(|&idx| {
                let clamped = idx.clamp(0, self.classes.len() as i32 - 1) as usize;
                self.classes[clamped]
            })
            .collect()
    }
}
