use crate::error::{Result, TribarrierError};
use crate::features::{LABEL_COLUMN, RETURN_COLUMN};
use polars::prelude::*;
use std::ops::Range;

/// Learner-ready view of the feature frame: row-major f32 features plus
/// aligned labels and returns. `source_rows` maps every sample back to
/// its row in the frame the dataset was built from, so downstream
/// consumers can recover the originating event after cleaning drops rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Vec<Vec<f32>>,
    pub labels: Vec<f32>,
    pub returns: Vec<f64>,
    pub feature_names: Vec<String>,
    pub source_rows: Vec<usize>,
}

impl Dataset {
    /// Convert the feature frame, dropping rows with non-finite feature
    /// values and, when a threshold is given, rows whose return is a
    /// z-score outlier among the surviving rows.
    pub fn from_frame(frame: &DataFrame, outlier_z: Option<f64>) -> Result<Self> {
        let feature_names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .filter(|name| name != LABEL_COLUMN && name != RETURN_COLUMN)
            .collect();

        let n_rows = frame.height();
        let mut feature_columns: Vec<Vec<f64>> = Vec::with_capacity(feature_names.len());
        for name in &feature_names {
            let chunked = frame.column(name)?.f64()?;
            feature_columns.push(
                chunked
                    .into_iter()
                    .map(|v| v.unwrap_or(f64::NAN))
                    .collect(),
            );
        }

        let labels: Vec<f64> = frame
            .column(LABEL_COLUMN)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        let returns: Vec<f64> = frame
            .column(RETURN_COLUMN)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();

        let mut keep: Vec<bool> = (0..n_rows)
            .map(|row| feature_columns.iter().all(|col| col[row].is_finite()))
            .collect();

        if let Some(threshold) = outlier_z {
            apply_return_outlier_filter(&mut keep, &returns, threshold);
        }

        let kept_rows: Vec<usize> = (0..n_rows).filter(|&row| keep[row]).collect();
        if kept_rows.is_empty() {
            return Err(TribarrierError::InsufficientData(
                "cleaning removed every row".to_string(),
            ));
        }
        if kept_rows.len() < n_rows {
            log::debug!("cleaning dropped {} of {} rows", n_rows - kept_rows.len(), n_rows);
        }

        let features: Vec<Vec<f32>> = kept_rows
            .iter()
            .map(|&row| feature_columns.iter().map(|col| col[row] as f32).collect())
            .collect();

        Ok(Self {
            features,
            labels: kept_rows.iter().map(|&row| labels[row] as f32).collect(),
            returns: kept_rows.iter().map(|&row| returns[row]).collect(),
            feature_names,
            source_rows: kept_rows,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn slice(&self, range: Range<usize>) -> Dataset {
        Dataset {
            features: self.features[range.clone()].to_vec(),
            labels: self.labels[range.clone()].to_vec(),
            returns: self.returns[range.clone()].to_vec(),
            feature_names: self.feature_names.clone(),
            source_rows: self.source_rows[range].to_vec(),
        }
    }

    pub fn take(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            returns: indices.iter().map(|&i| self.returns[i]).collect(),
            feature_names: self.feature_names.clone(),
            source_rows: indices.iter().map(|&i| self.source_rows[i]).collect(),
        }
    }
}

/// Flip `keep` off for rows whose return z-score exceeds the threshold.
/// Stats come from the currently-kept rows; a near-zero spread disables
/// the filter.
fn apply_return_outlier_filter(keep: &mut [bool], returns: &[f64], threshold: f64) {
    let kept: Vec<f64> = returns
        .iter()
        .zip(keep.iter())
        .filter(|(_, &k)| k)
        .map(|(&r, _)| r)
        .collect();
    if kept.is_empty() {
        return;
    }

    let n = kept.len() as f64;
    let mean = kept.iter().sum::<f64>() / n;
    let variance = kept.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std < 1e-10 {
        return;
    }

    for (row, flag) in keep.iter_mut().enumerate() {
        if *flag && ((returns[row] - mean) / std).abs() > threshold {
            *flag = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(values: &[f64], labels: &[f64], returns: &[f64]) -> DataFrame {
        df!(
            "f1" => values,
            LABEL_COLUMN => labels,
            RETURN_COLUMN => returns
        )
        .unwrap()
    }

    #[test]
    fn converts_feature_and_target_columns() {
        let frame = frame_with(&[1.0, 2.0, 3.0], &[1.0, -1.0, 0.0], &[0.1, -0.2, 0.0]);
        let dataset = Dataset::from_frame(&frame, None).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.feature_names, vec!["f1".to_string()]);
        assert_eq!(dataset.features[1], vec![2.0_f32]);
        assert_eq!(dataset.labels, vec![1.0, -1.0, 0.0]);
        assert_eq!(dataset.source_rows, vec![0, 1, 2]);
    }

    #[test]
    fn drops_rows_with_non_finite_features() {
        let frame = frame_with(
            &[1.0, f64::NAN, 3.0, f64::INFINITY],
            &[1.0, 1.0, 0.0, -1.0],
            &[0.1, 0.2, 0.3, 0.4],
        );
        let dataset = Dataset::from_frame(&frame, None).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.source_rows, vec![0, 2]);
    }

    #[test]
    fn outlier_returns_are_dropped() {
        let values = vec![1.0; 11];
        let labels = vec![1.0; 11];
        let mut returns = vec![0.01; 10];
        returns.push(10.0);
        let frame = frame_with(&values, &labels, &returns);

        let dataset = Dataset::from_frame(&frame, Some(3.0)).unwrap();
        assert_eq!(dataset.len(), 10);
        assert!(!dataset.source_rows.contains(&10));
    }

    #[test]
    fn constant_returns_disable_outlier_filter() {
        let frame = frame_with(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0], &[0.5, 0.5, 0.5]);
        let dataset = Dataset::from_frame(&frame, Some(1.0)).unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn all_rows_dropped_is_an_error() {
        let frame = frame_with(&[f64::NAN, f64::NAN], &[1.0, 0.0], &[0.1, 0.2]);
        assert!(matches!(
            Dataset::from_frame(&frame, None),
            Err(TribarrierError::InsufficientData(_))
        ));
    }

    #[test]
    fn slice_and_take_preserve_source_rows() {
        let frame = frame_with(
            &[1.0, f64::NAN, 3.0, 4.0, 5.0],
            &[1.0, 1.0, 0.0, -1.0, 1.0],
            &[0.1, 0.2, 0.3, 0.4, 0.5],
        );
        let dataset = Dataset::from_frame(&frame, None).unwrap();
        assert_eq!(dataset.source_rows, vec![0, 2, 3, 4]);

        let tail = dataset.slice(2..4);
        assert_eq!(tail.source_rows, vec![3, 4]);

        let picked = dataset.take(&[0, 3]);
        assert_eq!(picked.source_rows, vec![0, 4]);
        assert_eq!(picked.features[1], vec![5.0_f32]);
    }
}
