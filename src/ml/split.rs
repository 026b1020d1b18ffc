use crate::error::{Result, TribarrierError};
use polars::prelude::*;
use serde::Serialize;
use std::ops::Range;

/// Row ranges of the three chronological blocks. Embargo rows sit between
/// train and validation and between validation and test; nothing ever
/// shuffles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitBounds {
    pub n_train: usize,
    pub n_val: usize,
    pub n_test: usize,
    pub embargo: usize,
    pub total: usize,
}

impl SplitBounds {
    pub fn train_range(&self) -> Range<usize> {
        0..self.n_train
    }

    pub fn val_range(&self) -> Range<usize> {
        let start = self.n_train + self.embargo;
        start..start + self.n_val
    }

    pub fn test_range(&self) -> Range<usize> {
        let start = self.n_train + self.embargo + self.n_val + self.embargo;
        start..start + self.n_test
    }
}

/// Time-ordered train/validation/test splitter with an embargo gap.
pub struct ChronologicalSplitter {
    pub test_size: f64,
    pub val_size: f64,
    pub embargo: usize,
}

impl ChronologicalSplitter {
    pub fn new(test_size: f64, val_size: f64, embargo: usize) -> Self {
        Self {
            test_size,
            val_size,
            embargo,
        }
    }

    /// Resolve block sizes for `n` rows.
    ///
    /// Block sizes come out of the usable length `n - 2 * embargo`: the
    /// test and validation blocks floor their fractions and train takes
    /// the remainder, so the three blocks plus both embargo gaps cover
    /// the rows exactly.
    pub fn bounds(&self, n: usize) -> Result<SplitBounds> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(TribarrierError::invalid_config(
                "test_size",
                "must be in (0, 1)",
            ));
        }
        if !(self.val_size >= 0.0 && self.val_size < 1.0) {
            return Err(TribarrierError::invalid_config(
                "val_size",
                "must be in [0, 1)",
            ));
        }
        if self.test_size + self.val_size >= 1.0 {
            return Err(TribarrierError::invalid_config(
                "test_size + val_size",
                "fractions must sum below 1",
            ));
        }

        if n <= 2 * self.embargo {
            return Err(TribarrierError::InsufficientData(format!(
                "{} rows cannot host two embargo gaps of {}",
                n, self.embargo
            )));
        }

        let usable = n - 2 * self.embargo;
        let n_test = (usable as f64 * self.test_size).floor() as usize;
        let n_val = (usable as f64 * self.val_size).floor() as usize;
        let n_train = usable - n_val - n_test;

        if n_train == 0 || n_test == 0 {
            return Err(TribarrierError::InsufficientData(format!(
                "split of {} usable rows leaves train={} test={}",
                usable, n_train, n_test
            )));
        }

        Ok(SplitBounds {
            n_train,
            n_val,
            n_test,
            embargo: self.embargo,
            total: n,
        })
    }

    /// Slice a row-ordered frame into the three blocks.
    pub fn split(&self, frame: &DataFrame) -> Result<ChronologicalSplit> {
        let bounds = self.bounds(frame.height())?;
        let train = frame.slice(0, bounds.n_train);
        let val_range = bounds.val_range();
        let validation = frame.slice(val_range.start as i64, bounds.n_val);
        let test_range = bounds.test_range();
        let test = frame.slice(test_range.start as i64, bounds.n_test);

        Ok(ChronologicalSplit {
            train,
            validation,
            test,
            bounds,
        })
    }
}

pub struct ChronologicalSplit {
    pub train: DataFrame,
    pub validation: DataFrame,
    pub test: DataFrame,
    pub bounds: SplitBounds,
}

/// K-fold splitter for cross-validation that purges an embargo zone
/// around each validation fold before selecting training rows.
pub struct PurgedKFold {
    pub n_folds: usize,
    pub embargo: usize,
}

#[derive(Debug, Clone)]
pub struct PurgedFold {
    pub fold: usize,
    pub train_indices: Vec<usize>,
    pub validation: Range<usize>,
}

impl PurgedKFold {
    pub fn new(n_folds: usize, embargo: usize) -> Self {
        Self { n_folds, embargo }
    }

    pub fn fold_indices(&self, n: usize) -> Result<Vec<PurgedFold>> {
        if self.n_folds < 2 {
            return Err(TribarrierError::invalid_config(
                "cv_folds",
                "need at least 2 folds",
            ));
        }
        if n < self.n_folds {
            return Err(TribarrierError::InsufficientData(format!(
                "{} rows cannot form {} folds",
                n, self.n_folds
            )));
        }

        let mut folds = Vec::with_capacity(self.n_folds);
        for fold in 0..self.n_folds {
            let start = fold * n / self.n_folds;
            let end = (fold + 1) * n / self.n_folds;

            let purge_start = start.saturating_sub(self.embargo);
            let purge_end = (end + self.embargo).min(n);

            let train_indices: Vec<usize> =
                (0..purge_start).chain(purge_end..n).collect();

            folds.push(PurgedFold {
                fold,
                train_indices,
                validation: start..end,
            });
        }

        Ok(folds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_cover_rows_exactly() {
        let splitter = ChronologicalSplitter::new(0.2, 0.1, 5);
        let bounds = splitter.bounds(100).unwrap();
        // usable 90: test 18, val 9, train 63.
        assert_eq!(bounds.n_train, 63);
        assert_eq!(bounds.n_val, 9);
        assert_eq!(bounds.n_test, 18);
        assert_eq!(bounds.train_range(), 0..63);
        assert_eq!(bounds.val_range(), 68..77);
        assert_eq!(bounds.test_range(), 82..100);
    }

    #[test]
    fn blocks_are_ordered_and_gap_separated() {
        let splitter = ChronologicalSplitter::new(0.25, 0.15, 7);
        let bounds = splitter.bounds(200).unwrap();
        let train = bounds.train_range();
        let val = bounds.val_range();
        let test = bounds.test_range();
        assert!(train.end + bounds.embargo == val.start);
        assert!(val.end + bounds.embargo == test.start);
        assert_eq!(test.end, 200);
    }

    #[test]
    fn zero_val_fraction_gives_empty_val_block() {
        let splitter = ChronologicalSplitter::new(0.3, 0.0, 2);
        let bounds = splitter.bounds(50).unwrap();
        assert_eq!(bounds.n_val, 0);
        assert!(bounds.val_range().is_empty());
        assert!(bounds.n_train > 0 && bounds.n_test > 0);
    }

    #[test]
    fn rejects_fraction_sum_at_or_above_one() {
        let splitter = ChronologicalSplitter::new(0.6, 0.4, 0);
        assert!(matches!(
            splitter.bounds(100),
            Err(TribarrierError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn too_few_rows_is_insufficient_data() {
        let splitter = ChronologicalSplitter::new(0.2, 0.1, 10);
        assert!(matches!(
            splitter.bounds(20),
            Err(TribarrierError::InsufficientData(_))
        ));
        // Usable rows exist but the test fraction floors to zero.
        let tight = ChronologicalSplitter::new(0.2, 0.0, 0);
        assert!(matches!(
            tight.bounds(4),
            Err(TribarrierError::InsufficientData(_))
        ));
    }

    #[test]
    fn frame_split_slices_in_order() {
        let values: Vec<f64> = (0..100).map(|v| v as f64).collect();
        let frame = df!("x" => &values).unwrap();
        let split = ChronologicalSplitter::new(0.2, 0.1, 5).split(&frame).unwrap();
        assert_eq!(split.train.height(), 63);
        assert_eq!(split.validation.height(), 9);
        assert_eq!(split.test.height(), 18);
        let first_test = split.test.column("x").unwrap().f64().unwrap().get(0).unwrap();
        assert_eq!(first_test, 82.0);
    }

    #[test]
    fn purged_folds_exclude_embargo_zone() {
        let folds = PurgedKFold::new(5, 5).fold_indices(100).unwrap();
        assert_eq!(folds.len(), 5);

        let middle = &folds[1];
        assert_eq!(middle.validation, 20..40);
        assert!(!middle.train_indices.contains(&15));
        assert!(!middle.train_indices.contains(&44));
        assert!(middle.train_indices.contains(&14));
        assert!(middle.train_indices.contains(&45));

        let first = &folds[0];
        assert_eq!(first.validation, 0..20);
        assert_eq!(first.train_indices[0], 25);
    }

    #[test]
    fn purged_fold_train_never_intersects_validation() {
        let folds = PurgedKFold::new(4, 3).fold_indices(57).unwrap();
        for fold in &folds {
            for &idx in &fold.train_indices {
                assert!(!fold.validation.contains(&idx));
            }
        }
    }

    #[test]
    fn kfold_rejects_degenerate_inputs() {
        assert!(PurgedKFold::new(1, 0).fold_indices(10).is_err());
        assert!(PurgedKFold::new(5, 0).fold_indices(3).is_err());
    }
}
