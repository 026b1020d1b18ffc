use crate::error::Result;
use polars::prelude::*;
use std::cmp::Ordering;

const IQR_FLOOR: f64 = 1e-10;

/// Per-column robust scaler: center by median, scale by interquartile
/// range. An IQR below 1e-10 is replaced by 1 so near-constant columns
/// are centered but not blown up.
pub struct RobustScaler {
    stats: Vec<ColumnStats>,
}

struct ColumnStats {
    name: String,
    center: f64,
    scale: f64,
}

impl RobustScaler {
    /// Fit medians and IQRs on the named columns.
    pub fn fit(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let mut stats = Vec::with_capacity(columns.len());

        for name in columns {
            let chunked = df.column(name)?.f64()?;
            let mut values: Vec<f64> = chunked.into_no_null_iter().collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

            let (center, scale) = if values.is_empty() {
                (0.0, 1.0)
            } else {
                let median = quantile_sorted(&values, 0.5);
                let iqr = quantile_sorted(&values, 0.75) - quantile_sorted(&values, 0.25);
                let scale = if iqr < IQR_FLOOR { 1.0 } else { iqr };
                (median, scale)
            };

            stats.push(ColumnStats {
                name: name.clone(),
                center,
                scale,
            });
        }

        Ok(Self { stats })
    }

    /// Rewrite the fitted columns in place as `(x - median) / iqr`.
    pub fn transform(&self, df: &mut DataFrame) -> Result<()> {
        for stat in &self.stats {
            let chunked = df.column(&stat.name)?.f64()?;
            let scaled: Vec<f64> = chunked
                .into_iter()
                .map(|v| (v.unwrap_or(f64::NAN) - stat.center) / stat.scale)
                .collect();
            df.replace(&stat.name, Series::new(stat.name.as_str().into(), scaled))?;
        }
        Ok(())
    }

    pub fn fit_transform(df: &mut DataFrame, columns: &[String]) -> Result<Self> {
        let scaler = Self::fit(df, columns)?;
        scaler.transform(df)?;
        Ok(scaler)
    }
}

/// Linearly interpolated quantile of an ascending-sorted slice.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let fraction = position - lower as f64;
    if lower + 1 < sorted.len() {
        sorted[lower] + fraction * (sorted[lower + 1] - sorted[lower])
    } else {
        sorted[lower]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert!((quantile_sorted(&values, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile_sorted(&values, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile_sorted(&values, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(quantile_sorted(&[7.0], 0.5), 7.0);
    }

    #[test]
    fn scaling_centers_the_median_at_zero() {
        let mut df = df!("x" => &[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        RobustScaler::fit_transform(&mut df, &["x".to_string()]).unwrap();
        let scaled = df.column("x").unwrap().f64().unwrap();
        // Median 3, IQR 2: the middle value maps to 0.
        assert!((scaled.get(2).unwrap()).abs() < 1e-12);
        assert!((scaled.get(3).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn constant_column_uses_unit_scale() {
        let mut df = df!("x" => &[5.0, 5.0, 5.0, 5.0]).unwrap();
        RobustScaler::fit_transform(&mut df, &["x".to_string()]).unwrap();
        let scaled = df.column("x").unwrap().f64().unwrap();
        for i in 0..4 {
            assert_eq!(scaled.get(i).unwrap(), 0.0);
        }
    }

    #[test]
    fn unnamed_columns_are_left_alone() {
        let mut df = df!(
            "x" => &[1.0, 2.0, 3.0],
            "label" => &[1.0, -1.0, 0.0]
        )
        .unwrap();
        RobustScaler::fit_transform(&mut df, &["x".to_string()]).unwrap();
        let labels = df.column("label").unwrap().f64().unwrap();
        assert_eq!(labels.get(0).unwrap(), 1.0);
        assert_eq!(labels.get(1).unwrap(), -1.0);
    }

    #[test]
    fn outliers_do_not_dominate_the_scale() {
        let mut df = df!("x" => &[1.0, 2.0, 3.0, 4.0, 5.0, 1000.0]).unwrap();
        RobustScaler::fit_transform(&mut df, &["x".to_string()]).unwrap();
        let scaled = df.column("x").unwrap().f64().unwrap();
        // IQR-based scale keeps the bulk of the data within a few units.
        assert!(scaled.get(0).unwrap().abs() < 2.0);
        assert!(scaled.get(4).unwrap().abs() < 2.0);
    }
}
