use super::calculator::FeatureCalculator;
use super::scaling::RobustScaler;
use crate::config::{FeatureConfig, Objective};
use crate::error::Result;
use crate::types::{EnrichedObservation, LabeledEvent};
use polars::prelude::*;

pub const LABEL_COLUMN: &str = "label";
pub const RETURN_COLUMN: &str = "return";

const DENOMINATOR_FLOOR: f64 = 1e-10;

/// Assembles the training frame: one row per labeled event with its
/// feature columns, its label and its observed return.
///
/// On the regression path an enhancement stage derives ratio columns from
/// whatever bases are present, then remaining NaN and infinite feature
/// values become 0 and every feature column is robust-scaled. Label and
/// return columns are never scaled.
pub struct FeatureExtractor {
    calculator: FeatureCalculator,
    enhanced: bool,
    objective: Objective,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig, objective: Objective) -> Self {
        let enhanced = config.enhanced_features;
        Self {
            calculator: FeatureCalculator::new(config),
            enhanced,
            objective,
        }
    }

    pub fn extract(
        &self,
        observations: &[EnrichedObservation],
        events: &[LabeledEvent],
    ) -> Result<DataFrame> {
        let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();
        let timestamps: Vec<String> = observations.iter().map(|o| o.timestamp.clone()).collect();
        let entries: Vec<usize> = events.iter().map(|e| e.entry_idx).collect();

        let mut df = self.calculator.calculate(&prices, &timestamps, &entries)?;

        if self.objective == Objective::Regression && self.enhanced {
            let extra = self.enhancement_columns(&df, observations, events)?;
            if !extra.is_empty() {
                df.hstack_mut(&extra)?;
            }
        }

        let feature_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let labels: Vec<f64> = events
            .iter()
            .map(|e| match self.objective {
                Objective::Classification => e.hard_label as f64,
                Objective::Regression => e.ttbm_label,
            })
            .collect();
        let returns: Vec<f64> = events
            .iter()
            .map(|e| e.exit_price - e.entry_price)
            .collect();
        df.hstack_mut(&[
            Column::new(LABEL_COLUMN.into(), labels),
            Column::new(RETURN_COLUMN.into(), returns),
        ])?;

        replace_non_finite(&mut df, &feature_names)?;
        RobustScaler::fit_transform(&mut df, &feature_names)?;

        log::debug!(
            "extracted {} feature rows with {} feature columns",
            df.height(),
            feature_names.len()
        );

        Ok(df)
    }

    fn enhancement_columns(
        &self,
        df: &DataFrame,
        observations: &[EnrichedObservation],
        events: &[LabeledEvent],
    ) -> Result<Vec<Column>> {
        let mut columns = Vec::new();

        let volumes: Vec<Option<f64>> = observations.iter().map(|o| o.volume).collect();
        if volumes.iter().any(|v| v.is_some()) {
            let mut vol_return = Vec::with_capacity(events.len());
            let mut vol_volatility = Vec::with_capacity(events.len());
            for event in events {
                vol_return.push(volume_return(&volumes, event.entry_idx, 5));
                vol_volatility.push(volume_volatility(&volumes, event.entry_idx, 5));
            }
            columns.push(Column::new("volume_return_5d".into(), vol_return));
            columns.push(Column::new("volume_volatility_5d".into(), vol_volatility));
        }

        let base = |name: &str| -> Option<Vec<f64>> {
            let chunked = df.column(name).ok()?.f64().ok()?;
            Some(
                chunked
                    .into_iter()
                    .map(|v| v.unwrap_or(f64::NAN))
                    .collect(),
            )
        };

        if let (Some(returns), Some(stds)) = (base("return_5d"), base("rolling_std_5d")) {
            columns.push(Column::new(
                "volatility_adjusted_return_5d".into(),
                ratio_values(&returns, &stds),
            ));
        }
        if let (Some(roc), Some(ewma)) = (base("roc_5d"), base("ewma_vol_10d")) {
            columns.push(Column::new(
                "momentum_vol_ratio".into(),
                ratio_values(&roc, &ewma),
            ));
        }
        if let (Some(dist), Some(stds)) = (base("dist_to_sma_5d"), base("rolling_std_5d")) {
            columns.push(Column::new(
                "sma_distance_vol_adj".into(),
                ratio_values(&dist, &stds),
            ));
        }
        if let (Some(rsi), Some(roc)) = (base("rsi_14d"), base("roc_5d")) {
            let values: Vec<f64> = rsi
                .iter()
                .zip(&roc)
                .map(|(r, c)| (r - 50.0) * c)
                .collect();
            columns.push(Column::new("rsi_momentum".into(), values));
        }

        Ok(columns)
    }
}

fn ratio_values(numerators: &[f64], denominators: &[f64]) -> Vec<f64> {
    numerators
        .iter()
        .zip(denominators)
        .map(|(n, d)| if d.abs() < DENOMINATOR_FLOOR { 0.0 } else { n / d })
        .collect()
}

fn volume_return(volumes: &[Option<f64>], i: usize, window: usize) -> f64 {
    if i < window || i >= volumes.len() {
        return f64::NAN;
    }
    match (volumes[i], volumes[i - window]) {
        (Some(current), Some(past)) => {
            if past.abs() < DENOMINATOR_FLOOR {
                0.0
            } else {
                (current - past) / past
            }
        }
        _ => f64::NAN,
    }
}

/// Population std dev of the `window` volumes strictly before index i.
fn volume_volatility(volumes: &[Option<f64>], i: usize, window: usize) -> f64 {
    if i < window || i >= volumes.len() {
        return f64::NAN;
    }
    let slice = &volumes[i - window..i];
    if slice.iter().any(|v| v.is_none()) {
        return f64::NAN;
    }
    let values: Vec<f64> = slice.iter().map(|v| v.unwrap_or(0.0)).collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

fn replace_non_finite(df: &mut DataFrame, columns: &[String]) -> Result<()> {
    for name in columns {
        let chunked = df.column(name)?.f64()?;
        let cleaned: Vec<f64> = chunked
            .into_iter()
            .map(|v| match v {
                Some(value) if value.is_finite() => value,
                _ => 0.0,
            })
            .collect();
        df.replace(name, Series::new(name.as_str().into(), cleaned))?;
    }
    Ok(())
}
