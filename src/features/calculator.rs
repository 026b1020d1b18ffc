use crate::config::FeatureConfig;
use crate::data::timestamp::day_of_week;
use crate::error::{Result, TribarrierError};
use crate::types::EventIndex;
use polars::prelude::*;

/// Windowed indicators anchored at event indices.
///
/// Every feature is computed per event against the full price history and
/// returns NaN whenever its lookback window would extend before index 0.
/// Later stages decide what to do with the NaNs.
pub struct FeatureCalculator {
    config: FeatureConfig,
}

impl FeatureCalculator {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Names of the columns `calculate` will emit, in order.
    pub fn active_feature_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.config.price_features {
            names.extend([
                "close_to_close_return_1d",
                "return_5d",
                "return_10d",
                "sma_5d",
                "sma_10d",
                "sma_20d",
                "dist_to_sma_5d",
                "price_range_5d",
                "close_over_high_5d",
            ]);
        }
        if self.config.momentum_features {
            names.extend(["roc_5d", "rsi_14d", "slope_lr_10d"]);
        }
        if self.config.volatility_features {
            names.extend(["rolling_std_5d", "ewma_vol_10d"]);
        }
        if self.config.temporal_features {
            names.extend(["day_of_week", "days_since_last_event"]);
        }
        names
    }

    /// Build the event-aligned feature frame: one row per event index.
    /// Event indices must be strictly increasing.
    pub fn calculate(
        &self,
        prices: &[f64],
        timestamps: &[String],
        events: &[EventIndex],
    ) -> Result<DataFrame> {
        if prices.len() != timestamps.len() {
            return Err(TribarrierError::InputShape(format!(
                "{} prices vs {} timestamps",
                prices.len(),
                timestamps.len()
            )));
        }
        if let Some(pair) = events.windows(2).find(|w| w[1] <= w[0]) {
            return Err(TribarrierError::InputValue(format!(
                "event indices must be strictly increasing, got {} after {}",
                pair[1], pair[0]
            )));
        }

        let mut columns: Vec<Column> = Vec::new();

        if self.config.price_features {
            columns.extend(self.create_price_features(prices, events));
        }
        if self.config.momentum_features {
            columns.extend(self.create_momentum_features(prices, events));
        }
        if self.config.volatility_features {
            columns.extend(self.create_volatility_features(prices, events));
        }
        if self.config.temporal_features {
            columns.extend(self.create_temporal_features(timestamps, events));
        }

        Ok(DataFrame::new(columns)?)
    }

    fn create_price_features(&self, prices: &[f64], events: &[EventIndex]) -> Vec<Column> {
        let mut columns = Vec::new();

        columns.push(Column::new(
            "close_to_close_return_1d".into(),
            events
                .iter()
                .map(|&i| close_to_close_return(prices, i))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "return_5d".into(),
            events
                .iter()
                .map(|&i| window_return(prices, i, 5))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "return_10d".into(),
            events
                .iter()
                .map(|&i| window_return(prices, i, 10))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "sma_5d".into(),
            events
                .iter()
                .map(|&i| sma(prices, i, 5))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "sma_10d".into(),
            events
                .iter()
                .map(|&i| sma(prices, i, 10))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "sma_20d".into(),
            events
                .iter()
                .map(|&i| sma(prices, i, 20))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "dist_to_sma_5d".into(),
            events
                .iter()
                .map(|&i| dist_to_sma(prices, i, 5))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "price_range_5d".into(),
            events
                .iter()
                .map(|&i| price_range(prices, i, 5))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "close_over_high_5d".into(),
            events
                .iter()
                .map(|&i| close_over_high(prices, i, 5))
                .collect::<Vec<f64>>(),
        ));

        columns
    }

    fn create_momentum_features(&self, prices: &[f64], events: &[EventIndex]) -> Vec<Column> {
        let mut columns = Vec::new();

        columns.push(Column::new(
            "roc_5d".into(),
            events
                .iter()
                .map(|&i| window_return(prices, i, 5) * 100.0)
                .collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "rsi_14d".into(),
            events
                .iter()
                .map(|&i| rsi(prices, i, 14))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "slope_lr_10d".into(),
            events
                .iter()
                .map(|&i| linear_regression_slope(prices, i, 10))
                .collect::<Vec<f64>>(),
        ));

        columns
    }

    fn create_volatility_features(&self, prices: &[f64], events: &[EventIndex]) -> Vec<Column> {
        let mut columns = Vec::new();

        columns.push(Column::new(
            "rolling_std_5d".into(),
            events
                .iter()
                .map(|&i| trailing_std(prices, i, 5))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Column::new(
            "ewma_vol_10d".into(),
            events
                .iter()
                .map(|&i| ewma_volatility(prices, i, 10, 0.94))
                .collect::<Vec<f64>>(),
        ));

        columns
    }

    fn create_temporal_features(&self, timestamps: &[String], events: &[EventIndex]) -> Vec<Column> {
        let mut columns = Vec::new();

        columns.push(Column::new(
            "day_of_week".into(),
            events
                .iter()
                .map(|&i| {
                    timestamps
                        .get(i)
                        .map(|ts| day_of_week(ts))
                        .unwrap_or(f64::NAN)
                })
                .collect::<Vec<f64>>(),
        ));

        let mut days_since = Vec::with_capacity(events.len());
        for (k, &idx) in events.iter().enumerate() {
            if k == 0 {
                days_since.push(-1.0);
            } else {
                days_since.push((idx - events[k - 1]) as f64);
            }
        }
        columns.push(Column::new("days_since_last_event".into(), days_since));

        columns
    }
}

fn close_to_close_return(prices: &[f64], i: usize) -> f64 {
    if i < 1 || i >= prices.len() {
        return f64::NAN;
    }
    (prices[i] - prices[i - 1]) / prices[i - 1]
}

fn window_return(prices: &[f64], i: usize, window: usize) -> f64 {
    if i < window || i >= prices.len() {
        return f64::NAN;
    }
    (prices[i] - prices[i - window]) / prices[i - window]
}

/// Mean of the `window` prices ending at index i inclusive.
fn sma(prices: &[f64], i: usize, window: usize) -> f64 {
    if i + 1 < window || i >= prices.len() {
        return f64::NAN;
    }
    prices[i + 1 - window..=i].iter().sum::<f64>() / window as f64
}

fn dist_to_sma(prices: &[f64], i: usize, window: usize) -> f64 {
    if i >= prices.len() {
        return f64::NAN;
    }
    prices[i] - sma(prices, i, window)
}

/// High minus low of the `window` prices ending at index i inclusive.
fn price_range(prices: &[f64], i: usize, window: usize) -> f64 {
    if i + 1 < window || i >= prices.len() {
        return f64::NAN;
    }
    let slice = &prices[i + 1 - window..=i];
    let high = slice.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let low = slice.iter().cloned().fold(f64::INFINITY, f64::min);
    high - low
}

fn close_over_high(prices: &[f64], i: usize, window: usize) -> f64 {
    if i + 1 < window || i >= prices.len() {
        return f64::NAN;
    }
    let slice = &prices[i + 1 - window..=i];
    let high = slice.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    prices[i] / high
}

/// Population std dev of the `window` prices strictly before index i.
fn trailing_std(prices: &[f64], i: usize, window: usize) -> f64 {
    if i < window || i >= prices.len() {
        return f64::NAN;
    }
    let slice = &prices[i - window..i];
    let n = slice.len() as f64;
    let mean = slice.iter().sum::<f64>() / n;
    let variance = slice.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Square root of the exponentially weighted moving average of squared
/// first differences over the `window` bars ending at i. The first squared
/// difference seeds the average.
fn ewma_volatility(prices: &[f64], i: usize, window: usize, smoothing: f64) -> f64 {
    if i < window || i >= prices.len() {
        return f64::NAN;
    }
    let mut variance = 0.0;
    for (step, j) in ((i + 1 - window)..=i).enumerate() {
        let diff = prices[j] - prices[j - 1];
        let sq = diff * diff;
        if step == 0 {
            variance = sq;
        } else {
            variance = smoothing * variance + (1.0 - smoothing) * sq;
        }
    }
    variance.sqrt()
}

/// Wilder-style RSI over the `window` first differences ending at i.
/// Flat windows read 50, all-loss windows 0, all-gain windows 100.
fn rsi(prices: &[f64], i: usize, window: usize) -> f64 {
    if i < window || i >= prices.len() {
        return f64::NAN;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for j in (i + 1 - window)..=i {
        let change = prices[j] - prices[j - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses += -change;
        }
    }

    let avg_gain = gains / window as f64;
    let avg_loss = losses / window as f64;

    if avg_gain == 0.0 && avg_loss == 0.0 {
        return 50.0;
    }
    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// OLS slope of the `window` prices ending at i against x = 0..window-1.
fn linear_regression_slope(prices: &[f64], i: usize, window: usize) -> f64 {
    if i + 1 < window || i >= prices.len() {
        return f64::NAN;
    }
    let slice = &prices[i + 1 - window..=i];
    let n = window as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = slice.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (x, &y) in slice.iter().enumerate() {
        let dx = x as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    numerator / denominator
}
