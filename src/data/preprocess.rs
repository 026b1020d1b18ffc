use crate::error::{Result, TribarrierError};
use crate::types::{EnrichedObservation, Observation};

/// Log returns over the price path. The first return is 0 so the output
/// stays aligned with the input.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(prices.len());
    for i in 0..prices.len() {
        if i == 0 {
            returns.push(0.0);
        } else {
            returns.push((prices[i] / prices[i - 1]).ln());
        }
    }
    returns
}

/// Rolling population standard deviation of `returns` over `window` values.
///
/// Index i covers returns [i - window + 1, i] and is NaN until the window
/// fills. The variance is floored at zero before the square root so float
/// cancellation can never produce NaN from a negative variance.
pub fn rolling_volatility(returns: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(TribarrierError::invalid_config(
            "volatility_window",
            "must be at least 1",
        ));
    }

    let mut volatility = vec![f64::NAN; returns.len()];

    for i in 0..returns.len() {
        if i + 1 < window {
            continue;
        }
        let slice = &returns[i + 1 - window..=i];
        let n = slice.len() as f64;
        let mean = slice.iter().sum::<f64>() / n;
        let mean_sq = slice.iter().map(|r| r * r).sum::<f64>() / n;
        let variance = (mean_sq - mean * mean).max(0.0);
        volatility[i] = variance.sqrt();
    }

    Ok(volatility)
}

/// Attach log returns and rolling volatility to the raw observations.
///
/// Prices must be finite and positive so log returns are defined. Event
/// flags start false and are stamped after event selection.
pub fn enrich(
    observations: &[Observation],
    volatility_window: usize,
) -> Result<Vec<EnrichedObservation>> {
    for (i, obs) in observations.iter().enumerate() {
        if !obs.price.is_finite() || obs.price <= 0.0 {
            return Err(TribarrierError::InputValue(format!(
                "price at index {} is {} (must be finite and positive)",
                i, obs.price
            )));
        }
    }

    let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();
    let returns = log_returns(&prices);
    let volatility = rolling_volatility(&returns, volatility_window)?;

    let enriched = observations
        .iter()
        .enumerate()
        .map(|(i, obs)| EnrichedObservation {
            timestamp: obs.timestamp.clone(),
            price: obs.price,
            open: obs.open,
            high: obs.high,
            low: obs.low,
            close: obs.close,
            volume: obs.volume,
            log_return: returns[i],
            volatility: volatility[i],
            is_event: false,
        })
        .collect();

    Ok(enriched)
}

/// Stamp the event flag on the enriched sequence. Out-of-range indices are
/// ignored.
pub fn mark_events(enriched: &mut [EnrichedObservation], events: &[usize]) {
    for &idx in events {
        if let Some(obs) = enriched.get_mut(idx) {
            obs.is_event = true;
        }
    }
}
