use serde::{Deserialize, Serialize};

/// Single raw row of the input series. Immutable after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: String,
    pub price: f64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl Observation {
    pub fn new(timestamp: impl Into<String>, price: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            price,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
        }
    }
}

/// Observation extended with derived per-index state. Created once by the
/// preprocessing stage and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedObservation {
    pub timestamp: String,
    pub price: f64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    /// ln(price[i] / price[i-1]); 0 at index 0.
    pub log_return: f64,
    /// Rolling population std dev of log returns; NaN before the window fills.
    pub volatility: f64,
    pub is_event: bool,
}

/// Index into the enriched sequence marking a hypothetical trade entry.
pub type EventIndex = usize;

/// Which barrier ended the path. Recoverable from the hard label but kept as
/// a named kind for diagnostics output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitKind {
    ProfitTake,
    StopLoss,
    Vertical,
}

impl ExitKind {
    pub fn from_hard_label(label: i8) -> Self {
        match label {
            1 => Self::ProfitTake,
            -1 => Self::StopLoss,
            _ => Self::Vertical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfitTake => "profit_take",
            Self::StopLoss => "stop_loss",
            Self::Vertical => "vertical",
        }
    }
}

/// One labeled entry event. Plain value type: indices back-reference the
/// observation sequence, nothing borrows into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledEvent {
    pub entry_idx: usize,
    pub entry_time: String,
    pub exit_idx: usize,
    pub exit_time: String,
    pub entry_price: f64,
    pub exit_price: f64,
    /// -1 (stop), 0 (horizon), +1 (profit).
    pub hard_label: i8,
    /// hard_label * decay(time_elapsed_ratio), clamped to [-1, 1].
    pub ttbm_label: f64,
    pub periods_to_exit: usize,
    /// periods_to_exit / H, capped at 1.
    pub time_elapsed_ratio: f64,
    pub decay_factor: f64,
    pub profit_barrier: f64,
    pub stop_barrier: f64,
    pub entry_volatility: f64,
}

impl LabeledEvent {
    pub fn exit_kind(&self) -> ExitKind {
        ExitKind::from_hard_label(self.hard_label)
    }

    /// Fractional price move realized between entry and exit.
    pub fn realized_return(&self) -> f64 {
        if self.entry_price != 0.0 {
            (self.exit_price - self.entry_price) / self.entry_price
        } else {
            0.0
        }
    }
}
