use thiserror::Error;

#[derive(Error, Debug)]
pub enum TribarrierError {
    #[error("Invalid config: {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("Input shape mismatch: {0}")]
    InputShape(String),

    #[error("Input value error: {0}")]
    InputValue(String),

    #[error("Parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Learner failure during {stage}: {message}")]
    Learner { stage: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl TribarrierError {
    /// Shorthand for validation failures, which must name the offending field.
    pub fn invalid_config(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TribarrierError>;
