pub mod csv;
pub mod preprocess;
pub mod timestamp;

pub use csv::CsvLoader;
pub use preprocess::{enrich, log_returns, mark_events, rolling_volatility};
pub use timestamp::{day_of_week, parse_timestamp};
