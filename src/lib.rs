pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod features;
pub mod labeling;
pub mod ml;
pub mod pipeline;
pub mod progress;
pub mod sim;
pub mod types;

pub use config::{AppConfig, ConfigManager};
pub use error::{Result, TribarrierError};
pub use pipeline::{PipelineRunner, RunReport};
