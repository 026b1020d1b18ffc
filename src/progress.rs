use serde::Serialize;
use std::sync::mpsc::Sender;

/// Phase boundaries the pipeline reports. The core never spawns threads;
/// callbacks fire on the calling thread at these points only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Loading,
    Enriching,
    SelectingEvents,
    Labeling,
    ExtractingFeatures,
    Training,
    Simulating,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Loading => "loading",
            PipelineStage::Enriching => "enriching",
            PipelineStage::SelectingEvents => "selecting events",
            PipelineStage::Labeling => "labeling",
            PipelineStage::ExtractingFeatures => "extracting features",
            PipelineStage::Training => "training",
            PipelineStage::Simulating => "simulating",
            PipelineStage::Done => "done",
        }
    }
}

pub trait ProgressCallback: Send {
    fn on_stage(&mut self, stage: PipelineStage, percent: f64, message: &str);
}

/// Prints each phase boundary to stdout.
pub struct ConsoleProgress;

impl ProgressCallback for ConsoleProgress {
    fn on_stage(&mut self, stage: PipelineStage, percent: f64, message: &str) {
        println!("[{:>3.0}%] {}: {}", percent, stage.as_str(), message);
    }
}

/// Swallows all updates. Handy for library callers and tests.
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_stage(&mut self, _stage: PipelineStage, _percent: f64, _message: &str) {}
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,
    pub percent: f64,
    pub message: String,
}

// For handing updates to a UI thread
pub struct ChannelProgress {
    sender: Sender<ProgressUpdate>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<ProgressUpdate>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgress {
    fn on_stage(&mut self, stage: PipelineStage, percent: f64, message: &str) {
        let _ = self.sender.send(ProgressUpdate {
            stage,
            percent,
            message: message.to_string(),
        });
    }
}
