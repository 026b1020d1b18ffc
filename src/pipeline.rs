use crate::config::{AppConfig, Objective};
use crate::data::{enrich, mark_events, CsvLoader};
use crate::error::{Result, TribarrierError};
use crate::events::{purge_overlaps, EventSelector};
use crate::features::FeatureExtractor;
use crate::labeling::{BarrierDiagnostics, EventLabeler, IndependenceReport};
use crate::ml::{FoldScore, MlPipeline, SplitBounds};
use crate::progress::{PipelineStage, ProgressCallback, SilentProgress};
use crate::sim::{PerformanceSummary, PortfolioSimulator, SimulatedTrade, SizingMode};
use crate::types::{LabeledEvent, Observation};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::Path;

/// End-to-end result of one pipeline run, ready for JSON reporting.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub observations: usize,
    pub candidate_events: usize,
    pub events_after_purge: usize,
    pub labeled_events: usize,
    pub diagnostics: BarrierDiagnostics,
    pub independence: IndependenceReport,
    pub split: SplitBounds,
    pub test_predictions: usize,
    pub performance: PerformanceSummary,
    pub trades: Vec<SimulatedTrade>,
}

struct PreparedRun {
    labeled: Vec<LabeledEvent>,
    frame: DataFrame,
    observations: usize,
    candidate_events: usize,
    events_after_purge: usize,
    diagnostics: BarrierDiagnostics,
    independence: IndependenceReport,
}

/// Drives the full study: enrichment, event selection, labeling, feature
/// extraction, model training and the capital walk over the held-out test
/// block. Construction is cheap; all validation happens when a run starts.
pub struct PipelineRunner {
    config: AppConfig,
}

impl PipelineRunner {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run_csv<P: AsRef<Path>, C: ProgressCallback>(
        &self,
        path: P,
        mut callback: C,
    ) -> Result<RunReport> {
        callback.on_stage(
            PipelineStage::Loading,
            0.0,
            &format!("reading {}", path.as_ref().display()),
        );
        let observations = CsvLoader::load(path)?;
        self.run(&observations, callback)
    }

    pub fn run<C: ProgressCallback>(
        &self,
        observations: &[Observation],
        mut callback: C,
    ) -> Result<RunReport> {
        self.config.validate()?;
        let prepared = self.prepare(observations, &mut callback)?;

        callback.on_stage(
            PipelineStage::Training,
            65.0,
            &format!("{} feature rows", prepared.frame.height()),
        );
        let ml = MlPipeline::new(self.config.ml.clone());
        let outcome = ml.run(&prepared.frame)?;

        let mut test_events = Vec::with_capacity(outcome.test_source_rows.len());
        for &row in &outcome.test_source_rows {
            let event = prepared.labeled.get(row).ok_or_else(|| {
                TribarrierError::InputShape(format!(
                    "test row {} outside {} labeled events",
                    row,
                    prepared.labeled.len()
                ))
            })?;
            test_events.push(event.clone());
        }

        callback.on_stage(
            PipelineStage::Simulating,
            85.0,
            &format!("{} test predictions", outcome.signals.len()),
        );
        let mode = match self.config.ml.objective {
            Objective::Classification => SizingMode::Hard,
            Objective::Regression => SizingMode::Soft,
        };
        let mut simulator = PortfolioSimulator::new(self.config.simulation.clone(), mode);
        simulator.walk(&outcome.signals, &test_events);
        let performance = simulator.summary();

        callback.on_stage(
            PipelineStage::Done,
            100.0,
            &format!(
                "final capital {:.2} over {} trades",
                performance.final_capital, performance.total_trades
            ),
        );

        Ok(RunReport {
            observations: prepared.observations,
            candidate_events: prepared.candidate_events,
            events_after_purge: prepared.events_after_purge,
            labeled_events: prepared.labeled.len(),
            diagnostics: prepared.diagnostics,
            independence: prepared.independence,
            split: outcome.bounds,
            test_predictions: outcome.signals.len(),
            performance,
            trades: simulator.trades,
        })
    }

    /// Purged k-fold evaluation over the same prepared frame the run uses.
    pub fn cross_validate(&self, observations: &[Observation]) -> Result<Vec<FoldScore>> {
        self.config.validate()?;
        let prepared = self.prepare(observations, &mut SilentProgress)?;
        MlPipeline::new(self.config.ml.clone()).cross_validate(&prepared.frame)
    }

    fn prepare<C: ProgressCallback>(
        &self,
        observations: &[Observation],
        callback: &mut C,
    ) -> Result<PreparedRun> {
        let barrier = &self.config.barrier;

        callback.on_stage(
            PipelineStage::Enriching,
            5.0,
            &format!("{} observations", observations.len()),
        );
        let mut enriched = enrich(observations, barrier.volatility_window)?;

        callback.on_stage(PipelineStage::SelectingEvents, 20.0, "sampling entries");
        let selector = EventSelector::from_config(barrier, &self.config.events);
        let candidates = selector.select(&enriched);
        let events = purge_overlaps(
            &candidates,
            barrier.vertical_window,
            self.config.events.min_event_gap,
        );
        mark_events(&mut enriched, &events);

        callback.on_stage(
            PipelineStage::Labeling,
            35.0,
            &format!("{} events after purge", events.len()),
        );
        let labeler = EventLabeler::from_config(barrier);
        let labeled = labeler.label(&enriched, &events);
        if labeled.is_empty() {
            return Err(TribarrierError::InsufficientData(
                "no labelable events in the series".to_string(),
            ));
        }

        let diagnostics = BarrierDiagnostics::from_events(&labeled);
        diagnostics.log_summary();
        let min_gap = self
            .config
            .events
            .min_event_gap
            .unwrap_or(barrier.vertical_window);
        let independence =
            IndependenceReport::from_events(&labeled, barrier.vertical_window, min_gap);
        independence.log_warnings();

        callback.on_stage(
            PipelineStage::ExtractingFeatures,
            50.0,
            &format!("{} labeled events", labeled.len()),
        );
        let extractor =
            FeatureExtractor::new(self.config.features.clone(), self.config.ml.objective);
        let frame = extractor.extract(&enriched, &labeled)?;

        Ok(PreparedRun {
            candidate_events: candidates.len(),
            events_after_purge: events.len(),
            labeled,
            frame,
            observations: observations.len(),
            diagnostics,
            independence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{PipelineStage, ProgressUpdate};
    use chrono::NaiveDate;

    fn synthetic_observations(n: usize) -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n)
            .map(|i| {
                let date = start + chrono::Days::new(i as u64);
                let price = 100.0 + 5.0 * (i as f64 * 0.3).sin() + 0.01 * i as f64;
                Observation::new(format!("{} 00:00:00", date.format("%Y-%m-%d")), price)
            })
            .collect()
    }

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.barrier.volatility_window = 5;
        config.barrier.vertical_window = 4;
        config.events.event_interval = Some(2);
        config.ml.embargo = 2;
        config.ml.test_size = 0.2;
        config.ml.val_size = 0.1;
        config.ml.learner.n_estimators = 10;
        config
    }

    #[test]
    fn run_produces_a_consistent_report() {
        let observations = synthetic_observations(240);
        let runner = PipelineRunner::new(test_config());
        let report = runner.run(&observations, SilentProgress).unwrap();

        assert_eq!(report.observations, 240);
        assert!(report.candidate_events >= report.events_after_purge);
        assert_eq!(report.labeled_events, report.events_after_purge);
        assert_eq!(report.diagnostics.total_events, report.labeled_events);
        assert_eq!(report.split.n_test, report.test_predictions);
        assert_eq!(report.performance.steps, report.test_predictions);
        // purged at the horizon gap, so no window overlaps remain
        assert_eq!(report.independence.overlapping_pairs, 0);
        assert!(report.independence.is_clean());
    }

    #[test]
    fn regression_run_walks_soft_positions() {
        let mut config = test_config();
        config.barrier.labeling_kind = crate::config::LabelingKind::Ttbm;
        config.ml.objective = Objective::Regression;

        let observations = synthetic_observations(240);
        let runner = PipelineRunner::new(config);
        let report = runner.run(&observations, SilentProgress).unwrap();

        assert_eq!(report.split.n_test, report.test_predictions);
        for trade in &report.trades {
            assert!(trade.position_pct.abs() <= 0.15 + 1e-12);
        }
    }

    #[test]
    fn invalid_config_fails_before_any_work() {
        let mut config = test_config();
        config.barrier.profit_multiple = -1.0;
        let runner = PipelineRunner::new(config);
        let err = runner
            .run(&synthetic_observations(50), SilentProgress)
            .unwrap_err();
        assert!(matches!(err, TribarrierError::InvalidConfig { .. }));
    }

    #[test]
    fn too_short_series_is_rejected() {
        let runner = PipelineRunner::new(test_config());
        let err = runner
            .run(&synthetic_observations(12), SilentProgress)
            .unwrap_err();
        assert!(matches!(err, TribarrierError::InsufficientData(_)));
    }

    #[test]
    fn progress_reaches_done_in_order() {
        let (tx, rx) = std::sync::mpsc::channel();
        let callback = crate::progress::ChannelProgress::new(tx);

        let observations = synthetic_observations(240);
        PipelineRunner::new(test_config())
            .run(&observations, callback)
            .unwrap();

        let updates: Vec<ProgressUpdate> = rx.try_iter().collect();
        assert_eq!(updates.first().unwrap().stage, PipelineStage::Enriching);
        assert_eq!(updates.last().unwrap().stage, PipelineStage::Done);
        let percents: Vec<f64> = updates.iter().map(|u| u.percent).collect();
        let mut sorted = percents.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(percents, sorted);
    }

    #[test]
    fn cross_validation_runs_over_prepared_features() {
        let observations = synthetic_observations(240);
        let runner = PipelineRunner::new(test_config());
        let scores = runner.cross_validate(&observations).unwrap();
        assert_eq!(scores.len(), 5);
        for score in scores {
            assert!(score.accuracy.is_some());
        }
    }
}
