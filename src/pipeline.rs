//! Prediction orchestration.
//!
//! [`Pipeline`] composes the full inference flow:
//!
//! ```text
//! SensorFrame → RulLabeler → prune → FeatureEngine → Scaler → Windower
//!                                                                 ↓
//!            sorted results + fleet summary ← RiskThresholds ← RulModel
//! ```
//!
//! The scaler and model are externally-owned capabilities injected at
//! construction (load once, read many); the pipeline holds them behind
//! their narrow traits and never touches their persistence. Both may carry
//! the [`FeatureLayout`] they were fit against, in which case it is
//! validated against the live layout before any numeric work happens.
//!
//! Every run is all-or-nothing: windower/model/unit alignment is preserved
//! end to end (`predictions[i]` belongs to `units[i]`) and only the final
//! presentation sort, ascending by predicted RUL, deliberately breaks it.
//! There is no partial-result path and no retry anywhere.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::features::FeatureEngine;
use crate::frame::SensorFrame;
use crate::labeling::RulLabeler;
use crate::model::RulModel;
use crate::preprocessing::Scaler;
use crate::risk::RiskBucket;
use crate::schema::{FeatureLayout, RUL_COL};
use crate::sequence_builder::{ShortUnit, WindowBatch, Windower};

/// One row of the fleet result table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitPrediction {
    /// Unit identifier.
    pub unit: u32,
    /// Predicted remaining useful life, in cycles.
    pub predicted_rul: f64,
    /// Risk bucket derived from the prediction.
    pub risk: RiskBucket,
}

/// Fleet-wide summary statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FleetSummary {
    /// Unit with the lowest predicted RUL, and that prediction.
    pub most_critical: (u32, f64),
    /// Unit with the highest predicted RUL, and that prediction.
    pub healthiest: (u32, f64),
    /// Mean predicted RUL across the fleet.
    pub mean_rul: f64,
}

/// Paired per-unit history for one sensor: raw values and true RUL.
#[derive(Debug, Clone)]
pub struct UnitSeries {
    /// Unit identifier.
    pub unit: u32,
    /// Sensor column the values belong to.
    pub sensor: String,
    /// Cycle counter, ascending.
    pub cycles: Vec<u32>,
    /// Raw (unscaled) sensor readings.
    pub values: Vec<f64>,
    /// Derived true RUL labels, capped.
    pub rul: Vec<f64>,
}

/// Result of one full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Per-unit predictions with risk labels, ascending predicted RUL.
    ///
    /// This one table serves both presentation views: (unit, prediction)
    /// and the risk-annotated variant share rows and sort order.
    pub results: Vec<UnitPrediction>,

    /// Fleet summary statistics.
    pub summary: FleetSummary,

    /// Units with fewer records than the window size (truncate policy).
    pub short_units: Vec<ShortUnit>,

    /// Feature layout the run produced and validated against artifacts.
    pub layout: FeatureLayout,

    /// Window size used for sequence extraction.
    pub window_size: usize,
}

impl PipelineOutput {
    /// Predicted RUL for one unit, if it was in the input.
    pub fn prediction_for(&self, unit: u32) -> Option<f64> {
        self.results
            .iter()
            .find(|r| r.unit == unit)
            .map(|r| r.predicted_rul)
    }

    /// Number of units in each risk bucket, in result order.
    pub fn risk_count(&self, bucket: RiskBucket) -> usize {
        self.results.iter().filter(|r| r.risk == bucket).count()
    }
}

/// The composed inference pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    labeler: RulLabeler,
    engine: FeatureEngine,
    windower: Windower,
    scaler: Box<dyn Scaler>,
    model: Box<dyn RulModel>,
}

impl Pipeline {
    /// Build a pipeline from a validated configuration and injected
    /// scaler/model capabilities.
    pub fn new(
        config: PipelineConfig,
        scaler: Box<dyn Scaler>,
        model: Box<dyn RulModel>,
    ) -> Result<Self> {
        config.validate()?;
        let labeler = RulLabeler::with_config(config.labeling);
        let engine = FeatureEngine::with_config(config.features);
        let windower = Windower::with_config(config.window);
        Ok(Self {
            config,
            labeler,
            engine,
            windower,
            scaler,
            model,
        })
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full flow over one raw frame.
    pub fn run(&self, frame: &SensorFrame) -> Result<PipelineOutput> {
        if frame.n_rows() == 0 {
            return Err(PipelineError::EmptyInput);
        }
        log::info!(
            "pipeline start: {} records, {} units",
            frame.n_rows(),
            frame.partitions().len()
        );

        let labeled = self.labeler.label(frame)?;
        let featurized = self.engine.run(&labeled)?;
        let layout = FeatureLayout::from_frame(&featurized);
        log::debug!("feature layout: {} columns", layout.len());

        if let Some(fitted) = self.scaler.layout() {
            fitted.validate_against(&layout)?;
        }
        if let Some(fitted) = self.model.layout() {
            fitted.validate_against(&layout)?;
        }

        let matrix = featurized.feature_matrix(&layout)?;
        let scaled = self.scaler.transform(matrix.view())?;
        debug_assert_eq!(scaled.dim(), matrix.dim());

        let batch = self.windower.build(&featurized, scaled.view())?;
        let predictions = self.model.predict(&batch)?;
        if predictions.len() != batch.len() {
            return Err(PipelineError::ModelOutput {
                expected: batch.len(),
                found: predictions.len(),
            });
        }

        Ok(self.assemble(batch, predictions, layout))
    }

    /// Attach risk labels, sort for presentation, and summarize.
    fn assemble(
        &self,
        batch: WindowBatch,
        predictions: Vec<f64>,
        layout: FeatureLayout,
    ) -> PipelineOutput {
        let mut results: Vec<UnitPrediction> = batch
            .units
            .iter()
            .zip(&predictions)
            .map(|(&unit, &predicted_rul)| UnitPrediction {
                unit,
                predicted_rul,
                risk: self.config.risk.classify(predicted_rul),
            })
            .collect();

        // Ascending predicted RUL; ties broken by unit id so output is
        // deterministic. total_cmp sorts NaN predictions last.
        results.sort_by(|a, b| {
            a.predicted_rul
                .total_cmp(&b.predicted_rul)
                .then(a.unit.cmp(&b.unit))
        });

        let first = results.first().expect("non-empty input implies units");
        let last = results.last().expect("non-empty input implies units");
        let summary = FleetSummary {
            most_critical: (first.unit, first.predicted_rul),
            healthiest: (last.unit, last.predicted_rul),
            mean_rul: results.iter().map(|r| r.predicted_rul).sum::<f64>() / results.len() as f64,
        };
        log::info!(
            "pipeline done: {} units, mean predicted RUL {:.1}",
            results.len(),
            summary.mean_rul
        );

        PipelineOutput {
            results,
            summary,
            short_units: batch.short_units,
            layout,
            window_size: self.windower.window_size(),
        }
    }

    /// Raw sensor values paired with true RUL for one unit.
    ///
    /// Reads the *input* frame, so the values are unscaled; the labels are
    /// derived with the pipeline's configured cap.
    pub fn unit_series(
        &self,
        frame: &SensorFrame,
        unit: u32,
        sensor: &str,
    ) -> Result<UnitSeries> {
        let partition = frame
            .partition(unit)
            .ok_or(PipelineError::UnknownUnit(unit))?;
        let values = frame.require_column(sensor)?;
        let labeled = self.labeler.label(frame)?;
        let rul_column = labeled.require_column(RUL_COL)?;

        Ok(UnitSeries {
            unit,
            sensor: sensor.to_string(),
            cycles: partition.rows.iter().map(|&r| frame.cycles()[r]).collect(),
            values: partition.rows.iter().map(|&r| values[r]).collect(),
            rul: partition.rows.iter().map(|&r| rul_column[r]).collect(),
        })
    }
}
