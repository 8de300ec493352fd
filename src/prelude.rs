//! Prelude module for convenient imports.
//!
//! Re-exports the types needed for the common flow: parse a raw log, load
//! the fitted artifacts, run the pipeline, read the results.
//!
//! # Usage
//!
//! ```ignore
//! use rul_predictor::prelude::*;
//!
//! let frame = read_raw_file("data/test_FD001.txt")?;
//! let pipeline = Pipeline::new(
//!     PipelineConfig::default(),
//!     Box::new(AffineScaler::load("model/scaler.json")?),
//!     Box::new(LinearModel::load("model/model.json")?),
//! )?;
//! let output = pipeline.run(&frame)?;
//! ```

// ============================================================================
// Core Pipeline
// ============================================================================

pub use crate::config::{PipelineConfig, RunMetadata};
pub use crate::pipeline::{FleetSummary, Pipeline, PipelineOutput, UnitPrediction, UnitSeries};

// ============================================================================
// Input
// ============================================================================

pub use crate::frame::{SensorFrame, UnitPartition};
pub use crate::loader::{parse_raw, read_raw_file};

// ============================================================================
// Stages
// ============================================================================

pub use crate::features::{prune_constant_channels, FeatureConfig, FeatureEngine};
pub use crate::labeling::{LabelingConfig, RulLabeler};
pub use crate::risk::{RiskBucket, RiskThresholds};
pub use crate::schema::FeatureLayout;
pub use crate::sequence_builder::{
    PaddingPolicy, ShortUnit, WindowBatch, WindowConfig, Windower,
};

// ============================================================================
// Injected Capabilities
// ============================================================================

pub use crate::model::{LinearModel, RulModel};
pub use crate::preprocessing::{AffineScaler, IdentityScaler, Scaler};

// ============================================================================
// Export & Errors
// ============================================================================

pub use crate::error::{PipelineError, Result};
pub use crate::export::{ExportMetadata, ExportResult, WindowExporter};
