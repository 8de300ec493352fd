//! RUL Predictor
//!
//! Remaining-useful-life estimation for fleets of run-to-failure machines.
//!
//! # Overview
//!
//! This library turns raw multivariate sensor logs into per-machine RUL
//! estimates and coarse risk categories. It owns the preprocessing and
//! feature pipeline (deterministic per-unit grouping, leak-free rolling
//! statistics, label capping, shape-preserving windowing) and composes it
//! with two externally-owned capabilities, the fitted scaler and the
//! regression model, reached only through narrow traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        RUL Predictor                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  loader/           - raw 26-field log parsing                   │
//! │  frame/            - column table with per-unit partitions      │
//! │  schema/           - raw layout + feature ordering contract     │
//! │  labeling/         - capped RUL label derivation                │
//! │  features/         - pruning + rolling mean/std/slope           │
//! │  preprocessing/    - injected per-column scaling                │
//! │  sequence_builder/ - trailing windows per unit                  │
//! │  model/            - injected regression model                  │
//! │  risk/             - risk bucket classification                 │
//! │  pipeline/         - orchestration, sorting, fleet summary      │
//! │  export/           - NumPy export for the Python training side  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use rul_predictor::prelude::*;
//!
//! let frame = read_raw_file("data/test_FD001.txt")?;
//! let scaler = AffineScaler::load("model/scaler.json")?;
//! let model = LinearModel::load("model/model.json")?;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default(), Box::new(scaler), Box::new(model))?;
//! let output = pipeline.run(&frame)?;
//!
//! for row in &output.results {
//!     println!("{}: {:.1} cycles ({})", row.unit, row.predicted_rul, row.risk);
//! }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod frame;
pub mod labeling;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod prelude;
pub mod preprocessing;
pub mod risk;
pub mod schema;
pub mod sequence_builder;

// Re-exports - Error handling
pub use error::{PipelineError, Result};

// Re-exports - Data model
pub use frame::{SensorFrame, UnitPartition};
pub use loader::{parse_raw, read_raw_file};
pub use schema::FeatureLayout;

// Re-exports - Stages
pub use features::{prune_constant_channels, FeatureConfig, FeatureEngine};
pub use labeling::{LabelingConfig, RulLabeler};
pub use preprocessing::{AffineScaler, IdentityScaler, Scaler};
pub use risk::{RiskBucket, RiskThresholds};
pub use sequence_builder::{PaddingPolicy, ShortUnit, WindowBatch, WindowConfig, Windower};

// Re-exports - Model
pub use model::{LinearModel, RulModel};

// Re-exports - Orchestration
pub use config::{PipelineConfig, RunMetadata};
pub use pipeline::{FleetSummary, Pipeline, PipelineOutput, UnitPrediction, UnitSeries};

// Re-exports - Export
pub use export::{ExportMetadata, ExportResult, WindowExporter};
