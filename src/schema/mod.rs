//! Raw input schema and the feature ordering contract.
//!
//! Two things live here:
//!
//! 1. The fixed layout of the raw run-to-failure log format: 26
//!    whitespace-delimited fields per line (`unit_nr`, `time_cycles`, three
//!    operating settings, 21 sensors), plus the list of channels known to
//!    carry zero variance across the fleet.
//!
//! 2. [`FeatureLayout`], the explicit, validated column-ordering contract
//!    between the feature engine and the fitted scaler/model artifacts. The
//!    scaler's parameters are positional, not name-keyed, so the order in
//!    which feature columns are produced is load-bearing. Rather than leave
//!    that order as an implicit convention, artifacts store the layout they
//!    were fit against and the pipeline checks it column-by-column before
//!    any transform runs.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::frame::SensorFrame;

/// Column name of the unit identifier.
pub const UNIT_COL: &str = "unit_nr";

/// Column name of the cycle counter.
pub const TIME_COL: &str = "time_cycles";

/// Column name of the derived remaining-useful-life label.
pub const RUL_COL: &str = "RUL";

/// Number of whitespace-delimited fields per raw input line.
pub const RAW_FIELD_COUNT: usize = 26;

/// Value columns of the raw format, in file order (keys excluded).
pub const RAW_VALUE_COLUMNS: [&str; 24] = [
    "setting_1", "setting_2", "setting_3", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9",
    "s10", "s11", "s12", "s13", "s14", "s15", "s16", "s17", "s18", "s19", "s20", "s21",
];

/// Channels with zero variance across the fleet, dropped by the pruner.
///
/// Any entry absent from the input is silently skipped, so the pruner stays
/// robust to partially-trimmed inputs.
pub const CONSTANT_CHANNELS: [&str; 7] = ["setting_3", "s1", "s5", "s10", "s16", "s18", "s19"];

/// Whether a column is expanded with rolling statistics by the feature engine.
///
/// The predicate is a name prefix match on `s`, which sweeps the operating
/// settings (`setting_1`, `setting_2`) into the expanded set alongside the
/// sensors. That matches the behavior the fitted artifacts were trained
/// against, so it is part of the data contract.
pub fn is_expanded_channel(name: &str) -> bool {
    name.starts_with('s')
}

/// Suffixes of the derived columns, in the order they are appended per channel.
pub const DERIVED_SUFFIXES: [&str; 3] = ["_mean5", "_std5", "_slope"];

/// Ordered feature-column contract.
///
/// A `FeatureLayout` names every feature column in the exact order the
/// numeric matrix is assembled. Scaler and model artifacts embed the layout
/// they were fit against; [`FeatureLayout::validate_against`] compares two
/// layouts column-by-column and reports the first divergence.
///
/// # Example
///
/// ```
/// use rul_predictor::schema::FeatureLayout;
///
/// let fitted = FeatureLayout::new(vec!["s2".into(), "s2_mean5".into()]);
/// let live = FeatureLayout::new(vec!["s2".into(), "s2_std5".into()]);
/// assert!(fitted.validate_against(&live).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureLayout {
    columns: Vec<String>,
}

impl FeatureLayout {
    /// Create a layout from an explicit column ordering.
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Derive the layout from a featurized frame.
    ///
    /// Every value column except the `RUL` label participates, in the
    /// frame's column order. The key columns (`unit_nr`, `time_cycles`) are
    /// held outside the value columns and never appear.
    pub fn from_frame(frame: &SensorFrame) -> Self {
        let columns = frame
            .names()
            .iter()
            .filter(|name| name.as_str() != RUL_COL)
            .cloned()
            .collect();
        Self { columns }
    }

    /// Ordered column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of feature columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Check that `live` matches this layout exactly, order included.
    ///
    /// `self` is the fitted (artifact) side; `live` is what the pipeline
    /// produced. Width differences and the first name divergence are
    /// reported as distinct errors.
    pub fn validate_against(&self, live: &FeatureLayout) -> Result<()> {
        if self.columns.len() != live.columns.len() {
            return Err(PipelineError::LayoutWidth {
                expected: self.columns.len(),
                found: live.columns.len(),
            });
        }
        for (position, (expected, found)) in
            self.columns.iter().zip(live.columns.iter()).enumerate()
        {
            if expected != found {
                return Err(PipelineError::LayoutMismatch {
                    position,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }
        Ok(())
    }
}
