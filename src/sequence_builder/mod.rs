//! Trailing-window extraction for model inference.
//!
//! For each unit, in order of first appearance in the input table, the
//! windower takes the trailing `W` feature vectors (ascending cycle order)
//! and emits them as one sequence. The output keeps windows and unit
//! identifiers index-aligned (`windows[i]` belongs to `units[i]`), an
//! alignment the orchestrator preserves end to end until the final
//! presentation sort deliberately breaks it.
//!
//! # Units shorter than the window
//!
//! A fixed-shape batch normally requires uniform sequence length, but a
//! unit may have fewer than `W` records. The policy is explicit and
//! configurable:
//!
//! - [`PaddingPolicy::Truncate`] (default) emits the shorter sequence and
//!   surfaces the unit in [`WindowBatch::short_units`], also logging a
//!   warning. The batch is then non-uniform and downstream consumers must
//!   accept ragged input.
//! - [`PaddingPolicy::EdgePad`] replicates the unit's earliest record until
//!   the sequence reaches `W`, keeping the batch uniform.
//! - [`PaddingPolicy::Reject`] fails on the first short unit.

use ndarray::{s, Array2, Array3, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::frame::SensorFrame;

/// Default trailing window length fed to the regression model.
pub const DEFAULT_WINDOW_SIZE: usize = 30;

/// How to handle units with fewer records than the window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaddingPolicy {
    /// Emit the shorter sequence and surface the unit as degenerate.
    #[default]
    Truncate,
    /// Left-pad by replicating the unit's earliest record.
    EdgePad,
    /// Fail on the first unit shorter than the window.
    Reject,
}

/// Configuration for window extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Sequence length handed to the model.
    pub window_size: usize,
    /// Policy for units with fewer than `window_size` records.
    pub padding: PaddingPolicy,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            padding: PaddingPolicy::default(),
        }
    }
}

impl WindowConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(PipelineError::Config(
                "window_size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A unit that had fewer records than the window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUnit {
    /// Unit identifier.
    pub unit: u32,
    /// Records available for that unit.
    pub len: usize,
}

/// Index-aligned windows and unit identifiers.
#[derive(Debug, Clone)]
pub struct WindowBatch {
    /// One `(len, n_features)` window per unit, ascending cycle order.
    pub windows: Vec<Array2<f64>>,
    /// Unit identifier for each window, first-appearance order.
    pub units: Vec<u32>,
    /// Units emitted shorter than the window size (`Truncate` only).
    pub short_units: Vec<ShortUnit>,
}

impl WindowBatch {
    /// Number of windows (equals the number of distinct units).
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether the batch holds no windows.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Whether every window has exactly `window_size` rows.
    pub fn is_uniform(&self, window_size: usize) -> bool {
        self.windows.iter().all(|w| w.nrows() == window_size)
    }

    /// Stack into one `(n_units, window_size, n_features)` tensor.
    ///
    /// Returns `None` for an empty or ragged batch.
    pub fn to_array3(&self) -> Option<Array3<f64>> {
        let first = self.windows.first()?;
        let (rows, cols) = (first.nrows(), first.ncols());
        if !self.is_uniform(rows) {
            return None;
        }
        let mut stacked = Array3::zeros((self.windows.len(), rows, cols));
        for (i, window) in self.windows.iter().enumerate() {
            stacked.slice_mut(s![i, .., ..]).assign(window);
        }
        Some(stacked)
    }
}

/// Extracts the trailing window of feature vectors for every unit.
#[derive(Debug, Clone, Default)]
pub struct Windower {
    config: WindowConfig,
}

impl Windower {
    /// Windower with the default 30-record window and truncate policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Windower with an explicit configuration.
    pub fn with_config(config: WindowConfig) -> Self {
        Self { config }
    }

    /// The configured window size.
    pub fn window_size(&self) -> usize {
        self.config.window_size
    }

    /// Build the window batch from a frame and its feature matrix.
    ///
    /// `features` must be row-aligned with `frame` (one row per record);
    /// the windower reads rows through the frame's partitions, never raw
    /// row order, so unit boundaries are respected by construction.
    pub fn build(&self, frame: &SensorFrame, features: ArrayView2<'_, f64>) -> Result<WindowBatch> {
        self.config.validate()?;
        if features.nrows() != frame.n_rows() {
            return Err(PipelineError::ColumnLength {
                name: "feature matrix".to_string(),
                expected: frame.n_rows(),
                found: features.nrows(),
            });
        }

        let window_size = self.config.window_size;
        let n_features = features.ncols();
        let mut windows = Vec::with_capacity(frame.partitions().len());
        let mut units = Vec::with_capacity(frame.partitions().len());
        let mut short_units = Vec::new();

        for partition in frame.partitions() {
            let len = partition.len();
            let take = len.min(window_size);
            let tail = &partition.rows[len - take..];

            let (out_rows, pad) = match self.config.padding {
                PaddingPolicy::Truncate => {
                    if len < window_size {
                        log::warn!(
                            "unit {} has {} records, fewer than window size {}",
                            partition.unit,
                            len,
                            window_size
                        );
                        short_units.push(ShortUnit {
                            unit: partition.unit,
                            len,
                        });
                    }
                    (take, 0)
                }
                PaddingPolicy::EdgePad => (window_size, window_size - take),
                PaddingPolicy::Reject => {
                    if len < window_size {
                        return Err(PipelineError::ShortUnit {
                            unit: partition.unit,
                            len,
                            window: window_size,
                        });
                    }
                    (take, 0)
                }
            };

            let mut window = Array2::zeros((out_rows, n_features));
            for i in 0..pad {
                window.row_mut(i).assign(&features.row(tail[0]));
            }
            for (i, &row) in tail.iter().enumerate() {
                window.row_mut(pad + i).assign(&features.row(row));
            }
            windows.push(window);
            units.push(partition.unit);
        }

        Ok(WindowBatch {
            windows,
            units,
            short_units,
        })
    }
}
