//! Ground-truth RUL label derivation.
//!
//! Run-to-failure histories carry their own labels: for every record of a
//! unit, the remaining useful life is the distance (in cycles) to that
//! unit's last observed cycle. The raw distance is then clamped to an upper
//! bound, modeling the assumption that degradation is not observable far
//! from end-of-life: a unit 300 cycles from failure looks exactly like one
//! 125 cycles from failure, so both are labeled at the cap.
//!
//! Within a unit the resulting label is non-increasing: flat at the cap
//! while the raw distance exceeds it, then decreasing by exactly 1 per
//! cycle down to 0 at the final record.
//!
//! # Example
//!
//! ```
//! use rul_predictor::frame::SensorFrame;
//! use rul_predictor::labeling::{LabelingConfig, RulLabeler};
//!
//! let frame = SensorFrame::new(
//!     vec![1, 1, 1],
//!     vec![1, 2, 3],
//!     vec!["s2".into()],
//!     vec![vec![0.0, 0.0, 0.0]],
//! )
//! .unwrap();
//!
//! let labeled = RulLabeler::with_config(LabelingConfig { rul_cap: 125 })
//!     .label(&frame)
//!     .unwrap();
//! assert_eq!(labeled.column("RUL").unwrap(), &[2.0, 1.0, 0.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frame::SensorFrame;
use crate::schema::RUL_COL;

/// Default upper bound on derived RUL labels.
pub const DEFAULT_RUL_CAP: u32 = 125;

/// Configuration for RUL label derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelingConfig {
    /// Upper bound applied to every derived label.
    pub rul_cap: u32,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            rul_cap: DEFAULT_RUL_CAP,
        }
    }
}

/// Derives the `RUL` column from per-unit cycle counts.
#[derive(Debug, Clone, Default)]
pub struct RulLabeler {
    config: LabelingConfig,
}

impl RulLabeler {
    /// Labeler with the default cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Labeler with an explicit configuration.
    pub fn with_config(config: LabelingConfig) -> Self {
        Self { config }
    }

    /// The configured cap.
    pub fn rul_cap(&self) -> u32 {
        self.config.rul_cap
    }

    /// Return a copy of `frame` with the `RUL` column appended.
    ///
    /// The per-unit maximum cycle is scratch state and does not appear in
    /// the output. Fails if a `RUL` column is already present.
    pub fn label(&self, frame: &SensorFrame) -> Result<SensorFrame> {
        let cycles = frame.cycles();
        let mut rul = vec![0.0; frame.n_rows()];
        for partition in frame.partitions() {
            // Rows are ascending in cycles, so the last row holds the max.
            let last_row = *partition.rows.last().expect("partition never empty");
            let max_cycle = cycles[last_row];
            for &row in &partition.rows {
                let remaining = max_cycle - cycles[row];
                rul[row] = remaining.min(self.config.rul_cap) as f64;
            }
        }

        let mut labeled = frame.clone();
        labeled.add_column(RUL_COL, rul)?;
        Ok(labeled)
    }
}
