//! The regression model contract.
//!
//! The model that maps a window of feature vectors to a scalar RUL estimate
//! is trained and persisted outside this crate. The pipeline reaches it
//! only through [`RulModel`], one batch `predict` operation, so the core
//! has no dependency on how the model is stored or what produced it.
//!
//! [`LinearModel`] is the bundled artifact-backed implementation: a dense
//! weight matrix over the flattened window plus a bias, loadable from JSON.
//! Anything else implementing [`RulModel`] can be injected in its place.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::schema::FeatureLayout;
use crate::sequence_builder::WindowBatch;

/// Batch inference over per-unit windows.
///
/// Implementations must return exactly one prediction per window, in input
/// order; the orchestrator checks the count and fails otherwise.
pub trait RulModel: Send + Sync {
    /// Predict one scalar RUL per window.
    fn predict(&self, batch: &WindowBatch) -> Result<Vec<f64>>;

    /// The layout the model was trained against, when it carries one.
    fn layout(&self) -> Option<&FeatureLayout> {
        None
    }
}

/// Serialized form of [`LinearModel`].
#[derive(Debug, Serialize, Deserialize)]
struct LinearModelArtifact {
    columns: FeatureLayout,
    window_size: usize,
    /// Row-major `(window_size, n_features)` weights.
    weights: Vec<f64>,
    bias: f64,
}

/// Linear regression over the flattened window.
///
/// The prediction for a window is `bias + Σ weights[i, j] * window[i, j]`,
/// with weight rows aligned to the *end* of the window: the last weight row
/// always multiplies the most recent record. For sequences shorter than
/// `window_size` (truncate policy), only the trailing weight rows
/// participate.
#[derive(Debug, Clone)]
pub struct LinearModel {
    layout: FeatureLayout,
    window_size: usize,
    weights: Array2<f64>,
    bias: f64,
}

impl LinearModel {
    /// Build a model from explicit parameters.
    pub fn new(
        layout: FeatureLayout,
        window_size: usize,
        weights: Vec<f64>,
        bias: f64,
    ) -> Result<Self> {
        if window_size == 0 {
            return Err(PipelineError::Config(
                "model window_size must be >= 1".to_string(),
            ));
        }
        let expected = window_size * layout.len();
        if weights.len() != expected {
            return Err(PipelineError::Config(format!(
                "model weights have {} values, expected {} ({} x {})",
                weights.len(),
                expected,
                window_size,
                layout.len()
            )));
        }
        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(PipelineError::Config(
                "model parameters must be finite".to_string(),
            ));
        }
        let weights = Array2::from_shape_vec((window_size, layout.len()), weights)
            .expect("length checked above");
        Ok(Self {
            layout,
            window_size,
            weights,
            bias,
        })
    }

    /// Load a model artifact from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PipelineError::artifact(path, e))?;
        let artifact: LinearModelArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PipelineError::artifact(path, e))?;
        Self::new(
            artifact.columns,
            artifact.window_size,
            artifact.weights,
            artifact.bias,
        )
    }

    /// Persist the model as a JSON artifact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let artifact = LinearModelArtifact {
            columns: self.layout.clone(),
            window_size: self.window_size,
            weights: self.weights.iter().copied().collect(),
            bias: self.bias,
        };
        let file = File::create(path).map_err(|e| PipelineError::artifact(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &artifact)
            .map_err(|e| PipelineError::artifact(path, e))?;
        Ok(())
    }

    /// The sequence length the model was trained on.
    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

impl RulModel for LinearModel {
    fn predict(&self, batch: &WindowBatch) -> Result<Vec<f64>> {
        let mut predictions = Vec::with_capacity(batch.len());
        for window in &batch.windows {
            if window.ncols() != self.layout.len() {
                return Err(PipelineError::LayoutWidth {
                    expected: self.layout.len(),
                    found: window.ncols(),
                });
            }
            let take = window.nrows().min(self.window_size);
            let w_tail = self.weights.nrows() - take;
            let x_tail = window.nrows() - take;
            let mut score = self.bias;
            for i in 0..take {
                let weight_row = self.weights.row(w_tail + i);
                let value_row = window.row(x_tail + i);
                score += weight_row.dot(&value_row);
            }
            predictions.push(score);
        }
        Ok(predictions)
    }

    fn layout(&self) -> Option<&FeatureLayout> {
        Some(&self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn layout1() -> FeatureLayout {
        FeatureLayout::new(vec!["s2".into()])
    }

    fn batch_of(windows: Vec<Array2<f64>>) -> WindowBatch {
        let units = (1..=windows.len() as u32).collect();
        WindowBatch {
            windows,
            units,
            short_units: Vec::new(),
        }
    }

    #[test]
    fn test_predict_dot_product_plus_bias() {
        // Weights [1, 2, 3] over a 3-record window, bias 10.
        let model = LinearModel::new(layout1(), 3, vec![1.0, 2.0, 3.0], 10.0).unwrap();
        let batch = batch_of(vec![array![[1.0], [1.0], [1.0]]]);
        let preds = model.predict(&batch).unwrap();
        assert_relative_eq!(preds[0], 16.0);
    }

    #[test]
    fn test_predict_short_window_uses_trailing_weights() {
        let model = LinearModel::new(layout1(), 3, vec![1.0, 2.0, 3.0], 0.0).unwrap();
        // Two records: only weight rows [2, 3] participate.
        let batch = batch_of(vec![array![[10.0], [100.0]]]);
        let preds = model.predict(&batch).unwrap();
        assert_relative_eq!(preds[0], 2.0 * 10.0 + 3.0 * 100.0);
    }

    #[test]
    fn test_predict_batch_order_preserved() {
        let model = LinearModel::new(layout1(), 1, vec![1.0], 0.0).unwrap();
        let batch = batch_of(vec![array![[5.0]], array![[7.0]]]);
        assert_eq!(model.predict(&batch).unwrap(), vec![5.0, 7.0]);
    }

    #[test]
    fn test_new_rejects_wrong_weight_count() {
        assert!(matches!(
            LinearModel::new(layout1(), 3, vec![1.0, 2.0], 0.0),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_predict_rejects_feature_width_mismatch() {
        let model = LinearModel::new(layout1(), 2, vec![1.0, 1.0], 0.0).unwrap();
        let batch = batch_of(vec![array![[1.0, 2.0], [3.0, 4.0]]]);
        assert!(matches!(
            model.predict(&batch),
            Err(PipelineError::LayoutWidth { .. })
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = LinearModel::new(layout1(), 2, vec![0.5, 1.5], -3.0).unwrap();
        model.save(&path).unwrap();

        let loaded = LinearModel::load(&path).unwrap();
        let batch = batch_of(vec![array![[2.0], [4.0]]]);
        assert_eq!(
            loaded.predict(&batch).unwrap(),
            model.predict(&batch).unwrap()
        );
        assert_eq!(loaded.window_size(), 2);
    }

    #[test]
    fn test_load_missing_file_is_artifact_error() {
        assert!(matches!(
            LinearModel::load("missing/model.json"),
            Err(PipelineError::Artifact { .. })
        ));
    }
}
