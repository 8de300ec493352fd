//! NumPy export of window batches.
//!
//! The regression model is trained in Python; this module writes the
//! windower's output in the format that training stack reads directly:
//!
//! - `windows.npy`: one `(n_units, window_size, n_features)` tensor when
//!   the batch is uniform, otherwise one `unit_<id>.npy` file per unit;
//! - `units.npy`: the unit identifiers, index-aligned with the tensor;
//! - `meta.json`: feature layout, window size, short units, timestamp.
//!
//! The metadata file carries the [`FeatureLayout`] so the Python side can
//! fit its scaler against the exact column order this crate produces, which
//! is what makes the positional contract round-trip safely.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use ndarray::Array1;
use ndarray_npy::WriteNpyExt;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::schema::FeatureLayout;
use crate::sequence_builder::{ShortUnit, WindowBatch};

/// Metadata written next to the exported arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Feature column order of the exported tensors.
    pub columns: FeatureLayout,
    /// Configured window size.
    pub window_size: usize,
    /// Unit identifiers, in tensor order.
    pub units: Vec<u32>,
    /// Units shorter than the window size.
    pub short_units: Vec<ShortUnit>,
    /// Whether the batch was written as one stacked tensor.
    pub uniform: bool,
    /// Export timestamp (RFC 3339).
    pub created_at: String,
}

/// Files written by one export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Paths of every file written, metadata last.
    pub files: Vec<PathBuf>,
    /// Whether windows landed in one stacked tensor.
    pub uniform: bool,
}

/// Writes window batches to a directory in NumPy format.
#[derive(Debug, Clone)]
pub struct WindowExporter {
    out_dir: PathBuf,
}

impl WindowExporter {
    /// Exporter writing into `out_dir` (created on first export).
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Write a batch plus its metadata.
    pub fn export(
        &self,
        batch: &WindowBatch,
        layout: &FeatureLayout,
        window_size: usize,
    ) -> Result<ExportResult> {
        if batch.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        fs::create_dir_all(&self.out_dir)?;
        let mut files = Vec::new();

        let uniform = match batch.to_array3() {
            Some(stacked) => {
                let path = self.out_dir.join("windows.npy");
                stacked.write_npy(BufWriter::new(File::create(&path)?))?;
                files.push(path);
                true
            }
            None => {
                log::warn!("ragged batch: writing one file per unit");
                for (window, &unit) in batch.windows.iter().zip(&batch.units) {
                    let path = self.out_dir.join(format!("unit_{unit}.npy"));
                    window.write_npy(BufWriter::new(File::create(&path)?))?;
                    files.push(path);
                }
                false
            }
        };

        let units_path = self.out_dir.join("units.npy");
        Array1::from(batch.units.clone()).write_npy(BufWriter::new(File::create(&units_path)?))?;
        files.push(units_path);

        let metadata = ExportMetadata {
            columns: layout.clone(),
            window_size,
            units: batch.units.clone(),
            short_units: batch.short_units.clone(),
            uniform,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let meta_path = self.out_dir.join("meta.json");
        serde_json::to_writer_pretty(BufWriter::new(File::create(&meta_path)?), &metadata)?;
        files.push(meta_path);

        Ok(ExportResult { files, uniform })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use ndarray_npy::ReadNpyExt;

    fn batch(lens: &[usize], n_features: usize) -> WindowBatch {
        let windows = lens
            .iter()
            .map(|&len| {
                Array2::from_shape_fn((len, n_features), |(i, j)| (i * n_features + j) as f64)
            })
            .collect();
        WindowBatch {
            windows,
            units: (1..=lens.len() as u32).collect(),
            short_units: Vec::new(),
        }
    }

    fn layout(n: usize) -> FeatureLayout {
        FeatureLayout::new((0..n).map(|i| format!("s{i}")).collect())
    }

    #[test]
    fn test_uniform_batch_single_tensor() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = WindowExporter::new(dir.path());
        let result = exporter.export(&batch(&[3, 3], 2), &layout(2), 3).unwrap();

        assert!(result.uniform);
        let stacked = Array3::<f64>::read_npy(File::open(dir.path().join("windows.npy")).unwrap())
            .unwrap();
        assert_eq!(stacked.shape(), &[2, 3, 2]);

        let units =
            Array1::<u32>::read_npy(File::open(dir.path().join("units.npy")).unwrap()).unwrap();
        assert_eq!(units.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_ragged_batch_per_unit_files() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = WindowExporter::new(dir.path());
        let result = exporter.export(&batch(&[2, 3], 2), &layout(2), 3).unwrap();

        assert!(!result.uniform);
        assert!(dir.path().join("unit_1.npy").exists());
        assert!(dir.path().join("unit_2.npy").exists());
        assert!(!dir.path().join("windows.npy").exists());
    }

    #[test]
    fn test_metadata_round_trips_layout() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = WindowExporter::new(dir.path());
        exporter.export(&batch(&[3], 2), &layout(2), 3).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("meta.json")).unwrap();
        let metadata: ExportMetadata = serde_json::from_str(&raw).unwrap();
        assert_eq!(metadata.columns, layout(2));
        assert_eq!(metadata.window_size, 3);
        assert!(metadata.uniform);
        assert_eq!(metadata.units, vec![1]);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = WindowExporter::new(dir.path());
        let empty = WindowBatch {
            windows: vec![],
            units: vec![],
            short_units: vec![],
        };
        assert!(matches!(
            exporter.export(&empty, &layout(1), 3),
            Err(PipelineError::EmptyInput)
        ));
    }
}
