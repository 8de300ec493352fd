//! The scaler contract and its artifact-backed implementation.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::schema::FeatureLayout;

/// Order-sensitive, pre-fit feature scaling.
///
/// `transform` takes a feature matrix whose column order matches the order
/// the parameters were fit against and returns a matrix of identical shape.
/// Implementations are stateless at inference time; parameters are loaded
/// once, before use, and shared read-only afterwards.
pub trait Scaler: Send + Sync {
    /// Apply per-column scaling. Output shape equals input shape.
    fn transform(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>>;

    /// The layout the parameters were fit against, when the implementation
    /// carries one. The pipeline validates it against the live layout
    /// before transforming.
    fn layout(&self) -> Option<&FeatureLayout> {
        None
    }
}

/// Pass-through scaler for tests and unscaled smoke runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityScaler;

impl Scaler for IdentityScaler {
    fn transform(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        Ok(features.to_owned())
    }
}

/// Serialized form of [`AffineScaler`].
#[derive(Debug, Serialize, Deserialize)]
struct AffineScalerArtifact {
    columns: FeatureLayout,
    scale: Vec<f64>,
    offset: Vec<f64>,
}

/// Per-column affine transform loaded from a fitted artifact.
///
/// Applies `x * scale[j] + offset[j]` to column `j`. The artifact embeds
/// the [`FeatureLayout`] it was fit against; width is re-checked on every
/// transform, and the pipeline additionally validates the layout column by
/// column before the first transform.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use rul_predictor::preprocessing::{AffineScaler, Scaler};
/// use rul_predictor::schema::FeatureLayout;
///
/// let scaler = AffineScaler::new(
///     FeatureLayout::new(vec!["s2".into()]),
///     vec![2.0],
///     vec![1.0],
/// )
/// .unwrap();
///
/// let out = scaler.transform(array![[3.0], [4.0]].view()).unwrap();
/// assert_eq!(out, array![[7.0], [9.0]]);
/// ```
#[derive(Debug, Clone)]
pub struct AffineScaler {
    layout: FeatureLayout,
    scale: Vec<f64>,
    offset: Vec<f64>,
}

impl AffineScaler {
    /// Build a scaler from explicit parameters.
    ///
    /// Parameter vectors must match the layout width and be finite.
    pub fn new(layout: FeatureLayout, scale: Vec<f64>, offset: Vec<f64>) -> Result<Self> {
        if scale.len() != layout.len() {
            return Err(PipelineError::LayoutWidth {
                expected: layout.len(),
                found: scale.len(),
            });
        }
        if offset.len() != layout.len() {
            return Err(PipelineError::LayoutWidth {
                expected: layout.len(),
                found: offset.len(),
            });
        }
        if scale.iter().chain(offset.iter()).any(|v| !v.is_finite()) {
            return Err(PipelineError::Config(
                "scaler parameters must be finite".to_string(),
            ));
        }
        Ok(Self {
            layout,
            scale,
            offset,
        })
    }

    /// Load a scaler artifact from a JSON file.
    ///
    /// Fails fast, before any record is processed, on a missing file,
    /// malformed JSON, or parameter/layout width disagreement.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PipelineError::artifact(path, e))?;
        let artifact: AffineScalerArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PipelineError::artifact(path, e))?;
        Self::new(artifact.columns, artifact.scale, artifact.offset)
    }

    /// Persist the scaler as a JSON artifact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let artifact = AffineScalerArtifact {
            columns: self.layout.clone(),
            scale: self.scale.clone(),
            offset: self.offset.clone(),
        };
        let file = File::create(path).map_err(|e| PipelineError::artifact(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &artifact)
            .map_err(|e| PipelineError::artifact(path, e))?;
        Ok(())
    }
}

impl Scaler for AffineScaler {
    fn transform(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.layout.len() {
            return Err(PipelineError::LayoutWidth {
                expected: self.layout.len(),
                found: features.ncols(),
            });
        }
        let mut out = features.to_owned();
        for (j, mut column) in out.columns_mut().into_iter().enumerate() {
            let (scale, offset) = (self.scale[j], self.offset[j]);
            column.mapv_inplace(|x| x * scale + offset);
        }
        Ok(out)
    }

    fn layout(&self) -> Option<&FeatureLayout> {
        Some(&self.layout)
    }
}
