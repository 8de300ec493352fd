//! Pipeline configuration management.
//!
//! One struct gathers the knobs of every stage (label cap, rolling window,
//! sequence window and padding policy, risk thresholds) with serde
//! round-tripping to TOML or JSON, so an inference deployment is described
//! by a version-controlled file instead of code.
//!
//! # Example
//!
//! ```ignore
//! use rul_predictor::config::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! config.save_toml("deploy/pipeline.toml")?;
//!
//! let loaded = PipelineConfig::load_toml("deploy/pipeline.toml")?;
//! loaded.validate()?;
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::FeatureConfig;
use crate::labeling::LabelingConfig;
use crate::risk::RiskThresholds;
use crate::sequence_builder::WindowConfig;

/// Unified pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// RUL label derivation.
    pub labeling: LabelingConfig,

    /// Rolling feature computation.
    pub features: FeatureConfig,

    /// Window extraction.
    pub window: WindowConfig,

    /// Risk bucket boundaries.
    pub risk: RiskThresholds,

    /// Deployment metadata (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RunMetadata>,
}

/// Deployment metadata for tracking and reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Deployment or experiment name.
    pub name: String,

    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Version or git commit of the fitted artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl RunMetadata {
    /// Metadata stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            version: None,
        }
    }
}

impl PipelineConfig {
    /// Configuration with every stage at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set labeling configuration.
    pub fn with_labeling(mut self, labeling: LabelingConfig) -> Self {
        self.labeling = labeling;
        self
    }

    /// Set feature configuration.
    pub fn with_features(mut self, features: FeatureConfig) -> Self {
        self.features = features;
        self
    }

    /// Set window configuration.
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Set risk thresholds.
    pub fn with_risk(mut self, risk: RiskThresholds) -> Self {
        self.risk = risk;
        self
    }

    /// Set deployment metadata.
    pub fn with_metadata(mut self, metadata: RunMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Validate every stage's parameters.
    pub fn validate(&self) -> Result<()> {
        self.features.validate()?;
        self.window.validate()?;
        self.risk.validate()?;
        Ok(())
    }

    /// Save to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Load from a TOML file and validate.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let rendered = serde_json::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Load from a JSON file and validate.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
