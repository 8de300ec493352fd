//! Error types for the RUL prediction pipeline.
//!
//! The pipeline has a deliberately small failure taxonomy:
//!
//! - **Schema errors** (missing columns, wrong field counts, unparseable
//!   fields, out-of-order cycles) are fatal and surface before any output.
//! - **Artifact errors** (scaler or model files that cannot be loaded, or
//!   whose stored feature layout disagrees with the live one) are fatal and
//!   surface before any record is processed.
//! - **Short units** are fatal only under [`PaddingPolicy::Reject`]; the
//!   other policies surface them as data, not errors.
//!
//! A standard deviation over a single-sample window is not an error at all:
//! it is substituted with 0.0 inside the feature engine and never propagated.
//!
//! [`PaddingPolicy::Reject`]: crate::sequence_builder::PaddingPolicy

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors produced by the RUL prediction pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required column is absent from the input frame.
    #[error("required column `{0}` is missing")]
    MissingColumn(String),

    /// A raw input line had the wrong number of whitespace-delimited fields.
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        /// 1-indexed line number in the input file
        line: usize,
        /// Expected field count (26 for the raw format)
        expected: usize,
        /// Fields actually present on the line
        found: usize,
    },

    /// A raw input field could not be parsed as a number.
    #[error("line {line}: field `{field}` is not numeric: `{value}`")]
    Parse {
        /// 1-indexed line number in the input file
        line: usize,
        /// Column name of the offending field
        field: String,
        /// Raw text that failed to parse
        value: String,
    },

    /// `time_cycles` values within a unit must be strictly increasing.
    #[error("unit {unit}: time_cycles not strictly increasing at row {row}")]
    CycleOrder {
        /// Unit whose history is out of order
        unit: u32,
        /// 0-indexed row (within the whole frame) where order broke
        row: usize,
    },

    /// An added column collides with an existing one.
    #[error("column `{0}` already exists")]
    DuplicateColumn(String),

    /// An added column does not match the frame's row count.
    #[error("column `{name}` has {found} rows, frame has {expected}")]
    ColumnLength {
        /// Column being added
        name: String,
        /// Frame row count
        expected: usize,
        /// Length of the offending column
        found: usize,
    },

    /// The live feature ordering diverges from an artifact's stored layout.
    #[error(
        "feature layout mismatch at position {position}: \
         artifact expects `{expected}`, pipeline produced `{found}`"
    )]
    LayoutMismatch {
        /// First position at which the orderings diverge
        position: usize,
        /// Column name stored in the artifact
        expected: String,
        /// Column name produced by the pipeline
        found: String,
    },

    /// A matrix has the wrong number of feature columns.
    #[error("feature width mismatch: expected {expected} columns, found {found}")]
    LayoutWidth {
        /// Columns expected by the layout
        expected: usize,
        /// Columns actually present
        found: usize,
    },

    /// A scaler or model artifact could not be loaded.
    #[error("failed to load artifact `{path}`: {reason}")]
    Artifact {
        /// Path of the artifact file
        path: String,
        /// Underlying cause
        reason: String,
    },

    /// A unit has fewer records than the window size (reject policy only).
    #[error("unit {unit} has {len} records, fewer than window size {window}")]
    ShortUnit {
        /// Offending unit
        unit: u32,
        /// Records available for that unit
        len: usize,
        /// Configured window size
        window: usize,
    },

    /// A requested unit does not exist in the frame.
    #[error("unknown unit {0}")]
    UnknownUnit(u32),

    /// The input contains no records.
    #[error("input contains no records")]
    EmptyInput,

    /// The model returned a prediction count that does not match the batch.
    #[error("model returned {found} predictions for {expected} windows")]
    ModelOutput {
        /// Number of windows handed to the model
        expected: usize,
        /// Number of predictions it returned
        found: usize,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Filesystem failure while reading input or writing exports.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization failure.
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    /// NumPy export failure.
    #[error(transparent)]
    Npy(#[from] ndarray_npy::WriteNpyError),
}

impl PipelineError {
    /// Wrap an error with artifact-path context.
    pub(crate) fn artifact(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Artifact {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_positions() {
        let err = PipelineError::FieldCount {
            line: 17,
            expected: 26,
            found: 25,
        };
        assert_eq!(err.to_string(), "line 17: expected 26 fields, found 25");

        let err = PipelineError::LayoutMismatch {
            position: 3,
            expected: "s2_mean5".into(),
            found: "s2_std5".into(),
        };
        assert!(err.to_string().contains("position 3"));
        assert!(err.to_string().contains("s2_mean5"));
    }

    #[test]
    fn test_artifact_context_includes_path() {
        let err = PipelineError::artifact(std::path::Path::new("model/scaler.json"), "no such file");
        assert!(err.to_string().contains("model/scaler.json"));
        assert!(err.to_string().contains("no such file"));
    }
}
