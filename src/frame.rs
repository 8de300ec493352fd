//! Column-oriented sensor table with per-unit partitioning.
//!
//! [`SensorFrame`] is the in-memory representation every pipeline stage
//! operates on: a column-major `f64` table of value columns, keyed by two
//! integer columns held separately (`unit_nr`, `time_cycles`).
//!
//! The frame maintains a partition index: for each unit, the row indices
//! belonging to it, in input order. Partitions are kept in order of first
//! appearance, which is the order the windower and orchestrator emit units
//! in. Units do not have to be contiguous in the raw table; the rolling
//! feature engine walks partitions, never raw row order, so adjacency of two
//! units in the file can never leak state between them.
//!
//! Rows within a unit must arrive with strictly increasing `time_cycles`;
//! construction fails otherwise. That single check gives the rest of the
//! pipeline its ordering invariant for free.

use ahash::AHashMap;
use ndarray::Array2;

use crate::error::{PipelineError, Result};
use crate::schema::FeatureLayout;

/// Row indices of one unit, in ascending cycle order.
#[derive(Debug, Clone)]
pub struct UnitPartition {
    /// Unit identifier.
    pub unit: u32,
    /// Row indices into the frame, ascending `time_cycles`.
    pub rows: Vec<usize>,
}

impl UnitPartition {
    /// Number of records for this unit.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the partition holds no rows (never true for built frames).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Column-major sensor table.
///
/// # Example
///
/// ```
/// use rul_predictor::frame::SensorFrame;
///
/// let frame = SensorFrame::new(
///     vec![1, 1, 2],
///     vec![1, 2, 1],
///     vec!["s2".into()],
///     vec![vec![10.0, 11.0, 20.0]],
/// )
/// .unwrap();
///
/// assert_eq!(frame.n_rows(), 3);
/// assert_eq!(frame.partitions().len(), 2);
/// assert_eq!(frame.column("s2").unwrap(), &[10.0, 11.0, 20.0]);
/// ```
#[derive(Debug, Clone)]
pub struct SensorFrame {
    units: Vec<u32>,
    cycles: Vec<u32>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    partitions: Vec<UnitPartition>,
    unit_index: AHashMap<u32, usize>,
}

impl SensorFrame {
    /// Build a frame from parallel key columns and named value columns.
    ///
    /// Validates that all columns share one row count, that column names are
    /// unique, and that each unit's `time_cycles` are strictly increasing in
    /// row order.
    pub fn new(
        units: Vec<u32>,
        cycles: Vec<u32>,
        names: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let n_rows = units.len();
        if cycles.len() != n_rows {
            return Err(PipelineError::ColumnLength {
                name: crate::schema::TIME_COL.to_string(),
                expected: n_rows,
                found: cycles.len(),
            });
        }
        if names.len() != columns.len() {
            return Err(PipelineError::Config(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        for (name, column) in names.iter().zip(&columns) {
            if column.len() != n_rows {
                return Err(PipelineError::ColumnLength {
                    name: name.clone(),
                    expected: n_rows,
                    found: column.len(),
                });
            }
        }
        {
            let mut seen = AHashMap::with_capacity(names.len());
            for name in &names {
                if seen.insert(name.as_str(), ()).is_some() {
                    return Err(PipelineError::DuplicateColumn(name.clone()));
                }
            }
        }

        let (partitions, unit_index) = build_partitions(&units, &cycles)?;

        Ok(Self {
            units,
            cycles,
            names,
            columns,
            partitions,
            unit_index,
        })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.units.len()
    }

    /// Number of value columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Per-row unit identifiers.
    pub fn units(&self) -> &[u32] {
        &self.units
    }

    /// Per-row cycle counters.
    pub fn cycles(&self) -> &[u32] {
        &self.cycles
    }

    /// Value column names, in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether a value column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// A value column by name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// A value column by name, as a schema error when absent.
    pub fn require_column(&self, name: &str) -> Result<&[f64]> {
        self.column(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    /// Unit partitions in order of first appearance.
    pub fn partitions(&self) -> &[UnitPartition] {
        &self.partitions
    }

    /// The partition of one unit, if present.
    pub fn partition(&self, unit: u32) -> Option<&UnitPartition> {
        self.unit_index.get(&unit).map(|&i| &self.partitions[i])
    }

    /// Append a value column. Fails on name collision or length mismatch.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(PipelineError::DuplicateColumn(name));
        }
        if values.len() != self.n_rows() {
            return Err(PipelineError::ColumnLength {
                name,
                expected: self.n_rows(),
                found: values.len(),
            });
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    /// Drop value columns by name; names not present are silently skipped.
    ///
    /// Remaining columns keep their relative order.
    pub fn drop_columns(&mut self, names: &[&str]) {
        let mut keep: Vec<bool> = self
            .names
            .iter()
            .map(|name| !names.contains(&name.as_str()))
            .collect();
        // Drain back-to-front so indices stay valid.
        for i in (0..keep.len()).rev() {
            if !keep[i] {
                self.names.remove(i);
                self.columns.remove(i);
                keep.remove(i);
            }
        }
    }

    /// Assemble the numeric feature matrix for a layout, row-major
    /// `(n_rows, layout.len())`, columns in layout order.
    pub fn feature_matrix(&self, layout: &FeatureLayout) -> Result<Array2<f64>> {
        let n_rows = self.n_rows();
        let mut matrix = Array2::zeros((n_rows, layout.len()));
        for (j, name) in layout.columns().iter().enumerate() {
            let column = self.require_column(name)?;
            for (i, &value) in column.iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }
        Ok(matrix)
    }
}

/// Group rows by unit in first-appearance order, validating cycle order.
fn build_partitions(
    units: &[u32],
    cycles: &[u32],
) -> Result<(Vec<UnitPartition>, AHashMap<u32, usize>)> {
    let mut partitions: Vec<UnitPartition> = Vec::new();
    let mut unit_index: AHashMap<u32, usize> = AHashMap::new();

    for (row, (&unit, &cycle)) in units.iter().zip(cycles.iter()).enumerate() {
        match unit_index.get(&unit) {
            Some(&i) => {
                let partition = &mut partitions[i];
                let last_row = *partition.rows.last().expect("partition never empty");
                if cycles[last_row] >= cycle {
                    return Err(PipelineError::CycleOrder { unit, row });
                }
                partition.rows.push(row);
            }
            None => {
                unit_index.insert(unit, partitions.len());
                partitions.push(UnitPartition {
                    unit,
                    rows: vec![row],
                });
            }
        }
    }

    Ok((partitions, unit_index))
}
