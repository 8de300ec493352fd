//! Raw log file parsing.
//!
//! The input format is headerless, whitespace-delimited text with exactly 26
//! ordered fields per line: `unit_nr`, `time_cycles`, `setting_1..3`,
//! `s1..s21`. A line with any other field count is a parse failure, as is a
//! field that does not parse as a number. Blank lines (common as trailing
//! whitespace in these files) are skipped.
//!
//! Parsing produces a [`SensorFrame`], which also enforces the per-unit
//! cycle-ordering invariant on construction.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::frame::SensorFrame;
use crate::schema::{RAW_FIELD_COUNT, RAW_VALUE_COLUMNS, TIME_COL, UNIT_COL};

/// Read a raw run-to-failure log from a file path.
pub fn read_raw_file<P: AsRef<Path>>(path: P) -> Result<SensorFrame> {
    let file = File::open(path.as_ref())?;
    parse_raw(BufReader::new(file))
}

/// Parse a raw run-to-failure log from any buffered reader.
///
/// # Example
///
/// ```
/// use rul_predictor::loader::parse_raw;
///
/// let line = "1 1 -0.0007 -0.0004 100.0 \
///     518.67 641.82 1589.70 1400.60 14.62 21.61 554.36 2388.06 9046.19 \
///     1.30 47.47 521.66 2388.02 8138.62 8.4195 0.03 392 2388 100.00 39.06 23.4190\n";
/// let frame = parse_raw(line.as_bytes()).unwrap();
/// assert_eq!(frame.n_rows(), 1);
/// assert_eq!(frame.units(), &[1]);
/// ```
pub fn parse_raw<R: BufRead>(reader: R) -> Result<SensorFrame> {
    let mut units: Vec<u32> = Vec::new();
    let mut cycles: Vec<u32> = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); RAW_VALUE_COLUMNS.len()];

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != RAW_FIELD_COUNT {
            return Err(PipelineError::FieldCount {
                line: line_no,
                expected: RAW_FIELD_COUNT,
                found: fields.len(),
            });
        }

        units.push(parse_key(fields[0], line_no, UNIT_COL)?);
        cycles.push(parse_key(fields[1], line_no, TIME_COL)?);
        for (j, name) in RAW_VALUE_COLUMNS.iter().enumerate() {
            let raw = fields[j + 2];
            let value: f64 = raw.parse().map_err(|_| PipelineError::Parse {
                line: line_no,
                field: name.to_string(),
                value: raw.to_string(),
            })?;
            columns[j].push(value);
        }
    }

    SensorFrame::new(
        units,
        cycles,
        RAW_VALUE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        columns,
    )
}

fn parse_key(raw: &str, line: usize, field: &str) -> Result<u32> {
    raw.parse().map_err(|_| PipelineError::Parse {
        line,
        field: field.to_string(),
        value: raw.to_string(),
    })
}
