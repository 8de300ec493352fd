//! Sensor pruning and per-unit rolling feature computation.
//!
//! Two stages live here, run back to back by [`FeatureEngine::run`]:
//!
//! 1. **Pruning**: a fixed list of channels carries zero variance across
//!    the fleet ([`CONSTANT_CHANNELS`]) and is dropped outright. Entries
//!    absent from the input are skipped without error.
//!
//! 2. **Expansion**: every remaining channel matching the expansion
//!    predicate gains three derived columns: trailing mean, trailing sample
//!    standard deviation, and first difference. All three are computed per
//!    unit; no rolling or diff computation ever reads a record from another
//!    unit, including when two units sit adjacent in the raw table.
//!
//! Derived columns are appended after the existing columns in a fixed
//! order: channels in their existing column order, and mean → std → slope
//! within each channel. This ordering is a hard contract, since the fitted
//! scaler's parameters are positional, and is captured downstream as a
//! [`FeatureLayout`](crate::schema::FeatureLayout).
//!
//! Units are independent, so channel columns are computed in parallel when
//! the `parallel` feature is enabled. The output is byte-identical to the
//! serial path; parallelism is an optimization, not a semantic.

pub mod rolling;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::frame::SensorFrame;
use crate::schema::{is_expanded_channel, CONSTANT_CHANNELS, DERIVED_SUFFIXES};
use rolling::TrailingStats;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Default trailing window length for rolling statistics.
pub const DEFAULT_ROLLING_WINDOW: usize = 5;

/// Configuration for the feature engine.
///
/// The derived column names carry the literal `5` suffix (`_mean5`,
/// `_std5`) regardless of the configured window, because the names are part
/// of the layout the fitted artifacts were trained against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Trailing window length for mean and standard deviation.
    pub rolling_window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
        }
    }
}

impl FeatureConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.rolling_window == 0 {
            return Err(PipelineError::Config(
                "rolling_window must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Drop the fixed constant-channel list from a copy of `frame`.
///
/// Channels absent from the input are silently skipped; the relative order
/// of the remaining columns is unchanged.
pub fn prune_constant_channels(frame: &SensorFrame) -> SensorFrame {
    let mut pruned = frame.clone();
    pruned.drop_columns(&CONSTANT_CHANNELS);
    pruned
}

/// Computes per-unit rolling statistics and first differences.
#[derive(Debug, Clone, Default)]
pub struct FeatureEngine {
    config: FeatureConfig,
}

impl FeatureEngine {
    /// Engine with the default 5-record window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with an explicit configuration.
    pub fn with_config(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Prune constant channels, then expand the survivors.
    pub fn run(&self, frame: &SensorFrame) -> Result<SensorFrame> {
        self.expand(&prune_constant_channels(frame))
    }

    /// Append the derived columns for every expandable channel.
    ///
    /// Appended order: channels in existing column order, `_mean5` →
    /// `_std5` → `_slope` within each channel.
    pub fn expand(&self, frame: &SensorFrame) -> Result<SensorFrame> {
        self.config.validate()?;
        let channels: Vec<String> = frame
            .names()
            .iter()
            .filter(|name| is_expanded_channel(name))
            .cloned()
            .collect();

        let window = self.config.rolling_window;

        #[cfg(feature = "parallel")]
        let derived: Vec<(String, [Vec<f64>; 3])> = channels
            .par_iter()
            .map(|name| derive_channel(frame, name, window).map(|d| (name.clone(), d)))
            .collect::<Result<_>>()?;

        #[cfg(not(feature = "parallel"))]
        let derived: Vec<(String, [Vec<f64>; 3])> = channels
            .iter()
            .map(|name| derive_channel(frame, name, window).map(|d| (name.clone(), d)))
            .collect::<Result<_>>()?;

        let mut expanded = frame.clone();
        for (name, [mean, std, slope]) in derived {
            for (suffix, values) in DERIVED_SUFFIXES.iter().zip([mean, std, slope]) {
                expanded.add_column(format!("{name}{suffix}"), values)?;
            }
        }
        Ok(expanded)
    }
}

/// Rolling mean/std and first difference for one channel, all units.
///
/// Accumulator state is created fresh per partition, so nothing can carry
/// across a unit boundary.
fn derive_channel(frame: &SensorFrame, name: &str, window: usize) -> Result<[Vec<f64>; 3]> {
    let values = frame.require_column(name)?;
    let n = frame.n_rows();
    let mut mean = vec![0.0; n];
    let mut std = vec![0.0; n];
    let mut slope = vec![0.0; n];

    for partition in frame.partitions() {
        let mut stats = TrailingStats::new(window);
        let mut prev: Option<f64> = None;
        for &row in &partition.rows {
            let x = values[row];
            stats.push(x);
            mean[row] = stats.mean();
            std[row] = stats.std();
            slope[row] = prev.map_or(0.0, |p| x - p);
            prev = Some(x);
        }
    }

    Ok([mean, std, slope])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame_one_sensor(units: Vec<u32>, cycles: Vec<u32>, s2: Vec<f64>) -> SensorFrame {
        SensorFrame::new(units, cycles, vec!["s2".into()], vec![s2]).unwrap()
    }

    #[test]
    fn test_prune_drops_listed_channels_only() {
        let frame = SensorFrame::new(
            vec![1],
            vec![1],
            vec!["setting_3".into(), "s1".into(), "s2".into(), "s5".into()],
            vec![vec![0.0], vec![0.0], vec![0.0], vec![0.0]],
        )
        .unwrap();
        let pruned = prune_constant_channels(&frame);
        assert_eq!(pruned.names(), &["s2".to_string()]);
    }

    #[test]
    fn test_prune_silently_skips_absent_channels() {
        // None of the constant channels are present.
        let frame = frame_one_sensor(vec![1], vec![1], vec![0.0]);
        let pruned = prune_constant_channels(&frame);
        assert_eq!(pruned.names(), &["s2".to_string()]);
        for channel in CONSTANT_CHANNELS {
            assert!(!pruned.has_column(channel));
        }
    }

    #[test]
    fn test_expand_column_order_is_channelwise_triples() {
        let frame = SensorFrame::new(
            vec![1, 1],
            vec![1, 2],
            vec!["setting_1".into(), "s2".into()],
            vec![vec![0.0, 0.0], vec![1.0, 2.0]],
        )
        .unwrap();
        let expanded = FeatureEngine::new().expand(&frame).unwrap();
        assert_eq!(
            expanded.names(),
            &[
                "setting_1".to_string(),
                "s2".to_string(),
                "setting_1_mean5".to_string(),
                "setting_1_std5".to_string(),
                "setting_1_slope".to_string(),
                "s2_mean5".to_string(),
                "s2_std5".to_string(),
                "s2_slope".to_string(),
            ]
        );
    }

    #[test]
    fn test_first_record_of_unit_mean_raw_std_zero_slope_zero() {
        let frame = frame_one_sensor(vec![1, 1, 1], vec![1, 2, 3], vec![42.0, 43.0, 44.0]);
        let expanded = FeatureEngine::new().expand(&frame).unwrap();
        assert_eq!(expanded.column("s2_mean5").unwrap()[0], 42.0);
        assert_eq!(expanded.column("s2_std5").unwrap()[0], 0.0);
        assert_eq!(expanded.column("s2_slope").unwrap()[0], 0.0);
    }

    #[test]
    fn test_rolling_values_on_linear_ramp() {
        let frame = frame_one_sensor(
            vec![1; 6],
            (1..=6).collect(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        );
        let expanded = FeatureEngine::new().expand(&frame).unwrap();
        let mean = expanded.column("s2_mean5").unwrap();
        let std = expanded.column("s2_std5").unwrap();
        let slope = expanded.column("s2_slope").unwrap();

        // Growing window: mean over [1], [1,2], ...
        assert_relative_eq!(mean[1], 1.5);
        assert_relative_eq!(mean[4], 3.0);
        // Full window slides: records 2..=6.
        assert_relative_eq!(mean[5], 4.0);
        assert_relative_eq!(std[4], 2.5_f64.sqrt(), max_relative = 1e-12);
        assert_relative_eq!(std[5], 2.5_f64.sqrt(), max_relative = 1e-12);
        // Slope is 1 everywhere after the first record.
        assert_eq!(slope[0], 0.0);
        for &s in &slope[1..] {
            assert_relative_eq!(s, 1.0);
        }
    }

    #[test]
    fn test_no_leakage_across_adjacent_units() {
        // Unit 1 ends on large values; unit 2 starts right after in row order.
        let frame = frame_one_sensor(
            vec![1, 1, 1, 2, 2],
            vec![1, 2, 3, 1, 2],
            vec![100.0, 200.0, 300.0, 1.0, 2.0],
        );
        let expanded = FeatureEngine::new().expand(&frame).unwrap();
        let mean = expanded.column("s2_mean5").unwrap();
        let std = expanded.column("s2_std5").unwrap();
        let slope = expanded.column("s2_slope").unwrap();

        // Unit 2's first record sees only itself.
        assert_eq!(mean[3], 1.0);
        assert_eq!(std[3], 0.0);
        assert_eq!(slope[3], 0.0);
        // And its second record sees only unit 2 history.
        assert_relative_eq!(mean[4], 1.5);
        assert_relative_eq!(slope[4], 1.0);
    }

    #[test]
    fn test_no_leakage_with_interleaved_units() {
        let frame = frame_one_sensor(
            vec![1, 2, 1, 2],
            vec![1, 1, 2, 2],
            vec![10.0, 1000.0, 20.0, 2000.0],
        );
        let expanded = FeatureEngine::new().expand(&frame).unwrap();
        let mean = expanded.column("s2_mean5").unwrap();
        assert_relative_eq!(mean[2], 15.0); // unit 1: (10+20)/2
        assert_relative_eq!(mean[3], 1500.0); // unit 2: (1000+2000)/2
    }

    #[test]
    fn test_run_prunes_then_expands() {
        let frame = SensorFrame::new(
            vec![1, 1],
            vec![1, 2],
            vec!["s1".into(), "s2".into()],
            vec![vec![0.0, 0.0], vec![1.0, 2.0]],
        )
        .unwrap();
        let out = FeatureEngine::new().run(&frame).unwrap();
        // s1 is constant-listed: gone, and never expanded.
        assert!(!out.has_column("s1"));
        assert!(!out.has_column("s1_mean5"));
        assert!(out.has_column("s2_mean5"));
    }

    #[test]
    fn test_zero_window_rejected() {
        let frame = frame_one_sensor(vec![1], vec![1], vec![0.0]);
        let engine = FeatureEngine::with_config(FeatureConfig { rolling_window: 0 });
        assert!(matches!(
            engine.expand(&frame),
            Err(PipelineError::Config(_))
        ));
    }
}
