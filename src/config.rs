use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Policy for a single analysis run
///
/// Every section is optional when read from disk, missing fields take the values of
/// [`Config::default`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub standards: DatasetPolicy,
    pub calibration: CalibrationPolicy,
    pub samples: SamplePolicy,
    pub quality: QualityPolicy,
}

impl Config {
    /// Read a configuration from a TOML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid TOML for this structure.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetPolicy {
    /// Fewest standards accepted
    pub min_points: usize,
    /// Most standards accepted
    pub max_points: usize,
    /// Accept a blank standard at zero concentration
    pub allow_zero: bool,
}

impl Default for DatasetPolicy {
    fn default() -> Self {
        Self {
            min_points: 3,
            max_points: 20,
            allow_zero: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CalibrationPolicy {
    /// Slopes with a smaller magnitude are rejected as uninvertible
    pub min_slope: f64,
    /// Number of points in the sampled fitted line
    pub chart_resolution: usize,
    /// The fitted line is sampled over `[0, max concentration * chart_headroom]`
    pub chart_headroom: f64,
}

impl Default for CalibrationPolicy {
    fn default() -> Self {
        Self {
            min_slope: 1e-6,
            chart_resolution: 100,
            chart_headroom: 1.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplePolicy {
    pub min_count: usize,
    pub max_count: usize,
    /// Report negative predicted concentrations as zero
    pub clamp_negative: bool,
}

impl Default for SamplePolicy {
    fn default() -> Self {
        Self {
            min_count: 1,
            max_count: 10,
            clamp_negative: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QualityPolicy {
    /// Upper %RPD bound for a duplicate pair to count as accurate
    pub rpd_threshold: f64,
    /// Upper Horwitz CV (%) for a sample to count as precise
    pub horwitz_threshold: f64,
    /// Fail on a zero-mean duplicate pair rather than reporting an RPD of 0
    pub strict_rpd: bool,
    /// Run the duplicate (RPD) stage of the pipeline
    pub evaluate_duplicates: bool,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            rpd_threshold: 10.0,
            horwitz_threshold: 22.0,
            strict_rpd: false,
            evaluate_duplicates: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: Config = toml::from_str(
            r"
            [samples]
            clamp_negative = false

            [quality]
            rpd_threshold = 5.0
            ",
        )
        .unwrap();

        assert!(!config.samples.clamp_negative);
        assert_eq!(config.samples.max_count, 10);
        approx::assert_relative_eq!(config.quality.rpd_threshold, 5.0);
        approx::assert_relative_eq!(config.quality.horwitz_threshold, 22.0);
        assert_eq!(config.standards.min_points, 3);
    }

    #[test]
    fn serialized_config_reads_back_unchanged() {
        let mut config = Config::default();
        config.standards.min_points = 6;
        config.standards.allow_zero = true;
        config.quality.strict_rpd = true;

        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
