use std::path::Path;

use serde::Serialize;

use crate::calibration::{fit, fitted_line, CalibrationFit};
use crate::config::Config;
use crate::dataset::{validate, StandardEntry, StandardPoint};
use crate::loader::{read_samples, read_standards};
use crate::predict::{predict_all, SampleMeasurement, SampleResult};
use crate::quality::{
    compute_horwitz, compute_rpd, mean_horwitz, mean_rpd, HorwitzResult, RpdResult,
};
use crate::Result;

/// Everything produced by one pass of the pipeline, ready for display
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub fit: CalibrationFit,
    /// The validated standards, for plotting against the fitted line
    pub standards: Vec<StandardPoint>,
    pub samples: Vec<SampleResult>,
    /// `None` when duplicate evaluation is switched off or could not be carried out
    pub rpd: Option<Vec<RpdResult>>,
    /// Why duplicate evaluation could not be carried out, eg. an odd number of samples
    pub rpd_error: Option<String>,
    pub horwitz: Vec<HorwitzResult>,
    pub mean_rpd: Option<f64>,
    pub mean_horwitz: Option<f64>,
    /// `(concentration, absorbance)` samples of the fitted line
    pub fitted_line: Vec<(f64, f64)>,
}

/// Run the full pipeline over in-memory inputs
///
/// Standards are validated and fitted before any sample is touched, so an unusable calibration
/// stops the run without partial results. Duplicate (RPD) and Horwitz evaluation are
/// independent: a failed duplicate evaluation is recorded in [`Report::rpd_error`] and the
/// concentrations and Horwitz results are still reported.
///
/// # Errors
/// Returns the first validation, regression or prediction error.
pub fn analyse(
    standards: &[StandardEntry],
    samples: &[SampleMeasurement],
    config: &Config,
) -> Result<Report> {
    let dataset = validate(standards, &config.standards)?;
    let fit = fit(&dataset, config.calibration.min_slope)?;
    log::info!(
        "calibrated on {} standards: {fit}, R² = {:.4}",
        dataset.points().len(),
        fit.r_squared()
    );
    log::debug!(
        "residual sum of squares {:e}",
        fit.residual_sum_of_squares(&dataset)
    );

    let results = predict_all(&fit, samples, &config.samples)?;
    log::info!("predicted {} sample concentrations", results.len());

    let (rpd, rpd_error) = if config.quality.evaluate_duplicates {
        match compute_rpd(&results, &config.quality) {
            Ok(pairs) => (Some(pairs), None),
            Err(e) => {
                log::warn!("duplicate evaluation skipped: {e}");
                (None, Some(e.to_string()))
            }
        }
    } else {
        (None, None)
    };
    let horwitz = compute_horwitz(&results, &config.quality);

    let mean_rpd = rpd.as_deref().and_then(mean_rpd);
    let mean_horwitz = mean_horwitz(&horwitz);

    let fitted_line = fitted_line(
        &fit,
        &dataset,
        config.calibration.chart_headroom,
        config.calibration.chart_resolution,
    );

    Ok(Report {
        fit,
        standards: dataset.points().to_vec(),
        samples: results,
        rpd,
        rpd_error,
        horwitz,
        mean_rpd,
        mean_horwitz,
        fitted_line,
    })
}

/// Run the pipeline over the inputs in `working_directory`
///
/// The directory holds `standards.csv`, `samples.csv` and, optionally, `config.toml`. Without a
/// config file the defaults apply.
///
/// # Errors
/// Returns an error if an input file is missing or malformed, or any error from [`analyse`].
pub fn run(working_directory: &Path) -> Result<Report> {
    let config_path = working_directory.join("config.toml");
    let config = if config_path.exists() {
        log::info!("reading {config_path:?}");
        Config::from_file(&config_path)?
    } else {
        log::info!("no config.toml in {working_directory:?}, using defaults");
        Config::default()
    };

    let standards = read_standards(&working_directory.join("standards.csv"))?;
    let samples = read_samples(&working_directory.join("samples.csv"))?;

    analyse(&standards, &samples, &config)
}
