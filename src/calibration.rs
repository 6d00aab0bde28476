use std::fmt;

use ndarray::Array1;
use serde::Serialize;

use crate::dataset::ValidatedDataset;
use crate::math::{centred_moments, linspace};
use crate::{Error, Result};

/// Slope magnitudes below this are rejected as too flat to invert
pub const DEFAULT_MIN_SLOPE: f64 = 1e-6;

/// An ordinary least squares line `absorbance = slope * concentration + intercept`
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CalibrationFit {
    slope: f64,
    intercept: f64,
    /// Pearson correlation coefficient between concentration and absorbance
    r: f64,
    r_squared: f64,
}

impl CalibrationFit {
    pub const fn slope(&self) -> f64 {
        self.slope
    }

    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    pub const fn r(&self) -> f64 {
        self.r
    }

    pub const fn r_squared(&self) -> f64 {
        self.r_squared
    }

    /// Absorbance predicted by the line at `concentration`
    pub fn evaluate(&self, concentration: f64) -> f64 {
        self.slope.mul_add(concentration, self.intercept)
    }

    /// Sample the line at `resolution` evenly spaced concentrations over `[0, max_concentration]`
    ///
    /// Returns `(concentration, absorbance)` pairs for plotting.
    pub fn sample(&self, max_concentration: f64, resolution: usize) -> Vec<(f64, f64)> {
        linspace(0., max_concentration, resolution)
            .iter()
            .map(|&x| (x, self.evaluate(x)))
            .collect()
    }

    /// Residual sum of squares of the line against the standards
    pub fn residual_sum_of_squares(&self, dataset: &ValidatedDataset) -> f64 {
        let predicted: Array1<f64> = dataset.concentrations().mapv(|x| self.evaluate(x));
        let residuals = dataset.absorbances() - predicted;
        residuals.dot(&residuals)
    }
}

/// Formats as the regression equation, eg. `y = 0.1000x + 0.0000`
impl fmt::Display for CalibrationFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(4);
        let intercept = format!("{:.*}", precision, self.intercept.abs());
        // An intercept which rounds to zero is shown as `+ 0.0000`, never `- 0.0000`
        let rounds_to_zero = intercept.chars().all(|c| c == '0' || c == '.');
        let sign = if self.intercept < 0. && !rounds_to_zero {
            '-'
        } else {
            '+'
        };
        write!(f, "y = {:.*}x {} {}", precision, self.slope, sign, intercept)
    }
}

/// Fit a straight line through the standards by ordinary least squares
///
/// The slope is `Sxy / Sxx`, the intercept places the line through the centroid and `r` is the
/// Pearson correlation coefficient `Sxy / sqrt(Sxx * Syy)`.
///
/// # Errors
/// Returns [`Error::DegenerateSlope`] if the magnitude of the fitted slope is below `min_slope`,
/// such a line cannot be inverted to recover concentrations reliably.
pub fn fit(dataset: &ValidatedDataset, min_slope: f64) -> Result<CalibrationFit> {
    let moments = centred_moments(&dataset.concentrations(), &dataset.absorbances())
        .ok_or(Error::InsufficientVariance)?;

    // Validation guarantees two distinct concentrations, so Sxx is positive
    if moments.sxx <= 0. {
        return Err(Error::InsufficientVariance);
    }

    let slope = moments.sxy / moments.sxx;
    if !(slope.abs() >= min_slope) {
        return Err(Error::DegenerateSlope { slope, min_slope });
    }
    let intercept = slope.mul_add(-moments.mean_x, moments.mean_y);

    let r = moments.sxy / (moments.sxx * moments.syy).sqrt();
    // Rounding can push a perfect correlation fractionally outside [-1, 1]
    let r = r.clamp(-1., 1.);

    Ok(CalibrationFit {
        slope,
        intercept,
        r,
        r_squared: r * r,
    })
}

/// The fitted line over `[0, max concentration * headroom]`, for plotting alongside the standards
pub fn fitted_line(
    fit: &CalibrationFit,
    dataset: &ValidatedDataset,
    headroom: f64,
    resolution: usize,
) -> Vec<(f64, f64)> {
    fit.sample(dataset.max_concentration() * headroom, resolution)
}
