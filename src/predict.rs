use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationFit;
use crate::config::SamplePolicy;
use crate::{Error, Result};

/// A sample absorbance reading awaiting conversion to a concentration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SampleMeasurement {
    pub label: String,
    pub absorbance: f64,
}

impl SampleMeasurement {
    pub fn new(label: impl Into<String>, absorbance: f64) -> Self {
        Self {
            label: label.into(),
            absorbance,
        }
    }

    /// Label readings by position as `S1`, `S2`, ...
    #[cfg(test)]
    pub(crate) fn numbered(absorbances: &[f64]) -> Vec<Self> {
        absorbances
            .iter()
            .enumerate()
            .map(|(ii, &absorbance)| Self::new(positional_label(ii), absorbance))
            .collect()
    }
}

pub(crate) fn positional_label(index: usize) -> String {
    format!("S{}", index + 1)
}

/// A sample reading together with the concentration read off the calibration line
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleResult {
    pub label: String,
    pub absorbance: f64,
    /// Concentration in ppm
    pub concentration: f64,
}

/// Invert the calibration line: `(absorbance - intercept) / slope`
///
/// When `clamp_negative` is set a negative concentration, which is not physical, is reported
/// as zero. Otherwise the signed value is returned so that a reading below the blank remains
/// visible.
///
/// # Errors
/// Returns [`Error::DivisionByZeroSlope`] if the slope of `fit` is zero.
pub fn predict(fit: &CalibrationFit, absorbance: f64, clamp_negative: bool) -> Result<f64> {
    if fit.slope() == 0. {
        return Err(Error::DivisionByZeroSlope);
    }
    let concentration = (absorbance - fit.intercept()) / fit.slope();
    if clamp_negative && concentration < 0. {
        log::warn!("clamping negative concentration {concentration} (absorbance {absorbance}) to 0");
        return Ok(0.);
    }
    // Adding zero turns a `-0.0` from a negative slope into `0.0`
    Ok(concentration + 0.)
}

/// Convert every reading in `samples` to a concentration, preserving their order
///
/// # Errors
/// Returns [`Error::SampleCount`] if the number of samples is outside the policy bounds,
/// [`Error::InvalidReading`] for a NaN or infinite absorbance, or any error from [`predict`].
pub fn predict_all(
    fit: &CalibrationFit,
    samples: &[SampleMeasurement],
    policy: &SamplePolicy,
) -> Result<Vec<SampleResult>> {
    if samples.len() < policy.min_count || samples.len() > policy.max_count {
        return Err(Error::SampleCount {
            count: samples.len(),
            min: policy.min_count,
            max: policy.max_count,
        });
    }

    samples
        .iter()
        .map(|sample| {
            if !sample.absorbance.is_finite() {
                return Err(Error::InvalidReading {
                    label: sample.label.clone(),
                    absorbance: sample.absorbance,
                });
            }
            let concentration = predict(fit, sample.absorbance, policy.clamp_negative)?;
            log::debug!(
                "{}: absorbance {} -> {concentration} ppm",
                sample.label,
                sample.absorbance
            );
            Ok(SampleResult {
                label: sample.label.clone(),
                absorbance: sample.absorbance,
                concentration,
            })
        })
        .collect()
}
