use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::config::QualityPolicy;
use crate::predict::SampleResult;
use crate::{Error, Result};

/// Parts per million in one unit mass fraction
const PPM: f64 = 1_000_000.;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Accuracy {
    Good,
    Poor,
}

impl Accuracy {
    fn judge(rpd_percent: f64, threshold: f64) -> Self {
        if rpd_percent <= threshold {
            Self::Good
        } else {
            Self::Poor
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => f.write_str("good accuracy"),
            Self::Poor => f.write_str("poor accuracy"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Precision {
    Good,
    Poor,
}

impl Precision {
    fn judge(cv_percent: f64, threshold: f64) -> Self {
        if cv_percent <= threshold {
            Self::Good
        } else {
            Self::Poor
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => f.write_str("good precision"),
            Self::Poor => f.write_str("poor precision"),
        }
    }
}

/// Relative percent difference of one duplicate pair
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RpdResult {
    /// Labels of both members, eg. `S1 & S2`
    pub pair_label: String,
    pub rpd_percent: f64,
    pub verdict: Accuracy,
}

/// Horwitz predicted CV for one sample
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HorwitzResult {
    pub label: String,
    pub concentration: f64,
    /// `None` when the concentration is not positive and the CV cannot be computed
    pub cv_horwitz_percent: Option<f64>,
    pub verdict: Option<Precision>,
}

impl HorwitzResult {
    pub const fn is_computable(&self) -> bool {
        self.cv_horwitz_percent.is_some()
    }
}

/// Relative percent difference `|c1 - c2| / mean(c1, c2) * 100`
///
/// A pair averaging zero has no defined RPD. Unless `strict` is set it is reported as 0, which
/// hides a pair of true zero readings.
///
/// # Errors
/// Returns [`Error::ZeroAverage`] for a zero-mean pair in strict mode.
pub fn rpd(c1: f64, c2: f64, strict: bool) -> Result<f64> {
    let average = (c1 + c2) / 2.;
    if average == 0. {
        if strict {
            return Err(Error::ZeroAverage {
                pair: format!("({c1}, {c2})"),
            });
        }
        return Ok(0.);
    }
    // Unclamped readings can average below zero, the RPD is still a magnitude
    Ok((c1 - c2).abs() / average.abs() * 100.)
}

/// Evaluate adjacent duplicate pairs `(0, 1), (2, 3), ...` by position
///
/// Duplicates must be submitted next to each other, labels are not matched. An empty input has
/// no pairs.
///
/// # Errors
/// Returns [`Error::OddSampleCount`] if `results` cannot be split into pairs, or
/// [`Error::ZeroAverage`] for a zero-mean pair when `policy.strict_rpd` is set.
pub fn compute_rpd(results: &[SampleResult], policy: &QualityPolicy) -> Result<Vec<RpdResult>> {
    if results.len() % 2 != 0 {
        return Err(Error::OddSampleCount {
            count: results.len(),
        });
    }

    results
        .iter()
        .tuples::<(_, _)>()
        .map(|(first, second)| {
            let pair_label = format!("{} & {}", first.label, second.label);
            let rpd_percent = rpd(first.concentration, second.concentration, policy.strict_rpd)
                .map_err(|_| Error::ZeroAverage {
                    pair: pair_label.clone(),
                })?;
            Ok(RpdResult {
                verdict: Accuracy::judge(rpd_percent, policy.rpd_threshold),
                pair_label,
                rpd_percent,
            })
        })
        .collect()
}

/// Horwitz predicted relative standard deviation, in percent, at `ppm`
///
/// With `C` the concentration as a mass fraction, `CV = 2^(1 - 0.5 log10 C) * 100`.
///
/// # Errors
/// Returns [`Error::NotComputable`] when `ppm` is not positive, the logarithm is undefined there.
pub fn horwitz_cv(ppm: f64) -> Result<f64> {
    if !(ppm > 0.) || !ppm.is_finite() {
        return Err(Error::NotComputable { concentration: ppm });
    }
    let mass_fraction = ppm / PPM;
    Ok(2f64.powf(0.5f64.mul_add(-mass_fraction.log10(), 1.)) * 100.)
}

/// Horwitz CV and precision verdict for every sample
///
/// A sample whose CV cannot be computed gets `None` in its own result and does not affect the
/// others.
pub fn compute_horwitz(results: &[SampleResult], policy: &QualityPolicy) -> Vec<HorwitzResult> {
    results
        .iter()
        .map(|result| {
            let cv_horwitz_percent = match horwitz_cv(result.concentration) {
                Ok(cv) => Some(cv),
                Err(e) => {
                    log::warn!("{}: {e}", result.label);
                    None
                }
            };
            HorwitzResult {
                label: result.label.clone(),
                concentration: result.concentration,
                cv_horwitz_percent,
                verdict: cv_horwitz_percent
                    .map(|cv| Precision::judge(cv, policy.horwitz_threshold)),
            }
        })
        .collect()
}

/// Mean %RPD over all pairs, `None` if there are none
pub fn mean_rpd(results: &[RpdResult]) -> Option<f64> {
    mean(results.iter().map(|result| result.rpd_percent))
}

/// Mean Horwitz CV over the samples where it is computable, `None` if there are none
pub fn mean_horwitz(results: &[HorwitzResult]) -> Option<f64> {
    mean(results.iter().filter_map(|result| result.cv_horwitz_percent))
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0., 0usize), |(sum, count), value| {
        (sum + value, count + 1)
    });
    (count > 0).then(|| sum / count as f64)
}
