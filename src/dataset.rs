use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::config::DatasetPolicy;
use crate::{Error, Result};

/// A calibration standard as entered, either value may not have been provided yet
///
/// `None` is the "not yet provided" sentinel and is distinct from a value of `0.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct StandardEntry {
    pub concentration: Option<f64>,
    pub absorbance: Option<f64>,
}

impl StandardEntry {
    pub const fn new(concentration: f64, absorbance: f64) -> Self {
        Self {
            concentration: Some(concentration),
            absorbance: Some(absorbance),
        }
    }
}

impl From<(f64, f64)> for StandardEntry {
    fn from((concentration, absorbance): (f64, f64)) -> Self {
        Self::new(concentration, absorbance)
    }
}

/// A complete calibration standard: concentration in ppm and its measured absorbance
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StandardPoint {
    pub concentration: f64,
    pub absorbance: f64,
}

/// An ordered set of standards which passed [`validate`]
///
/// The only way to obtain one is through validation, so a `ValidatedDataset` always holds
/// complete, finite points spanning at least two distinct concentrations.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidatedDataset {
    points: Vec<StandardPoint>,
}

impl ValidatedDataset {
    pub fn points(&self) -> &[StandardPoint] {
        &self.points
    }

    pub fn concentrations(&self) -> Array1<f64> {
        self.points.iter().map(|point| point.concentration).collect()
    }

    pub fn absorbances(&self) -> Array1<f64> {
        self.points.iter().map(|point| point.absorbance).collect()
    }

    /// Highest standard concentration
    pub fn max_concentration(&self) -> f64 {
        self.points
            .iter()
            .map(|point| point.concentration)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Check a sequence of standards is complete and usable for a linear fit
///
/// Checks run in order and the first failure is returned: every value must be present, the
/// number of standards must lie within the policy bounds, every value must be finite with a
/// non-negative absorbance and a positive (or, when the policy allows it, zero) concentration,
/// and the concentrations must not all be equal.
///
/// # Errors
/// Returns [`Error::IncompleteData`], [`Error::PointCount`], [`Error::InvalidValue`] or
/// [`Error::InsufficientVariance`].
pub fn validate(entries: &[StandardEntry], policy: &DatasetPolicy) -> Result<ValidatedDataset> {
    let points = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| complete(index, entry))
        .collect::<Result<Vec<_>>>()?;

    if points.len() < policy.min_points || points.len() > policy.max_points {
        return Err(Error::PointCount {
            count: points.len(),
            min: policy.min_points,
            max: policy.max_points,
        });
    }

    for (index, point) in points.iter().enumerate() {
        check_point(index, point, policy)?;
    }

    let distinct = points.first().map_or(false, |first| {
        points
            .iter()
            .any(|point| point.concentration != first.concentration)
    });
    if !distinct {
        return Err(Error::InsufficientVariance);
    }

    Ok(ValidatedDataset { points })
}

fn complete(index: usize, entry: &StandardEntry) -> Result<StandardPoint> {
    let concentration = entry.concentration.ok_or(Error::IncompleteData {
        index,
        field: "concentration",
    })?;
    let absorbance = entry.absorbance.ok_or(Error::IncompleteData {
        index,
        field: "absorbance",
    })?;
    Ok(StandardPoint {
        concentration,
        absorbance,
    })
}

fn check_point(index: usize, point: &StandardPoint, policy: &DatasetPolicy) -> Result<()> {
    let concentration_ok = point.concentration.is_finite()
        && if policy.allow_zero {
            point.concentration >= 0.
        } else {
            point.concentration > 0.
        };
    if !concentration_ok {
        return Err(Error::InvalidValue {
            index,
            field: "concentration",
            value: point.concentration,
        });
    }

    if !(point.absorbance.is_finite() && point.absorbance >= 0.) {
        return Err(Error::InvalidValue {
            index,
            field: "absorbance",
            value: point.absorbance,
        });
    }
    Ok(())
}
