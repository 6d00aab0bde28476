use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::dataset::StandardEntry;
use crate::predict::{positional_label, SampleMeasurement};
use crate::{Error, Result};

#[derive(Deserialize)]
struct StandardRow {
    concentration: Option<f64>,
    absorbance: Option<f64>,
}

#[derive(Deserialize)]
struct SampleRow {
    label: Option<String>,
    absorbance: Option<f64>,
}

fn reader(filepath: &Path) -> Result<csv::Reader<std::io::Cursor<Vec<u8>>>> {
    let file = fs::read(filepath)?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(std::io::Cursor::new(file)))
}

/// Read calibration standards from a CSV file with `concentration,absorbance` columns
///
/// Empty cells are read as values not yet provided, so that validation can report them.
///
/// # Errors
/// Returns an error if the file cannot be read or a row is malformed.
pub fn read_standards(filepath: &Path) -> Result<Vec<StandardEntry>> {
    let mut rdr = reader(filepath)?;

    let mut standards = vec![];
    for result in rdr.deserialize() {
        let row: StandardRow = result?;
        standards.push(StandardEntry {
            concentration: row.concentration,
            absorbance: row.absorbance,
        });
    }
    Ok(standards)
}

/// Read sample absorbances from a CSV file with `label,absorbance` columns
///
/// A sample without a label is named by its position, `S1`, `S2`, ...
///
/// # Errors
/// Returns an error if the file cannot be read, a row is malformed or a sample has no reading.
pub fn read_samples(filepath: &Path) -> Result<Vec<SampleMeasurement>> {
    let mut rdr = reader(filepath)?;

    let mut samples = vec![];
    for (ii, result) in rdr.deserialize().enumerate() {
        let row: SampleRow = result?;
        let label = row
            .label
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| positional_label(ii));
        let absorbance = row.absorbance.ok_or_else(|| Error::MissingReading {
            label: label.clone(),
        })?;
        samples.push(SampleMeasurement { label, absorbance });
    }
    Ok(samples)
}
