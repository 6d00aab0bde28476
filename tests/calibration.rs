use ndarray_rand::rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;
use serde::Serialize;
use tempdir::TempDir;

use beer_lambert::analysis::run;
use beer_lambert::config::Config;
use beer_lambert::quality::{Accuracy, Precision};
use beer_lambert::{Error, Result};

#[derive(Serialize)]
struct StandardRow {
    concentration: Option<f64>,
    absorbance: Option<f64>,
}

#[derive(Serialize)]
struct SampleRow {
    label: String,
    absorbance: f64,
}

fn create_working_dir(test_name: &str) -> TempDir {
    TempDir::new(test_name).unwrap()
}

fn write_standards(working_dir: &TempDir, rows: &[StandardRow]) {
    let mut wtr = csv::Writer::from_path(working_dir.path().join("standards.csv")).unwrap();
    for row in rows {
        wtr.serialize(row).unwrap();
    }
    wtr.flush().unwrap();
}

fn write_samples(working_dir: &TempDir, rows: &[SampleRow]) {
    let mut wtr = csv::Writer::from_path(working_dir.path().join("samples.csv")).unwrap();
    for row in rows {
        wtr.serialize(row).unwrap();
    }
    wtr.flush().unwrap();
}

fn write_config(working_dir: &TempDir, config: &Config) {
    std::fs::write(
        working_dir.path().join("config.toml"),
        toml::to_string(config).unwrap(),
    )
    .unwrap();
}

/// Standards lying exactly on `absorbance = slope * concentration + intercept`
fn standards_on_line(concentrations: &[f64], slope: f64, intercept: f64) -> Vec<StandardRow> {
    concentrations
        .iter()
        .map(|&c| StandardRow {
            concentration: Some(c),
            absorbance: Some(slope * c + intercept),
        })
        .collect()
}

#[test]
fn duplicate_samples_read_back_their_concentrations() -> Result<()> {
    let seed = 40;
    let mut rng = Isaac64Rng::seed_from_u64(seed);

    // Arrange
    let working_dir = create_working_dir("duplicate_samples_read_back_their_concentrations");
    let slope = rng.gen_range(0.01..0.5);
    let intercept = rng.gen_range(0.0..0.05);
    write_standards(
        &working_dir,
        &standards_on_line(&[1., 2., 4., 8., 16.], slope, intercept),
    );

    let num_pairs = rng.gen_range(1..=5);
    let mut expected = vec![];
    let mut samples = vec![];
    for ii in 0..num_pairs {
        let concentration: f64 = rng.gen_range(1.0..15.0);
        let duplicate = concentration * rng.gen_range(0.97..1.03);
        for (jj, c) in [concentration, duplicate].into_iter().enumerate() {
            expected.push(c);
            samples.push(SampleRow {
                label: format!("P{}{}", ii + 1, ['a', 'b'][jj]),
                absorbance: slope * c + intercept,
            });
        }
    }
    write_samples(&working_dir, &samples);

    // Act
    let report = run(working_dir.path())?;

    // Assert
    approx::assert_relative_eq!(report.fit.slope(), slope, max_relative = 1e-9);
    approx::assert_relative_eq!(report.fit.r_squared(), 1., max_relative = 1e-9);
    for (result, expected) in report.samples.iter().zip(expected) {
        approx::assert_relative_eq!(result.concentration, expected, max_relative = 1e-8);
    }

    let pairs = report.rpd.expect("duplicates are evaluated by default");
    assert_eq!(pairs.len(), num_pairs);
    assert_eq!(pairs[0].pair_label, "P1a & P1b");
    for pair in &pairs {
        // Duplicates differ by at most 3 %
        assert!(pair.rpd_percent < 3.1);
        assert_eq!(pair.verdict, Accuracy::Good);
    }

    // Every sample sits far below a unit mass fraction, so Horwitz precision is poor
    assert!(report
        .horwitz
        .iter()
        .all(|result| result.verdict == Some(Precision::Poor)));
    assert!(report.mean_horwitz.is_some());
    Ok(())
}

#[test]
fn config_file_controls_clamping_and_duplicates() -> Result<()> {
    let working_dir = create_working_dir("config_file_controls_clamping_and_duplicates");
    write_standards(
        &working_dir,
        &standards_on_line(&[1., 2., 3.], 0.1, 0.05),
    );
    write_samples(
        &working_dir,
        &[SampleRow {
            label: "below blank".to_owned(),
            absorbance: 0.01,
        }],
    );

    let mut config = Config::default();
    config.samples.clamp_negative = false;
    config.quality.evaluate_duplicates = false;
    write_config(&working_dir, &config);

    let report = run(working_dir.path())?;

    approx::assert_relative_eq!(report.samples[0].concentration, -0.4, max_relative = 1e-9);
    assert!(report.rpd.is_none());
    assert!(report.horwitz[0].cv_horwitz_percent.is_none());
    assert!(report.mean_horwitz.is_none());
    Ok(())
}

#[test]
fn missing_standard_halts_before_prediction() {
    let working_dir = create_working_dir("missing_standard_halts_before_prediction");
    let mut standards = standards_on_line(&[1., 2., 3.], 0.1, 0.);
    standards[1].absorbance = None;
    write_standards(&working_dir, &standards);
    write_samples(
        &working_dir,
        &[SampleRow {
            label: "S1".to_owned(),
            absorbance: 0.2,
        }],
    );

    let err = run(working_dir.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::IncompleteData {
            index: 1,
            field: "absorbance"
        }
    ));
}

#[test]
fn single_concentration_has_insufficient_variance() {
    let working_dir = create_working_dir("single_concentration_has_insufficient_variance");
    write_standards(&working_dir, &standards_on_line(&[2., 2., 2.], 0.1, 0.));
    write_samples(
        &working_dir,
        &[SampleRow {
            label: "S1".to_owned(),
            absorbance: 0.2,
        }],
    );

    assert!(matches!(
        run(working_dir.path()),
        Err(Error::InsufficientVariance)
    ));
}

#[test]
fn missing_samples_file_is_reported() {
    let working_dir = create_working_dir("missing_samples_file_is_reported");
    write_standards(&working_dir, &standards_on_line(&[1., 2., 3.], 0.1, 0.));

    assert!(matches!(run(working_dir.path()), Err(Error::Io(_))));
}

#[test]
fn odd_sample_count_still_reports_concentrations() -> Result<()> {
    let working_dir = create_working_dir("odd_sample_count_still_reports_concentrations");
    write_standards(&working_dir, &standards_on_line(&[1., 2., 3.], 0.1, 0.));
    write_samples(
        &working_dir,
        &[SampleRow {
            label: "S1".to_owned(),
            absorbance: 0.2,
        }],
    );

    let report = run(working_dir.path())?;

    approx::assert_relative_eq!(report.samples[0].concentration, 2., max_relative = 1e-9);
    assert!(report.rpd.is_none());
    assert!(report.rpd_error.is_some());
    assert_eq!(report.horwitz[0].verdict, Some(Precision::Poor));
    Ok(())
}

#[test]
fn non_finite_sample_cell_is_rejected() {
    let working_dir = create_working_dir("non_finite_sample_cell_is_rejected");
    write_standards(&working_dir, &standards_on_line(&[1., 2., 3.], 0.1, 0.));
    std::fs::write(
        working_dir.path().join("samples.csv"),
        "label,absorbance\nA,NaN\nB,0.2\n",
    )
    .unwrap();

    assert!(matches!(
        run(working_dir.path()),
        Err(Error::InvalidReading { label, .. }) if label == "A"
    ));
}
