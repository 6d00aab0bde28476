use std::path::PathBuf;
use std::process::ExitCode;

use beer_lambert::analysis::{run, Report};

fn print_report(report: &Report) {
    println!("Regression equation: {}", report.fit);
    println!("R² (coefficient of determination): {:.4}", report.fit.r_squared());

    println!();
    println!("{:<10} {:>12} {:>18}", "Sample", "Absorbance", "Concentration (ppm)");
    for sample in &report.samples {
        println!(
            "{:<10} {:>12.4} {:>18.3}",
            sample.label, sample.absorbance, sample.concentration
        );
    }

    if let Some(pairs) = &report.rpd {
        println!();
        println!("Accuracy (%RPD)");
        for pair in pairs {
            println!("  {}: %RPD = {:.2}% ({})", pair.pair_label, pair.rpd_percent, pair.verdict);
        }
        if let Some(mean) = report.mean_rpd {
            println!("  mean %RPD = {mean:.2}%");
        }
    } else if let Some(reason) = &report.rpd_error {
        println!();
        println!("Accuracy (%RPD) not evaluated: {reason}");
    }

    println!();
    println!("Precision (Horwitz CV)");
    for result in &report.horwitz {
        if !result.is_computable() {
            println!(
                "  {}: CV Horwitz not computable (concentration = {})",
                result.label, result.concentration
            );
            continue;
        }
        if let (Some(cv), Some(verdict)) = (result.cv_horwitz_percent, result.verdict) {
            println!("  {}: CV Horwitz = {cv:.2}% ({verdict})", result.label);
        }
    }
    if let Some(mean) = report.mean_horwitz {
        println!("  mean CV Horwitz = {mean:.2}%");
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let working_directory = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("."), PathBuf::from);

    match run(&working_directory) {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("analysis of {working_directory:?} failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
