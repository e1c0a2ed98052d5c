//! Nanopore Time Correlation Tool
//!
//! Tests whether read length changes with time of sequencing across pooled samples

use anyhow::{Context, Result};
use clap::{Arg, Command};
use nanopore_qc_tools::{cli, collect_inputs, fit_time_on_length, Dataset, LengthTimeReporter};
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("nanopore-time-correlation")
        .version("0.1.0")
        .about("Linear fit of sequencing time on read length over pooled index files")
        .author("Megan Johnson")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("JSON")
                .help("Output JSON file for the correlation report")
                .default_value("time_correlation.json"),
        )
        .arg(
            Arg::new("alpha")
                .short('a')
                .long("alpha")
                .value_name("ALPHA")
                .help("Significance level for the slope test")
                .default_value("0.05"),
        )
        .arg(
            Arg::new("digits")
                .long("digits")
                .value_name("N")
                .help("Significant digits in reported values")
                .default_value("3"),
        )
        .args(cli::input_args())
        .get_matches();

    // Parse arguments
    let (filtered_dir, unfiltered_dir) = cli::input_dirs(&matches);
    let output_file = PathBuf::from(matches.get_one::<String>("output").unwrap());
    let alpha: f64 = matches.get_one::<String>("alpha").unwrap().parse()?;
    let digits: u32 = matches.get_one::<String>("digits").unwrap().parse()?;
    let naming = cli::naming_convention(&matches);

    println!("⏱️ Nanopore Time Correlation Tool");
    println!("Output: {}", output_file.display());

    let (filtered, unfiltered) =
        collect_inputs(filtered_dir.as_deref(), unfiltered_dir.as_deref(), &naming)?;

    println!("📂 Loading {} index files...", filtered.len() + unfiltered.len());
    let dataset = Dataset::load(&filtered, &unfiltered, &naming)
        .context("Failed to load index files")?;

    println!("📈 Fitting time ~ length over {} reads...", dataset.len());
    let report = fit_time_on_length(dataset.records())?;

    let reporter = LengthTimeReporter::new(digits);
    reporter.export_json(&report, &output_file)?;

    println!("✅ Correlation analysis complete!");
    println!("  Slope: {:.4e} s/bp (SE {:.4e})", report.slope, report.std_error);
    match report.t_statistic {
        Some(t) => println!("  t = {:.3}, p = {:.3e}", t, report.p_value),
        None => println!("  t = ±inf (exact fit), p = {:.3e}", report.p_value),
    }
    if report.significant(alpha) {
        println!("  Read length changes significantly with sequencing time (alpha = {})", alpha);
    } else {
        println!("  No significant time/length relationship (alpha = {})", alpha);
    }
    println!(
        "  Illustrative loss: {:.3} per read ({})",
        report.illustrative_loss.per_read, report.illustrative_loss.label
    );
    println!("💾 Results saved to: {}", output_file.display());

    Ok(())
}
