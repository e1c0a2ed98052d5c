//! Nanopore QC Report Tool
//!
//! Full length/time QC report: per-sample summaries, filter comparison and
//! pooled time correlation, plus TSV tables for plotting

use anyhow::{Context, Result};
use clap::{Arg, Command};
use log::warn;
use nanopore_qc_tools::{
    cli, collect_inputs, fit_time_on_length, Dataset, LengthTimeReporter, SummaryEngine,
};
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("nanopore-qc-report")
        .version("0.1.0")
        .about("Multi-sample read length and sequencing time QC report")
        .author("Megan Johnson")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("JSON")
                .help("Output JSON file for the full report")
                .default_value("qc_report.json"),
        )
        .arg(
            Arg::new("summary_tsv")
                .long("summary-tsv")
                .value_name("TSV")
                .help("Write the per-sample summary table as TSV"),
        )
        .arg(
            Arg::new("records_tsv")
                .long("records-tsv")
                .value_name("TSV")
                .help("Write pooled per-read rows (sample, time, length) as TSV"),
        )
        .arg(
            Arg::new("confidence")
                .short('c')
                .long("confidence")
                .value_name("LEVEL")
                .help("Confidence level for the interval on mean length")
                .default_value("0.95"),
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
                .help("Precision of reported values")
                .default_value("3"),
        )
        .args(cli::input_args())
        .get_matches();

    // Parse arguments
    let (filtered_dir, unfiltered_dir) = cli::input_dirs(&matches);
    let output_file = PathBuf::from(matches.get_one::<String>("output").unwrap());
    let summary_tsv = matches.get_one::<String>("summary_tsv").map(PathBuf::from);
    let records_tsv = matches.get_one::<String>("records_tsv").map(PathBuf::from);
    let confidence: f64 = matches
        .get_one::<String>("confidence")
        .unwrap()
        .parse()?;
    let alpha: f64 = matches.get_one::<String>("alpha").unwrap().parse()?;
    let digits: u32 = matches.get_one::<String>("digits").unwrap().parse()?;
    let naming = cli::naming_convention(&matches);

    println!("📊 Nanopore QC Report Tool");
    println!("Output: {}", output_file.display());

    let (filtered, unfiltered) =
        collect_inputs(filtered_dir.as_deref(), unfiltered_dir.as_deref(), &naming)?;
    if filtered.is_empty() && unfiltered.is_empty() {
        anyhow::bail!("No index files matching '{}' found", naming.discovery_pattern);
    }

    println!("📂 Loading {} index files...", filtered.len() + unfiltered.len());
    let dataset = Dataset::load(&filtered, &unfiltered, &naming)
        .context("Failed to load index files")?;

    println!("📏 Computing per-sample statistics...");
    let summaries = SummaryEngine::new(confidence)?.summarize_all(&dataset)?;

    println!("📈 Fitting time ~ length over {} reads...", dataset.len());
    let correlation = match fit_time_on_length(dataset.records()) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("Skipping correlation: {}", e);
            None
        }
    };

    let reporter = LengthTimeReporter::new(digits);
    let report = reporter.generate_report(summaries, correlation);
    reporter.export_json(&report, &output_file)?;

    if let Some(path) = &summary_tsv {
        reporter.write_summary_tsv_file(&report.summaries, path)?;
        println!("💾 Summary table saved to: {}", path.display());
    }
    if let Some(path) = &records_tsv {
        reporter.write_records_tsv_file(&dataset, path)?;
        println!("💾 Per-read table saved to: {}", path.display());
    }

    println!("✅ QC report complete!");
    println!("📊 Summary Statistics:");
    println!("  Sample groups: {}", report.summaries.len());
    println!("  Total reads: {}", dataset.len());
    for c in &report.comparisons {
        println!(
            "  {}: mean length {:.1} → {:.1} bp after filtering ({:.1}% of reads kept)",
            c.sample,
            c.mean_length_unfiltered,
            c.mean_length_filtered,
            c.reads_retained * 100.0
        );
    }
    if let Some(c) = &report.correlation {
        let verdict = if c.significant(alpha) { "significant" } else { "not significant" };
        println!(
            "  Time ~ length slope {:.4e} (p = {:.3e}, {})",
            c.slope, c.p_value, verdict
        );
    }
    println!("💾 Report saved to: {}", output_file.display());

    Ok(())
}
