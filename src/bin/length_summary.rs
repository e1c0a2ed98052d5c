//! Nanopore Length Summary Tool
//!
//! Per-sample read length statistics for filtered and unfiltered index files

use anyhow::{Context, Result};
use clap::{Arg, Command};
use nanopore_qc_tools::{cli, collect_inputs, Dataset, LengthTimeReporter, SummaryEngine};
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("nanopore-length-summary")
        .version("0.1.0")
        .about("Per-sample read length statistics from .sample.datetime.fai files")
        .author("Megan Johnson")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("JSON")
                .help("Output JSON file for per-sample summaries")
                .default_value("length_summary.json"),
        )
        .arg(
            Arg::new("tsv")
                .long("tsv")
                .value_name("TSV")
                .help("Also write the summary table as TSV"),
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
            Arg::new("digits")
                .long("digits")
                .value_name("N")
                .help("Decimal places in reported values")
                .default_value("3"),
        )
        .args(cli::input_args())
        .get_matches();

    // Parse arguments
    let (filtered_dir, unfiltered_dir) = cli::input_dirs(&matches);
    let output_file = PathBuf::from(matches.get_one::<String>("output").unwrap());
    let tsv_file = matches.get_one::<String>("tsv").map(PathBuf::from);
    let confidence: f64 = matches
        .get_one::<String>("confidence")
        .unwrap()
        .parse()?;
    let digits: u32 = matches.get_one::<String>("digits").unwrap().parse()?;
    let naming = cli::naming_convention(&matches);

    println!("🧬 Nanopore Length Summary Tool");
    if let Some(dir) = &filtered_dir {
        println!("Filtered: {}", dir.display());
    }
    if let Some(dir) = &unfiltered_dir {
        println!("Unfiltered: {}", dir.display());
    }
    println!("Output: {}", output_file.display());

    let (filtered, unfiltered) =
        collect_inputs(filtered_dir.as_deref(), unfiltered_dir.as_deref(), &naming)?;
    if filtered.is_empty() && unfiltered.is_empty() {
        anyhow::bail!("No index files matching '{}' found", naming.discovery_pattern);
    }

    println!("📂 Loading {} index files...", filtered.len() + unfiltered.len());
    let dataset = Dataset::load(&filtered, &unfiltered, &naming)
        .context("Failed to load index files")?;

    println!("📊 Computing per-sample statistics...");
    let engine = SummaryEngine::new(confidence)?;
    let summaries = engine.summarize_all(&dataset)?;

    let reporter = LengthTimeReporter::new(digits);
    let report = reporter.generate_report(summaries, None);
    reporter.export_json(&report, &output_file)?;
    if let Some(tsv) = &tsv_file {
        reporter.write_summary_tsv_file(&report.summaries, tsv)?;
        println!("💾 Table saved to: {}", tsv.display());
    }

    println!("✅ Length summary complete!");
    for s in &report.summaries {
        let state = if s.filtered { "filtered" } else { "unfiltered" };
        println!(
            "  {} ({}): {} reads, mean {:.1} bp, median {:.1} bp, N50 {} bp",
            s.sample, state, s.n_reads, s.mean_length, s.median_length, s.n50
        );
    }
    for c in &report.comparisons {
        println!(
            "  {}: {:.1}% of reads and {:.1}% of bases retained by filtering",
            c.sample,
            c.reads_retained * 100.0,
            c.bases_retained * 100.0
        );
    }
    println!("💾 Results saved to: {}", output_file.display());

    Ok(())
}
