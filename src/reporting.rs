//! Multi-sample length/time reporting
//!
//! Combines per-sample summaries and the pooled correlation into one report
//! and writes it out as JSON or TSV. Values are rounded only here, on copies,
//! so the computed structures keep full precision.

use crate::aggregate::Dataset;
use crate::correlation::CorrelationReport;
use crate::error::Result;
use crate::summary::SampleSummary;
use crate::ReportRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Filtered vs unfiltered comparison for a sample seen in both states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterComparison {
    pub sample: String,
    pub reads_retained: f64,
    pub bases_retained: f64,
    pub mean_length_filtered: f64,
    pub mean_length_unfiltered: f64,
    pub median_length_filtered: f64,
    pub median_length_unfiltered: f64,
    pub n50_filtered: u64,
    pub n50_unfiltered: u64,
}

impl FilterComparison {
    pub fn from_pair(filtered: &SampleSummary, unfiltered: &SampleSummary) -> Self {
        Self {
            sample: filtered.sample.clone(),
            reads_retained: filtered.n_reads as f64 / unfiltered.n_reads as f64,
            bases_retained: filtered.total_bases as f64 / unfiltered.total_bases as f64,
            mean_length_filtered: filtered.mean_length,
            mean_length_unfiltered: unfiltered.mean_length,
            median_length_filtered: filtered.median_length,
            median_length_unfiltered: unfiltered.median_length,
            n50_filtered: filtered.n50,
            n50_unfiltered: unfiltered.n50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthTimeReport {
    pub summaries: Vec<SampleSummary>,
    pub comparisons: Vec<FilterComparison>,
    pub correlation: Option<CorrelationReport>,
}

impl ReportRecord for SampleSummary {}
impl ReportRecord for CorrelationReport {}
impl ReportRecord for FilterComparison {}
impl ReportRecord for LengthTimeReport {}

/// Display-precision copies of report structures
pub trait Rounded {
    fn rounded(&self, digits: u32) -> Self;
}

impl Rounded for SampleSummary {
    fn rounded(&self, digits: u32) -> Self {
        let r = |x: f64| round_decimals(x, digits);
        Self {
            mean_length: r(self.mean_length),
            sd_length: self.sd_length.map(r),
            median_length: r(self.median_length),
            q1: r(self.q1),
            q3: r(self.q3),
            se_length: self.se_length.map(r),
            lower_ci: self.lower_ci.map(r),
            upper_ci: self.upper_ci.map(r),
            ..self.clone()
        }
    }
}

impl Rounded for FilterComparison {
    fn rounded(&self, digits: u32) -> Self {
        let r = |x: f64| round_decimals(x, digits);
        Self {
            reads_retained: r(self.reads_retained),
            bases_retained: r(self.bases_retained),
            mean_length_filtered: r(self.mean_length_filtered),
            mean_length_unfiltered: r(self.mean_length_unfiltered),
            median_length_filtered: r(self.median_length_filtered),
            median_length_unfiltered: r(self.median_length_unfiltered),
            ..self.clone()
        }
    }
}

// Slopes and p-values are routinely far below 10^-digits, so the fit keeps
// significant digits instead of decimal places.
impl Rounded for CorrelationReport {
    fn rounded(&self, digits: u32) -> Self {
        let r = |x: f64| round_significant(x, digits);
        let mut out = self.clone();
        out.slope = r(self.slope);
        out.intercept = r(self.intercept);
        out.std_error = r(self.std_error);
        out.t_statistic = self.t_statistic.map(r);
        out.p_value = r(self.p_value);
        out.r_squared = r(self.r_squared);
        out.illustrative_loss.per_read = r(self.illustrative_loss.per_read);
        out
    }
}

impl Rounded for LengthTimeReport {
    fn rounded(&self, digits: u32) -> Self {
        Self {
            summaries: self.summaries.iter().map(|s| s.rounded(digits)).collect(),
            comparisons: self.comparisons.iter().map(|c| c.rounded(digits)).collect(),
            correlation: self.correlation.as_ref().map(|c| c.rounded(digits)),
        }
    }
}

/// Round to a fixed number of decimal places
pub fn round_decimals(x: f64, digits: u32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let factor = 10f64.powi(digits as i32);
    (x * factor).round() / factor
}

/// Round to a number of significant digits
pub fn round_significant(x: f64, digits: u32) -> f64 {
    if x == 0.0 || !x.is_finite() || digits == 0 {
        return x;
    }
    let magnitude = x.abs().log10().floor() as i32;
    let shift = digits as i32 - 1 - magnitude;
    if shift >= 0 {
        let factor = 10f64.powi(shift);
        (x * factor).round() / factor
    } else {
        let factor = 10f64.powi(-shift);
        (x / factor).round() * factor
    }
}

/// Reporter for multi-sample length and time analysis
pub struct LengthTimeReporter {
    pub display_digits: u32,
}

impl Default for LengthTimeReporter {
    fn default() -> Self {
        Self { display_digits: 3 }
    }
}

impl LengthTimeReporter {
    pub fn new(display_digits: u32) -> Self {
        Self { display_digits }
    }

    /// Assemble the report, pairing filtered and unfiltered summaries by sample
    pub fn generate_report(
        &self,
        summaries: Vec<SampleSummary>,
        correlation: Option<CorrelationReport>,
    ) -> LengthTimeReport {
        let unfiltered: HashMap<&str, &SampleSummary> = summaries
            .iter()
            .filter(|s| !s.filtered)
            .map(|s| (s.sample.as_str(), s))
            .collect();

        let comparisons = summaries
            .iter()
            .filter(|s| s.filtered)
            .filter_map(|f| {
                unfiltered
                    .get(f.sample.as_str())
                    .map(|u| FilterComparison::from_pair(f, u))
            })
            .collect();

        LengthTimeReport {
            summaries,
            comparisons,
            correlation,
        }
    }

    /// Export any report structure to pretty JSON at display precision
    pub fn export_json<T, P>(&self, report: &T, path: P) -> Result<()>
    where
        T: ReportRecord + Rounded,
        P: AsRef<Path>,
    {
        let json_content = serde_json::to_string_pretty(&report.rounded(self.display_digits))?;
        std::fs::write(path, json_content)?;
        Ok(())
    }

    /// Write one row per sample group; undefined values are written as `NA`
    pub fn write_summary_tsv<W: Write>(&self, summaries: &[SampleSummary], out: W) -> Result<()> {
        let mut out = BufWriter::new(out);
        writeln!(
            out,
            "sample\tfiltered\tn_reads\ttotal_bases\tmin_length\tmax_length\tmean_length\tsd_length\tmedian_length\tq1\tq3\tn50\tse_length\tlower_ci\tupper_ci"
        )?;

        let d = self.display_digits;
        let fmt = |x: f64| format!("{}", round_decimals(x, d));
        let fmt_opt = |x: Option<f64>| x.map(|v| fmt(v)).unwrap_or_else(|| "NA".to_string());

        for s in summaries {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                s.sample,
                s.filtered,
                s.n_reads,
                s.total_bases,
                s.min_length,
                s.max_length,
                fmt(s.mean_length),
                fmt_opt(s.sd_length),
                fmt(s.median_length),
                fmt(s.q1),
                fmt(s.q3),
                s.n50,
                fmt_opt(s.se_length),
                fmt_opt(s.lower_ci),
                fmt_opt(s.upper_ci),
            )?;
        }
        out.flush()?;
        Ok(())
    }

    /// Write the pooled per-read rows consumed by plotting
    pub fn write_records_tsv<W: Write>(&self, dataset: &Dataset, out: W) -> Result<()> {
        let mut out = BufWriter::new(out);
        writeln!(out, "sample\tfiltered\tname\ttime\tlength")?;
        for r in dataset.records() {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}",
                r.sample, r.filtered, r.name, r.time, r.length
            )?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn write_summary_tsv_file<P: AsRef<Path>>(
        &self,
        summaries: &[SampleSummary],
        path: P,
    ) -> Result<()> {
        self.write_summary_tsv(summaries, File::create(path)?)
    }

    pub fn write_records_tsv_file<P: AsRef<Path>>(&self, dataset: &Dataset, path: P) -> Result<()> {
        self.write_records_tsv(dataset, File::create(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(sample: &str, filtered: bool, n_reads: usize, total_bases: u64) -> SampleSummary {
        let mean = total_bases as f64 / n_reads as f64;
        SampleSummary {
            sample: sample.to_string(),
            filtered,
            n_reads,
            total_bases,
            min_length: 1,
            max_length: total_bases,
            mean_length: mean,
            sd_length: None,
            median_length: mean,
            q1: mean,
            q3: mean,
            n50: total_bases,
            se_length: None,
            lower_ci: None,
            upper_ci: None,
            confidence_level: 0.95,
        }
    }

    #[test]
    fn test_reporter_default() {
        assert_eq!(LengthTimeReporter::default().display_digits, 3);
    }

    #[test]
    fn test_round_decimals() {
        assert_eq!(round_decimals(15.811388, 3), 15.811);
        assert_eq!(round_decimals(2.0005, 0), 2.0);
        assert!(round_decimals(f64::NAN, 3).is_nan());
    }

    #[test]
    fn test_round_significant() {
        assert_eq!(round_significant(-0.0123456, 3), -0.0123);
        assert_eq!(round_significant(123456.0, 3), 123000.0);
        assert_eq!(round_significant(0.0, 3), 0.0);
        assert_eq!(round_significant(f64::INFINITY, 3), f64::INFINITY);
    }

    #[test]
    fn test_rounding_keeps_source_precision() {
        let mut s = summary("a", true, 3, 10);
        s.sd_length = Some(1.23456);
        let rounded = s.rounded(3);
        assert_eq!(rounded.mean_length, 3.333);
        assert_eq!(rounded.sd_length, Some(1.235));
        assert_eq!(s.mean_length, 10.0 / 3.0);
    }

    #[test]
    fn test_comparisons_pair_by_sample() {
        let reporter = LengthTimeReporter::default();
        let report = reporter.generate_report(
            vec![
                summary("a", true, 50, 5000),
                summary("a", false, 100, 8000),
                summary("b", true, 10, 100),
            ],
            None,
        );
        assert_eq!(report.comparisons.len(), 1);
        let c = &report.comparisons[0];
        assert_eq!(c.sample, "a");
        assert_eq!(c.reads_retained, 0.5);
        assert_eq!(c.bases_retained, 0.625);
        assert_eq!(c.mean_length_filtered, 100.0);
        assert_eq!(c.mean_length_unfiltered, 80.0);
    }

    #[test]
    fn test_summary_tsv_marks_undefined_values() {
        let reporter = LengthTimeReporter::default();
        let mut buf = Vec::new();
        reporter
            .write_summary_tsv(&[summary("solo", false, 1, 42)], &mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("sample\tfiltered"));
        assert!(lines[1].starts_with("solo\tfalse\t1\t42"));
        assert!(lines[1].ends_with("NA\tNA\tNA"));
    }
}
