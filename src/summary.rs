//! Per-sample read length statistics
//!
//! Computes descriptive statistics over read lengths for each
//! `(sample, filtered)` group and a Student-t confidence interval on the mean.
//! Everything is kept at full precision; rounding for display happens in
//! [`crate::reporting`].

use crate::aggregate::{Dataset, SampleGroup};
use crate::error::{QcError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Length statistics for one `(sample, filtered)` group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub sample: String,
    pub filtered: bool,
    pub n_reads: usize,
    pub total_bases: u64,
    pub min_length: u64,
    pub max_length: u64,
    pub mean_length: f64,
    /// Sample standard deviation; `None` for a single read
    pub sd_length: Option<f64>,
    pub median_length: f64,
    pub q1: f64,
    pub q3: f64,
    pub n50: u64,
    pub se_length: Option<f64>,
    pub lower_ci: Option<f64>,
    pub upper_ci: Option<f64>,
    pub confidence_level: f64,
}

impl SampleSummary {
    /// Confidence interval on the mean, or `DegenerateSample` for a single read
    pub fn confidence_interval(&self) -> Result<(f64, f64)> {
        match (self.lower_ci, self.upper_ci) {
            (Some(lower), Some(upper)) => Ok((lower, upper)),
            _ => Err(QcError::DegenerateSample {
                sample: self.sample.clone(),
                filtered: self.filtered,
            }),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.n_reads < 2
    }
}

/// Summary statistics calculator
#[derive(Debug, Clone)]
pub struct SummaryEngine {
    pub confidence_level: f64,
}

impl Default for SummaryEngine {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
        }
    }
}

impl SummaryEngine {
    pub fn new(confidence_level: f64) -> Result<Self> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(QcError::InvalidConfig(format!(
                "confidence level must be in (0, 1), got {}",
                confidence_level
            )));
        }
        Ok(Self { confidence_level })
    }

    /// Summarize one group
    pub fn summarize(&self, group: &SampleGroup<'_>) -> Result<SampleSummary> {
        let mut lengths = group.lengths();
        if lengths.is_empty() {
            return Err(QcError::EmptyGroup);
        }
        lengths.sort_unstable();

        let n = lengths.len();
        let total_bases: u64 = lengths.iter().sum();
        let mean = total_bases as f64 / n as f64;
        let sd = sample_sd(&lengths, mean);

        let (se, lower_ci, upper_ci) = match sd {
            Some(sd) => {
                let se = sd / (n as f64).sqrt();
                let t = self.t_critical(n - 1)?;
                (Some(se), Some(mean - t * se), Some(mean + t * se))
            }
            None => (None, None, None),
        };

        Ok(SampleSummary {
            sample: group.key.sample.clone(),
            filtered: group.key.filtered,
            n_reads: n,
            total_bases,
            min_length: lengths[0],
            max_length: lengths[n - 1],
            mean_length: mean,
            sd_length: sd,
            median_length: quantile_sorted(&lengths, 0.5),
            q1: quantile_sorted(&lengths, 0.25),
            q3: quantile_sorted(&lengths, 0.75),
            n50: n50_sorted(&lengths),
            se_length: se,
            lower_ci,
            upper_ci,
            confidence_level: self.confidence_level,
        })
    }

    /// Summarize every group of the dataset, in group order
    pub fn summarize_all(&self, dataset: &Dataset) -> Result<Vec<SampleSummary>> {
        let summaries = dataset
            .groups()
            .iter()
            .map(|g| self.summarize(g))
            .collect::<Result<Vec<_>>>()?;
        info!("Summarized {} sample groups", summaries.len());
        Ok(summaries)
    }

    /// Two-sided Student-t critical value for `df` degrees of freedom
    fn t_critical(&self, df: usize) -> Result<f64> {
        let dist = StudentsT::new(0.0, 1.0, df as f64)
            .map_err(|e| QcError::InvalidConfig(e.to_string()))?;
        Ok(dist.inverse_cdf(0.5 + self.confidence_level / 2.0))
    }
}

/// Sample standard deviation (n - 1 denominator)
fn sample_sd(lengths: &[u64], mean: f64) -> Option<f64> {
    let n = lengths.len();
    if n < 2 {
        return None;
    }
    let ss: f64 = lengths
        .iter()
        .map(|&l| {
            let d = l as f64 - mean;
            d * d
        })
        .sum();
    Some((ss / (n - 1) as f64).sqrt())
}

/// Quantile of sorted data by linear interpolation between order statistics (R-7)
pub fn quantile_sorted(sorted: &[u64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0] as f64;
    }

    let h = (n - 1) as f64 * p;
    let lower = h.floor() as usize;
    let frac = h - h.floor();

    if lower >= n - 1 {
        return sorted[n - 1] as f64;
    }

    let lo = sorted[lower] as f64;
    let hi = sorted[lower + 1] as f64;
    lo + frac * (hi - lo)
}

/// Smallest length L such that reads of length >= L hold at least half the bases
pub fn n50_sorted(sorted: &[u64]) -> u64 {
    let total: u64 = sorted.iter().sum();
    let mut running = 0u64;
    for &length in sorted.iter().rev() {
        running += length;
        if running * 2 >= total {
            return length;
        }
    }
    0
}
