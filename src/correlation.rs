//! Sequencing time vs read length correlation
//!
//! Fits `time = intercept + slope * length` by ordinary least squares over the
//! pooled records of every sample and filter state. Time is the response (epoch
//! seconds) and read length the predictor (bases); reversing them changes the
//! meaning of the slope, so the direction is fixed here.

use crate::error::{QcError, Result};
use crate::index::IndexRecord;
use log::info;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

pub const RESPONSE: &str = "time";
pub const PREDICTOR: &str = "length";

const ILLUSTRATIVE_LABEL: &str =
    "informal illustration only: |slope| * (max(time) - min(time)) / n_reads, not a statistical estimate";

/// OLS fit of sequencing time on read length with a two-sided slope test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub response: String,
    pub predictor: String,
    pub n_reads: usize,
    pub slope: f64,
    pub intercept: f64,
    /// Standard error of the slope
    pub std_error: f64,
    /// `None` when residuals vanish around a non-zero slope (t is infinite)
    pub t_statistic: Option<f64>,
    /// Two-sided p-value for slope == 0, df = n - 2
    pub p_value: f64,
    pub r_squared: f64,
    /// max(time) - min(time) in seconds
    pub time_span: f64,
    pub illustrative_loss: IllustrativeLoss,
}

impl CorrelationReport {
    pub fn significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Rough "bases lost per read" figure derived from the slope
///
/// Computed whether or not the fit is significant. It is a reporting
/// transformation and must not be read as an inferred quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IllustrativeLoss {
    pub per_read: f64,
    pub label: String,
}

impl IllustrativeLoss {
    fn from_fit(slope: f64, time_span: f64, n_reads: usize) -> Self {
        Self {
            per_read: slope.abs() * time_span / n_reads as f64,
            label: ILLUSTRATIVE_LABEL.to_string(),
        }
    }
}

/// Fit time on length over the pooled records
pub fn fit_time_on_length(records: &[IndexRecord]) -> Result<CorrelationReport> {
    let n = records.len();
    if n < 3 {
        return Err(QcError::InsufficientData(format!(
            "need at least 3 reads to fit time on length, got {}",
            n
        )));
    }

    let nf = n as f64;
    let mean_x = records.iter().map(|r| r.length as f64).sum::<f64>() / nf;
    let mean_y = records.iter().map(|r| r.time).sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    let mut min_time = f64::INFINITY;
    let mut max_time = f64::NEG_INFINITY;
    for r in records {
        let dx = r.length as f64 - mean_x;
        let dy = r.time - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
        min_time = min_time.min(r.time);
        max_time = max_time.max(r.time);
    }

    if sxx == 0.0 {
        return Err(QcError::InsufficientData(
            "all reads have the same length; slope is undefined".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let sse: f64 = records
        .iter()
        .map(|r| {
            let residual = r.time - (intercept + slope * r.length as f64);
            residual * residual
        })
        .sum();

    let df = (n - 2) as f64;
    let std_error = (sse / df / sxx).sqrt();
    let (t_statistic, p_value) = slope_test(slope, std_error, df)?;
    let r_squared = if syy > 0.0 { (1.0 - sse / syy).max(0.0) } else { 0.0 };
    let time_span = max_time - min_time;

    info!(
        "Fitted {} ~ {} over {} reads: slope={:.6e}, p={:.4e}",
        RESPONSE, PREDICTOR, n, slope, p_value
    );

    Ok(CorrelationReport {
        response: RESPONSE.to_string(),
        predictor: PREDICTOR.to_string(),
        n_reads: n,
        slope,
        intercept,
        std_error,
        t_statistic,
        p_value,
        r_squared,
        time_span,
        illustrative_loss: IllustrativeLoss::from_fit(slope, time_span, n),
    })
}

/// t statistic and two-sided p-value for H0: slope == 0
fn slope_test(slope: f64, std_error: f64, df: f64) -> Result<(Option<f64>, f64)> {
    if std_error == 0.0 {
        // Residuals vanish: either a flat exact fit or a perfect non-zero slope
        return Ok(if slope == 0.0 {
            (Some(0.0), 1.0)
        } else {
            (None, 0.0)
        });
    }

    let t = slope / std_error;
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| QcError::InsufficientData(e.to_string()))?;
    let p = (2.0 * dist.cdf(-t.abs())).min(1.0);
    Ok((Some(t), p))
}
