//! Nanopore QC Tools
//!
//! Read-length and sequencing-time QC over augmented FASTA index files
//! (`*.sample.datetime.fai`) produced from Nanopore reads.
//!
//! This library provides shared functionality for:
//! - Parsing index files into per-read records
//! - Pooling filtered and unfiltered samples into one dataset
//! - Per-sample read length statistics with Student-t confidence intervals
//! - Time vs length correlation over the pooled reads
//! - Multi-sample JSON/TSV reporting
//!
//! ```no_run
//! use nanopore_qc_tools::{
//!     correlation::fit_time_on_length, discover_index_files, Dataset, NamingConvention,
//!     SummaryEngine,
//! };
//!
//! # fn main() -> nanopore_qc_tools::Result<()> {
//! let naming = NamingConvention::default();
//! let filtered = discover_index_files("filtered", &naming)?;
//! let unfiltered = discover_index_files("non-filtered", &naming)?;
//! let dataset = Dataset::load(&filtered, &unfiltered, &naming)?;
//!
//! let summaries = SummaryEngine::default().summarize_all(&dataset)?;
//! let correlation = fit_time_on_length(dataset.records())?;
//! println!("{} groups, slope {:.3e}", summaries.len(), correlation.slope);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod cli;
pub mod correlation;
pub mod error;
pub mod index;
pub mod naming;
pub mod reporting;
pub mod summary;

pub use aggregate::{discover_index_files, Dataset, SampleGroup, SampleKey};
pub use correlation::{fit_time_on_length, CorrelationReport, IllustrativeLoss};
pub use error::{QcError, Result};
pub use index::{read_index, IndexReader, IndexRecord};
pub use naming::NamingConvention;
pub use reporting::{LengthTimeReport, LengthTimeReporter};
pub use summary::{SampleSummary, SummaryEngine};

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// Trait for exported report structures
pub trait ReportRecord: Clone + Serialize + DeserializeOwned + std::fmt::Debug {}

/// Collect index files from the filtered and unfiltered directories
///
/// Either directory may be omitted; at least one must be given.
pub fn collect_inputs(
    filtered_dir: Option<&Path>,
    unfiltered_dir: Option<&Path>,
    naming: &NamingConvention,
) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    if filtered_dir.is_none() && unfiltered_dir.is_none() {
        return Err(QcError::InvalidConfig(
            "at least one of the filtered or unfiltered directories is required".to_string(),
        ));
    }

    let filtered = match filtered_dir {
        Some(dir) => discover_index_files(dir, naming)?,
        None => Vec::new(),
    };
    let unfiltered = match unfiltered_dir {
        Some(dir) => discover_index_files(dir, naming)?,
        None => Vec::new(),
    };
    Ok((filtered, unfiltered))
}
