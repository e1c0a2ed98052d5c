//! File naming convention for augmented index files
//!
//! Upstream indexing writes one file per sample and encodes the sample name
//! and filter state in the file name:
//! - filtered:   `<sample>_filt.sample.datetime.fai`
//! - unfiltered: `<sample>.sample.datetime.fai`
//!
//! This is an assumption about the upstream tools, not a negotiated format,
//! so the suffixes are configurable.

use crate::error::{QcError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_FILTERED_SUFFIX: &str = "_filt.sample.datetime.fai";
pub const DEFAULT_UNFILTERED_SUFFIX: &str = ".sample.datetime.fai";
pub const DEFAULT_DISCOVERY_PATTERN: &str = "sample.datetime.fai";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    pub filtered_suffix: String,
    pub unfiltered_suffix: String,
    /// Ending shared by every index file, used for directory discovery
    pub discovery_pattern: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            filtered_suffix: DEFAULT_FILTERED_SUFFIX.to_string(),
            unfiltered_suffix: DEFAULT_UNFILTERED_SUFFIX.to_string(),
            discovery_pattern: DEFAULT_DISCOVERY_PATTERN.to_string(),
        }
    }
}

impl NamingConvention {
    pub fn new(
        filtered_suffix: impl Into<String>,
        unfiltered_suffix: impl Into<String>,
        discovery_pattern: impl Into<String>,
    ) -> Self {
        Self {
            filtered_suffix: filtered_suffix.into(),
            unfiltered_suffix: unfiltered_suffix.into(),
            discovery_pattern: discovery_pattern.into(),
        }
    }

    /// Suffix stripped from file names for the given filter state
    pub fn suffix(&self, filtered: bool) -> &str {
        if filtered {
            &self.filtered_suffix
        } else {
            &self.unfiltered_suffix
        }
    }

    /// Derive the sample name from an index file path
    ///
    /// When the expected suffix is absent the whole file name is used as the
    /// sample name and a warning is logged.
    pub fn sample_name<P: AsRef<Path>>(&self, path: P, filtered: bool) -> Result<String> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| QcError::parse(path, 0, "file name is not valid UTF-8"))?;

        let sample = match file_name.strip_suffix(self.suffix(filtered)) {
            Some(stem) => stem,
            None => {
                warn!(
                    "{} does not end with '{}'; using full file name as sample",
                    file_name,
                    self.suffix(filtered)
                );
                file_name
            }
        };

        if sample.is_empty() {
            return Err(QcError::parse(path, 0, "sample name is empty after removing suffix"));
        }

        Ok(sample.to_string())
    }

    /// Whether a file name looks like an index file under this convention
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.discovery_pattern)
    }
}
