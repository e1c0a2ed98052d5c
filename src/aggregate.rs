//! Multi-sample aggregation
//!
//! Loads filtered and unfiltered index files into one pooled [`Dataset`] and
//! groups its records by `(sample, filtered)` for summarization.
//!
//! Files are read in the order given, filtered first. Group order follows the
//! order samples are first seen and carries no meaning. Records are never
//! deduplicated: a sample listed twice contributes twice.

use crate::error::{QcError, Result};
use crate::index::{read_index, IndexRecord};
use crate::naming::NamingConvention;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Grouping key for per-sample summaries
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleKey {
    pub sample: String,
    pub filtered: bool,
}

impl SampleKey {
    pub fn new(sample: impl Into<String>, filtered: bool) -> Self {
        Self {
            sample: sample.into(),
            filtered,
        }
    }

    fn of(record: &IndexRecord) -> Self {
        Self::new(record.sample.clone(), record.filtered)
    }
}

/// Records sharing one `(sample, filtered)` key
#[derive(Debug, Clone)]
pub struct SampleGroup<'a> {
    pub key: SampleKey,
    pub records: Vec<&'a IndexRecord>,
}

impl SampleGroup<'_> {
    pub fn lengths(&self) -> Vec<u64> {
        self.records.iter().map(|r| r.length).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// All records from every loaded file, in load order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<IndexRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<IndexRecord>) -> Self {
        Self { records }
    }

    /// Parse every filtered then every unfiltered file and pool the records
    pub fn load<P: AsRef<Path>>(
        filtered_paths: &[P],
        unfiltered_paths: &[P],
        naming: &NamingConvention,
    ) -> Result<Self> {
        let tagged = filtered_paths
            .iter()
            .map(|p| (p, true))
            .chain(unfiltered_paths.iter().map(|p| (p, false)));

        let mut records = Vec::new();
        for (path, filtered) in tagged {
            records.extend(read_index(path, filtered, naming)?);
        }

        info!(
            "Loaded {} records from {} filtered and {} unfiltered files",
            records.len(),
            filtered_paths.len(),
            unfiltered_paths.len()
        );
        Ok(Self { records })
    }

    /// Flat pooled view
    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Group records by `(sample, filtered)` in first-seen order
    pub fn groups(&self) -> Vec<SampleGroup<'_>> {
        let mut positions: HashMap<SampleKey, usize> = HashMap::new();
        let mut groups: Vec<SampleGroup<'_>> = Vec::new();

        for record in &self.records {
            let key = SampleKey::of(record);
            let idx = *positions.entry(key.clone()).or_insert_with(|| {
                groups.push(SampleGroup {
                    key,
                    records: Vec::new(),
                });
                groups.len() - 1
            });
            groups[idx].records.push(record);
        }

        groups
    }
}

/// List index files in `dir` matching the naming convention, sorted by path
///
/// Not recursive.
pub fn discover_index_files<P: AsRef<Path>>(
    dir: P,
    naming: &NamingConvention,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| QcError::not_found(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_match = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| naming.matches(n))
            .unwrap_or(false);
        if is_match && entry.file_type()?.is_file() {
            paths.push(path);
        }
    }

    paths.sort();
    info!("Found {} index files in {}", paths.len(), dir.display());
    Ok(paths)
}
