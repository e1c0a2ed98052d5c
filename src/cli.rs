//! Command-line arguments shared by every tool
//!
//! Input directories and the file naming convention are the same across
//! tools; per-tool options stay in each binary.

use crate::naming::{
    NamingConvention, DEFAULT_DISCOVERY_PATTERN, DEFAULT_FILTERED_SUFFIX,
    DEFAULT_UNFILTERED_SUFFIX,
};
use clap::{Arg, ArgMatches};
use std::path::PathBuf;

/// Input directory and naming convention arguments
pub fn input_args() -> Vec<Arg> {
    vec![
        Arg::new("filtered_dir")
            .short('f')
            .long("filtered-dir")
            .value_name("DIRECTORY")
            .help("Directory containing filtered index files"),
        Arg::new("unfiltered_dir")
            .short('u')
            .long("unfiltered-dir")
            .value_name("DIRECTORY")
            .help("Directory containing unfiltered index files"),
        Arg::new("filtered_suffix")
            .long("filtered-suffix")
            .value_name("SUFFIX")
            .help("File name suffix stripped from filtered files")
            .default_value(DEFAULT_FILTERED_SUFFIX),
        Arg::new("unfiltered_suffix")
            .long("unfiltered-suffix")
            .value_name("SUFFIX")
            .help("File name suffix stripped from unfiltered files")
            .default_value(DEFAULT_UNFILTERED_SUFFIX),
        Arg::new("pattern")
            .long("pattern")
            .value_name("PATTERN")
            .help("File name ending used to discover index files")
            .default_value(DEFAULT_DISCOVERY_PATTERN),
    ]
}

/// Filtered and unfiltered directories, either of which may be absent
pub fn input_dirs(matches: &ArgMatches) -> (Option<PathBuf>, Option<PathBuf>) {
    (
        matches.get_one::<String>("filtered_dir").map(PathBuf::from),
        matches.get_one::<String>("unfiltered_dir").map(PathBuf::from),
    )
}

/// Naming convention from parsed arguments, falling back to the defaults
pub fn naming_convention(matches: &ArgMatches) -> NamingConvention {
    let value = |id: &str, default: &str| {
        matches
            .get_one::<String>(id)
            .map_or_else(|| default.to_string(), String::clone)
    };
    NamingConvention::new(
        value("filtered_suffix", DEFAULT_FILTERED_SUFFIX),
        value("unfiltered_suffix", DEFAULT_UNFILTERED_SUFFIX),
        value("pattern", DEFAULT_DISCOVERY_PATTERN),
    )
}
