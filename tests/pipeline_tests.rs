//! End-to-end tests: discovery, aggregation, summaries, correlation, reporting

use approx::assert_relative_eq;
use nanopore_qc_tools::{
    collect_inputs, discover_index_files, fit_time_on_length, CorrelationReport, Dataset,
    IndexRecord, LengthTimeReporter, NamingConvention, QcError, SampleKey, SummaryEngine,
};
use proptest::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write an index file with one read per length, one second apart
fn write_reads(dir: &Path, name: &str, lengths: &[u64]) -> PathBuf {
    let mut content = String::new();
    for (i, length) in lengths.iter().enumerate() {
        content.push_str(&format!(
            "{}_{}\t2021-03-04T10:00:{:02}Z\t{}\t0\t{}\t{}\n",
            name,
            i,
            i % 60,
            length,
            length,
            length + 1
        ));
    }
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test index");
    path
}

/// Filtered/non-filtered directory layout with two samples
fn sample_layout() -> (TempDir, PathBuf, PathBuf) {
    let root = TempDir::new().unwrap();
    let filtered = root.path().join("filtered");
    let unfiltered = root.path().join("non-filtered");
    fs::create_dir(&filtered).unwrap();
    fs::create_dir(&unfiltered).unwrap();

    write_reads(&filtered, "sampleA_filt.sample.datetime.fai", &[10, 20, 30, 40, 50]);
    write_reads(&filtered, "sampleB_filt.sample.datetime.fai", &[500]);
    write_reads(&unfiltered, "sampleA.sample.datetime.fai", &[5, 10, 20, 30, 40, 50, 8]);
    write_reads(&unfiltered, "notes.txt", &[1]);

    (root, filtered, unfiltered)
}

#[test]
fn test_discovery_filters_and_sorts() {
    let (_root, filtered, unfiltered) = sample_layout();
    let naming = NamingConvention::default();

    let found = discover_index_files(&filtered, &naming).unwrap();
    let names: Vec<_> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "sampleA_filt.sample.datetime.fai",
            "sampleB_filt.sample.datetime.fai"
        ]
    );

    assert_eq!(discover_index_files(&unfiltered, &naming).unwrap().len(), 1);
}

#[test]
fn test_discovery_missing_directory() {
    let root = TempDir::new().unwrap();
    let err = discover_index_files(root.path().join("nope"), &NamingConvention::default())
        .unwrap_err();
    assert!(matches!(err, QcError::NotFound { .. }));
}

#[test]
fn test_collect_inputs_requires_a_directory() {
    let err = collect_inputs(None, None, &NamingConvention::default()).unwrap_err();
    assert!(matches!(err, QcError::InvalidConfig(_)));
}

#[test]
fn test_load_and_summarize() {
    let (_root, filtered, unfiltered) = sample_layout();
    let naming = NamingConvention::default();
    let (f, u) =
        collect_inputs(Some(filtered.as_path()), Some(unfiltered.as_path()), &naming).unwrap();

    let dataset = Dataset::load(&f, &u, &naming).unwrap();
    assert_eq!(dataset.len(), 13);

    let groups = dataset.groups();
    let keys: Vec<_> = groups.iter().map(|g| g.key.clone()).collect();
    assert_eq!(
        keys,
        vec![
            SampleKey::new("sampleA", true),
            SampleKey::new("sampleB", true),
            SampleKey::new("sampleA", false),
        ]
    );

    let summaries = SummaryEngine::default().summarize_all(&dataset).unwrap();
    let a = &summaries[0];
    assert_eq!(a.n_reads, 5);
    assert_eq!(a.total_bases, 150);
    assert_eq!(a.max_length, 50);
    assert_relative_eq!(a.mean_length, 30.0);
    assert_relative_eq!(a.median_length, 30.0);
    assert_relative_eq!(a.sd_length.unwrap(), 15.811388, epsilon = 1e-6);

    let b = &summaries[1];
    assert_eq!(b.n_reads, 1);
    assert!(b.se_length.is_none());
    assert!(matches!(
        b.confidence_interval(),
        Err(QcError::DegenerateSample { ref sample, filtered: true }) if sample == "sampleB"
    ));
}

#[test]
fn test_duplicate_inputs_are_not_deduplicated() {
    let root = TempDir::new().unwrap();
    let path = write_reads(root.path(), "s_filt.sample.datetime.fai", &[100, 200]);
    let naming = NamingConvention::default();

    let dataset = Dataset::load(&[path.clone(), path], &[], &naming).unwrap();
    let summaries = SummaryEngine::default().summarize_all(&dataset).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].n_reads, 4);
    assert_eq!(summaries[0].total_bases, 600);
}

#[test]
fn test_load_propagates_missing_file() {
    let root = TempDir::new().unwrap();
    let good = write_reads(root.path(), "s_filt.sample.datetime.fai", &[100]);
    let missing = root.path().join("gone.sample.datetime.fai");

    let err = Dataset::load(&[good], &[missing], &NamingConvention::default()).unwrap_err();
    assert!(matches!(err, QcError::NotFound { .. }));
}

#[test]
fn test_summaries_are_reproducible() {
    let (_root, filtered, unfiltered) = sample_layout();
    let naming = NamingConvention::default();
    let (f, u) =
        collect_inputs(Some(filtered.as_path()), Some(unfiltered.as_path()), &naming).unwrap();
    let engine = SummaryEngine::default();

    let first = engine
        .summarize_all(&Dataset::load(&f, &u, &naming).unwrap())
        .unwrap();
    let second = engine
        .summarize_all(&Dataset::load(&f, &u, &naming).unwrap())
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_correlation_recovers_linear_slope() {
    let records: Vec<_> = (1..=200u64)
        .map(|i| {
            let length = 250 * i;
            IndexRecord {
                name: format!("r{}", i),
                time: 5.0 - 0.01 * length as f64,
                length,
                offset: 0,
                line_bases: length,
                line_width: length + 1,
                sample: if i % 2 == 0 { "a" } else { "b" }.to_string(),
                filtered: i % 3 == 0,
            }
        })
        .collect();

    let report = fit_time_on_length(&records).unwrap();
    assert_relative_eq!(report.slope, -0.01, epsilon = 1e-9);
    assert!(report.p_value < 0.05);
    assert_eq!(report.response, "time");
    assert_eq!(report.predictor, "length");
}

#[test]
fn test_exact_fit_report_reads_back() {
    let root = TempDir::new().unwrap();
    let records: Vec<_> = [(1u64, 2.0), (2, 4.0), (3, 6.0)]
        .iter()
        .map(|&(length, time)| IndexRecord {
            name: format!("r{}", length),
            time,
            length,
            offset: 0,
            line_bases: length,
            line_width: length + 1,
            sample: "s".to_string(),
            filtered: false,
        })
        .collect();

    let report = fit_time_on_length(&records).unwrap();
    assert_eq!(report.std_error, 0.0);
    assert!(report.t_statistic.is_none());
    assert_eq!(report.p_value, 0.0);

    let out = root.path().join("exact.json");
    LengthTimeReporter::default().export_json(&report, &out).unwrap();
    let loaded: CorrelationReport =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(loaded.t_statistic, None);
    assert_eq!(loaded.slope, 2.0);
}

#[test]
fn test_full_report_json() {
    let (root, filtered, unfiltered) = sample_layout();
    let naming = NamingConvention::default();
    let (f, u) =
        collect_inputs(Some(filtered.as_path()), Some(unfiltered.as_path()), &naming).unwrap();
    let dataset = Dataset::load(&f, &u, &naming).unwrap();

    let summaries = SummaryEngine::default().summarize_all(&dataset).unwrap();
    let correlation = fit_time_on_length(dataset.records()).ok();
    let reporter = LengthTimeReporter::default();
    let report = reporter.generate_report(summaries, correlation);
    assert_eq!(report.comparisons.len(), 1);
    assert_eq!(report.comparisons[0].sample, "sampleA");

    let out = root.path().join("report.json");
    reporter.export_json(&report, &out).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();

    let a = &json["summaries"][0];
    assert_eq!(a["sample"], "sampleA");
    assert_eq!(a["sd_length"].as_f64().unwrap(), 15.811);
    assert!(json["summaries"][1]["lower_ci"].is_null());
    assert!(json["correlation"]["illustrative_loss"]["label"]
        .as_str()
        .unwrap()
        .contains("illustration"));

    // Rounding happens on the written copy only
    assert_relative_eq!(report.summaries[0].sd_length.unwrap(), 15.811388, epsilon = 1e-6);
}

#[test]
fn test_records_tsv_has_row_per_read() {
    let (root, filtered, unfiltered) = sample_layout();
    let naming = NamingConvention::default();
    let (f, u) =
        collect_inputs(Some(filtered.as_path()), Some(unfiltered.as_path()), &naming).unwrap();
    let dataset = Dataset::load(&f, &u, &naming).unwrap();

    let out = root.path().join("records.tsv");
    LengthTimeReporter::default()
        .write_records_tsv_file(&dataset, &out)
        .unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), dataset.len() + 1);
    assert!(text.lines().nth(1).unwrap().starts_with("sampleA\ttrue\t"));
}

proptest! {
    #[test]
    fn prop_total_bases_matches_group_sum(
        lengths in prop::collection::vec((1u64..100_000, any::<bool>(), 0usize..3), 1..200)
    ) {
        let records: Vec<_> = lengths
            .iter()
            .enumerate()
            .map(|(i, &(length, filtered, sample))| IndexRecord {
                name: format!("r{}", i),
                time: i as f64,
                length,
                offset: 0,
                line_bases: length,
                line_width: length + 1,
                sample: format!("s{}", sample),
                filtered,
            })
            .collect();
        let dataset = Dataset::from_records(records.clone());
        let summaries = SummaryEngine::default().summarize_all(&dataset).unwrap();

        let counted: usize = summaries.iter().map(|s| s.n_reads).sum();
        prop_assert_eq!(counted, records.len());

        for s in &summaries {
            let expected: u64 = records
                .iter()
                .filter(|r| r.sample == s.sample && r.filtered == s.filtered)
                .map(|r| r.length)
                .sum();
            prop_assert_eq!(s.total_bases, expected);
        }
    }
}
