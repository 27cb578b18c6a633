use antenna_rollout::analyzers::cluster::ClusterConfig;
use antenna_rollout::analyzers::pipeline::run_pipeline;
use antenna_rollout::analyzers::types::{AnalysisBundle, NOISE};
use antenna_rollout::error::PipelineError;
use antenna_rollout::record::Dataset;
use std::collections::{BTreeMap, BTreeSet};

fn fixture() -> Dataset {
    Dataset::from_path("tests/fixtures/antennas.csv").expect("Failed to load fixture")
}

fn run(dataset: &Dataset) -> AnalysisBundle {
    run_pipeline(dataset, &ClusterConfig::default()).expect("Pipeline failed")
}

/// Cluster membership as sets of (operator, lon, lat), ignoring cluster ids.
fn partition(bundle: &AnalysisBundle) -> (BTreeSet<Vec<String>>, BTreeSet<String>) {
    let mut clusters: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    let mut noise = BTreeSet::new();
    for a in &bundle.clustered_antennas {
        let key = format!("{}@{},{}", a.operator, a.longitude, a.latitude);
        if a.cluster_id == NOISE {
            noise.insert(key);
        } else {
            clusters.entry(a.cluster_id).or_default().push(key);
        }
    }
    let clusters = clusters
        .into_values()
        .map(|mut members| {
            members.sort();
            members
        })
        .collect();
    (clusters, noise)
}

#[test]
fn test_district_delay_from_fixture() {
    let bundle = run(&fixture());
    let delays: Vec<(&str, f64, usize)> = bundle
        .district_delay
        .iter()
        .map(|d| (d.district.as_str(), d.mean_delay_days, d.observations))
        .collect();

    assert_eq!(delays.len(), 2);
    assert_eq!(delays[0].0, "1");
    assert!((delays[0].1 - 943.0 / 3.0).abs() < 1e-9);
    assert_eq!(delays[0].2, 3);
    assert_eq!(delays[1], ("2", 548.5, 2));
}

#[test]
fn test_counts_and_leaders_from_fixture() {
    let bundle = run(&fixture());

    let counts: Vec<(&str, &str, usize)> = bundle
        .operator_district_count
        .iter()
        .map(|c| (c.district.as_str(), c.operator.as_str(), c.antenna_count))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("1", "Free", 1),
            ("1", "Orange", 2),
            ("1", "SFR", 2),
            ("2", "Free", 3),
            ("2", "Orange", 1),
            ("2", "SFR", 1),
            ("3", "Orange", 1),
            ("3", "SFR", 1),
        ]
    );

    let leaders: Vec<(&str, &str, usize)> = bundle
        .district_leader
        .iter()
        .map(|l| (l.district.as_str(), l.operator.as_str(), l.antenna_count))
        .collect();
    assert_eq!(
        leaders,
        vec![("1", "Orange", 2), ("2", "Free", 3), ("3", "Orange", 1)]
    );
}

#[test]
fn test_technology_coverage_from_fixture() {
    let bundle = run(&fixture());

    let sfr_1 = bundle
        .technology_coverage
        .iter()
        .find(|t| t.district.as_str() == "1" && t.operator == "SFR")
        .unwrap();
    assert_eq!(
        (sfr_1.count_4g, sfr_1.count_5g, sfr_1.count_total, sfr_1.count_unknown),
        (1, 1, 2, 1)
    );

    for (count, coverage) in bundle
        .operator_district_count
        .iter()
        .zip(&bundle.technology_coverage)
    {
        assert_eq!(count.antenna_count, coverage.count_total);
    }

    assert_eq!(bundle.coverage_summary.total_4g, 8);
    assert_eq!(bundle.coverage_summary.total_5g, 6);
    assert!((bundle.coverage_summary.ratio_5g_percent - 600.0 / 14.0).abs() < 1e-9);
}

#[test]
fn test_clusters_from_fixture() {
    let bundle = run(&fixture());

    assert_eq!(bundle.clustered_antennas.len(), 12);
    assert_eq!(bundle.cluster_summary.cluster_count, 2);
    assert_eq!(bundle.cluster_summary.noise_count, 2);
    assert_eq!(bundle.cluster_summary.clustered_count, 10);

    let ids: Vec<i64> = bundle
        .clustered_antennas
        .iter()
        .map(|a| a.cluster_id)
        .collect();
    assert!(ids[..5].iter().all(|&id| id == ids[0] && id != NOISE));
    assert!(ids[5..10].iter().all(|&id| id == ids[5] && id != NOISE));
    assert_ne!(ids[0], ids[5]);
    assert_eq!(&ids[10..], &[NOISE, NOISE]);
}

#[test]
fn test_partition_survives_reordering() {
    let dataset = fixture();
    let mut reversed = dataset.records().to_vec();
    reversed.reverse();

    let forward = run(&dataset);
    let backward = run(&Dataset::from_records(reversed));

    assert_eq!(partition(&forward), partition(&backward));
    assert_eq!(forward.district_leader, backward.district_leader);
    assert_eq!(forward.technology_coverage, backward.technology_coverage);
}

#[test]
fn test_repeat_runs_are_identical() {
    let dataset = fixture();
    let first = run(&dataset);
    let second = run(&dataset);

    assert_eq!(first.district_delay, second.district_delay);
    assert_eq!(first.operator_district_count, second.operator_district_count);
    assert_eq!(first.clustered_antennas, second.clustered_antennas);
}

#[test]
fn test_override_cluster_parameters() {
    let config = ClusterConfig::new(0.002, 6).unwrap();
    let bundle = run_pipeline(&fixture(), &config).unwrap();
    assert_eq!(bundle.cluster_summary.cluster_count, 0);
    assert_eq!(bundle.cluster_summary.noise_count, 12);
}

#[test]
fn test_missing_column_aborts() {
    let csv = "operator,district,technology_label,longitude,latitude\nA,1,4G,1.0,1.0\n";
    let result = Dataset::from_reader(csv.as_bytes());
    assert!(matches!(result, Err(PipelineError::Schema { .. })));
}
