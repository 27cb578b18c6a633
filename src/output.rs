//! Output formatting and persistence for analysis bundles.
//!
//! Supports pretty-printing, JSON serialization, and per-table CSV files.

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::AnalysisBundle;

/// Logs a bundle using Rust's debug pretty-print format.
pub fn print_pretty(bundle: &AnalysisBundle) {
    debug!("{:#?}", bundle);
}

/// Logs a bundle as pretty-printed JSON.
pub fn print_json(bundle: &AnalysisBundle) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(bundle)?);
    Ok(())
}

/// Logs the headline figures of a bundle.
pub fn print_summary(bundle: &AnalysisBundle) {
    let coverage = &bundle.coverage_summary;
    let clusters = &bundle.cluster_summary;

    info!(
        antennas_4g = coverage.total_4g,
        antennas_5g = coverage.total_5g,
        ratio_5g = %format!("{:.1}%", coverage.ratio_5g_percent),
        "Technology coverage"
    );
    info!(
        clusters = clusters.cluster_count,
        isolated = clusters.noise_count,
        clustered = clusters.clustered_count,
        radius = bundle.cluster_config.neighborhood_radius,
        min_neighbors = bundle.cluster_config.min_neighbors,
        "Spatial clustering"
    );
    for leader in &bundle.district_leader {
        info!(
            district = %leader.district,
            operator = %leader.operator,
            antennas = leader.antenna_count,
            "District leader"
        );
    }
    for delay in &bundle.district_delay {
        info!(
            district = %delay.district,
            mean_delay_days = delay.mean_delay_days,
            observations = delay.observations,
            "5G rollout delay"
        );
    }
}

/// Writes rows to a CSV file with a header line, replacing any existing file.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes every table of a bundle into `dir` as `<table>.csv`.
///
/// Returns the paths written, in a fixed order.
pub fn write_bundle_tables(dir: &Path, bundle: &AnalysisBundle) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    macro_rules! table {
        ($name:expr, $rows:expr) => {
            let path = dir.join(format!("{}.csv", $name));
            write_table(&path, $rows)?;
            written.push(path);
        };
    }

    table!("district_delay", &bundle.district_delay);
    table!("operator_district_count", &bundle.operator_district_count);
    table!("district_leader", &bundle.district_leader);
    table!("technology_coverage", &bundle.technology_coverage);
    table!("district_technology_totals", &bundle.district_technology_totals);
    table!("clustered_antennas", &bundle.clustered_antennas);

    Ok(written)
}
