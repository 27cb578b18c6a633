use tracing::info;

use crate::analyzers::cluster::{ClusterConfig, cluster_antennas};
use crate::analyzers::coverage::{operator_district_counts, technology_coverage};
use crate::analyzers::delay::district_delay;
use crate::analyzers::leadership::district_leaders;
use crate::analyzers::summary::{cluster_summary, coverage_summary, district_technology_totals};
use crate::analyzers::types::AnalysisBundle;
use crate::error::Result;
use crate::record::Dataset;

/// Runs every analyzer over one dataset and assembles the result bundle.
///
/// Delay, coverage and clustering run in parallel; leadership runs once the
/// counts are in.
///
/// # Errors
///
/// Fails before any analyzer runs if the dataset lacks a required column, has
/// no records, or `config` is invalid. No partial bundle is returned.
#[tracing::instrument(skip(dataset), fields(records = dataset.len()))]
pub fn run_pipeline(dataset: &Dataset, config: &ClusterConfig) -> Result<AnalysisBundle> {
    dataset.validate()?;
    config.validate()?;

    let records = dataset.records();

    let (district_delay, ((operator_district_count, technology_coverage), clustered)) =
        rayon::join(
            || district_delay(records),
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || operator_district_counts(records),
                            || technology_coverage(records),
                        )
                    },
                    || cluster_antennas(records, config),
                )
            },
        );
    let clustered_antennas = clustered?;

    let district_leader = district_leaders(&operator_district_count);
    let district_technology_totals = district_technology_totals(&technology_coverage);
    let coverage_summary = coverage_summary(&technology_coverage);
    let cluster_summary = cluster_summary(&clustered_antennas);

    info!(
        delay_rows = district_delay.len(),
        count_rows = operator_district_count.len(),
        leaders = district_leader.len(),
        clusters = cluster_summary.cluster_count,
        noise = cluster_summary.noise_count,
        "Pipeline run complete"
    );

    Ok(AnalysisBundle {
        cluster_config: *config,
        district_delay,
        operator_district_count,
        district_leader,
        technology_coverage,
        district_technology_totals,
        clustered_antennas,
        coverage_summary,
        cluster_summary,
    })
}
