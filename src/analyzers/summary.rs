//! Headline statistics derived from the core tables.

use std::collections::{BTreeMap, HashSet};

use crate::analyzers::types::{
    ClusterSummary, ClusteredAntenna, CoverageSummary, DistrictTechnologyTotals,
    TechnologyCoverage,
};
use crate::analyzers::utility::pct;

/// Sums 4G and 5G counts over operators for each district.
pub fn district_technology_totals(coverage: &[TechnologyCoverage]) -> Vec<DistrictTechnologyTotals> {
    let mut totals: BTreeMap<_, (usize, usize)> = BTreeMap::new();
    for row in coverage {
        let entry = totals.entry(&row.district).or_default();
        entry.0 += row.count_4g;
        entry.1 += row.count_5g;
    }

    totals
        .into_iter()
        .map(|(district, (count_4g, count_5g))| DistrictTechnologyTotals {
            district: district.clone(),
            count_4g,
            count_5g,
        })
        .collect()
}

/// Network-wide 4G and 5G totals and the 5G share of their sum.
pub fn coverage_summary(coverage: &[TechnologyCoverage]) -> CoverageSummary {
    let total_4g: usize = coverage.iter().map(|r| r.count_4g).sum();
    let total_5g: usize = coverage.iter().map(|r| r.count_5g).sum();

    CoverageSummary {
        total_4g,
        total_5g,
        ratio_5g_percent: pct(total_5g, total_4g + total_5g),
    }
}

pub fn cluster_summary(antennas: &[ClusteredAntenna]) -> ClusterSummary {
    let cluster_count = antennas
        .iter()
        .filter(|a| !a.is_noise())
        .map(|a| a.cluster_id)
        .collect::<HashSet<_>>()
        .len();
    let noise_count = antennas.iter().filter(|a| a.is_noise()).count();

    ClusterSummary {
        cluster_count,
        noise_count,
        clustered_count: antennas.len() - noise_count,
    }
}
