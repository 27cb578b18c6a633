//! Per-(district, operator) antenna counts and technology coverage.

use std::collections::BTreeMap;
use tracing::debug;

use crate::analyzers::technology::classify;
use crate::analyzers::types::{OperatorDistrictCount, TechnologyCoverage};
use crate::record::{AntennaRecord, District};

type GroupKey<'a> = (&'a District, &'a str);

fn group_key(record: &AntennaRecord) -> Option<GroupKey<'_>> {
    record
        .district
        .as_ref()
        .map(|d| (d, record.operator.as_str()))
}

/// Counts records per (district, operator), sorted by district then operator.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn operator_district_counts(records: &[AntennaRecord]) -> Vec<OperatorDistrictCount> {
    let mut counts: BTreeMap<GroupKey<'_>, usize> = BTreeMap::new();

    for key in records.iter().filter_map(group_key) {
        *counts.entry(key).or_default() += 1;
    }

    debug!(groups = counts.len(), "Operator/district counts computed");

    counts
        .into_iter()
        .map(|((district, operator), antenna_count)| OperatorDistrictCount {
            district: district.clone(),
            operator: operator.to_string(),
            antenna_count,
        })
        .collect()
}

#[derive(Default)]
struct CoverageTally {
    count_4g: usize,
    count_5g: usize,
    count_total: usize,
    count_unknown: usize,
}

/// Tallies 4G, 5G, total and unknown-technology records per (district, operator).
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn technology_coverage(records: &[AntennaRecord]) -> Vec<TechnologyCoverage> {
    let mut tallies: BTreeMap<GroupKey<'_>, CoverageTally> = BTreeMap::new();

    for record in records {
        let Some(key) = group_key(record) else {
            continue;
        };
        let class = classify(&record.technology_label);
        let tally = tallies.entry(key).or_default();

        tally.count_total += 1;
        if class.is_unknown {
            tally.count_unknown += 1;
        }
        if class.has_4g() == Some(true) {
            tally.count_4g += 1;
        }
        if class.has_5g() == Some(true) {
            tally.count_5g += 1;
        }
    }

    debug!(groups = tallies.len(), "Technology coverage computed");

    tallies
        .into_iter()
        .map(|((district, operator), t)| TechnologyCoverage {
            district: district.clone(),
            operator: operator.to_string(),
            count_4g: t.count_4g,
            count_5g: t.count_5g,
            count_total: t.count_total,
            count_unknown: t.count_unknown,
        })
        .collect()
}
