//! Derived tables produced by the analytics pipeline.

use serde::Serialize;

use crate::analyzers::cluster::ClusterConfig;
use crate::record::District;

/// Cluster id given to points that belong to no dense region.
pub const NOISE: i64 = -1;

/// Mean 5G rollout delay for one district.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictDelay {
    pub district: District,
    pub mean_delay_days: f64,
    pub observations: usize,
}

/// Number of antennas an operator runs in a district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorDistrictCount {
    pub district: District,
    pub operator: String,
    pub antenna_count: usize,
}

/// The operator with the most antennas in a district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictLeader {
    pub district: District,
    pub operator: String,
    pub antenna_count: usize,
}

/// Technology breakdown for one (district, operator) pair.
///
/// `count_4g` and `count_5g` skip `Unknown` records; `count_total` does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnologyCoverage {
    pub district: District,
    pub operator: String,
    pub count_4g: usize,
    pub count_5g: usize,
    pub count_total: usize,
    pub count_unknown: usize,
}

/// 4G and 5G totals for a district, summed over operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictTechnologyTotals {
    pub district: District,
    pub count_4g: usize,
    pub count_5g: usize,
}

/// An antenna with its density cluster assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteredAntenna {
    pub operator: String,
    pub district: Option<District>,
    pub cluster_id: i64,
    pub longitude: f64,
    pub latitude: f64,
}

impl ClusteredAntenna {
    pub fn is_noise(&self) -> bool {
        self.cluster_id == NOISE
    }
}

/// Network-wide 4G/5G totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub total_4g: usize,
    pub total_5g: usize,
    pub ratio_5g_percent: f64,
}

/// Headline figures for a clustering run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterSummary {
    pub cluster_count: usize,
    pub noise_count: usize,
    pub clustered_count: usize,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisBundle {
    pub cluster_config: ClusterConfig,
    pub district_delay: Vec<DistrictDelay>,
    pub operator_district_count: Vec<OperatorDistrictCount>,
    pub district_leader: Vec<DistrictLeader>,
    pub technology_coverage: Vec<TechnologyCoverage>,
    pub district_technology_totals: Vec<DistrictTechnologyTotals>,
    pub clustered_antennas: Vec<ClusteredAntenna>,
    pub coverage_summary: CoverageSummary,
    pub cluster_summary: ClusterSummary,
}
