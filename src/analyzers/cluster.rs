//! Density-based spatial clustering of antenna positions.
//!
//! Distances are Euclidean on raw `(longitude, latitude)` degrees, with no
//! projection. A point whose neighbourhood (radius inclusive, the point itself
//! counted) holds at least `min_neighbors` points is a core point. Core points
//! within reach of each other share a cluster; other points inside a core
//! point's neighbourhood join it as border points without extending it.
//! Everything else is noise.
//!
//! A border point reachable from several clusters joins the one holding its
//! nearest core neighbour, ties broken by that neighbour's coordinates, so the
//! partition does not depend on input order. Cluster ids count up from zero
//! in order of first appearance.

use rayon::prelude::*;
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

use crate::analyzers::types::{ClusteredAntenna, NOISE};
use crate::error::{PipelineError, Result};
use crate::record::AntennaRecord;

pub const DEFAULT_NEIGHBORHOOD_RADIUS: f64 = 0.002;
pub const DEFAULT_MIN_NEIGHBORS: usize = 5;

/// Clustering parameters. Both are supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Neighbourhood radius in coordinate degrees.
    pub neighborhood_radius: f64,
    /// Minimum neighbourhood size for a core point, the point itself included.
    pub min_neighbors: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            neighborhood_radius: DEFAULT_NEIGHBORHOOD_RADIUS,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
        }
    }
}

impl ClusterConfig {
    pub fn new(neighborhood_radius: f64, min_neighbors: usize) -> Result<Self> {
        let config = Self {
            neighborhood_radius,
            min_neighbors,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.neighborhood_radius.is_finite() && self.neighborhood_radius > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "neighborhood_radius must be a positive number, got {}",
                self.neighborhood_radius
            )));
        }
        if self.min_neighbors == 0 {
            return Err(PipelineError::InvalidConfig(
                "min_neighbors must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A position with its index for R-tree queries
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    idx: usize,
    lon: f64,
    lat: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lon, self.lat])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlon = self.lon - point[0];
        let dlat = self.lat - point[1];
        dlon * dlon + dlat * dlat
    }
}

fn distance_2(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dlon = a[0] - b[0];
    let dlat = a[1] - b[1];
    dlon * dlon + dlat * dlat
}

/// Assigns a cluster id (or [`NOISE`]) to every point.
pub fn label_points(points: &[[f64; 2]], config: &ClusterConfig) -> Vec<i64> {
    let indexed: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .map(|(idx, p)| IndexedPoint {
            idx,
            lon: p[0],
            lat: p[1],
        })
        .collect();
    let tree = RTree::bulk_load(indexed);
    let radius_2 = config.neighborhood_radius * config.neighborhood_radius;

    let neighbors: Vec<Vec<usize>> = points
        .par_iter()
        .map(|p| {
            let mut found: Vec<usize> = tree
                .locate_within_distance(*p, radius_2)
                .map(|ip| ip.idx)
                .collect();
            found.sort_unstable();
            found
        })
        .collect();

    let is_core: Vec<bool> = neighbors
        .iter()
        .map(|n| n.len() >= config.min_neighbors)
        .collect();

    let mut labels = vec![NOISE; points.len()];
    let mut next_id: i64 = 0;

    for start in 0..points.len() {
        if !is_core[start] || labels[start] != NOISE {
            continue;
        }

        labels[start] = next_id;
        let mut queue = VecDeque::from([start]);
        while let Some(p) = queue.pop_front() {
            for &q in &neighbors[p] {
                if is_core[q] && labels[q] == NOISE {
                    labels[q] = next_id;
                    queue.push_back(q);
                }
            }
        }
        next_id += 1;
    }

    for i in 0..points.len() {
        if is_core[i] {
            continue;
        }
        let nearest_core = neighbors[i]
            .iter()
            .copied()
            .filter(|&q| is_core[q])
            .min_by(|&a, &b| {
                distance_2(points[i], points[a])
                    .total_cmp(&distance_2(points[i], points[b]))
                    .then_with(|| points[a][0].total_cmp(&points[b][0]))
                    .then_with(|| points[a][1].total_cmp(&points[b][1]))
            });
        if let Some(core) = nearest_core {
            labels[i] = labels[core];
        }
    }

    debug!(
        points = points.len(),
        core_points = is_core.iter().filter(|&&c| c).count(),
        clusters = next_id,
        "Density clustering finished"
    );
    labels
}

/// Clusters every record that has coordinates. Records without them are left out.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] when `config` fails validation.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn cluster_antennas(
    records: &[AntennaRecord],
    config: &ClusterConfig,
) -> Result<Vec<ClusteredAntenna>> {
    config.validate()?;

    let eligible: Vec<(&AntennaRecord, [f64; 2])> = records
        .iter()
        .filter_map(|r| r.coordinates().map(|c| (r, c)))
        .collect();

    if eligible.len() < records.len() {
        info!(
            skipped = records.len() - eligible.len(),
            "Records without coordinates left out of clustering"
        );
    }

    let points: Vec<[f64; 2]> = eligible.iter().map(|(_, c)| *c).collect();
    let labels = label_points(&points, config);

    Ok(eligible
        .into_iter()
        .zip(labels)
        .map(|((record, [lon, lat]), cluster_id)| ClusteredAntenna {
            operator: record.operator.clone(),
            district: record.district.clone(),
            cluster_id,
            longitude: lon,
            latitude: lat,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    type Partition = (BTreeSet<Vec<(u64, u64)>>, BTreeSet<(u64, u64)>);

    fn config(radius: f64, min_neighbors: usize) -> ClusterConfig {
        ClusterConfig::new(radius, min_neighbors).unwrap()
    }

    /// Clusters as sets of point bit patterns, plus the noise set.
    fn partition(points: &[[f64; 2]], labels: &[i64]) -> Partition {
        let mut clusters: BTreeMap<i64, Vec<(u64, u64)>> = BTreeMap::new();
        let mut noise = BTreeSet::new();
        for (p, &label) in points.iter().zip(labels) {
            let key = (p[0].to_bits(), p[1].to_bits());
            if label == NOISE {
                noise.insert(key);
            } else {
                clusters.entry(label).or_default().push(key);
            }
        }
        let clusters = clusters
            .into_values()
            .map(|mut members| {
                members.sort_unstable();
                members
            })
            .collect();
        (clusters, noise)
    }

    #[test]
    fn test_three_close_points_and_outlier() {
        let points = [[0.0, 0.0], [0.0, 0.001], [0.0, 0.0015], [5.0, 5.0]];
        let labels = label_points(&points, &config(0.002, 3));
        assert_ne!(labels[0], NOISE);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], NOISE);
    }

    #[test]
    fn test_border_point_does_not_extend_cluster() {
        // 0.9 is a border point of the core at 0.0; 1.8 is only reachable
        // through that border point.
        let points = [
            [-0.5, 0.0],
            [-0.5, 0.0],
            [-0.5, 0.0],
            [0.0, 0.0],
            [0.9, 0.0],
            [1.8, 0.0],
        ];
        let labels = label_points(&points, &config(1.0, 4));
        assert_ne!(labels[0], NOISE);
        assert_eq!(labels[3], labels[0]);
        assert_eq!(labels[4], labels[0]);
        assert_eq!(labels[5], NOISE);
    }

    #[test]
    fn test_separate_dense_regions() {
        let points = [
            [0.0, 0.0],
            [0.0, 0.1],
            [0.1, 0.0],
            [10.0, 10.0],
            [10.0, 10.1],
            [10.1, 10.0],
        ];
        let labels = label_points(&points, &config(0.5, 3));
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert!(labels.iter().all(|&l| l != NOISE));
    }

    #[test]
    fn test_min_neighbors_one_makes_every_point_a_cluster() {
        let points = [[0.0, 0.0], [3.0, 3.0]];
        let labels = label_points(&points, &config(0.1, 1));
        assert_ne!(labels[0], labels[1]);
        assert!(labels.iter().all(|&l| l != NOISE));
    }

    #[test]
    fn test_partition_ignores_input_order() {
        // [0.0, 0.0] is a border point equidistant from two clusters.
        let points = vec![
            [-0.9, 0.0],
            [-1.5, 0.0],
            [-1.6, 0.0],
            [-1.7, 0.0],
            [0.0, 0.0],
            [0.9, 0.0],
            [1.5, 0.0],
            [1.6, 0.0],
            [1.7, 0.0],
            [9.0, 9.0],
        ];
        let cfg = config(1.0, 4);
        let forward = label_points(&points, &cfg);
        assert_eq!(forward[4], forward[0]);
        assert_ne!(forward[0], forward[5]);

        let mut reversed = points.clone();
        reversed.reverse();
        let backward = label_points(&reversed, &cfg);

        assert_eq!(partition(&points, &forward), partition(&reversed, &backward));
    }

    #[test]
    fn test_repeat_runs_match() {
        let points: Vec<[f64; 2]> = (0..40)
            .map(|i| [(i % 7) as f64 * 0.001, (i / 7) as f64 * 0.0015])
            .collect();
        let cfg = ClusterConfig::default();
        assert_eq!(label_points(&points, &cfg), label_points(&points, &cfg));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(ClusterConfig::new(0.0, 5).is_err());
        assert!(ClusterConfig::new(-1.0, 5).is_err());
        assert!(ClusterConfig::new(f64::NAN, 5).is_err());
        assert!(ClusterConfig::new(0.002, 0).is_err());
    }

    #[test]
    fn test_records_without_coordinates_are_excluded() {
        let record = |lon: Option<f64>, lat: Option<f64>| AntennaRecord {
            operator: "A".to_string(),
            district: None,
            technology_label: "4G".to_string(),
            service_start: None,
            service_start_5g: None,
            longitude: lon,
            latitude: lat,
        };
        let records = vec![
            record(Some(1.0), Some(1.0)),
            record(None, Some(1.0)),
            record(Some(f64::NAN), Some(1.0)),
        ];
        let clustered = cluster_antennas(&records, &config(0.1, 1)).unwrap();
        assert_eq!(clustered.len(), 1);
        assert_eq!(clustered[0].cluster_id, 0);
        assert_eq!(clustered[0].district, None);
    }
}
