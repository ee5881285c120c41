//! One-dimensional k-means over district averages
//!
//! Deterministic heuristic clustering: centroids start evenly spaced over
//! the value range, points join the nearest centroid by absolute distance,
//! and iteration stops once assignments stop changing (or after 100
//! passes). Quality is reported as inertia and mean silhouette score.

use crate::constants::{clustering, precision};
use crate::error::{Error, Result};
use crate::stats::round_to;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw k-means output
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    /// Cluster id per input value, in input order
    pub assignments: Vec<usize>,
    pub centroids: Vec<f64>,
    /// Within-cluster sum of squared distances
    pub inertia: f64,
    /// Assignment passes performed
    pub iterations: usize,
}

/// Number of clusters for `n` districts: `clamp(floor(n / 3), 2, 5)`
pub fn cluster_count(n: usize) -> usize {
    (n / 3).clamp(clustering::MIN_CLUSTERS, clustering::MAX_CLUSTERS)
}

/// Cluster scalar values into `k` groups
///
/// # Errors
/// [`Error::Precondition`] if fewer than two values are given or `k < 2`.
pub fn kmeans_1d(values: &[f64], k: usize) -> Result<KMeansResult> {
    if values.len() < 2 {
        return Err(Error::Precondition(format!(
            "clustering needs at least 2 values, got {}",
            values.len()
        )));
    }
    if k < clustering::MIN_CLUSTERS {
        return Err(Error::Precondition(format!(
            "clustering needs k >= {}, got {}",
            clustering::MIN_CLUSTERS,
            k
        )));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let last = (k - 1) as f64;
    let mut centroids: Vec<f64> = (0..k)
        .map(|i| min + (max - min) * (i as f64 / last))
        .collect();

    let mut assignments = vec![0usize; values.len()];
    let mut iterations = 0;

    for _ in 0..clustering::MAX_ITERATIONS {
        iterations += 1;
        let next: Vec<usize> = values.iter().map(|v| nearest(*v, &centroids)).collect();

        if next == assignments {
            break;
        }
        assignments = next;

        for (cluster, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<f64> = values
                .iter()
                .zip(&assignments)
                .filter(|(_, a)| **a == cluster)
                .map(|(v, _)| *v)
                .collect();

            // Empty clusters keep their previous centroid
            if !members.is_empty() {
                *centroid = members.iter().sum::<f64>() / members.len() as f64;
            }
        }
    }

    let inertia = values
        .iter()
        .zip(&assignments)
        .map(|(v, a)| (v - centroids[*a]).powi(2))
        .sum();

    Ok(KMeansResult {
        assignments,
        centroids,
        inertia,
        iterations,
    })
}

/// Index of the nearest centroid; ties go to the lower index
fn nearest(value: f64, centroids: &[f64]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::MAX;
    for (j, c) in centroids.iter().enumerate() {
        let distance = (value - c).abs();
        if distance < best_distance {
            best_distance = distance;
            best = j;
        }
    }
    best
}

/// Mean silhouette score of a clustering
///
/// For each point, `a` is the mean distance to the other members of its
/// cluster and `b` the smallest mean distance to any other occupied
/// cluster; the point scores `(b - a) / max(a, b)`, or 0 if both are 0.
pub fn silhouette_score(values: &[f64], assignments: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut occupied: Vec<usize> = assignments.to_vec();
    occupied.sort_unstable();
    occupied.dedup();

    let scores: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let own = assignments[i];

            let a = mean_distance(
                values
                    .iter()
                    .zip(assignments)
                    .enumerate()
                    .filter(|(j, (_, c))| *j != i && **c == own)
                    .map(|(_, (v, _))| *v),
                value,
            );

            let b = occupied
                .iter()
                .filter(|c| **c != own)
                .filter_map(|cluster| {
                    let members = values
                        .iter()
                        .zip(assignments)
                        .filter(|(_, c)| *c == cluster)
                        .map(|(v, _)| *v);
                    let d = mean_distance(members, value);
                    d.is_finite().then_some(d)
                })
                .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.min(d))))
                .unwrap_or(0.0);

            let a = if a.is_finite() { a } else { 0.0 };
            let denom = a.max(b);
            if denom > 0.0 {
                (b - a) / denom
            } else {
                0.0
            }
        })
        .collect();

    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Mean |x - value| over `others`; NaN when `others` is empty
fn mean_distance(others: impl Iterator<Item = f64>, value: f64) -> f64 {
    let (sum, n) = others.fold((0.0, 0usize), |(s, n), x| (s + (value - x).abs(), n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Average emission of a district, the clustering input
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictAverage {
    pub district: String,
    pub average: f64,
    pub std: f64,
    pub sample_count: usize,
}

/// A district and the cluster it joined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub district: String,
    pub average_value: f64,
    pub std: f64,
    pub sample_count: usize,
    pub cluster_id: usize,
}

/// Summary of one cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub cluster_id: usize,
    pub centroid: f64,
    pub size: usize,
}

/// Clustering of a state's districts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringReport {
    pub state: String,
    pub district_clusters: Vec<ClusterAssignment>,
    pub clusters: Vec<ClusterInfo>,
    pub n_clusters: usize,
    pub inertia: f64,
    pub silhouette_score: f64,
    pub iterations: usize,
    pub generated_at: DateTime<Utc>,
}

/// Cluster districts by their average emission
///
/// Districts are reported in the order given. `k` is derived from the
/// district count with [`cluster_count`].
pub fn cluster_districts(state: &str, districts: &[DistrictAverage]) -> Result<ClusteringReport> {
    let values: Vec<f64> = districts.iter().map(|d| d.average).collect();
    let k = cluster_count(values.len());
    let result = kmeans_1d(&values, k)?;
    let silhouette = silhouette_score(&values, &result.assignments);

    let r = |v: f64| round_to(v, precision::VALUE_DECIMALS);

    let district_clusters = districts
        .iter()
        .zip(&result.assignments)
        .map(|(d, cluster)| ClusterAssignment {
            district: d.district.clone(),
            average_value: r(d.average),
            std: r(d.std),
            sample_count: d.sample_count,
            cluster_id: *cluster,
        })
        .collect();

    let clusters = result
        .centroids
        .iter()
        .enumerate()
        .map(|(id, centroid)| ClusterInfo {
            cluster_id: id,
            centroid: r(*centroid),
            size: result.assignments.iter().filter(|a| **a == id).count(),
        })
        .collect();

    Ok(ClusteringReport {
        state: state.to_string(),
        district_clusters,
        clusters,
        n_clusters: k,
        inertia: r(result.inertia),
        silhouette_score: r(silhouette),
        iterations: result.iterations,
        generated_at: Utc::now(),
    })
}
