//! Silhouette scoring of a clustering.
//!
//! For a sample `a` in cluster `i`, cohesion is the mean distance to the
//! other members of `i` and separation is the smallest mean distance to the
//! members of any other non-empty cluster. The silhouette is
//! `(separation - cohesion) / max(cohesion, separation)`, always in `[-1, 1]`.

use crate::bgsep::sample_extraction::ColorSample;

/// Sum of distances from `sample` to every member of `group`, itself included.
fn total_distance(sample: ColorSample, group: &[ColorSample]) -> f64 {
    group.iter().map(|other| sample.distance(*other)).sum()
}

/// Silhouette coefficient of every sample, grouped like `groups`.
///
/// Singleton clusters score 0, as does any sample when there is no other
/// non-empty cluster to compare against.
pub fn silhouette_coefficients(groups: &[Vec<ColorSample>]) -> Vec<Vec<f64>> {
    groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            group
                .iter()
                .map(|&sample| {
                    if group.len() == 1 {
                        return 0.0;
                    }
                    // self-distance is zero, so this is the mean over the other members
                    let cohesion = total_distance(sample, group) / (group.len() - 1) as f64;
                    let separation = groups
                        .iter()
                        .enumerate()
                        .filter(|(j, other)| *j != i && !other.is_empty())
                        .map(|(_, other)| total_distance(sample, other) / other.len() as f64)
                        .fold(f64::INFINITY, f64::min);
                    if !separation.is_finite() {
                        return 0.0;
                    }
                    let scale = cohesion.max(separation);
                    if scale == 0.0 {
                        0.0
                    } else {
                        (separation - cohesion) / scale
                    }
                })
                .collect()
        })
        .collect()
}

/// Arithmetic mean of all silhouette coefficients, 0 for no samples.
pub fn mean_silhouette(groups: &[Vec<ColorSample>]) -> f64 {
    let coefficients = silhouette_coefficients(groups);
    let count: usize = coefficients.iter().map(Vec::len).sum();
    if count == 0 {
        return 0.0;
    }
    coefficients.iter().flatten().sum::<f64>() / count as f64
}
