use crate::bgsep::sample_extraction::ColorSample;
use crate::error::{record, Diagnostic, Error, Stage};
use crate::utils::{Mat3, Vec3};

/// Per-cluster covariances together with the conditions met while estimating them
#[derive(Debug, Clone)]
pub struct CovarianceEstimate {
    pub covariances: Vec<Mat3>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Unbiased empirical covariance of each group about its own center.
///
/// `Cov[y][x] = Σ (s[y] - c[y]) · (s[x] - c[x]) / (count - 1)`
///
/// Groups with fewer than two members have no unbiased estimate; they get
/// a zero matrix and a `DegenerateCluster` diagnostic. Singular results
/// are regularized later, when densities are evaluated.
///
/// # Errors
///
/// * `Error::InvalidParameter` - `groups` and `centers` differ in length
pub fn estimate_covariances(
    groups: &[Vec<ColorSample>],
    centers: &[Vec3],
) -> Result<CovarianceEstimate, Error> {
    if groups.len() != centers.len() {
        return Err(Error::InvalidParameter(format!(
            "{} sample groups for {} centers",
            groups.len(),
            centers.len()
        )));
    }

    let mut diagnostics = Vec::new();
    let covariances = groups
        .iter()
        .zip(centers)
        .enumerate()
        .map(|(cluster, (group, &center))| {
            if group.len() < 2 {
                record(
                    &mut diagnostics,
                    Diagnostic::DegenerateCluster {
                        stage: Stage::Covariance,
                        cluster,
                        count: group.len(),
                    },
                );
                return Mat3::ZERO;
            }
            scatter(group.iter().map(|&sample| (sample - center, 1.0)))
                .scale(1.0 / (group.len() - 1) as f64)
        })
        .collect();

    Ok(CovarianceEstimate {
        covariances,
        diagnostics,
    })
}

/// Weighted scatter matrix `Σ w · d · dᵀ` of centered samples.
///
/// Only the upper triangle is accumulated and then mirrored, so the
/// result is exactly symmetric.
pub(crate) fn scatter<I>(deviations: I) -> Mat3
where
    I: IntoIterator<Item = (Vec3, f64)>,
{
    let mut m = [[0.0; 3]; 3];
    for (d, weight) in deviations {
        for y in 0..3 {
            for x in y..3 {
                m[y][x] += weight * d[y] * d[x];
            }
        }
    }
    Mat3(m).mirror_upper()
}
