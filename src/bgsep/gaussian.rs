use std::f64::consts::PI;

use crate::error::{record, Diagnostic, Error, Stage};
use crate::utils::{nearest_center, Mat3, Vec3};

/// Covariances whose determinant does not exceed this are treated as singular
pub const SINGULAR_DETERMINANT: f64 = 1e-9;

/// Ridge added to singular covariances before inversion
pub const DEFAULT_REGULARIZATION: f64 = 0.1;

/// Number of ×10 escalations tried when a ridge is not enough
const MAX_RIDGE_ESCALATIONS: usize = 6;

/// Learned background color distribution
///
/// Cluster identity is the index into the three parallel sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianMixtureModel {
    means: Vec<Vec3>,
    covariances: Vec<Mat3>,
    priors: Vec<f64>,
}

impl GaussianMixtureModel {
    /// Creates a model from per-cluster means, covariances and priors.
    ///
    /// # Errors
    ///
    /// * `Error::ModelShapeMismatch` - the sequences differ in length
    /// * `Error::InvalidParameter` - no clusters, or a negative or non-finite prior
    pub fn new(means: Vec<Vec3>, covariances: Vec<Mat3>, priors: Vec<f64>) -> Result<Self, Error> {
        if means.len() != covariances.len() || means.len() != priors.len() {
            return Err(Error::ModelShapeMismatch {
                means: means.len(),
                covariances: covariances.len(),
                priors: priors.len(),
            });
        }
        if means.is_empty() {
            return Err(Error::InvalidParameter(
                "mixture model needs at least one cluster".to_string(),
            ));
        }
        if let Some(prior) = priors.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(Error::InvalidParameter(format!(
                "mixture prior must be finite and non-negative, got {prior}"
            )));
        }
        Ok(Self {
            means,
            covariances,
            priors,
        })
    }

    /// Builds a model from parts already known to be consistent.
    pub(crate) fn from_parts(means: Vec<Vec3>, covariances: Vec<Mat3>, priors: Vec<f64>) -> Self {
        debug_assert!(means.len() == covariances.len() && means.len() == priors.len());
        Self {
            means,
            covariances,
            priors,
        }
    }

    pub fn cluster_count(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[Vec3] {
        &self.means
    }

    pub fn covariances(&self) -> &[Mat3] {
        &self.covariances
    }

    pub fn priors(&self) -> &[f64] {
        &self.priors
    }

    /// Precomputes inverses and normalizers for density evaluation.
    ///
    /// Singular covariances are regularized with `regularization · I`
    /// (escalated if needed); each such cluster is reported as a
    /// `SingularCovariance` diagnostic for `stage`.
    pub fn density(&self, regularization: f64, stage: Stage) -> MixtureDensity {
        let mut diagnostics = Vec::new();
        let (components, priors): (Vec<GaussianComponent>, Vec<f64>) = self
            .means
            .iter()
            .zip(&self.covariances)
            .zip(&self.priors)
            .enumerate()
            .map(|(cluster, ((&mean, covariance), &prior))| {
                let component = GaussianComponent::new(mean, covariance, regularization);
                if let Some(ridge) = component.regularization {
                    record(
                        &mut diagnostics,
                        Diagnostic::SingularCovariance {
                            stage,
                            cluster,
                            regularization: ridge,
                        },
                    );
                }
                (component, prior)
            })
            .unzip();
        MixtureDensity {
            components,
            priors,
            diagnostics,
        }
    }
}

/// A single multivariate normal distribution ready for evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianComponent {
    mean: Vec3,
    inverse: Mat3,
    /// `ln sqrt((2π)³ · det Σ)`
    log_normalizer: f64,
    /// Ridge that had to be added to make the covariance invertible
    regularization: Option<f64>,
}

impl GaussianComponent {
    pub fn new(mean: Vec3, covariance: &Mat3, regularization: f64) -> Self {
        let (covariance, ridge) = regularize(covariance, regularization);
        // regularize() only returns matrices with a positive determinant
        let inverse = covariance.inverse().unwrap_or(Mat3::IDENTITY);
        let determinant = covariance.determinant().max(f64::MIN_POSITIVE);
        Self {
            mean,
            inverse,
            log_normalizer: 0.5 * (3.0 * (2.0 * PI).ln() + determinant.ln()),
            regularization: ridge,
        }
    }

    pub fn mean(&self) -> Vec3 {
        self.mean
    }

    pub fn regularization(&self) -> Option<f64> {
        self.regularization
    }

    /// `-½ (x-μ)ᵀ Σ⁻¹ (x-μ) - ln sqrt((2π)³ det Σ)`
    pub fn log_density(&self, x: Vec3) -> f64 {
        -0.5 * self.inverse.quadratic_form(x - self.mean) - self.log_normalizer
    }

    pub fn density(&self, x: Vec3) -> f64 {
        self.log_density(x).exp()
    }
}

/// Returns an invertible version of `covariance` and the ridge added, if any.
fn regularize(covariance: &Mat3, regularization: f64) -> (Mat3, Option<f64>) {
    if is_invertible(covariance) {
        return (*covariance, None);
    }
    let base = if covariance.is_finite() {
        *covariance
    } else {
        Mat3::ZERO
    };
    let mut ridge = if regularization.is_finite() && regularization > 0.0 {
        regularization
    } else {
        DEFAULT_REGULARIZATION
    };
    for _ in 0..MAX_RIDGE_ESCALATIONS {
        let candidate = base.add_diagonal(ridge);
        if is_invertible(&candidate) {
            return (candidate, Some(ridge));
        }
        ridge *= 10.0;
    }
    (Mat3::IDENTITY.scale(ridge), Some(ridge))
}

fn is_invertible(covariance: &Mat3) -> bool {
    covariance.is_finite() && covariance.determinant() > SINGULAR_DETERMINANT
}

/// Weighted mixture of Gaussian components
#[derive(Debug, Clone)]
pub struct MixtureDensity {
    components: Vec<GaussianComponent>,
    priors: Vec<f64>,
    diagnostics: Vec<Diagnostic>,
}

impl MixtureDensity {
    pub fn components(&self) -> &[GaussianComponent] {
        &self.components
    }

    /// Singular covariances met while preparing the components
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// `Σ_c prior_c · N(x; μ_c, Σ_c)`
    pub fn density(&self, x: Vec3) -> f64 {
        self.components
            .iter()
            .zip(&self.priors)
            .map(|(component, prior)| prior * component.density(x))
            .sum()
    }

    /// Background when the mixture density strictly exceeds the flat reference.
    pub fn is_background(&self, x: Vec3, reference_density: f64) -> bool {
        self.density(x) > reference_density
    }

    /// Normalized posterior of every component for `x`.
    ///
    /// With `use_priors` unset all components are weighted equally.
    /// Normalization happens in the log domain so far-away samples do not
    /// underflow to a zero sum; if every component is impossible the
    /// sample goes entirely to its nearest mean.
    pub fn responsibilities(&self, x: Vec3, use_priors: bool) -> Vec<f64> {
        let log_weights: Vec<f64> = self
            .components
            .iter()
            .zip(&self.priors)
            .map(|(component, &prior)| {
                let log_prior = if use_priors { prior.ln() } else { 0.0 };
                log_prior + component.log_density(x)
            })
            .collect();

        let max = log_weights
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            let means: Vec<Vec3> = self.components.iter().map(GaussianComponent::mean).collect();
            let nearest = nearest_center(x, &means);
            return (0..self.components.len())
                .map(|c| if c == nearest { 1.0 } else { 0.0 })
                .collect();
        }

        let weights: Vec<f64> = log_weights.iter().map(|w| (w - max).exp()).collect();
        let total: f64 = weights.iter().sum();
        weights.into_iter().map(|w| w / total).collect()
    }
}
