use std::fmt;

use thiserror::Error;

/// Pipeline stage in which an error or diagnostic was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    KMeans,
    Covariance,
    Em,
    Classification,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KMeans => "k-means",
            Self::Covariance => "covariance estimation",
            Self::Em => "EM",
            Self::Classification => "classification",
        };
        f.write_str(name)
    }
}

/// Error type for background model fitting and classification
///
/// These failures end the current run. Numerical conditions the
/// algorithms recover from on their own are reported as [`Diagnostic`]s
/// instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The image has zero width or height
    ///
    /// This error is returned when sampling or classifying an image
    /// that contains no pixels at all.
    #[error("Image dimensions must be non-zero")]
    EmptyImage,

    /// Not enough non-sentinel pixels to run the requested clustering
    ///
    /// This error occurs when the reference background has fewer usable
    /// pixels than the largest candidate cluster count.
    #[error("Found {available} usable background samples, at least {required} required")]
    InsufficientSamples {
        /// Number of usable samples
        available: usize,
        /// Minimum number of samples needed
        required: usize,
    },

    /// Invalid parameter provided to the operation
    ///
    /// This error is returned when a threshold, cap or cluster count is
    /// invalid or outside the acceptable range for the operation.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Means, covariances and priors do not describe the same number of clusters
    ///
    /// This error occurs when a mixture model is assembled from
    /// sequences of different lengths.
    #[error("Mixture model shape mismatch: {means} means, {covariances} covariances, {priors} priors")]
    ModelShapeMismatch {
        /// Number of cluster means
        means: usize,
        /// Number of covariance matrices
        covariances: usize,
        /// Number of mixture priors
        priors: usize,
    },

    /// The run was cancelled through its [`CancellationFlag`](crate::CancellationFlag)
    ///
    /// The flag is checked once per k-means and EM iteration; the partial
    /// result of the interrupted loop is discarded.
    #[error("{stage} cancelled after {iterations} iterations")]
    Cancelled {
        /// Loop that observed the flag
        stage: Stage,
        /// Iterations completed before the flag was observed
        iterations: usize,
    },

    /// Loading or storing an image failed
    ///
    /// This error wraps decoding, encoding and file system failures
    /// reported by the `image` crate.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Recoverable numerical condition reported alongside a result
///
/// The value that comes with a diagnostic is still usable: degenerate
/// clusters keep their previous parameters, singular covariances are
/// regularized and non-converged loops return their last state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    /// A cluster received zero or one sample
    ///
    /// In k-means and EM the cluster keeps its previous parameters; in
    /// covariance estimation it gets a zero matrix.
    #[error("{stage}: cluster {cluster} is degenerate ({count} samples)")]
    DegenerateCluster {
        /// Stage that met the cluster
        stage: Stage,
        /// Cluster index
        cluster: usize,
        /// Samples assigned to the cluster
        count: usize,
    },

    /// A covariance matrix was not invertible and was regularized
    ///
    /// This diagnostic is raised when a covariance is non-finite or its
    /// determinant is too small, and a ridge was added before evaluation.
    #[error("{stage}: covariance of cluster {cluster} is singular, added {regularization}·I")]
    SingularCovariance {
        /// Stage that evaluated the density
        stage: Stage,
        /// Cluster index
        cluster: usize,
        /// Ridge added to the diagonal
        regularization: f64,
    },

    /// An iterative loop hit its iteration cap before its drift threshold
    ///
    /// The returned state is the one after the last iteration.
    #[error("{stage} did not converge after {iterations} iterations (drift {drift})")]
    NonConvergence {
        /// Loop that hit its cap
        stage: Stage,
        /// Iterations performed
        iterations: usize,
        /// Drift of the last iteration
        drift: f64,
    },
}

/// Appends `diagnostic` unless an identical one is already recorded.
pub(crate) fn record(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    if !diagnostics.contains(&diagnostic) {
        log::warn!("{diagnostic}");
        diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_skips_duplicates() {
        let mut diagnostics = Vec::new();
        let degenerate = Diagnostic::DegenerateCluster {
            stage: Stage::KMeans,
            cluster: 1,
            count: 0,
        };
        record(&mut diagnostics, degenerate.clone());
        record(&mut diagnostics, degenerate);
        record(
            &mut diagnostics,
            Diagnostic::DegenerateCluster {
                stage: Stage::Em,
                cluster: 1,
                count: 0,
            },
        );
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn messages_name_the_stage() {
        let error = Error::Cancelled {
            stage: Stage::Em,
            iterations: 3,
        };
        assert_eq!(error.to_string(), "EM cancelled after 3 iterations");

        let diagnostic = Diagnostic::NonConvergence {
            stage: Stage::KMeans,
            iterations: 10,
            drift: 0.5,
        };
        assert!(diagnostic.to_string().starts_with("k-means did not converge"));
    }
}
