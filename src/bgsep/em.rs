//! Expectation-Maximization refinement of a Gaussian mixture.
//!
//! Every iteration builds a fresh [`GaussianMixtureModel`] from the
//! previous one; nothing is mutated in place, so a single iteration can be
//! run and inspected on its own through [`em_step`].

use crate::bgsep::cancellation::{self, CancellationFlag};
use crate::bgsep::covariance::scatter;
use crate::bgsep::gaussian::{GaussianMixtureModel, DEFAULT_REGULARIZATION};
use crate::bgsep::sample_extraction::ColorSample;
use crate::error::{record, Diagnostic, Error, Stage};
use crate::utils::{validate_positive, Vec3};

/// Clusters whose total responsibility falls below this keep their parameters
const MIN_CLUSTER_WEIGHT: f64 = 1e-9;

/// Stopping rule and numerical settings for EM
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmParams {
    /// Converged once the mean drift of the cluster means is strictly below this
    pub threshold: f64,
    /// Iteration cap; reaching it yields a `NonConvergence` diagnostic
    pub max_iterations: usize,
    /// Ridge added to singular covariances in the expectation step
    pub regularization: f64,
    /// Weight responsibilities by the mixture priors
    pub track_priors: bool,
}

impl Default for EmParams {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            max_iterations: 100,
            regularization: DEFAULT_REGULARIZATION,
            track_priors: true,
        }
    }
}

impl EmParams {
    fn validate(&self) -> Result<(), Error> {
        validate_positive(self.threshold, "EM threshold")?;
        validate_positive(self.regularization, "EM regularization")?;
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter(
                "EM max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Drift test shared by the EM loop; equality does not count as converged.
#[inline]
pub fn is_converged(drift: f64, threshold: f64) -> bool {
    drift < threshold
}

/// Result of one expectation/maximization pass
#[derive(Debug, Clone)]
pub struct EmStep {
    pub model: GaussianMixtureModel,
    /// Mean distance the cluster means moved
    pub drift: f64,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs one expectation and one maximization step.
///
/// Priors of the returned model sum to 1. Without prior tracking they are
/// uniform.
///
/// # Errors
///
/// * `Error::InsufficientSamples` - no samples
pub fn em_step(
    samples: &[ColorSample],
    model: &GaussianMixtureModel,
    params: &EmParams,
) -> Result<EmStep, Error> {
    if samples.is_empty() {
        return Err(Error::InsufficientSamples {
            available: 0,
            required: 1,
        });
    }
    let n = model.cluster_count();
    let density = model.density(params.regularization, Stage::Em);
    let mut diagnostics = density.diagnostics().to_vec();

    // expectation
    let responsibilities: Vec<Vec<f64>> = samples
        .iter()
        .map(|&sample| density.responsibilities(sample, params.track_priors))
        .collect();

    // maximization
    let mut means = Vec::with_capacity(n);
    let mut covariances = Vec::with_capacity(n);
    let mut priors = Vec::with_capacity(n);
    for c in 0..n {
        let weight: f64 = responsibilities.iter().map(|r| r[c]).sum();
        priors.push(if params.track_priors {
            weight / samples.len() as f64
        } else {
            1.0 / n as f64
        });

        if weight < MIN_CLUSTER_WEIGHT {
            record(
                &mut diagnostics,
                Diagnostic::DegenerateCluster {
                    stage: Stage::Em,
                    cluster: c,
                    count: 0,
                },
            );
            means.push(model.means()[c]);
            covariances.push(model.covariances()[c]);
            continue;
        }

        let mean = samples
            .iter()
            .zip(&responsibilities)
            .fold(Vec3::ZERO, |acc, (&sample, r)| acc + sample * r[c])
            / weight;
        let covariance = scatter(
            samples
                .iter()
                .zip(&responsibilities)
                .map(|(&sample, r)| (sample - mean, r[c])),
        )
        .scale(1.0 / weight);

        means.push(mean);
        covariances.push(covariance);
    }

    let drift = model
        .means()
        .iter()
        .zip(&means)
        .map(|(old, new)| old.distance(*new))
        .sum::<f64>()
        / n as f64;

    Ok(EmStep {
        model: GaussianMixtureModel::from_parts(means, covariances, priors),
        drift,
        diagnostics,
    })
}

/// Refined mixture model and how the refinement went
#[derive(Debug, Clone)]
pub struct EmFit {
    pub model: GaussianMixtureModel,
    pub iterations: usize,
    pub converged: bool,
    /// Drift of the last iteration
    pub drift: f64,
    pub diagnostics: Vec<Diagnostic>,
}

/// Iterates [`em_step`] from `initial` until the mean drift falls below the threshold.
///
/// # Errors
///
/// * `Error::InvalidParameter` - invalid params
/// * `Error::InsufficientSamples` - no samples
/// * `Error::Cancelled` - the cancellation flag was set
pub fn fit_em(
    samples: &[ColorSample],
    initial: GaussianMixtureModel,
    params: &EmParams,
    cancel: Option<&CancellationFlag>,
) -> Result<EmFit, Error> {
    params.validate()?;
    if samples.is_empty() {
        return Err(Error::InsufficientSamples {
            available: 0,
            required: 1,
        });
    }
    log::info!("EM algorithm with {} clusters", initial.cluster_count());

    let mut model = initial;
    let mut diagnostics = Vec::new();
    let mut iterations = 0;
    let mut drift = f64::INFINITY;
    let mut converged = false;

    while iterations < params.max_iterations {
        cancellation::check(cancel, Stage::Em, iterations)?;
        let step = em_step(samples, &model, params)?;
        iterations += 1;

        for diagnostic in step.diagnostics {
            record(&mut diagnostics, diagnostic);
        }
        model = step.model;
        drift = step.drift;
        log::debug!(
            "EM iteration {iterations}: drift {drift}, priors {:?}",
            model.priors()
        );

        if is_converged(drift, params.threshold) {
            converged = true;
            break;
        }
    }

    if !converged {
        record(
            &mut diagnostics,
            Diagnostic::NonConvergence {
                stage: Stage::Em,
                iterations,
                drift,
            },
        );
    }

    Ok(EmFit {
        model,
        iterations,
        converged,
        drift,
        diagnostics,
    })
}
