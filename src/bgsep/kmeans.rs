use crate::bgsep::cancellation::{self, CancellationFlag};
use crate::bgsep::sample_extraction::ColorSample;
use crate::error::{record, Diagnostic, Error, Stage};
use crate::utils::{nearest_center, validate_cluster_count, validate_positive, Vec3};

/// Stopping rule for Lloyd iterations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    /// Converged once the mean center displacement is strictly below this
    pub threshold: f64,
    /// Iteration cap; reaching it yields a `NonConvergence` diagnostic
    pub max_iterations: usize,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            threshold: 0.01,
            max_iterations: 300,
        }
    }
}

impl KMeansParams {
    fn validate(&self) -> Result<(), Error> {
        validate_positive(self.threshold, "k-means threshold")?;
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter(
                "k-means max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Assignment of every sample to exactly one cluster index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    labels: Vec<usize>,
    cluster_count: usize,
}

impl Partition {
    /// Assigns every sample to its nearest center, ties to the lowest index.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - `centers` is empty
    pub fn assign(samples: &[ColorSample], centers: &[Vec3]) -> Result<Self, Error> {
        if centers.is_empty() {
            return Err(Error::InvalidParameter(
                "at least one center is required".to_string(),
            ));
        }
        Ok(Self {
            labels: samples
                .iter()
                .map(|sample| nearest_center(*sample, centers))
                .collect(),
            cluster_count: centers.len(),
        })
    }

    /// Cluster index per sample, in sample order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of samples assigned to each cluster.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.cluster_count];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }

    /// Samples grouped by cluster; empty clusters yield empty groups.
    pub fn groups(&self, samples: &[ColorSample]) -> Vec<Vec<ColorSample>> {
        let mut groups = vec![Vec::new(); self.cluster_count];
        for (sample, &label) in samples.iter().zip(&self.labels) {
            groups[label].push(*sample);
        }
        groups
    }
}

/// Result of one assignment/update pass
#[derive(Debug, Clone)]
pub struct KMeansStep {
    pub centers: Vec<Vec3>,
    /// Assignment against the centers the pass started from
    pub partition: Partition,
    /// Mean displacement over clusters that received samples
    pub drift: f64,
    /// Clusters that received no samples and kept their previous center
    pub empty_clusters: Vec<usize>,
}

/// Runs one Lloyd iteration.
///
/// A cluster that attracts no samples keeps its previous center and is
/// left out of the drift average.
///
/// # Errors
///
/// * `Error::InvalidParameter` - `centers` is empty
pub fn kmeans_step(samples: &[ColorSample], centers: &[Vec3]) -> Result<KMeansStep, Error> {
    let partition = Partition::assign(samples, centers)?;

    let mut sums = vec![Vec3::ZERO; centers.len()];
    let mut counts = vec![0usize; centers.len()];
    for (sample, &label) in samples.iter().zip(partition.labels()) {
        sums[label] += *sample;
        counts[label] += 1;
    }

    let mut new_centers = Vec::with_capacity(centers.len());
    let mut empty_clusters = Vec::new();
    let mut displacement = 0.0;
    let mut active = 0usize;
    for (i, (&previous, (sum, count))) in centers.iter().zip(sums.into_iter().zip(counts)).enumerate()
    {
        if count == 0 {
            empty_clusters.push(i);
            new_centers.push(previous);
            continue;
        }
        let center = sum / count as f64;
        displacement += previous.distance(center);
        active += 1;
        new_centers.push(center);
    }

    let drift = if active > 0 {
        displacement / active as f64
    } else {
        0.0
    };

    Ok(KMeansStep {
        centers: new_centers,
        partition,
        drift,
        empty_clusters,
    })
}

/// Converged k-means state
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub centers: Vec<Vec3>,
    /// Assignment against the final centers
    pub partition: Partition,
    pub iterations: usize,
    pub converged: bool,
    /// Drift of the last iteration
    pub drift: f64,
    pub diagnostics: Vec<Diagnostic>,
}

/// Iterates [`kmeans_step`] from `initial` until the drift falls below the threshold.
///
/// # Errors
///
/// * `Error::InvalidParameter` - invalid params or no initial centers
/// * `Error::InsufficientSamples` - fewer samples than centers
/// * `Error::Cancelled` - the cancellation flag was set
pub fn run_kmeans(
    samples: &[ColorSample],
    initial: Vec<Vec3>,
    params: &KMeansParams,
    cancel: Option<&CancellationFlag>,
) -> Result<KMeansFit, Error> {
    params.validate()?;
    validate_cluster_count(initial.len(), samples.len())?;

    let mut centers = initial;
    let mut diagnostics = Vec::new();
    let mut iterations = 0;
    let mut drift = f64::INFINITY;
    let mut converged = false;

    while iterations < params.max_iterations {
        cancellation::check(cancel, Stage::KMeans, iterations)?;
        let step = kmeans_step(samples, &centers)?;
        iterations += 1;

        for cluster in step.empty_clusters {
            record(
                &mut diagnostics,
                Diagnostic::DegenerateCluster {
                    stage: Stage::KMeans,
                    cluster,
                    count: 0,
                },
            );
        }
        centers = step.centers;
        drift = step.drift;
        log::debug!("k-means iteration {iterations}: drift {drift}");

        if drift < params.threshold {
            converged = true;
            break;
        }
    }

    if !converged {
        record(
            &mut diagnostics,
            Diagnostic::NonConvergence {
                stage: Stage::KMeans,
                iterations,
                drift,
            },
        );
    }

    let partition = Partition::assign(samples, &centers)?;
    Ok(KMeansFit {
        centers,
        partition,
        iterations,
        converged,
        drift,
        diagnostics,
    })
}
