use crate::bgsep::cancellation::CancellationFlag;
use crate::bgsep::covariance::estimate_covariances;
use crate::bgsep::em::{fit_em, EmParams};
use crate::bgsep::gaussian::GaussianMixtureModel;
use crate::bgsep::kmeans::{run_kmeans, KMeansFit, KMeansParams};
use crate::bgsep::sample_extraction::{ColorSample, SampleExtractor};
use crate::bgsep::seeding::seed_centers;
use crate::bgsep::silhouette::mean_silhouette;
use crate::error::{record, Diagnostic, Error};
use crate::Image;
use image::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for learning a background model
#[derive(Debug, Clone)]
pub struct BackgroundModelConfig {
    /// Color that marks blotted-out foreground in the reference image
    pub sentinel: Rgb<u8>,
    /// Maximum number of samples kept after shuffling
    pub sample_cap: usize,
    /// Cluster counts to try; the best silhouette wins
    pub cluster_counts: Vec<usize>,
    /// k-means runs per cluster count, each with fresh seeds
    pub repetitions: usize,
    pub kmeans: KMeansParams,
    pub em: EmParams,
    /// Seed for sampling and k-means seeding; `None` draws from entropy
    pub seed: Option<u64>,
    pub cancellation: Option<CancellationFlag>,
}

impl Default for BackgroundModelConfig {
    fn default() -> Self {
        Self {
            sentinel: Rgb([255, 0, 0]),
            sample_cap: 2000,
            cluster_counts: vec![2],
            repetitions: 1,
            kmeans: KMeansParams::default(),
            em: EmParams::default(),
            seed: None,
            cancellation: None,
        }
    }
}

impl BackgroundModelConfig {
    pub fn with_sentinel(mut self, sentinel: Rgb<u8>) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn with_sample_cap(mut self, sample_cap: usize) -> Self {
        self.sample_cap = sample_cap;
        self
    }

    pub fn with_cluster_counts(mut self, cluster_counts: Vec<usize>) -> Self {
        self.cluster_counts = cluster_counts;
        self
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_kmeans(mut self, kmeans: KMeansParams) -> Self {
        self.kmeans = kmeans;
        self
    }

    pub fn with_em(mut self, em: EmParams) -> Self {
        self.em = em;
        self
    }

    pub fn with_track_priors(mut self, track_priors: bool) -> Self {
        self.em.track_priors = track_priors;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    fn validate(&self, available: usize) -> Result<(), Error> {
        let Some(&largest) = self.cluster_counts.iter().max() else {
            return Err(Error::InvalidParameter(
                "at least one cluster count is required".to_string(),
            ));
        };
        if self.cluster_counts.contains(&0) {
            return Err(Error::InvalidParameter(
                "cluster counts must be at least 1".to_string(),
            ));
        }
        if self.repetitions == 0 {
            return Err(Error::InvalidParameter(
                "repetitions must be at least 1".to_string(),
            ));
        }
        if available < largest {
            return Err(Error::InsufficientSamples {
                available,
                required: largest,
            });
        }
        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Fitted background model and how it was obtained
#[derive(Debug, Clone)]
pub struct BackgroundFit {
    pub model: GaussianMixtureModel,
    /// Mean silhouette of the k-means run the model was seeded from
    pub silhouette: f64,
    pub sample_count: usize,
    pub kmeans_iterations: usize,
    pub em_iterations: usize,
    /// Whether both k-means and EM met their drift thresholds
    pub converged: bool,
    /// Recoverable conditions met along the way
    pub diagnostics: Vec<Diagnostic>,
}

impl BackgroundFit {
    pub fn cluster_count(&self) -> usize {
        self.model.cluster_count()
    }
}

/// Learns a background model from an already extracted sample set.
///
/// Every candidate cluster count is clustered `repetitions` times; the run
/// with the strictly best mean silhouette seeds the covariance estimate
/// and the EM refinement.
///
/// # Errors
///
/// * `Error::InvalidParameter` - invalid configuration
/// * `Error::InsufficientSamples` - fewer samples than the largest cluster count
/// * `Error::Cancelled` - the cancellation flag was set
pub fn fit_samples<R>(
    samples: &[ColorSample],
    config: &BackgroundModelConfig,
    rng: &mut R,
) -> Result<BackgroundFit, Error>
where
    R: Rng + ?Sized,
{
    config.validate(samples.len())?;
    let cancel = config.cancellation.as_ref();

    let mut best: Option<(KMeansFit, f64)> = None;
    for &k in &config.cluster_counts {
        for _ in 0..config.repetitions {
            let initial = seed_centers(samples, k, rng)?;
            let fit = run_kmeans(samples, initial, &config.kmeans, cancel)?;
            let silhouette = mean_silhouette(&fit.partition.groups(samples));
            log::info!("average silhouette for n = {k} is {silhouette}");
            if best.as_ref().map_or(true, |(_, score)| silhouette > *score) {
                best = Some((fit, silhouette));
            }
        }
    }
    let (kmeans, silhouette) = best.ok_or_else(|| {
        Error::InvalidParameter("no clustering run was performed".to_string())
    })?;
    let k = kmeans.centers.len();
    log::info!("selected {k} clusters (silhouette {silhouette})");

    let mut diagnostics = kmeans.diagnostics.clone();
    let estimate = estimate_covariances(&kmeans.partition.groups(samples), &kmeans.centers)?;
    for diagnostic in estimate.diagnostics {
        record(&mut diagnostics, diagnostic);
    }

    // unnormalized unit priors; the first maximization step normalizes them
    let initial = GaussianMixtureModel::new(kmeans.centers, estimate.covariances, vec![1.0; k])?;
    let em = fit_em(samples, initial, &config.em, cancel)?;
    for diagnostic in em.diagnostics {
        record(&mut diagnostics, diagnostic);
    }
    log::info!(
        "EM finished after {} iterations (converged: {})",
        em.iterations,
        em.converged
    );

    Ok(BackgroundFit {
        model: em.model,
        silhouette,
        sample_count: samples.len(),
        kmeans_iterations: kmeans.iterations,
        em_iterations: em.iterations,
        converged: kmeans.converged && em.converged,
        diagnostics,
    })
}

/// Learning a background model from a reference image
pub trait FitBackgroundModel {
    /// Extracts samples and fits a model, seeding randomness from `config.seed`.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - The image has zero width or height
    /// * `Error::InsufficientSamples` - too few non-sentinel pixels
    /// * any error of [`fit_samples`]
    fn fit_background_model(&self, config: &BackgroundModelConfig) -> Result<BackgroundFit, Error>;

    /// Same as [`fit_background_model`](Self::fit_background_model) with a caller-provided generator.
    fn fit_background_model_with_rng<R>(
        &self,
        config: &BackgroundModelConfig,
        rng: &mut R,
    ) -> Result<BackgroundFit, Error>
    where
        R: Rng + ?Sized;
}

impl FitBackgroundModel for Image<Rgb<u8>> {
    fn fit_background_model(&self, config: &BackgroundModelConfig) -> Result<BackgroundFit, Error> {
        let mut rng = config.rng();
        self.fit_background_model_with_rng(config, &mut rng)
    }

    fn fit_background_model_with_rng<R>(
        &self,
        config: &BackgroundModelConfig,
        rng: &mut R,
    ) -> Result<BackgroundFit, Error>
    where
        R: Rng + ?Sized,
    {
        let samples = self.extract_samples(config.sentinel, config.sample_cap, rng)?;
        fit_samples(&samples, config, rng)
    }
}
