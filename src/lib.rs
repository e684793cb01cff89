//! Background color separation without a fixed chroma key.
//!
//! A reference photo of the background, with its foreground blotted out in
//! a sentinel color, is turned into a Gaussian mixture model of background
//! colors: samples are extracted, clustered with k-means (farthest-point
//! seeding, silhouette scoring), and refined with Expectation-Maximization.
//! Pixels of a target image are then classified by comparing the mixture
//! density against a flat reference density.

mod bgsep;
mod error;
mod io;
#[cfg(test)]
mod test_utils;
mod utils;

use image::{ImageBuffer, Pixel};

pub use bgsep::cancellation::CancellationFlag;
pub use bgsep::classifier::{
    background_fraction, BackgroundClassifier, ClassifierParams, BACKGROUND,
    FLAT_REFERENCE_DENSITY, FOREGROUND,
};
pub use bgsep::covariance::{estimate_covariances, CovarianceEstimate};
pub use bgsep::em::{em_step, fit_em, is_converged, EmFit, EmParams, EmStep};
pub use bgsep::gaussian::{
    GaussianComponent, GaussianMixtureModel, MixtureDensity, DEFAULT_REGULARIZATION,
    SINGULAR_DETERMINANT,
};
pub use bgsep::kmeans::{kmeans_step, run_kmeans, KMeansFit, KMeansParams, KMeansStep, Partition};
pub use bgsep::pipeline::{fit_samples, BackgroundFit, BackgroundModelConfig, FitBackgroundModel};
pub use bgsep::sample_extraction::{ColorSample, SampleExtractor, SampleSet};
pub use bgsep::seeding::{seed_centers, MAX_SEED_CANDIDATES, MIN_SEED_CANDIDATES, SEED_DISTANCE_FLOOR};
pub use bgsep::silhouette::{mean_silhouette, silhouette_coefficients};
pub use error::{Diagnostic, Error, Stage};
pub use io::{load_rgb_image, store_mask, store_rgb_image};
pub use utils::{Mat3, Vec3};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
