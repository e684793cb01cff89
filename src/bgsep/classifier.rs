use crate::bgsep::gaussian::{GaussianMixtureModel, MixtureDensity, DEFAULT_REGULARIZATION};
use crate::error::{Error, Stage};
use crate::utils::{validate_non_empty_image, validate_positive, Vec3};
use crate::Image;
use image::{Luma, Rgb};
use imageproc::map::map_colors;

/// Flat density of a color drawn uniformly from the 8-bit RGB cube
pub const FLAT_REFERENCE_DENSITY: f64 = 1.0 / (255.0 * 255.0 * 255.0);

/// Mask value for background pixels
pub const BACKGROUND: Luma<u8> = Luma([255]);

/// Mask value for foreground pixels
pub const FOREGROUND: Luma<u8> = Luma([0]);

/// Settings for the background/foreground decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierParams {
    /// Density of the foreground alternative hypothesis
    pub reference_density: f64,
    /// Ridge added to singular covariances before evaluation
    pub regularization: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            reference_density: FLAT_REFERENCE_DENSITY,
            regularization: DEFAULT_REGULARIZATION,
        }
    }
}

impl ClassifierParams {
    fn prepare(&self, model: &GaussianMixtureModel) -> Result<MixtureDensity, Error> {
        validate_positive(self.reference_density, "reference density")?;
        validate_positive(self.regularization, "regularization")?;
        Ok(model.density(self.regularization, Stage::Classification))
    }
}

/// Per-pixel background classification against a fitted mixture
///
/// A pixel is background when `Σ_c prior_c · N(pixel; μ_c, Σ_c)` is strictly
/// greater than the reference density. This is a plain two-hypothesis
/// likelihood comparison with a uniform foreground model, not a calibrated
/// posterior.
pub trait BackgroundClassifier {
    /// Returns a mask with [`BACKGROUND`] and [`FOREGROUND`] values.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - The image has zero width or height
    /// * `Error::InvalidParameter` - non-positive reference density or regularization
    fn classify_background(
        &self,
        model: &GaussianMixtureModel,
        params: &ClassifierParams,
    ) -> Result<Image<Luma<u8>>, Error>;

    /// Returns a copy of the image with every foreground pixel replaced by `marker`.
    ///
    /// # Errors
    ///
    /// Same as [`classify_background`](Self::classify_background).
    fn mark_foreground(
        &self,
        model: &GaussianMixtureModel,
        params: &ClassifierParams,
        marker: Rgb<u8>,
    ) -> Result<Image<Rgb<u8>>, Error>;
}

impl BackgroundClassifier for Image<Rgb<u8>> {
    fn classify_background(
        &self,
        model: &GaussianMixtureModel,
        params: &ClassifierParams,
    ) -> Result<Image<Luma<u8>>, Error> {
        validate_non_empty_image(self.width(), self.height())?;
        let density = params.prepare(model)?;

        Ok(map_colors(self, |pixel| {
            if density.is_background(Vec3::from(pixel), params.reference_density) {
                BACKGROUND
            } else {
                FOREGROUND
            }
        }))
    }

    fn mark_foreground(
        &self,
        model: &GaussianMixtureModel,
        params: &ClassifierParams,
        marker: Rgb<u8>,
    ) -> Result<Image<Rgb<u8>>, Error> {
        validate_non_empty_image(self.width(), self.height())?;
        let density = params.prepare(model)?;

        Ok(map_colors(self, |pixel| {
            if density.is_background(Vec3::from(pixel), params.reference_density) {
                pixel
            } else {
                marker
            }
        }))
    }
}

/// Share of mask pixels classified as background.
pub fn background_fraction(mask: &Image<Luma<u8>>) -> f64 {
    let total = mask.width() as usize * mask.height() as usize;
    if total == 0 {
        return 0.0;
    }
    let background = mask.pixels().filter(|p| **p == BACKGROUND).count();
    background as f64 / total as f64
}
