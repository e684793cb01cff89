use crate::error::Error;
use crate::utils::{validate_non_empty_image, Vec3};
use crate::Image;
use image::Rgb;
use itertools::iproduct;
use rand::seq::SliceRandom;
use rand::Rng;

/// A single background color sample, channels in R,G,B order
pub type ColorSample = Vec3;

/// Working set of background color samples
pub type SampleSet = Vec<ColorSample>;

/// Extraction of background color samples from a reference image
///
/// The reference image shows the background with its foreground blotted
/// out in a sentinel color. Every pixel that is not exactly the sentinel
/// color is a background sample.
pub trait SampleExtractor {
    /// Collects all non-sentinel pixels in a fixed scan order.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - The image has zero width or height
    fn background_pixels(&self, sentinel: Rgb<u8>) -> Result<SampleSet, Error>;

    /// Collects non-sentinel pixels, shuffles them and keeps at most `cap`.
    ///
    /// When fewer than `cap` pixels are available all of them are kept.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - The image has zero width or height
    /// * `Error::InsufficientSamples` - Every pixel is the sentinel color
    /// * `Error::InvalidParameter` - `cap` is zero
    fn extract_samples<R>(&self, sentinel: Rgb<u8>, cap: usize, rng: &mut R) -> Result<SampleSet, Error>
    where
        R: Rng + ?Sized;
}

impl SampleExtractor for Image<Rgb<u8>> {
    fn background_pixels(&self, sentinel: Rgb<u8>) -> Result<SampleSet, Error> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height)?;

        // column-major scan
        Ok(iproduct!(0..width, 0..height)
            .map(|(x, y)| *self.get_pixel(x, y))
            .filter(|pixel| *pixel != sentinel)
            .map(ColorSample::from)
            .collect())
    }

    fn extract_samples<R>(&self, sentinel: Rgb<u8>, cap: usize, rng: &mut R) -> Result<SampleSet, Error>
    where
        R: Rng + ?Sized,
    {
        if cap == 0 {
            return Err(Error::InvalidParameter(
                "sample cap must be at least 1".to_string(),
            ));
        }

        let mut samples = self.background_pixels(sentinel)?;
        let total = self.width() as usize * self.height() as usize;
        log::info!(
            "Found {} background pixels, out of {}",
            samples.len(),
            total
        );
        if samples.is_empty() {
            return Err(Error::InsufficientSamples {
                available: 0,
                required: 1,
            });
        }

        samples.shuffle(rng);
        samples.truncate(cap);
        log::debug!("Kept {} samples (cap {})", samples.len(), cap);
        Ok(samples)
    }
}
