//! Loading and storing images through the `image` crate.
//!
//! Which formats are available depends on the enabled cargo features
//! (`png` by default).

use std::path::Path;

use crate::error::Error;
use crate::Image;
use image::{Luma, Rgb};

/// Loads an image from `path` as 8-bit RGB, converting other color types.
///
/// # Errors
///
/// * `Error::Image` - the file cannot be read or decoded
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> Result<Image<Rgb<u8>>, Error> {
    let image = image::open(path.as_ref())?;
    log::info!(
        "Read image {}x{} pixels from {}",
        image.width(),
        image.height(),
        path.as_ref().display()
    );
    Ok(image.to_rgb8())
}

/// Stores an RGB image; the format follows the file extension.
///
/// # Errors
///
/// * `Error::Image` - encoding or writing failed
pub fn store_rgb_image<P: AsRef<Path>>(path: P, image: &Image<Rgb<u8>>) -> Result<(), Error> {
    image.save(path.as_ref())?;
    Ok(())
}

/// Stores a background mask; the format follows the file extension.
///
/// # Errors
///
/// * `Error::Image` - encoding or writing failed
pub fn store_mask<P: AsRef<Path>>(path: P, mask: &Image<Luma<u8>>) -> Result<(), Error> {
    mask.save(path.as_ref())?;
    Ok(())
}
