//! Internal utility functions for bgsep.
//!
//! This module contains validation helpers shared by the pipeline stages and
//! the fixed-size linear algebra used for color statistics.

mod linalg;
pub use linalg::{Mat3, Vec3};

use crate::error::Error;

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise [`Error::EmptyImage`]
pub fn validate_non_empty_image(width: u32, height: u32) -> Result<(), Error> {
    if width == 0 || height == 0 {
        Err(Error::EmptyImage)
    } else {
        Ok(())
    }
}

/// Validates a drift threshold or density constant.
///
/// # Arguments
///
/// * `value` - The value to check
/// * `name` - Parameter name used in the error message
///
/// # Returns
///
/// `Ok(())` if the value is finite and strictly positive
pub fn validate_positive(value: f64, name: &str) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

/// Validates that `available` samples are enough for `cluster_count` clusters.
pub fn validate_cluster_count(cluster_count: usize, available: usize) -> Result<(), Error> {
    if cluster_count == 0 {
        return Err(Error::InvalidParameter(
            "cluster count must be at least 1".to_string(),
        ));
    }
    if available < cluster_count {
        return Err(Error::InsufficientSamples {
            available,
            required: cluster_count,
        });
    }
    Ok(())
}

/// Index of the center nearest to `sample`; ties go to the lowest index.
#[inline]
pub fn nearest_center(sample: Vec3, centers: &[Vec3]) -> usize {
    let mut selected = 0;
    let mut best = f64::INFINITY;
    for (i, center) in centers.iter().enumerate() {
        let distance = sample.distance(*center);
        if distance < best {
            selected = i;
            best = distance;
        }
    }
    selected
}
