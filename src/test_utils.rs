//! Test utilities for bgsep
//!
//! This module provides fixtures shared by the unit tests.
//! It is only compiled when running tests.

use crate::utils::Vec3;
use crate::Image;
use image::Rgb;

/// Creates an image filled with `inner` surrounded by a one pixel `border`.
///
/// # Arguments
/// * `width` - Width of the image, including the border
/// * `height` - Height of the image, including the border
/// * `inner` - Color of the interior
/// * `border` - Color of the outermost ring of pixels
pub fn create_bordered_image(width: u32, height: u32, inner: Rgb<u8>, border: Rgb<u8>) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, y| {
        if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
            border
        } else {
            inner
        }
    })
}

/// Creates a checkerboard alternating between `even` and `odd` per pixel.
pub fn create_checkerboard(width: u32, height: u32, even: Rgb<u8>, odd: Rgb<u8>) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, y| if (x + y) % 2 == 0 { even } else { odd })
}

/// Two tight groups of colors near black and near (200, 200, 200).
///
/// The first `per_group` samples belong to the dark group. Within a group
/// the first two channels vary by at most 2, the third is constant.
pub fn two_group_samples(per_group: usize) -> Vec<Vec3> {
    let jitter = |i: usize| ((i % 3) as f64, (i % 2) as f64);
    let dark = (0..per_group).map(|i| {
        let (a, b) = jitter(i);
        Vec3::new(a, b, 0.0)
    });
    let light = (0..per_group).map(|i| {
        let (a, b) = jitter(i);
        Vec3::new(200.0 + a, 200.0 + b, 200.0)
    });
    dark.chain(light).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_bordered_image_with_valid_input_creates_image() {
        let image = create_bordered_image(4, 3, Rgb([10, 10, 10]), Rgb([255, 0, 0]));
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(image.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(3, 2), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([10, 10, 10]));
        assert_eq!(image.get_pixel(2, 1), &Rgb([10, 10, 10]));
    }

    #[test]
    fn create_checkerboard_with_valid_input_creates_image() {
        let image = create_checkerboard(10, 10, Rgb([0, 0, 0]), Rgb([200, 200, 200]));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([200, 200, 200]));
        assert_eq!(image.get_pixel(0, 1), &Rgb([200, 200, 200]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }

    #[test]
    fn two_group_samples_has_both_groups() {
        let samples = two_group_samples(10);
        assert_eq!(samples.len(), 20);
        assert!(samples[..10].iter().all(|s| s[2] == 0.0));
        assert!(samples[10..].iter().all(|s| s[2] == 200.0));
    }
}
