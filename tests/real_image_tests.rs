//! Tests with real image files
//!
//! These tests write PNG files to a temporary directory and run the library
//! on the decoded data, including the file I/O helpers.

use bgsep::*;
use image::{Luma, Rgb};
use std::path::PathBuf;

const RED: Rgb<u8> = Rgb([255, 0, 0]);

/// Path of a scratch file unique to this test process
fn scratch_path(filename: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bgsep-{}-{filename}", std::process::id()))
}

/// Create a reference shot with a wall and a floor tone and a blotted-out subject
fn create_reference_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, y| {
        let center_x = width as f32 / 2.0;
        let center_y = height as f32 / 2.0;
        let distance = (x as f32 - center_x).hypot(y as f32 - center_y);
        if distance < width.min(height) as f32 * 0.25 {
            RED
        } else if y < height * 2 / 3 {
            // wall with a faint horizontal texture
            Rgb([180 + (x % 3) as u8, 170 + (y % 2) as u8, 150])
        } else {
            // floor
            Rgb([60 + (x % 2) as u8, 45, 30 + (y % 3) as u8])
        }
    })
}

/// Same scene with a subject standing in front of it
fn create_target_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    let mut image = create_reference_image(width, height);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if *pixel == RED || ((width / 3..width / 2).contains(&x) && y >= height / 4) {
            // subject in saturated blue clothing
            *pixel = Rgb([20, 40, 210]);
        }
    }
    image
}

#[test]
fn png_round_trip_preserves_pixels() {
    let image = create_reference_image(24, 18);
    let path = scratch_path("round-trip.png");

    store_rgb_image(&path, &image).expect("storing PNG should succeed");
    let loaded = load_rgb_image(&path).expect("loading PNG should succeed");
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.dimensions(), image.dimensions());
    assert_eq!(loaded.as_raw(), image.as_raw());
}

#[test]
fn grayscale_file_is_converted_to_rgb() {
    let gray: Image<Luma<u8>> = Image::from_fn(4, 4, |x, _| Luma([(x * 50) as u8]));
    let path = scratch_path("gray.png");
    store_mask(&path, &gray).expect("storing PNG should succeed");
    let loaded = load_rgb_image(&path).expect("loading PNG should succeed");
    std::fs::remove_file(&path).ok();

    assert_eq!(*loaded.get_pixel(2, 0), Rgb([100, 100, 100]));
}

#[test]
fn segment_files_end_to_end() {
    let reference_path = scratch_path("reference.png");
    let target_path = scratch_path("target.png");
    let mask_path = scratch_path("mask.png");
    let overlay_path = scratch_path("overlay.png");
    store_rgb_image(&reference_path, &create_reference_image(48, 36)).unwrap();
    store_rgb_image(&target_path, &create_target_image(48, 36)).unwrap();

    let reference = load_rgb_image(&reference_path).unwrap();
    let target = load_rgb_image(&target_path).unwrap();

    let config = BackgroundModelConfig::default()
        .with_cluster_counts(vec![2, 3])
        .with_seed(2024);
    let fit = reference
        .fit_background_model(&config)
        .expect("fit should succeed");
    assert!(fit.silhouette > 0.8, "silhouette {}", fit.silhouette);

    let params = ClassifierParams::default();
    let mask = target.classify_background(&fit.model, &params).unwrap();
    store_mask(&mask_path, &mask).unwrap();
    let overlay = target
        .mark_foreground(&fit.model, &params, Rgb([0, 255, 0]))
        .unwrap();
    store_rgb_image(&overlay_path, &overlay).unwrap();

    let stored_mask = image::open(&mask_path).unwrap().to_luma8();
    for path in [&reference_path, &target_path, &mask_path, &overlay_path] {
        std::fs::remove_file(path).ok();
    }

    assert_eq!(stored_mask.as_raw(), mask.as_raw());
    // wall, floor and subject
    assert_eq!(*mask.get_pixel(2, 2), BACKGROUND);
    assert_eq!(*mask.get_pixel(2, 34), BACKGROUND);
    assert_eq!(*mask.get_pixel(20, 20), FOREGROUND);
    assert_eq!(*overlay.get_pixel(20, 20), Rgb([0, 255, 0]));
    assert_eq!(*overlay.get_pixel(2, 2), *target.get_pixel(2, 2));
}

#[test]
fn missing_file_reports_image_error() {
    let result = load_rgb_image(scratch_path("does-not-exist.png"));
    assert!(matches!(result, Err(Error::Image(_))));
}
