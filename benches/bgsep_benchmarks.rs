//! Performance benchmarks for bgsep
//!
//! This benchmark suite measures the clustering, refinement and
//! classification stages to track regressions.

use bgsep::*;
use criterion::*;
use image::Rgb;
use itertools::iproduct;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

/// Helper function to create a noisy three-tone reference image with a sentinel block
fn create_reference_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    let mut rng = StdRng::seed_from_u64(width as u64 * 31 + height as u64);
    let mut image: Image<Rgb<u8>> = Image::new(width, height);
    let tones = [[40u8, 60, 90], [150, 140, 120], [230, 225, 210]];

    iproduct!(0..height, 0..width).for_each(|(y, x)| {
        let pixel = if x > width / 3 && x < width / 2 && y > height / 4 {
            Rgb([255, 0, 0])
        } else {
            let tone = tones[((x / 8 + y / 8) % 3) as usize];
            Rgb(tone.map(|c| c.saturating_add(rng.gen_range(0..6))))
        };
        image.put_pixel(x, y, pixel);
    });

    image
}

fn extract(image: &Image<Rgb<u8>>, cap: usize) -> Vec<Vec3> {
    image
        .extract_samples(Rgb([255, 0, 0]), cap, &mut StdRng::seed_from_u64(1))
        .unwrap()
}

/// Benchmark k-means (seeding included) across sample counts
fn bench_kmeans(c: &mut Criterion) {
    let image = create_reference_image(200, 200);

    let mut group = c.benchmark_group("kmeans");
    group.sample_size(10);

    for cap in [500, 2000, 8000] {
        let samples = extract(&image, cap);
        group.throughput(Throughput::Elements(samples.len() as u64));

        group.bench_with_input(BenchmarkId::new("run_kmeans", cap), &samples, |b, samples| {
            b.iter(|| {
                let initial = seed_centers(samples, 3, &mut StdRng::seed_from_u64(7)).unwrap();
                black_box(run_kmeans(samples, initial, &KMeansParams::default(), None).unwrap())
            })
        });
    }

    group.finish();
}

/// Benchmark silhouette scoring, which is quadratic in the sample count
fn bench_silhouette(c: &mut Criterion) {
    let image = create_reference_image(200, 200);

    let mut group = c.benchmark_group("silhouette");
    group.sample_size(10); // Fewer samples for expensive operations

    for cap in [250, 1000, 2000] {
        let samples = extract(&image, cap);
        let initial = seed_centers(&samples, 3, &mut StdRng::seed_from_u64(7)).unwrap();
        let fit = run_kmeans(&samples, initial, &KMeansParams::default(), None).unwrap();
        let groups = fit.partition.groups(&samples);

        group.throughput(Throughput::Elements(samples.len() as u64));
        group.bench_with_input(BenchmarkId::new("mean_silhouette", cap), &groups, |b, groups| {
            b.iter(|| black_box(mean_silhouette(groups)))
        });
    }

    group.finish();
}

/// Benchmark EM refinement from a k-means starting point
fn bench_em(c: &mut Criterion) {
    let image = create_reference_image(200, 200);

    let mut group = c.benchmark_group("em");
    group.sample_size(10);

    for cap in [500, 2000] {
        let samples = extract(&image, cap);
        let initial = seed_centers(&samples, 3, &mut StdRng::seed_from_u64(7)).unwrap();
        let kmeans = run_kmeans(&samples, initial, &KMeansParams::default(), None).unwrap();
        let estimate =
            estimate_covariances(&kmeans.partition.groups(&samples), &kmeans.centers).unwrap();
        let model =
            GaussianMixtureModel::new(kmeans.centers, estimate.covariances, vec![1.0; 3]).unwrap();

        group.throughput(Throughput::Elements(samples.len() as u64));
        group.bench_with_input(BenchmarkId::new("fit_em", cap), &model, |b, model| {
            b.iter(|| black_box(fit_em(&samples, model.clone(), &EmParams::default(), None).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark per-pixel classification across different image sizes
fn bench_classification(c: &mut Criterion) {
    let sizes = vec![
        (100, 100),   // Small
        (500, 500),   // Medium
        (1920, 1080), // HD
    ];

    let reference = create_reference_image(200, 200);
    let config = BackgroundModelConfig::default()
        .with_cluster_counts(vec![3])
        .with_seed(3);
    let fit = reference.fit_background_model(&config).unwrap();
    let params = ClassifierParams::default();

    let mut group = c.benchmark_group("classification");
    group.sample_size(10);

    for (width, height) in sizes {
        let pixels = width * height;
        group.throughput(Throughput::Elements(pixels as u64));

        let target = create_reference_image(width, height);

        group.bench_with_input(
            BenchmarkId::new("classify_background", format!("{}x{}", width, height)),
            &target,
            |b, img| b.iter(|| black_box(img.classify_background(&fit.model, &params).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark the whole reference-to-model workflow
fn bench_complex_workflows(c: &mut Criterion) {
    let image = create_reference_image(320, 240);

    let mut group = c.benchmark_group("complex_workflows");
    group.sample_size(10); // Fewer samples for complex operations

    let config = BackgroundModelConfig::default()
        .with_cluster_counts(vec![2, 3, 4])
        .with_seed(11);
    group.bench_function("fit_background_model", |b| {
        b.iter(|| black_box(image.fit_background_model(&config).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    // Individual stages
    bench_kmeans,
    bench_silhouette,
    bench_em,
    bench_classification,
    // Complete workflow
    bench_complex_workflows,
);
criterion_main!(benches);
