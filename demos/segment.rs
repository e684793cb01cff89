use std::env;

use bgsep::{
    load_rgb_image, store_rgb_image, BackgroundClassifier, BackgroundModelConfig,
    ClassifierParams, FitBackgroundModel,
};
use image::Rgb;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 4 {
        eprintln!("Usage: {} <background.png> <target.png> <out.png>", args[0]);
        eprintln!("Example: RUST_LOG=info {} empty_room.png person.png overlay.png", args[0]);
        eprintln!("Paint the foreground of the background image pure red (255, 0, 0).");
        std::process::exit(1);
    }

    let background_path = &args[1];
    let target_path = &args[2];
    let output_path = &args[3];

    let background = load_rgb_image(background_path)?;
    let target = load_rgb_image(target_path)?;

    let config = BackgroundModelConfig::default().with_cluster_counts(vec![2, 3, 4, 5]);
    let fit = background.fit_background_model(&config)?;
    println!(
        "Fitted {} clusters from {} samples (silhouette {:.3}, converged: {})",
        fit.cluster_count(),
        fit.sample_count,
        fit.silhouette,
        fit.converged
    );
    for diagnostic in &fit.diagnostics {
        println!("  note: {diagnostic}");
    }

    // foreground becomes the sentinel color again
    let overlay = target.mark_foreground(&fit.model, &ClassifierParams::default(), Rgb([255, 0, 0]))?;
    store_rgb_image(output_path, &overlay)?;

    println!("Saved overlay to: {output_path}");

    Ok(())
}
