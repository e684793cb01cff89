use crate::bgsep::sample_extraction::ColorSample;
use crate::error::Error;
use crate::utils::{validate_cluster_count, Vec3};
use rand::Rng;

/// Minimum number of candidates drawn for every center after the first
pub const MIN_SEED_CANDIDATES: usize = 25;

/// Candidates keep being drawn until one is at least this far from all chosen centers
pub const SEED_DISTANCE_FLOOR: f64 = 0.1;

/// Upper bound on candidate draws per center
///
/// Without it a sample set of one repeated color would never reach
/// [`SEED_DISTANCE_FLOOR`].
pub const MAX_SEED_CANDIDATES: usize = 1000;

/// Picks `k` initial centers by farthest-point biased sampling.
///
/// The first center is a uniformly random sample. Each further center is
/// the candidate, among a batch of random draws, whose distance to the
/// nearest already chosen center is largest.
///
/// # Errors
///
/// * `Error::InvalidParameter` - `k` is zero
/// * `Error::InsufficientSamples` - fewer samples than `k`
pub fn seed_centers<R>(samples: &[ColorSample], k: usize, rng: &mut R) -> Result<Vec<Vec3>, Error>
where
    R: Rng + ?Sized,
{
    validate_cluster_count(k, samples.len())?;

    let mut centers = Vec::with_capacity(k);
    centers.push(samples[rng.gen_range(0..samples.len())]);
    log::debug!("initial center 0: {:?}", centers[0]);

    for i in 1..k {
        let mut best = samples[0];
        let mut best_score = -1.0;
        let mut draws = 0;
        while (draws < MIN_SEED_CANDIDATES || best_score < SEED_DISTANCE_FLOOR)
            && draws < MAX_SEED_CANDIDATES
        {
            let candidate = samples[rng.gen_range(0..samples.len())];
            let min_distance = centers
                .iter()
                .map(|center| candidate.distance(*center))
                .fold(f64::INFINITY, f64::min);
            if min_distance > best_score {
                best = candidate;
                best_score = min_distance;
            }
            draws += 1;
        }
        if best_score < SEED_DISTANCE_FLOOR {
            log::debug!(
                "center {i}: no candidate beyond {SEED_DISTANCE_FLOOR} after {draws} draws"
            );
        }
        log::debug!("initial center {i}: {best:?} (distance {best_score})");
        centers.push(best);
    }

    Ok(centers)
}
