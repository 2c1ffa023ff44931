//! Seeded sampling of video directories.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use motif_models::VideoId;

/// Pick `floor(fraction * len)` videos without replacement.
///
/// The fraction is clamped to `[0, 1]`. The same names, fraction and seed
/// always give the same selection in the same order.
pub fn select_videos(names: &[VideoId], fraction: f64, seed: u64) -> Vec<VideoId> {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    let count = ((fraction * names.len() as f64).floor() as usize).min(names.len());

    let mut rng = StdRng::seed_from_u64(seed);
    let selected: Vec<VideoId> = names.choose_multiple(&mut rng, count).cloned().collect();

    info!(
        available = names.len(),
        selected = selected.len(),
        fraction,
        seed,
        "Selected videos"
    );
    selected
}
