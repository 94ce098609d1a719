//! Converted file name and size estimation.
//!
//! When a converter cannot report an authoritative output size, the queue
//! falls back to [`SizeEstimator`], which scales the original size by a
//! per-pair multiplier and adds bounded random jitter.

mod multipliers;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use multipliers::multiplier;

/// Smallest size the estimator will ever report.
pub const MIN_ESTIMATED_SIZE: u64 = 1024;

/// Maximum relative jitter applied to an estimate (±10%).
pub const JITTER: f64 = 0.1;

/// Replaces the extension of `original` with `target`.
///
/// A name without `.` gets the target extension appended.
pub fn converted_name(original: &str, target: &str) -> String {
    let stem = match original.rfind('.') {
        Some(idx) => &original[..idx],
        None => original,
    };
    format!("{}.{}", stem, target)
}

/// Estimates converted file sizes.
#[derive(Debug)]
pub struct SizeEstimator {
    rng: Option<StdRng>,
}

impl Default for SizeEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeEstimator {
    /// Creates an estimator with entropy-seeded jitter.
    pub fn new() -> Self {
        Self {
            rng: Some(StdRng::from_entropy()),
        }
    }

    /// Creates an estimator with a caller-supplied random source.
    pub fn with_rng(rng: StdRng) -> Self {
        Self { rng: Some(rng) }
    }

    /// Creates an estimator with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Creates an estimator without jitter.
    pub fn exact() -> Self {
        Self { rng: None }
    }

    /// Estimates the converted size of a file in bytes.
    pub fn estimate(&mut self, original_size: u64, from: &str, to: &str) -> u64 {
        let scaled = (original_size as f64 * multiplier(from, to)).round();

        let factor = match self.rng.as_mut() {
            Some(rng) => 1.0 + rng.gen_range(-JITTER..=JITTER),
            None => 1.0,
        };

        let estimate = (scaled * factor).round() as u64;
        estimate.max(MIN_ESTIMATED_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converted_name() {
        assert_eq!(converted_name("photo.jpg", "png"), "photo.png");
        assert_eq!(converted_name("archive.tar.gz", "zip"), "archive.tar.zip");
        assert_eq!(converted_name("noext", "png"), "noext.png");
    }

    #[test]
    fn test_exact_estimate_uses_multiplier() {
        let mut estimator = SizeEstimator::exact();
        assert_eq!(estimator.estimate(100_000, "jpg", "png"), 250_000);
        assert_eq!(estimator.estimate(100_000, "wav", "mp3"), 10_000);
        assert_eq!(estimator.estimate(100_000, "zip", "tar"), 100_000);
    }

    #[test]
    fn test_estimate_floors_at_minimum() {
        let mut estimator = SizeEstimator::exact();
        assert_eq!(estimator.estimate(2048, "png", "ico"), MIN_ESTIMATED_SIZE);
        assert_eq!(estimator.estimate(1, "zip", "tar"), MIN_ESTIMATED_SIZE);
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let mut estimator = SizeEstimator::seeded(42);
        for _ in 0..500 {
            let size = estimator.estimate(1_000_000, "mp4", "avi");
            assert!((1_080_000..=1_320_000).contains(&size), "{size}");
        }
    }

    #[test]
    fn test_seeded_estimator_is_deterministic() {
        let mut a = SizeEstimator::seeded(7);
        let mut b = SizeEstimator::seeded(7);
        for _ in 0..10 {
            assert_eq!(
                a.estimate(500_000, "flac", "mp3"),
                b.estimate(500_000, "flac", "mp3")
            );
        }
    }
}
