//! Uniform integer/double draws and Fisher-Yates shuffling.
//!
//! Thin wrapper around [`rand::rngs::StdRng`], seeded with an explicit `u64`
//! via `SeedableRng::seed_from_u64`, or a seed derived from wall-clock time
//! when none is given.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// The PRNG used by every heuristic and by the driver.
///
/// Reproducibility across runs rests entirely on this being seeded once and
/// consumed in a fixed order.
pub struct Rng32 {
    inner: StdRng,
}

impl Rng32 {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Derives a seed from wall-clock time for runs that don't pin one.
    pub fn fresh_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    /// Uniform integer in `[0, n)`.
    pub fn uniform_index(&mut self, n: usize) -> usize {
        self.inner.random_range(0..n)
    }

    /// Uniform integer in `[inf, sup]` (inclusive on both ends).
    pub fn uniform_interval(&mut self, inf: i64, sup: i64) -> i64 {
        self.inner.random_range(inf..=sup)
    }

    /// Draws a fresh `u64`, used to derive independent per-restart seeds from
    /// one master RNG.
    pub fn next_u64(&mut self) -> u64 {
        self.inner.random()
    }

    /// Uniform double in `(0, 1)`.
    pub fn uniform_double(&mut self) -> f64 {
        // random_range excludes the upper bound; nudge away from 0.0 so callers
        // doing `1.0 / u` or `ln(u)` never see exactly zero.
        let u: f64 = self.inner.random_range(f64::MIN_POSITIVE..1.0);
        u
    }

    /// Fisher-Yates shuffle of a full slice.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_index_is_in_range() {
        let mut rng = Rng32::new(7);
        for _ in 0..1000 {
            let x = rng.uniform_index(5);
            assert!(x < 5);
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = Rng32::new(123);
        let mut v: Vec<usize> = (0..20).collect();
        rng.shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = Rng32::new(42);
        let mut b = Rng32::new(42);
        for _ in 0..50 {
            assert_eq!(a.uniform_index(1000), b.uniform_index(1000));
        }
    }
}
