//! Seeded unit-cube draws for reproducible, independently mergeable runs.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use siphasher::sip::SipHasher13;

/// Random source owned by one sampling run.
///
/// Runs that are merged afterwards must be statistically independent, so each
/// takes its own substream of a master seed. The substream seed is
/// SipHash-1-3 of `(master_seed, substream)` under zero keys, which keeps a
/// set of runs reproducible across platforms.
#[derive(Debug, Clone)]
pub struct RunRng {
    substream: u64,
    rng: StdRng,
}

impl RunRng {
    /// Source for `substream` of `master_seed`.
    pub fn new(master_seed: u64, substream: u64) -> Self {
        Self {
            substream,
            rng: StdRng::seed_from_u64(substream_seed(master_seed, substream)),
        }
    }

    /// One source per run, substreams `0..count`.
    pub fn for_runs(master_seed: u64, count: u64) -> Vec<Self> {
        (0..count).map(|idx| Self::new(master_seed, idx)).collect()
    }

    /// Substream this source was derived from.
    pub fn substream(&self) -> u64 {
        self.substream
    }

    /// Uniform draw from `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Uniform point in the `ndim`-dimensional unit cube.
    pub fn unit_point(&mut self, ndim: usize) -> Vec<f64> {
        (0..ndim).map(|_| self.uniform()).collect()
    }
}

/// Seed of one substream of a master seed.
pub fn substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
