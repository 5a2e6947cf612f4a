// rng.rs - Injectable random source for the Metropolis engine

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// The two draws the engine needs, plus a reseed hook the session calls at
/// the start of every run.
pub trait RandomSource {
    /// Uniform integer in `[0, bound)`. `bound` is never zero.
    fn random_int(&mut self, bound: usize) -> usize;

    /// Uniform real in `[0, 1)`.
    fn random01(&mut self) -> f64;

    /// Restart the stream from `seed`. Sources that cannot be reseeded
    /// ignore this.
    fn reseed(&mut self, _seed: u64) {}
}

/// Adapts any seedable `rand` generator to `RandomSource`.
#[derive(Debug, Clone)]
pub struct RngSource<R = ChaCha20Rng> {
    rng: R,
}

impl<R: Rng + SeedableRng> RngSource<R> {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: R::seed_from_u64(seed) }
    }
}

impl<R: Rng + SeedableRng> RandomSource for RngSource<R> {
    #[inline(always)]
    fn random_int(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }

    #[inline(always)]
    fn random01(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = R::seed_from_u64(seed);
    }
}

/// Default engine RNG.
pub type DefaultSource = RngSource<ChaCha20Rng>;
