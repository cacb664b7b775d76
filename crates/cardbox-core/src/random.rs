//! Injectable randomness for scheduling decisions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A source of uniform samples in `[0, 1)`.
///
/// Every random decision in the scheduler and selector is derived from
/// `next_unit`, so a scripted source reproduces a scenario exactly.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;

    /// A fair coin.
    fn coin(&mut self) -> bool {
        self.next_unit() < 0.5
    }

    /// Uniform integer in `[low, high]` (inclusive).
    fn range_inclusive(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        let span = (high - low + 1) as f64;
        let offset = (self.next_unit() * span) as i64;
        (low + offset).min(high)
    }

    /// Uniform index into a collection of `len` items.
    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        ((self.next_unit() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

impl RandomSource for ChaCha8Rng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Seeded generator when `seed` is given, otherwise seeded from the OS.
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Replays a fixed list of samples, then repeats the last one.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    samples: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(samples: impl Into<Vec<f64>>) -> Self {
        Self {
            samples: samples.into(),
            cursor: 0,
        }
    }

    /// Samples consumed so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        let value = self
            .samples
            .get(self.cursor)
            .or_else(|| self.samples.last())
            .copied()
            .unwrap_or(0.0);
        self.cursor += 1;
        value
    }
}
