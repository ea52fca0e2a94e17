//! Random source for combat rolls
//!
//! All rolls go through the [`CombatRng`] capability so a server can share one
//! seeded source and tests can substitute a scripted one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random draws used by combat
pub trait CombatRng: Send {
    /// Uniform integer in `[0, max]` (inclusive)
    fn uniform_int(&mut self, max: u32) -> u32;

    /// Uniform float in `[0, 1)`
    fn uniform_double(&mut self) -> f64;
}

/// Standard random source, optionally seeded for replayable fights
#[derive(Debug, Clone)]
pub struct SeededRng {
    rng: StdRng,
}

impl SeededRng {
    /// Create a deterministic source from a seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a source seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when a seed is given, otherwise from entropy
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl CombatRng for SeededRng {
    fn uniform_int(&mut self, max: u32) -> u32 {
        self.rng.random_range(0..=max)
    }

    fn uniform_double(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Pick one element uniformly at random.
///
/// Returns `None` for an empty slice.
pub fn pick_uniform<'a, T>(items: &'a [T], rng: &mut dyn CombatRng) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let last = u32::try_from(items.len() - 1).unwrap_or(u32::MAX);
    let index = rng.uniform_int(last) as usize;
    items.get(index.min(items.len() - 1))
}
