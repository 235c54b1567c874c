//! Reordering of the variable argument pool
//!
//! The random source is always passed in: the binary seeds a `StdRng` from
//! OS entropy once, tests use `StdRng::seed_from_u64`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Randomization strategy applied to the variable pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomMode {
    /// Keep the original order
    None,
    /// Uniform random permutation
    Shuffle,
    /// Move one uniformly chosen element to the front
    SinglePick,
    /// Rotate left by a random amount, or by a fixed number of steps
    Rotate(Option<usize>),
}

impl RandomMode {
    /// Modes that make no sense without at least one argument
    pub fn needs_arguments(self) -> bool {
        matches!(self, RandomMode::SinglePick | RandomMode::Rotate(_))
    }

    pub fn name(self) -> &'static str {
        match self {
            RandomMode::None => "none",
            RandomMode::Shuffle => "shuffle",
            RandomMode::SinglePick => "single-pick",
            RandomMode::Rotate(_) => "rotate",
        }
    }
}

/// Generator seeded from the operating system
pub fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Reorder `pool` in place according to `mode`
pub fn randomize<T, R: Rng + ?Sized>(pool: &mut [T], mode: RandomMode, rng: &mut R) {
    if pool.is_empty() {
        return;
    }
    match mode {
        RandomMode::None => {}
        RandomMode::Shuffle => pool.shuffle(rng),
        RandomMode::SinglePick => {
            let i = rng.gen_range(0..pool.len());
            pool.swap(0, i);
        }
        RandomMode::Rotate(steps) => {
            let k = match steps {
                Some(k) => k % pool.len(),
                None => rng.gen_range(0..pool.len()),
            };
            pool.rotate_left(k);
        }
    }
}
