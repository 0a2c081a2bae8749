//! Deterministic RNG hierarchy.
//!
//! A master seed expands into independent sub-seeds per `(stream, iteration)`
//! pair via BLAKE3. Each consumer of randomness names its own stream, so
//! adding a new consumer never shifts the draws another one sees.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive the sub-seed for a named stream.
    ///
    /// Independent of derivation order: the same `(stream, iteration)` always
    /// yields the same seed for a given master seed.
    pub fn sub_seed(&self, stream: &str, iteration: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(stream.as_bytes());
        hasher.update(&iteration.to_le_bytes());
        let hash = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }

    /// Seeded `StdRng` for a named stream.
    pub fn rng_for(&self, stream: &str, iteration: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(stream, iteration))
    }
}
