//! Seeded random source for simulation runs.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Random source handed to every randomized operation.
///
/// Two `SimRng`s built from the same seed produce the same simulation.
#[derive(Debug, Clone)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(SmallRng::from_entropy())
    }
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}
