use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Mutex;

/// Injectable random source shared by a service
///
/// Each call forks its own `StdRng` from the master generator, so no lock is
/// held while a listing is being awaited and concurrent calls never share
/// sampling state. A fixed seed makes every fork sequence reproducible.
#[derive(Debug)]
pub struct SharedRng {
    master: Mutex<StdRng>,
}

impl SharedRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            master: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            master: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }

    /// Derive an independent generator for one call
    pub fn fork(&self) -> StdRng {
        let mut master = self
            .master
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        StdRng::seed_from_u64(master.gen())
    }
}
