use rand::{rngs::StdRng, Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RngState {
    seed: Option<u64>,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            seed: None,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Uniform over the inclusive range; returns `min` when the range is empty.
    pub fn range_u64(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    pub fn range_usize(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}
