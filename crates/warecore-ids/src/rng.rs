//! Seeded random number generator for deterministic scenario generation
//!
//! The warehouse core itself is fully deterministic (§5) and never
//! touches this module; it exists for generating demo scenarios and
//! randomized test fixtures reproducibly from a seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug)]
pub struct WarehouseRng {
    rng: ChaCha8Rng,
}

impl WarehouseRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.rng.gen_range(range)
    }

    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p)
    }

    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.gen_range(0..slice.len());
            Some(&slice[idx])
        }
    }

    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = WarehouseRng::new(42);
        let mut rng2 = WarehouseRng::new(42);

        for _ in 0..100 {
            let a: u32 = rng1.gen_range(0..1000);
            let b: u32 = rng2.gen_range(0..1000);
            assert_eq!(a, b);
        }
    }
}
