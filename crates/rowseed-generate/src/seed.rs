use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Derives independent, reproducible RNG streams from one base seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSource {
    base: u64,
}

impl SeedSource {
    pub fn new(base: u64) -> Self {
        Self { base }
    }

    /// Fixed seed when given, otherwise a fresh random one.
    pub fn from_option(seed: Option<u64>) -> Self {
        Self::new(seed.unwrap_or_else(rand::random))
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    /// Child source scoped to `key`.
    pub fn child(&self, key: &str) -> Self {
        Self::new(hash_seed(self.base, key))
    }

    /// RNG stream scoped to `key`.
    pub fn rng(&self, key: &str) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(hash_seed(self.base, key))
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn streams_are_reproducible_and_distinct() {
        let seeds = SeedSource::new(7);
        let a: u64 = seeds.rng("orders").random();
        let again: u64 = seeds.rng("orders").random();
        let b: u64 = seeds.rng("customers").random();
        assert_eq!(a, again);
        assert_ne!(a, b);
    }
}
