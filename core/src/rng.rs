//! Deterministic random number generation.
//!
//! RULE: Nothing in the sample-data path may call a platform RNG.
//! All randomness flows through StreamRng instances derived from a
//! single master seed, so the same seed always fabricates the same
//! dashboard dataset.
//!
//! Each generator concern gets its own stream, seeded from
//! (master_seed XOR stream_index). Adding a new stream never shifts
//! the values drawn by existing streams.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for one generator stream.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// Create a stream RNG from the master seed and a stable stream
    /// index. The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll a float uniformly in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// All generator streams for one seeded dataset.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, slot: StreamSlot) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Metrics = 0,
    Agents = 1,
    Products = 2,
    Contracts = 3,
    Segments = 4,
    Hearing = 5,
    Responses = 6,
    // Add new streams here — append only.
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Metrics => "metrics",
            Self::Agents => "agents",
            Self::Products => "products",
            Self::Contracts => "contracts",
            Self::Segments => "segments",
            Self::Hearing => "hearing",
            Self::Responses => "responses",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngBank::new(42).for_stream(StreamSlot::Metrics);
        let mut b = RngBank::new(42).for_stream(StreamSlot::Metrics);
        for _ in 0..100 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn streams_are_independent() {
        let bank = RngBank::new(42);
        let mut metrics = bank.for_stream(StreamSlot::Metrics);
        let mut hearing = bank.for_stream(StreamSlot::Hearing);
        assert_ne!(metrics.next_f64().to_bits(), hearing.next_f64().to_bits());
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = RngBank::new(7).for_stream(StreamSlot::Metrics);
        for _ in 0..1000 {
            let x = rng.uniform(0.70, 1.20);
            assert!((0.70..1.20).contains(&x));
        }
    }
}
