//! Procedural map generation: seeds, random sources, the BSP spatial
//! partitioner, and the WFC constraint solver.
//!
//! ## Pipeline
//! ```text
//! seed string → SHA3 → SeededRng
//!       → bsp::build        (volume → leaf sectors)
//!       → wfc::run_to_completion (grid → tile instances)
//!       → pipeline::MapGenerator merges both into a GeneratedMap
//! ```
//!
//! Every generation call owns its grid, tree, and RNG; nothing here is global.

pub mod bsp;
pub mod grid;
pub mod pipeline;
pub mod propagation;
pub mod sector_graph;
pub mod wfc;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::constants::{LCG_INCREMENT, LCG_MODULUS, LCG_MULTIPLIER};

/// Deterministic source of floats in `[0, 1)`.
///
/// Implemented for any `FnMut() -> f64`, so tests can pass `|| 0.5`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

impl<F: FnMut() -> f64> RandomSource for F {
    fn next_f64(&mut self) -> f64 {
        self()
    }
}

/// Map seed - the root of one generation.
/// Same seed + same config + same catalog = identical map.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapSeed {
    pub seed: String,
}

impl MapSeed {
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }

    /// 64-bit digest of the seed string (first 8 bytes of SHA3-256)
    pub fn hash(&self) -> u64 {
        let digest = Sha3_256::digest(self.seed.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[0..8]);
        u64::from_le_bytes(bytes)
    }

    pub fn rng(&self) -> SeededRng {
        SeededRng::new(self.hash())
    }

    /// Seed for retry attempt `k`; attempt 0 is the seed itself
    pub fn attempt(&self, k: u32) -> MapSeed {
        if k == 0 {
            self.clone()
        } else {
            MapSeed::new(format!("{}#{}", self.seed, k))
        }
    }
}

/// Default generator: xoshiro256++ behind `rand`
#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: Xoshiro256PlusPlus,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    pub fn from_seed_str(seed: &str) -> Self {
        MapSeed::new(seed).rng()
    }
}

impl RandomSource for SeededRng {
    fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}

/// Small linear-congruential generator matching the reference seeding
/// scheme: a 31-multiplier string hash folded into 32 bits, then
/// `state = (state * 9301 + 49297) mod 233280`.
///
/// Statistically weak (233280 distinct outputs); kept for reproducing maps
/// generated with that scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LcgRng {
    state: i64,
}

impl LcgRng {
    pub fn from_seed_str(seed: &str) -> Self {
        let state = seed.encode_utf16().fold(0i32, |state, unit| {
            state
                .wrapping_shl(5)
                .wrapping_sub(state)
                .wrapping_add(unit as i32)
        });
        Self {
            state: state as i64,
        }
    }
}

impl RandomSource for LcgRng {
    fn next_f64(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT).rem_euclid(LCG_MODULUS);
        self.state as f64 / LCG_MODULUS as f64
    }
}
