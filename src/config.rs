//! Runtime configuration for the loop engine.
//!
//! Content is fixed by design; the only choices left to the host are where
//! randomness comes from, how finely the melon is tessellated and how many
//! times a stubborn audio device is asked to resume.

use crate::constants::RESUME_RETRY_LIMIT;
use crate::core::HEMISPHERE_SEGMENTS;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Source of randomness for droplets, sparkles and the noise loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Reproducible output: every stream is derived from this seed.
    Fixed(u64),
    /// Fresh randomness per session.
    Entropy,
}

impl SeedPolicy {
    /// Build an RNG for one named stream.
    ///
    /// Streams derived from the same fixed seed are independent of each other,
    /// so reseeding droplets never changes the noise loop.
    pub fn rng(self, stream: u64) -> StdRng {
        match self {
            SeedPolicy::Fixed(seed) => {
                let mix = seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15);
                StdRng::seed_from_u64(mix)
            }
            SeedPolicy::Entropy => StdRng::from_entropy(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub seed: SeedPolicy,
    pub hemisphere_segments: u32,
    pub resume_retry_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: SeedPolicy::Entropy,
            hemisphere_segments: HEMISPHERE_SEGMENTS,
            resume_retry_limit: RESUME_RETRY_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: SeedPolicy::Fixed(seed),
            ..Self::default()
        }
    }
}
