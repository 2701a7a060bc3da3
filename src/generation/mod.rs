//! # Generation Module
//!
//! Encounter generation systems.
//!
//! This module provides the building blocks for turning a party description
//! into a balanced encounter: the XP threshold table, the budget arithmetic,
//! the monster selector and the final assembly. All randomness flows through
//! [`RandomSource`], which callers inject.

pub mod encounters;
pub mod thresholds;

pub use encounters::*;
pub use thresholds::*;

use crate::SrdResult;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Source of uniform random choices for generators.
///
/// Every [`rand::RngCore`] is a `RandomSource`, so a seeded [`StdRng`] can be
/// handed straight to a generator. Tests can implement the trait directly to
/// script exact draws.
pub trait RandomSource {
    /// Returns an index uniformly distributed in `0..len`. `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Configuration for encounter generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation; `None` draws from entropy
    pub seed: Option<u64>,
    /// Tier used when a request does not name one
    pub default_difficulty: Difficulty,
}

impl GenerationConfig {
    /// Creates a configuration with the given optional seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use srdservice::{Difficulty, GenerationConfig};
    ///
    /// let config = GenerationConfig::new(Some(7));
    /// assert_eq!(config.seed, Some(7));
    /// assert_eq!(config.default_difficulty, Difficulty::Medium);
    /// ```
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            default_difficulty: Difficulty::Medium,
        }
    }

    /// Creates a seeded configuration for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self::new(Some(seed))
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Trait for procedural generators.
///
/// Generators own their validated request and only borrow randomness, so the
/// same generator can be run repeatedly with different sources.
pub trait Generator<T> {
    /// Generates content using the provided random source.
    fn generate(&self, rng: &mut dyn RandomSource) -> SrdResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T) -> SrdResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Creates a random number generator from the config, seeded when a seed
    /// is present.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Rounds to two decimal places, half away from zero.
    pub fn round_to_hundredths(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }
}
