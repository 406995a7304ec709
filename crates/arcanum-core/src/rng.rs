//! Random number generator abstraction for determinism.
//!
//! In production, this wraps the thread-local RNG. In tests, a seeded or
//! scripted implementation is injected so luck draws, fallback deltas, and
//! join codes are repeatable.

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Generate a random `i32` in the range `[min, max]` inclusive.
    fn next_i32_range(&mut self, min: i32, max: i32) -> i32;
}

/// Production RNG backed by `rand::rng()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl DeterministicRng for ThreadRandom {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        rand::Rng::random_range(&mut rand::rng(), min..=max)
    }

    fn next_i32_range(&mut self, min: i32, max: i32) -> i32 {
        rand::Rng::random_range(&mut rand::rng(), min..=max)
    }
}

/// Alphabet for human-typeable tokens. Excludes easily-confused glyphs
/// (`0`/`O`, `1`/`I`/`L`).
pub const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Draws a fixed-length token over [`TOKEN_ALPHABET`].
///
/// # Panics
///
/// Panics if the RNG returns an index outside the alphabet (scripted test
/// RNGs must stay within `[0, TOKEN_ALPHABET.len())`).
#[must_use]
pub fn alphanumeric_token(rng: &mut dyn DeterministicRng, length: usize) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let max = (TOKEN_ALPHABET.len() - 1) as u32;
    (0..length)
        .map(|_| TOKEN_ALPHABET[rng.next_u32_range(0, max) as usize] as char)
        .collect()
}
