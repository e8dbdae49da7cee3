//! Scramble primitives shared by both reveal engines.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::types::Charset;

/// Random source owned by each reveal task.
pub type ScrambleRng = StdRng;

/// Deterministic random source, for tests and reproducible demos.
pub fn seeded_rng(seed: u64) -> ScrambleRng {
    StdRng::seed_from_u64(seed)
}

/// Random source seeded from the operating system.
pub fn entropy_rng() -> ScrambleRng {
    StdRng::from_entropy()
}

/// Derive an independent random source for a child task.
pub fn fork_rng<R: Rng + ?Sized>(parent: &mut R) -> ScrambleRng {
    StdRng::seed_from_u64(parent.r#gen())
}

/// Draw a uniformly random stand-in from `charset`.
pub fn random_char<R: Rng + ?Sized>(charset: &Charset, rng: &mut R) -> char {
    // Charset is never empty
    charset.as_slice().choose(rng).copied().unwrap_or(' ')
}

/// Whitespace is always rendered literally, whatever the reveal state.
#[inline]
pub fn is_literal(ch: char) -> bool {
    ch.is_whitespace()
}
