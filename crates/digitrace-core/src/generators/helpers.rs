//! Shared helpers used by multiple generator implementations.
//!
//! Seeding primitives live here so every generator derives its initial state
//! the same way: an explicit `u64` seed, OS entropy when none is given, and a
//! SplitMix64 expander for generators that need more than one word.

use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Draw a fresh seed from the OS entropy source.
///
/// Falls back to the wall clock when the OS source is unavailable.
pub fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::fill(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            log::warn!("OS entropy unavailable ({e}), seeding from clock");
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x9E37_79B9_7F4A_7C15)
        }
    }
}

/// Derive a seed from arbitrary text (first 8 bytes of SHA-256, little-endian).
pub fn seed_from_phrase(phrase: &str) -> u64 {
    let digest = Sha256::digest(phrase.as_bytes());
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(word)
}

/// Read a user-supplied seed: a decimal integer, or any other text as a phrase.
pub fn parse_seed(text: &str) -> u64 {
    let trimmed = text.trim();
    trimmed
        .parse::<u64>()
        .unwrap_or_else(|_| seed_from_phrase(trimmed))
}

/// Use `seed` when given, otherwise draw one from OS entropy.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(entropy_seed)
}

/// Fold a 64-bit seed into 32 bits for single-word generators.
pub fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// SplitMix64 expander for turning one seed into many well-mixed words.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

// ---------------------------------------------------------------------------
// Bit helpers
// ---------------------------------------------------------------------------

/// Bits needed to cover `0..base`, i.e. `ceil(log2(base))`.
pub fn bits_for_base(base: u8) -> u32 {
    if base <= 1 {
        return 0;
    }
    u8::BITS - (base - 1).leading_zeros()
}

/// Scale a 32-bit word onto `0..base` by multiply-shift.
pub fn scale_u32(word: u32, base: u8) -> u8 {
    ((u64::from(word) * u64::from(base)) >> 32) as u8
}
