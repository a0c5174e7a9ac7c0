//! Modern PRNGs: PCG, xoshiro256++, Mersenne Twister and xorshift.
//!
//! All four are defined purely by integer arithmetic, so their raw outputs
//! are checked against reference values in the tests below.

use crate::generator::{DigitGenerator, GeneratorCategory, GeneratorInfo, GeneratorKind};

use super::helpers::{SplitMix64, fold_seed, scale_u32};

// ---------------------------------------------------------------------------
// PCG
// ---------------------------------------------------------------------------

const PCG_MULT: u32 = 747_796_405;
const PCG_INC: u32 = 2_891_336_453;
const PCG_PERMUTE: u32 = 277_803_737;

pub static PCG_INFO: GeneratorInfo = GeneratorInfo {
    key: "pcg",
    name: "PCG",
    description: "Permuted congruential generator on a 32-bit state",
    mechanism: "An LCG step followed by an output permutation: xorshift 18, \
                multiply by 277803737, xorshift 22. The permutation hides the \
                weak low bits of the underlying LCG.",
    category: GeneratorCategory::Modern,
    kind: GeneratorKind::PseudoRandom,
    distribution: "uniform",
    compatible_bases: 2..=16,
    uniform: true,
    warning: false,
};

/// Permuted congruential generator.
#[derive(Debug, Clone)]
pub struct Pcg {
    base: u8,
    state: u32,
}

impl Pcg {
    pub fn new(base: u8, seed: u64) -> Self {
        Self {
            base,
            state: fold_seed(seed),
        }
    }

    pub fn next_raw(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(PCG_MULT).wrapping_add(PCG_INC);
        let mut word = (self.state >> 18) ^ self.state;
        word = word.wrapping_mul(PCG_PERMUTE);
        (word >> 22) ^ word
    }
}

impl DigitGenerator for Pcg {
    fn info(&self) -> &GeneratorInfo {
        &PCG_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let word = self.next_raw();
        Some(scale_u32(word, self.base))
    }
}

// ---------------------------------------------------------------------------
// xoshiro256++
// ---------------------------------------------------------------------------

pub static XOSHIRO_INFO: GeneratorInfo = GeneratorInfo {
    key: "xoshiro",
    name: "Xoshiro256++",
    description: "Blackman and Vigna's xoshiro256++ with a 256-bit state",
    mechanism: "Four 64-bit words updated with xor, shift and rotate. Output is \
                rotl(s0 + s3, 23) + s0; the digit is that value mod base.",
    category: GeneratorCategory::Modern,
    kind: GeneratorKind::PseudoRandom,
    distribution: "uniform",
    compatible_bases: 2..=16,
    uniform: true,
    warning: false,
};

/// xoshiro256++.
#[derive(Debug, Clone)]
pub struct Xoshiro {
    base: u8,
    s: [u64; 4],
}

impl Xoshiro {
    pub fn new(base: u8, seed: u64) -> Self {
        let mut sm = SplitMix64::new(seed);
        let mut s = [0u64; 4];
        for word in s.iter_mut() {
            *word = sm.next_u64();
        }
        Self::from_state(base, s)
    }

    /// Build from an explicit state. An all-zero state is a fixed point and
    /// is replaced.
    pub fn from_state(base: u8, s: [u64; 4]) -> Self {
        let s = if s == [0; 4] { [1, 0, 0, 0] } else { s };
        Self { base, s }
    }

    pub fn next_raw(&mut self) -> u64 {
        let s = &mut self.s;
        let result = s[0].wrapping_add(s[3]).rotate_left(23).wrapping_add(s[0]);
        let t = s[1] << 17;
        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);
        result
    }
}

impl DigitGenerator for Xoshiro {
    fn info(&self) -> &GeneratorInfo {
        &XOSHIRO_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let raw = self.next_raw();
        Some((raw % u64::from(self.base)) as u8)
    }
}

// ---------------------------------------------------------------------------
// Mersenne Twister (MT19937)
// ---------------------------------------------------------------------------

const MT_N: usize = 624;
const MT_M: usize = 397;
const MT_MATRIX_A: u32 = 0x9908_B0DF;
const MT_UPPER: u32 = 0x8000_0000;
const MT_LOWER: u32 = 0x7FFF_FFFF;

pub static MERSENNE_INFO: GeneratorInfo = GeneratorInfo {
    key: "mersenne",
    name: "Mersenne Twister",
    description: "MT19937, the default PRNG of many languages",
    mechanism: "A 624-word state is twisted in bulk whenever it is exhausted; \
                each extracted word passes through four tempering steps. The \
                digit is the tempered word mod base.",
    category: GeneratorCategory::Modern,
    kind: GeneratorKind::PseudoRandom,
    distribution: "uniform",
    compatible_bases: 2..=16,
    uniform: true,
    warning: false,
};

/// MT19937.
pub struct MersenneTwister {
    base: u8,
    mt: Box<[u32; MT_N]>,
    index: usize,
}

impl MersenneTwister {
    pub fn new(base: u8, seed: u64) -> Self {
        let mut mt = Box::new([0u32; MT_N]);
        mt[0] = fold_seed(seed);
        for i in 1..MT_N {
            let prev = mt[i - 1];
            mt[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        Self {
            base,
            mt,
            index: MT_N,
        }
    }

    fn twist(&mut self) {
        for i in 0..MT_N {
            let y = (self.mt[i] & MT_UPPER) | (self.mt[(i + 1) % MT_N] & MT_LOWER);
            let mut next = self.mt[(i + MT_M) % MT_N] ^ (y >> 1);
            if y & 1 != 0 {
                next ^= MT_MATRIX_A;
            }
            self.mt[i] = next;
        }
        self.index = 0;
    }

    pub fn next_raw(&mut self) -> u32 {
        if self.index >= MT_N {
            self.twist();
        }
        let mut y = self.mt[self.index];
        self.index += 1;
        y ^= y >> 11;
        y ^= (y << 7) & 0x9D2C_5680;
        y ^= (y << 15) & 0xEFC6_0000;
        y ^ (y >> 18)
    }
}

impl DigitGenerator for MersenneTwister {
    fn info(&self) -> &GeneratorInfo {
        &MERSENNE_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let y = self.next_raw();
        Some((y % u32::from(self.base)) as u8)
    }
}

// ---------------------------------------------------------------------------
// Xorshift32
// ---------------------------------------------------------------------------

pub static XORSHIFT_INFO: GeneratorInfo = GeneratorInfo {
    key: "xorshift",
    name: "Xorshift",
    description: "Marsaglia's 32-bit xorshift (13, 17, 5)",
    mechanism: "x ^= x << 13; x ^= x >> 17; x ^= x << 5. Zero is a fixed point \
                and is never used as a state. The digit is x mod base.",
    category: GeneratorCategory::Modern,
    kind: GeneratorKind::PseudoRandom,
    distribution: "uniform",
    compatible_bases: 2..=16,
    uniform: true,
    warning: false,
};

/// Marsaglia xorshift32.
#[derive(Debug, Clone)]
pub struct Xorshift {
    base: u8,
    state: u32,
}

impl Xorshift {
    pub fn new(base: u8, seed: u64) -> Self {
        let state = fold_seed(seed);
        Self {
            base,
            state: if state == 0 { 1 } else { state },
        }
    }

    pub fn next_raw(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl DigitGenerator for Xorshift {
    fn info(&self) -> &GeneratorInfo {
        &XORSHIFT_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let x = self.next_raw();
        Some((x % u32::from(self.base)) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcg_reference() {
        let mut g = Pcg::new(10, 42);
        assert_eq!(g.next_raw(), 3_798_987_561);
    }

    #[test]
    fn test_xoshiro_reference() {
        let mut g = Xoshiro::from_state(10, [1, 2, 3, 4]);
        assert_eq!(g.next_raw(), 41_943_041);
    }

    #[test]
    fn test_xoshiro_zero_state_replaced() {
        let mut g = Xoshiro::from_state(10, [0; 4]);
        assert_ne!(g.next_raw(), 0);
    }

    #[test]
    fn test_mt19937_reference() {
        let mut g = MersenneTwister::new(10, 5489);
        assert_eq!(g.next_raw(), 3_499_211_612);
        assert_eq!(g.next_raw(), 581_869_302);
    }

    #[test]
    fn test_xorshift_reference() {
        let mut g = Xorshift::new(10, 1);
        assert_eq!(g.next_raw(), 270_369);
        assert_eq!(g.next_digit(), Some((67_634_689u32 % 10) as u8));
    }

    #[test]
    fn test_xorshift_zero_seed() {
        let mut g = Xorshift::new(10, 0);
        assert_eq!(g.next_raw(), 270_369);
    }
}
