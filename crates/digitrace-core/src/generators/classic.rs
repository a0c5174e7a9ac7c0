//! Classic generators: middle-square, LCG and RANDU.
//!
//! These are the historic ancestors of modern PRNGs. RANDU in particular is
//! kept exactly as IBM shipped it, correlation defects and all.

use std::collections::{HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::generator::{DigitGenerator, GeneratorCategory, GeneratorInfo, GeneratorKind};

// ---------------------------------------------------------------------------
// Middle-square
// ---------------------------------------------------------------------------

const MS_MODULUS: u64 = 1_000_000;
const MS_DEFAULT_SEED: u64 = 123_456;
/// How many recent seeds are remembered for cycle detection.
pub const MS_CYCLE_WINDOW: usize = 4096;

pub static MIDDLE_SQUARE_INFO: GeneratorInfo = GeneratorInfo {
    key: "middle-square",
    name: "Middle-Square",
    description: "Von Neumann's 1946 middle-square method with cycle detection",
    mechanism: "Squares a 6-digit seed and keeps 20 middle bits. The sequence \
                falls into short cycles quickly; a repeated seed within the \
                trailing window triggers a reseed from a fresh source.",
    category: GeneratorCategory::Classic,
    kind: GeneratorKind::PseudoRandom,
    distribution: "roughly uniform between reseeds, short cycles",
    compatible_bases: 2..=16,
    uniform: false,
    warning: false,
};

/// Von Neumann's middle-square method.
pub struct MiddleSquare {
    base: u8,
    seed: u64,
    recent: VecDeque<u64>,
    seen: HashSet<u64>,
    reseeder: StdRng,
    reseeds: u64,
}

impl MiddleSquare {
    pub fn new(base: u8, seed: u64) -> Self {
        let mut ms = Self {
            base,
            seed: 0,
            recent: VecDeque::with_capacity(MS_CYCLE_WINDOW),
            seen: HashSet::with_capacity(MS_CYCLE_WINDOW),
            reseeder: StdRng::seed_from_u64(seed),
            reseeds: 0,
        };
        let start = seed % MS_MODULUS;
        ms.seed = if start == 0 { MS_DEFAULT_SEED } else { start };
        ms.remember(ms.seed);
        ms
    }

    /// Number of times a cycle forced a reseed.
    pub fn reseeds(&self) -> u64 {
        self.reseeds
    }

    fn remember(&mut self, value: u64) {
        if self.recent.len() == MS_CYCLE_WINDOW {
            if let Some(old) = self.recent.pop_front() {
                self.seen.remove(&old);
            }
        }
        self.recent.push_back(value);
        self.seen.insert(value);
    }

    fn reseed(&mut self) {
        self.recent.clear();
        self.seen.clear();
        self.seed = self.reseeder.random_range(1..MS_MODULUS);
        self.reseeds += 1;
        log::debug!(
            "middle-square cycle detected, reseeded to {} (reseed #{})",
            self.seed,
            self.reseeds
        );
        self.remember(self.seed);
    }

    fn advance(&mut self) {
        let squared = self.seed * self.seed;
        let next = ((squared >> 8) & 0xF_FFFF) % MS_MODULUS;
        if next == 0 || self.seen.contains(&next) {
            self.reseed();
        } else {
            self.seed = next;
            self.remember(next);
        }
    }
}

impl DigitGenerator for MiddleSquare {
    fn info(&self) -> &GeneratorInfo {
        &MIDDLE_SQUARE_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        self.advance();
        Some((self.seed % u64::from(self.base)) as u8)
    }
}

// ---------------------------------------------------------------------------
// Linear congruential
// ---------------------------------------------------------------------------

const LCG_A: u64 = 1_103_515_245;
const LCG_C: u64 = 12_345;
const MOD_2_31: u64 = 1 << 31;

pub static LCG_INFO: GeneratorInfo = GeneratorInfo {
    key: "lcg",
    name: "Linear Congruential",
    description: "The ANSI C rand() recurrence: a=1103515245, c=12345, m=2^31",
    mechanism: "seed = (a*seed + c) mod m. The digit is the seed scaled onto \
                the base: floor(seed/m * base), which uses the high bits.",
    category: GeneratorCategory::Classic,
    kind: GeneratorKind::PseudoRandom,
    distribution: "uniform",
    compatible_bases: 2..=16,
    uniform: true,
    warning: false,
};

/// Linear congruential generator.
#[derive(Debug, Clone)]
pub struct Lcg {
    base: u8,
    state: u64,
}

impl Lcg {
    pub fn new(base: u8, seed: u64) -> Self {
        Self {
            base,
            state: seed % MOD_2_31,
        }
    }

    /// Advance and return the raw 31-bit state.
    pub fn next_raw(&mut self) -> u64 {
        self.state = (LCG_A * self.state + LCG_C) % MOD_2_31;
        self.state
    }
}

impl DigitGenerator for Lcg {
    fn info(&self) -> &GeneratorInfo {
        &LCG_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let raw = self.next_raw();
        Some(((raw * u64::from(self.base)) >> 31) as u8)
    }
}

// ---------------------------------------------------------------------------
// RANDU
// ---------------------------------------------------------------------------

const RANDU_A: u64 = 65_539;

pub static RANDU_INFO: GeneratorInfo = GeneratorInfo {
    key: "randu",
    name: "RANDU",
    description: "IBM's infamous 1960s generator, kept with its original flaw",
    mechanism: "seed = 65539*seed mod 2^31. Since 65539 = 2^16 + 3, every three \
                consecutive outputs satisfy x[k+2] = 6x[k+1] - 9x[k] (mod 2^31), \
                so triples fall on just 15 planes in the unit cube.",
    category: GeneratorCategory::Classic,
    kind: GeneratorKind::PseudoRandom,
    distribution: "uniform in 1-D, strongly correlated in 3-D",
    compatible_bases: 2..=16,
    uniform: true,
    warning: true,
};

/// IBM RANDU.
#[derive(Debug, Clone)]
pub struct Randu {
    base: u8,
    state: u64,
}

impl Randu {
    /// RANDU needs an odd seed; the low bit is forced on.
    pub fn new(base: u8, seed: u64) -> Self {
        Self {
            base,
            state: (seed % MOD_2_31) | 1,
        }
    }

    pub fn next_raw(&mut self) -> u64 {
        self.state = (RANDU_A * self.state) % MOD_2_31;
        self.state
    }
}

impl DigitGenerator for Randu {
    fn info(&self) -> &GeneratorInfo {
        &RANDU_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let raw = self.next_raw();
        Some(((raw * u64::from(self.base)) >> 31) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_known_sequence() {
        let mut g = Lcg::new(10, 1);
        assert_eq!(g.next_raw(), 1_103_527_590);
        assert_eq!(g.next_raw(), 377_401_575);
    }

    #[test]
    fn test_lcg_digit_uses_high_bits() {
        let mut g = Lcg::new(10, 1);
        // 1103527590 / 2^31 * 10 = 5.13...
        assert_eq!(g.next_digit(), Some(5));
    }

    #[test]
    fn test_randu_three_term_relation() {
        let mut g = Randu::new(10, 1);
        let xs: Vec<u64> = (0..500).map(|_| g.next_raw()).collect();
        for w in xs.windows(3) {
            let rhs = (6 * w[1] + 9 * (MOD_2_31 - w[0])) % MOD_2_31;
            assert_eq!(w[2], rhs);
        }
    }

    #[test]
    fn test_randu_even_seed_forced_odd() {
        let mut g = Randu::new(10, 0);
        assert_eq!(g.next_raw(), RANDU_A);
    }

    #[test]
    fn test_middle_square_zero_seed_uses_default() {
        let g = MiddleSquare::new(10, 0);
        assert_eq!(g.seed, MS_DEFAULT_SEED);
    }

    #[test]
    fn test_middle_square_survives_cycles() {
        let mut g = MiddleSquare::new(10, 42);
        for _ in 0..20_000 {
            let d = g.next_digit().unwrap();
            assert!(d < 10);
        }
        // The 20-bit middle-square orbit is far shorter than 20k steps.
        assert!(g.reseeds() > 0);
        assert!(g.recent.len() <= MS_CYCLE_WINDOW);
        assert_eq!(g.recent.len(), g.seen.len());
    }
}
