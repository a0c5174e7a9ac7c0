//! Wolfram's Rule 30 on a 63-cell torus.
//!
//! The centre column of Rule 30 is famously random-looking. Bits from it are
//! gathered `ceil(log2(base))` at a time and candidates at or above `base`
//! are rejected, so the digit distribution stays unbiased.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::generator::{DigitGenerator, GeneratorCategory, GeneratorInfo, GeneratorKind};

use super::helpers::bits_for_base;

pub const RULE30_CELLS: u32 = 63;
const CELL_MASK: u64 = (1 << RULE30_CELLS) - 1;
const CENTER: u32 = RULE30_CELLS / 2;
/// Consecutive rejections tolerated before the row is re-randomised.
const MAX_REJECTIONS: u32 = 4096;

pub static RULE30_INFO: GeneratorInfo = GeneratorInfo {
    key: "rule30",
    name: "Rule 30 Automaton",
    description: "Centre column of the Rule 30 cellular automaton",
    mechanism: "Each cell becomes left XOR (centre OR right), on a ring of 63 \
                cells. The centre cell is read once per generation; bits are \
                packed into candidates and out-of-range candidates are \
                rejected.",
    category: GeneratorCategory::Mathematical,
    kind: GeneratorKind::Deterministic,
    distribution: "uniform",
    compatible_bases: 2..=16,
    uniform: true,
    warning: false,
};

/// Rule 30 digit generator.
pub struct Rule30 {
    base: u8,
    cells: u64,
    bits: u32,
    rng: StdRng,
}

impl Rule30 {
    pub fn new(base: u8, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let cells = Self::random_row(&mut rng);
        Self {
            base,
            cells,
            bits: bits_for_base(base),
            rng,
        }
    }

    /// Start from an explicit row (bit `i` is cell `i`).
    pub fn from_row(base: u8, row: u64, seed: u64) -> Self {
        let mut g = Self::new(base, seed);
        g.cells = row & CELL_MASK;
        if g.cells == 0 {
            g.cells = 1 << CENTER;
        }
        g
    }

    fn random_row(rng: &mut StdRng) -> u64 {
        let row = rng.random::<u64>() & CELL_MASK;
        if row == 0 { 1 << CENTER } else { row }
    }

    /// Current row.
    pub fn row(&self) -> u64 {
        self.cells
    }

    /// Advance one generation.
    pub fn evolve(&mut self) {
        let s = self.cells;
        let left = ((s << 1) | (s >> (RULE30_CELLS - 1))) & CELL_MASK;
        let right = ((s >> 1) | (s << (RULE30_CELLS - 1))) & CELL_MASK;
        self.cells = left ^ (s | right);
    }

    fn next_bit(&mut self) -> u8 {
        let bit = ((self.cells >> CENTER) & 1) as u8;
        self.evolve();
        bit
    }
}

impl DigitGenerator for Rule30 {
    fn info(&self) -> &GeneratorInfo {
        &RULE30_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let mut rejections = 0;
        loop {
            let mut candidate = 0u8;
            for _ in 0..self.bits {
                candidate = (candidate << 1) | self.next_bit();
            }
            if candidate < self.base {
                return Some(candidate);
            }
            rejections += 1;
            if rejections >= MAX_REJECTIONS {
                log::warn!("rule30 stuck rejecting candidates, re-randomising row");
                self.cells = Self::random_row(&mut self.rng);
                rejections = 0;
            }
        }
    }
}
