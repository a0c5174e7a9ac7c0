//! One-dimensional Sobol sequence in Gray-code order.
//!
//! In one dimension every direction number is a plain power of two
//! (`v_j = 2^(31-j)`), which makes the sequence the van der Corput sequence
//! visited in Gray-code order. Each step flips a single bit: the one indexed
//! by the lowest zero bit of the counter.

use crate::generator::{DigitGenerator, GeneratorCategory, GeneratorInfo, GeneratorKind};

use super::helpers::scale_u32;

pub static SOBOL_INFO: GeneratorInfo = GeneratorInfo {
    key: "sobol",
    name: "Sobol Sequence",
    description: "Low-discrepancy sequence that fills the interval evenly",
    mechanism: "x starts at 0; step n xors in the direction number 2^(31-c), \
                where c is the position of the lowest zero bit of n. Any \
                2^k consecutive points hit every dyadic cell exactly once, so \
                counts stay almost perfectly level.",
    category: GeneratorCategory::QuasiRandom,
    kind: GeneratorKind::QuasiRandom,
    distribution: "near-perfectly even, not random",
    compatible_bases: 2..=16,
    uniform: false,
    warning: false,
};

/// Gray-code Sobol sequence, dimension 1.
#[derive(Debug, Clone)]
pub struct Sobol {
    base: u8,
    index: u32,
    x: u32,
}

impl Sobol {
    pub fn new(base: u8) -> Self {
        Self {
            base,
            index: 0,
            x: 0,
        }
    }

    /// Current point as a fixed-point fraction of 2^32, then advance.
    pub fn next_raw(&mut self) -> u32 {
        let out = self.x;
        let c = self.index.trailing_ones();
        if c >= 32 {
            // Period of 2^32 exhausted; start over.
            self.index = 0;
            self.x = 0;
        } else {
            self.x ^= 1 << (31 - c);
            self.index += 1;
        }
        out
    }
}

impl DigitGenerator for Sobol {
    fn info(&self) -> &GeneratorInfo {
        &SOBOL_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let x = self.next_raw();
        Some(scale_u32(x, self.base))
    }
}
