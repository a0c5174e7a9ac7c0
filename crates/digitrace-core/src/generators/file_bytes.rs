//! Digits derived from externally supplied bytes.
//!
//! Each byte is split into its high and low nibble. Base 16 emits nibbles as
//! they are; other bases feed the nibbles through a bit buffer and draw
//! `ceil(log2(base))`-bit candidates, rejecting any that land outside the
//! base. The byte stream wraps when exhausted.

use crate::generator::{DigitGenerator, GeneratorCategory, GeneratorInfo, GeneratorKind};

use super::classic::Lcg;
use super::helpers::bits_for_base;

pub static FILE_BYTES_INFO: GeneratorInfo = GeneratorInfo {
    key: "file",
    name: "File Bytes",
    description: "Digits read from the nibbles of a user supplied file",
    mechanism: "Splits each byte into high and low nibble. Base 16 uses the \
                nibbles directly; other bases pack them into a bit buffer and \
                take ceil(log2 base) bits per candidate with rejection. Wraps \
                to the start of the data when exhausted.",
    category: GeneratorCategory::Data,
    kind: GeneratorKind::Deterministic,
    distribution: "whatever the data holds",
    compatible_bases: 2..=16,
    uniform: true,
    warning: false,
};

/// Digits from a byte buffer's nibble stream.
pub struct FileBytes {
    base: u8,
    seed: u64,
    nibbles: Vec<u8>,
    pos: usize,
    buffer: u32,
    buffered: u32,
    bits: u32,
    fallback: Option<Lcg>,
}

impl FileBytes {
    /// Build from raw bytes. Empty content falls back to the LCG.
    pub fn new(base: u8, bytes: &[u8], seed: u64) -> Self {
        let nibbles: Vec<u8> = bytes.iter().flat_map(|&b| [b >> 4, b & 0x0F]).collect();
        let fallback = if nibbles.is_empty() {
            log::warn!("no file bytes supplied, using LCG fallback");
            Some(Lcg::new(base, seed))
        } else {
            None
        };
        Self {
            base,
            seed,
            nibbles,
            pos: 0,
            buffer: 0,
            buffered: 0,
            bits: bits_for_base(base),
            fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    fn next_nibble(&mut self) -> u8 {
        let n = self.nibbles[self.pos];
        self.pos = (self.pos + 1) % self.nibbles.len();
        n
    }

    fn next_candidate(&mut self) -> u8 {
        while self.buffered < self.bits {
            self.buffer = (self.buffer << 4) | u32::from(self.next_nibble());
            self.buffered += 4;
        }
        self.buffered -= self.bits;
        let candidate = (self.buffer >> self.buffered) & ((1 << self.bits) - 1);
        self.buffer &= (1 << self.buffered) - 1;
        candidate as u8
    }

    /// Candidates per full cycle of the bit stream; if none is accepted in
    /// that many draws, none ever will be.
    fn stall_limit(&self) -> usize {
        self.nibbles.len() * 4 + 1
    }
}

impl DigitGenerator for FileBytes {
    fn info(&self) -> &GeneratorInfo {
        &FILE_BYTES_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        if let Some(lcg) = self.fallback.as_mut() {
            return lcg.next_digit();
        }
        if self.base == 16 {
            return Some(self.next_nibble());
        }
        for _ in 0..self.stall_limit() {
            let candidate = self.next_candidate();
            if candidate < self.base {
                return Some(candidate);
            }
        }
        log::warn!(
            "file bytes never yield a digit below {}, using LCG fallback",
            self.base
        );
        let mut lcg = Lcg::new(self.base, self.seed);
        let digit = lcg.next_digit();
        self.fallback = Some(lcg);
        digit
    }
}
