//! Digits of π in any base.
//!
//! A window of the first [`PI_WINDOW`] decimal digits is computed once per
//! process with the Rabinowitz–Wagon spigot. Base 10 reads the window
//! directly; other bases re-express each 15-digit decimal chunk in the target
//! base by successive division. Either way the stream cycles once the window
//! is used up, so it repeats with a period equal to the buffer length.

use std::borrow::Cow;
use std::sync::OnceLock;

use crate::generator::{DigitGenerator, GeneratorCategory, GeneratorInfo, GeneratorKind};

/// Number of decimal digits of π kept in the shared window (leading 3 included).
pub const PI_WINDOW: usize = 1000;

const CHUNK_DIGITS: usize = 15;

pub static PI_INFO: GeneratorInfo = GeneratorInfo {
    key: "pi",
    name: "Pi Digits",
    description: "Digits of pi, re-expressed in the selected base",
    mechanism: "A fixed window of pi's decimal expansion from a spigot algorithm. \
                Other bases convert 15-digit decimal chunks by repeated division. \
                The window is reused cyclically once exhausted.",
    category: GeneratorCategory::Mathematical,
    kind: GeneratorKind::Deterministic,
    distribution: "believed normal, near-uniform",
    compatible_bases: 2..=16,
    uniform: false,
    warning: false,
};

/// The shared decimal window, `[3, 1, 4, 1, 5, ...]`.
pub fn pi_window() -> &'static [u8] {
    static WINDOW: OnceLock<Vec<u8>> = OnceLock::new();
    WINDOW.get_or_init(|| {
        let mut digits = spigot(PI_WINDOW + 10);
        // The spigot emits a placeholder 0 before the leading 3.
        digits.remove(0);
        digits.truncate(PI_WINDOW);
        digits
    })
}

/// Rabinowitz–Wagon spigot. Returns `n + 1` digits, the first being a 0
/// placeholder. Trailing digits may be off by a carry; callers over-compute.
fn spigot(n: usize) -> Vec<u8> {
    let len = n * 10 / 3 + 1;
    let mut a = vec![2u64; len];
    let mut out = Vec::with_capacity(n + 1);
    let mut predigit = 0u8;
    let mut nines = 0usize;

    for _ in 0..n {
        let mut q = 0u64;
        for i in (1..=len as u64).rev() {
            let idx = (i - 1) as usize;
            let x = 10 * a[idx] + q * i;
            a[idx] = x % (2 * i - 1);
            q = x / (2 * i - 1);
        }
        a[0] = q % 10;
        q /= 10;

        match q {
            9 => nines += 1,
            10 => {
                out.push(predigit + 1);
                out.extend(std::iter::repeat_n(0, nines));
                predigit = 0;
                nines = 0;
            }
            _ => {
                out.push(predigit);
                out.extend(std::iter::repeat_n(9, nines));
                predigit = q as u8;
                nines = 0;
            }
        }
    }
    out.push(predigit);
    out
}

/// Convert decimal digits to `base`, chunk by chunk.
fn convert_window(decimal: &[u8], base: u8) -> Vec<u8> {
    let base = u64::from(base);
    let mut out = Vec::new();
    for chunk in decimal.chunks(CHUNK_DIGITS) {
        let mut value = chunk.iter().fold(0u64, |acc, &d| acc * 10 + u64::from(d));
        if value == 0 {
            out.push(0);
            continue;
        }
        let mut converted = Vec::new();
        while value > 0 {
            converted.push((value % base) as u8);
            value /= base;
        }
        converted.reverse();
        out.extend(converted);
    }
    out
}

/// Digits of π in `base`, cycling over a finite window.
pub struct PiDigits {
    base: u8,
    digits: Cow<'static, [u8]>,
    pos: usize,
}

impl PiDigits {
    pub fn new(base: u8) -> Self {
        let window = pi_window();
        let digits = if base == 10 {
            Cow::Borrowed(window)
        } else {
            Cow::Owned(convert_window(window, base))
        };
        Self {
            base,
            digits,
            pos: 0,
        }
    }

    /// Length of one cycle of the output.
    pub fn period(&self) -> usize {
        self.digits.len()
    }
}

impl DigitGenerator for PiDigits {
    fn info(&self) -> &GeneratorInfo {
        &PI_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let d = *self.digits.get(self.pos)?;
        self.pos = (self.pos + 1) % self.digits.len();
        Some(d)
    }
}
