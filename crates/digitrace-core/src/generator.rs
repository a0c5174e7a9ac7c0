//! Abstract digit generator trait and metadata.
//!
//! Every generator implements [`DigitGenerator`], which exposes static
//! metadata via [`GeneratorInfo`] and pulls one digit at a time. A generator
//! holds all of its algorithm state as fields; it never terminates on its own.

use std::ops::RangeInclusive;

use serde::Serialize;

/// Family a generator belongs to, used for grouping in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorCategory {
    /// Historic generators (middle-square, LCG, RANDU).
    Classic,
    /// Modern PRNGs (PCG, xoshiro, Mersenne Twister, xorshift).
    Modern,
    /// Mathematical constants and maps (pi, logistic, Gaussian, Perlin, Rule 30).
    Mathematical,
    /// Low-discrepancy sequences.
    QuasiRandom,
    /// External true-random service.
    TrueRandom,
    /// Digits derived from user supplied bytes.
    Data,
}

impl std::fmt::Display for GeneratorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classic => write!(f, "classic"),
            Self::Modern => write!(f, "modern"),
            Self::Mathematical => write!(f, "mathematical"),
            Self::QuasiRandom => write!(f, "quasi-random"),
            Self::TrueRandom => write!(f, "true-random"),
            Self::Data => write!(f, "data"),
        }
    }
}

/// How the digits come about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    Deterministic,
    PseudoRandom,
    Chaotic,
    QuasiRandom,
    TrueRandom,
}

impl std::fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deterministic => write!(f, "deterministic"),
            Self::PseudoRandom => write!(f, "pseudo-random"),
            Self::Chaotic => write!(f, "chaotic"),
            Self::QuasiRandom => write!(f, "quasi-random"),
            Self::TrueRandom => write!(f, "true-random"),
        }
    }
}

/// Metadata about a generator.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratorInfo {
    /// Selection key (e.g. `"lcg"`).
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// How the generator turns its state into digits.
    pub mechanism: &'static str,
    pub category: GeneratorCategory,
    pub kind: GeneratorKind,
    /// Expected shape of the digit histogram.
    pub distribution: &'static str,
    /// Bases this generator accepts. All generators support the full range.
    pub compatible_bases: RangeInclusive<u8>,
    /// Whether the digit histogram should be flat.
    pub uniform: bool,
    /// Known-defective generator kept for teaching purposes.
    pub warning: bool,
}

impl GeneratorInfo {
    pub fn supports_base(&self, base: u8) -> bool {
        self.compatible_bases.contains(&base)
    }
}

/// Trait that every digit generator implements.
pub trait DigitGenerator: Send {
    /// Generator metadata.
    fn info(&self) -> &GeneratorInfo;

    /// Base the generator was built for.
    fn base(&self) -> u8;

    /// Pull the next digit, always in `0..base`.
    ///
    /// `None` means the generator ran dry, which the stream controller treats
    /// as an invariant violation.
    fn next_digit(&mut self) -> Option<u8>;

    /// Convenience: key from info.
    fn key(&self) -> &'static str {
        self.info().key
    }
}

impl<G: DigitGenerator + ?Sized> DigitGenerator for Box<G> {
    fn info(&self) -> &GeneratorInfo {
        (**self).info()
    }

    fn base(&self) -> u8 {
        (**self).base()
    }

    fn next_digit(&mut self) -> Option<u8> {
        (**self).next_digit()
    }
}
