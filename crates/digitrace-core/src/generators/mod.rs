//! All 15 digit generator implementations and the selection logic that maps
//! an algorithm key onto one of them.

pub mod helpers;

pub mod automaton;
pub mod chaotic;
pub mod classic;
pub mod file_bytes;
pub mod modern;
pub mod pi;
pub mod quantum;
pub mod quasi;

use std::str::FromStr;

use crate::base::check_base;
use crate::error::{Error, Result};
use crate::generator::{DigitGenerator, GeneratorInfo};

use quantum::{QuantumSettings, RandomByteFetcher};

/// Every generator kind, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Pi,
    MiddleSquare,
    Lcg,
    Randu,
    Pcg,
    Xoshiro,
    Mersenne,
    Xorshift,
    Gaussian,
    Logistic,
    Perlin,
    Sobol,
    Quantum,
    Rule30,
    FileBytes,
}

impl Algorithm {
    pub const ALL: [Algorithm; 15] = [
        Self::Pi,
        Self::MiddleSquare,
        Self::Lcg,
        Self::Randu,
        Self::Pcg,
        Self::Xoshiro,
        Self::Mersenne,
        Self::Xorshift,
        Self::Gaussian,
        Self::Logistic,
        Self::Perlin,
        Self::Sobol,
        Self::Quantum,
        Self::Rule30,
        Self::FileBytes,
    ];

    /// Documented default for unrecognised keys.
    pub const DEFAULT: Algorithm = Self::Lcg;

    pub fn key(self) -> &'static str {
        self.info().key
    }

    /// Static metadata for this algorithm.
    pub fn info(self) -> &'static GeneratorInfo {
        match self {
            Self::Pi => &pi::PI_INFO,
            Self::MiddleSquare => &classic::MIDDLE_SQUARE_INFO,
            Self::Lcg => &classic::LCG_INFO,
            Self::Randu => &classic::RANDU_INFO,
            Self::Pcg => &modern::PCG_INFO,
            Self::Xoshiro => &modern::XOSHIRO_INFO,
            Self::Mersenne => &modern::MERSENNE_INFO,
            Self::Xorshift => &modern::XORSHIFT_INFO,
            Self::Gaussian => &chaotic::GAUSSIAN_INFO,
            Self::Logistic => &chaotic::LOGISTIC_INFO,
            Self::Perlin => &chaotic::PERLIN_INFO,
            Self::Sobol => &quasi::SOBOL_INFO,
            Self::Quantum => &quantum::QUANTUM_INFO,
            Self::Rule30 => &automaton::RULE30_INFO,
            Self::FileBytes => &file_bytes::FILE_BYTES_INFO,
        }
    }

    /// Parse `key`, falling back to [`Algorithm::DEFAULT`] when unknown.
    pub fn resolve(key: &str) -> Algorithm {
        match key.parse() {
            Ok(algorithm) => algorithm,
            Err(e) => {
                log::warn!("{e}, falling back to {}", Self::DEFAULT.key());
                Self::DEFAULT
            }
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let algorithm = match normalized.as_str() {
            "pi" => Self::Pi,
            "middle-square" | "middlesquare" => Self::MiddleSquare,
            "lcg" => Self::Lcg,
            "randu" => Self::Randu,
            "pcg" => Self::Pcg,
            "xoshiro" | "xoshiro256++" => Self::Xoshiro,
            "mersenne" | "mt19937" => Self::Mersenne,
            "xorshift" => Self::Xorshift,
            "gaussian" => Self::Gaussian,
            "logistic" => Self::Logistic,
            "perlin" => Self::Perlin,
            "sobol" => Self::Sobol,
            "quantum" => Self::Quantum,
            "rule30" => Self::Rule30,
            "file" | "file-bytes" => Self::FileBytes,
            _ => return Err(Error::UnknownAlgorithm(s.to_string())),
        };
        Ok(algorithm)
    }
}

/// Metadata for every generator.
pub fn all_generator_infos() -> Vec<&'static GeneratorInfo> {
    Algorithm::ALL.iter().map(|a| a.info()).collect()
}

/// Inputs that only some generators consume.
#[derive(Default)]
pub struct GeneratorOptions {
    /// Explicit seed; OS entropy when `None`.
    pub seed: Option<u64>,
    /// Content for the file-bytes generator.
    pub file_bytes: Option<Vec<u8>>,
    /// Endpoint settings for the quantum generator.
    pub quantum: QuantumSettings,
    /// Replaces the HTTP client of the quantum generator.
    pub fetcher: Option<Box<dyn RandomByteFetcher>>,
}

impl GeneratorOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Instantiate the generator for `key` in `base` with default options.
///
/// Unknown keys are not an error: they select the LCG.
pub fn select_generator(key: &str, base: u8) -> Result<Box<dyn DigitGenerator>> {
    select_generator_with(key, base, GeneratorOptions::default())
}

/// Instantiate the generator for `key` in `base`.
pub fn select_generator_with(
    key: &str,
    base: u8,
    options: GeneratorOptions,
) -> Result<Box<dyn DigitGenerator>> {
    check_base(base)?;
    Ok(build(Algorithm::resolve(key), base, options))
}

/// Instantiate a known algorithm. `base` must already be validated.
pub fn build(algorithm: Algorithm, base: u8, options: GeneratorOptions) -> Box<dyn DigitGenerator> {
    let seed = helpers::resolve_seed(options.seed);
    log::debug!("building {algorithm} generator for base {base} (seed {seed})");
    match algorithm {
        Algorithm::Pi => Box::new(pi::PiDigits::new(base)),
        Algorithm::MiddleSquare => Box::new(classic::MiddleSquare::new(base, seed)),
        Algorithm::Lcg => Box::new(classic::Lcg::new(base, seed)),
        Algorithm::Randu => Box::new(classic::Randu::new(base, seed)),
        Algorithm::Pcg => Box::new(modern::Pcg::new(base, seed)),
        Algorithm::Xoshiro => Box::new(modern::Xoshiro::new(base, seed)),
        Algorithm::Mersenne => Box::new(modern::MersenneTwister::new(base, seed)),
        Algorithm::Xorshift => Box::new(modern::Xorshift::new(base, seed)),
        Algorithm::Gaussian => Box::new(chaotic::Gaussian::new(base, seed)),
        Algorithm::Logistic => Box::new(chaotic::Logistic::new(base, seed)),
        Algorithm::Perlin => Box::new(chaotic::Perlin::new(base, seed)),
        Algorithm::Sobol => Box::new(quasi::Sobol::new(base)),
        Algorithm::Quantum => match options.fetcher {
            Some(fetcher) => Box::new(quantum::Quantum::with_fetcher(
                base,
                seed,
                options.quantum.batch,
                fetcher,
            )),
            None => Box::new(quantum::Quantum::new(base, seed, &options.quantum)),
        },
        Algorithm::Rule30 => Box::new(automaton::Rule30::new(base, seed)),
        Algorithm::FileBytes => {
            let bytes = options.file_bytes.unwrap_or_default();
            Box::new(file_bytes::FileBytes::new(base, &bytes, seed))
        }
    }
}

/// Pull up to `n` digits. Stops early only if the generator runs dry.
pub fn sample(generator: &mut dyn DigitGenerator, n: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        match generator.next_digit() {
            Some(d) => out.push(d),
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.key().parse::<Algorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("middleSquare".parse::<Algorithm>().unwrap(), Algorithm::MiddleSquare);
        assert_eq!("MT19937".parse::<Algorithm>().unwrap(), Algorithm::Mersenne);
        assert_eq!(" file_bytes ".parse::<Algorithm>().unwrap(), Algorithm::FileBytes);
    }

    #[test]
    fn test_unknown_key_is_error_when_parsed() {
        assert!(matches!(
            "bogus".parse::<Algorithm>(),
            Err(Error::UnknownAlgorithm(k)) if k == "bogus"
        ));
    }

    #[test]
    fn test_unknown_key_selects_lcg() {
        assert_eq!(Algorithm::resolve("bogus"), Algorithm::Lcg);
        let g = select_generator("bogus", 10).unwrap();
        assert_eq!(g.key(), "lcg");
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(matches!(select_generator("lcg", 1), Err(Error::InvalidBase(1))));
        assert!(matches!(select_generator("pi", 17), Err(Error::InvalidBase(17))));
    }

    #[test]
    fn test_infos_unique_and_full_range() {
        let infos = all_generator_infos();
        assert_eq!(infos.len(), 15);
        let keys: std::collections::HashSet<_> = infos.iter().map(|i| i.key).collect();
        assert_eq!(keys.len(), 15);
        for info in infos {
            assert!(info.supports_base(2) && info.supports_base(16));
            assert!(!info.supports_base(17));
        }
        assert!(Algorithm::Randu.info().warning);
    }

    #[test]
    fn test_seeded_generators_reproduce() {
        for algorithm in Algorithm::ALL {
            if algorithm == Algorithm::Quantum {
                continue;
            }
            let mut a = build(algorithm, 10, GeneratorOptions::seeded(17));
            let mut b = build(algorithm, 10, GeneratorOptions::seeded(17));
            assert_eq!(sample(&mut *a, 200), sample(&mut *b, 200), "{algorithm}");
        }
    }
}
