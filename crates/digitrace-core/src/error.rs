//! Error taxonomy for digitrace.
//!
//! Validation errors ([`Error::InvalidBase`], [`Error::InvalidLength`],
//! [`Error::InvalidDigit`], [`Error::RunInProgress`]) are reported before any
//! state is touched. Network trouble in the quantum source never reaches this
//! type; it is captured as a [`FetchError`] and answered with a fallback.

use thiserror::Error;

use crate::base::{MAX_BASE, MIN_BASE};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("base {0} is outside the supported range {MIN_BASE}..={MAX_BASE}")]
    InvalidBase(u8),

    #[error("length {requested} is outside the allowed range {min}..={max}")]
    InvalidLength {
        requested: usize,
        min: usize,
        max: usize,
    },

    #[error("digit {digit} is not valid in base {base}")]
    InvalidDigit { digit: String, base: u8 },

    #[error("unknown algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("a run is in progress; reset it first")]
    RunInProgress,

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    /// The generator stopped before the requested length. Every generator is
    /// infinite, so this is an invariant violation rather than a user error.
    #[error("generator exhausted after {produced} of {target} digits")]
    GeneratorExhausted { produced: usize, target: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors caused by bad caller input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidBase(_)
                | Self::InvalidLength { .. }
                | Self::InvalidDigit { .. }
                | Self::RunInProgress
        )
    }
}

/// Why a batch of true-random bytes could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("service returned status {0}")]
    Status(u16),

    #[error("service reported success=false")]
    Unsuccessful,

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("service returned no bytes")]
    Empty,
}
