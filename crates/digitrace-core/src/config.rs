//! Run configuration loaded from JSON and overlaid by callers.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::base::check_base;
use crate::controller::{DEFAULT_SAMPLE_EVERY, LengthPolicy};
use crate::error::{Error, Result};
use crate::generators::GeneratorOptions;
use crate::generators::quantum::{ANU_MAX_BATCH, ANU_URL, QuantumSettings};

/// Everything needed to start one run.
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub base: u8,
    pub digits: usize,
    pub algorithm: String,
    pub sample_every: usize,
    pub min_digits: usize,
    pub max_digits: usize,
    pub seed: Option<u64>,
    pub quantum_url: String,
    pub quantum_timeout_ms: u64,
    pub quantum_batch: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        let policy = LengthPolicy::default();
        Self {
            base: 10,
            digits: 1000,
            algorithm: "lcg".to_string(),
            sample_every: DEFAULT_SAMPLE_EVERY,
            min_digits: policy.min,
            max_digits: policy.max,
            seed: None,
            quantum_url: ANU_URL.to_string(),
            quantum_timeout_ms: 5000,
            quantum_batch: ANU_MAX_BATCH,
        }
    }
}

impl RunConfig {
    /// Load a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Check base, length bounds and cadence before anything is started.
    pub fn validate(&self) -> Result<()> {
        check_base(self.base)?;
        if self.min_digits == 0 || self.min_digits > self.max_digits {
            return Err(Error::Config(format!(
                "invalid digit bounds {}..={}",
                self.min_digits, self.max_digits
            )));
        }
        self.length_policy().check(self.digits)?;
        if self.sample_every == 0 {
            return Err(Error::Config("sample_every must be at least 1".into()));
        }
        if self.quantum_batch == 0 || self.quantum_batch > ANU_MAX_BATCH {
            return Err(Error::Config(format!(
                "quantum_batch must be within 1..={ANU_MAX_BATCH}"
            )));
        }
        Ok(())
    }

    pub fn length_policy(&self) -> LengthPolicy {
        LengthPolicy {
            min: self.min_digits,
            max: self.max_digits,
        }
    }

    pub fn quantum_settings(&self) -> QuantumSettings {
        QuantumSettings {
            url: self.quantum_url.clone(),
            timeout: Duration::from_millis(self.quantum_timeout_ms),
            batch: self.quantum_batch,
        }
    }

    /// Generator options carrying this config's seed and quantum settings.
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            seed: self.seed,
            quantum: self.quantum_settings(),
            ..GeneratorOptions::default()
        }
    }
}
