//! True-random digits from the ANU quantum random number service.
//!
//! Bytes are fetched in batches through a [`RandomByteFetcher`]. The first
//! failure of any kind (transport, status, malformed body, `success: false`,
//! empty batch) switches the generator to an LCG for the rest of its life.
//! The switch is logged and never surfaces as an error.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Deserialize;

use crate::error::FetchError;
use crate::generator::{DigitGenerator, GeneratorCategory, GeneratorInfo, GeneratorKind};

use super::classic::Lcg;

/// Public ANU endpoint returning JSON `{type, length, data, success}`.
pub const ANU_URL: &str = "https://qrng.anu.edu.au/API/jsonI.php";
/// The ANU service caps a single request at 1024 values.
pub const ANU_MAX_BATCH: usize = 1024;

pub static QUANTUM_INFO: GeneratorInfo = GeneratorInfo {
    key: "quantum",
    name: "Quantum (ANU QRNG)",
    description: "Vacuum-fluctuation random bytes from the ANU quantum RNG service",
    mechanism: "Requests batches of uint8 values over HTTPS. Bytes at or above \
                256 - (256 mod base) are discarded so the rest map onto digits \
                without bias. Any network failure falls back to the LCG.",
    category: GeneratorCategory::TrueRandom,
    kind: GeneratorKind::TrueRandom,
    distribution: "uniform",
    compatible_bases: 2..=16,
    uniform: true,
    warning: false,
};

/// Source of random bytes, abstracted so tests can inject failures.
pub trait RandomByteFetcher: Send {
    fn fetch(&mut self, count: usize) -> Result<Vec<u8>, FetchError>;
}

/// Endpoint and batching settings for the quantum generator.
#[derive(Debug, Clone)]
pub struct QuantumSettings {
    pub url: String,
    pub timeout: Duration,
    pub batch: usize,
}

impl Default for QuantumSettings {
    fn default() -> Self {
        Self {
            url: ANU_URL.to_string(),
            timeout: Duration::from_millis(5000),
            batch: ANU_MAX_BATCH,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnuResponse {
    success: bool,
    #[serde(default)]
    data: Vec<u64>,
}

/// Blocking HTTP client for the ANU JSON API.
pub struct AnuQrngClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl AnuQrngClient {
    pub fn new(settings: &QuantumSettings) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        Ok(Self {
            client,
            url: settings.url.clone(),
        })
    }
}

impl RandomByteFetcher for AnuQrngClient {
    fn fetch(&mut self, count: usize) -> Result<Vec<u8>, FetchError> {
        let length = count.clamp(1, ANU_MAX_BATCH).to_string();
        let response = self
            .client
            .get(&self.url)
            .query(&[("length", length.as_str()), ("type", "uint8")])
            .send()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        let body: AnuResponse = response
            .json()
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        decode_batch(body)
    }
}

fn decode_batch(body: AnuResponse) -> Result<Vec<u8>, FetchError> {
    if !body.success {
        return Err(FetchError::Unsuccessful);
    }
    if body.data.is_empty() {
        return Err(FetchError::Empty);
    }
    body.data
        .into_iter()
        .map(|v| {
            u8::try_from(v).map_err(|_| FetchError::Malformed(format!("value {v} is not a byte")))
        })
        .collect()
}

enum Source {
    Remote(Box<dyn RandomByteFetcher>),
    Fallback(Lcg),
}

/// Quantum digits with transparent LCG fallback.
pub struct Quantum {
    base: u8,
    seed: u64,
    batch: usize,
    source: Source,
    buffer: VecDeque<u8>,
}

impl Quantum {
    /// Quantum generator talking to the configured HTTP endpoint.
    pub fn new(base: u8, seed: u64, settings: &QuantumSettings) -> Self {
        match AnuQrngClient::new(settings) {
            Ok(client) => Self::with_fetcher(base, seed, settings.batch, Box::new(client)),
            Err(e) => {
                log::warn!("quantum client unavailable ({e}), using LCG fallback");
                Self::fallback(base, seed)
            }
        }
    }

    /// Quantum generator backed by any byte fetcher.
    pub fn with_fetcher(
        base: u8,
        seed: u64,
        batch: usize,
        fetcher: Box<dyn RandomByteFetcher>,
    ) -> Self {
        Self {
            base,
            seed,
            batch: batch.clamp(1, ANU_MAX_BATCH),
            source: Source::Remote(fetcher),
            buffer: VecDeque::new(),
        }
    }

    fn fallback(base: u8, seed: u64) -> Self {
        Self {
            base,
            seed,
            batch: ANU_MAX_BATCH,
            source: Source::Fallback(Lcg::new(base, seed)),
            buffer: VecDeque::new(),
        }
    }

    /// True once the generator has switched to the LCG.
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, Source::Fallback(_))
    }

    /// Largest byte value (exclusive) that maps onto digits without bias.
    fn acceptance_limit(&self) -> u16 {
        256 - 256 % u16::from(self.base)
    }

    /// Refill the buffer, or switch to the LCG on any failure.
    fn refill(&mut self) {
        let Source::Remote(fetcher) = &mut self.source else {
            return;
        };
        match fetcher.fetch(self.batch) {
            Ok(bytes) if !bytes.is_empty() => self.buffer.extend(bytes),
            Ok(_) => self.switch_to_fallback(&FetchError::Empty),
            Err(e) => self.switch_to_fallback(&e),
        }
    }

    fn switch_to_fallback(&mut self, cause: &FetchError) {
        log::warn!("quantum fetch failed ({cause}), falling back to LCG for the rest of the run");
        self.buffer.clear();
        self.source = Source::Fallback(Lcg::new(self.base, self.seed));
    }
}

impl DigitGenerator for Quantum {
    fn info(&self) -> &GeneratorInfo {
        &QUANTUM_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let limit = self.acceptance_limit();
        loop {
            if let Source::Fallback(lcg) = &mut self.source {
                return lcg.next_digit();
            }
            match self.buffer.pop_front() {
                Some(byte) if u16::from(byte) < limit => return Some(byte % self.base),
                Some(_) => continue,
                None => self.refill(),
            }
        }
    }
}
