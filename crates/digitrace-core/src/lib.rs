//! # digitrace-core
//!
//! **Watch random digits race, and see who really led.**
//!
//! `digitrace-core` generates digit streams in any base from 2 to 16 using 15
//! generators (π, the middle-square method, LCG, RANDU, PCG, xoshiro256++,
//! Mersenne Twister, xorshift, Gaussian noise, the logistic map, Perlin noise,
//! a Sobol sequence, the ANU quantum RNG, Rule 30 and arbitrary file bytes),
//! and tracks each run as a race between digits.
//!
//! ## Quick Start
//!
//! ```no_run
//! use digitrace_core::{BetType, GeneratorOptions, NoopObserver, StreamController};
//!
//! let mut controller = StreamController::new(10)?;
//! controller.submit_guess(7, BetType::LeadTime)?;
//! controller.start_with(1000, "pcg", GeneratorOptions::seeded(42))?;
//! controller.run_to_completion(&mut NoopObserver)?;
//!
//! let snapshot = controller.snapshot();
//! println!("{}", snapshot.anomaly.rationale);
//! if let Some(verdict) = controller.verdict() {
//!     println!("{}", verdict.message());
//! }
//! # Ok::<(), digitrace_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! Generator → StreamController → (counts, lead time, sequence, time series)
//! → Statistics / AnomalyReport → guess Verdict
//!
//! Every generator implements the [`DigitGenerator`] trait. The
//! [`StreamController`] owns one generator per run and is the single writer of
//! all per-digit state; observers and snapshots are read-only.
//!
//! Lead time is the number of steps a digit held (or shared) the highest
//! count. A digit that wins on final count while never having led is a
//! *ghost*, which the anomaly engine reports alongside late surges and
//! marathon leaders.

pub mod base;
pub mod config;
pub mod controller;
pub mod error;
pub mod generator;
pub mod generators;
pub mod guess;
pub mod stats;

pub use base::{
    BaseConfig, MAX_BASE, MIN_BASE, base_name, check_base, configure_base, label, parse_digit_label,
};
pub use config::RunConfig;
pub use controller::{
    DigitStream, Flow, LengthPolicy, NoopObserver, RunState, StepOutcome, StreamController,
    StreamObserver, StreamSnapshot, TimeSeriesPoint,
};
pub use error::{Error, FetchError, Result};
pub use generator::{DigitGenerator, GeneratorCategory, GeneratorInfo, GeneratorKind};
pub use generators::helpers::{parse_seed, seed_from_phrase};
pub use generators::quantum::{AnuQrngClient, QuantumSettings, RandomByteFetcher};
pub use generators::{
    Algorithm, GeneratorOptions, all_generator_infos, sample, select_generator,
    select_generator_with,
};
pub use guess::{BetType, Guess, Outcome, Verdict, Winner, resolve_guess};
pub use stats::{
    AnomalyKind, AnomalyReport, Classification, Statistics, SummaryLine, classify_outcome,
    compute_statistics, leaders, summarize, update_lead_time,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
