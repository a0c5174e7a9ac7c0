//! Stream controller: drives one generator through one run.
//!
//! State machine:
//!
//! ```text
//! Idle --start--> Running <--pause/resume--> Paused
//!                    |                         |
//!                    +--(target reached)--> Completed
//!                    +--(generator ran dry)--> Aborted
//! any --reset--> Idle
//! ```
//!
//! Each successful step updates, in order: counts, lead time, the label
//! sequence, and (every `sample_every` digits or on completion) the time
//! series. Observers are told after each update and may ask the controller to
//! pause or stop; that check between steps is the only suspension point.

use serde::Serialize;
use uuid::Uuid;

use crate::base::{BaseConfig, configure_base, label};
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::generator::DigitGenerator;
use crate::generators::{GeneratorOptions, select_generator_with};
use crate::guess::{BetType, Guess, Verdict, resolve_guess};
use crate::stats::{
    AnomalyReport, Statistics, SummaryLine, classify_outcome, compute_statistics, summarize,
    update_lead_time,
};

/// Default snapshot cadence.
pub const DEFAULT_SAMPLE_EVERY: usize = 10;

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Completed,
    /// The generator stopped before the target length.
    Aborted,
}

impl RunState {
    /// True while a run owns the generator.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounds on the requested digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthPolicy {
    pub min: usize,
    pub max: usize,
}

impl Default for LengthPolicy {
    fn default() -> Self {
        Self {
            min: 100,
            max: 10_000,
        }
    }
}

impl LengthPolicy {
    pub fn check(&self, requested: usize) -> Result<()> {
        if (self.min..=self.max).contains(&requested) {
            Ok(())
        } else {
            Err(Error::InvalidLength {
                requested,
                min: self.min,
                max: self.max,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Digit stream state
// ---------------------------------------------------------------------------

/// Counts at one sampled step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesPoint {
    pub step: usize,
    pub counts: Vec<u64>,
}

/// Live state of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigitStream {
    pub target_length: usize,
    pub produced: usize,
    pub counts: Vec<u64>,
    pub lead_time: Vec<u64>,
    /// Emitted digit labels in order.
    pub sequence: String,
    pub time_series: Vec<TimeSeriesPoint>,
}

impl DigitStream {
    pub fn new(base: u8, target_length: usize) -> Self {
        Self {
            target_length,
            produced: 0,
            counts: vec![0; base as usize],
            lead_time: vec![0; base as usize],
            sequence: String::with_capacity(target_length),
            time_series: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.produced >= self.target_length
    }
}

// ---------------------------------------------------------------------------
// Observers
// ---------------------------------------------------------------------------

/// What the controller should do after a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Pause,
    /// Cancel the run and reset the controller.
    Stop,
}

impl Flow {
    fn merge(self, other: Flow) -> Flow {
        match (self, other) {
            (Flow::Stop, _) | (_, Flow::Stop) => Flow::Stop,
            (Flow::Pause, _) | (_, Flow::Pause) => Flow::Pause,
            _ => Flow::Continue,
        }
    }
}

/// Receives updates from the controller. All methods default to no-ops.
pub trait StreamObserver {
    /// Called after each digit has been applied.
    fn on_digit(&mut self, _digit: u8, _stream: &DigitStream) -> Flow {
        Flow::Continue
    }

    /// Called after a time-series point has been recorded.
    fn on_sample(&mut self, _point: &TimeSeriesPoint) -> Flow {
        Flow::Continue
    }

    /// Called once when a run completes.
    fn on_complete(&mut self, _snapshot: &StreamSnapshot) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl StreamObserver for NoopObserver {}

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub digit: u8,
    pub completed: bool,
    pub flow: Flow,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Read-only view of the controller for renderers and exports.
#[derive(Debug, Clone, Serialize)]
pub struct StreamSnapshot {
    pub run_id: Option<Uuid>,
    pub algorithm: Option<&'static str>,
    pub base: u8,
    pub base_name: &'static str,
    pub labels: Vec<String>,
    pub colors: Vec<String>,
    pub state: RunState,
    pub target_length: usize,
    pub produced: usize,
    pub counts: Vec<u64>,
    pub lead_time: Vec<u64>,
    pub sequence: String,
    pub time_series: Vec<TimeSeriesPoint>,
    pub statistics: Statistics,
    pub anomaly: AnomalyReport,
    pub pending_guess: Option<Guess>,
    pub verdict: Option<Verdict>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Owns the active generator and digit stream.
pub struct StreamController {
    config: BaseConfig,
    policy: LengthPolicy,
    sample_every: usize,
    state: RunState,
    stream: DigitStream,
    generator: Option<Box<dyn DigitGenerator>>,
    algorithm: Option<&'static str>,
    run_id: Option<Uuid>,
    pending_guess: Option<Guess>,
    verdict: Option<Verdict>,
}

impl StreamController {
    /// Idle controller for `base` with the default length policy.
    pub fn new(base: u8) -> Result<Self> {
        let config = configure_base(base)?;
        Ok(Self {
            stream: DigitStream::new(base, 0),
            config,
            policy: LengthPolicy::default(),
            sample_every: DEFAULT_SAMPLE_EVERY,
            state: RunState::Idle,
            generator: None,
            algorithm: None,
            run_id: None,
            pending_guess: None,
            verdict: None,
        })
    }

    /// Idle controller with base, length bounds and cadence from `config`.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        let mut controller = Self::new(config.base)?.with_policy(config.length_policy());
        controller.set_sample_every(config.sample_every)?;
        Ok(controller)
    }

    pub fn with_policy(mut self, policy: LengthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the time-series cadence. Takes effect immediately.
    pub fn set_sample_every(&mut self, every: usize) -> Result<()> {
        if every == 0 {
            return Err(Error::Config("sample cadence must be at least 1".into()));
        }
        self.sample_every = every;
        Ok(())
    }

    // -- accessors ----------------------------------------------------------

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn base(&self) -> u8 {
        self.config.base
    }

    pub fn base_config(&self) -> &BaseConfig {
        &self.config
    }

    pub fn policy(&self) -> LengthPolicy {
        self.policy
    }

    pub fn sample_every(&self) -> usize {
        self.sample_every
    }

    pub fn stream(&self) -> &DigitStream {
        &self.stream
    }

    pub fn algorithm(&self) -> Option<&'static str> {
        self.algorithm
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    pub fn pending_guess(&self) -> Option<Guess> {
        self.pending_guess
    }

    /// Verdict of the guess resolved at the end of the last run.
    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// Statistics of the digits produced so far.
    pub fn statistics(&self) -> Statistics {
        compute_statistics(&self.stream.counts)
    }

    /// Classification of the digits produced so far.
    pub fn anomaly_report(&self) -> AnomalyReport {
        classify_outcome(&self.stream.counts, &self.stream.lead_time)
    }

    pub fn summary(&self) -> Vec<SummaryLine> {
        summarize(&self.stream.counts)
    }

    pub fn snapshot(&self) -> StreamSnapshot {
        StreamSnapshot {
            run_id: self.run_id,
            algorithm: self.algorithm,
            base: self.config.base,
            base_name: self.config.name,
            labels: self.config.labels.clone(),
            colors: self.config.colors.clone(),
            state: self.state,
            target_length: self.stream.target_length,
            produced: self.stream.produced,
            counts: self.stream.counts.clone(),
            lead_time: self.stream.lead_time.clone(),
            sequence: self.stream.sequence.clone(),
            time_series: self.stream.time_series.clone(),
            statistics: self.statistics(),
            anomaly: self.anomaly_report(),
            pending_guess: self.pending_guess,
            verdict: self.verdict.clone(),
        }
    }

    // -- configuration ------------------------------------------------------

    /// Switch to a new base, clearing all per-digit state.
    ///
    /// Rejected while a run is running or paused; nothing changes then.
    pub fn configure_base(&mut self, base: u8) -> Result<&BaseConfig> {
        if self.state.is_active() {
            return Err(Error::RunInProgress);
        }
        let config = configure_base(base)?;
        self.config = config;
        self.reset();
        Ok(&self.config)
    }

    // -- lifecycle ----------------------------------------------------------

    /// Start a run of `target_length` digits from the generator for `key`.
    pub fn start(&mut self, target_length: usize, key: &str) -> Result<()> {
        self.start_with(target_length, key, GeneratorOptions::default())
    }

    /// Like [`start`](Self::start) with explicit generator options.
    pub fn start_with(
        &mut self,
        target_length: usize,
        key: &str,
        options: GeneratorOptions,
    ) -> Result<()> {
        self.check_can_start(target_length)?;
        let generator = select_generator_with(key, self.config.base, options)?;
        self.begin(target_length, generator, RunState::Running);
        Ok(())
    }

    /// Start a run in `Paused`, so digits only come from [`step`](Self::step).
    pub fn start_paused(
        &mut self,
        target_length: usize,
        key: &str,
        options: GeneratorOptions,
    ) -> Result<()> {
        self.check_can_start(target_length)?;
        let generator = select_generator_with(key, self.config.base, options)?;
        self.begin(target_length, generator, RunState::Paused);
        Ok(())
    }

    /// Start a run with a caller-built generator.
    pub fn start_with_generator(
        &mut self,
        target_length: usize,
        generator: Box<dyn DigitGenerator>,
    ) -> Result<()> {
        self.check_can_start(target_length)?;
        if generator.base() != self.config.base {
            return Err(Error::Config(format!(
                "generator base {} does not match configured base {}",
                generator.base(),
                self.config.base
            )));
        }
        self.begin(target_length, generator, RunState::Running);
        Ok(())
    }

    fn check_can_start(&self, target_length: usize) -> Result<()> {
        if self.state.is_active() {
            return Err(Error::RunInProgress);
        }
        self.policy.check(target_length)
    }

    fn begin(&mut self, target_length: usize, generator: Box<dyn DigitGenerator>, state: RunState) {
        let run_id = Uuid::new_v4();
        log::info!(
            "run {run_id}: {} digits, algorithm {}, base {}",
            target_length,
            generator.key(),
            self.config.base
        );
        self.stream = DigitStream::new(self.config.base, target_length);
        self.algorithm = Some(generator.key());
        self.generator = Some(generator);
        self.run_id = Some(run_id);
        self.verdict = None;
        self.state = state;
    }

    pub fn pause(&mut self) -> Result<()> {
        self.transition(RunState::Running, RunState::Paused, "pause")
    }

    pub fn resume(&mut self) -> Result<()> {
        self.transition(RunState::Paused, RunState::Running, "resume")
    }

    fn transition(&mut self, from: RunState, to: RunState, action: &'static str) -> Result<()> {
        if self.state != from {
            return Err(Error::InvalidTransition {
                state: self.state.as_str(),
                action,
            });
        }
        self.state = to;
        Ok(())
    }

    /// Discard the run, the generator and any guess; back to `Idle`.
    pub fn reset(&mut self) {
        if self.state.is_active() {
            log::debug!(
                "run cancelled after {} of {} digits",
                self.stream.produced,
                self.stream.target_length
            );
        }
        self.generator = None;
        self.stream = DigitStream::new(self.config.base, 0);
        self.algorithm = None;
        self.run_id = None;
        self.pending_guess = None;
        self.verdict = None;
        self.state = RunState::Idle;
    }

    // -- stepping -----------------------------------------------------------

    /// Produce exactly one digit. Valid while running or paused.
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.step_with(&mut NoopObserver)
    }

    /// Produce one digit and notify `observer`.
    pub fn step_with(&mut self, observer: &mut dyn StreamObserver) -> Result<StepOutcome> {
        if !self.state.is_active() {
            return Err(Error::InvalidTransition {
                state: self.state.as_str(),
                action: "step",
            });
        }
        let next = self.generator.as_mut().and_then(|g| g.next_digit());
        let Some(digit) = next else {
            return Err(self.abort());
        };
        debug_assert!(digit < self.config.base, "digit {digit} out of range");

        let stream = &mut self.stream;
        stream.counts[digit as usize] += 1;
        update_lead_time(&stream.counts, &mut stream.lead_time);
        stream.sequence.push(label(digit));
        stream.produced += 1;

        let completed = stream.is_complete();
        let mut flow = observer.on_digit(digit, &self.stream);

        if completed || self.stream.produced % self.sample_every == 0 {
            let point = TimeSeriesPoint {
                step: self.stream.produced,
                counts: self.stream.counts.clone(),
            };
            flow = flow.merge(observer.on_sample(&point));
            self.stream.time_series.push(point);
        }

        if completed {
            self.finish();
            observer.on_complete(&self.snapshot());
        }

        Ok(StepOutcome {
            digit,
            completed,
            flow,
        })
    }

    /// Step until the run completes, honouring observer requests between
    /// steps. Returns the state the controller ends in.
    ///
    /// A paused controller is left untouched. Requests made on the final
    /// digit are ignored, so a completed run is never discarded.
    pub fn run_to_completion(&mut self, observer: &mut dyn StreamObserver) -> Result<RunState> {
        if !self.state.is_active() && self.state != RunState::Completed {
            return Err(Error::InvalidTransition {
                state: self.state.as_str(),
                action: "run",
            });
        }
        while self.state == RunState::Running {
            let outcome = self.step_with(observer)?;
            match outcome.flow {
                Flow::Continue => {}
                Flow::Pause if !outcome.completed => self.pause()?,
                Flow::Stop if !outcome.completed => {
                    self.reset();
                    break;
                }
                Flow::Pause | Flow::Stop => {}
            }
        }
        Ok(self.state)
    }

    fn finish(&mut self) {
        self.generator = None;
        self.state = RunState::Completed;
        let stats = self.statistics();
        log::info!(
            "run complete: {} digits, chi-square {:.3}",
            self.stream.produced,
            stats.chi_square
        );
        if let Some(guess) = self.pending_guess.take() {
            self.verdict = Some(resolve_guess(
                guess,
                &self.stream.counts,
                &self.stream.lead_time,
            ));
        }
    }

    fn abort(&mut self) -> Error {
        let err = Error::GeneratorExhausted {
            produced: self.stream.produced,
            target: self.stream.target_length,
        };
        log::error!("{err}");
        self.generator = None;
        self.state = RunState::Aborted;
        err
    }

    // -- guesses ------------------------------------------------------------

    /// Commit a prediction, replacing any pending one.
    ///
    /// Accepted in any state. After a run has finished the guess waits for the
    /// next `start`; the previous verdict stays readable until then.
    pub fn submit_guess(&mut self, digit: u8, bet: BetType) -> Result<()> {
        let guess = Guess::new(digit, bet, self.config.base)?;
        self.store_guess(guess)
    }

    /// Commit a prediction given as a digit label such as `"A"`.
    pub fn submit_guess_label(&mut self, text: &str, bet: BetType) -> Result<()> {
        let guess = Guess::from_label(text, bet, self.config.base)?;
        self.store_guess(guess)
    }

    fn store_guess(&mut self, guess: Guess) -> Result<()> {
        if self.pending_guess.is_some() {
            log::debug!("replacing pending guess with {} on {}", label(guess.digit), guess.bet);
        }
        self.pending_guess = Some(guess);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::classic::Lcg;
    use crate::generator::GeneratorInfo;
    use crate::guess::Outcome;

    fn controller() -> StreamController {
        StreamController::new(10).unwrap()
    }

    fn lcg_options() -> GeneratorOptions {
        GeneratorOptions::seeded(12345)
    }

    /// Emits a fixed script, then runs dry.
    struct Scripted {
        digits: Vec<u8>,
        pos: usize,
        base: u8,
    }

    impl DigitGenerator for Scripted {
        fn info(&self) -> &GeneratorInfo {
            crate::generators::Algorithm::Lcg.info()
        }
        fn base(&self) -> u8 {
            self.base
        }
        fn next_digit(&mut self) -> Option<u8> {
            let d = self.digits.get(self.pos).copied();
            self.pos += 1;
            d
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn test_start_validates_length() {
        let mut c = controller();
        assert!(matches!(
            c.start(99, "lcg"),
            Err(Error::InvalidLength { requested: 99, .. })
        ));
        assert!(c.start(10_001, "lcg").is_err());
        assert_eq!(c.state(), RunState::Idle);
        c.start(100, "lcg").unwrap();
        assert_eq!(c.state(), RunState::Running);
    }

    #[test]
    fn test_from_config() {
        let config = RunConfig {
            base: 4,
            digits: 30,
            min_digits: 20,
            max_digits: 40,
            sample_every: 3,
            ..RunConfig::default()
        };
        let mut c = StreamController::from_config(&config).unwrap();
        assert_eq!(c.base(), 4);
        assert_eq!(c.sample_every(), 3);
        c.start_with(config.digits, &config.algorithm, GeneratorOptions::seeded(2))
            .unwrap();
        c.run_to_completion(&mut NoopObserver).unwrap();
        assert_eq!(c.stream().time_series.len(), 10);
        assert!(c.start(41, "lcg").is_err());
    }

    #[test]
    fn test_start_while_running_rejected() {
        let mut c = controller();
        c.start_with(100, "lcg", lcg_options()).unwrap();
        c.step().unwrap();
        assert!(matches!(c.start(100, "pcg"), Err(Error::RunInProgress)));
        assert_eq!(c.stream().produced, 1);
        assert_eq!(c.algorithm(), Some("lcg"));
    }

    #[test]
    fn test_run_to_completion() {
        let mut c = controller();
        c.start_with(250, "lcg", lcg_options()).unwrap();
        let state = c.run_to_completion(&mut NoopObserver).unwrap();
        assert_eq!(state, RunState::Completed);
        let s = c.stream();
        assert_eq!(s.produced, 250);
        assert_eq!(s.sequence.len(), 250);
        assert_eq!(s.counts.iter().sum::<u64>(), 250);
        assert!(s.lead_time.iter().sum::<u64>() >= 250);
        // Sampled every 10 digits; 250 is a multiple, so no extra point.
        assert_eq!(s.time_series.len(), 25);
        assert_eq!(s.time_series.last().unwrap().step, 250);
    }

    #[test]
    fn test_completion_snapshot_not_duplicated() {
        let mut c = controller();
        c.set_sample_every(7).unwrap();
        c.start_with(100, "lcg", lcg_options()).unwrap();
        c.run_to_completion(&mut NoopObserver).unwrap();
        let steps: Vec<usize> = c.stream().time_series.iter().map(|p| p.step).collect();
        assert_eq!(steps.len(), 15);
        assert_eq!(steps[13], 98);
        assert_eq!(steps[14], 100);
    }

    #[test]
    fn test_step_outside_run_rejected() {
        let mut c = controller();
        assert!(matches!(
            c.step(),
            Err(Error::InvalidTransition { action: "step", .. })
        ));
        assert!(c.pause().is_err());
        assert!(c.resume().is_err());
    }

    #[test]
    fn test_pause_blocks_run_but_not_step() {
        let mut c = controller();
        c.start_with(100, "lcg", lcg_options()).unwrap();
        c.pause().unwrap();
        assert_eq!(c.run_to_completion(&mut NoopObserver).unwrap(), RunState::Paused);
        assert_eq!(c.stream().produced, 0);
        c.step().unwrap();
        assert_eq!(c.state(), RunState::Paused);
        assert_eq!(c.stream().produced, 1);
        c.resume().unwrap();
        assert_eq!(c.run_to_completion(&mut NoopObserver).unwrap(), RunState::Completed);
    }

    #[test]
    fn test_start_paused_single_steps() {
        let mut c = controller();
        c.start_paused(100, "sobol", GeneratorOptions::default()).unwrap();
        assert_eq!(c.state(), RunState::Paused);
        let first = c.step().unwrap();
        assert_eq!(first.digit, 0);
        assert!(!first.completed);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut c = controller();
        c.submit_guess(3, BetType::FinalCount).unwrap();
        c.start_with(100, "lcg", lcg_options()).unwrap();
        for _ in 0..20 {
            c.step().unwrap();
        }
        c.reset();
        assert_eq!(c.state(), RunState::Idle);
        assert!(c.stream().sequence.is_empty());
        assert!(c.stream().time_series.is_empty());
        assert!(c.stream().counts.iter().all(|&n| n == 0));
        assert!(c.pending_guess().is_none());
        assert!(c.run_id().is_none());
        assert!(c.step().is_err());
    }

    #[test]
    fn test_exhaustion_aborts() {
        let mut c = controller();
        let g = Scripted {
            digits: vec![1, 2, 3],
            pos: 0,
            base: 10,
        };
        c.start_with_generator(100, Box::new(g)).unwrap();
        let err = c.run_to_completion(&mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            Error::GeneratorExhausted {
                produced: 3,
                target: 100
            }
        ));
        assert_eq!(c.state(), RunState::Aborted);
        assert_eq!(c.stream().sequence, "123");
    }

    #[test]
    fn test_generator_base_mismatch() {
        let mut c = controller();
        let err = c.start_with_generator(100, Box::new(Lcg::new(8, 1))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(c.state(), RunState::Idle);
    }

    // -----------------------------------------------------------------------
    // Base reconfiguration
    // -----------------------------------------------------------------------

    #[test]
    fn test_configure_base_idle_resets() {
        let mut c = controller();
        c.start_with(100, "lcg", lcg_options()).unwrap();
        c.run_to_completion(&mut NoopObserver).unwrap();
        let cfg = c.configure_base(16).unwrap();
        assert_eq!(cfg.labels.len(), 16);
        assert_eq!(c.state(), RunState::Idle);
        assert_eq!(c.stream().counts, vec![0; 16]);
        assert_eq!(c.stream().lead_time, vec![0; 16]);
        assert!(c.stream().sequence.is_empty());
    }

    #[test]
    fn test_configure_base_while_running_rejected() {
        let mut c = controller();
        c.start_with(100, "lcg", lcg_options()).unwrap();
        c.step().unwrap();
        let err = c.configure_base(2).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(c.base(), 10);
        assert_eq!(c.stream().produced, 1);

        c.pause().unwrap();
        assert!(matches!(c.configure_base(2), Err(Error::RunInProgress)));
    }

    #[test]
    fn test_configure_invalid_base_keeps_state() {
        let mut c = controller();
        assert!(matches!(c.configure_base(20), Err(Error::InvalidBase(20))));
        assert_eq!(c.base(), 10);
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    struct PauseAt(usize);

    impl StreamObserver for PauseAt {
        fn on_digit(&mut self, _digit: u8, stream: &DigitStream) -> Flow {
            if stream.produced == self.0 {
                Flow::Pause
            } else {
                Flow::Continue
            }
        }
    }

    struct StopAt(usize);

    impl StreamObserver for StopAt {
        fn on_sample(&mut self, point: &TimeSeriesPoint) -> Flow {
            if point.step >= self.0 {
                Flow::Stop
            } else {
                Flow::Continue
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        digits: usize,
        samples: usize,
        completed: Option<usize>,
    }

    impl StreamObserver for Recorder {
        fn on_digit(&mut self, _digit: u8, _stream: &DigitStream) -> Flow {
            self.digits += 1;
            Flow::Continue
        }
        fn on_sample(&mut self, _point: &TimeSeriesPoint) -> Flow {
            self.samples += 1;
            Flow::Continue
        }
        fn on_complete(&mut self, snapshot: &StreamSnapshot) {
            self.completed = Some(snapshot.produced);
        }
    }

    #[test]
    fn test_observer_pause() {
        let mut c = controller();
        c.start_with(100, "lcg", lcg_options()).unwrap();
        let state = c.run_to_completion(&mut PauseAt(40)).unwrap();
        assert_eq!(state, RunState::Paused);
        assert_eq!(c.stream().produced, 40);
    }

    #[test]
    fn test_observer_stop_resets() {
        let mut c = controller();
        c.start_with(100, "lcg", lcg_options()).unwrap();
        let state = c.run_to_completion(&mut StopAt(30)).unwrap();
        assert_eq!(state, RunState::Idle);
        assert_eq!(c.stream().produced, 0);
    }

    #[test]
    fn test_observer_notifications() {
        let mut c = controller();
        let mut rec = Recorder::default();
        c.start_with(120, "pcg", lcg_options()).unwrap();
        c.run_to_completion(&mut rec).unwrap();
        assert_eq!(rec.digits, 120);
        assert_eq!(rec.samples, 12);
        assert_eq!(rec.completed, Some(120));
    }

    // -----------------------------------------------------------------------
    // Guesses
    // -----------------------------------------------------------------------

    #[test]
    fn test_guess_resolved_once_at_completion() {
        let mut c = StreamController::new(16).unwrap();
        c.submit_guess(5, BetType::FinalCount).unwrap();
        c.submit_guess(0, BetType::FinalCount).unwrap();
        assert_eq!(c.pending_guess().unwrap().digit, 0);
        // 256 Sobol digits in base 16 hit every digit exactly 16 times.
        c.start(256, "sobol").unwrap();
        c.run_to_completion(&mut NoopObserver).unwrap();
        let verdict = c.verdict().unwrap();
        assert_eq!(verdict.outcome, Outcome::Correct);
        assert_eq!(verdict.winners.len(), 16);
        assert!(c.pending_guess().is_none());

        // A guess placed after completion waits for the next run.
        c.submit_guess(1, BetType::LeadTime).unwrap();
        assert_eq!(c.state(), RunState::Completed);
        assert_eq!(c.pending_guess().unwrap().digit, 1);
        assert_eq!(c.verdict().unwrap().guess.digit, 0);
    }

    #[test]
    fn test_stop_on_completing_step_keeps_run() {
        let mut c = controller();
        c.submit_guess(2, BetType::FinalCount).unwrap();
        c.start_with(100, "lcg", lcg_options()).unwrap();
        let state = c.run_to_completion(&mut StopAt(100)).unwrap();
        assert_eq!(state, RunState::Completed);
        assert_eq!(c.stream().produced, 100);
        assert!(c.verdict().is_some());
    }

    #[test]
    fn test_guess_out_of_range() {
        let mut c = controller();
        assert!(matches!(
            c.submit_guess(10, BetType::FinalCount),
            Err(Error::InvalidDigit { .. })
        ));
        assert!(c.submit_guess_label("A", BetType::FinalCount).is_err());
        assert!(c.pending_guess().is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut c = controller();
        c.start_with(100, "lcg", lcg_options()).unwrap();
        c.run_to_completion(&mut NoopObserver).unwrap();
        let json = serde_json::to_value(c.snapshot()).unwrap();
        assert_eq!(json["state"], "completed");
        assert_eq!(json["algorithm"], "lcg");
        assert_eq!(json["counts"].as_array().unwrap().len(), 10);
        assert!(json["run_id"].is_string());
    }
}
