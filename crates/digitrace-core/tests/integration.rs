//! Integration tests for digitrace-core.
//!
//! These tests drive whole runs through the public API:
//! generator selection → stream controller → statistics → guess verdict.

use digitrace_core::{
    Algorithm, AnomalyKind, BetType, Classification, DigitGenerator, DigitStream, Error,
    FetchError, Flow, GeneratorInfo, GeneratorOptions, LengthPolicy, NoopObserver,
    RandomByteFetcher, RunState, StreamController, StreamObserver, TimeSeriesPoint,
    compute_statistics, select_generator_with,
};

/// Fetcher that always fails, forcing the quantum fallback.
struct Offline;

impl RandomByteFetcher for Offline {
    fn fetch(&mut self, _count: usize) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Http("offline".into()))
    }
}

/// Fetcher that serves a repeating byte ramp.
struct Ramp(u8);

impl RandomByteFetcher for Ramp {
    fn fetch(&mut self, count: usize) -> Result<Vec<u8>, FetchError> {
        Ok((0..count)
            .map(|_| {
                self.0 = self.0.wrapping_add(37);
                self.0
            })
            .collect())
    }
}

/// Replays a fixed digit script.
struct Script {
    digits: Vec<u8>,
    pos: usize,
    base: u8,
}

impl Script {
    fn new(base: u8, digits: Vec<u8>) -> Box<Self> {
        Box::new(Self {
            digits,
            pos: 0,
            base,
        })
    }
}

impl DigitGenerator for Script {
    fn info(&self) -> &GeneratorInfo {
        Algorithm::Lcg.info()
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

fn options_for(algorithm: Algorithm, seed: u64) -> GeneratorOptions {
    let mut options = GeneratorOptions::seeded(seed);
    match algorithm {
        Algorithm::Quantum => options.fetcher = Some(Box::new(Ramp(seed as u8))),
        Algorithm::FileBytes => options.file_bytes = Some(b"digitrace integration bytes".to_vec()),
        _ => {}
    }
    options
}

fn run(base: u8, target: usize, key: &str, options: GeneratorOptions) -> StreamController {
    let mut controller = StreamController::new(base).unwrap();
    controller.start_with(target, key, options).unwrap();
    controller.run_to_completion(&mut NoopObserver).unwrap();
    controller
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[test]
fn every_generator_stays_in_range_for_every_base() {
    for algorithm in Algorithm::ALL {
        for base in 2..=16u8 {
            let mut generator =
                select_generator_with(algorithm.key(), base, options_for(algorithm, 99)).unwrap();
            assert_eq!(generator.key(), algorithm.key());
            for i in 0..1000 {
                let digit = generator
                    .next_digit()
                    .unwrap_or_else(|| panic!("{algorithm} ran dry in base {base} at {i}"));
                assert!(digit < base, "{algorithm} produced {digit} in base {base}");
            }
        }
    }
}

#[test]
fn uniform_generators_pass_chi_square() {
    let uniform = [
        (Algorithm::Lcg, 1),
        (Algorithm::Xorshift, 42),
        (Algorithm::Mersenne, 5489),
        (Algorithm::Pcg, 2024),
        (Algorithm::Xoshiro, 7),
        (Algorithm::Randu, 12345),
    ];
    for (algorithm, seed) in uniform {
        let controller = run(10, 10_000, algorithm.key(), GeneratorOptions::seeded(seed));
        let stats = controller.statistics();
        assert_eq!(stats.total, 10_000);
        assert!(
            stats.chi_square < 50.0,
            "{algorithm}: chi-square {:.2} too high",
            stats.chi_square
        );
    }
}

#[test]
fn randu_triples_lie_on_planes() {
    let mut randu = digitrace_core::generators::classic::Randu::new(10, 1);
    let xs: Vec<u64> = (0..100).map(|_| randu.next_raw()).collect();
    let m = 1u64 << 31;
    for w in xs.windows(3) {
        let lhs = (w[2] + 9 * w[0]) % m;
        let rhs = (6 * w[1]) % m;
        assert_eq!(lhs, rhs);
    }
}

#[test]
fn quantum_fallback_matches_lcg() {
    let mut options = GeneratorOptions::seeded(31337);
    options.fetcher = Some(Box::new(Offline));
    let quantum = run(10, 500, "quantum", options);
    let lcg = run(10, 500, "lcg", GeneratorOptions::seeded(31337));
    assert_eq!(quantum.state(), RunState::Completed);
    assert_eq!(quantum.stream().sequence, lcg.stream().sequence);
    assert_eq!(quantum.algorithm(), Some("quantum"));
}

#[test]
fn unknown_algorithm_runs_lcg() {
    let fallback = run(10, 200, "no-such-generator", GeneratorOptions::seeded(5));
    let lcg = run(10, 200, "lcg", GeneratorOptions::seeded(5));
    assert_eq!(fallback.algorithm(), Some("lcg"));
    assert_eq!(fallback.stream().sequence, lcg.stream().sequence);
}

#[test]
fn pi_run_starts_with_pi() {
    let controller = run(10, 100, "pi", GeneratorOptions::default());
    assert!(controller.stream().sequence.starts_with("31415926535897932384"));
}

// ---------------------------------------------------------------------------
// Controller invariants
// ---------------------------------------------------------------------------

/// Checks the lead-time invariants after every digit.
struct LeadAudit {
    previous_sum: u64,
    steps: u64,
}

impl StreamObserver for LeadAudit {
    fn on_digit(&mut self, _digit: u8, stream: &DigitStream) -> Flow {
        self.steps += 1;
        let sum: u64 = stream.lead_time.iter().sum();
        let max = *stream.counts.iter().max().unwrap();
        let tied = stream.counts.iter().filter(|&&c| c == max).count() as u64;
        assert_eq!(sum - self.previous_sum, tied);
        assert_eq!(stream.counts.iter().sum::<u64>(), self.steps);
        assert_eq!(stream.sequence.len() as u64, self.steps);
        self.previous_sum = sum;
        Flow::Continue
    }
}

#[test]
fn lead_time_credits_every_tied_leader() {
    for (key, base) in [("lcg", 2), ("middle-square", 10), ("sobol", 4), ("rule30", 16)] {
        let mut controller = StreamController::new(base).unwrap();
        controller
            .start_with(1000, key, GeneratorOptions::seeded(11))
            .unwrap();
        let mut audit = LeadAudit {
            previous_sum: 0,
            steps: 0,
        };
        controller.run_to_completion(&mut audit).unwrap();
        let lead: u64 = controller.stream().lead_time.iter().sum();
        assert!(lead >= 1000, "{key}: lead sum {lead}");
    }
}

#[test]
fn pause_and_resume_do_not_change_the_run() {
    let reference = run(10, 100, "xoshiro", GeneratorOptions::seeded(8));
    for k in 0..100 {
        let mut controller = StreamController::new(10).unwrap();
        controller
            .start_with(100, "xoshiro", GeneratorOptions::seeded(8))
            .unwrap();
        for _ in 0..k {
            controller.step().unwrap();
        }
        controller.pause().unwrap();
        controller.resume().unwrap();
        controller.run_to_completion(&mut NoopObserver).unwrap();

        let (a, b) = (controller.stream(), reference.stream());
        assert_eq!(a.sequence, b.sequence, "paused at {k}");
        assert_eq!(a.counts, b.counts);
        assert_eq!(a.lead_time, b.lead_time);
        assert_eq!(a.time_series, b.time_series);
    }
}

#[test]
fn time_series_points_match_counts() {
    let controller = run(8, 1234, "mersenne", GeneratorOptions::seeded(3));
    let series = &controller.stream().time_series;
    assert_eq!(series.len(), 124);
    for pair in series.windows(2) {
        assert!(pair[0].step < pair[1].step);
    }
    let last = series.last().unwrap();
    assert_eq!(last.step, 1234);
    assert_eq!(last.counts, controller.stream().counts);
    for point in series {
        assert_eq!(point.counts.iter().sum::<u64>(), point.step as u64);
    }
}

#[test]
fn base_change_rejected_mid_run() {
    let mut controller = StreamController::new(10).unwrap();
    controller
        .start_with(500, "pcg", GeneratorOptions::seeded(1))
        .unwrap();
    for _ in 0..50 {
        controller.step().unwrap();
    }
    let before = controller.stream().clone();
    let err = controller.configure_base(16).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(controller.stream(), &before);
    assert_eq!(controller.base(), 10);
}

// ---------------------------------------------------------------------------
// Anomalies and guesses
// ---------------------------------------------------------------------------

/// Digit 1 leads for 120 steps, then digit 0 overtakes on the final digit.
fn late_surge_script() -> Vec<u8> {
    let mut digits = vec![1; 60];
    digits.extend(std::iter::repeat_n(0, 61));
    digits
}

#[test]
fn late_surge_detected_through_controller() {
    let mut controller = StreamController::new(3).unwrap();
    controller.submit_guess(1, BetType::LeadTime).unwrap();
    controller
        .start_with_generator(121, Script::new(3, late_surge_script()))
        .unwrap();
    controller.run_to_completion(&mut NoopObserver).unwrap();

    let stream = controller.stream();
    assert_eq!(stream.counts, vec![61, 60, 0]);
    assert_eq!(stream.lead_time, vec![2, 120, 0]);

    let report = controller.anomaly_report();
    assert_eq!(report.classification, Classification::Anomaly);
    assert_eq!(report.count_winner, Some(0));
    assert_eq!(report.lead_winner, Some(1));
    assert!(report.has(AnomalyKind::LateSurge));
    assert!(report.has(AnomalyKind::MarathonLeader));
    assert!(!report.has(AnomalyKind::Ghost));

    let verdict = controller.verdict().unwrap();
    assert!(verdict.is_correct());
    assert_eq!(verdict.winners[0].value, 120);
}

#[test]
fn ghost_bet_scores_digits_that_never_led() {
    // Digit 2 shows up but never leads; digit 1 never appears.
    let mut digits = vec![0; 80];
    digits.extend(std::iter::repeat_n(2, 20));
    let mut controller = StreamController::new(3).unwrap();
    controller.submit_guess(2, BetType::GhostScore).unwrap();
    controller
        .start_with_generator(100, Script::new(3, digits))
        .unwrap();
    controller.run_to_completion(&mut NoopObserver).unwrap();

    let verdict = controller.verdict().unwrap();
    assert!(verdict.is_correct(), "{}", verdict.message());
    assert_eq!(verdict.winners.len(), 1);
    assert_eq!(verdict.winners[0].value, 20);
    assert_eq!(
        controller.anomaly_report().classification,
        Classification::ConsistentPerformer
    );
}

#[test]
fn final_count_tie_enumerates_winners() {
    let digits: Vec<u8> = (0..100).map(|i| (i % 2) as u8).collect();
    let mut controller = StreamController::new(2).unwrap();
    controller.submit_guess(1, BetType::FinalCount).unwrap();
    controller
        .start_with_generator(100, Script::new(2, digits))
        .unwrap();
    controller.run_to_completion(&mut NoopObserver).unwrap();

    let verdict = controller.verdict().unwrap();
    assert!(verdict.is_correct());
    let winners: Vec<u8> = verdict.winners.iter().map(|w| w.digit).collect();
    assert_eq!(winners, vec![0, 1]);
    let report = controller.anomaly_report();
    assert_eq!(report.count_leaders, vec![0, 1]);
    assert_eq!(report.count_winner, Some(0));
}

#[test]
fn shared_lead_time_is_not_an_anomaly() {
    // Digit 0 leads first, the two tie, then digit 1 pulls ahead: lead time
    // ends level at two steps each.
    let mut controller = StreamController::new(2)
        .unwrap()
        .with_policy(LengthPolicy { min: 1, max: 10 });
    controller
        .start_with_generator(3, Script::new(2, vec![0, 1, 1]))
        .unwrap();
    controller.run_to_completion(&mut NoopObserver).unwrap();

    assert_eq!(controller.stream().counts, vec![1, 2]);
    assert_eq!(controller.stream().lead_time, vec![2, 2]);
    let report = controller.anomaly_report();
    assert_eq!(report.classification, Classification::ConsistentPerformer);
    assert_eq!(report.count_winner, Some(1));
    assert_eq!(report.lead_winner, Some(1));
    assert!(!report.has(AnomalyKind::MarathonLeader));
    assert!(!report.rationale.contains("held the lead longest"));
}

/// Asks to stop at the completion sample.
struct StopOnLastSample(usize);

impl StreamObserver for StopOnLastSample {
    fn on_sample(&mut self, point: &TimeSeriesPoint) -> Flow {
        if point.step == self.0 {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }
}

#[test]
fn stop_on_final_digit_keeps_completed_run() {
    let mut controller = StreamController::new(10).unwrap();
    controller.submit_guess(3, BetType::FinalCount).unwrap();
    controller
        .start_with(200, "pcg", GeneratorOptions::seeded(4))
        .unwrap();
    let state = controller
        .run_to_completion(&mut StopOnLastSample(200))
        .unwrap();
    assert_eq!(state, RunState::Completed);
    assert_eq!(controller.stream().produced, 200);
    assert!(controller.verdict().is_some());
    assert!(controller.run_id().is_some());
}

#[test]
fn guess_for_next_run_accepted_after_completion() {
    let mut controller = StreamController::new(16).unwrap();
    controller.start(256, "sobol").unwrap();
    controller.run_to_completion(&mut NoopObserver).unwrap();
    assert!(controller.verdict().is_none());

    controller.submit_guess(7, BetType::FinalCount).unwrap();
    assert_eq!(controller.state(), RunState::Completed);
    assert_eq!(controller.pending_guess().map(|g| g.digit), Some(7));

    controller.start(256, "sobol").unwrap();
    controller.run_to_completion(&mut NoopObserver).unwrap();
    let verdict = controller.verdict().unwrap();
    assert_eq!(verdict.guess.digit, 7);
    assert!(verdict.is_correct());
    assert!(controller.pending_guess().is_none());
}

#[test]
fn exhausted_generator_aborts_run() {
    let mut controller = StreamController::new(10).unwrap();
    controller
        .start_with_generator(100, Script::new(10, vec![4; 10]))
        .unwrap();
    let err = controller.run_to_completion(&mut NoopObserver).unwrap_err();
    assert!(matches!(err, Error::GeneratorExhausted { produced: 10, .. }));
    assert_eq!(controller.state(), RunState::Aborted);
    assert!(controller.step().is_err());
}

#[test]
fn statistics_of_snapshot_match_counts() {
    let controller = run(16, 4096, "sobol", GeneratorOptions::default());
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.statistics, compute_statistics(&snapshot.counts));
    assert!(snapshot.counts.iter().all(|&c| c == 256));
    assert_eq!(snapshot.statistics.chi_square, 0.0);
    assert_eq!(snapshot.labels.len(), 16);
    assert_eq!(snapshot.base_name, "Hexadecimal");
}
