use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use digitrace_core::{
    BetType, DigitStream, Flow, RunState, StreamController, StreamObserver, StreamSnapshot, label,
    parse_seed,
};

pub struct RunCommandConfig<'a> {
    pub algorithm: Option<&'a str>,
    pub base: Option<u8>,
    pub digits: Option<usize>,
    pub sample_every: Option<usize>,
    pub seed: Option<&'a str>,
    pub file_path: Option<&'a str>,
    pub guess: Option<&'a str>,
    pub bet: &'a str,
    pub delay_ms: u64,
    pub config_path: Option<&'a str>,
    pub output_path: Option<&'a str>,
    pub quiet: bool,
}

/// Prints progress, honours Ctrl+C and paces the run.
struct Progress {
    cancelled: Arc<AtomicBool>,
    delay: Option<Duration>,
    every: usize,
    quiet: bool,
}

impl StreamObserver for Progress {
    fn on_digit(&mut self, _digit: u8, stream: &DigitStream) -> Flow {
        if self.cancelled.load(Ordering::SeqCst) {
            return Flow::Stop;
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if !self.quiet && (stream.produced % self.every == 0 || stream.is_complete()) {
            eprint!(
                "\r  {:>6}/{} digits  leading: {}   ",
                stream.produced,
                stream.target_length,
                leaders_text(&stream.counts)
            );
            let _ = std::io::stderr().flush();
        }
        Flow::Continue
    }

    fn on_complete(&mut self, _snapshot: &StreamSnapshot) {
        if !self.quiet {
            eprintln!();
        }
    }
}

fn leaders_text(counts: &[u64]) -> String {
    let leaders = digitrace_core::leaders(counts);
    if leaders.is_empty() {
        return "-".to_string();
    }
    leaders
        .iter()
        .map(|&d| label(d as u8).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn run(cfg: RunCommandConfig) {
    let mut config = super::load_config(cfg.config_path);
    if let Some(algorithm) = cfg.algorithm {
        config.algorithm = algorithm.to_string();
    } else if cfg.file_path.is_some() {
        config.algorithm = "file".to_string();
    }
    if let Some(base) = cfg.base {
        config.base = base;
    }
    if let Some(digits) = cfg.digits {
        config.digits = digits;
    }
    if let Some(every) = cfg.sample_every {
        config.sample_every = every;
    }
    if let Some(seed) = cfg.seed {
        config.seed = Some(parse_seed(seed));
    }

    let bet: BetType = cfg.bet.parse().unwrap_or_else(|e| super::fail(e));
    let mut controller = StreamController::from_config(&config).unwrap_or_else(|e| super::fail(e));
    if let Some(guess) = cfg.guess {
        if let Err(e) = controller.submit_guess_label(guess, bet) {
            super::fail(e);
        }
    }

    let mut options = config.generator_options();
    if let Some(path) = cfg.file_path {
        match std::fs::read(path) {
            Ok(bytes) => options.file_bytes = Some(bytes),
            Err(e) => super::fail(format!("cannot read {path}: {e}")),
        }
    }

    if let Err(e) = controller.start_with(config.digits, &config.algorithm, options) {
        super::fail(e);
    }
    let config_base = controller.base_config().clone();
    let algorithm = controller.algorithm().unwrap_or("?");
    println!(
        "\u{1F3C1} {} digits of {} in base {} ({})",
        config.digits, algorithm, config_base.base, config_base.name
    );
    if let Some(guess) = controller.pending_guess() {
        println!("   Your bet: {} on {}", label(guess.digit), guess.bet);
    }

    let cancelled = Arc::new(AtomicBool::new(false));
    let c = cancelled.clone();
    if let Err(e) = ctrlc::set_handler(move || c.store(true, Ordering::SeqCst)) {
        eprintln!("Warning: cannot install Ctrl+C handler: {e}");
    }
    let mut progress = Progress {
        cancelled,
        delay: (cfg.delay_ms > 0).then(|| Duration::from_millis(cfg.delay_ms)),
        every: (config.digits / 100).max(1),
        quiet: cfg.quiet,
    };

    match controller.run_to_completion(&mut progress) {
        Ok(RunState::Completed) => {}
        Ok(RunState::Idle) => {
            eprintln!();
            println!("Run cancelled.");
            return;
        }
        Ok(state) => super::fail(format!("run ended while {state}")),
        Err(e) => super::fail(e),
    }

    let snapshot = controller.snapshot();
    print_results(&snapshot);

    if let Some(path) = cfg.output_path {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => println!("\n\u{1F4C4} Snapshot saved to: {path}"),
                Err(e) => eprintln!("Failed to write snapshot to {path}: {e}"),
            },
            Err(e) => eprintln!("Failed to serialize snapshot: {e}"),
        }
    }
}

fn print_results(snapshot: &StreamSnapshot) {
    let stats = &snapshot.statistics;
    let max_count = snapshot.counts.iter().copied().max().unwrap_or(0).max(1);

    println!("\n{:<6} {:>7} {:>7} {:>6}", "Digit", "Count", "Lead", "Tally");
    println!("{}", "-".repeat(60));
    for (d, (&count, &lead)) in snapshot
        .counts
        .iter()
        .zip(&snapshot.lead_time)
        .enumerate()
    {
        let bar_len = (count * 30 / max_count) as usize;
        println!(
            "  {:<4} {:>7} {:>7} {:>6}  {}",
            label(d as u8),
            count,
            lead,
            count / 5,
            "\u{2588}".repeat(bar_len)
        );
    }

    println!("\nStatistics:");
    println!("  digits:      {}", stats.total);
    println!("  expected:    {:.2} per digit", stats.expected);
    println!("  mean:        {:.4}", stats.mean);
    println!("  std dev:     {:.4}", stats.std_dev);
    println!("  chi-square:  {:.4}", stats.chi_square);

    let report = &snapshot.anomaly;
    println!("\nOutcome: {}", report.classification);
    println!("  {}", report.rationale);

    if let Some(verdict) = &snapshot.verdict {
        let mark = if verdict.is_correct() { "\u{2713}" } else { "\u{2717}" };
        println!("\n{mark} {}", verdict.message());
    }
}
