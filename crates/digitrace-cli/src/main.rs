//! CLI for digitrace: race digit generators and bet on the winner.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "digitrace")]
#[command(about = "digitrace: race digit generators and bet on the winner")]
#[command(version = digitrace_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every digit generator with its category and mechanism
    Algorithms {
        /// Also print how each generator turns state into digits
        #[arg(long)]
        verbose: bool,
    },

    /// List the supported bases (2-16) with names and digit labels
    Bases,

    /// Run one digit race and report the winner, the lead and any anomaly
    Run {
        /// Generator key (see `digitrace algorithms`); unknown keys fall back to lcg
        #[arg(long, short)]
        algorithm: Option<String>,

        /// Digit base, 2-16
        #[arg(long, short)]
        base: Option<u8>,

        /// Number of digits to generate
        #[arg(long, short = 'n')]
        digits: Option<usize>,

        /// Record a time-series point every N digits
        #[arg(long)]
        sample_every: Option<usize>,

        /// Seed: an integer, or any phrase (hashed with SHA-256)
        #[arg(long)]
        seed: Option<String>,

        /// Read bytes from this file for the `file` generator (selects it when
        /// --algorithm is not given)
        #[arg(long)]
        file: Option<String>,

        /// Digit label to bet on, e.g. 7 or C
        #[arg(long)]
        guess: Option<String>,

        /// What the guess bets on
        #[arg(long, default_value = "final_count", value_parser = ["final_count", "lead_time", "ghost_score"])]
        bet: String,

        /// Sleep this many milliseconds after each digit
        #[arg(long, default_value = "0")]
        delay_ms: u64,

        /// JSON run configuration; flags override its fields
        #[arg(long)]
        config: Option<String>,

        /// Write the final snapshot as JSON
        #[arg(long)]
        output: Option<String>,

        /// Suppress the progress line
        #[arg(long, short)]
        quiet: bool,
    },

    /// Run the statistical test battery against each generator
    Report {
        /// Digits sampled per generator
        #[arg(long, short = 'n', default_value = "20000")]
        digits: usize,

        /// Digit base, 2-16
        #[arg(long, short, default_value = "10")]
        base: u8,

        /// Comma-separated generator keys, or "all" (default skips quantum and file)
        #[arg(long)]
        algorithms: Option<String>,

        /// Seed shared by every generator
        #[arg(long, default_value = "digitrace")]
        seed: String,

        /// Write a Markdown report to this path
        #[arg(long)]
        output: Option<String>,
    },

    /// Start the HTTP server
    Serve {
        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port
        #[arg(long, default_value = "8042")]
        port: u16,

        /// JSON run configuration used for request defaults
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Algorithms { verbose } => commands::algorithms::run(verbose),
        Commands::Bases => commands::bases::run(),
        Commands::Run {
            algorithm,
            base,
            digits,
            sample_every,
            seed,
            file,
            guess,
            bet,
            delay_ms,
            config,
            output,
            quiet,
        } => commands::run::run(commands::run::RunCommandConfig {
            algorithm: algorithm.as_deref(),
            base,
            digits,
            sample_every,
            seed: seed.as_deref(),
            file_path: file.as_deref(),
            guess: guess.as_deref(),
            bet: &bet,
            delay_ms,
            config_path: config.as_deref(),
            output_path: output.as_deref(),
            quiet,
        }),
        Commands::Report {
            digits,
            base,
            algorithms,
            seed,
            output,
        } => commands::report::run(digits, base, algorithms.as_deref(), &seed, output.as_deref()),
        Commands::Serve { host, port, config } => {
            commands::serve::run(&host, port, config.as_deref())
        }
    }
}
