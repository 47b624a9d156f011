//! Headless battle runner.
//!
//! # Usage
//!
//! ```bash
//! # Stream one battle as JSON lines
//! cargo run -p skirmish_headless -- run --tier 2 --mission capture_point --seed 42
//!
//! # Load settings from RON, flags override
//! cargo run -p skirmish_headless -- run --config battle.ron --seed 1
//!
//! # Batch statistics
//! cargo run -p skirmish_headless -- batch --count 500 --output results/batch.json
//!
//! # Verify a saved replay
//! cargo run -p skirmish_headless -- verify --replay battle.replay
//! ```
//!
//! Events and summaries go to stdout, logs to stderr. `RUST_LOG` overrides
//! the default log filter.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skirmish_core::config::SessionConfig;
use skirmish_core::replay::Replay;
use skirmish_headless::{run_batch, run_to_writer, BatchConfig, Result};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless tactical battle runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command that builds sessions.
#[derive(Args)]
struct SessionArgs {
    /// RON config file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Difficulty tier
    #[arg(short, long)]
    tier: Option<u32>,

    /// Mission: capture_point, escort, survival or destroy_structure
    #[arg(short, long)]
    mission: Option<String>,

    /// Map preset: open, ruins, marsh or crossroads
    #[arg(short, long)]
    preset: Option<String>,
}

impl SessionArgs {
    fn load(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };
        if let Some(tier) = self.tier {
            config.tier = tier;
        }
        if let Some(mission) = &self.mission {
            config.mission = Some(mission.clone());
        }
        if let Some(preset) = &self.preset {
            config.preset = Some(preset.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play one battle and stream its events
    Run {
        #[command(flatten)]
        session: SessionArgs,

        /// Seed (random when omitted)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Save a replay record here
        #[arg(long)]
        replay_out: Option<PathBuf>,
    },

    /// Play many seeded battles and summarize
    Batch {
        #[command(flatten)]
        session: SessionArgs,

        /// Number of battles
        #[arg(short = 'n', long, default_value = "100")]
        count: u32,

        /// First seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Worker threads (0 = auto)
        #[arg(long, default_value = "0")]
        threads: usize,

        /// Also write the summary to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that a saved replay still reproduces
    Verify {
        /// Replay file path
        #[arg(short, long)]
        replay: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Run {
            session,
            seed,
            replay_out,
        } => cmd_run(&session, seed, replay_out),
        Commands::Batch {
            session,
            count,
            seed,
            threads,
            output,
        } => cmd_batch(&session, count, seed, threads, output),
        Commands::Verify { replay } => cmd_verify(replay),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(args: &SessionArgs, seed: Option<u64>, replay_out: Option<PathBuf>) -> Result<ExitCode> {
    let mut config = args.load()?;
    if seed.is_some() {
        config.seed = seed;
    }
    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    run_to_writer(&config, &mut out, replay_out.as_deref())?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_batch(
    args: &SessionArgs,
    count: u32,
    seed: u64,
    threads: usize,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let config = BatchConfig {
        threads,
        ..BatchConfig::new(args.load()?, count).with_seed(seed)
    };
    let summary = run_batch(&config);

    if let Some(path) = output {
        summary.save(&path)?;
        tracing::info!(path = %path.display(), "summary saved");
    }
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &summary)?;
    writeln!(stdout)?;

    if summary.failed_seeds.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_verify(path: PathBuf) -> Result<ExitCode> {
    let replay = Replay::load(&path)?;
    let matches = replay.verify()?;
    tracing::info!(
        path = %path.display(),
        seed = replay.outcome.seed,
        events = replay.outcome.event_count,
        matches,
        "replay verified"
    );
    println!("{}", if matches { "OK" } else { "MISMATCH" });
    Ok(if matches {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
