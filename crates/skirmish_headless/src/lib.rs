//! Headless battle runner for CI and balance checks.
//!
//! Runs [`skirmish_core`] sessions without any delivery layer:
//!
//! - **Streaming**: Every event of one battle as a JSON line
//! - **Batch**: Win statistics over a range of seeds, in parallel
//! - **Replay verification**: Check a saved replay still reproduces
//!
//! # Output
//!
//! - **stdout**: Events or summaries (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Stream one battle
//! cargo run -p skirmish_headless -- run --mission escort --seed 7
//!
//! # Win rates over 1000 seeds
//! cargo run -p skirmish_headless -- batch --count 1000 --seed 0
//!
//! # Record, then verify
//! cargo run -p skirmish_headless -- run --seed 7 --replay-out battle.replay > /dev/null
//! cargo run -p skirmish_headless -- verify --replay battle.replay
//! ```

pub mod batch;
pub mod error;
pub mod runner;

pub use batch::{run_batch, BatchConfig, BatchSummary};
pub use error::{HeadlessError, Result};
pub use runner::{run_to_writer, write_event};
