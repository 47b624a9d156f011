//! Batch runner for balance statistics.
//!
//! Plays many seeded battles in parallel using rayon. Each battle stays on a
//! single thread.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skirmish_core::config::SessionConfig;
use skirmish_core::events::Winner;
use skirmish_core::session::{Outcome, Session};
use tracing::{info, warn};

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Template for every battle. Its seed is ignored.
    pub session: SessionConfig,
    /// Number of battles.
    pub count: u32,
    /// Seed of the first battle; battle `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Worker threads (0 = rayon default).
    pub threads: usize,
}

impl BatchConfig {
    /// Run `count` battles of `session`.
    #[must_use]
    pub fn new(session: SessionConfig, count: u32) -> Self {
        Self {
            session,
            count,
            seed_start: 0,
            threads: 0,
        }
    }

    /// Set the first seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }
}

/// Aggregate results of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Battles finished.
    pub games: u32,
    /// Wins per side, plus draws.
    pub wins: BTreeMap<String, u32>,
    /// Mean rounds per battle.
    pub mean_rounds: f64,
    /// Seeds whose session could not be built.
    pub failed_seeds: Vec<u64>,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
}

impl BatchSummary {
    fn from_outcomes(outcomes: &[Outcome], failed_seeds: Vec<u64>, duration_seconds: f64) -> Self {
        let mut wins = BTreeMap::new();
        for winner in [Winner::Heroes, Winner::Monsters, Winner::Draw] {
            wins.insert(format!("{winner:?}"), 0);
        }
        for outcome in outcomes {
            *wins.entry(format!("{:?}", outcome.winner)).or_insert(0) += 1;
        }
        let total_rounds: u64 = outcomes.iter().map(|o| u64::from(o.rounds)).sum();
        let mean_rounds = if outcomes.is_empty() {
            0.0
        } else {
            total_rounds as f64 / outcomes.len() as f64
        };
        Self {
            games: outcomes.len() as u32,
            wins,
            mean_rounds,
            failed_seeds,
            duration_seconds,
        }
    }

    /// Win rate of one side (0.0 - 1.0).
    #[must_use]
    pub fn win_rate(&self, winner: Winner) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        let wins = self.wins.get(&format!("{winner:?}")).copied().unwrap_or(0);
        f64::from(wins) / f64::from(self.games)
    }

    /// Save as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Run a batch of battles.
pub fn run_batch(config: &BatchConfig) -> BatchSummary {
    let start = Instant::now();
    info!(
        count = config.count,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    let play = || -> Vec<(u64, Option<Outcome>)> {
        (0..config.count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(u64::from(i));
                let session_config = config.session.clone().with_seed(seed);
                match Session::new(&session_config) {
                    Ok(session) => (seed, Some(session.play_out())),
                    Err(e) => {
                        warn!(seed, error = %e, "battle failed to start");
                        (seed, None)
                    }
                }
            })
            .collect()
    };

    let results = if config.threads > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
        {
            Ok(pool) => pool.install(play),
            Err(e) => {
                warn!(error = %e, "falling back to the global pool");
                play()
            }
        }
    } else {
        play()
    };

    let mut outcomes = Vec::with_capacity(results.len());
    let mut failed_seeds = Vec::new();
    for (seed, outcome) in results {
        match outcome {
            Some(outcome) => outcomes.push(outcome),
            None => failed_seeds.push(seed),
        }
    }

    let summary =
        BatchSummary::from_outcomes(&outcomes, failed_seeds, start.elapsed().as_secs_f64());
    info!(
        games = summary.games,
        mean_rounds = summary.mean_rounds,
        duration = summary.duration_seconds,
        "Batch complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_counts_every_game() {
        let config = BatchConfig::new(SessionConfig::new(1).with_mission("capture_point"), 12)
            .with_seed(100);
        let summary = run_batch(&config);

        assert_eq!(summary.games, 12);
        assert_eq!(summary.wins.values().sum::<u32>(), 12);
        assert!(summary.failed_seeds.is_empty());
        assert!(summary.mean_rounds >= 1.0);
        let total: f64 = [Winner::Heroes, Winner::Monsters, Winner::Draw]
            .into_iter()
            .map(|w| summary.win_rate(w))
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_batch_is_reproducible() {
        let config = BatchConfig {
            threads: 2,
            ..BatchConfig::new(SessionConfig::new(2), 8).with_seed(7)
        };
        let a = run_batch(&config);
        let b = run_batch(&config);
        assert_eq!(a.wins, b.wins);
        assert!((a.mean_rounds - b.mean_rounds).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_template_fails_every_seed() {
        let config = BatchConfig::new(SessionConfig::new(1).with_preset("volcano"), 3);
        let summary = run_batch(&config);
        assert_eq!(summary.games, 0);
        assert_eq!(summary.failed_seeds, vec![0, 1, 2]);
        assert!(summary.mean_rounds.abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_save() {
        let summary = run_batch(&BatchConfig::new(SessionConfig::new(1), 2));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("batch.json");
        summary.save(&path).unwrap();
        let loaded: BatchSummary =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(loaded.wins, summary.wins);
    }
}
