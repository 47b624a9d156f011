//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a battle produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! A session is a pure function of its config and seed. Sources of
//! non-determinism to watch for:
//!
//! - **Hash iteration order**: Rust's default hasher is randomized.
//!   Rosters are `Vec`s in spawn order and shrines live in a `BTreeSet`.
//!
//! - **Unseeded randomness**: Everything after construction draws from the
//!   session's [`SimRng`](skirmish_core::rng::SimRng).
//!
//! - **Floating-point math**: Damage scaling goes through
//!   [`skirmish_core::math::Fixed`].
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual rules (combat, movement, objectives)
//! 2. **Property tests**: Random configs must still replay identically
//! 3. **Parallel tests**: Running N sessions on N threads all match

use std::thread;

use skirmish_core::config::SessionConfig;
use skirmish_core::events::SimEvent;
use skirmish_core::session::Session;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps taken per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// All unique hashes (1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Session is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Builds the initial state
/// * `step` - Advances the state by one step
/// * `hash` - Computes the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..steps {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Pull `num_events` events from two sessions built from `config` and
/// compare their state hashes.
///
/// # Panics
///
/// Panics if `config` cannot build a session.
#[must_use]
pub fn verify_session_determinism(config: &SessionConfig, num_events: u64) -> bool {
    verify_determinism(
        2,
        num_events,
        || Session::new(config).expect("config should build a session"),
        |session| {
            let _ = session.pull_event();
        },
        Session::state_hash,
    )
    .is_deterministic
}

/// Result of parallel session runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Stream hash from each session.
    pub hashes: Vec<u64>,
    /// Number of sessions run.
    pub num_sessions: usize,
}

impl ParallelRunResult {
    /// Check if all sessions produced identical streams.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all sessions matched.
    ///
    /// # Panics
    ///
    /// Panics if sessions produced different hashes.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic(),
            "Parallel sessions diverged!\nSessions: {}\nAll hashes: {:?}",
            self.num_sessions,
            self.hashes
        );
    }
}

/// Play the same battle to completion on `num_sessions` scoped threads.
///
/// # Panics
///
/// Panics if `config` cannot build a session or a worker thread panics.
#[must_use]
pub fn run_parallel_sessions(config: &SessionConfig, num_sessions: usize) -> ParallelRunResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sessions)
            .map(|_| {
                s.spawn(|| {
                    Session::new(config)
                        .expect("config should build a session")
                        .play_out()
                        .stream_hash
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("session thread panicked"))
            .collect()
    });

    ParallelRunResult {
        hashes,
        num_sessions,
    }
}

/// Pull two sessions side by side and return the index of the first event
/// that differs, or `None` if the streams match to the end.
///
/// # Panics
///
/// Panics if `config` cannot build a session.
#[must_use]
pub fn find_first_divergence(
    config: &SessionConfig,
) -> Option<(u64, Option<SimEvent>, Option<SimEvent>)> {
    let mut left = Session::new(config).expect("config should build a session");
    let mut right = Session::new(config).expect("config should build a session");

    let mut index = 0;
    loop {
        let (a, b) = (left.pull_event(), right.pull_event());
        if a != b {
            tracing::debug!(index, ?a, ?b, "streams diverged");
            return Some((index, a, b));
        }
        if a.is_none() {
            return None;
        }
        index += 1;
    }
}
