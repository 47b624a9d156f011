//! Replay records for reproducing and checking battles.
//!
//! A battle is a pure function of its config and seed, so a replay stores
//! only those plus a fingerprint of the stream they produced. Playing it
//! back rebuilds the session and compares fingerprints. The fingerprint is
//! FNV-1a over bincode bytes (see [`crate::hashing`]), so a record stays
//! valid across toolchain upgrades.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::SessionConfig;
use crate::error::{Result, SimError};
use crate::session::{Outcome, Session};

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 2;

/// A recorded battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Config the battle ran with. The seed is always set.
    pub config: SessionConfig,
    /// Fingerprint of the recorded stream.
    pub outcome: Outcome,
}

impl Replay {
    /// Run a battle to completion and record it.
    ///
    /// An unset seed is resolved first so the record can be played back.
    pub fn record(config: &SessionConfig) -> Result<Self> {
        let config = config.clone().with_seed(config.resolve_seed());
        let outcome = Session::new(&config)?.play_out();
        Ok(Self::from_outcome(&config, outcome))
    }

    /// Record a battle that has already been played out.
    #[must_use]
    pub fn from_outcome(config: &SessionConfig, outcome: Outcome) -> Self {
        Self {
            version: REPLAY_VERSION,
            config: config.clone().with_seed(outcome.seed),
            outcome,
        }
    }

    /// Fresh session at the start of the recorded battle.
    pub fn session(&self) -> Result<Session> {
        Session::new(&self.config)
    }

    /// Replay the battle and check it matches the record.
    pub fn verify(&self) -> Result<bool> {
        let outcome = self.session()?.play_out();
        if outcome != self.outcome {
            tracing::warn!(
                expected = self.outcome.stream_hash,
                actual = outcome.stream_hash,
                "replay diverged"
            );
        }
        Ok(outcome == self.outcome)
    }

    /// Encode to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| SimError::Replay(format!("Failed to serialize replay: {e}")))
    }

    /// Decode from bytes, rejecting other format versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let replay: Self = bincode::deserialize(bytes)
            .map_err(|e| SimError::Replay(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(SimError::Replay(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }
        Ok(replay)
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| SimError::Replay(format!("Failed to write replay file: {e}")))
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading, decoding or the version check fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| SimError::Replay(format!("Failed to read replay file: {e}")))?;
        Self::from_bytes(&bytes)
    }
}
