//! Error types for the battle simulation.
//!
//! Only session construction, config loading and replay IO can fail.
//! Once a [`Session`](crate::session::Session) exists, advancing it never errors.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for the simulation core.
#[derive(Debug, Error)]
pub enum SimError {
    /// A map preset name that is not in the preset table.
    #[error("Unknown map preset: {0}")]
    UnknownPreset(String),

    /// A mission selector that names no known mission.
    #[error("Unknown mission: {0}")]
    UnknownMission(String),

    /// A unit kind name that is not in the kind table.
    #[error("Unknown unit kind: {0}")]
    UnknownUnitKind(String),

    /// Config values that cannot produce a playable session.
    #[error("Invalid session config: {0}")]
    InvalidConfig(String),

    /// Failed to read a config file.
    #[error("Failed to read config file: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// Failed to parse a RON config.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Replay encode/decode or verification failure.
    #[error("Replay error: {0}")]
    Replay(String),
}
