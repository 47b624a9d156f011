//! # Skirmish Core
//!
//! Deterministic turn-based tactical battle simulation.
//!
//! This crate contains **only** battle logic:
//! - No rendering
//! - No transport or stdout
//! - No unseeded randomness once a session exists
//! - No floating-point math (uses fixed-point)
//!
//! A battle is consumed as a pull stream of [`SimEvent`](events::SimEvent)s,
//! one per call to [`Session::pull_event`](session::Session::pull_event).
//!
//! ## Crate Structure
//!
//! - [`session`] - Turn scheduler and event stream
//! - [`encounter`] - Map, roster and mission generation
//! - [`ai`] - Per-behavior action selection
//! - [`combat`] - Attacks, crits and on-hit effects
//! - [`movement`] - Pathed movement, zone of control and tile effects
//! - [`objective`] - Mission state and hooks
//! - [`replay`] - Recorded battles
//! - [`math`] - Fixed-point and grid utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod battlefield;
pub mod combat;
pub mod config;
pub mod encounter;
pub mod error;
pub mod events;
pub mod hashing;
pub mod map;
pub mod math;
pub mod movement;
pub mod objective;
pub mod pathfinding;
pub mod replay;
pub mod rng;
pub mod session;
pub mod unit;
pub mod unit_kind;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battlefield::Battlefield;
    pub use crate::config::SessionConfig;
    pub use crate::error::{Result, SimError};
    pub use crate::events::{Phase, SimEvent, StatusKind, Winner};
    pub use crate::map::{BattleMap, Terrain};
    pub use crate::math::{Fixed, GridPos};
    pub use crate::objective::{MissionKind, Objective, ObjectiveParams};
    pub use crate::replay::Replay;
    pub use crate::rng::SimRng;
    pub use crate::session::{create_session, Outcome, Session};
    pub use crate::unit::{Side, Unit, UnitId};
    pub use crate::unit_kind::{UnitKind, UnitProfile};
}
