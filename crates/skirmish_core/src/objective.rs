//! Mission objectives.
//!
//! An [`Objective`] tracks progress toward one of four missions. It is driven
//! by three hooks on [`Battlefield`]:
//!
//! - [`Battlefield::on_step`] after every movement step,
//! - [`Battlefield::observe`] after every combat or status event,
//! - [`Battlefield::end_round`] once per completed round.
//!
//! Completion and failure are mutually exclusive and final.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battlefield::Battlefield;
use crate::error::SimError;
use crate::events::SimEvent;
use crate::math::GridPos;
use crate::unit::{Side, UnitId};
use crate::unit_kind::UnitKind;

/// The four mission kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    /// Hold the centre tile.
    CapturePoint,
    /// Walk the VIP to the exit.
    Escort,
    /// Outlast the reinforcement waves.
    Survival,
    /// Destroy the totem.
    DestroyStructure,
}

impl MissionKind {
    /// All missions.
    pub const ALL: [Self; 4] = [
        Self::CapturePoint,
        Self::Escort,
        Self::Survival,
        Self::DestroyStructure,
    ];

    /// Name used in configs and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CapturePoint => "capture_point",
            Self::Escort => "escort",
            Self::Survival => "survival",
            Self::DestroyStructure => "destroy_structure",
        }
    }
}

impl fmt::Display for MissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissionKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| SimError::UnknownMission(s.to_string()))
    }
}

/// Mission anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveParams {
    /// Tile to hold.
    CapturePoint {
        /// Control tile.
        point: GridPos,
    },
    /// Unit to escort and its goal.
    Escort {
        /// Escorted unit.
        vip: UnitId,
        /// Goal tile.
        exit: GridPos,
    },
    /// Reinforcement cadence.
    Survival {
        /// Rounds between waves.
        interval: u32,
    },
    /// Structure to destroy.
    DestroyStructure {
        /// Target structure.
        structure: UnitId,
    },
}

/// Live mission state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Objective {
    /// Anchors.
    pub params: ObjectiveParams,
    /// Current progress.
    pub progress: u32,
    /// Progress needed to complete.
    pub required: u32,
    /// Mission won.
    pub completed: bool,
    /// Mission lost.
    pub failed: bool,
}

impl Objective {
    /// Fresh objective.
    #[must_use]
    pub const fn new(params: ObjectiveParams, required: u32) -> Self {
        Self {
            params,
            progress: 0,
            required,
            completed: false,
            failed: false,
        }
    }

    /// Mission kind.
    #[must_use]
    pub const fn mission(&self) -> MissionKind {
        match self.params {
            ObjectiveParams::CapturePoint { .. } => MissionKind::CapturePoint,
            ObjectiveParams::Escort { .. } => MissionKind::Escort,
            ObjectiveParams::Survival { .. } => MissionKind::Survival,
            ObjectiveParams::DestroyStructure { .. } => MissionKind::DestroyStructure,
        }
    }

    /// True once completed or failed.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.completed || self.failed
    }

    /// The `objective_init` event.
    #[must_use]
    pub fn init_event(&self) -> SimEvent {
        let mut control_point = None;
        let mut vip = None;
        let mut exit = None;
        let mut structure = None;
        let mut interval = None;
        match self.params {
            ObjectiveParams::CapturePoint { point } => control_point = Some(point),
            ObjectiveParams::Escort { vip: v, exit: e } => {
                vip = Some(v);
                exit = Some(e);
            }
            ObjectiveParams::Survival { interval: i } => interval = Some(i),
            ObjectiveParams::DestroyStructure { structure: s } => structure = Some(s),
        }
        SimEvent::ObjectiveInit {
            mission: self.mission(),
            required: self.required,
            control_point,
            vip,
            exit,
            structure,
            interval,
        }
    }

    fn progress_event(&self, holder: Option<UnitId>) -> SimEvent {
        SimEvent::ObjectiveProgress {
            mission: self.mission(),
            progress: self.progress,
            required: self.required,
            holder,
        }
    }

    fn complete(&mut self) -> SimEvent {
        self.completed = true;
        SimEvent::ObjectiveComplete {
            mission: self.mission(),
        }
    }

    fn fail(&mut self) -> SimEvent {
        self.failed = true;
        SimEvent::ObjectiveFail {
            mission: self.mission(),
        }
    }
}

impl Battlefield {
    /// Move hook: runs after `mover` completes a step.
    pub fn on_step(&mut self, mover: UnitId) -> Vec<SimEvent> {
        let pos = self.unit(mover).pos;
        let Some(objective) = self.objective.as_mut() else {
            return Vec::new();
        };
        if objective.is_resolved() {
            return Vec::new();
        }
        match objective.params {
            ObjectiveParams::Escort { vip, exit } if vip == mover && pos == exit => {
                objective.progress = objective.required;
                vec![objective.complete()]
            }
            _ => Vec::new(),
        }
    }

    /// Event hook: runs after every combat or status event.
    pub fn observe(&mut self, event: &SimEvent) -> Vec<SimEvent> {
        let structure_hp = match self.objective.as_ref().map(|o| o.params) {
            Some(ObjectiveParams::DestroyStructure { structure }) => Some(self.unit(structure).hp),
            _ => None,
        };
        let Some(objective) = self.objective.as_mut() else {
            return Vec::new();
        };
        if objective.is_resolved() {
            return Vec::new();
        }
        match (objective.params, event) {
            (ObjectiveParams::Escort { vip, .. }, SimEvent::Death { target }) if *target == vip => {
                vec![objective.fail()]
            }
            (ObjectiveParams::DestroyStructure { structure }, SimEvent::Damage { target, .. })
                if *target == structure =>
            {
                let hp = structure_hp.unwrap_or_default();
                objective.progress = objective.required.saturating_sub(hp);
                vec![objective.progress_event(None)]
            }
            (ObjectiveParams::DestroyStructure { structure }, SimEvent::Death { target })
                if *target == structure =>
            {
                vec![objective.complete()]
            }
            _ => Vec::new(),
        }
    }

    /// Round-end hook: runs once after every completed round.
    pub fn end_round(&mut self) -> Vec<SimEvent> {
        let Some(params) = self.objective.as_ref().filter(|o| !o.is_resolved()).map(|o| o.params)
        else {
            return Vec::new();
        };
        match params {
            ObjectiveParams::CapturePoint { point } => self.score_capture(point),
            ObjectiveParams::Survival { interval } => self.score_survival(interval),
            ObjectiveParams::Escort { .. } | ObjectiveParams::DestroyStructure { .. } => Vec::new(),
        }
    }

    fn score_capture(&mut self, point: GridPos) -> Vec<SimEvent> {
        let holder = self
            .occupant(point)
            .filter(|&id| self.unit(id).side == Side::Heroes);
        let Some(objective) = self.objective.as_mut() else {
            return Vec::new();
        };
        let mut events = Vec::new();
        match holder {
            Some(holder) => {
                objective.progress += 1;
                events.push(objective.progress_event(Some(holder)));
                if objective.progress >= objective.required {
                    events.push(objective.complete());
                }
            }
            None if objective.progress > 0 => {
                objective.progress = 0;
                events.push(objective.progress_event(None));
            }
            None => {}
        }
        events
    }

    fn score_survival(&mut self, interval: u32) -> Vec<SimEvent> {
        let Some(objective) = self.objective.as_mut() else {
            return Vec::new();
        };
        objective.progress += 1;
        let progress = objective.progress;
        let done = progress >= objective.required;
        let mut events = vec![objective.progress_event(None)];
        if !done && progress % interval == 0 {
            events.extend(self.spawn_wave());
        }
        if done {
            if let Some(objective) = self.objective.as_mut() {
                events.push(objective.complete());
            }
        }
        events
    }

    /// Spawn one tier-scaled goblin on a random free row of the far edge.
    fn spawn_wave(&mut self) -> Vec<SimEvent> {
        let column = self.map.width() - 1;
        let rows: Vec<i32> = (0..self.map.height())
            .filter(|&y| self.is_free(GridPos::new(column, y)))
            .collect();
        let Some(&row) = self.rng.choose(&rows) else {
            debug!(round = self.round, "no free row for reinforcements");
            return Vec::new();
        };
        let profile = UnitKind::Goblin.profile().scaled_for_tier(self.tier);
        let id = self.spawn(Side::Monsters, profile, GridPos::new(column, row));
        debug!(round = self.round, unit = %id, row, "wave spawned");
        vec![SimEvent::WaveSpawn {
            round: self.round,
            units: vec![self.unit(id).snapshot()],
        }]
    }
}
