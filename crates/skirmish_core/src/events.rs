//! Events emitted by a battle session.
//!
//! Every observable effect is reported as one [`SimEvent`]. The stream of
//! events is the only output of the simulation, so the enum is serialized
//! internally tagged: `{"type": "damage", "target": 3, ...}`.

use serde::{Deserialize, Serialize};

use crate::map::Tile;
use crate::math::GridPos;
use crate::objective::MissionKind;
use crate::unit::{UnitId, UnitSnapshot};

/// Which side won the battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    /// Heroes survived or completed the objective.
    Heroes,
    /// Heroes were wiped out or the objective failed.
    Monsters,
    /// Round limit reached without a decision.
    Draw,
}

/// Top-level session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Monsters patrol until they spot the heroes.
    Prebattle,
    /// Speed-ordered rounds until a winner is decided.
    Combat,
}

/// Status kinds reported by `status` and `passive_tick` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Damage over time.
    Poison,
    /// Absorption pool.
    Shield,
    /// Low-hp damage amplifier.
    Rage,
    /// Forced targeting.
    Taunt,
    /// Two-target area attack.
    Fireball,
    /// Next-attack channel.
    Aim,
    /// Speed and damage buff.
    Frenzy,
    /// Damage debuff.
    Hex,
    /// Innate heal over time.
    Regen,
}

/// Origin tag for damage that did not come from an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSource {
    /// Poison ticking at turn start.
    Poison,
}

/// Effect applied when a unit enters a special tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TileEffect {
    /// Hazard tile poison.
    Poison {
        /// Damage per turn.
        amount: u32,
        /// Turns remaining.
        turns: u32,
    },
    /// Shrine blessing.
    Shrine {
        /// Hp actually restored.
        heal: u32,
        /// Shield granted.
        shield: u32,
    },
}

/// A single simulation event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    /// The battle grid.
    MapInit {
        /// Grid width.
        width: i32,
        /// Grid height.
        height: i32,
        /// Preset name.
        preset: String,
        /// All tiles, row-major.
        tiles: Vec<Tile>,
    },
    /// Arena flavor and starting rosters.
    Start {
        /// Flavor text.
        arena: String,
        /// Hero snapshots.
        heroes: Vec<UnitSnapshot>,
        /// Monster snapshots.
        monsters: Vec<UnitSnapshot>,
    },
    /// Mission parameters, emitted once.
    ObjectiveInit {
        /// Mission kind.
        mission: MissionKind,
        /// Progress threshold.
        required: u32,
        /// Capture tile.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        control_point: Option<GridPos>,
        /// Escorted unit.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vip: Option<UnitId>,
        /// Escort goal.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exit: Option<GridPos>,
        /// Structure to destroy.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        structure: Option<UnitId>,
        /// Rounds between reinforcement waves.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<u32>,
    },
    /// Phase transition.
    PhaseChange {
        /// New phase.
        phase: Phase,
    },
    /// One patrol step.
    PatrolTick {
        /// Moving unit.
        unit: UnitId,
        /// Start tile.
        from: GridPos,
        /// End tile.
        to: GridPos,
    },
    /// A monster spotted a hero.
    AggroTrigger {
        /// Spotting monster.
        source: UnitId,
        /// Spotted hero.
        target: UnitId,
        /// Aggro radius in effect.
        radius: u32,
    },
    /// Start of a combat round.
    Round {
        /// Round number, from 1.
        round: u32,
        /// Turn order.
        order: Vec<UnitId>,
    },
    /// Hp lost.
    Damage {
        /// Damaged unit.
        target: UnitId,
        /// Hp removed after shield and rage adjustments.
        amount: u32,
        /// Resulting hp.
        hp: u32,
        /// Non-attack origin.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<DamageSource>,
    },
    /// A unit reached 0 hp.
    Death {
        /// Dead unit.
        target: UnitId,
    },
    /// A status was applied or triggered.
    Status {
        /// Status kind.
        status: StatusKind,
        /// Affected unit.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<UnitId>,
        /// Causing unit.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        actor: Option<UnitId>,
        /// Magnitude.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<u32>,
        /// Duration.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        turns: Option<u32>,
        /// Pool after the change.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remaining: Option<u32>,
    },
    /// Shield absorbed damage.
    Shield {
        /// Shielded unit.
        target: UnitId,
        /// Damage absorbed.
        amount: u32,
        /// Shield left.
        remaining: u32,
    },
    /// Hp restored.
    Heal {
        /// Healer.
        actor: UnitId,
        /// Amount rolled.
        amount: u32,
        /// Resulting hp of the healed unit.
        hp: u32,
        /// Healed unit when not the actor.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<UnitId>,
    },
    /// An attack resolved.
    Attack {
        /// Attacker.
        attacker: UnitId,
        /// Defender.
        target: UnitId,
        /// Damage after modifiers and crit.
        damage: u32,
        /// Critical hit.
        crit: bool,
    },
    /// End-of-turn status tick.
    PassiveTick {
        /// Ticking status.
        status: StatusKind,
        /// Affected unit.
        target: UnitId,
        /// Amount applied.
        amount: u32,
        /// Resulting hp.
        hp: u32,
    },
    /// Zone-of-control reprisal.
    OpportunityHit {
        /// Punishing unit.
        attacker: UnitId,
        /// Moving unit.
        defender: UnitId,
        /// Damage dealt.
        damage: u32,
    },
    /// Summary of a whole move action.
    Move {
        /// Mover.
        unit: UnitId,
        /// Start tile.
        from: GridPos,
        /// Final tile.
        to: GridPos,
        /// Tiles walked, including start.
        path: Vec<GridPos>,
    },
    /// A unit vacated a tile.
    LeaveTile {
        /// Mover.
        unit: UnitId,
        /// Vacated tile.
        tile: Tile,
    },
    /// A unit entered a tile.
    EnterTile {
        /// Mover.
        unit: UnitId,
        /// Entered tile as it was on entry.
        tile: Tile,
        /// Effect triggered by the tile.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        applied: Option<TileEffect>,
    },
    /// A ranged action was blocked by an obstacle.
    LosBlocked {
        /// Would-be attacker.
        attacker: UnitId,
        /// Unseen target.
        target: UnitId,
    },
    /// Mission progress changed.
    ObjectiveProgress {
        /// Mission kind.
        mission: MissionKind,
        /// Current progress.
        progress: u32,
        /// Completion threshold.
        required: u32,
        /// Control point holder.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        holder: Option<UnitId>,
    },
    /// Mission completed.
    ObjectiveComplete {
        /// Mission kind.
        mission: MissionKind,
    },
    /// Mission failed.
    ObjectiveFail {
        /// Mission kind.
        mission: MissionKind,
    },
    /// Survival reinforcements arrived.
    WaveSpawn {
        /// Round of arrival.
        round: u32,
        /// Spawned units.
        units: Vec<UnitSnapshot>,
    },
    /// Final event of every stream.
    End {
        /// Final result.
        winner: Winner,
    },
}

impl SimEvent {
    /// The `type` tag this event serializes with.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MapInit { .. } => "map_init",
            Self::Start { .. } => "start",
            Self::ObjectiveInit { .. } => "objective_init",
            Self::PhaseChange { .. } => "phase_change",
            Self::PatrolTick { .. } => "patrol_tick",
            Self::AggroTrigger { .. } => "aggro_trigger",
            Self::Round { .. } => "round",
            Self::Damage { .. } => "damage",
            Self::Death { .. } => "death",
            Self::Status { .. } => "status",
            Self::Shield { .. } => "shield",
            Self::Heal { .. } => "heal",
            Self::Attack { .. } => "attack",
            Self::PassiveTick { .. } => "passive_tick",
            Self::OpportunityHit { .. } => "opportunity_hit",
            Self::Move { .. } => "move",
            Self::LeaveTile { .. } => "leave_tile",
            Self::EnterTile { .. } => "enter_tile",
            Self::LosBlocked { .. } => "los_blocked",
            Self::ObjectiveProgress { .. } => "objective_progress",
            Self::ObjectiveComplete { .. } => "objective_complete",
            Self::ObjectiveFail { .. } => "objective_fail",
            Self::WaveSpawn { .. } => "wave_spawn",
            Self::End { .. } => "end",
        }
    }

    /// Build a `status` event with only the fields that apply.
    pub const fn status(status: StatusKind) -> StatusBuilder {
        StatusBuilder {
            status,
            target: None,
            actor: None,
            amount: None,
            turns: None,
            remaining: None,
        }
    }
}

/// Builder for the sparse `status` event.
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct StatusBuilder {
    status: StatusKind,
    target: Option<UnitId>,
    actor: Option<UnitId>,
    amount: Option<u32>,
    turns: Option<u32>,
    remaining: Option<u32>,
}

impl StatusBuilder {
    /// Affected unit.
    pub const fn target(mut self, id: UnitId) -> Self {
        self.target = Some(id);
        self
    }

    /// Causing unit.
    pub const fn actor(mut self, id: UnitId) -> Self {
        self.actor = Some(id);
        self
    }

    /// Magnitude.
    pub const fn amount(mut self, amount: u32) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Duration.
    pub const fn turns(mut self, turns: u32) -> Self {
        self.turns = Some(turns);
        self
    }

    /// Pool after the change.
    pub const fn remaining(mut self, remaining: u32) -> Self {
        self.remaining = Some(remaining);
        self
    }

    /// Finish the event.
    #[must_use]
    pub const fn build(self) -> SimEvent {
        SimEvent::Status {
            status: self.status,
            target: self.target,
            actor: self.actor,
            amount: self.amount,
            turns: self.turns,
            remaining: self.remaining,
        }
    }
}
