//! Combat units: identity, live state and status effects.
//!
//! A [`Unit`] owns its hit points and status timers. All mutations go through
//! methods that clamp hp to `[0, max_hp]` and report what happened as
//! [`SimEvent`]s, so callers only forward the returned events.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::{DamageSource, SimEvent, StatusKind};
use crate::math::{percent, scale, Fixed, GridPos};
use crate::rng::SimRng;
use crate::unit_kind::UnitProfile;

/// Turns rage lasts once triggered.
pub const RAGE_TURNS: u32 = 3;

/// Unique identifier for a unit: its index in the session roster.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl UnitId {
    /// Roster index of this unit.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two opposing rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Player-aligned units.
    Heroes,
    /// Hostile units.
    Monsters,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Heroes => Self::Monsters,
            Self::Monsters => Self::Heroes,
        }
    }
}

/// Timers and pools for every status a unit can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatusEffects {
    /// Poison damage per turn.
    pub poison: u32,
    /// Poison ticks left.
    pub poison_turns: u32,
    /// Damage absorption pool.
    pub shield: u32,
    /// Rage turns left.
    pub rage: u32,
    /// Aimed shot armed for this turn.
    pub aim: bool,
    /// Frenzy turns left.
    pub frenzy: u32,
    /// Hex turns left.
    pub hexed: u32,
}

/// Prebattle movement pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Patrol {
    /// Cycle through fixed waypoints.
    Waypoints {
        /// Waypoint cycle.
        points: Vec<GridPos>,
        /// Index of the next waypoint.
        index: usize,
    },
    /// Random steps inside a rectangle.
    Wander {
        /// Inclusive top-left corner.
        min: GridPos,
        /// Inclusive bottom-right corner.
        max: GridPos,
    },
}

impl Patrol {
    /// True if `pos` lies inside a wander rectangle. Waypoint patrols have no bound.
    #[must_use]
    pub const fn contains(&self, pos: GridPos) -> bool {
        match self {
            Self::Waypoints { .. } => true,
            Self::Wander { min, max } => {
                pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y
            }
        }
    }
}

/// Compact view of a unit for `start` and `wave_spawn` events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unit id.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Display icon.
    pub icon: String,
    /// Current hp.
    pub hp: u32,
    /// Maximum hp.
    pub max_hp: u32,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Roster side.
    pub side: Side,
}

/// A combat unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Roster id.
    pub id: UnitId,
    /// Owning side.
    pub side: Side,
    /// Static stats, already tier-scaled.
    pub profile: UnitProfile,
    /// Current hit points.
    pub hp: u32,
    /// Grid position.
    pub pos: GridPos,
    /// Active statuses.
    pub status: StatusEffects,
    /// Prebattle movement, if any.
    pub patrol: Option<Patrol>,
}

impl Unit {
    /// Create a unit at full health.
    #[must_use]
    pub fn new(id: UnitId, side: Side, profile: UnitProfile, pos: GridPos) -> Self {
        Self {
            id,
            side,
            hp: profile.max_hp,
            profile,
            pos,
            status: StatusEffects::default(),
            patrol: None,
        }
    }

    /// Attach a prebattle patrol.
    #[must_use]
    pub fn with_patrol(mut self, patrol: Patrol) -> Self {
        self.patrol = Some(patrol);
        self
    }

    /// Check if the unit is alive (hp > 0).
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Effective speed: base plus one while frenzied.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.profile.speed + if self.status.frenzy > 0 { 1 } else { 0 }
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.profile.max_hp
    }

    /// True if hp is at most a third of max.
    #[must_use]
    pub const fn is_low(&self) -> bool {
        self.hp <= self.profile.max_hp / 3
    }

    /// True if `self` has a lower hp fraction than `other`.
    #[must_use]
    pub const fn weaker_than(&self, other: &Self) -> bool {
        (self.hp as u64) * (other.profile.max_hp as u64)
            < (other.hp as u64) * (self.profile.max_hp as u64)
    }

    /// Remove hp, returning the amount actually removed.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.hp);
        self.hp -= actual;
        actual
    }

    /// Restore hp up to max, returning the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.profile.max_hp.saturating_sub(self.hp));
        self.hp += actual;
        actual
    }

    /// Add to the shield pool, returning the new pool size.
    pub fn add_shield(&mut self, amount: u32) -> u32 {
        self.status.shield = self.status.shield.saturating_add(amount);
        self.status.shield
    }

    /// Product of all active damage-dealt modifiers.
    #[must_use]
    pub fn damage_modifier(&self) -> Fixed {
        let mut modifier = Fixed::ONE;
        if self.status.aim {
            modifier *= percent(125);
        }
        if self.status.frenzy > 0 {
            modifier *= percent(125);
        }
        if self.status.hexed > 0 {
            modifier *= percent(75);
        }
        if self.status.rage > 0 {
            modifier *= percent(150);
        }
        modifier
    }

    /// Critical chance in percent, +50 while aiming.
    #[must_use]
    pub const fn crit_chance(&self) -> u32 {
        self.profile.crit_percent + if self.status.aim { 50 } else { 0 }
    }

    /// Receive a hit: defender rage, then shield absorption, then hp loss.
    pub fn take_damage(&mut self, amount: u32) -> Vec<SimEvent> {
        let mut events = Vec::with_capacity(3);
        let mut amount = amount;
        if self.status.rage > 0 {
            amount = scale(amount, percent(150));
        }
        if self.status.shield > 0 {
            let absorbed = self.status.shield.min(amount);
            amount -= absorbed;
            self.status.shield -= absorbed;
            if absorbed > 0 {
                events.push(SimEvent::Shield {
                    target: self.id,
                    amount: absorbed,
                    remaining: self.status.shield,
                });
            }
        }
        self.apply_damage(amount);
        events.push(SimEvent::Damage {
            target: self.id,
            amount,
            hp: self.hp,
            source: None,
        });
        if !self.is_alive() {
            events.push(SimEvent::Death { target: self.id });
        }
        events
    }

    /// Start-of-turn effects: poison tick, then rage countdown or trigger.
    pub fn begin_turn(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.status.poison_turns > 0 && self.is_alive() {
            let amount = self.status.poison * self.profile.poison_vulnerability;
            self.apply_damage(amount);
            self.status.poison_turns -= 1;
            if self.status.poison_turns == 0 {
                self.status.poison = 0;
            }
            events.push(SimEvent::Damage {
                target: self.id,
                amount,
                hp: self.hp,
                source: Some(DamageSource::Poison),
            });
            if !self.is_alive() {
                events.push(SimEvent::Death { target: self.id });
            }
        }
        if self.status.rage > 0 {
            self.status.rage -= 1;
        } else if self.is_alive() && self.is_low() {
            self.status.rage = RAGE_TURNS;
            events.push(
                SimEvent::status(StatusKind::Rage)
                    .target(self.id)
                    .turns(RAGE_TURNS)
                    .build(),
            );
        }
        events
    }

    /// End-of-turn effects: regen, buff timers, aim cleared.
    pub fn end_turn(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.profile.regen > 0 && self.is_alive() {
            let healed = self.heal(self.profile.regen);
            if healed > 0 {
                events.push(SimEvent::PassiveTick {
                    status: StatusKind::Regen,
                    target: self.id,
                    amount: healed,
                    hp: self.hp,
                });
            }
        }
        self.status.frenzy = self.status.frenzy.saturating_sub(1);
        self.status.hexed = self.status.hexed.saturating_sub(1);
        self.status.aim = false;
        events
    }

    /// Heal 1-5 hp; 30% chance to also gain 1-3 shield.
    pub fn heal_self(&mut self, rng: &mut SimRng) -> Vec<SimEvent> {
        let amount = rng.range(1, 5);
        self.heal(amount);
        let mut events = vec![SimEvent::Heal {
            actor: self.id,
            amount,
            hp: self.hp,
            target: None,
        }];
        if rng.percent(30) {
            let gained = rng.range(1, 3);
            let remaining = self.add_shield(gained);
            events.push(
                SimEvent::status(StatusKind::Shield)
                    .target(self.id)
                    .amount(gained)
                    .remaining(remaining)
                    .build(),
            );
        }
        events
    }

    /// Overwrite poison with a fresh dose.
    pub fn poison(&mut self, amount: u32, turns: u32) {
        self.status.poison = amount;
        self.status.poison_turns = turns;
    }

    /// Compact view for events.
    #[must_use]
    pub fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            name: self.profile.name.clone(),
            icon: self.profile.icon.clone(),
            hp: self.hp,
            max_hp: self.profile.max_hp,
            x: self.pos.x,
            y: self.pos.y,
            side: self.side,
        }
    }
}
