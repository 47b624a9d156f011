//! Shared battle state threaded through every action.
//!
//! The [`Battlefield`] owns the map, the roster, the objective, the taunt
//! marker and the RNG. Combat, movement, AI and objective hooks all take it
//! by `&mut` and address units by [`UnitId`], never by reference, so no unit
//! ever borrows another.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::events::Winner;
use crate::map::BattleMap;
use crate::math::GridPos;
use crate::objective::Objective;
use crate::rng::SimRng;
use crate::unit::{Side, Unit, UnitId};
use crate::unit_kind::UnitProfile;

/// Forced-target marker set by a vanguard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Taunt {
    /// The taunting unit.
    pub unit: UnitId,
    /// Taunter turn-ends left before the marker expires.
    pub turns: u32,
}

impl Taunt {
    /// Marker lasting through the end of the taunter's next turn.
    #[must_use]
    pub const fn new(unit: UnitId) -> Self {
        Self { unit, turns: 2 }
    }
}

/// Map, roster and shared mutable battle state.
#[derive(Debug, Clone)]
pub struct Battlefield {
    /// The grid.
    pub map: BattleMap,
    /// All units; `units[i].id == UnitId(i)`.
    pub units: Vec<Unit>,
    /// Active mission, if any.
    pub objective: Option<Objective>,
    /// Active taunt, if any.
    pub taunt: Option<Taunt>,
    /// Single random source for the whole battle.
    pub rng: SimRng,
    /// Current round, from 1.
    pub round: u32,
    /// Difficulty tier used for reinforcements.
    pub tier: u32,
}

impl Battlefield {
    /// Create a battlefield with an empty roster.
    #[must_use]
    pub fn new(map: BattleMap, rng: SimRng, tier: u32) -> Self {
        Self {
            map,
            units: Vec::new(),
            objective: None,
            taunt: None,
            rng,
            round: 1,
            tier,
        }
    }

    /// Add a unit to the roster and return its id.
    pub fn spawn(&mut self, side: Side, profile: UnitProfile, pos: GridPos) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        self.units.push(Unit::new(id, side, profile, pos));
        id
    }

    /// Unit by id.
    ///
    /// # Panics
    ///
    /// Panics if the id did not come from this battlefield.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.index()]
    }

    /// Mutable unit by id.
    ///
    /// # Panics
    ///
    /// Panics if the id did not come from this battlefield.
    pub fn unit_mut(&mut self, id: UnitId) -> &mut Unit {
        &mut self.units[id.index()]
    }

    /// Living units of one side in roster order.
    pub fn living(&self, side: Side) -> impl Iterator<Item = &Unit> + '_ {
        self.units
            .iter()
            .filter(move |u| u.side == side && u.is_alive())
    }

    /// Ids of living units of one side in roster order.
    #[must_use]
    pub fn living_ids(&self, side: Side) -> Vec<UnitId> {
        self.living(side).map(|u| u.id).collect()
    }

    /// Ids of living enemies of `id`.
    #[must_use]
    pub fn enemies_of(&self, id: UnitId) -> Vec<UnitId> {
        self.living_ids(self.unit(id).side.opponent())
    }

    /// Tiles held by living units.
    #[must_use]
    pub fn occupied(&self) -> HashSet<GridPos> {
        self.units
            .iter()
            .filter(|u| u.is_alive())
            .map(|u| u.pos)
            .collect()
    }

    /// Living unit standing on `pos`.
    #[must_use]
    pub fn occupant(&self, pos: GridPos) -> Option<UnitId> {
        self.units
            .iter()
            .find(|u| u.is_alive() && u.pos == pos)
            .map(|u| u.id)
    }

    /// True if `pos` can be entered right now.
    #[must_use]
    pub fn is_free(&self, pos: GridPos) -> bool {
        self.map.is_passable(pos) && self.occupant(pos).is_none()
    }

    /// Manhattan distance between two units.
    #[must_use]
    pub fn distance(&self, a: UnitId, b: UnitId) -> u32 {
        self.unit(a).pos.manhattan(self.unit(b).pos)
    }

    /// True if `target` is within `actor`'s attack range.
    #[must_use]
    pub fn in_range(&self, actor: UnitId, target: UnitId) -> bool {
        self.distance(actor, target) <= self.unit(actor).profile.range
    }

    /// Pick a target among `actor`'s living enemies.
    ///
    /// A living taunter on the opposing side is forced unless `ignore_taunt`
    /// is set; otherwise the pick is uniform.
    pub fn select_target(&mut self, actor: UnitId, ignore_taunt: bool) -> Option<UnitId> {
        let enemies = self.enemies_of(actor);
        if !ignore_taunt {
            if let Some(taunt) = self.taunt {
                if enemies.contains(&taunt.unit) {
                    return Some(taunt.unit);
                }
            }
        }
        self.rng.choose(&enemies).copied()
    }

    /// Clear the taunt if `id` was the taunter.
    pub fn clear_taunt_of(&mut self, id: UnitId) {
        if self.taunt.is_some_and(|t| t.unit == id) {
            self.taunt = None;
        }
    }

    /// Count down the taunt at the end of the taunter's turn.
    pub fn expire_taunt(&mut self, id: UnitId) {
        if let Some(taunt) = self.taunt.as_mut() {
            if taunt.unit == id {
                taunt.turns = taunt.turns.saturating_sub(1);
                if taunt.turns == 0 {
                    self.taunt = None;
                }
            }
        }
    }

    /// Decided winner, if any.
    ///
    /// Objective completion and failure take precedence over attrition.
    #[must_use]
    pub fn winner(&self) -> Option<Winner> {
        if let Some(objective) = &self.objective {
            if objective.completed {
                return Some(Winner::Heroes);
            }
            if objective.failed {
                return Some(Winner::Monsters);
            }
        }
        if self.living(Side::Monsters).next().is_none() {
            return Some(Winner::Heroes);
        }
        if self.living(Side::Heroes).next().is_none() {
            return Some(Winner::Monsters);
        }
        None
    }
}
