//! Test fixtures and helpers.
//!
//! Hand-built battlefields on open maps, so scenario tests control every
//! unit, tile and objective directly.

use skirmish_core::battlefield::Battlefield;
use skirmish_core::config::SessionConfig;
use skirmish_core::encounter::BattleSetup;
use skirmish_core::map::{BattleMap, Terrain};
use skirmish_core::math::GridPos;
use skirmish_core::objective::{Objective, ObjectiveParams};
use skirmish_core::rng::SimRng;
use skirmish_core::session::Session;
use skirmish_core::unit::{Side, UnitId};
use skirmish_core::unit_kind::{ActionOdds, UnitKind, UnitProfile};

/// Profile with crits disabled and fixed action odds.
#[must_use]
pub fn scripted(kind: UnitKind, special: u32, attack: u32) -> UnitProfile {
    let mut profile = kind.profile();
    profile.crit_percent = 0;
    profile.odds = ActionOdds::new(special, attack);
    profile
}

/// Profile that always takes its fallback action and never moves.
#[must_use]
pub fn passive(kind: UnitKind) -> UnitProfile {
    scripted(kind, 0, 0)
}

/// Profile that always attacks.
#[must_use]
pub fn attacker(kind: UnitKind) -> UnitProfile {
    scripted(kind, 0, 100)
}

/// Builder for a hand-placed battle.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    field: Battlefield,
    config: SessionConfig,
    seed: u64,
}

impl FieldBuilder {
    /// Empty open map.
    #[must_use]
    pub fn open(width: i32, height: i32, seed: u64) -> Self {
        Self {
            field: Battlefield::new(BattleMap::open(width, height), SimRng::seeded(seed), 1),
            config: SessionConfig::default().with_size(width, height).with_seed(seed),
            seed,
        }
    }

    /// Set one tile.
    #[must_use]
    pub fn terrain(mut self, x: i32, y: i32, terrain: Terrain) -> Self {
        self.field.map.set_terrain(GridPos::new(x, y), terrain);
        self
    }

    /// Place a unit.
    #[must_use]
    pub fn unit(mut self, side: Side, profile: UnitProfile, x: i32, y: i32) -> Self {
        self.field.spawn(side, profile, GridPos::new(x, y));
        self
    }

    /// Place a hero.
    #[must_use]
    pub fn hero(self, profile: UnitProfile, x: i32, y: i32) -> Self {
        self.unit(Side::Heroes, profile, x, y)
    }

    /// Place a monster.
    #[must_use]
    pub fn monster(self, profile: UnitProfile, x: i32, y: i32) -> Self {
        self.unit(Side::Monsters, profile, x, y)
    }

    /// Attach an objective.
    #[must_use]
    pub fn objective(mut self, params: ObjectiveParams, required: u32) -> Self {
        self.field.objective = Some(Objective::new(params, required));
        self
    }

    /// Adjust the scheduler limits.
    #[must_use]
    pub fn configure(mut self, f: impl FnOnce(&mut SessionConfig)) -> Self {
        f(&mut self.config);
        self
    }

    /// Id the next placed unit will get.
    #[must_use]
    pub fn next_id(&self) -> UnitId {
        UnitId(self.field.units.len() as u32)
    }

    /// The bare battlefield.
    #[must_use]
    pub fn build(self) -> Battlefield {
        self.field
    }

    /// A session over this battlefield.
    #[must_use]
    pub fn session(self) -> Session {
        let setup = BattleSetup {
            field: self.field,
            arena: "fixture".to_string(),
        };
        Session::from_setup(setup, &self.config, self.seed)
    }
}
