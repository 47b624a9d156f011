//! Static kind data for every unit species.
//!
//! A [`UnitKind`] resolves to one [`UnitProfile`]: base stats, traits and the
//! [`Behavior`] that drives its turn. The profile is copied onto each unit at
//! spawn, so per-unit adjustments (tier scaling, forced odds in tests) never
//! leak back into the table.
//!
//! # Example
//!
//! ```
//! use skirmish_core::unit_kind::{Behavior, UnitKind};
//!
//! let troll = UnitKind::Troll.profile();
//! assert_eq!(troll.behavior, Behavior::Regenerator);
//! assert_eq!(troll.poison_vulnerability, 2);
//! assert_eq!("troll".parse::<UnitKind>().unwrap(), UnitKind::Troll);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Every unit species known to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Taunting melee hero.
    Warrior,
    /// Fireball-casting ranged hero.
    Mage,
    /// Escort mission VIP.
    Envoy,
    /// Basic melee monster.
    Goblin,
    /// Slow, sturdy melee monster.
    Orc,
    /// Ranged monster that channels aimed shots.
    Archer,
    /// Healer.
    Priest,
    /// Regenerating brute, doubly hurt by poison.
    Troll,
    /// Frenzy and hex caster.
    Shaman,
    /// Destroy-structure objective.
    Totem,
}

impl UnitKind {
    /// All kinds in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Warrior,
        Self::Mage,
        Self::Envoy,
        Self::Goblin,
        Self::Orc,
        Self::Archer,
        Self::Priest,
        Self::Troll,
        Self::Shaman,
        Self::Totem,
    ];

    /// Lowercase name used in configs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Mage => "mage",
            Self::Envoy => "envoy",
            Self::Goblin => "goblin",
            Self::Orc => "orc",
            Self::Archer => "archer",
            Self::Priest => "priest",
            Self::Troll => "troll",
            Self::Shaman => "shaman",
            Self::Totem => "totem",
        }
    }

    /// Base profile for this kind.
    #[must_use]
    pub fn profile(self) -> UnitProfile {
        let base = UnitProfile {
            kind: self,
            name: String::new(),
            icon: String::new(),
            max_hp: 1,
            damage: (0, 0),
            speed: 2,
            crit_percent: 20,
            move_points: 2,
            range: 1,
            regen: 0,
            poison_vulnerability: 1,
            behavior: Behavior::Basic,
            odds: ActionOdds::new(0, 80),
        };
        match self {
            Self::Warrior => UnitProfile {
                name: "Warrior".into(),
                icon: "⚔️".into(),
                max_hp: 30,
                damage: (4, 8),
                move_points: 3,
                behavior: Behavior::Vanguard,
                odds: ActionOdds::new(20, 70),
                ..base
            },
            Self::Mage => UnitProfile {
                name: "Mage".into(),
                icon: "🧙".into(),
                max_hp: 20,
                damage: (5, 10),
                range: 3,
                behavior: Behavior::Caster,
                odds: ActionOdds::new(20, 70),
                ..base
            },
            Self::Envoy => UnitProfile {
                name: "Envoy".into(),
                icon: "🎩".into(),
                max_hp: 16,
                damage: (1, 2),
                speed: 1,
                crit_percent: 0,
                range: 0,
                behavior: Behavior::Escortee,
                odds: ActionOdds::new(0, 0),
                ..base
            },
            Self::Goblin => UnitProfile {
                name: "Goblin".into(),
                icon: "👺".into(),
                max_hp: 15,
                damage: (3, 6),
                move_points: 3,
                ..base
            },
            Self::Orc => UnitProfile {
                name: "Orc".into(),
                icon: "👹".into(),
                max_hp: 25,
                damage: (2, 7),
                speed: 1,
                ..base
            },
            Self::Archer => UnitProfile {
                name: "Archer".into(),
                icon: "🏹".into(),
                max_hp: 18,
                damage: (4, 7),
                speed: 3,
                crit_percent: 25,
                range: 4,
                behavior: Behavior::Marksman,
                odds: ActionOdds::new(30, 70),
                ..base
            },
            Self::Priest => UnitProfile {
                name: "Priest".into(),
                icon: "⛪".into(),
                max_hp: 18,
                damage: (1, 4),
                range: 3,
                behavior: Behavior::Support,
                odds: ActionOdds::new(0, 100),
                ..base
            },
            Self::Troll => UnitProfile {
                name: "Troll".into(),
                icon: "🧌".into(),
                max_hp: 40,
                damage: (3, 7),
                speed: 1,
                regen: 2,
                poison_vulnerability: 2,
                behavior: Behavior::Regenerator,
                ..base
            },
            Self::Shaman => UnitProfile {
                name: "Shaman".into(),
                icon: "🌀".into(),
                max_hp: 20,
                damage: (2, 5),
                range: 3,
                behavior: Behavior::Controller,
                odds: ActionOdds::new(50, 40),
                ..base
            },
            Self::Totem => UnitProfile {
                name: "Totem".into(),
                icon: "🗿".into(),
                max_hp: 30,
                speed: 0,
                crit_percent: 0,
                move_points: 0,
                range: 0,
                behavior: Behavior::Structure,
                odds: ActionOdds::new(0, 0),
                ..base
            },
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimError::UnknownUnitKind(s.to_string()))
    }
}

/// Decision strategy selected once per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// Attack or heal self.
    Basic,
    /// Basic melee plus taunt.
    Vanguard,
    /// Ranged with a two-target fireball.
    Caster,
    /// Ranged with an aim channel.
    Marksman,
    /// Heals and shields the weakest ally.
    Support,
    /// Basic melee carried by innate regen.
    Regenerator,
    /// Frenzies allies and hexes enemies.
    Controller,
    /// Walks to the exit, never fights.
    Escortee,
    /// Never acts.
    Structure,
}

/// Percent zones of a single d100 decision roll.
///
/// `[0, special)` picks the kind's special action, `[special, special + attack)`
/// a plain attack, and the remainder the kind's fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionOdds {
    /// Width of the special-action zone.
    pub special: u32,
    /// Width of the attack zone.
    pub attack: u32,
}

impl ActionOdds {
    /// Create a new zone split.
    #[must_use]
    pub const fn new(special: u32, attack: u32) -> Self {
        Self { special, attack }
    }

    /// Classify a d100 roll.
    #[must_use]
    pub const fn classify(self, roll: u32) -> Choice {
        if roll < self.special {
            Choice::Special
        } else if roll < self.special + self.attack {
            Choice::Attack
        } else {
            Choice::Fallback
        }
    }
}

/// Outcome of classifying a decision roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Kind-specific special action.
    Special,
    /// Plain attack.
    Attack,
    /// Kind fallback (heal-self, or hex for controllers).
    Fallback,
}

/// Base stats, traits and behavior for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitProfile {
    /// Species.
    pub kind: UnitKind,
    /// Display name.
    pub name: String,
    /// Display icon.
    pub icon: String,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Inclusive attack damage range.
    pub damage: (u32, u32),
    /// Base initiative.
    pub speed: u32,
    /// Base critical chance in percent.
    pub crit_percent: u32,
    /// Steps per move action.
    pub move_points: u32,
    /// Attack distance; 1 is melee.
    pub range: u32,
    /// Flat heal applied at end of turn.
    pub regen: u32,
    /// Poison damage multiplier.
    pub poison_vulnerability: u32,
    /// Turn strategy.
    pub behavior: Behavior,
    /// Decision roll zones.
    pub odds: ActionOdds,
}

impl UnitProfile {
    /// True for units that melee and exert zone of control.
    #[must_use]
    pub const fn is_melee(&self) -> bool {
        self.range == 1
    }

    /// True for units that must see their target.
    #[must_use]
    pub const fn is_ranged(&self) -> bool {
        self.range > 1
    }

    /// Apply tier scaling: hp x (1 + 0.05 (tier - 1)) truncated, and +1 min
    /// damage on odd tiers, clamped to the max.
    #[must_use]
    pub fn scaled_for_tier(mut self, tier: u32) -> Self {
        let hp = u64::from(self.max_hp);
        let bonus = hp.saturating_mul(u64::from(tier.saturating_sub(1))).saturating_mul(5) / 100;
        self.max_hp = u32::try_from(hp.saturating_add(bonus)).unwrap_or(u32::MAX);
        if tier % 2 == 1 {
            self.damage.0 = (self.damage.0 + 1).min(self.damage.1);
        }
        self
    }
}
