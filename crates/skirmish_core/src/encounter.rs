//! Encounter generation: map, rosters, spawn points, patrols and mission anchors.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battlefield::Battlefield;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::map::{BattleMap, Terrain};
use crate::math::GridPos;
use crate::objective::{MissionKind, Objective, ObjectiveParams};
use crate::rng::SimRng;
use crate::unit::{Patrol, Side};
use crate::unit_kind::UnitKind;

/// Arena flavor lines for the `start` event.
pub const ARENAS: [&str; 3] = [
    "The fight takes place in an abandoned ruin.",
    "A cool breeze sweeps across the battlefield.",
    "Thunder rumbles in the distance.",
];

/// Monster roster templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Goblins and an archer, sometimes a shaman.
    Swarm,
    /// One brute and one caster.
    Elite,
    /// Two brutes and a caster.
    Double,
}

impl Archetype {
    /// All archetypes.
    pub const ALL: [Self; 3] = [Self::Swarm, Self::Elite, Self::Double];

    /// Roll the monster kinds for this archetype.
    pub fn roll(self, rng: &mut SimRng) -> Vec<UnitKind> {
        match self {
            Self::Swarm => {
                let mut kinds = vec![UnitKind::Goblin, UnitKind::Goblin, UnitKind::Archer];
                if rng.percent(50) {
                    kinds.push(UnitKind::Shaman);
                }
                kinds
            }
            Self::Elite => vec![
                pick(rng, [UnitKind::Orc, UnitKind::Troll]),
                pick(rng, [UnitKind::Priest, UnitKind::Shaman]),
            ],
            Self::Double => vec![
                UnitKind::Orc,
                UnitKind::Troll,
                pick(rng, [UnitKind::Shaman, UnitKind::Priest]),
            ],
        }
    }
}

fn pick(rng: &mut SimRng, options: [UnitKind; 2]) -> UnitKind {
    if rng.percent(50) {
        options[0]
    } else {
        options[1]
    }
}

/// Everything a session starts from.
#[derive(Debug, Clone)]
pub struct BattleSetup {
    /// Map, roster and objective.
    pub field: Battlefield,
    /// Flavor text.
    pub arena: String,
}

/// Row `i` of `n` evenly spaced rows.
#[must_use]
pub const fn spawn_row(i: usize, n: usize, height: i32) -> i32 {
    ((i as i32) + 1) * height / (n as i32 + 1)
}

/// Build the full encounter for `mission`.
pub fn generate(config: &SessionConfig, mission: MissionKind, mut rng: SimRng) -> Result<BattleSetup> {
    let (width, height) = (config.width, config.height);
    let mut map = BattleMap::build(width, height, config.preset.as_deref(), &mut rng)?;
    let arena = rng.choose(&ARENAS).copied().unwrap_or_default().to_string();
    let archetype = rng.choose(&Archetype::ALL).copied().unwrap_or(Archetype::Swarm);
    let monster_kinds = archetype.roll(&mut rng);
    debug!(?archetype, ?monster_kinds, "rolled encounter");

    match mission {
        MissionKind::CapturePoint => {
            map.set_terrain(map.center(), Terrain::ControlPoint);
        }
        MissionKind::Escort => {
            map.set_terrain(escort_exit(width, height), Terrain::Exit);
        }
        MissionKind::Survival | MissionKind::DestroyStructure => {}
    }

    let mut field = Battlefield::new(map, rng, config.tier);

    let mut heroes = vec![UnitKind::Warrior, UnitKind::Mage];
    if mission == MissionKind::Escort {
        heroes.push(UnitKind::Envoy);
    }
    let mut vip = None;
    for (i, kind) in heroes.iter().enumerate() {
        let pos = GridPos::new(1, spawn_row(i, heroes.len(), height));
        let id = field.spawn(Side::Heroes, kind.profile(), pos);
        if *kind == UnitKind::Envoy {
            vip = Some(id);
        }
    }

    let monster_column = width - 2;
    let centre_column = width / 2;
    for (i, kind) in monster_kinds.iter().enumerate() {
        let spawn = GridPos::new(monster_column, spawn_row(i, monster_kinds.len(), height));
        let profile = kind.profile().scaled_for_tier(config.tier);
        let id = field.spawn(Side::Monsters, profile, spawn);
        let patrol = if i == 0 {
            Patrol::Waypoints {
                points: vec![GridPos::new(centre_column, spawn.y), spawn],
                index: 0,
            }
        } else {
            Patrol::Wander {
                min: GridPos::new((spawn.x - 1).max(centre_column), (spawn.y - 1).max(0)),
                max: GridPos::new((spawn.x + 1).min(width - 1), (spawn.y + 1).min(height - 1)),
            }
        };
        field.unit_mut(id).patrol = Some(patrol);
    }

    let params = match mission {
        MissionKind::CapturePoint => ObjectiveParams::CapturePoint {
            point: field.map.center(),
        },
        MissionKind::Escort => ObjectiveParams::Escort {
            vip: vip.unwrap_or_default(),
            exit: escort_exit(width, height),
        },
        MissionKind::Survival => ObjectiveParams::Survival {
            interval: config.survival_interval,
        },
        MissionKind::DestroyStructure => {
            let pos = GridPos::new(width - 1, height / 2);
            let profile = UnitKind::Totem.profile().scaled_for_tier(config.tier);
            let structure = field.spawn(Side::Monsters, profile, pos);
            ObjectiveParams::DestroyStructure { structure }
        }
    };
    let required = match params {
        ObjectiveParams::CapturePoint { .. } => config.capture_required,
        ObjectiveParams::Escort { .. } => 1,
        ObjectiveParams::Survival { .. } => config.survival_rounds,
        ObjectiveParams::DestroyStructure { structure } => field.unit(structure).max_hp(),
    };
    field.objective = Some(Objective::new(params, required));

    Ok(BattleSetup { field, arena })
}

/// Exit tile of the escort mission.
#[must_use]
pub const fn escort_exit(width: i32, height: i32) -> GridPos {
    GridPos::new(width - 1, height / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_kind::Behavior;

    fn setup(mission: MissionKind, seed: u64) -> BattleSetup {
        generate(&SessionConfig::new(1), mission, SimRng::seeded(seed)).unwrap()
    }

    #[test]
    fn test_spawn_rows() {
        assert_eq!(spawn_row(0, 2, 8), 2);
        assert_eq!(spawn_row(1, 2, 8), 5);
        assert_eq!((0..4).map(|i| spawn_row(i, 4, 8)).collect::<Vec<_>>(), vec![1, 3, 4, 6]);
    }

    #[test]
    fn test_heroes_and_monsters_placed() {
        for seed in 0..32 {
            let setup = setup(MissionKind::Survival, seed);
            let field = &setup.field;
            let heroes: Vec<_> = field.living(Side::Heroes).collect();
            assert_eq!(heroes.len(), 2);
            assert!(heroes.iter().all(|h| h.pos.x == 1));
            let monsters: Vec<_> = field.living(Side::Monsters).collect();
            assert!((2..=4).contains(&monsters.len()));
            assert!(monsters.iter().all(|m| m.pos.x == 10 && m.patrol.is_some()));
            assert!(ARENAS.contains(&setup.arena.as_str()));
        }
    }

    #[test]
    fn test_escort_adds_envoy_and_exit() {
        let setup = setup(MissionKind::Escort, 3);
        let field = &setup.field;
        let envoy = field
            .units
            .iter()
            .find(|u| u.profile.behavior == Behavior::Escortee)
            .unwrap();
        let objective = field.objective.as_ref().unwrap();
        assert_eq!(
            objective.params,
            ObjectiveParams::Escort {
                vip: envoy.id,
                exit: GridPos::new(11, 4)
            }
        );
        assert_eq!(field.map.tile(GridPos::new(11, 4)).unwrap().terrain, Terrain::Exit);
    }

    #[test]
    fn test_destroy_structure_adds_totem() {
        let setup = setup(MissionKind::DestroyStructure, 4);
        let field = &setup.field;
        let totem = field.units.last().unwrap();
        assert_eq!(totem.profile.kind, UnitKind::Totem);
        assert_eq!(totem.pos, GridPos::new(11, 4));
        assert!(totem.patrol.is_none());
        assert_eq!(field.objective.as_ref().unwrap().required, totem.max_hp());
    }

    #[test]
    fn test_capture_marks_centre() {
        let setup = setup(MissionKind::CapturePoint, 5);
        let field = &setup.field;
        assert_eq!(
            field.map.tile(GridPos::new(6, 4)).unwrap().terrain,
            Terrain::ControlPoint
        );
        assert_eq!(field.objective.as_ref().unwrap().required, 3);
    }

    #[test]
    fn test_first_monster_patrols_to_centre() {
        let setup = setup(MissionKind::Survival, 6);
        let first = setup.field.living(Side::Monsters).next().unwrap();
        assert_eq!(
            first.patrol,
            Some(Patrol::Waypoints {
                points: vec![GridPos::new(6, first.pos.y), first.pos],
                index: 0
            })
        );
    }

    #[test]
    fn test_archetype_rolls() {
        let mut rng = SimRng::seeded(7);
        for _ in 0..50 {
            let swarm = Archetype::Swarm.roll(&mut rng);
            assert!(swarm.len() == 3 || swarm == vec![
                UnitKind::Goblin,
                UnitKind::Goblin,
                UnitKind::Archer,
                UnitKind::Shaman
            ]);
            let elite = Archetype::Elite.roll(&mut rng);
            assert!(matches!(elite[0], UnitKind::Orc | UnitKind::Troll));
            assert!(matches!(elite[1], UnitKind::Priest | UnitKind::Shaman));
            let double = Archetype::Double.roll(&mut rng);
            assert_eq!(&double[..2], &[UnitKind::Orc, UnitKind::Troll]);
        }
    }

    #[test]
    fn test_unknown_preset_fails_before_setup() {
        let config = SessionConfig::new(1).with_preset("volcano");
        assert!(generate(&config, MissionKind::Survival, SimRng::seeded(1)).is_err());
    }
}
