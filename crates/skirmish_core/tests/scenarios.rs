//! End-to-end battles on hand-placed maps.

use skirmish_core::events::{SimEvent, StatusKind, TileEffect, Winner};
use skirmish_core::map::Terrain;
use skirmish_core::math::GridPos;
use skirmish_core::objective::{MissionKind, ObjectiveParams};
use skirmish_core::unit::UnitId;
use skirmish_core::unit_kind::UnitKind;
use skirmish_test_utils::fixtures::{attacker, passive, FieldBuilder};

fn count(events: &[SimEvent], kind: &str) -> usize {
    events.iter().filter(|e| e.kind() == kind).count()
}

#[test]
fn capture_point_held_for_three_rounds() {
    let events: Vec<SimEvent> = FieldBuilder::open(10, 5, 3)
        .terrain(3, 2, Terrain::ControlPoint)
        .hero(passive(UnitKind::Warrior), 3, 2)
        .monster(passive(UnitKind::Totem), 9, 0)
        .objective(
            ObjectiveParams::CapturePoint {
                point: GridPos::new(3, 2),
            },
            3,
        )
        .session()
        .collect();

    let progress: Vec<(u32, Option<UnitId>)> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::ObjectiveProgress {
                progress, holder, ..
            } => Some((*progress, *holder)),
            _ => None,
        })
        .collect();
    assert_eq!(
        progress,
        vec![(1, Some(UnitId(0))), (2, Some(UnitId(0))), (3, Some(UnitId(0)))]
    );

    let tail = &events[events.len() - 3..];
    assert!(matches!(tail[0], SimEvent::ObjectiveProgress { progress: 3, .. }));
    assert_eq!(
        tail[1],
        SimEvent::ObjectiveComplete {
            mission: MissionKind::CapturePoint
        }
    );
    assert_eq!(tail[2], SimEvent::End { winner: Winner::Heroes });
}

#[test]
fn survival_spawns_waves_then_wins() {
    let events: Vec<SimEvent> = FieldBuilder::open(40, 8, 11)
        .hero(passive(UnitKind::Warrior), 1, 1)
        .monster(passive(UnitKind::Totem), 39, 7)
        .objective(ObjectiveParams::Survival { interval: 3 }, 10)
        .session()
        .collect();

    let waves: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::WaveSpawn { round, .. } => Some(*round),
            _ => None,
        })
        .collect();
    assert_eq!(waves.len(), 3);
    assert_eq!(count(&events, "objective_progress"), 10);
    assert_eq!(count(&events, "objective_complete"), 1);
    assert_eq!(events.last(), Some(&SimEvent::End { winner: Winner::Heroes }));
}

#[test]
fn escort_reaches_exit() {
    let session = FieldBuilder::open(8, 3, 5)
        .terrain(6, 1, Terrain::Exit)
        .hero(UnitKind::Envoy.profile(), 1, 1)
        .monster(passive(UnitKind::Totem), 7, 2)
        .objective(
            ObjectiveParams::Escort {
                vip: UnitId(0),
                exit: GridPos::new(6, 1),
            },
            1,
        )
        .session();
    let events: Vec<SimEvent> = session.collect();

    assert!(events.contains(&SimEvent::ObjectiveComplete {
        mission: MissionKind::Escort
    }));
    assert_eq!(events.last(), Some(&SimEvent::End { winner: Winner::Heroes }));
    assert_eq!(count(&events, "round"), 3);
}

#[test]
fn escort_fails_when_envoy_dies() {
    let mut envoy = UnitKind::Envoy.profile();
    envoy.max_hp = 1;
    let events: Vec<SimEvent> = FieldBuilder::open(8, 3, 6)
        .terrain(6, 1, Terrain::Exit)
        .hero(envoy, 1, 1)
        .monster(attacker(UnitKind::Goblin), 2, 1)
        .objective(
            ObjectiveParams::Escort {
                vip: UnitId(0),
                exit: GridPos::new(6, 1),
            },
            1,
        )
        .session()
        .collect();

    let n = events.len();
    assert_eq!(events[n - 3], SimEvent::Death { target: UnitId(0) });
    assert_eq!(
        events[n - 2],
        SimEvent::ObjectiveFail {
            mission: MissionKind::Escort
        }
    );
    assert_eq!(events[n - 1], SimEvent::End { winner: Winner::Monsters });
}

#[test]
fn obstacle_blocks_ranged_attack() {
    let events: Vec<SimEvent> = FieldBuilder::open(6, 3, 8)
        .terrain(2, 1, Terrain::Obstacle)
        .hero(attacker(UnitKind::Mage), 1, 1)
        .monster(passive(UnitKind::Goblin), 4, 1)
        .configure(|c| c.max_rounds = 2)
        .session()
        .collect();

    assert!(events.contains(&SimEvent::LosBlocked {
        attacker: UnitId(0),
        target: UnitId(1),
    }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, SimEvent::Attack { attacker: UnitId(0), .. })));
    assert_eq!(events.last(), Some(&SimEvent::End { winner: Winner::Draw }));
}

#[test]
fn walking_over_hazard_poisons() {
    let events: Vec<SimEvent> = FieldBuilder::open(8, 1, 9)
        .terrain(2, 0, Terrain::HazardPoison)
        .hero(attacker(UnitKind::Warrior), 1, 0)
        .monster(passive(UnitKind::Goblin), 5, 0)
        .session()
        .take_while(|e| !matches!(e, SimEvent::Attack { .. }))
        .collect();

    let entered = events.iter().find_map(|e| match e {
        SimEvent::EnterTile { unit, tile, applied } if tile.terrain == Terrain::HazardPoison => {
            Some((*unit, *applied))
        }
        _ => None,
    });
    assert_eq!(
        entered,
        Some((UnitId(0), Some(TileEffect::Poison { amount: 1, turns: 2 })))
    );
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::Move { unit: UnitId(0), to, .. } if *to == GridPos::new(4, 0)
    )));
}

#[test]
fn shrine_is_consumed_once() {
    let mut session = FieldBuilder::open(8, 1, 10)
        .terrain(2, 0, Terrain::Shrine)
        .hero(attacker(UnitKind::Warrior), 1, 0)
        .monster(passive(UnitKind::Goblin), 5, 0)
        .session();

    let blessing = session.by_ref().find_map(|e| match e {
        SimEvent::EnterTile {
            applied: Some(effect @ TileEffect::Shrine { .. }),
            ..
        } => Some(effect),
        _ => None,
    });
    assert_eq!(blessing, Some(TileEffect::Shrine { heal: 0, shield: 2 }));
    assert!(!session.battlefield().map.has_shrine(GridPos::new(2, 0)));
    assert_eq!(session.battlefield().unit(UnitId(0)).status.shield, 2);
}

#[test]
fn regen_announced_at_opening() {
    let events: Vec<SimEvent> = FieldBuilder::open(8, 3, 12)
        .hero(passive(UnitKind::Warrior), 1, 1)
        .monster(passive(UnitKind::Troll), 6, 1)
        .session()
        .take(4)
        .collect();

    assert_eq!(
        events[2],
        SimEvent::status(StatusKind::Regen)
            .target(UnitId(1))
            .amount(2)
            .build()
    );
}
