//! Unit movement with zone of control and tile effects.
//!
//! Every combat move walks a BFS path one tile at a time. Each step:
//!
//! 1. reports the vacated tile,
//! 2. lets adjacent melee enemies take their opportunity hit,
//! 3. moves the unit (unless the reprisal killed it),
//! 4. applies hazard or shrine effects on entry,
//! 5. runs the objective move hook.
//!
//! Prebattle patrol steps skip all of that and simply reposition.

use std::collections::HashSet;

use crate::battlefield::Battlefield;
use crate::combat::opportunity_attack;
use crate::events::{SimEvent, TileEffect};
use crate::map::Terrain;
use crate::math::GridPos;
use crate::pathfinding::find_path;
use crate::unit::{Patrol, UnitId};

/// Poison applied by hazard tiles: (amount, turns).
pub const HAZARD_POISON: (u32, u32) = (1, 2);

/// Shrine blessing: (max heal, shield).
pub const SHRINE_BLESSING: (u32, u32) = (3, 2);

/// Approach `target`, stopping once it is within attack range.
///
/// Never enters the target's own tile.
pub fn move_towards(field: &mut Battlefield, id: UnitId, target: UnitId) -> Vec<SimEvent> {
    let goal = field.unit(target).pos;
    let range = field.unit(id).profile.range;
    if field.unit(id).pos.manhattan(goal) <= range {
        return Vec::new();
    }
    let Some(path) = find_path(&field.map, field.unit(id).pos, goal, &field.occupied()) else {
        return Vec::new();
    };
    let steps = &path[1..path.len() - 1];
    walk(field, id, steps, Some((goal, range)))
}

/// Walk toward `dest`, stopping before any occupied tile.
pub fn move_to(field: &mut Battlefield, id: UnitId, dest: GridPos) -> Vec<SimEvent> {
    let Some(path) = find_path(&field.map, field.unit(id).pos, dest, &field.occupied()) else {
        return Vec::new();
    };
    walk(field, id, &path[1..], None)
}

/// Kite: step to the free neighbor farthest from every living enemy.
///
/// Only moves when that neighbor keeps every enemy more than one tile away.
pub fn move_away(field: &mut Battlefield, id: UnitId) -> Vec<SimEvent> {
    let enemies: Vec<GridPos> = field
        .enemies_of(id)
        .into_iter()
        .map(|e| field.unit(e).pos)
        .collect();
    if enemies.is_empty() {
        return Vec::new();
    }

    let mut best: Option<(GridPos, u32)> = None;
    for candidate in field.map.neighbors(field.unit(id).pos) {
        if !field.is_free(candidate) {
            continue;
        }
        let nearest = enemies
            .iter()
            .map(|e| candidate.manhattan(*e))
            .min()
            .unwrap_or(u32::MAX);
        if best.map_or(true, |(_, d)| nearest > d) {
            best = Some((candidate, nearest));
        }
    }

    match best {
        Some((step, nearest)) if nearest > 1 => walk(field, id, &[step], None),
        _ => Vec::new(),
    }
}

/// Step along `steps`, capped by move points.
fn walk(
    field: &mut Battlefield,
    id: UnitId,
    steps: &[GridPos],
    stop_within: Option<(GridPos, u32)>,
) -> Vec<SimEvent> {
    let start = field.unit(id).pos;
    let budget = field.unit(id).profile.move_points as usize;
    let mut walked = vec![start];
    let mut punished = HashSet::new();
    let mut events = Vec::new();

    for &next in steps.iter().take(budget) {
        let here = field.unit(id).pos;
        if let Some((goal, range)) = stop_within {
            if here.manhattan(goal) <= range {
                break;
            }
        }
        if !field.is_free(next) {
            break;
        }

        if let Some(tile) = field.map.tile(here).copied() {
            events.push(SimEvent::LeaveTile { unit: id, tile });
        }
        events.extend(zone_of_control(field, id, here, &mut punished));
        if !field.unit(id).is_alive() {
            break;
        }

        field.unit_mut(id).pos = next;
        events.extend(enter_tile(field, id));
        events.extend(field.on_step(id));
        walked.push(next);
    }

    if walked.len() > 1 {
        let to = field.unit(id).pos;
        events.insert(
            0,
            SimEvent::Move {
                unit: id,
                from: start,
                to,
                path: walked,
            },
        );
    }
    events
}

/// Opportunity hits from living melee enemies adjacent to `vacated`.
///
/// Each enemy in `punished` has already struck during this move.
fn zone_of_control(
    field: &mut Battlefield,
    mover: UnitId,
    vacated: GridPos,
    punished: &mut HashSet<UnitId>,
) -> Vec<SimEvent> {
    let threats: Vec<UnitId> = field
        .enemies_of(mover)
        .into_iter()
        .filter(|&e| {
            let enemy = field.unit(e);
            enemy.profile.is_melee() && enemy.pos.manhattan(vacated) == 1
        })
        .collect();

    let mut events = Vec::new();
    for enemy in threats {
        if !field.unit(mover).is_alive() {
            break;
        }
        if punished.insert(enemy) {
            events.extend(opportunity_attack(field, enemy, mover));
        }
    }
    events
}

/// Apply the effect of the tile `id` just entered.
fn enter_tile(field: &mut Battlefield, id: UnitId) -> Vec<SimEvent> {
    let pos = field.unit(id).pos;
    let Some(tile) = field.map.tile(pos).copied() else {
        return Vec::new();
    };
    let applied = match tile.terrain {
        Terrain::HazardPoison => {
            let (amount, turns) = HAZARD_POISON;
            field.unit_mut(id).poison(amount, turns);
            Some(TileEffect::Poison { amount, turns })
        }
        Terrain::Shrine if field.map.has_shrine(pos) => {
            let (heal, shield) = SHRINE_BLESSING;
            let unit = field.unit_mut(id);
            let healed = unit.heal(heal);
            unit.add_shield(shield);
            field.map.consume_shrine(pos);
            Some(TileEffect::Shrine {
                heal: healed,
                shield,
            })
        }
        _ => None,
    };
    vec![SimEvent::EnterTile {
        unit: id,
        tile,
        applied,
    }]
}

/// Advance one prebattle patrol step. Returns `(from, to)` if the unit moved.
pub fn patrol_step(field: &mut Battlefield, id: UnitId) -> Option<(GridPos, GridPos)> {
    let from = field.unit(id).pos;
    let patrol = field.unit(id).patrol.clone()?;
    let next = match &patrol {
        Patrol::Waypoints { points, index } => {
            if points.is_empty() {
                return None;
            }
            let mut index = *index % points.len();
            if points[index] == from {
                index = (index + 1) % points.len();
            }
            if let Some(Patrol::Waypoints { index: stored, .. }) = field.unit_mut(id).patrol.as_mut()
            {
                *stored = index;
            }
            let mut blocked = field.occupied();
            blocked.remove(&from);
            let path = find_path(&field.map, from, points[index], &blocked)?;
            *path.get(1)?
        }
        Patrol::Wander { .. } => {
            let options: Vec<GridPos> = field
                .map
                .neighbors(from)
                .filter(|&p| patrol.contains(p) && field.is_free(p))
                .collect();
            *field.rng.choose(&options)?
        }
    };
    if !field.is_free(next) {
        return None;
    }
    field.unit_mut(id).pos = next;
    Some((from, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::BattleMap;
    use crate::rng::SimRng;
    use crate::unit::Side;
    use crate::unit_kind::UnitKind;

    fn field(width: i32, height: i32) -> Battlefield {
        Battlefield::new(BattleMap::open(width, height), SimRng::seeded(17), 1)
    }

    fn count<F: Fn(&SimEvent) -> bool>(events: &[SimEvent], pred: F) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn test_move_towards_stops_in_range() {
        let mut field = field(10, 3);
        let warrior = field.spawn(Side::Heroes, UnitKind::Warrior.profile(), GridPos::new(0, 1));
        let orc = field.spawn(Side::Monsters, UnitKind::Orc.profile(), GridPos::new(3, 1));

        let events = move_towards(&mut field, warrior, orc);
        assert_eq!(field.unit(warrior).pos, GridPos::new(2, 1));
        assert_eq!(
            events[0],
            SimEvent::Move {
                unit: warrior,
                from: GridPos::new(0, 1),
                to: GridPos::new(2, 1),
                path: vec![GridPos::new(0, 1), GridPos::new(1, 1), GridPos::new(2, 1)],
            }
        );
        assert_eq!(count(&events, |e| matches!(e, SimEvent::EnterTile { .. })), 2);
        assert!(move_towards(&mut field, warrior, orc).is_empty());
    }

    #[test]
    fn test_move_capped_by_move_points() {
        let mut field = field(12, 3);
        let orc = field.spawn(Side::Monsters, UnitKind::Orc.profile(), GridPos::new(0, 1));
        let events = move_to(&mut field, orc, GridPos::new(9, 1));
        assert_eq!(field.unit(orc).pos, GridPos::new(2, 1));
        assert_eq!(count(&events, |e| matches!(e, SimEvent::LeaveTile { .. })), 2);
    }

    #[test]
    fn test_unreachable_destination_is_noop() {
        let mut field = field(6, 3);
        for y in 0..3 {
            field.map.set_terrain(GridPos::new(2, y), Terrain::Obstacle);
        }
        let orc = field.spawn(Side::Monsters, UnitKind::Orc.profile(), GridPos::new(0, 1));
        assert!(move_to(&mut field, orc, GridPos::new(5, 1)).is_empty());
        assert_eq!(field.unit(orc).pos, GridPos::new(0, 1));
    }

    #[test]
    fn test_zone_of_control_hits_once_per_move() {
        let mut field = field(8, 4);
        let mage = field.spawn(Side::Heroes, UnitKind::Mage.profile(), GridPos::new(1, 1));
        field.unit_mut(mage).profile.move_points = 3;
        let goblin = field.spawn(Side::Monsters, UnitKind::Goblin.profile(), GridPos::new(1, 2));

        // The goblin is adjacent to both (1,1) and (2,2), which this walk vacates.
        let steps = [GridPos::new(2, 1), GridPos::new(2, 2), GridPos::new(3, 2)];
        let events = walk(&mut field, mage, &steps, None);
        let hits = count(&events, |e| {
            matches!(e, SimEvent::OpportunityHit { attacker, .. } if *attacker == goblin)
        });
        assert_eq!(hits, 1);
        assert_eq!(field.unit(mage).pos, GridPos::new(3, 2));
    }

    #[test]
    fn test_ranged_and_dead_enemies_exert_no_zoc() {
        let mut field = field(8, 3);
        let warrior = field.spawn(Side::Heroes, UnitKind::Warrior.profile(), GridPos::new(1, 1));
        field.spawn(Side::Monsters, UnitKind::Archer.profile(), GridPos::new(1, 0));
        let goblin = field.spawn(Side::Monsters, UnitKind::Goblin.profile(), GridPos::new(1, 2));
        field.unit_mut(goblin).hp = 0;

        let events = move_to(&mut field, warrior, GridPos::new(3, 1));
        assert_eq!(count(&events, |e| matches!(e, SimEvent::OpportunityHit { .. })), 0);
    }

    #[test]
    fn test_mover_killed_by_zoc_stays_put() {
        let mut field = field(8, 3);
        let mage = field.spawn(Side::Heroes, UnitKind::Mage.profile(), GridPos::new(1, 1));
        field.unit_mut(mage).hp = 1;
        field.spawn(Side::Monsters, UnitKind::Goblin.profile(), GridPos::new(0, 1));

        let events = move_to(&mut field, mage, GridPos::new(4, 1));
        assert!(!field.unit(mage).is_alive());
        assert_eq!(field.unit(mage).pos, GridPos::new(1, 1));
        assert!(!events.iter().any(|e| matches!(e, SimEvent::Move { .. })));
        assert!(events.iter().any(|e| matches!(e, SimEvent::Death { .. })));
    }

    #[test]
    fn test_hazard_poisons_and_shrine_consumed() {
        let mut field = field(6, 1);
        field.map.set_terrain(GridPos::new(1, 0), Terrain::HazardPoison);
        field.map.set_terrain(GridPos::new(2, 0), Terrain::Shrine);
        let orc = field.spawn(Side::Monsters, UnitKind::Orc.profile(), GridPos::new(0, 0));
        field.unit_mut(orc).hp = 20;

        let events = move_to(&mut field, orc, GridPos::new(2, 0));
        let applied: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::EnterTile { applied, .. } => Some(*applied),
                _ => None,
            })
            .collect();
        assert_eq!(
            applied,
            vec![
                Some(TileEffect::Poison {
                    amount: 1,
                    turns: 2
                }),
                Some(TileEffect::Shrine { heal: 3, shield: 2 }),
            ]
        );
        let unit = field.unit(orc);
        assert_eq!((unit.hp, unit.status.shield), (23, 2));
        assert_eq!(unit.status.poison_turns, 2);
        assert!(!field.map.has_shrine(GridPos::new(2, 0)));
    }

    #[test]
    fn test_move_to_stops_before_occupied() {
        let mut field = field(6, 1);
        let orc = field.spawn(Side::Monsters, UnitKind::Orc.profile(), GridPos::new(0, 0));
        field.spawn(Side::Monsters, UnitKind::Goblin.profile(), GridPos::new(2, 0));
        move_to(&mut field, orc, GridPos::new(2, 0));
        assert_eq!(field.unit(orc).pos, GridPos::new(1, 0));
    }

    #[test]
    fn test_move_away_maximises_distance() {
        let mut field = field(6, 3);
        let archer = field.spawn(Side::Monsters, UnitKind::Archer.profile(), GridPos::new(2, 1));
        field.spawn(Side::Heroes, UnitKind::Warrior.profile(), GridPos::new(1, 1));

        // North, east and south all end two tiles away; the first wins.
        let events = move_away(&mut field, archer);
        assert_eq!(field.unit(archer).pos, GridPos::new(2, 0));
        // The warrior punishes the retreat.
        assert_eq!(count(&events, |e| matches!(e, SimEvent::OpportunityHit { .. })), 1);
    }

    #[test]
    fn test_move_away_cornered_is_noop() {
        let mut field = field(2, 1);
        let archer = field.spawn(Side::Monsters, UnitKind::Archer.profile(), GridPos::new(1, 0));
        field.spawn(Side::Heroes, UnitKind::Warrior.profile(), GridPos::new(0, 0));
        assert!(move_away(&mut field, archer).is_empty());
    }

    #[test]
    fn test_waypoint_patrol_cycles() {
        let mut field = field(8, 3);
        let goblin = field.spawn(Side::Monsters, UnitKind::Goblin.profile(), GridPos::new(6, 1));
        field.unit_mut(goblin).patrol = Some(Patrol::Waypoints {
            points: vec![GridPos::new(4, 1), GridPos::new(6, 1)],
            index: 0,
        });
        let mut visited = Vec::new();
        for _ in 0..6 {
            if let Some((_, to)) = patrol_step(&mut field, goblin) {
                visited.push(to.x);
            }
        }
        assert_eq!(visited, vec![5, 4, 5, 6, 5, 4]);
    }

    #[test]
    fn test_wander_stays_in_bounds() {
        let mut field = field(12, 8);
        let goblin = field.spawn(Side::Monsters, UnitKind::Goblin.profile(), GridPos::new(10, 4));
        let patrol = Patrol::Wander {
            min: GridPos::new(9, 3),
            max: GridPos::new(11, 5),
        };
        field.unit_mut(goblin).patrol = Some(patrol.clone());
        for _ in 0..50 {
            patrol_step(&mut field, goblin);
            assert!(patrol.contains(field.unit(goblin).pos));
        }
    }
}
