//! Grid pathfinding and line of sight.
//!
//! Movement is four-directional with uniform cost, so breadth-first search
//! yields shortest paths. Neighbors are expanded in [`CARDINALS`] order,
//! which makes the chosen path deterministic among equal-length candidates.
//!
//! [`CARDINALS`]: crate::math::CARDINALS

use std::collections::{HashMap, HashSet, VecDeque};

use crate::map::BattleMap;
use crate::math::GridPos;

/// Find a shortest path from `start` to `goal`.
///
/// Tiles in `blocked` (typically those occupied by living units) cannot be
/// entered, except the goal itself. The returned path includes both `start`
/// and `goal`. Returns `None` if the goal is impassable or unreachable.
#[must_use]
pub fn find_path(
    map: &BattleMap,
    start: GridPos,
    goal: GridPos,
    blocked: &HashSet<GridPos>,
) -> Option<Vec<GridPos>> {
    if !map.in_bounds(start) || !map.is_passable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut frontier = VecDeque::from([start]);
    let mut visited = HashSet::from([start]);

    while let Some(current) = frontier.pop_front() {
        for next in map.neighbors(current) {
            if visited.contains(&next) || !map.is_passable(next) {
                continue;
            }
            if next != goal && blocked.contains(&next) {
                continue;
            }
            visited.insert(next);
            came_from.insert(next, current);
            if next == goal {
                return Some(reconstruct_path(&came_from, goal));
            }
            frontier.push_back(next);
        }
    }

    None
}

/// Walk `came_from` back from the goal.
fn reconstruct_path(came_from: &HashMap<GridPos, GridPos>, goal: GridPos) -> Vec<GridPos> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}

/// Orthogonal line of sight.
///
/// Sight is only traced along a shared row or column: any obstacle strictly
/// between the two tiles blocks it. Tiles that are not aligned always see
/// each other.
#[must_use]
pub fn line_of_sight(map: &BattleMap, from: GridPos, to: GridPos) -> bool {
    if !from.is_aligned(to) {
        return true;
    }
    let dx = (to.x - from.x).signum();
    let dy = (to.y - from.y).signum();
    let mut cursor = from.offset(dx, dy);
    while cursor != to {
        if !map.is_passable(cursor) {
            return false;
        }
        cursor = cursor.offset(dx, dy);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Terrain;

    fn wall(map: &mut BattleMap, x: i32, rows: std::ops::Range<i32>) {
        for y in rows {
            map.set_terrain(GridPos::new(x, y), Terrain::Obstacle);
        }
    }

    #[test]
    fn test_simple_path() {
        let map = BattleMap::open(10, 10);
        let path = find_path(&map, GridPos::new(0, 0), GridPos::new(3, 2), &HashSet::new()).unwrap();
        assert_eq!(path.first(), Some(&GridPos::new(0, 0)));
        assert_eq!(path.last(), Some(&GridPos::new(3, 2)));
        assert_eq!(path.len(), 6);
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
        }
    }

    #[test]
    fn test_path_around_obstacle() {
        let mut map = BattleMap::open(10, 10);
        wall(&mut map, 5, 2..8);

        let path = find_path(&map, GridPos::new(2, 5), GridPos::new(8, 5), &HashSet::new()).unwrap();
        for point in &path {
            assert!(map.is_passable(*point), "Path goes through blocked tile {point}");
        }
        // Detour under the wall: 6 across plus 2 * 3 vertical.
        assert_eq!(path.len() - 1, 12);
    }

    #[test]
    fn test_no_path_exists() {
        let mut map = BattleMap::open(10, 10);
        wall(&mut map, 5, 0..10);
        assert!(find_path(&map, GridPos::new(2, 5), GridPos::new(8, 5), &HashSet::new()).is_none());
    }

    #[test]
    fn test_path_to_same_tile() {
        let map = BattleMap::open(10, 10);
        let path = find_path(&map, GridPos::new(5, 5), GridPos::new(5, 5), &HashSet::new()).unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_blocked_goal() {
        let mut map = BattleMap::open(10, 10);
        map.set_terrain(GridPos::new(4, 4), Terrain::Obstacle);
        assert!(find_path(&map, GridPos::new(0, 0), GridPos::new(4, 4), &HashSet::new()).is_none());
    }

    #[test]
    fn test_occupied_tiles_block_except_goal() {
        let map = BattleMap::open(3, 1);
        let occupied = HashSet::from([GridPos::new(1, 0), GridPos::new(2, 0)]);
        assert!(find_path(&map, GridPos::new(0, 0), GridPos::new(2, 0), &occupied).is_none());

        let occupied = HashSet::from([GridPos::new(2, 0)]);
        let path = find_path(&map, GridPos::new(0, 0), GridPos::new(2, 0), &occupied).unwrap();
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_line_of_sight_orthogonal_only() {
        let mut map = BattleMap::open(8, 8);
        map.set_terrain(GridPos::new(3, 2), Terrain::Obstacle);

        assert!(!line_of_sight(&map, GridPos::new(1, 2), GridPos::new(5, 2)));
        assert!(!line_of_sight(&map, GridPos::new(5, 2), GridPos::new(1, 2)));
        assert!(line_of_sight(&map, GridPos::new(1, 3), GridPos::new(5, 3)));
        // Diagonal pairs are never traced.
        assert!(line_of_sight(&map, GridPos::new(1, 1), GridPos::new(5, 3)));
        assert!(!line_of_sight(&map, GridPos::new(2, 2), GridPos::new(4, 2)));
        // Adjacent tiles have nothing in between.
        assert!(line_of_sight(&map, GridPos::new(4, 2), GridPos::new(5, 2)));
    }
}
