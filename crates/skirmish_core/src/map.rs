//! Battle grid with terrain kinds and named preset layouts.
//!
//! Every coordinate in `[0, width) x [0, height)` holds exactly one [`Tile`].
//! Tiles are stored row-major. Obstacles are the only impassable terrain.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::math::GridPos;
use crate::rng::SimRng;

/// Terrain kinds a tile can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// Open ground.
    #[default]
    Plain,
    /// Blocks movement and line of sight.
    Obstacle,
    /// Poisons whoever steps in.
    HazardPoison,
    /// One-time heal and shield, reverts to plain when used.
    Shrine,
    /// Capture-point mission anchor.
    ControlPoint,
    /// Escort mission goal.
    Exit,
}

impl Terrain {
    /// Returns true if units may stand on this terrain.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Obstacle)
    }
}

/// A single grid tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Terrain kind.
    pub terrain: Terrain,
    /// False only for obstacles.
    pub passable: bool,
}

impl Tile {
    fn new(pos: GridPos, terrain: Terrain) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            terrain,
            passable: terrain.is_passable(),
        }
    }

    /// Coordinate of this tile.
    #[must_use]
    pub const fn pos(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }
}

/// A named layout of obstacles, hazards and shrines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapPreset {
    /// Preset name used by configs.
    pub name: &'static str,
    /// Impassable tiles.
    pub obstacles: &'static [(i32, i32)],
    /// Poison hazard tiles.
    pub hazards: &'static [(i32, i32)],
    /// Shrine tiles.
    pub shrines: &'static [(i32, i32)],
}

/// Known presets, laid out for the default 12x8 board.
pub const PRESETS: &[MapPreset] = &[
    MapPreset {
        name: "open",
        obstacles: &[],
        hazards: &[],
        shrines: &[(5, 0), (6, 7)],
    },
    MapPreset {
        name: "ruins",
        obstacles: &[(5, 1), (5, 2), (4, 4), (7, 3), (6, 5), (6, 6)],
        hazards: &[(7, 2), (4, 6)],
        shrines: &[(3, 1), (8, 6)],
    },
    MapPreset {
        name: "marsh",
        obstacles: &[(8, 1), (3, 6)],
        hazards: &[(4, 3), (5, 3), (7, 5), (8, 5), (5, 6), (6, 1)],
        shrines: &[(6, 6), (4, 1)],
    },
    MapPreset {
        name: "crossroads",
        obstacles: &[(3, 2), (4, 2), (7, 2), (8, 2), (3, 5), (4, 5), (7, 5), (8, 5)],
        hazards: &[(2, 4), (9, 3)],
        shrines: &[(5, 0), (6, 7)],
    },
];

/// Look up a preset by name.
pub fn preset_by_name(name: &str) -> Result<&'static MapPreset> {
    PRESETS
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| SimError::UnknownPreset(name.to_string()))
}

/// The battle grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleMap {
    width: i32,
    height: i32,
    /// Preset the layout came from.
    preset: String,
    /// Tile data stored in row-major order.
    tiles: Vec<Tile>,
    /// Unconsumed shrine coordinates.
    shrines: BTreeSet<GridPos>,
}

impl BattleMap {
    /// Create an all-plain map.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is not positive.
    #[must_use]
    pub fn open(width: i32, height: i32) -> Self {
        assert!(width > 0, "BattleMap width must be positive");
        assert!(height > 0, "BattleMap height must be positive");

        let tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| Tile::new(GridPos::new(x, y), Terrain::Plain)))
            .collect();
        Self {
            width,
            height,
            preset: "custom".to_string(),
            tiles,
            shrines: BTreeSet::new(),
        }
    }

    /// Build a map from a named preset, or a uniformly random one when `preset` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownPreset`] for an unrecognized name.
    pub fn build(width: i32, height: i32, preset: Option<&str>, rng: &mut SimRng) -> Result<Self> {
        let preset = match preset {
            Some(name) => preset_by_name(name)?,
            None => rng
                .choose(PRESETS)
                .ok_or_else(|| SimError::InvalidConfig("no map presets defined".into()))?,
        };
        Ok(Self::from_preset(width, height, preset))
    }

    /// Apply a preset layout.
    ///
    /// Coordinates outside the map, or in the two spawn columns at either
    /// edge, are dropped.
    #[must_use]
    pub fn from_preset(width: i32, height: i32, preset: &MapPreset) -> Self {
        let mut map = Self::open(width, height);
        map.preset = preset.name.to_string();
        let layers = [
            (preset.obstacles, Terrain::Obstacle),
            (preset.hazards, Terrain::HazardPoison),
            (preset.shrines, Terrain::Shrine),
        ];
        for (coords, terrain) in layers {
            for &(x, y) in coords {
                if (2..width - 2).contains(&x) {
                    map.set_terrain(GridPos::new(x, y), terrain);
                }
            }
        }
        map
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Name of the preset this map was built from.
    #[must_use]
    pub fn preset(&self) -> &str {
        &self.preset
    }

    #[inline]
    fn index(&self, pos: GridPos) -> usize {
        (pos.y as usize) * (self.width as usize) + (pos.x as usize)
    }

    /// Check if a coordinate is within grid bounds.
    #[must_use]
    pub const fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Tile at a coordinate, or `None` if out of bounds.
    #[must_use]
    pub fn tile(&self, pos: GridPos) -> Option<&Tile> {
        if self.in_bounds(pos) {
            self.tiles.get(self.index(pos))
        } else {
            None
        }
    }

    /// True if the coordinate is in bounds and not an obstacle.
    #[must_use]
    pub fn is_passable(&self, pos: GridPos) -> bool {
        self.tile(pos).is_some_and(|t| t.passable)
    }

    /// In-bounds orthogonal neighbors of a coordinate (no diagonals).
    pub fn neighbors(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        pos.cardinal_neighbors()
            .into_iter()
            .filter(move |n| self.in_bounds(*n))
    }

    /// Overwrite the terrain of a tile, keeping the shrine set in sync.
    /// Returns `false` if out of bounds.
    pub fn set_terrain(&mut self, pos: GridPos, terrain: Terrain) -> bool {
        if !self.in_bounds(pos) {
            return false;
        }
        let index = self.index(pos);
        self.tiles[index] = Tile::new(pos, terrain);
        if terrain == Terrain::Shrine {
            self.shrines.insert(pos);
        } else {
            self.shrines.remove(&pos);
        }
        true
    }

    /// True if an unconsumed shrine stands at `pos`.
    #[must_use]
    pub fn has_shrine(&self, pos: GridPos) -> bool {
        self.shrines.contains(&pos)
    }

    /// Consume the shrine at `pos`, reverting it to plain ground.
    /// Returns `false` if there was no shrine to consume.
    pub fn consume_shrine(&mut self, pos: GridPos) -> bool {
        if !self.has_shrine(pos) {
            return false;
        }
        self.set_terrain(pos, Terrain::Plain)
    }

    /// Remaining shrine coordinates.
    pub fn shrines(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.shrines.iter().copied()
    }

    /// All tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Middle tile, used as the capture-point anchor.
    #[must_use]
    pub const fn center(&self) -> GridPos {
        GridPos::new(self.width / 2, self.height / 2)
    }
}
