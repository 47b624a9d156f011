//! Grid coordinates and fixed-point damage math.
//!
//! Damage modifiers are products of 1.25, 0.75, 1.5 and 0.5, all exactly
//! representable in binary fixed-point, so every client truncates to the
//! same integer damage.

use std::fmt;

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all modifier math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Orthogonal step offsets in neighbor order: north, east, south, west.
///
/// Every search and tie-break over neighbors walks this order, which keeps
/// path and kiting choices deterministic.
pub const CARDINALS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// A tile coordinate on the battle grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPos {
    /// Create a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another tile.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Offset this position by a delta.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The four orthogonal neighbors in [`CARDINALS`] order (unchecked bounds).
    #[must_use]
    pub fn cardinal_neighbors(self) -> [Self; 4] {
        CARDINALS.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// True if both tiles share a row or a column.
    #[must_use]
    pub const fn is_aligned(self, other: Self) -> bool {
        self.x == other.x || self.y == other.y
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A percentage as a fixed-point fraction (`125` -> 1.25).
#[must_use]
pub fn percent(value: u32) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}

/// Scale an integer amount by a modifier, truncating toward zero.
#[must_use]
pub fn scale(amount: u32, modifier: Fixed) -> u32 {
    let scaled = Fixed::from_num(amount) * modifier;
    scaled.to_num::<i64>().max(0) as u32
}
