//! Cube coordinate system for the hex grid.
//!
//! Tiles are keyed by `CubeCoord` with the invariant `q + r + s == 0`.
//! Corners of a tile are expressed on a tripled lattice: the corner `i` of the
//! tile at `c` sits at `3 * c + CORNER_OFFSETS[i]`. Two tiles that share a
//! corner therefore produce the same lattice point, which lets the board
//! builder deduplicate intersections without floating point geometry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Direction from a tile to one of its six neighbors.
///
/// The discriminant is the directional slot index used by every
/// per-tile adjacency array on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    TopRight,
    Right,
    BottomRight,
    BottomLeft,
    Left,
    TopLeft,
}

impl Direction {
    /// All directions in clockwise order starting from the top-right
    pub const ALL: [Direction; 6] = [
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::BottomLeft,
        Direction::Left,
        Direction::TopLeft,
    ];

    /// Slot index of this direction (0..6)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction for a slot index, wrapping modulo 6
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Tile-to-tile offset for this direction
    pub const fn offset(self) -> CubeCoord {
        match self {
            Direction::TopRight => CubeCoord::new(1, -1, 0),
            Direction::Right => CubeCoord::new(1, 0, -1),
            Direction::BottomRight => CubeCoord::new(0, 1, -1),
            Direction::BottomLeft => CubeCoord::new(-1, 1, 0),
            Direction::Left => CubeCoord::new(-1, 0, 1),
            Direction::TopLeft => CubeCoord::new(0, -1, 1),
        }
    }
}

/// Tile-to-intersection offsets on the tripled lattice, in corner order:
/// top, top-right, bottom-right, bottom, bottom-left, top-left.
///
/// Corner `i` lies between neighbor directions `i - 1` and `i`.
pub const CORNER_OFFSETS: [CubeCoord; 6] = [
    CubeCoord::new(1, -2, 1),
    CubeCoord::new(2, -1, -1),
    CubeCoord::new(1, 1, -2),
    CubeCoord::new(-1, 2, -1),
    CubeCoord::new(-2, 1, 1),
    CubeCoord::new(-1, -1, 2),
];

/// Cube coordinate of a hex tile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct CubeCoord {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

impl CubeCoord {
    /// The center tile of every board
    pub const ORIGIN: CubeCoord = CubeCoord::new(0, 0, 0);

    /// Create a coordinate. Callers are responsible for `q + r + s == 0`.
    pub const fn new(q: i32, r: i32, s: i32) -> Self {
        Self { q, r, s }
    }

    /// Create from axial `(q, r)`, deriving `s`
    pub const fn axial(q: i32, r: i32) -> Self {
        Self::new(q, r, -q - r)
    }

    pub const fn is_valid(&self) -> bool {
        self.q + self.r + self.s == 0
    }

    /// The neighboring tile coordinate in a direction
    pub fn neighbor(&self, direction: Direction) -> CubeCoord {
        *self + direction.offset()
    }

    /// The six neighboring coordinates in directional slot order
    pub fn neighbors(&self) -> [CubeCoord; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// Distance to another tile in hex steps
    pub fn distance_to(&self, other: &CubeCoord) -> u32 {
        let d = *self - *other;
        ((d.q.abs() + d.r.abs() + d.s.abs()) / 2) as u32
    }

    /// Distance from the center tile (ring number)
    pub fn ring(&self) -> u32 {
        self.distance_to(&Self::ORIGIN)
    }

    /// Position of corner `index` on the tripled lattice
    pub fn corner(&self, index: usize) -> CubeCoord {
        *self * 3 + CORNER_OFFSETS[index % 6]
    }

    /// All six corner positions in corner order
    pub fn corners(&self) -> [CubeCoord; 6] {
        std::array::from_fn(|i| self.corner(i))
    }
}

impl Add for CubeCoord {
    type Output = CubeCoord;

    fn add(self, rhs: CubeCoord) -> CubeCoord {
        CubeCoord::new(self.q + rhs.q, self.r + rhs.r, self.s + rhs.s)
    }
}

impl Sub for CubeCoord {
    type Output = CubeCoord;

    fn sub(self, rhs: CubeCoord) -> CubeCoord {
        CubeCoord::new(self.q - rhs.q, self.r - rhs.r, self.s - rhs.s)
    }
}

impl Mul<i32> for CubeCoord {
    type Output = CubeCoord;

    fn mul(self, rhs: i32) -> CubeCoord {
        CubeCoord::new(self.q * rhs, self.r * rhs, self.s * rhs)
    }
}

impl fmt::Display for CubeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_offsets_are_valid_cube_coords() {
        for dir in Direction::ALL {
            assert!(dir.offset().is_valid());
            assert_eq!(dir.offset().ring(), 1);
        }
        for offset in CORNER_OFFSETS {
            assert!(offset.is_valid());
        }
    }

    #[test]
    fn test_opposite_directions_cancel() {
        for dir in Direction::ALL {
            assert_eq!(dir.offset() + dir.opposite().offset(), CubeCoord::ORIGIN);
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_neighbors_in_slot_order() {
        let c = CubeCoord::new(1, -1, 0);
        let neighbors = c.neighbors();
        assert_eq!(neighbors[0], CubeCoord::new(2, -2, 0));
        assert_eq!(neighbors[3], CubeCoord::new(0, 0, 0));
        assert_eq!(neighbors.iter().collect::<HashSet<_>>().len(), 6);
    }

    #[test]
    fn test_distance() {
        let a = CubeCoord::ORIGIN;
        let b = CubeCoord::new(2, -1, -1);
        assert_eq!(a.distance_to(&b), 2);
        assert_eq!(b.distance_to(&a), 2);
        assert_eq!(a.distance_to(&a), 0);
    }

    #[test]
    fn test_corner_shared_by_three_tiles() {
        // Corner i is shared with the neighbors in directions i-1 and i
        let center = CubeCoord::ORIGIN;
        for i in 0..6 {
            let prev = center.neighbor(Direction::from_index(i + 5));
            let next = center.neighbor(Direction::from_index(i));
            let point = center.corner(i);
            assert_eq!(prev.corner((i + 2) % 6), point);
            assert_eq!(next.corner((i + 4) % 6), point);
        }
    }

    #[test]
    fn test_corners_are_distinct() {
        let corners = CubeCoord::axial(-1, 2).corners();
        assert_eq!(corners.iter().collect::<HashSet<_>>().len(), 6);
    }
}
