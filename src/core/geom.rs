//! World Geometry
//!
//! Actor positions, block coordinates and the rectangular playable area.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Continuous actor position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// East-west axis
    pub x: f64,
    /// Vertical axis
    pub y: f64,
    /// North-south axis
    pub z: f64,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Block column this position stands in.
    #[inline]
    pub fn block(self) -> BlockPos {
        BlockPos::new(self.x.floor() as i32, self.y.floor() as i32, self.z.floor() as i32)
    }

    /// Euclidean distance.
    pub fn distance(self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Integer block coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// East-west axis
    pub x: i32,
    /// Vertical axis
    pub y: i32,
    /// North-south axis
    pub z: i32,
}

impl BlockPos {
    /// Create a new block position.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Centre of the block's top face.
    #[inline]
    pub fn top_center(self) -> Position {
        Position::new(self.x as f64 + 0.5, self.y as f64 + 1.0, self.z as f64 + 0.5)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Axis-aligned playable region. All limits are inclusive block coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Western edge
    pub min_x: i32,
    /// Eastern edge
    pub max_x: i32,
    /// Northern edge
    pub min_z: i32,
    /// Southern edge
    pub max_z: i32,
    /// Floor of the build volume
    pub min_y: i32,
    /// Ceiling of the build volume
    pub max_y: i32,
}

impl Bounds {
    /// Create bounds from explicit limits.
    pub const fn new(min_x: i32, max_x: i32, min_z: i32, max_z: i32, min_y: i32, max_y: i32) -> Self {
        Self { min_x, max_x, min_z, max_z, min_y, max_y }
    }

    /// Horizontal width along X.
    #[inline]
    pub fn width_x(&self) -> i32 {
        self.max_x - self.min_x
    }

    /// Horizontal width along Z.
    #[inline]
    pub fn width_z(&self) -> i32 {
        self.max_z - self.min_z
    }

    /// True once either horizontal axis has shrunk to a single column.
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.width_x() < 1 || self.width_z() < 1
    }

    /// Integer centre column.
    pub fn center_column(&self) -> (i32, i32) {
        (
            self.min_x + self.width_x().div_euclid(2),
            self.min_z + self.width_z().div_euclid(2),
        )
    }

    /// Whether a column lies inside the horizontal limits.
    #[inline]
    pub fn contains_column(&self, x: i32, z: i32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    /// Whether a height lies inside the vertical limits.
    #[inline]
    pub fn contains_height(&self, y: i32) -> bool {
        y >= self.min_y && y <= self.max_y
    }

    /// Whether a continuous position lies inside the horizontal limits.
    pub fn contains_position(&self, pos: Position) -> bool {
        let block = pos.block();
        self.contains_column(block.x, block.z)
    }

    /// Clamp a column into the horizontal limits.
    pub fn clamp_column(&self, x: i32, z: i32) -> (i32, i32) {
        (x.clamp(self.min_x, self.max_x), z.clamp(self.min_z, self.max_z))
    }

    /// Pull every horizontal edge inward by `by` blocks, stopping at the centre.
    ///
    /// Negative amounts are treated as zero; bounds never grow.
    pub fn shrunk(&self, by: i32) -> Bounds {
        let by = by.max(0);
        let (cx, cz) = self.center_column();
        Bounds {
            min_x: (self.min_x + by).min(cx),
            max_x: (self.max_x - by).max(cx),
            min_z: (self.min_z + by).min(cz),
            max_z: (self.max_z - by).max(cz),
            ..*self
        }
    }
}
