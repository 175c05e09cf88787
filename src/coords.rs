use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
    NorthEast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CubeCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CubeCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        debug_assert!(x + y + z == 0, "cube coordinates must sum to zero");
        Self { x, y, z }
    }

    /// Builds a coordinate from untrusted input, rejecting triples off the cube plane.
    pub fn try_new(x: i32, y: i32, z: i32) -> Option<Self> {
        let sum = i64::from(x) + i64::from(y) + i64::from(z);
        (sum == 0).then_some(Self { x, y, z })
    }

    pub fn add(self, other: CubeCoord) -> Self {
        CubeCoord::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn neighbor(self, direction: Direction) -> CubeCoord {
        self.add(UNIT_VECTORS[&direction])
    }

    pub fn as_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Default for CubeCoord {
    fn default() -> Self {
        CubeCoord::new(0, 0, 0)
    }
}

impl fmt::Display for CubeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

pub static UNIT_VECTORS: Lazy<HashMap<Direction, CubeCoord>> = Lazy::new(|| {
    use Direction::*;
    HashMap::from([
        (NorthEast, CubeCoord::new(1, 0, -1)),
        (SouthWest, CubeCoord::new(-1, 0, 1)),
        (NorthWest, CubeCoord::new(0, 1, -1)),
        (SouthEast, CubeCoord::new(0, -1, 1)),
        (East, CubeCoord::new(1, -1, 0)),
        (West, CubeCoord::new(-1, 1, 0)),
    ])
});
