use std::fmt;
use std::ops::Add;

use crate::defs::MAX_Z;

/// Largest valid x / y coordinate.
pub const MAX_XY: i32 = 0xFFFF;

/// Integer world coordinate. `z` is the floor (0 = sky-most).
///
/// Fields are plain `i32` so translations can leave the valid range
/// without wrapping; [`Position::is_valid`] tells whether a tile may exist
/// there.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Eight compass directions plus "no direction".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
    Invalid,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
        Direction::Invalid,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit step `(dx, dy)`; screen y grows southwards.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::Invalid => (0, 0),
        }
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NorthEast | Direction::SouthEast | Direction::SouthWest | Direction::NorthWest
        )
    }
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn is_valid_xyz(x: i32, y: i32, z: i32) -> bool {
        (0..=MAX_XY).contains(&x) && (0..=MAX_XY).contains(&y) && (0..=MAX_Z as i32).contains(&z)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        Self::is_valid_xyz(self.x, self.y, self.z)
    }

    /// Floor index as stored by per-floor caches. Only meaningful when valid.
    #[inline]
    pub fn floor(&self) -> u8 {
        self.z.clamp(0, MAX_Z as i32) as u8
    }

    #[inline]
    pub fn translated(&self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy, self.z)
    }

    #[inline]
    pub fn translated_z(&self, dx: i32, dy: i32, dz: i32) -> Position {
        Position::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn translated_to_direction(&self, dir: Direction) -> Position {
        let (dx, dy) = dir.offset();
        self.translated(dx, dy)
    }

    /*──────────────────────── floor stepping ────────────────────────*/

    /// Move `n` floors towards the sky. Leaves `self` untouched and returns
    /// `false` if the result would be invalid.
    pub fn up(&mut self, n: i32) -> bool {
        let nz = self.z - n;
        if Self::is_valid_xyz(self.x, self.y, nz) {
            self.z = nz;
            true
        } else {
            false
        }
    }

    pub fn down(&mut self, n: i32) -> bool {
        self.up(-n)
    }

    /// Move to the tile `n` floors up that covers the same screen cell.
    ///
    /// Every floor up is drawn one tile up-left, so the covering tile sits
    /// `n` tiles further down-right on its own floor. A negative `n` walks
    /// down instead.
    pub fn covered_up(&mut self, n: i32) -> bool {
        let (nx, ny, nz) = (self.x + n, self.y + n, self.z - n);
        if Self::is_valid_xyz(nx, ny, nz) {
            self.x = nx;
            self.y = ny;
            self.z = nz;
            true
        } else {
            false
        }
    }

    pub fn covered_down(&mut self, n: i32) -> bool {
        self.covered_up(-n)
    }

    /*──────────────────────── range tests ───────────────────────────*/

    /// Symmetric box test around `self`.
    #[inline]
    pub fn is_in_range(&self, pos: &Position, x_range: i32, y_range: i32, ignore_z: bool) -> bool {
        (self.x - pos.x).abs() <= x_range
            && (self.y - pos.y).abs() <= y_range
            && (ignore_z || self.z == pos.z)
    }

    /// Asymmetric box test: is `pos` inside `self` grown by the margins?
    #[inline]
    pub fn is_in_range_ex(
        &self,
        pos: &Position,
        left: i32,
        right: i32,
        top: i32,
        bottom: i32,
        ignore_z: bool,
    ) -> bool {
        pos.x >= self.x - left
            && pos.x <= self.x + right
            && pos.y >= self.y - top
            && pos.y <= self.y + bottom
            && (ignore_z || self.z == pos.z)
    }

    /// Euclidean distance on the x/y plane.
    #[inline]
    pub fn distance(&self, other: &Position) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Compass direction from `self` towards `to`, by 45° sectors.
    pub fn direction_to(&self, to: &Position) -> Direction {
        let dx = (to.x - self.x) as f32;
        let dy = (to.y - self.y) as f32;
        if dx == 0.0 && dy == 0.0 {
            return Direction::Invalid;
        }
        // y points south on screen; flip so 90° is north
        let mut angle = (-dy).atan2(dx).to_degrees();
        if angle < 0.0 {
            angle += 360.0;
        }
        match angle {
            a if !(22.5..337.5).contains(&a) => Direction::East,
            a if a < 67.5 => Direction::NorthEast,
            a if a < 112.5 => Direction::North,
            a if a < 157.5 => Direction::NorthWest,
            a if a < 202.5 => Direction::West,
            a if a < 247.5 => Direction::SouthWest,
            a if a < 292.5 => Direction::South,
            _ => Direction::SouthEast,
        }
    }
}

impl Add for Position {
    type Output = Position;

    #[inline]
    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
