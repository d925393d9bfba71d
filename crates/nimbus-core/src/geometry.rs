//! Spatial axes, directions, positions and axis-aligned bounds.
//!
//! Coordinates follow the usual cloud-model convention: `z` (coord3) is
//! the vertical, `x` (coord1) and `y` (coord2) are horizontal. Bounds are
//! half-open: a position lies inside a box when `lower <= c < upper` on
//! every axis.

use std::fmt;

/// A spatial axis of the domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// Vertical (coord3).
    Z,
    /// First horizontal (coord1).
    X,
    /// Second horizontal (coord2).
    Y,
}

impl Axis {
    /// All axes in index order (z fastest-varying in gridbox numbering).
    pub const ALL: [Axis; 3] = [Axis::Z, Axis::X, Axis::Y];

    /// Position of this axis in `[z, x, y]` arrays.
    pub fn index(self) -> usize {
        match self {
            Axis::Z => 0,
            Axis::X => 1,
            Axis::Y => 2,
        }
    }

    /// Direction of travel towards the lower face along this axis.
    pub fn lower(self) -> Direction {
        match self {
            Axis::Z => Direction::Down,
            Axis::X => Direction::West,
            Axis::Y => Direction::South,
        }
    }

    /// Direction of travel towards the upper face along this axis.
    pub fn upper(self) -> Direction {
        match self {
            Axis::Z => Direction::Up,
            Axis::X => Direction::East,
            Axis::Y => Direction::North,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Z => "z",
            Axis::X => "x",
            Axis::Y => "y",
        };
        f.write_str(name)
    }
}

/// One of the six face directions of a gridbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards smaller z.
    Down,
    /// Towards larger z.
    Up,
    /// Towards smaller x.
    West,
    /// Towards larger x.
    East,
    /// Towards smaller y.
    South,
    /// Towards larger y.
    North,
}

impl Direction {
    /// All six directions, lower face before upper face per axis.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::West,
        Direction::East,
        Direction::South,
        Direction::North,
    ];

    /// The axis this direction moves along.
    pub fn axis(self) -> Axis {
        match self {
            Direction::Down | Direction::Up => Axis::Z,
            Direction::West | Direction::East => Axis::X,
            Direction::South | Direction::North => Axis::Y,
        }
    }

    /// `true` for directions towards the upper face of their axis.
    pub fn is_upper(self) -> bool {
        matches!(self, Direction::Up | Direction::East | Direction::North)
    }

    /// The direction pointing the other way along the same axis.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::North => Direction::South,
        }
    }
}

/// A point in the domain, in metres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// Vertical coordinate (coord3).
    pub z: f64,
    /// First horizontal coordinate (coord1).
    pub x: f64,
    /// Second horizontal coordinate (coord2).
    pub y: f64,
}

impl Position {
    /// Construct from `(z, x, y)`.
    pub fn new(z: f64, x: f64, y: f64) -> Self {
        Self { z, x, y }
    }

    /// Coordinate along `axis`.
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Z => self.z,
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Mutable coordinate along `axis`.
    pub fn get_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::Z => &mut self.z,
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    /// Copy of `self` with the coordinate along `axis` replaced.
    pub fn with(mut self, axis: Axis, value: f64) -> Self {
        *self.get_mut(axis) = value;
        self
    }

    /// `true` if every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.z.is_finite() && self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned half-open box `[lower, upper)`.
///
/// Unmodelled dimensions use infinite extents, so containment along
/// them always holds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Lower corner, inclusive.
    pub lower: Position,
    /// Upper corner, exclusive.
    pub upper: Position,
}

impl Bounds {
    /// Construct from lower and upper corners.
    pub fn new(lower: Position, upper: Position) -> Self {
        Self { lower, upper }
    }

    /// `(lower, upper)` along `axis`.
    pub fn along(&self, axis: Axis) -> (f64, f64) {
        (self.lower.get(axis), self.upper.get(axis))
    }

    /// Half-open containment along a single axis.
    pub fn contains_along(&self, axis: Axis, value: f64) -> bool {
        let (lo, hi) = self.along(axis);
        value >= lo && value < hi
    }

    /// Half-open containment on every axis.
    pub fn contains(&self, pos: &Position) -> bool {
        Axis::ALL
            .iter()
            .all(|&axis| self.contains_along(axis, pos.get(axis)))
    }

    /// The direction in which `value` has left the box along `axis`,
    /// or `None` if it is still inside along that axis.
    pub fn exit_direction(&self, axis: Axis, value: f64) -> Option<Direction> {
        let (lo, hi) = self.along(axis);
        if value < lo {
            Some(axis.lower())
        } else if value >= hi {
            Some(axis.upper())
        } else {
            None
        }
    }

    /// Coordinate of the face reached by travelling in `dir`.
    pub fn face(&self, dir: Direction) -> f64 {
        let (lo, hi) = self.along(dir.axis());
        if dir.is_upper() {
            hi
        } else {
            lo
        }
    }

    /// Width along `axis` (infinite for unmodelled axes).
    pub fn extent(&self, axis: Axis) -> f64 {
        let (lo, hi) = self.along(axis);
        hi - lo
    }

    /// Centre of the box along `axis`.
    ///
    /// Unbounded axes report `0.0`.
    pub fn midpoint(&self, axis: Axis) -> f64 {
        let (lo, hi) = self.along(axis);
        if lo.is_finite() && hi.is_finite() {
            0.5 * (lo + hi)
        } else {
            0.0
        }
    }
}
