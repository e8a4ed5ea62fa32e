//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};
use uuid::Uuid;

/// Identifier shared by every descendant of a first-generation agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineageId(pub Uuid);

impl LineageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LineageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Step by `(dx, dy)` on a `width x height` torus.
    ///
    /// The sum is taken in `i64`, so offsets from coordinates near the `i32`
    /// limits land on the same cell as from any other representative.
    pub fn offset_wrapped(&self, dx: i32, dy: i32, width: i32, height: i32) -> Self {
        let x = (i64::from(self.x) + i64::from(dx)).rem_euclid(i64::from(width));
        let y = (i64::from(self.y) + i64::from(dy)).rem_euclid(i64::from(height));
        Self {
            x: x as i32,
            y: y as i32,
        }
    }

    /// Apply toroidal wrapping for given world dimensions.
    ///
    /// Euclidean modulo, so the result is in `[0, width) x [0, height)` for
    /// every input including `i32::MIN`.
    pub fn wrap(&self, width: i32, height: i32) -> Self {
        Self {
            x: self.x.rem_euclid(width),
            y: self.y.rem_euclid(height),
        }
    }
}

/// One step of the Moore neighborhood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// All eight directions, clockwise from north
    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::NorthEast,
            Direction::East,
            Direction::SouthEast,
            Direction::South,
            Direction::SouthWest,
            Direction::West,
            Direction::NorthWest,
        ]
    }
}

/// Wrap a real coordinate into `[0, extent)`.
fn wrap_scalar(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid of a tiny negative can round up to `extent`
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// A point or displacement in the continuous unit-square world
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians
    pub fn from_angle(angle: f64) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn rotate(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Same direction, given length. The zero vector has no direction and stays zero.
    pub fn with_length(&self, length: f64) -> Self {
        let current = self.length();
        if current == 0.0 {
            *self
        } else {
            *self * (length / current)
        }
    }

    /// Wrap a point into the unit torus `[0, 1) x [0, 1)`.
    pub fn wrap_unit(&self) -> Self {
        Self {
            x: wrap_scalar(self.x, 1.0),
            y: wrap_scalar(self.y, 1.0),
        }
    }

    /// Shortest equivalent displacement on the unit torus, each component in `[-0.5, 0.5)`.
    pub fn relative_wrap(&self) -> Self {
        Self {
            x: wrap_scalar(self.x + 0.5, 1.0) - 0.5,
            y: wrap_scalar(self.y + 0.5, 1.0) - 0.5,
        }
    }

    pub fn toroidal_distance(&self, other: &Vec2) -> f64 {
        (*other - *self).relative_wrap().length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_position_wrap() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.wrap(10, 10), Position::new(5, 5));

        let pos = Position::new(-1, -1);
        assert_eq!(pos.wrap(10, 10), Position::new(9, 9));

        let pos = Position::new(10, 10);
        assert_eq!(pos.wrap(10, 10), Position::new(0, 0));

        let pos = Position::new(-1_000_003, 2_000_000_007);
        assert_eq!(pos.wrap(10, 7), Position::new(7, 2_000_000_007 % 7));
    }

    #[test]
    fn test_offset_wrapped_at_limits() {
        // 2^31 - 1 = 1 (mod 3), so one step east lands on column 2
        assert_eq!(
            Position::new(i32::MAX, 0).offset_wrapped(1, 0, 3, 1),
            Position::new(2, 0)
        );
        // -2^31 = 1 (mod 3), so one step west lands on column 0
        assert_eq!(
            Position::new(i32::MIN, 0).offset_wrapped(-1, 0, 3, 1),
            Position::new(0, 0)
        );
        assert_eq!(
            Position::new(0, 0).offset_wrapped(-1, -1, 10, 7),
            Position::new(9, 6)
        );
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::North.to_delta(), (0, -1));
        assert_eq!(Direction::South.to_delta(), (0, 1));
        assert_eq!(Direction::East.to_delta(), (1, 0));
        assert_eq!(Direction::West.to_delta(), (-1, 0));

        let deltas: Vec<_> = Direction::all().iter().map(|d| d.to_delta()).collect();
        assert_eq!(deltas.len(), 8);
        assert!(!deltas.contains(&(0, 0)));
    }

    #[test]
    fn test_vec_rotation() {
        let v = Vec2::new(1.0, 0.0).rotate(FRAC_PI_2);
        assert!(close(v.x, 0.0));
        assert!(close(v.y, 1.0));

        let heading = Vec2::from_angle(PI / 3.0);
        let local = heading.rotate(-heading.angle());
        assert!(close(local.x, 1.0));
        assert!(close(local.y, 0.0));
    }

    #[test]
    fn test_with_length() {
        let v = Vec2::new(3.0, 4.0).with_length(0.5);
        assert!(close(v.length(), 0.5));
        assert!(close(v.x, 0.3));

        assert_eq!(Vec2::ZERO.with_length(1.0), Vec2::ZERO);
    }

    #[test]
    fn test_relative_wrap_picks_short_way() {
        let d = Vec2::new(0.9, -0.8).relative_wrap();
        assert!(close(d.x, -0.1));
        assert!(close(d.y, 0.2));

        let a = Vec2::new(0.02, 0.5);
        let b = Vec2::new(0.98, 0.5);
        assert!(close(a.toroidal_distance(&b), 0.04));
    }

    #[test]
    fn test_wrap_unit_tiny_negative() {
        let v = Vec2::new(-1e-20, 1.0).wrap_unit();
        assert!(v.x >= 0.0 && v.x < 1.0);
        assert_eq!(v.y, 0.0);
    }

    proptest! {
        #[test]
        fn prop_position_wrap_in_range(
            x in any::<i32>(),
            y in any::<i32>(),
            w in 1i32..1000,
            h in 1i32..1000,
        ) {
            let p = Position::new(x, y).wrap(w, h);
            prop_assert!(p.x >= 0 && p.x < w);
            prop_assert!(p.y >= 0 && p.y < h);
        }

        #[test]
        fn prop_wrap_unit_in_range(x in -1e6f64..1e6, y in -1e6f64..1e6) {
            let v = Vec2::new(x, y).wrap_unit();
            prop_assert!(v.x >= 0.0 && v.x < 1.0);
            prop_assert!(v.y >= 0.0 && v.y < 1.0);
        }

        #[test]
        fn prop_relative_wrap_in_half_range(x in -1e3f64..1e3, y in -1e3f64..1e3) {
            let v = Vec2::new(x, y).relative_wrap();
            prop_assert!(v.x >= -0.5 && v.x < 0.5);
            prop_assert!(v.y >= -0.5 && v.y < 0.5);
        }
    }
}
