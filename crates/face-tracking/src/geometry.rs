//! 2D points and face bounds in detector coordinates

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Point (or vector) in detector image coordinates, y pointing down
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const ZERO: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length when treated as a vector
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Distance to another point
    pub fn distance(self, other: Point2) -> f32 {
        (self - other).length()
    }

    pub fn dot(self, other: Point2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Midpoint between two points
    pub fn midpoint(self, other: Point2) -> Point2 {
        Point2::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Componentwise scale
    pub fn scale(self, sx: f32, sy: f32) -> Point2 {
        Point2::new(self.x * sx, self.y * sy)
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point2 {
    fn add_assign(&mut self, rhs: Point2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point2 {
    fn sub_assign(&mut self, rhs: Point2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Point2 {
    type Output = Point2;

    fn mul(self, rhs: f32) -> Point2 {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point2 {
    type Output = Point2;

    fn neg(self) -> Point2 {
        Point2::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Point2 {
    fn from((x, y): (f32, f32)) -> Self {
        Point2::new(x, y)
    }
}

/// Face anchor (top-left of the face box) and its size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceBounds {
    pub anchor: Point2,
    pub width: f32,
    pub height: f32,
}

impl FaceBounds {
    pub fn new(anchor: Point2, width: f32, height: f32) -> Self {
        Self {
            anchor,
            width,
            height,
        }
    }

    /// A box that proportions can be computed against
    pub fn is_degenerate(&self) -> bool {
        !(self.anchor.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0)
    }

    /// Express an absolute position as a fraction of the face box.
    ///
    /// Returns `None` for a degenerate box.
    pub fn to_proportion(&self, position: Point2) -> Option<Point2> {
        if self.is_degenerate() {
            return None;
        }
        let rel = position - self.anchor;
        Some(Point2::new(rel.x / self.width, rel.y / self.height))
    }

    /// Inverse of [`FaceBounds::to_proportion`]
    pub fn from_proportion(&self, proportion: Point2) -> Point2 {
        self.anchor + proportion.scale(self.width, self.height)
    }
}
