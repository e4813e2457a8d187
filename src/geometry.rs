use serde::{Deserialize, Serialize};

/// Fallback direction for coincident points.
pub const DEFAULT_DIRECTION: Vector = Vector { x: 1.0, y: 0.0 };

const EPSILON: f32 = 1e-6;

/// A location in model (diagram) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, v: Vector, amount: f32) -> Self {
        Self {
            x: self.x + v.x * amount,
            y: self.y + v.y * amount,
        }
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Component-wise difference `self - other`.
    pub fn sub(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn add(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point {
    fn from(value: (f32, f32)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// A direction in model space. Values returned by [`direction`] and
/// [`perpendicular`] are unit length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

impl Vector {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }
}

impl Default for Vector {
    fn default() -> Self {
        DEFAULT_DIRECTION
    }
}

/// Face of a node an edge leaves or enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Top/Bottom anchors spread along X, Left/Right along Y.
    pub fn spreads_horizontally(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub point: Point,
    pub side: Side,
}

impl Anchor {
    pub const fn new(point: Point, side: Side) -> Self {
        Self { point, side }
    }
}

pub fn distance(a: Point, b: Point) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}

pub fn direction(a: Point, b: Point) -> Vector {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);
    if !len.is_finite() || len < EPSILON {
        return DEFAULT_DIRECTION;
    }
    Vector::new(dx / len, dy / len)
}

/// Rotates `v` by 90 degrees and renormalizes it.
pub fn perpendicular(v: Vector) -> Vector {
    let len = v.length();
    if !len.is_finite() || len < EPSILON {
        return Vector::new(-DEFAULT_DIRECTION.y, DEFAULT_DIRECTION.x);
    }
    Vector::new(-v.y / len, v.x / len)
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

pub fn quad_point(start: Point, ctrl: Point, end: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt;
    let b = 2.0 * mt * t;
    let c = t * t;
    Point::new(
        a * start.x + b * ctrl.x + c * end.x,
        a * start.y + b * ctrl.y + c * end.y,
    )
}
