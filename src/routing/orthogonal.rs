use crate::geometry::{Point, midpoint};

/// Axis of the first leg of a Manhattan route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Where the bend coordinate of an orthogonal route comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BendSource {
    /// Fraction of the preferred axis measured from the source.
    Ratio(f32),
    /// A committed control point; only its offset-axis coordinate is used.
    Committed(Point),
    /// The live point of an active drag, already snapped.
    Live(Point),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthogonalRoute {
    pub axis: Axis,
    pub corners: [Point; 2],
    pub bend: Point,
}

impl OrthogonalRoute {
    pub fn points(&self, source: Point, target: Point) -> [Point; 4] {
        [source, self.corners[0], self.corners[1], target]
    }
}

pub fn preferred_axis(source: Point, target: Point) -> Axis {
    let dx = (target.x - source.x).abs();
    let dy = (target.y - source.y).abs();
    if dx >= dy {
        Axis::Horizontal
    } else {
        Axis::Vertical
    }
}

/// Three-segment route `source → corner → corner → target`.
///
/// Unless a drag is live, the bend point is the midpoint of the two interior
/// corners, recomputed from the current anchors.
pub fn orthogonal_route(source: Point, target: Point, bend: BendSource) -> OrthogonalRoute {
    let axis = preferred_axis(source, target);
    let reference = match bend {
        BendSource::Ratio(ratio) => Point::new(
            source.x + (target.x - source.x) * ratio,
            source.y + (target.y - source.y) * ratio,
        ),
        BendSource::Committed(p) | BendSource::Live(p) => p,
    };
    let corners = match axis {
        Axis::Horizontal => [
            Point::new(reference.x, source.y),
            Point::new(reference.x, target.y),
        ],
        Axis::Vertical => [
            Point::new(source.x, reference.y),
            Point::new(target.x, reference.y),
        ],
    };
    let bend = match bend {
        BendSource::Live(p) => p,
        _ => midpoint(corners[0], corners[1]),
    };
    OrthogonalRoute {
        axis,
        corners,
        bend,
    }
}

/// Magnetic snap of a live bend point onto the anchors' coordinates.
///
/// Only the offset-axis coordinate snaps (X for a horizontal first leg, Y for
/// a vertical one); the other coordinate is returned untouched. The source
/// anchor wins when both anchors are in range.
pub fn snap_to_anchors(point: Point, source: Point, target: Point, threshold: f32) -> Point {
    match preferred_axis(source, target) {
        Axis::Horizontal => Point::new(
            snap_coordinate(point.x, source.x, target.x, threshold),
            point.y,
        ),
        Axis::Vertical => Point::new(
            point.x,
            snap_coordinate(point.y, source.y, target.y, threshold),
        ),
    }
}

fn snap_coordinate(value: f32, source: f32, target: f32, threshold: f32) -> f32 {
    if (value - source).abs() < threshold {
        source
    } else if (value - target).abs() < threshold {
        target
    } else {
        value
    }
}
