pub mod labels;
pub mod merge;
pub mod orthogonal;
pub mod parallel;

use serde::Serialize;
use tracing::debug;

use crate::config::RoutingConfig;
use crate::geometry::{
    Anchor, Point, Side, Vector, direction, distance, midpoint, perpendicular, quad_point,
};
use crate::ir::{Edge, EdgeId, MergeGroupId, RoutingStyle};

pub use merge::{MergeGroup, MergeGroups};
pub use orthogonal::{Axis, BendSource, OrthogonalRoute, orthogonal_route, snap_to_anchors};
pub use parallel::{assign_parallel_slots, parallel_offset};

const DEGENERATE_SEGMENT: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PathStrategy {
    Merged,
    CustomCurve,
    Straight,
    SmoothCurve,
    Orthogonal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PathSegment {
    Line { to: Point },
    Quad { ctrl: Point, to: Point },
}

impl PathSegment {
    pub fn end(&self) -> Point {
        match self {
            PathSegment::Line { to } | PathSegment::Quad { to, .. } => *to,
        }
    }
}

/// Direction of the first and last segment of a path, pointing from the
/// source towards the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApproachVectors {
    pub start: Vector,
    pub end: Vector,
}

/// The shared segment from a merge point to the common target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrunkPath {
    pub group_id: MergeGroupId,
    pub start: Point,
    pub end: Point,
    pub approach: Vector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgePath {
    pub edge_id: EdgeId,
    pub strategy: PathStrategy,
    pub start: Point,
    pub segments: Vec<PathSegment>,
    pub label_anchor: Point,
    pub approach: ApproachVectors,
    /// Position of the draggable control handle; merged branches have none.
    pub handle: Option<Point>,
    pub merge_point: Option<Point>,
    /// Present only on the trunk owner of a merge group.
    pub trunk: Option<TrunkPath>,
}

impl EdgePath {
    pub fn end(&self) -> Point {
        self.segments.last().map(PathSegment::end).unwrap_or(self.start)
    }

    /// Flattens the path into the start point followed by every segment's
    /// control and end points.
    pub fn points(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.segments.len() * 2 + 1);
        points.push(self.start);
        for segment in &self.segments {
            match segment {
                PathSegment::Line { to } => points.push(*to),
                PathSegment::Quad { ctrl, to } => {
                    points.push(*ctrl);
                    points.push(*to);
                }
            }
        }
        points
    }

    pub fn to_svg_path(&self) -> String {
        let mut d = format!("M {:.2} {:.2}", self.start.x, self.start.y);
        for segment in &self.segments {
            match segment {
                PathSegment::Line { to } => d.push_str(&format!(" L {:.2} {:.2}", to.x, to.y)),
                PathSegment::Quad { ctrl, to } => d.push_str(&format!(
                    " Q {:.2} {:.2} {:.2} {:.2}",
                    ctrl.x, ctrl.y, to.x, to.y
                )),
            }
        }
        d
    }
}

impl TrunkPath {
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {:.2} {:.2} L {:.2} {:.2}",
            self.start.x, self.start.y, self.end.x, self.end.y
        )
    }
}

/// Anchors of an edge before the parallel lane offset is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeAnchors {
    pub source: Anchor,
    pub target: Anchor,
}

/// Node geometry lookup supplied by the host.
pub trait AnchorResolver {
    fn resolve_anchor(&self, node_id: &str, side: Side) -> Option<Point>;
}

/// Resolves both anchors of `edge`; `None` when either node is unknown.
pub fn resolve_edge_anchors(edge: &Edge, resolver: &impl AnchorResolver) -> Option<EdgeAnchors> {
    let source = resolver.resolve_anchor(&edge.source, edge.source_side)?;
    let target = resolver.resolve_anchor(&edge.target, edge.target_side)?;
    Some(EdgeAnchors {
        source: Anchor::new(source, edge.source_side),
        target: Anchor::new(target, edge.target_side),
    })
}

/// Live control point of the one edge being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LivePoint<'a> {
    pub edge_id: &'a str,
    pub point: Point,
}

/// Everything besides the edge itself that path selection depends on.
#[derive(Debug, Clone, Copy)]
pub struct RouteContext<'a> {
    pub config: &'a RoutingConfig,
    pub merge_groups: &'a MergeGroups,
    pub live: Option<LivePoint<'a>>,
}

impl<'a> RouteContext<'a> {
    pub fn new(config: &'a RoutingConfig, merge_groups: &'a MergeGroups) -> Self {
        Self {
            config,
            merge_groups,
            live: None,
        }
    }

    pub fn with_live(mut self, live: Option<LivePoint<'a>>) -> Self {
        self.live = live;
        self
    }

    fn live_point_for(&self, edge_id: &str) -> Option<Point> {
        self.live
            .filter(|live| live.edge_id == edge_id)
            .map(|live| live.point)
    }
}

pub fn compute_path(edge: &Edge, anchors: EdgeAnchors, ctx: &RouteContext<'_>) -> EdgePath {
    let cfg = ctx.config;
    let (source, target) =
        parallel::offset_anchors(anchors.source, anchors.target, edge, cfg.edge_spacing);
    let s = source.point;
    let t = target.point;

    if let Some(merge) = edge.merge.as_ref() {
        return merged_path(edge, s, t, merge.merge_point, ctx.merge_groups);
    }

    let live = ctx.live_point_for(&edge.id);

    if edge.routing_style == RoutingStyle::Orthogonal {
        let bend = match (live, edge.custom_control_point) {
            (Some(p), _) => BendSource::Live(snap_to_anchors(p, s, t, cfg.snap_threshold)),
            (None, Some(p)) => BendSource::Committed(p),
            (None, None) => BendSource::Ratio(cfg.orthogonal_bend_ratio),
        };
        return orthogonal_path(edge, s, t, bend);
    }

    if let Some(through) = live.or(edge.custom_control_point) {
        return curve_through(edge, s, t, through, PathStrategy::CustomCurve);
    }

    let dx = (t.x - s.x).abs();
    let dy = (t.y - s.y).abs();
    let dist = distance(s, t);
    let lone = edge.parallel_count <= 1;
    let aligned_lane = !lone && (dx < cfg.parallel_align_epsilon || dy < cfg.parallel_align_epsilon);

    if (lone || aligned_lane)
        && (dy < cfg.straight_axis_threshold
            || dx < cfg.straight_axis_threshold
            || dist < cfg.straight_distance_threshold)
    {
        return straight_path(edge, s, t);
    }

    if lone && dist > cfg.smooth_curve_min_distance {
        let bulge = (dist * cfg.curve_bulge_ratio).min(cfg.curve_bulge_max);
        let ctrl = midpoint(s, t).offset(perpendicular(direction(s, t)), bulge);
        return quad_path(edge, s, t, ctrl, PathStrategy::SmoothCurve);
    }

    orthogonal_path(edge, s, t, BendSource::Ratio(cfg.fallback_bend_ratio))
}

fn merged_path(edge: &Edge, s: Point, t: Point, merge_point: Point, groups: &MergeGroups) -> EdgePath {
    let branch = direction(s, merge_point);
    let trunk = if groups.owns_trunk(&edge.id) {
        groups.group_of(&edge.id).map(|group| TrunkPath {
            group_id: group.id.clone(),
            start: merge_point,
            end: t,
            approach: direction(merge_point, t),
        })
    } else {
        None
    };
    debug!(edge = %edge.id, trunk = trunk.is_some(), "routed merged branch");
    EdgePath {
        edge_id: edge.id.clone(),
        strategy: PathStrategy::Merged,
        start: s,
        segments: vec![PathSegment::Line { to: merge_point }],
        label_anchor: midpoint(s, merge_point),
        approach: ApproachVectors {
            start: branch,
            end: branch,
        },
        handle: None,
        merge_point: Some(merge_point),
        trunk,
    }
}

fn straight_path(edge: &Edge, s: Point, t: Point) -> EdgePath {
    let dir = direction(s, t);
    let mid = midpoint(s, t);
    EdgePath {
        edge_id: edge.id.clone(),
        strategy: PathStrategy::Straight,
        start: s,
        segments: vec![PathSegment::Line { to: t }],
        label_anchor: mid,
        approach: ApproachVectors {
            start: dir,
            end: dir,
        },
        handle: Some(mid),
        merge_point: None,
        trunk: None,
    }
}

/// Quadratic curve that passes through `through` at its parameter midpoint.
fn curve_through(edge: &Edge, s: Point, t: Point, through: Point, strategy: PathStrategy) -> EdgePath {
    let mid = midpoint(s, t);
    let ctrl = Point::new(2.0 * through.x - mid.x, 2.0 * through.y - mid.y);
    quad_path(edge, s, t, ctrl, strategy)
}

fn quad_path(edge: &Edge, s: Point, t: Point, ctrl: Point, strategy: PathStrategy) -> EdgePath {
    let on_curve = quad_point(s, ctrl, t, 0.5);
    EdgePath {
        edge_id: edge.id.clone(),
        strategy,
        start: s,
        segments: vec![PathSegment::Quad { ctrl, to: t }],
        label_anchor: on_curve,
        approach: approach_of(&[s, ctrl, t]),
        handle: Some(on_curve),
        merge_point: None,
        trunk: None,
    }
}

fn orthogonal_path(edge: &Edge, s: Point, t: Point, bend: BendSource) -> EdgePath {
    let route = orthogonal_route(s, t, bend);
    let points = route.points(s, t);
    EdgePath {
        edge_id: edge.id.clone(),
        strategy: PathStrategy::Orthogonal,
        start: s,
        segments: points[1..]
            .iter()
            .map(|p| PathSegment::Line { to: *p })
            .collect(),
        label_anchor: midpoint(route.corners[0], route.corners[1]),
        approach: approach_of(&points),
        handle: Some(route.bend),
        merge_point: None,
        trunk: None,
    }
}

/// First and last non-degenerate segment directions of a polyline (or of a
/// Bézier control polygon).
fn approach_of(points: &[Point]) -> ApproachVectors {
    let fallback = points
        .first()
        .zip(points.last())
        .map(|(a, b)| direction(*a, *b))
        .unwrap_or_default();
    let start = points
        .windows(2)
        .find(|w| distance(w[0], w[1]) > DEGENERATE_SEGMENT)
        .map(|w| direction(w[0], w[1]))
        .unwrap_or(fallback);
    let end = points
        .windows(2)
        .rev()
        .find(|w| distance(w[0], w[1]) > DEGENERATE_SEGMENT)
        .map(|w| direction(w[0], w[1]))
        .unwrap_or(fallback);
    ApproachVectors { start, end }
}
