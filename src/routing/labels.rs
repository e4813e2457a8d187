use serde::Serialize;

use crate::config::RoutingConfig;
use crate::geometry::{Point, Vector, perpendicular};

use super::EdgePath;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MultiplicityAnchors {
    pub source: Option<Point>,
    pub target: Option<Point>,
}

/// Positions for the multiplicity labels at both ends of a routed edge.
///
/// Each label sits `inset` along the line from its endpoint and `offset` to
/// the left of the line, so it never covers the stroke. Merged branches only
/// get a target label on the trunk owner, at the end of the trunk.
pub fn multiplicity_anchors(path: &EdgePath, config: &RoutingConfig) -> MultiplicityAnchors {
    let inset = config.multiplicity_label_inset;
    let offset = config.multiplicity_label_offset;

    let source = Some(beside(path.start, path.approach.start, inset, offset));
    let target = match (&path.trunk, path.merge_point) {
        (Some(trunk), _) => Some(beside(trunk.end, trunk.approach, -inset, offset)),
        (None, Some(_)) => None,
        (None, None) => Some(beside(path.end(), path.approach.end, -inset, offset)),
    };

    MultiplicityAnchors { source, target }
}

fn beside(endpoint: Point, along: Vector, inset: f32, offset: f32) -> Point {
    endpoint
        .offset(along, inset)
        .offset(perpendicular(along), offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Anchor, Side};
    use crate::ir::Edge;
    use crate::routing::{EdgeAnchors, MergeGroups, RouteContext, compute_path};

    fn routed(edge: &Edge) -> EdgePath {
        let cfg = RoutingConfig::default();
        let groups = MergeGroups::resolve(std::slice::from_ref(edge));
        let anchors = EdgeAnchors {
            source: Anchor::new(Point::new(0.0, 0.0), Side::Right),
            target: Anchor::new(Point::new(300.0, 0.0), Side::Left),
        };
        compute_path(edge, anchors, &RouteContext::new(&cfg, &groups))
    }

    #[test]
    fn labels_sit_off_the_line() {
        let edge = Edge::new("e", "A", Side::Right, "B", Side::Left);
        let labels = multiplicity_anchors(&routed(&edge), &RoutingConfig::default());
        assert_eq!(labels.source, Some(Point::new(18.0, 14.0)));
        assert_eq!(labels.target, Some(Point::new(282.0, 14.0)));
    }

    #[test]
    fn merged_branch_without_trunk_has_no_target_label() {
        let edge = Edge::new("e", "A", Side::Right, "B", Side::Left).with_merge(
            Point::new(200.0, 0.0),
            "g",
            false,
        );
        let other = Edge::new("o", "C", Side::Right, "B", Side::Left).with_merge(
            Point::new(200.0, 0.0),
            "g",
            true,
        );
        let cfg = RoutingConfig::default();
        let edges = vec![edge.clone(), other];
        let groups = MergeGroups::resolve(&edges);
        let anchors = EdgeAnchors {
            source: Anchor::new(Point::new(0.0, 0.0), Side::Right),
            target: Anchor::new(Point::new(300.0, 0.0), Side::Left),
        };
        let path = compute_path(&edge, anchors, &RouteContext::new(&cfg, &groups));
        let labels = multiplicity_anchors(&path, &cfg);
        assert!(labels.source.is_some());
        assert_eq!(labels.target, None);
    }

    #[test]
    fn trunk_owner_labels_the_trunk_end() {
        let edge = Edge::new("e", "A", Side::Right, "B", Side::Left).with_merge(
            Point::new(200.0, 0.0),
            "g",
            true,
        );
        let labels = multiplicity_anchors(&routed(&edge), &RoutingConfig::default());
        assert_eq!(labels.target, Some(Point::new(282.0, 14.0)));
    }
}
