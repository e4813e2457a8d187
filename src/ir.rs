use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Side};

pub type NodeId = String;
pub type EdgeId = String;
pub type MergeGroupId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingStyle {
    #[default]
    Curved,
    Orthogonal,
}

/// Membership of an edge in a merge group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeDescriptor {
    pub merge_point: Point,
    /// Absent only in malformed host data; such an edge is routed as a group of one.
    #[serde(default)]
    pub merge_group_id: Option<MergeGroupId>,
    #[serde(default)]
    pub is_trunk_owner: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub source_side: Side,
    pub target_side: Side,
    #[serde(default)]
    pub routing_style: RoutingStyle,
    #[serde(default)]
    pub parallel_index: usize,
    #[serde(default = "default_parallel_count")]
    pub parallel_count: usize,
    #[serde(default)]
    pub custom_control_point: Option<Point>,
    #[serde(default)]
    pub merge: Option<MergeDescriptor>,
    #[serde(default)]
    pub label: Option<String>,
    /// Multiplicity shown next to the source end.
    #[serde(default)]
    pub source_label: Option<String>,
    /// Multiplicity shown next to the target end.
    #[serde(default)]
    pub target_label: Option<String>,
}

fn default_parallel_count() -> usize {
    1
}

impl Edge {
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        source_side: Side,
        target: impl Into<NodeId>,
        target_side: Side,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_side,
            target_side,
            routing_style: RoutingStyle::Curved,
            parallel_index: 0,
            parallel_count: 1,
            custom_control_point: None,
            merge: None,
            label: None,
            source_label: None,
            target_label: None,
        }
    }

    pub fn with_style(mut self, style: RoutingStyle) -> Self {
        self.routing_style = style;
        self
    }

    pub fn with_parallel(mut self, index: usize, count: usize) -> Self {
        self.parallel_index = index;
        self.parallel_count = count;
        self
    }

    pub fn with_merge(mut self, merge_point: Point, group: impl Into<MergeGroupId>, owner: bool) -> Self {
        self.merge = Some(MergeDescriptor {
            merge_point,
            merge_group_id: Some(group.into()),
            is_trunk_owner: owner,
        });
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn merge_group_id(&self) -> Option<&str> {
        self.merge.as_ref().and_then(|m| m.merge_group_id.as_deref())
    }

    pub fn touches(&self, node: &str) -> bool {
        self.source == node || self.target == node
    }
}

/// Axis-aligned node geometry as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeBox {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub label: Option<String>,
}

impl NodeBox {
    pub fn new(id: impl Into<NodeId>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
            label: None,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Midpoint of the requested face of the bounding box.
    pub fn side_anchor(&self, side: Side) -> Point {
        let c = self.center();
        match side {
            Side::Left => Point::new(self.x, c.y),
            Side::Right => Point::new(self.x + self.width, c.y),
            Side::Top => Point::new(c.x, self.y),
            Side::Bottom => Point::new(c.x, self.y + self.height),
        }
    }
}
