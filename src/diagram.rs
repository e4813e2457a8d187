use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::RoutingConfig;
use crate::drag::{DragController, DragEvent};
use crate::error::{Result, RouteError};
use crate::geometry::{Point, Side};
use crate::highlight::{
    GroupSelection, HighlightState, SelectionSnapshot, SelectionSource, highlight_state,
};
use crate::ir::{Edge, NodeBox, NodeId, RoutingStyle};
use crate::routing::labels::{MultiplicityAnchors, multiplicity_anchors};
use crate::routing::merge::merge_diagnostics;
use crate::routing::{
    AnchorResolver, EdgePath, LivePoint, MergeGroups, RouteContext, assign_parallel_slots,
    compute_path, parallel, resolve_edge_anchors, snap_to_anchors,
};
use crate::viewport::Viewport;

/// Serialized form of a diagram plus the view state a host would pass in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDocument {
    #[serde(default)]
    pub nodes: Vec<NodeBox>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub selection: SelectionSnapshot,
    #[serde(default)]
    pub hovered_group: Option<String>,
    #[serde(default)]
    pub viewport: Viewport,
}

/// Parses a document as JSON, falling back to JSON5.
pub fn parse_document(input: &str) -> anyhow::Result<DiagramDocument> {
    match serde_json::from_str(input) {
        Ok(doc) => Ok(doc),
        Err(json_err) => json5::from_str(input)
            .map_err(|json5_err| anyhow::anyhow!("invalid diagram document: {json_err} ({json5_err})")),
    }
}

/// One edge's output for a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedEdge {
    pub path: EdgePath,
    pub highlight: HighlightState,
    pub multiplicity: MultiplicityAnchors,
}

#[derive(Debug, Clone, Default)]
pub struct Diagram {
    nodes: BTreeMap<NodeId, NodeBox>,
    edges: Vec<Edge>,
    merge_groups: MergeGroups,
}

impl AnchorResolver for Diagram {
    fn resolve_anchor(&self, node_id: &str, side: Side) -> Option<Point> {
        self.nodes.get(node_id).map(|node| node.side_anchor(side))
    }
}

impl Diagram {
    pub fn new(nodes: Vec<NodeBox>, edges: Vec<Edge>) -> Self {
        let nodes = nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
        let merge_groups = MergeGroups::resolve(&edges);
        Self {
            nodes,
            edges,
            merge_groups,
        }
    }

    pub fn from_document(doc: &DiagramDocument) -> Self {
        Self::new(doc.nodes.clone(), doc.edges.clone())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeBox> {
        self.nodes.values()
    }

    pub fn node(&self, id: &str) -> Option<&NodeBox> {
        self.nodes.get(id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn merge_groups(&self) -> &MergeGroups {
        &self.merge_groups
    }

    fn reindex(&mut self) {
        self.merge_groups = MergeGroups::resolve(&self.edges);
    }

    pub fn upsert_node(&mut self, node: NodeBox) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn move_node(&mut self, id: &str, x: f32, y: f32) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.x = x;
                node.y = y;
                true
            }
            None => false,
        }
    }

    pub fn upsert_edge(&mut self, edge: Edge) {
        match self.edges.iter_mut().find(|e| e.id == edge.id) {
            Some(existing) => *existing = edge,
            None => self.edges.push(edge),
        }
        self.reindex();
    }

    /// Removes an edge; a drag on it is discarded without a commit.
    pub fn remove_edge(&mut self, id: &str, drag: &mut DragController) -> Result<Edge> {
        let idx = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| RouteError::UnknownEdge {
                edge_id: id.to_string(),
            })?;
        drag.discard_edges([id]);
        let edge = self.edges.remove(idx);
        self.reindex();
        Ok(edge)
    }

    /// Removes a node together with every edge attached to it.
    pub fn remove_node(&mut self, id: &str, drag: &mut DragController) -> Vec<Edge> {
        self.nodes.remove(id);
        let (removed, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges).into_iter().partition(|e| e.touches(id));
        drag.discard_edges(removed.iter().map(|e| e.id.as_str()));
        self.edges = kept;
        self.reindex();
        removed
    }

    /// Drops everything, including an in-progress drag.
    pub fn clear(&mut self, drag: &mut DragController) {
        drag.cancel();
        self.nodes.clear();
        self.edges.clear();
        self.reindex();
    }

    pub fn assign_parallel_slots(&mut self) {
        assign_parallel_slots(&mut self.edges);
    }

    /// Reports host data problems. Routing still proceeds best-effort.
    pub fn validate(&self) -> Vec<RouteError> {
        let mut errors = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for edge in &self.edges {
            if !seen.insert(edge.id.as_str()) {
                errors.push(RouteError::DuplicateEdge {
                    edge_id: edge.id.clone(),
                });
            }
            for node_id in [&edge.source, &edge.target] {
                if !self.nodes.contains_key(node_id) {
                    errors.push(RouteError::UnknownNode {
                        edge_id: edge.id.clone(),
                        node_id: node_id.clone(),
                    });
                }
            }
            if edge.parallel_count > 1 && edge.parallel_index >= edge.parallel_count {
                errors.push(RouteError::ParallelIndexOutOfRange {
                    edge_id: edge.id.clone(),
                    index: edge.parallel_index,
                    count: edge.parallel_count,
                });
            }
        }
        errors.extend(merge_diagnostics(&self.edges));
        errors
    }

    fn context<'a>(&'a self, config: &'a RoutingConfig, drag: &'a DragController) -> RouteContext<'a> {
        let live = drag.session().map(|s| LivePoint {
            edge_id: s.edge_id.as_str(),
            point: s.last_point,
        });
        RouteContext::new(config, &self.merge_groups).with_live(live)
    }

    pub fn route_edge(&self, id: &str, config: &RoutingConfig, drag: &DragController) -> Option<EdgePath> {
        let edge = self.edge(id)?;
        let anchors = resolve_edge_anchors(edge, self)?;
        Some(compute_path(edge, anchors, &self.context(config, drag)))
    }

    /// Routes every edge. Edges whose nodes cannot be resolved are skipped.
    pub fn route(&self, config: &RoutingConfig, drag: &DragController) -> Vec<EdgePath> {
        let ctx = self.context(config, drag);
        self.routed(ctx).map(|(_, path)| path).collect()
    }

    fn routed<'a>(&'a self, ctx: RouteContext<'a>) -> impl Iterator<Item = (&'a Edge, EdgePath)> + 'a {
        self.edges.iter().filter_map(move |edge| {
            let Some(anchors) = resolve_edge_anchors(edge, self) else {
                warn!(edge = %edge.id, source = %edge.source, target = %edge.target, "skipping edge with unresolved anchors");
                return None;
            };
            Some((edge, compute_path(edge, anchors, &ctx)))
        })
    }

    /// Paths, emphasis and label anchors for one frame.
    pub fn frame(
        &self,
        config: &RoutingConfig,
        drag: &DragController,
        selection: &impl SelectionSource,
        hovered_group: Option<&str>,
    ) -> Vec<RoutedEdge> {
        let ctx = self.context(config, drag);
        let group_selection = GroupSelection::collect(&self.edges, &self.merge_groups, selection);
        self.routed(ctx)
            .map(|(edge, path)| {
                let highlight = highlight_state(
                    edge,
                    &self.merge_groups,
                    &group_selection,
                    selection,
                    hovered_group,
                );
                let multiplicity = multiplicity_anchors(&path, config);
                RoutedEdge {
                    path,
                    highlight,
                    multiplicity,
                }
            })
            .collect()
    }

    /// Current handle position of an edge, used as the drag start point.
    pub fn handle_position(&self, id: &str, config: &RoutingConfig) -> Option<Point> {
        self.route_edge(id, config, &DragController::new())
            .and_then(|path| path.handle)
    }

    /// Applies a commit to the edge store. Orthogonal commits are stored
    /// snapped so the bend does not jump on release.
    pub fn apply(&mut self, event: &DragEvent, config: &RoutingConfig) -> Result<()> {
        let DragEvent::Committed { edge_id, point } = event else {
            return Ok(());
        };
        let anchors = {
            let this = &*self;
            this.edge(edge_id)
                .and_then(|edge| resolve_edge_anchors(edge, this))
        };
        let edge = self
            .edges
            .iter_mut()
            .find(|e| &e.id == edge_id)
            .ok_or_else(|| RouteError::UnknownEdge {
                edge_id: edge_id.clone(),
            })?;
        edge.custom_control_point = match (point, edge.routing_style, anchors) {
            (Some(p), RoutingStyle::Orthogonal, Some(anchors)) => {
                let (s, t) =
                    parallel::offset_anchors(anchors.source, anchors.target, edge, config.edge_spacing);
                Some(snap_to_anchors(*p, s.point, t.point, config.snap_threshold))
            }
            (point, _, _) => *point,
        };
        Ok(())
    }
}
