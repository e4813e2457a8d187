use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ir::{Edge, MergeGroupId};
use crate::routing::MergeGroups;

/// Read-only view of the host's selection.
pub trait SelectionSource {
    fn is_node_selected(&self, node_id: &str) -> bool;
    fn is_edge_selected(&self, edge_id: &str) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    #[serde(default)]
    pub nodes: HashSet<String>,
    #[serde(default)]
    pub edges: HashSet<String>,
}

impl SelectionSnapshot {
    pub fn with_nodes<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            edges: HashSet::new(),
        }
    }

    pub fn with_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: HashSet::new(),
            edges: edges.into_iter().map(Into::into).collect(),
        }
    }
}

impl SelectionSource for SelectionSnapshot {
    fn is_node_selected(&self, node_id: &str) -> bool {
        self.nodes.contains(node_id)
    }

    fn is_edge_selected(&self, edge_id: &str) -> bool {
        self.edges.contains(edge_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Emphasis {
    #[default]
    None,
    Hovered,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightState {
    pub edge: bool,
    pub merge_dot: bool,
    pub shared_trunk: bool,
    pub emphasis: Emphasis,
}

fn endpoint_selected(edge: &Edge, selection: &impl SelectionSource) -> bool {
    selection.is_node_selected(&edge.source) || selection.is_node_selected(&edge.target)
}

fn edge_selected(edge: &Edge, selection: &impl SelectionSource) -> bool {
    selection.is_edge_selected(&edge.id) || endpoint_selected(edge, selection)
}

/// Number of selected members per merge group, tallied once per frame.
///
/// A member counts as selected when the edge itself or either of its
/// endpoint nodes is selected.
#[derive(Debug, Clone, Default)]
pub struct GroupSelection {
    selected_members: HashMap<MergeGroupId, usize>,
}

impl GroupSelection {
    pub fn collect(edges: &[Edge], groups: &MergeGroups, selection: &impl SelectionSource) -> Self {
        let mut selected_members = HashMap::new();
        for edge in edges.iter().filter(|e| edge_selected(e, selection)) {
            if let Some(group) = groups.group_of(&edge.id) {
                *selected_members.entry(group.id.clone()).or_insert(0) += 1;
            }
        }
        Self { selected_members }
    }

    pub fn selected_members(&self, group_id: &str) -> usize {
        self.selected_members.get(group_id).copied().unwrap_or(0)
    }
}

/// Emphasis of one edge.
///
/// `group_selection` is collected once per frame from the same selection;
/// `hovered_group` is the group currently under the pointer, if any.
pub fn highlight_state(
    edge: &Edge,
    groups: &MergeGroups,
    group_selection: &GroupSelection,
    selection: &impl SelectionSource,
    hovered_group: Option<&str>,
) -> HighlightState {
    let group = groups.group_of(&edge.id);
    let group_hovered = match (group, hovered_group) {
        (Some(group), Some(hovered)) => group.id == hovered,
        _ => false,
    };
    let endpoints = endpoint_selected(edge, selection);
    let selected = selection.is_edge_selected(&edge.id) || endpoints;

    let edge_lit = selected || group_hovered;

    let member_selected = group
        .is_some_and(|group| group_selection.selected_members(&group.id) > usize::from(selected));

    let merge_dot = if group.is_some() {
        endpoints || member_selected || group_hovered
    } else {
        edge_lit
    };

    let emphasis = if selected || member_selected {
        Emphasis::Selected
    } else if group_hovered {
        Emphasis::Hovered
    } else {
        Emphasis::None
    };

    HighlightState {
        edge: edge_lit,
        merge_dot,
        shared_trunk: merge_dot,
        emphasis,
    }
}

/// Tracks which merge group is under the pointer.
///
/// Hovering any branch marks the whole group; a change is reported only when
/// the hovered group actually changes.
#[derive(Debug, Default, Clone)]
pub struct HoverTracker {
    hovered: Option<MergeGroupId>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered_group(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Pointer entered (`Some`) or left (`None`) an edge. Returns the new
    /// hovered group when it changed.
    pub fn hover_edge(&mut self, edge_id: Option<&str>, groups: &MergeGroups) -> Option<Option<MergeGroupId>> {
        let next = edge_id
            .and_then(|id| groups.group_of(id))
            .map(|group| group.id.clone());
        self.set(next)
    }

    pub fn set(&mut self, group: Option<MergeGroupId>) -> Option<Option<MergeGroupId>> {
        if self.hovered == group {
            return None;
        }
        self.hovered = group.clone();
        Some(group)
    }

    pub fn clear(&mut self) -> Option<Option<MergeGroupId>> {
        self.set(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Side};

    fn group_edges() -> Vec<Edge> {
        let merge = Point::new(200.0, 0.0);
        vec![
            Edge::new("a", "A", Side::Right, "T", Side::Left).with_merge(merge, "g", true),
            Edge::new("b", "B", Side::Right, "T", Side::Left).with_merge(merge, "g", false),
            Edge::new("c", "C", Side::Right, "T", Side::Left).with_merge(merge, "g", false),
            Edge::new("x", "C", Side::Bottom, "D", Side::Top),
        ]
    }

    fn state(edges: &[Edge], id: &str, sel: &SelectionSnapshot, hover: Option<&str>) -> HighlightState {
        let groups = MergeGroups::resolve(edges);
        let group_selection = GroupSelection::collect(edges, &groups, sel);
        let edge = edges.iter().find(|e| e.id == id).expect("edge");
        highlight_state(edge, &groups, &group_selection, sel, hover)
    }

    #[test]
    fn nothing_selected_nothing_lit() {
        let edges = group_edges();
        let s = state(&edges, "a", &SelectionSnapshot::default(), None);
        assert_eq!(s, HighlightState::default());
    }

    #[test]
    fn one_member_source_selected_lights_every_merge_dot() {
        let edges = group_edges();
        let sel = SelectionSnapshot::with_nodes(["A"]);
        for id in ["a", "b", "c"] {
            let s = state(&edges, id, &sel, None);
            assert!(s.merge_dot, "{id} merge dot");
            assert!(s.shared_trunk, "{id} trunk");
        }
        assert!(state(&edges, "a", &sel, None).edge);
        assert!(!state(&edges, "b", &sel, None).edge);
    }

    #[test]
    fn selecting_a_member_edge_lights_siblings_dots() {
        let edges = group_edges();
        let sel = SelectionSnapshot::with_edges(["b"]);
        let s = state(&edges, "c", &sel, None);
        assert!(s.merge_dot);
        assert!(!s.edge);
        assert_eq!(s.emphasis, Emphasis::Selected);
    }

    #[test]
    fn selected_member_alone_is_not_its_own_sibling() {
        let edges = group_edges();
        let groups = MergeGroups::resolve(&edges);
        let sel = SelectionSnapshot::with_edges(["b"]);
        let group_selection = GroupSelection::collect(&edges, &groups, &sel);
        assert_eq!(group_selection.selected_members("g"), 1);
        assert_eq!(group_selection.selected_members("missing"), 0);

        let b = state(&edges, "b", &sel, None);
        assert!(b.edge);
        // b is selected but its own endpoints are not, so only sibling
        // selection could light its dot.
        assert!(!b.merge_dot);
    }

    #[test]
    fn group_selection_tallies_every_group_in_one_pass() {
        let merge = Point::new(200.0, 0.0);
        let mut edges = group_edges();
        edges.push(Edge::new("d", "D", Side::Right, "U", Side::Left).with_merge(merge, "h", true));
        edges.push(Edge::new("e", "E", Side::Right, "U", Side::Left).with_merge(merge, "h", false));
        let groups = MergeGroups::resolve(&edges);
        let sel = SelectionSnapshot::with_nodes(["C", "E"]);
        let group_selection = GroupSelection::collect(&edges, &groups, &sel);
        assert_eq!(group_selection.selected_members("g"), 1);
        assert_eq!(group_selection.selected_members("h"), 1);
        assert!(state(&edges, "d", &sel, None).merge_dot);
        assert!(state(&edges, "a", &sel, None).merge_dot);
    }

    #[test]
    fn group_hover_lights_all_branches() {
        let edges = group_edges();
        for id in ["a", "b", "c"] {
            let s = state(&edges, id, &SelectionSnapshot::default(), Some("g"));
            assert!(s.edge && s.merge_dot && s.shared_trunk);
            assert_eq!(s.emphasis, Emphasis::Hovered);
        }
        let other = state(&edges, "x", &SelectionSnapshot::default(), Some("g"));
        assert!(!other.edge);
    }

    #[test]
    fn plain_edge_merge_dot_mirrors_edge() {
        let edges = group_edges();
        let sel = SelectionSnapshot::with_nodes(["D"]);
        let s = state(&edges, "x", &sel, None);
        assert!(s.edge);
        assert_eq!(s.merge_dot, s.edge);
        assert_eq!(s.emphasis, Emphasis::Selected);
    }

    #[test]
    fn hover_tracker_reports_only_changes() {
        let edges = group_edges();
        let groups = MergeGroups::resolve(&edges);
        let mut hover = HoverTracker::new();
        assert_eq!(hover.hover_edge(Some("b"), &groups), Some(Some("g".to_string())));
        assert_eq!(hover.hover_edge(Some("c"), &groups), None);
        assert_eq!(hover.hover_edge(Some("x"), &groups), Some(None));
        assert_eq!(hover.hover_edge(None, &groups), None);
    }
}
