use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::error::RouteError;
use crate::geometry::{Point, distance};
use crate::ir::{Edge, EdgeId, MergeGroupId};

/// Merge points closer than this count as the same point.
const MERGE_POINT_TOLERANCE: f32 = 0.5;

/// A resolved merge group with exactly one effective trunk owner.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeGroup {
    pub id: MergeGroupId,
    pub merge_point: Point,
    /// Members in host order.
    pub members: Vec<EdgeId>,
    pub trunk_owner: EdgeId,
}

impl MergeGroup {
    pub fn contains(&self, edge_id: &str) -> bool {
        self.members.iter().any(|m| m == edge_id)
    }
}

/// Index of every merge group in a diagram.
///
/// Built once per edge-set change. Host data that breaks the one-owner rule
/// is repaired deterministically: the first claimant in host order keeps the
/// trunk, and a group with no claimant gives it to its first member.
#[derive(Debug, Clone, Default)]
pub struct MergeGroups {
    groups: BTreeMap<MergeGroupId, MergeGroup>,
    by_edge: HashMap<EdgeId, MergeGroupId>,
}

impl MergeGroups {
    pub fn resolve(edges: &[Edge]) -> Self {
        let mut claims: BTreeMap<MergeGroupId, Vec<&Edge>> = BTreeMap::new();
        for edge in edges {
            let Some(merge) = edge.merge.as_ref() else {
                continue;
            };
            let key = match merge.merge_group_id.as_ref() {
                Some(id) => id.clone(),
                None => {
                    warn!(edge = %edge.id, "merged edge without a group id; routing it alone");
                    solitary_group_id(&edge.id)
                }
            };
            claims.entry(key).or_default().push(edge);
        }

        let mut groups = BTreeMap::new();
        let mut by_edge = HashMap::new();
        for (id, members) in claims {
            let owners: Vec<&Edge> = members
                .iter()
                .copied()
                .filter(|e| e.merge.as_ref().is_some_and(|m| m.is_trunk_owner))
                .collect();
            let trunk_owner = match owners.as_slice() {
                [owner] => owner.id.clone(),
                [] => {
                    if members.len() > 1 {
                        warn!(group = %id, "merge group has no trunk owner");
                    }
                    members[0].id.clone()
                }
                [first, ..] => {
                    warn!(
                        group = %id,
                        owners = owners.len(),
                        "merge group has several trunk owners; keeping {}",
                        first.id
                    );
                    first.id.clone()
                }
            };
            let merge_point = members[0]
                .merge
                .as_ref()
                .map(|m| m.merge_point)
                .unwrap_or_default();
            for member in &members {
                by_edge.insert(member.id.clone(), id.clone());
            }
            groups.insert(
                id.clone(),
                MergeGroup {
                    id,
                    merge_point,
                    members: members.iter().map(|e| e.id.clone()).collect(),
                    trunk_owner,
                },
            );
        }

        Self { groups, by_edge }
    }

    pub fn group_of(&self, edge_id: &str) -> Option<&MergeGroup> {
        self.by_edge.get(edge_id).and_then(|id| self.groups.get(id))
    }

    pub fn group(&self, group_id: &str) -> Option<&MergeGroup> {
        self.groups.get(group_id)
    }

    pub fn owns_trunk(&self, edge_id: &str) -> bool {
        self.group_of(edge_id)
            .is_some_and(|group| group.trunk_owner == edge_id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &MergeGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group key used for a merged edge whose host record lacks a group id.
pub fn solitary_group_id(edge_id: &str) -> MergeGroupId {
    format!("~{edge_id}")
}

/// Reports merge descriptors that break the one-owner-per-group rule.
pub fn merge_diagnostics(edges: &[Edge]) -> Vec<RouteError> {
    let mut errors = Vec::new();
    let mut by_group: BTreeMap<&str, Vec<&Edge>> = BTreeMap::new();
    for edge in edges {
        let Some(merge) = edge.merge.as_ref() else {
            continue;
        };
        match merge.merge_group_id.as_deref() {
            Some(id) => by_group.entry(id).or_default().push(edge),
            None if merge.is_trunk_owner => errors.push(RouteError::TrunkOwnerWithoutGroup {
                edge_id: edge.id.clone(),
            }),
            None => {}
        }
    }
    for (id, members) in by_group {
        let owners: Vec<EdgeId> = members
            .iter()
            .filter(|e| e.merge.as_ref().is_some_and(|m| m.is_trunk_owner))
            .map(|e| e.id.clone())
            .collect();
        if owners.is_empty() {
            errors.push(RouteError::MissingTrunkOwner {
                group_id: id.to_string(),
            });
        } else if owners.len() > 1 {
            errors.push(RouteError::MultipleTrunkOwners {
                group_id: id.to_string(),
                owners,
            });
        }
        let points: Vec<Point> = members
            .iter()
            .filter_map(|e| e.merge.as_ref().map(|m| m.merge_point))
            .collect();
        if points
            .windows(2)
            .any(|w| distance(w[0], w[1]) > MERGE_POINT_TOLERANCE)
        {
            errors.push(RouteError::MergePointMismatch {
                group_id: id.to_string(),
            });
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Side;

    fn member(id: &str, group: &str, owner: bool) -> Edge {
        Edge::new(id, id.to_uppercase(), Side::Right, "T", Side::Left).with_merge(
            Point::new(200.0, 0.0),
            group,
            owner,
        )
    }

    #[test]
    fn exactly_one_owner_per_group() {
        let edges = vec![
            member("a", "g", false),
            member("b", "g", true),
            member("c", "g", false),
        ];
        let groups = MergeGroups::resolve(&edges);
        let owners: Vec<&str> = ["a", "b", "c"]
            .into_iter()
            .filter(|id| groups.owns_trunk(id))
            .collect();
        assert_eq!(owners, vec!["b"]);
        assert!(merge_diagnostics(&edges).is_empty());
    }

    #[test]
    fn several_claimants_keep_the_first() {
        let edges = vec![member("a", "g", true), member("b", "g", true)];
        let groups = MergeGroups::resolve(&edges);
        assert!(groups.owns_trunk("a"));
        assert!(!groups.owns_trunk("b"));
        assert!(matches!(
            merge_diagnostics(&edges).as_slice(),
            [RouteError::MultipleTrunkOwners { .. }]
        ));
    }

    #[test]
    fn ownerless_group_falls_back_to_first_member() {
        let edges = vec![member("x", "g", false), member("y", "g", false)];
        let groups = MergeGroups::resolve(&edges);
        assert!(groups.owns_trunk("x"));
        assert!(!groups.owns_trunk("y"));
        assert!(matches!(
            merge_diagnostics(&edges).as_slice(),
            [RouteError::MissingTrunkOwner { .. }]
        ));
    }

    #[test]
    fn missing_group_id_routes_alone() {
        let mut edge = member("a", "g", true);
        if let Some(merge) = edge.merge.as_mut() {
            merge.merge_group_id = None;
        }
        let edges = vec![edge];
        let groups = MergeGroups::resolve(&edges);
        let group = groups.group_of("a").expect("solitary group");
        assert_eq!(group.id, solitary_group_id("a"));
        assert!(groups.owns_trunk("a"));
        assert!(matches!(
            merge_diagnostics(&edges).as_slice(),
            [RouteError::TrunkOwnerWithoutGroup { .. }]
        ));
    }

    #[test]
    fn unmerged_edges_are_not_indexed() {
        let edges = vec![Edge::new("e", "A", Side::Right, "B", Side::Left)];
        let groups = MergeGroups::resolve(&edges);
        assert!(groups.is_empty());
        assert!(groups.group_of("e").is_none());
        assert!(!groups.owns_trunk("e"));
    }
}
