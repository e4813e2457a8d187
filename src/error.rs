use crate::ir::{EdgeId, MergeGroupId, NodeId};

/// Data-integrity problems found in host-supplied diagrams.
///
/// None of these abort routing; they are reported by
/// [`crate::diagram::Diagram::validate`] and the affected edge is routed
/// best-effort or skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("edge {edge_id} references unknown node {node_id}")]
    UnknownNode { edge_id: EdgeId, node_id: NodeId },
    #[error("unknown edge {edge_id}")]
    UnknownEdge { edge_id: EdgeId },
    #[error("duplicate edge id {edge_id}")]
    DuplicateEdge { edge_id: EdgeId },
    #[error("edge {edge_id} has parallel index {index} outside 0..{count}")]
    ParallelIndexOutOfRange {
        edge_id: EdgeId,
        index: usize,
        count: usize,
    },
    #[error("edge {edge_id} claims trunk ownership without a merge group id")]
    TrunkOwnerWithoutGroup { edge_id: EdgeId },
    #[error("merge group {group_id} has no trunk owner")]
    MissingTrunkOwner { group_id: MergeGroupId },
    #[error("merge group {group_id} has several trunk owners: {owners:?}")]
    MultipleTrunkOwners {
        group_id: MergeGroupId,
        owners: Vec<EdgeId>,
    },
    #[error("merge group {group_id} members disagree on the merge point")]
    MergePointMismatch { group_id: MergeGroupId },
}

pub type Result<T> = std::result::Result<T, RouteError>;
