use std::collections::BTreeMap;

use crate::geometry::{Anchor, Side};
use crate::ir::Edge;

/// Signed lane of `index` among `count` parallel edges, centered on zero.
///
/// Out-of-range indices are clamped to the last lane.
pub fn parallel_slot(index: usize, count: usize) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    let index = index.min(count - 1);
    let center = (count - 1) as f32 / 2.0;
    index as f32 - center
}

pub fn parallel_offset(index: usize, count: usize, spacing: f32) -> f32 {
    parallel_slot(index, count) * spacing
}

/// Shifts an anchor along its face by `offset`.
pub fn apply_parallel_offset(anchor: Anchor, offset: f32) -> Anchor {
    if offset == 0.0 {
        return anchor;
    }
    let point = match anchor.side {
        Side::Top | Side::Bottom => anchor.point.translate(offset, 0.0),
        Side::Left | Side::Right => anchor.point.translate(0.0, offset),
    };
    Anchor::new(point, anchor.side)
}

/// Applies the edge's lane offset to both of its anchors.
pub fn offset_anchors(source: Anchor, target: Anchor, edge: &Edge, spacing: f32) -> (Anchor, Anchor) {
    let offset = parallel_offset(edge.parallel_index, edge.parallel_count, spacing);
    (
        apply_parallel_offset(source, offset),
        apply_parallel_offset(target, offset),
    )
}

/// Numbers edges that share a `(source, side, target, side)` key.
///
/// Lanes are assigned in edge-id order so the fan-out does not depend on the
/// order the host happens to store its records in.
pub fn assign_parallel_slots(edges: &mut [Edge]) {
    let mut lanes: BTreeMap<(String, Side, String, Side), Vec<usize>> = BTreeMap::new();
    for (idx, edge) in edges.iter().enumerate() {
        lanes
            .entry((
                edge.source.clone(),
                edge.source_side,
                edge.target.clone(),
                edge.target_side,
            ))
            .or_default()
            .push(idx);
    }
    for members in lanes.values_mut() {
        members.sort_by(|a, b| edges[*a].id.cmp(&edges[*b].id));
        let count = members.len();
        for (slot, idx) in members.iter().enumerate() {
            edges[*idx].parallel_index = slot;
            edges[*idx].parallel_count = count;
        }
    }
}
