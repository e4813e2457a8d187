use crate::diagram::{Diagram, RoutedEdge};
use crate::highlight::HighlightState;
use crate::routing::PathStrategy;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathDump {
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub merge_groups: Vec<MergeGroupDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    pub strategy: PathStrategy,
    pub points: Vec<[f32; 2]>,
    pub svg_path: String,
    pub label_anchor: [f32; 2],
    pub handle: Option<[f32; 2]>,
    pub trunk: Option<[[f32; 2]; 2]>,
    pub highlight: HighlightState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeGroupDump {
    pub id: String,
    pub merge_point: [f32; 2],
    pub members: Vec<String>,
    pub trunk_owner: String,
}

impl PathDump {
    pub fn from_frame(diagram: &Diagram, routed: &[RoutedEdge]) -> Self {
        let nodes = diagram
            .nodes()
            .map(|node| NodeDump {
                id: node.id.clone(),
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
            })
            .collect();

        let edges = routed
            .iter()
            .filter_map(|routed| {
                let path = &routed.path;
                let edge = diagram.edge(&path.edge_id)?;
                Some(EdgeDump {
                    id: edge.id.clone(),
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    strategy: path.strategy,
                    points: path.points().iter().map(|p| [p.x, p.y]).collect(),
                    svg_path: path.to_svg_path(),
                    label_anchor: [path.label_anchor.x, path.label_anchor.y],
                    handle: path.handle.map(|p| [p.x, p.y]),
                    trunk: path
                        .trunk
                        .as_ref()
                        .map(|t| [[t.start.x, t.start.y], [t.end.x, t.end.y]]),
                    highlight: routed.highlight,
                })
            })
            .collect();

        let merge_groups = diagram
            .merge_groups()
            .groups()
            .map(|group| MergeGroupDump {
                id: group.id.clone(),
                merge_point: [group.merge_point.x, group.merge_point.y],
                members: group.members.clone(),
                trunk_owner: group.trunk_owner.clone(),
            })
            .collect();

        PathDump {
            nodes,
            edges,
            merge_groups,
        }
    }
}

pub fn write_path_dump(path: &Path, diagram: &Diagram, routed: &[RoutedEdge]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = PathDump::from_frame(diagram, routed);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
