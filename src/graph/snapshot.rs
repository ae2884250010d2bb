use serde::{Deserialize, Serialize};

use crate::graph::model::{DEFAULT_LINK_COLOR, DEFAULT_LINK_THICKNESS, Link, MindGraph};
use crate::graph::normalize::LinkRecord;
use crate::vec3::Vec3;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OgNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

/// The "original positions" snapshot: pinned node placements plus the link
/// set they were recorded with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OgSnapshot {
    #[serde(default)]
    pub nodes: Vec<OgNode>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
    #[serde(default)]
    pub timestamp: i64,
}

impl OgSnapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Captures every pinned node's pin position and all current links.
    pub fn record(graph: &MindGraph, timestamp: i64) -> OgSnapshot {
        let nodes = graph
            .nodes
            .iter()
            .filter_map(|n| {
                let pin = n.pinned?;
                Some(OgNode {
                    id: Some(n.id.clone()),
                    x: Some(pin.x),
                    y: Some(pin.y),
                    z: Some(pin.z),
                })
            })
            .collect();
        let links = graph
            .links
            .iter()
            .map(|l| LinkRecord {
                source: Some(l.source.clone()),
                target: Some(l.target.clone()),
                color: Some(l.color.clone()),
                thickness: Some(l.thickness),
            })
            .collect();
        OgSnapshot { nodes, links, timestamp }
    }

    /// Moves and re-pins every node the snapshot knows about; replaces the
    /// link set when the snapshot carries one. Returns how many nodes
    /// moved, or None when the snapshot has no node entries.
    pub fn apply_to(&self, graph: &mut MindGraph) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut moved = 0usize;
        for record in &self.nodes {
            let Some(id) = record.id.as_deref() else {
                continue;
            };
            let Some(node) = graph.node_mut(id) else {
                continue;
            };
            let pos = Vec3::new(
                record.x.unwrap_or(node.pos.x),
                record.y.unwrap_or(node.pos.y),
                record.z.unwrap_or(node.pos.z),
            );
            node.pos = pos;
            node.pinned = Some(pos);
            moved += 1;
        }

        if !self.links.is_empty() {
            graph.links = self
                .links
                .iter()
                .filter_map(|r| {
                    Some(Link {
                        source: r.source.clone()?,
                        target: r.target.clone()?,
                        color: r
                            .color
                            .clone()
                            .unwrap_or_else(|| DEFAULT_LINK_COLOR.to_string()),
                        thickness: r.thickness.unwrap_or(DEFAULT_LINK_THICKNESS),
                    })
                })
                .collect();
        }

        Some(moved)
    }
}
