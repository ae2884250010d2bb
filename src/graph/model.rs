use crate::graph::normalize::{GraphDocument, LinkRecord, NodeRecord};
use crate::util::stable_unit_dir;
use crate::vec3::Vec3;

pub const DEFAULT_NODE_COLOR: &str = "#1A75FF";
pub const DEFAULT_NODE_TEXT_SIZE: f32 = 6.0;
pub const DEFAULT_LINK_COLOR: &str = "#F0F0F0";
pub const DEFAULT_LINK_THICKNESS: f32 = 1.0;
pub const UNGROUPED_LABEL: &str = "ungrouped";

/// Radius of the sphere on which nodes without a stored position are seeded.
const SEED_RADIUS: f32 = 150.0;

/// Effective group label: trimmed, with a fallback for missing/blank groups.
pub fn group_label(group: Option<&str>) -> &str {
    match group {
        Some(g) if !g.trim().is_empty() => g.trim(),
        _ => UNGROUPED_LABEL,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub color: String,
    pub text_size: f32,
    pub group: Option<String>,
    pub pos: Vec3,
    /// Pin override; a pinned node is exempt from force relaxation.
    pub pinned: Option<Vec3>,
}

impl Node {
    pub fn group_label(&self) -> &str {
        group_label(self.group.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub color: String,
    pub thickness: f32,
}

impl Link {
    /// Undirected endpoint match, used for duplicate detection only.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Ordered node/link sequences. Order is preserved everywhere; id uniqueness
/// is enforced by the session mutations, not by this container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MindGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl MindGraph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn link_mut(&mut self, source: &str, target: &str) -> Option<&mut Link> {
        self.links
            .iter_mut()
            .find(|l| l.source == source && l.target == target)
    }

    pub fn has_link_between(&self, a: &str, b: &str) -> bool {
        self.links.iter().any(|l| l.connects(a, b))
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Removes the node and every link touching it; returns how many links
    /// went with it, or None when the id is unknown.
    pub fn remove_node(&mut self, id: &str) -> Option<usize> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        self.nodes.remove(index);
        let before = self.links.len();
        self.links.retain(|l| l.source != id && l.target != id);
        Some(before - self.links.len())
    }

    /// Sorted unique effective group labels.
    pub fn group_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .nodes
            .iter()
            .map(|n| n.group_label().to_string())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Live entry from a persisted document: records without an id are
    /// skipped, display defaults fill missing style fields, and nodes with
    /// no stored position get a deterministic seed so layouts reproduce.
    pub fn from_document(document: &GraphDocument) -> MindGraph {
        let nodes = document
            .nodes
            .iter()
            .filter_map(|record| {
                let id = record.id.clone()?;
                let pos = match (record.x, record.y, record.z) {
                    (Some(x), Some(y), Some(z)) => Vec3::new(x, y, z),
                    _ => stable_unit_dir(&id) * SEED_RADIUS,
                };
                Some(Node {
                    color: record
                        .color
                        .clone()
                        .unwrap_or_else(|| DEFAULT_NODE_COLOR.to_string()),
                    text_size: record.text_size.unwrap_or(DEFAULT_NODE_TEXT_SIZE),
                    group: record.group.clone(),
                    pos,
                    pinned: None,
                    id,
                })
            })
            .collect();

        let links = document
            .links
            .iter()
            .filter_map(|record| {
                Some(Link {
                    source: record.source.clone()?,
                    target: record.target.clone()?,
                    color: record
                        .color
                        .clone()
                        .unwrap_or_else(|| DEFAULT_LINK_COLOR.to_string()),
                    thickness: record.thickness.unwrap_or(DEFAULT_LINK_THICKNESS),
                })
            })
            .collect();

        MindGraph { nodes, links }
    }

    /// Clean projection for persistence; pin overrides never leave the
    /// session.
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeRecord {
                    id: Some(n.id.clone()),
                    color: Some(n.color.clone()),
                    text_size: Some(n.text_size),
                    group: n.group.clone(),
                    x: Some(n.pos.x),
                    y: Some(n.pos.y),
                    z: Some(n.pos.z),
                })
                .collect(),
            links: self
                .links
                .iter()
                .map(|l| LinkRecord {
                    source: Some(l.source.clone()),
                    target: Some(l.target.clone()),
                    color: Some(l.color.clone()),
                    thickness: Some(l.thickness),
                })
                .collect(),
        }
    }
}
