use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use crate::camera::{CameraBookmark, CameraPose, find_bookmark, remove_bookmark, upsert_bookmark};
use crate::graph::{
    DEFAULT_NODE_COLOR, DEFAULT_NODE_TEXT_SIZE, Link, MindGraph, Node, OgSnapshot,
    SessionDocument, filter_by_collapsed, filter_by_hidden_groups, group_label, toggle_collapse,
};
use crate::util::stable_unit_dir;
use crate::vec3::Vec3;

pub mod console;

/// Distance from the pull target at which a new node spawns.
const PULL_SPAWN_RADIUS: f32 = 30.0;
const NEW_LINK_COLOR: &str = "rgba(240, 240, 240, 1)";

const DEFAULT_GRAPH_ID: &str = "default-graph";

/// Everything the editor session owns. All transitions go through
/// [`SessionState::apply`]; on error the state is left untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub graph: MindGraph,
    pub collapsed: HashSet<String>,
    pub hidden_groups: HashSet<String>,
    pub bookmarks: Vec<CameraBookmark>,
    pub og: OgSnapshot,
    pub graph_id: String,
    pub selected_node: Option<String>,
    pub selected_link: Option<(String, String)>,
    /// Link-creation picks, source first, never more than two.
    pub link_picks: Vec<String>,
    pub pull_target: Option<String>,
    pub copied_node_style: Option<NodeStyle>,
    pub copied_link_style: Option<LinkStyle>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
    pub color: String,
    pub text_size: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkStyle {
    pub color: String,
    pub thickness: f32,
}

impl Default for SessionState {
    fn default() -> SessionState {
        SessionState {
            graph: MindGraph::default(),
            collapsed: HashSet::new(),
            hidden_groups: HashSet::new(),
            bookmarks: Vec::new(),
            og: OgSnapshot::default(),
            graph_id: DEFAULT_GRAPH_ID.to_string(),
            selected_node: None,
            selected_link: None,
            link_picks: Vec::new(),
            pull_target: None,
            copied_node_style: None,
            copied_link_style: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionAction {
    AddNode {
        id: String,
        group: String,
        fallback_position: Vec3,
    },
    DeleteNode {
        id: String,
    },
    AddLink,
    PickLinkEndpoint {
        id: String,
    },
    ClearLinkPicks,
    SelectNode {
        id: String,
    },
    SelectLink {
        source: String,
        target: String,
    },
    ClearSelection,
    SetPullTarget {
        id: Option<String>,
    },
    PullCloser {
        percent: f32,
    },
    DragNode {
        id: String,
        pos: Vec3,
    },
    PinNode {
        id: String,
        timestamp: i64,
    },
    SetNodeColor {
        color: String,
    },
    SetNodeTextSize {
        size: f32,
    },
    SetNodeGroup {
        group: String,
    },
    SetLinkColor {
        color: String,
    },
    SetLinkThickness {
        thickness: f32,
    },
    CopyNodeStyle,
    ApplyNodeStyle,
    CopyLinkStyle,
    ApplyLinkStyle,
    ToggleCollapse {
        id: String,
    },
    HideGroup {
        label: String,
    },
    ShowGroup {
        label: String,
    },
    ToggleGroup {
        label: String,
    },
    ShowAllGroups,
    RecordOg {
        timestamp: i64,
    },
    ApplyOgSnapshot {
        snapshot: OgSnapshot,
    },
    NewGraph,
    SetGraphId {
        id: String,
    },
    LoadDocument {
        document: SessionDocument,
    },
    CaptureBookmark {
        name: Option<String>,
        pose: CameraPose,
    },
    DeleteBookmark {
        name: String,
    },
    ApplyBookmark {
        name: String,
    },
}

/// What a successful transition did, for console feedback and camera
/// effects. Events carry enough to describe themselves without another
/// state lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    NodeAdded { id: String, pos: Vec3 },
    NodeDeleted { id: String, links_removed: usize },
    LinkAdded { source: String, target: String },
    LinkPicksChanged { picks: Vec<String> },
    NodeSelected { id: String },
    LinkSelected { source: String, target: String },
    SelectionCleared,
    PullTargetSet { id: Option<String> },
    NodePulled { id: String, target: String, percent: f32 },
    NodeDragged { id: String },
    NodePinned { id: String },
    NodeStyleChanged { id: String },
    LinkStyleChanged { source: String, target: String },
    NodeStyleCopied { id: String },
    NodeStyleApplied { id: String },
    LinkStyleCopied,
    LinkStyleApplied,
    CollapseToggled { id: String, collapsed: bool },
    GroupHidden { label: String },
    GroupShown { label: String },
    AllGroupsShown,
    OgRecorded { nodes: usize, links: usize },
    OgApplied { moved: usize },
    GraphCleared,
    GraphIdSet { id: String },
    DocumentLoaded { nodes: usize, links: usize, bookmarks: usize },
    BookmarkCaptured { name: String, replaced: bool },
    BookmarkDeleted { name: String, existed: bool },
    BookmarkApplied { bookmark: CameraBookmark },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    EmptyNodeId,
    DuplicateNodeId(String),
    UnknownNode(String),
    LinkEndpointsMissing,
    DuplicateLink(String, String),
    NothingSelected,
    NoCopiedStyle,
    PullContextMissing,
    UnknownGroup(String),
    EmptyOgSnapshot,
    UnknownBookmark(String),
    EmptyGraphId,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyNodeId => write!(f, "Please enter a node id."),
            SessionError::DuplicateNodeId(id) => {
                write!(f, "Node with id '{id}' already exists.")
            }
            SessionError::UnknownNode(id) => write!(f, "Node not found: {id}"),
            SessionError::LinkEndpointsMissing => {
                write!(f, "Please select both source and target nodes to create a link.")
            }
            SessionError::DuplicateLink(a, b) => {
                write!(f, "Link between {a} and {b} already exists.")
            }
            SessionError::NothingSelected => write!(f, "Nothing is selected."),
            SessionError::NoCopiedStyle => write!(f, "No style copied yet."),
            SessionError::PullContextMissing => {
                write!(f, "Please select a node and a pull target first.")
            }
            SessionError::UnknownGroup(label) => write!(f, "Unknown group: {label}"),
            SessionError::EmptyOgSnapshot => write!(f, "OG snapshot has no node positions."),
            SessionError::UnknownBookmark(name) => write!(f, "Bookmark not found: {name}"),
            SessionError::EmptyGraphId => write!(f, "Please enter a graph id."),
        }
    }
}

impl std::error::Error for SessionError {}

impl SessionState {
    /// The render pipeline: hidden groups first, then collapse. Both
    /// filters are identity when their set is empty.
    pub fn visible_graph(&self) -> Cow<'_, MindGraph> {
        match filter_by_hidden_groups(&self.graph, &self.hidden_groups) {
            Cow::Borrowed(g) => filter_by_collapsed(g, &self.collapsed),
            Cow::Owned(g) => Cow::Owned(filter_by_collapsed(&g, &self.collapsed).into_owned()),
        }
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.graph.node(self.selected_node.as_deref()?)
    }

    pub fn selected_link(&self) -> Option<&Link> {
        let (source, target) = self.selected_link.as_ref()?;
        self.graph
            .links
            .iter()
            .find(|l| &l.source == source && &l.target == target)
    }

    /// Snapshot of everything that persists, as one document. The OG
    /// snapshot travels even when empty; its own timestamp marks when it
    /// was recorded.
    pub fn to_session_document(&self) -> SessionDocument {
        SessionDocument {
            graph: self.graph.to_document(),
            og_snapshot: Some(self.og.clone()),
            camera_bookmarks: self.bookmarks.clone(),
        }
    }

    pub fn apply(&mut self, action: SessionAction) -> Result<SessionEvent, SessionError> {
        match action {
            SessionAction::AddNode { id, group, fallback_position } => {
                self.add_node(id, group, fallback_position)
            }
            SessionAction::DeleteNode { id } => self.delete_node(id),
            SessionAction::AddLink => self.add_link(),
            SessionAction::PickLinkEndpoint { id } => self.pick_link_endpoint(id),
            SessionAction::ClearLinkPicks => {
                self.link_picks.clear();
                Ok(SessionEvent::LinkPicksChanged { picks: Vec::new() })
            }
            SessionAction::SelectNode { id } => {
                if !self.graph.has_node(&id) {
                    return Err(SessionError::UnknownNode(id));
                }
                self.selected_node = Some(id.clone());
                self.selected_link = None;
                Ok(SessionEvent::NodeSelected { id })
            }
            SessionAction::SelectLink { source, target } => {
                if self.graph.link_mut(&source, &target).is_none() {
                    return Err(SessionError::UnknownNode(format!("{source} -> {target}")));
                }
                self.selected_link = Some((source.clone(), target.clone()));
                self.selected_node = None;
                Ok(SessionEvent::LinkSelected { source, target })
            }
            SessionAction::ClearSelection => {
                self.selected_node = None;
                self.selected_link = None;
                Ok(SessionEvent::SelectionCleared)
            }
            SessionAction::SetPullTarget { id } => {
                if let Some(id) = &id
                    && !self.graph.has_node(id)
                {
                    return Err(SessionError::UnknownNode(id.clone()));
                }
                self.pull_target = id.clone();
                Ok(SessionEvent::PullTargetSet { id })
            }
            SessionAction::PullCloser { percent } => self.pull_closer(percent),
            SessionAction::DragNode { id, pos } => {
                let Some(node) = self.graph.node_mut(&id) else {
                    return Err(SessionError::UnknownNode(id));
                };
                node.pos = pos;
                node.pinned = Some(pos);
                Ok(SessionEvent::NodeDragged { id })
            }
            SessionAction::PinNode { id, timestamp } => {
                let Some(node) = self.graph.node_mut(&id) else {
                    return Err(SessionError::UnknownNode(id));
                };
                node.pinned = Some(node.pos);
                self.og = OgSnapshot::record(&self.graph, timestamp);
                Ok(SessionEvent::NodePinned { id })
            }
            SessionAction::SetNodeColor { color } => {
                self.edit_selected_node(|node| node.color = color)
            }
            SessionAction::SetNodeTextSize { size } => {
                self.edit_selected_node(|node| node.text_size = size)
            }
            SessionAction::SetNodeGroup { group } => self.edit_selected_node(|node| {
                node.group = Some(group_label(Some(&group)).to_string());
            }),
            SessionAction::SetLinkColor { color } => {
                self.edit_selected_link(|link| link.color = color)
            }
            SessionAction::SetLinkThickness { thickness } => {
                self.edit_selected_link(|link| link.thickness = thickness)
            }
            SessionAction::CopyNodeStyle => {
                let node = self.selected_node().ok_or(SessionError::NothingSelected)?;
                let id = node.id.clone();
                self.copied_node_style = Some(NodeStyle {
                    color: node.color.clone(),
                    text_size: node.text_size,
                });
                Ok(SessionEvent::NodeStyleCopied { id })
            }
            SessionAction::ApplyNodeStyle => {
                let style = self
                    .copied_node_style
                    .clone()
                    .ok_or(SessionError::NoCopiedStyle)?;
                let event = self.edit_selected_node(|node| {
                    node.color = style.color;
                    node.text_size = style.text_size;
                })?;
                let SessionEvent::NodeStyleChanged { id } = event else {
                    return Ok(event);
                };
                Ok(SessionEvent::NodeStyleApplied { id })
            }
            SessionAction::CopyLinkStyle => {
                let link = self.selected_link().ok_or(SessionError::NothingSelected)?;
                self.copied_link_style = Some(LinkStyle {
                    color: link.color.clone(),
                    thickness: link.thickness,
                });
                Ok(SessionEvent::LinkStyleCopied)
            }
            SessionAction::ApplyLinkStyle => {
                let style = self
                    .copied_link_style
                    .clone()
                    .ok_or(SessionError::NoCopiedStyle)?;
                self.edit_selected_link(|link| {
                    link.color = style.color;
                    link.thickness = style.thickness;
                })?;
                Ok(SessionEvent::LinkStyleApplied)
            }
            SessionAction::ToggleCollapse { id } => {
                let collapsed = toggle_collapse(&mut self.collapsed, &id);
                Ok(SessionEvent::CollapseToggled { id, collapsed })
            }
            SessionAction::HideGroup { label } => {
                self.known_group(&label)?;
                self.hidden_groups.insert(label.clone());
                Ok(SessionEvent::GroupHidden { label })
            }
            SessionAction::ShowGroup { label } => {
                self.known_group(&label)?;
                self.hidden_groups.remove(&label);
                Ok(SessionEvent::GroupShown { label })
            }
            SessionAction::ToggleGroup { label } => {
                self.known_group(&label)?;
                if self.hidden_groups.remove(&label) {
                    Ok(SessionEvent::GroupShown { label })
                } else {
                    self.hidden_groups.insert(label.clone());
                    Ok(SessionEvent::GroupHidden { label })
                }
            }
            SessionAction::ShowAllGroups => {
                self.hidden_groups.clear();
                Ok(SessionEvent::AllGroupsShown)
            }
            SessionAction::RecordOg { timestamp } => {
                self.og = OgSnapshot::record(&self.graph, timestamp);
                Ok(SessionEvent::OgRecorded {
                    nodes: self.og.nodes.len(),
                    links: self.og.links.len(),
                })
            }
            SessionAction::ApplyOgSnapshot { snapshot } => {
                let moved = snapshot
                    .apply_to(&mut self.graph)
                    .ok_or(SessionError::EmptyOgSnapshot)?;
                self.og = snapshot;
                Ok(SessionEvent::OgApplied { moved })
            }
            SessionAction::NewGraph => {
                self.graph = MindGraph::default();
                self.clear_transient_selection();
                Ok(SessionEvent::GraphCleared)
            }
            SessionAction::SetGraphId { id } => {
                let id = id.trim().to_string();
                if id.is_empty() {
                    return Err(SessionError::EmptyGraphId);
                }
                self.graph_id = id.clone();
                Ok(SessionEvent::GraphIdSet { id })
            }
            SessionAction::LoadDocument { document } => {
                self.graph = MindGraph::from_document(&document.graph);
                self.og = document.og_snapshot.unwrap_or_default();
                self.bookmarks = document.camera_bookmarks;
                self.clear_transient_selection();
                Ok(SessionEvent::DocumentLoaded {
                    nodes: self.graph.nodes.len(),
                    links: self.graph.links.len(),
                    bookmarks: self.bookmarks.len(),
                })
            }
            SessionAction::CaptureBookmark { name, pose } => {
                let name = name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| format!("view-{}", self.bookmarks.len() + 1));
                let bookmark = CameraBookmark::capture(&name, &pose);
                let replaced = upsert_bookmark(&mut self.bookmarks, bookmark);
                Ok(SessionEvent::BookmarkCaptured { name, replaced })
            }
            SessionAction::DeleteBookmark { name } => {
                let existed = remove_bookmark(&mut self.bookmarks, &name);
                Ok(SessionEvent::BookmarkDeleted { name, existed })
            }
            SessionAction::ApplyBookmark { name } => {
                let bookmark = find_bookmark(&self.bookmarks, &name)
                    .ok_or_else(|| SessionError::UnknownBookmark(name.clone()))?
                    .clone();
                Ok(SessionEvent::BookmarkApplied { bookmark })
            }
        }
    }

    fn add_node(
        &mut self,
        id: String,
        group: String,
        fallback_position: Vec3,
    ) -> Result<SessionEvent, SessionError> {
        let id = id.trim().to_string();
        if id.is_empty() {
            return Err(SessionError::EmptyNodeId);
        }
        if self.graph.has_node(&id) {
            return Err(SessionError::DuplicateNodeId(id));
        }

        let pos = match self
            .pull_target
            .as_deref()
            .and_then(|target| self.graph.node(target))
        {
            Some(target) => target.pos + stable_unit_dir(&id) * PULL_SPAWN_RADIUS,
            None => fallback_position,
        };

        self.graph.add_node(Node {
            id: id.clone(),
            color: DEFAULT_NODE_COLOR.to_string(),
            text_size: DEFAULT_NODE_TEXT_SIZE,
            group: Some(group_label(Some(&group)).to_string()),
            pos,
            pinned: Some(pos),
        });
        self.pull_target = None;
        Ok(SessionEvent::NodeAdded { id, pos })
    }

    fn delete_node(&mut self, id: String) -> Result<SessionEvent, SessionError> {
        if id.trim().is_empty() {
            return Err(SessionError::EmptyNodeId);
        }
        let links_removed = self
            .graph
            .remove_node(&id)
            .ok_or_else(|| SessionError::UnknownNode(id.clone()))?;

        if self.selected_node.as_deref() == Some(id.as_str()) {
            self.selected_node = None;
        }
        if self
            .selected_link
            .as_ref()
            .is_some_and(|(s, t)| s == &id || t == &id)
        {
            self.selected_link = None;
        }
        if self.pull_target.as_deref() == Some(id.as_str()) {
            self.pull_target = None;
        }
        self.link_picks.retain(|pick| pick != &id);

        Ok(SessionEvent::NodeDeleted { id, links_removed })
    }

    fn add_link(&mut self) -> Result<SessionEvent, SessionError> {
        let [source, target] = self.link_picks.as_slice() else {
            return Err(SessionError::LinkEndpointsMissing);
        };
        let (source, target) = (source.clone(), target.clone());
        for id in [&source, &target] {
            if !self.graph.has_node(id) {
                return Err(SessionError::UnknownNode(id.clone()));
            }
        }
        if self.graph.has_link_between(&source, &target) {
            return Err(SessionError::DuplicateLink(source, target));
        }

        self.graph.add_link(Link {
            source: source.clone(),
            target: target.clone(),
            color: NEW_LINK_COLOR.to_string(),
            thickness: 1.0,
        });
        self.link_picks.clear();
        Ok(SessionEvent::LinkAdded { source, target })
    }

    /// Picking a picked node unpicks it; a third pick replaces the second.
    fn pick_link_endpoint(&mut self, id: String) -> Result<SessionEvent, SessionError> {
        if !self.graph.has_node(&id) {
            return Err(SessionError::UnknownNode(id));
        }
        if let Some(index) = self.link_picks.iter().position(|pick| pick == &id) {
            self.link_picks.remove(index);
        } else if self.link_picks.len() < 2 {
            self.link_picks.push(id);
        } else {
            self.link_picks[1] = id;
        }
        Ok(SessionEvent::LinkPicksChanged { picks: self.link_picks.clone() })
    }

    fn pull_closer(&mut self, percent: f32) -> Result<SessionEvent, SessionError> {
        let (Some(mover), Some(target)) = (self.selected_node.clone(), self.pull_target.clone())
        else {
            return Err(SessionError::PullContextMissing);
        };
        let target_pos = self
            .graph
            .node(&target)
            .ok_or_else(|| SessionError::UnknownNode(target.clone()))?
            .pos;
        let node = self
            .graph
            .node_mut(&mover)
            .ok_or_else(|| SessionError::UnknownNode(mover.clone()))?;

        let pos = node.pos + (target_pos - node.pos) * (percent / 100.0);
        node.pos = pos;
        node.pinned = Some(pos);
        Ok(SessionEvent::NodePulled { id: mover, target, percent })
    }

    fn edit_selected_node(
        &mut self,
        edit: impl FnOnce(&mut Node),
    ) -> Result<SessionEvent, SessionError> {
        let id = self.selected_node.clone().ok_or(SessionError::NothingSelected)?;
        let node = self
            .graph
            .node_mut(&id)
            .ok_or_else(|| SessionError::UnknownNode(id.clone()))?;
        edit(node);
        Ok(SessionEvent::NodeStyleChanged { id })
    }

    fn edit_selected_link(
        &mut self,
        edit: impl FnOnce(&mut Link),
    ) -> Result<SessionEvent, SessionError> {
        let (source, target) = self
            .selected_link
            .clone()
            .ok_or(SessionError::NothingSelected)?;
        let link = self
            .graph
            .link_mut(&source, &target)
            .ok_or_else(|| SessionError::UnknownNode(format!("{source} -> {target}")))?;
        edit(link);
        Ok(SessionEvent::LinkStyleChanged { source, target })
    }

    fn known_group(&self, label: &str) -> Result<(), SessionError> {
        if self.graph.group_labels().iter().any(|g| g == label) {
            Ok(())
        } else {
            Err(SessionError::UnknownGroup(label.to_string()))
        }
    }

    fn clear_transient_selection(&mut self) {
        self.selected_node = None;
        self.selected_link = None;
        self.link_picks.clear();
        self.pull_target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::normalize_session_document;
    use serde_json::json;

    fn seeded() -> SessionState {
        let mut state = SessionState::default();
        for id in ["a", "b", "c"] {
            state
                .apply(SessionAction::AddNode {
                    id: id.to_string(),
                    group: String::new(),
                    fallback_position: Vec3::ZERO,
                })
                .unwrap();
        }
        state
    }

    fn pick_pair(state: &mut SessionState, a: &str, b: &str) {
        state
            .apply(SessionAction::PickLinkEndpoint { id: a.to_string() })
            .unwrap();
        state
            .apply(SessionAction::PickLinkEndpoint { id: b.to_string() })
            .unwrap();
    }

    #[test]
    fn test_add_node_rejects_empty_and_duplicate_ids() {
        let mut state = seeded();
        let before = state.clone();

        let err = state.apply(SessionAction::AddNode {
            id: "   ".to_string(),
            group: String::new(),
            fallback_position: Vec3::ZERO,
        });
        assert_eq!(err, Err(SessionError::EmptyNodeId));
        assert_eq!(state, before);

        let err = state.apply(SessionAction::AddNode {
            id: "a".to_string(),
            group: String::new(),
            fallback_position: Vec3::ZERO,
        });
        assert_eq!(err, Err(SessionError::DuplicateNodeId("a".to_string())));
        assert_eq!(state, before);
    }

    #[test]
    fn test_add_node_spawns_near_pull_target_and_pins() {
        let mut state = seeded();
        state
            .graph
            .node_mut("b")
            .unwrap()
            .pos = Vec3::new(100.0, 0.0, 0.0);
        state
            .apply(SessionAction::SetPullTarget { id: Some("b".to_string()) })
            .unwrap();

        let event = state
            .apply(SessionAction::AddNode {
                id: "near-b".to_string(),
                group: "general".to_string(),
                fallback_position: Vec3::new(-999.0, 0.0, 0.0),
            })
            .unwrap();

        let SessionEvent::NodeAdded { pos, .. } = event else {
            panic!("wrong event");
        };
        let target = Vec3::new(100.0, 0.0, 0.0);
        assert!((pos.distance(target) - 30.0).abs() < 1e-3);
        let node = state.graph.node("near-b").unwrap();
        assert_eq!(node.pinned, Some(pos));
        assert_eq!(node.group.as_deref(), Some("general"));
        assert_eq!(state.pull_target, None);

        // Same id seeds the same offset.
        assert_eq!(
            target + stable_unit_dir("near-b") * 30.0,
            pos
        );
    }

    #[test]
    fn test_add_node_falls_back_to_camera_line() {
        let mut state = seeded();
        let fallback = Vec3::new(1.0, 2.0, 3.0);
        let event = state
            .apply(SessionAction::AddNode {
                id: "free".to_string(),
                group: String::new(),
                fallback_position: fallback,
            })
            .unwrap();
        assert_eq!(
            event,
            SessionEvent::NodeAdded { id: "free".to_string(), pos: fallback }
        );
    }

    #[test]
    fn test_delete_node_clears_references() {
        let mut state = seeded();
        pick_pair(&mut state, "a", "b");
        state.apply(SessionAction::AddLink).unwrap();
        state
            .apply(SessionAction::SelectNode { id: "b".to_string() })
            .unwrap();
        state
            .apply(SessionAction::SetPullTarget { id: Some("b".to_string()) })
            .unwrap();
        pick_pair(&mut state, "b", "c");

        let event = state
            .apply(SessionAction::DeleteNode { id: "b".to_string() })
            .unwrap();
        assert_eq!(
            event,
            SessionEvent::NodeDeleted { id: "b".to_string(), links_removed: 1 }
        );
        assert_eq!(state.selected_node, None);
        assert_eq!(state.pull_target, None);
        assert_eq!(state.link_picks, vec!["c".to_string()]);

        let before = state.clone();
        let err = state.apply(SessionAction::DeleteNode { id: "b".to_string() });
        assert_eq!(err, Err(SessionError::UnknownNode("b".to_string())));
        assert_eq!(state, before);
    }

    #[test]
    fn test_add_link_rejects_duplicates_in_both_directions() {
        let mut state = seeded();
        pick_pair(&mut state, "a", "b");
        state.apply(SessionAction::AddLink).unwrap();
        assert!(state.link_picks.is_empty());

        pick_pair(&mut state, "b", "a");
        let before = state.clone();
        let err = state.apply(SessionAction::AddLink);
        assert_eq!(
            err,
            Err(SessionError::DuplicateLink("b".to_string(), "a".to_string()))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_link_picks_toggle_and_replace() {
        let mut state = seeded();
        pick_pair(&mut state, "a", "b");
        // Picking a picked node unpicks it.
        state
            .apply(SessionAction::PickLinkEndpoint { id: "a".to_string() })
            .unwrap();
        assert_eq!(state.link_picks, vec!["b".to_string()]);

        state
            .apply(SessionAction::PickLinkEndpoint { id: "a".to_string() })
            .unwrap();
        // Third pick replaces the second.
        state
            .apply(SessionAction::PickLinkEndpoint { id: "c".to_string() })
            .unwrap();
        assert_eq!(state.link_picks, vec!["b".to_string(), "c".to_string()]);

        let err = state.apply(SessionAction::PickLinkEndpoint { id: "nope".to_string() });
        assert_eq!(err, Err(SessionError::UnknownNode("nope".to_string())));
    }

    #[test]
    fn test_add_link_requires_two_picks() {
        let mut state = seeded();
        state
            .apply(SessionAction::PickLinkEndpoint { id: "a".to_string() })
            .unwrap();
        let err = state.apply(SessionAction::AddLink);
        assert_eq!(err, Err(SessionError::LinkEndpointsMissing));
    }

    #[test]
    fn test_pull_closer_moves_by_fraction_and_repins() {
        let mut state = seeded();
        state.graph.node_mut("a").unwrap().pos = Vec3::ZERO;
        state.graph.node_mut("b").unwrap().pos = Vec3::new(100.0, 0.0, 0.0);
        state
            .apply(SessionAction::SelectNode { id: "a".to_string() })
            .unwrap();
        state
            .apply(SessionAction::SetPullTarget { id: Some("b".to_string()) })
            .unwrap();

        state.apply(SessionAction::PullCloser { percent: 50.0 }).unwrap();
        let a = state.graph.node("a").unwrap();
        assert_eq!(a.pos, Vec3::new(50.0, 0.0, 0.0));
        assert_eq!(a.pinned, Some(a.pos));

        state.apply(SessionAction::ClearSelection).unwrap();
        let err = state.apply(SessionAction::PullCloser { percent: 50.0 });
        assert_eq!(err, Err(SessionError::PullContextMissing));
    }

    #[test]
    fn test_style_copy_and_apply() {
        let mut state = seeded();
        {
            let node = state.graph.node_mut("a").unwrap();
            node.color = "#FF0000".to_string();
            node.text_size = 12.0;
        }
        state
            .apply(SessionAction::SelectNode { id: "a".to_string() })
            .unwrap();
        state.apply(SessionAction::CopyNodeStyle).unwrap();
        state
            .apply(SessionAction::SelectNode { id: "b".to_string() })
            .unwrap();
        state.apply(SessionAction::ApplyNodeStyle).unwrap();

        let b = state.graph.node("b").unwrap();
        assert_eq!(b.color, "#FF0000");
        assert_eq!(b.text_size, 12.0);

        state.apply(SessionAction::ClearSelection).unwrap();
        let err = state.apply(SessionAction::ApplyNodeStyle);
        assert_eq!(err, Err(SessionError::NothingSelected));
    }

    #[test]
    fn test_group_visibility_validates_labels() {
        let mut state = seeded();
        state
            .apply(SessionAction::SelectNode { id: "a".to_string() })
            .unwrap();
        state
            .apply(SessionAction::SetNodeGroup { group: "work".to_string() })
            .unwrap();

        let err = state.apply(SessionAction::HideGroup { label: "nope".to_string() });
        assert_eq!(err, Err(SessionError::UnknownGroup("nope".to_string())));

        state
            .apply(SessionAction::HideGroup { label: "work".to_string() })
            .unwrap();
        let visible = state.visible_graph();
        assert!(visible.node("a").is_none());
        assert!(visible.node("b").is_some());

        state.apply(SessionAction::ShowAllGroups).unwrap();
        assert_eq!(state.visible_graph().nodes.len(), 3);
    }

    #[test]
    fn test_group_filter_runs_before_collapse() {
        let mut state = seeded();
        pick_pair(&mut state, "a", "b");
        state.apply(SessionAction::AddLink).unwrap();
        pick_pair(&mut state, "b", "c");
        state.apply(SessionAction::AddLink).unwrap();

        state
            .apply(SessionAction::ToggleCollapse { id: "b".to_string() })
            .unwrap();
        let visible = state.visible_graph();
        let ids: Vec<_> = visible.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        // Hiding b's group removes b before collapse is considered, so c
        // comes back (nothing hides it any more).
        state
            .apply(SessionAction::SelectNode { id: "b".to_string() })
            .unwrap();
        state
            .apply(SessionAction::SetNodeGroup { group: "solo".to_string() })
            .unwrap();
        state
            .apply(SessionAction::HideGroup { label: "solo".to_string() })
            .unwrap();
        let visible = state.visible_graph();
        let ids: Vec<_> = visible.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(visible.links.is_empty());
    }

    #[test]
    fn test_og_record_and_apply_roundtrip() {
        let mut state = seeded();
        state
            .apply(SessionAction::DragNode {
                id: "a".to_string(),
                pos: Vec3::new(5.0, 6.0, 7.0),
            })
            .unwrap();
        state
            .apply(SessionAction::RecordOg { timestamp: 10 })
            .unwrap();
        assert_eq!(state.og.nodes.len(), 3);

        let snapshot = state.og.clone();
        state.graph.node_mut("a").unwrap().pos = Vec3::ZERO;
        let mut restored = SessionState { graph: state.graph.clone(), ..SessionState::default() };
        let event = restored
            .apply(SessionAction::ApplyOgSnapshot { snapshot: snapshot.clone() })
            .unwrap();
        assert_eq!(event, SessionEvent::OgApplied { moved: 3 });
        assert_eq!(restored.graph.node("a").unwrap().pos, Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(restored.og, snapshot);

        let mut empty = SessionState::default();
        let err = empty.apply(SessionAction::ApplyOgSnapshot { snapshot: OgSnapshot::default() });
        assert_eq!(err, Err(SessionError::EmptyOgSnapshot));
    }

    #[test]
    fn test_new_graph_keeps_collapsed_and_bookmarks() {
        let mut state = seeded();
        state
            .apply(SessionAction::ToggleCollapse { id: "a".to_string() })
            .unwrap();
        state
            .apply(SessionAction::CaptureBookmark { name: None, pose: CameraPose::default() })
            .unwrap();
        state
            .apply(SessionAction::SelectNode { id: "a".to_string() })
            .unwrap();

        state.apply(SessionAction::NewGraph).unwrap();
        assert!(state.graph.nodes.is_empty());
        assert!(state.collapsed.contains("a"));
        assert_eq!(state.bookmarks.len(), 1);
        assert_eq!(state.selected_node, None);
    }

    #[test]
    fn test_load_document_replaces_wholesale() {
        let mut state = seeded();
        state
            .apply(SessionAction::ToggleCollapse { id: "a".to_string() })
            .unwrap();

        let document = normalize_session_document(&json!({
            "nodes": [{"id": "x"}, {"id": "y", "color": "#222222"}],
            "links": [{"source": "x", "target": {"id": "y"}}],
            "cameraBookmarks": [{"name": "saved"}],
        }));
        let event = state
            .apply(SessionAction::LoadDocument { document })
            .unwrap();
        assert_eq!(
            event,
            SessionEvent::DocumentLoaded { nodes: 2, links: 1, bookmarks: 1 }
        );
        // Display defaults fill in at live entry.
        assert_eq!(state.graph.node("x").unwrap().color, DEFAULT_NODE_COLOR);
        assert_eq!(state.graph.node("y").unwrap().color, "#222222");
        // Collapsed set survives loads.
        assert!(state.collapsed.contains("a"));
    }

    #[test]
    fn test_bookmark_capture_defaults_name_and_applies() {
        let mut state = SessionState::default();
        let event = state
            .apply(SessionAction::CaptureBookmark { name: None, pose: CameraPose::default() })
            .unwrap();
        assert_eq!(
            event,
            SessionEvent::BookmarkCaptured { name: "view-1".to_string(), replaced: false }
        );

        let mut pose = CameraPose::default();
        pose.zoom = 3.0;
        let event = state
            .apply(SessionAction::CaptureBookmark {
                name: Some("view-1".to_string()),
                pose,
            })
            .unwrap();
        assert_eq!(
            event,
            SessionEvent::BookmarkCaptured { name: "view-1".to_string(), replaced: true }
        );
        assert_eq!(state.bookmarks.len(), 1);
        assert_eq!(state.bookmarks[0].zoom, 3.0);

        let err = state.apply(SessionAction::ApplyBookmark { name: "nope".to_string() });
        assert_eq!(err, Err(SessionError::UnknownBookmark("nope".to_string())));
        let event = state
            .apply(SessionAction::ApplyBookmark { name: "view-1".to_string() })
            .unwrap();
        let SessionEvent::BookmarkApplied { bookmark } = event else {
            panic!("wrong event");
        };
        assert_eq!(bookmark.zoom, 3.0);

        let event = state
            .apply(SessionAction::DeleteBookmark { name: "gone".to_string() })
            .unwrap();
        assert_eq!(
            event,
            SessionEvent::BookmarkDeleted { name: "gone".to_string(), existed: false }
        );
    }

    #[test]
    fn test_set_graph_id_trims_and_rejects_empty() {
        let mut state = SessionState::default();
        state
            .apply(SessionAction::SetGraphId { id: "  brain  ".to_string() })
            .unwrap();
        assert_eq!(state.graph_id, "brain");
        let err = state.apply(SessionAction::SetGraphId { id: "  ".to_string() });
        assert_eq!(err, Err(SessionError::EmptyGraphId));
        assert_eq!(state.graph_id, "brain");
    }

    #[test]
    fn test_session_document_roundtrip() {
        let mut state = seeded();
        pick_pair(&mut state, "a", "b");
        state.apply(SessionAction::AddLink).unwrap();
        state
            .apply(SessionAction::RecordOg { timestamp: 5 })
            .unwrap();

        let doc = state.to_session_document();
        let value = serde_json::to_value(&doc).unwrap();
        let restored = normalize_session_document(&value);
        assert_eq!(restored.graph.nodes.len(), 3);
        assert_eq!(restored.graph.links.len(), 1);
        let og = restored.og_snapshot.unwrap();
        assert_eq!(og.nodes.len(), 3);
        assert_eq!(og.timestamp, 5);
    }
}
