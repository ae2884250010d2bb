mod collapse;
mod model;
mod normalize;
mod snapshot;

pub use collapse::{filter_by_collapsed, filter_by_hidden_groups, is_collapsed, toggle_collapse};
pub use model::{
    DEFAULT_LINK_COLOR, DEFAULT_NODE_COLOR, DEFAULT_NODE_TEXT_SIZE, Link, MindGraph, Node,
    group_label,
};
pub use normalize::{
    GraphDocument, LinkRecord, NodeRecord, SessionDocument, normalize_camera_bookmarks,
    normalize_og_snapshot, normalize_session_document,
};
pub use snapshot::{OgNode, OgSnapshot};
