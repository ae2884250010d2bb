use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};

use crate::graph::model::{Link, MindGraph, Node};

/// Strict descendants of `node_id`, following links source→target only.
/// Cycle-safe; the start node is never a member of its own result.
pub fn descendants(node_id: &str, links: &[Link]) -> HashSet<String> {
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(node_id.to_string());
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(node_id);

    while let Some(current) = queue.pop_front() {
        for link in links {
            if link.source == current && visited.insert(link.target.clone()) {
                queue.push_back(link.target.as_str());
            }
        }
    }

    visited.remove(node_id);
    visited
}

/// Visible projection under the collapsed set. A collapsed node stays
/// visible; its descendants hide. Links survive only when both endpoints
/// are visible, which also drops dangling links. The empty set returns
/// the input graph itself, so callers can memoize on identity.
pub fn filter_by_collapsed<'a>(
    graph: &'a MindGraph,
    collapsed: &HashSet<String>,
) -> Cow<'a, MindGraph> {
    if collapsed.is_empty() {
        return Cow::Borrowed(graph);
    }

    let mut hidden: HashSet<String> = HashSet::new();
    for id in collapsed {
        hidden.extend(descendants(id, &graph.links));
    }

    Cow::Owned(retain_visible(graph, |node| !hidden.contains(&node.id)))
}

/// Same contract as the collapse filter, keyed on effective group labels.
/// Runs before the collapse filter in the render pipeline.
pub fn filter_by_hidden_groups<'a>(
    graph: &'a MindGraph,
    hidden_groups: &HashSet<String>,
) -> Cow<'a, MindGraph> {
    if hidden_groups.is_empty() {
        return Cow::Borrowed(graph);
    }

    Cow::Owned(retain_visible(graph, |node| {
        !hidden_groups.contains(node.group_label())
    }))
}

fn retain_visible(graph: &MindGraph, keep: impl Fn(&Node) -> bool) -> MindGraph {
    let nodes: Vec<_> = graph.nodes.iter().filter(|n| keep(n)).cloned().collect();
    let visible: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let links = graph
        .links
        .iter()
        .filter(|l| visible.contains(l.source.as_str()) && visible.contains(l.target.as_str()))
        .cloned()
        .collect();
    MindGraph { nodes, links }
}

/// The only mutator of the collapsed set. Never inspects the graph, so
/// nodes hidden by an ancestor (or absent entirely) toggle like any other.
/// Returns whether the node is collapsed afterwards.
pub fn toggle_collapse(collapsed: &mut HashSet<String>, node_id: &str) -> bool {
    if collapsed.remove(node_id) {
        false
    } else {
        collapsed.insert(node_id.to_string());
        true
    }
}

pub fn is_collapsed(collapsed: &HashSet<String>, node_id: &str) -> bool {
    collapsed.contains(node_id)
}
