use std::collections::{HashMap, HashSet};

use crate::graph::MindGraph;
use crate::vec3::Vec3;

#[derive(Clone, Copy)]
pub(super) struct LayoutConfig {
    pub(super) repulsion_scale: f32,
    pub(super) spring_scale: f32,
    pub(super) link_distance: f32,
    pub(super) velocity_damping: f32,
    pub(super) delta_seconds: f32,
}

/// Force relaxation over the visible part of the graph. Velocities are
/// keyed by node id so graph edits never invalidate the simulation;
/// `active` goes false once every node sleeps and is flipped back by
/// [`LayoutSim::reheat`] whenever the graph changes.
pub(super) struct LayoutSim {
    velocities: HashMap<String, Vec3>,
    active: bool,
}

impl LayoutSim {
    pub(super) fn new() -> LayoutSim {
        LayoutSim {
            velocities: HashMap::new(),
            active: true,
        }
    }

    pub(super) fn reheat(&mut self) {
        self.active = true;
    }

    pub(super) fn step(
        &mut self,
        graph: &mut MindGraph,
        visible: &HashSet<String>,
        config: &LayoutConfig,
    ) -> bool {
        if !self.active {
            return false;
        }
        let moving = step_layout(graph, visible, &mut self.velocities, config);
        self.active = moving;
        moving
    }
}

fn step_layout(
    graph: &mut MindGraph,
    visible: &HashSet<String>,
    velocities: &mut HashMap<String, Vec3>,
    config: &LayoutConfig,
) -> bool {
    let node_count = graph.nodes.len();
    let mut positions = Vec::with_capacity(node_count);
    let mut vels = Vec::with_capacity(node_count);
    let mut pinned = Vec::with_capacity(node_count);
    let mut in_sim = Vec::with_capacity(node_count);
    for node in &graph.nodes {
        positions.push(node.pos);
        vels.push(velocities.get(&node.id).copied().unwrap_or(Vec3::ZERO));
        pinned.push(node.pinned.is_some());
        in_sim.push(visible.contains(&node.id));
    }

    let sim_indices: Vec<usize> = (0..node_count).filter(|&index| in_sim[index]).collect();
    if sim_indices.len() < 2 {
        return false;
    }

    // Links with a filtered-out endpoint exert no spring force.
    let edges: Vec<(usize, usize)> = {
        let index_of: HashMap<&str, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect();
        graph
            .links
            .iter()
            .filter_map(|link| {
                let from = *index_of.get(link.source.as_str())?;
                let to = *index_of.get(link.target.as_str())?;
                (from != to && in_sim[from] && in_sim[to]).then_some((from, to))
            })
            .collect()
    };

    let mut forces = vec![Vec3::ZERO; node_count];
    let repulsion_strength = 9_000.0 * config.repulsion_scale.clamp(0.25, 2.6);
    let spring_strength = 0.05 * config.spring_scale.clamp(0.2, 2.2);
    let spring_damping = 0.22;
    let rest_length = config.link_distance.clamp(10.0, 300.0);
    let damping = config.velocity_damping.clamp(0.78, 0.97);
    let softening = 40.0;
    let time_step_scale = (config.delta_seconds * 60.0).clamp(0.25, 3.0);
    let damping_factor = damping.powf(time_step_scale);

    for (slot, &a) in sim_indices.iter().enumerate() {
        for &b in &sim_indices[slot + 1..] {
            let delta = positions[a] - positions[b];
            let distance_sq = delta.length_sq();
            let distance = distance_sq.sqrt();
            let direction = if distance > 1e-4 {
                delta * (1.0 / distance)
            } else {
                let angle =
                    ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
                Vec3::new(angle.cos(), 0.5, angle.sin()).normalized_or(Vec3::new(1.0, 0.0, 0.0))
            };
            let push = direction * (repulsion_strength / (distance_sq + softening));
            forces[a] += push;
            forces[b] -= push;
        }
    }

    for &(from, to) in &edges {
        let delta = positions[from] - positions[to];
        let distance_sq = delta.length_sq();
        if distance_sq <= 1e-8 {
            continue;
        }
        let distance = distance_sq.sqrt();
        let direction = delta * (1.0 / distance);
        let spring = (distance - rest_length) * spring_strength;
        let relative_velocity = vels[from] - vels[to];
        let damping_force = relative_velocity.dot(direction) * spring_damping;
        let correction = direction * (spring + damping_force);
        forces[from] -= correction;
        forces[to] += correction;
    }

    let max_force = 180.0_f32;
    let max_speed = 14.0_f32;
    let min_sleep_speed_sq = 0.02 * 0.02;
    let min_sleep_force_sq = 0.08 * 0.08;
    let mut any_motion = false;

    for &index in &sim_indices {
        if pinned[index] {
            vels[index] = Vec3::ZERO;
            continue;
        }

        let mut force = forces[index];
        let force_sq = force.length_sq();
        if force_sq > max_force * max_force {
            force = force * (max_force / force_sq.sqrt());
        }

        let mut velocity = (vels[index] + force * (0.055 * time_step_scale)) * damping_factor;
        let mut speed_sq = velocity.length_sq();
        if speed_sq > max_speed * max_speed {
            velocity = velocity * (max_speed / speed_sq.sqrt());
            speed_sq = max_speed * max_speed;
        }

        if speed_sq < min_sleep_speed_sq && force_sq < min_sleep_force_sq {
            velocity = Vec3::ZERO;
            speed_sq = 0.0;
        }

        vels[index] = velocity;
        positions[index] += velocity * time_step_scale;
        if speed_sq > 1e-6 {
            any_motion = true;
        }
    }

    velocities.clear();
    for (index, node) in graph.nodes.iter_mut().enumerate() {
        if !in_sim[index] {
            continue;
        }
        node.pos = node.pinned.unwrap_or(positions[index]);
        velocities.insert(node.id.clone(), vels[index]);
    }

    any_motion
}

#[cfg(test)]
mod tests {
    use crate::graph::{DEFAULT_LINK_COLOR, DEFAULT_NODE_COLOR, Link, Node};

    use super::*;

    fn node_at(id: &str, pos: Vec3) -> Node {
        Node {
            id: id.to_string(),
            color: DEFAULT_NODE_COLOR.to_string(),
            text_size: 6.0,
            group: None,
            pos,
            pinned: None,
        }
    }

    fn link(source: &str, target: &str) -> Link {
        Link {
            source: source.to_string(),
            target: target.to_string(),
            color: DEFAULT_LINK_COLOR.to_string(),
            thickness: 1.0,
        }
    }

    fn config() -> LayoutConfig {
        LayoutConfig {
            repulsion_scale: 1.0,
            spring_scale: 1.0,
            link_distance: 50.0,
            velocity_damping: 0.9,
            delta_seconds: 1.0 / 60.0,
        }
    }

    fn all_ids(graph: &MindGraph) -> HashSet<String> {
        graph.nodes.iter().map(|n| n.id.clone()).collect()
    }

    fn distance(graph: &MindGraph, a: &str, b: &str) -> f32 {
        graph.node(a).unwrap().pos.distance(graph.node(b).unwrap().pos)
    }

    #[test]
    fn test_linked_nodes_pull_toward_rest_length() {
        let mut graph = MindGraph::default();
        graph.add_node(node_at("a", Vec3::ZERO));
        graph.add_node(node_at("b", Vec3::new(300.0, 0.0, 0.0)));
        graph.add_link(link("a", "b"));
        let visible = all_ids(&graph);

        let mut sim = LayoutSim::new();
        let before = distance(&graph, "a", "b");
        for _ in 0..10 {
            sim.step(&mut graph, &visible, &config());
        }
        assert!(distance(&graph, "a", "b") < before);
    }

    #[test]
    fn test_unlinked_nodes_repel() {
        let mut graph = MindGraph::default();
        graph.add_node(node_at("a", Vec3::new(-4.0, 0.0, 0.0)));
        graph.add_node(node_at("b", Vec3::new(4.0, 0.0, 0.0)));
        let visible = all_ids(&graph);

        let mut sim = LayoutSim::new();
        let before = distance(&graph, "a", "b");
        sim.step(&mut graph, &visible, &config());
        assert!(distance(&graph, "a", "b") > before);
    }

    #[test]
    fn test_pinned_node_stays_put() {
        let mut graph = MindGraph::default();
        let mut anchor = node_at("anchor", Vec3::ZERO);
        anchor.pinned = Some(Vec3::ZERO);
        graph.add_node(anchor);
        graph.add_node(node_at("free", Vec3::new(10.0, 0.0, 0.0)));
        let visible = all_ids(&graph);

        let mut sim = LayoutSim::new();
        for _ in 0..5 {
            sim.step(&mut graph, &visible, &config());
        }
        assert_eq!(graph.node("anchor").unwrap().pos, Vec3::ZERO);
        assert!(graph.node("free").unwrap().pos.x > 10.0);
    }

    #[test]
    fn test_filtered_out_nodes_keep_their_positions() {
        let mut graph = MindGraph::default();
        graph.add_node(node_at("a", Vec3::new(-4.0, 0.0, 0.0)));
        graph.add_node(node_at("b", Vec3::new(4.0, 0.0, 0.0)));
        graph.add_node(node_at("hidden", Vec3::new(0.0, 1.0, 0.0)));
        graph.add_link(link("a", "hidden"));
        let visible: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();

        let mut sim = LayoutSim::new();
        sim.step(&mut graph, &visible, &config());
        assert_eq!(graph.node("hidden").unwrap().pos, Vec3::new(0.0, 1.0, 0.0));
        assert!(distance(&graph, "a", "b") > 8.0);
    }

    #[test]
    fn test_sim_sleeps_until_reheated() {
        let mut graph = MindGraph::default();
        let mut a = node_at("a", Vec3::ZERO);
        a.pinned = Some(Vec3::ZERO);
        let mut b = node_at("b", Vec3::new(50.0, 0.0, 0.0));
        b.pinned = Some(b.pos);
        graph.add_node(a);
        graph.add_node(b);
        let visible = all_ids(&graph);

        let mut sim = LayoutSim::new();
        assert!(!sim.step(&mut graph, &visible, &config()));
        assert!(!sim.step(&mut graph, &visible, &config()));

        graph.node_mut("b").unwrap().pinned = None;
        graph.node_mut("b").unwrap().pos = Vec3::new(5.0, 0.0, 0.0);
        assert!(!sim.step(&mut graph, &visible, &config()));
        sim.reheat();
        assert!(sim.step(&mut graph, &visible, &config()));
    }

    #[test]
    fn test_lone_visible_node_is_stable() {
        let mut graph = MindGraph::default();
        graph.add_node(node_at("only", Vec3::new(3.0, 2.0, 1.0)));
        let visible = all_ids(&graph);

        let mut sim = LayoutSim::new();
        assert!(!sim.step(&mut graph, &visible, &config()));
        assert_eq!(graph.node("only").unwrap().pos, Vec3::new(3.0, 2.0, 1.0));
    }
}
