use std::collections::{HashMap, HashSet};

use eframe::egui::{self, Align2, Color32, FontId, PointerButton, Pos2, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::camera::CameraPose;
use crate::graph::{MindGraph, is_collapsed};
use crate::vec3::Vec3;

use super::render_utils::{
    LINK_FALLBACK_COLOR, NODE_FALLBACK_COLOR, Projected, Projector, blend_color, color_or,
    dim_color, draw_background, node_screen_radius,
};

mod interaction;
use interaction::{handle_camera_input, hovered_link, hovered_node};

const SELECTION_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const PICK_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const MATCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const COLLAPSED_RING_COLOR: Color32 = Color32::from_gray(150);

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Everything the canvas needs for one frame. The graph reference is the
/// already-filtered visible graph; mutations travel back through
/// [`SceneResponse`] instead of being applied here.
pub(super) struct SceneContext<'a> {
    pub(super) graph: &'a MindGraph,
    pub(super) camera: &'a mut CameraPose,
    pub(super) drag: &'a mut Option<NodeDrag>,
    pub(super) selected_node: Option<&'a str>,
    pub(super) selected_link: Option<(&'a str, &'a str)>,
    pub(super) link_picks: &'a [String],
    pub(super) collapsed: &'a HashSet<String>,
    pub(super) search: &'a str,
}

/// An in-flight left-drag of a node. The depth at grab time keeps the
/// node in its view plane when the projection momentarily loses it.
pub(super) struct NodeDrag {
    pub(super) id: String,
    depth: f32,
}

#[derive(Default)]
pub(super) struct SceneResponse {
    pub(super) clicked_node: Option<String>,
    pub(super) clicked_link: Option<(String, String)>,
    pub(super) dragged_node: Option<(String, Vec3)>,
    pub(super) released_node: Option<String>,
    pub(super) camera_moved: bool,
}

pub(super) fn show_scene(ui: &mut Ui, scene: SceneContext<'_>) -> SceneResponse {
    let mut out = SceneResponse::default();
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
    let painter = ui.painter_at(rect);
    draw_background(&painter, rect);

    let graph = scene.graph;
    let index_of: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect();

    // Hit tests run against the pose the user saw last frame.
    let projector = Projector::new(scene.camera, rect);
    let projected: Vec<Option<Projected>> =
        graph.nodes.iter().map(|node| projector.project(node.pos)).collect();
    let segments: Vec<(usize, Pos2, Pos2)> = graph
        .links
        .iter()
        .enumerate()
        .filter_map(|(link_index, link)| {
            let a = projected[*index_of.get(link.source.as_str())?].as_ref()?;
            let b = projected[*index_of.get(link.target.as_str())?].as_ref()?;
            Some((link_index, a.pos, b.pos))
        })
        .collect();

    let pointer = response.hover_pos();
    let hovered = pointer.and_then(|p| hovered_node(p, graph, &projected));
    let hovered_link_index = if hovered.is_none() {
        pointer.and_then(|p| hovered_link(p, &segments))
    } else {
        None
    };

    if response.drag_started_by(PointerButton::Primary)
        && let Some(index) = hovered
        && let Some(p) = projected[index].as_ref()
    {
        *scene.drag = Some(NodeDrag {
            id: graph.nodes[index].id.clone(),
            depth: p.depth,
        });
    }

    if response.dragged_by(PointerButton::Primary)
        && let Some(drag) = scene.drag.as_ref()
    {
        if let Some(node) = graph.node(&drag.id) {
            let depth = projector
                .project(node.pos)
                .map(|p| p.depth)
                .unwrap_or(drag.depth);
            let pos = node.pos + projector.screen_delta_to_world(response.drag_delta(), depth);
            out.dragged_node = Some((drag.id.clone(), pos));
        }
    } else {
        out.camera_moved = handle_camera_input(
            ui,
            rect,
            &response,
            &projector,
            scene.camera,
            scene.drag.is_some(),
        );
    }

    if response.drag_stopped_by(PointerButton::Primary)
        && let Some(drag) = scene.drag.take()
    {
        out.released_node = Some(drag.id);
    }

    if hovered.is_some() || hovered_link_index.is_some() {
        ui.output_mut(|output| {
            output.cursor_icon = egui::CursorIcon::PointingHand;
        });
    }

    if response.clicked_by(PointerButton::Primary) {
        if let Some(index) = hovered {
            out.clicked_node = Some(graph.nodes[index].id.clone());
        } else if let Some(link_index) = hovered_link_index
            && let Some(link) = graph.links.get(link_index)
        {
            out.clicked_link = Some((link.source.clone(), link.target.clone()));
        }
    }

    // Paint with the post-input pose so camera motion lands this frame.
    let projector = Projector::new(scene.camera, rect);
    let projected: Vec<Option<Projected>> =
        graph.nodes.iter().map(|node| projector.project(node.pos)).collect();

    let query = scene.search.trim();
    let matches: Option<HashSet<usize>> = if query.is_empty() {
        None
    } else {
        let matcher = SkimMatcherV2::default();
        Some(
            graph
                .nodes
                .iter()
                .enumerate()
                .filter_map(|(index, node)| {
                    fuzzy_match_score(&matcher, &node.id, query).map(|_| index)
                })
                .collect(),
        )
    };
    let search_active = matches.as_ref().is_some_and(|m| !m.is_empty());

    draw_links(&painter, &scene, &index_of, &projected);
    draw_nodes(&painter, &scene, &projected, hovered, &matches, search_active);

    if let Some(index) = hovered
        && let Some(node) = graph.nodes.get(index)
    {
        painter.text(
            rect.left_top() + vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            format!("{}  |  {}", node.id, node.group_label()),
            FontId::proportional(13.0),
            Color32::from_gray(240),
        );
    }

    out
}

fn draw_links(
    painter: &egui::Painter,
    scene: &SceneContext<'_>,
    index_of: &HashMap<&str, usize>,
    projected: &[Option<Projected>],
) {
    struct LinkDraw {
        start: Pos2,
        end: Pos2,
        width: f32,
        color: Color32,
        depth: f32,
        selected: bool,
    }

    let mut draws: Vec<LinkDraw> = scene
        .graph
        .links
        .iter()
        .filter_map(|link| {
            let a = projected[*index_of.get(link.source.as_str())?].as_ref()?;
            let b = projected[*index_of.get(link.target.as_str())?].as_ref()?;
            let scale = (a.scale + b.scale) * 0.5;
            let base = color_or(&link.color, LINK_FALLBACK_COLOR);
            Some(LinkDraw {
                start: a.pos,
                end: b.pos,
                width: (link.thickness * scale * 0.5).clamp(0.4, 12.0),
                // Stored link colors may carry alpha; links render opaque.
                color: Color32::from_rgb(base.r(), base.g(), base.b()),
                depth: a.depth.max(b.depth),
                selected: scene.selected_link
                    == Some((link.source.as_str(), link.target.as_str())),
            })
        })
        .collect();

    draws.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    for draw in draws {
        if draw.selected {
            painter.line_segment(
                [draw.start, draw.end],
                Stroke::new(draw.width + 3.0, SELECTION_COLOR.gamma_multiply(0.45)),
            );
        }
        painter.line_segment([draw.start, draw.end], Stroke::new(draw.width, draw.color));
    }
}

fn draw_nodes(
    painter: &egui::Painter,
    scene: &SceneContext<'_>,
    projected: &[Option<Projected>],
    hovered: Option<usize>,
    matches: &Option<HashSet<usize>>,
    search_active: bool,
) {
    let graph = scene.graph;
    let mut order: Vec<usize> = (0..graph.nodes.len())
        .filter(|&index| projected[index].is_some())
        .collect();
    order.sort_by(|a, b| {
        let da = projected[*a].as_ref().map(|p| p.depth).unwrap_or(0.0);
        let db = projected[*b].as_ref().map(|p| p.depth).unwrap_or(0.0);
        db.total_cmp(&da)
    });

    for index in order {
        let node = &graph.nodes[index];
        let Some(p) = projected[index].as_ref() else {
            continue;
        };
        let radius = node_screen_radius(node.text_size, p.scale);
        let base = color_or(&node.color, NODE_FALLBACK_COLOR);

        let is_selected = scene.selected_node == Some(node.id.as_str());
        let is_hovered = hovered == Some(index);
        let is_pick = scene.link_picks.iter().any(|pick| pick == &node.id);
        let is_match = matches.as_ref().is_some_and(|m| m.contains(&index));

        let color = if is_hovered {
            blend_color(base, Color32::WHITE, 0.25)
        } else if is_match {
            blend_color(base, MATCH_COLOR, 0.55)
        } else if search_active {
            dim_color(base, 0.35)
        } else {
            base
        };

        painter.circle_filled(p.pos, radius, color);
        // Collapsed roots stay visible and get a marker ring standing in
        // for the hidden subtree.
        if is_collapsed(scene.collapsed, &node.id) {
            painter.circle_stroke(p.pos, radius + 1.5, Stroke::new(1.5, COLLAPSED_RING_COLOR));
        }
        if is_selected {
            painter.circle_stroke(p.pos, radius + 3.0, Stroke::new(2.0, SELECTION_COLOR));
        }
        if is_pick {
            painter.circle_stroke(p.pos, radius + 5.5, Stroke::new(1.6, PICK_COLOR));
        }

        painter.text(
            p.pos + vec2(radius + 4.0, 0.0),
            Align2::LEFT_CENTER,
            &node.id,
            FontId::proportional((node.text_size * p.scale).clamp(9.0, 36.0)),
            color,
        );
    }
}
