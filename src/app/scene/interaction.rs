use std::f32::consts::TAU;

use eframe::egui::{PointerButton, Pos2, Rect, Response, Ui, Vec2};

use crate::camera::CameraPose;
use crate::graph::MindGraph;

use super::super::render_utils::{Projected, Projector, node_screen_radius, segment_distance};

const NODE_HIT_SLACK: f32 = 4.0;
const LINK_HIT_SLACK: f32 = 6.0;
const SCROLL_ZOOM_RATE: f32 = 0.0018;
const MIN_ZOOM: f32 = 0.05;
const MAX_ZOOM: f32 = 8.0;

/// Nearest node under the pointer, by screen distance within its disc.
pub(super) fn hovered_node(
    pointer: Pos2,
    graph: &MindGraph,
    projected: &[Option<Projected>],
) -> Option<usize> {
    projected
        .iter()
        .enumerate()
        .filter_map(|(index, p)| {
            let p = p.as_ref()?;
            let radius = node_screen_radius(graph.nodes[index].text_size, p.scale) + NODE_HIT_SLACK;
            let distance = p.pos.distance(pointer);
            (distance <= radius).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

/// Nearest link segment within the hit slack. Node hits take priority,
/// so the caller only asks when no node is under the pointer.
pub(super) fn hovered_link(pointer: Pos2, segments: &[(usize, Pos2, Pos2)]) -> Option<usize> {
    segments
        .iter()
        .filter_map(|&(link_index, start, end)| {
            let distance = segment_distance(pointer, start, end);
            (distance <= LINK_HIT_SLACK).then_some((link_index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(link_index, _)| link_index)
}

/// Left drag orbits, right or middle drag pans in the look-at plane,
/// scroll dollies (or adjusts zoom in orthographic). Returns whether
/// the pose changed.
pub(super) fn handle_camera_input(
    ui: &Ui,
    rect: Rect,
    response: &Response,
    projector: &Projector,
    camera: &mut CameraPose,
    node_drag_active: bool,
) -> bool {
    let mut moved = false;

    if !node_drag_active && response.dragged_by(PointerButton::Primary) {
        let delta = response.drag_delta();
        if delta != Vec2::ZERO {
            let yaw = TAU * delta.x / rect.height();
            let pitch = TAU * delta.y / rect.height();
            camera.orbit(yaw, pitch);
            moved = true;
        }
    }

    if response.dragged_by(PointerButton::Secondary) || response.dragged_by(PointerButton::Middle)
    {
        let delta = response.drag_delta();
        if delta != Vec2::ZERO
            && let Some(center) = projector.project(camera.look_at)
        {
            // The world follows the pointer, so the camera slides the other way.
            camera.pan(-delta.x / center.scale, delta.y / center.scale);
            moved = true;
        }
    }

    if response.hovered() {
        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() > f32::EPSILON {
            if camera.orthographic {
                let factor = (1.0 + scroll * SCROLL_ZOOM_RATE).clamp(0.85, 1.15);
                camera.zoom = (camera.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
            } else {
                let factor = (1.0 - scroll * SCROLL_ZOOM_RATE).clamp(0.85, 1.15);
                camera.dolly(factor);
            }
            moved = true;
        }
    }

    moved
}
