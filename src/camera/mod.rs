use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::vec3::Vec3;

const PRESET_DISTANCE: f32 = 400.0;
const FOCUS_STANDOFF: f32 = 40.0;
const MIN_DOLLY_DISTANCE: f32 = 5.0;

/// How close an orbit may get to straight above/below the target before
/// the up vector would flip.
const POLE_MARGIN: f32 = 0.05;

pub const BOOKMARK_APPLY_MS: f32 = 2000.0;
pub const FOCUS_MS: f32 = 3000.0;
pub const ADD_NODE_FOCUS_MS: f32 = 1500.0;
const ZOOM_OUT_MS: f32 = 3000.0;

/// Live camera state. The pose belongs to the rendering side; session
/// operations that need it receive it as an argument.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub zoom: f32,
    pub orthographic: bool,
}

impl Default for CameraPose {
    fn default() -> CameraPose {
        CameraPose {
            position: Vec3::new(0.0, 0.0, 500.0),
            look_at: Vec3::ZERO,
            up: Vec3::UP,
            zoom: 1.0,
            orthographic: false,
        }
    }
}

impl CameraPose {
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalized_or(Vec3::new(0.0, 0.0, -1.0))
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.look_at)
    }

    /// Unit right/up/forward triple spanning the view plane. The returned
    /// up is re-orthogonalized against forward, so it is safe even when
    /// the stored up vector drifts.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = self.forward();
        let right = forward.cross(self.up).normalized_or(Vec3::new(1.0, 0.0, 0.0));
        let up = right.cross(forward);
        (right, up, forward)
    }

    /// Orbit the position around the look-at point. Positive yaw swings
    /// around the vertical axis, positive pitch raises the camera; the
    /// elevation stays clear of the poles so up never flips.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.position - self.look_at;
        let radius = offset.length();
        if radius < 1e-4 {
            return;
        }
        let azimuth = offset.x.atan2(offset.z) - yaw;
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let polar = (polar - pitch).clamp(POLE_MARGIN, PI - POLE_MARGIN);
        let (sin_polar, cos_polar) = polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = azimuth.sin_cos();
        self.position = self.look_at
            + Vec3::new(
                radius * sin_polar * sin_azimuth,
                radius * cos_polar,
                radius * sin_polar * cos_azimuth,
            );
    }

    /// Slide the camera and its target together along the view plane.
    pub fn pan(&mut self, right_amount: f32, up_amount: f32) {
        let (right, up, _) = self.basis();
        let delta = right * right_amount + up * up_amount;
        self.position += delta;
        self.look_at += delta;
    }

    /// Multiplicative move along the view ray; factor below 1 gets closer,
    /// never inside [`MIN_DOLLY_DISTANCE`].
    pub fn dolly(&mut self, factor: f32) {
        let offset = self.position - self.look_at;
        let radius = offset.length();
        if radius < 1e-4 {
            return;
        }
        let next = (radius * factor).max(MIN_DOLLY_DISTANCE);
        self.position = self.look_at + offset * (next / radius);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraBookmark {
    pub name: String,
    pub position: Vec3,
    #[serde(rename = "lookAt")]
    pub look_at: Vec3,
    pub up: Vec3,
    pub zoom: f32,
    #[serde(rename = "isOrthographic")]
    pub is_orthographic: bool,
}

impl CameraBookmark {
    pub fn capture(name: &str, pose: &CameraPose) -> CameraBookmark {
        CameraBookmark {
            name: name.to_string(),
            position: pose.position,
            look_at: pose.look_at,
            up: pose.up,
            zoom: pose.zoom,
            is_orthographic: pose.orthographic,
        }
    }
}

/// Upsert by exact name: an existing entry is dropped and the fresh
/// capture appended, so the list stays unique by name with the most
/// recent capture last. Returns whether a bookmark was replaced.
pub fn upsert_bookmark(list: &mut Vec<CameraBookmark>, bookmark: CameraBookmark) -> bool {
    let existing = list.iter().position(|b| b.name == bookmark.name);
    if let Some(index) = existing {
        list.remove(index);
    }
    list.push(bookmark);
    existing.is_some()
}

/// Removing an absent name is a silent no-op; returns whether it existed.
pub fn remove_bookmark(list: &mut Vec<CameraBookmark>, name: &str) -> bool {
    let before = list.len();
    list.retain(|b| b.name != name);
    list.len() != before
}

pub fn find_bookmark<'a>(list: &'a [CameraBookmark], name: &str) -> Option<&'a CameraBookmark> {
    list.iter().find(|b| b.name == name)
}

/// Timed interpolation of position and look-at. Up vector, zoom and the
/// projection flag are never interpolated; callers set those immediately
/// when the travel starts.
#[derive(Clone, Debug)]
pub struct CameraTransition {
    from_position: Vec3,
    from_look_at: Vec3,
    to_position: Vec3,
    to_look_at: Vec3,
    elapsed: f32,
    duration: f32,
}

impl CameraTransition {
    pub fn new(
        pose: &CameraPose,
        to_position: Vec3,
        to_look_at: Vec3,
        duration_ms: f32,
    ) -> CameraTransition {
        CameraTransition {
            from_position: pose.position,
            from_look_at: pose.look_at,
            to_position,
            to_look_at,
            elapsed: 0.0,
            duration: (duration_ms / 1000.0).max(f32::EPSILON),
        }
    }

    /// Advances by dt seconds and writes the tweened pose. Returns true
    /// once the destination is reached.
    pub fn advance(&mut self, dt: f32, pose: &mut CameraPose) -> bool {
        self.elapsed += dt;
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        let eased = ease_in_out_cubic(t);
        pose.position = self.from_position.lerp(self.to_position, eased);
        pose.look_at = self.from_look_at.lerp(self.to_look_at, eased);
        t >= 1.0
    }
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// Focus flight toward a node: stand off a fixed distance beyond it along
/// the origin ray, looking at the node. A node at the origin gets the
/// axis-aligned special case.
pub fn focus_on(pose: &CameraPose, node_pos: Vec3, duration_ms: f32) -> CameraTransition {
    let len = node_pos.length();
    let to_position = if len > 1e-4 {
        node_pos * (1.0 + FOCUS_STANDOFF / len)
    } else {
        Vec3::new(0.0, 0.0, FOCUS_STANDOFF)
    };
    CameraTransition::new(pose, to_position, node_pos, duration_ms)
}

pub fn zoom_out(pose: &CameraPose) -> CameraTransition {
    let home = CameraPose::default();
    CameraTransition::new(pose, home.position, home.look_at, ZOOM_OUT_MS)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresetView {
    Top,
    Bottom,
    Front,
    Back,
    Left,
    Right,
    Isometric,
}

impl PresetView {
    pub const ALL: [PresetView; 7] = [
        PresetView::Top,
        PresetView::Bottom,
        PresetView::Front,
        PresetView::Back,
        PresetView::Left,
        PresetView::Right,
        PresetView::Isometric,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PresetView::Top => "top",
            PresetView::Bottom => "bottom",
            PresetView::Front => "front",
            PresetView::Back => "back",
            PresetView::Left => "left",
            PresetView::Right => "right",
            PresetView::Isometric => "isometric",
        }
    }

    pub fn position(self) -> Vec3 {
        let d = PRESET_DISTANCE;
        match self {
            PresetView::Top => Vec3::new(0.0, d, 0.0),
            PresetView::Bottom => Vec3::new(0.0, -d, 0.0),
            PresetView::Front => Vec3::new(0.0, 0.0, d),
            PresetView::Back => Vec3::new(0.0, 0.0, -d),
            PresetView::Left => Vec3::new(-d, 0.0, 0.0),
            PresetView::Right => Vec3::new(d, 0.0, 0.0),
            PresetView::Isometric => Vec3::new(d * 0.7, d * 0.7, d * 0.7),
        }
    }
}

/// Preset views keep up/zoom/projection as they are and fly to a fixed
/// vantage over the origin.
pub fn preset_view(pose: &CameraPose, view: PresetView) -> CameraTransition {
    CameraTransition::new(pose, view.position(), Vec3::ZERO, BOOKMARK_APPLY_MS)
}

/// One auto-rotate step: orbit the position around the vertical axis
/// through the origin and keep looking at the center.
pub fn auto_rotate_step(pose: &mut CameraPose, speed: f32, dt: f32) {
    let angle = 0.5 * speed * dt;
    let (sin, cos) = angle.sin_cos();
    let p = pose.position;
    pose.position = Vec3::new(p.x * cos - p.z * sin, p.y, p.z * cos + p.x * sin);
    pose.look_at = Vec3::ZERO;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(name: &str, z: f32) -> CameraBookmark {
        CameraBookmark {
            name: name.to_string(),
            position: Vec3::new(0.0, 0.0, z),
            look_at: Vec3::ZERO,
            up: Vec3::UP,
            zoom: 1.0,
            is_orthographic: false,
        }
    }

    #[test]
    fn test_recapture_replaces_instead_of_duplicating() {
        let mut list = Vec::new();
        assert!(!upsert_bookmark(&mut list, bookmark("v1", 100.0)));
        assert!(upsert_bookmark(&mut list, bookmark("v1", 250.0)));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].position.z, 250.0);
    }

    #[test]
    fn test_upsert_moves_recaptured_entry_to_the_end() {
        let mut list = Vec::new();
        upsert_bookmark(&mut list, bookmark("a", 1.0));
        upsert_bookmark(&mut list, bookmark("b", 2.0));
        upsert_bookmark(&mut list, bookmark("a", 3.0));
        let names: Vec<_> = list.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_delete_absent_bookmark_is_a_no_op() {
        let mut list = vec![bookmark("keep", 1.0)];
        assert!(!remove_bookmark(&mut list, "missing"));
        assert_eq!(list.len(), 1);
        assert!(remove_bookmark(&mut list, "keep"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_transition_reaches_destination_exactly() {
        let mut pose = CameraPose::default();
        let mut travel =
            CameraTransition::new(&pose, Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 1000.0);
        assert!(!travel.advance(0.25, &mut pose));
        assert!(pose.position.x > 0.0 && pose.position.x < 10.0);
        assert!(travel.advance(10.0, &mut pose));
        assert_eq!(pose.position, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(pose.look_at, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_focus_stands_off_beyond_the_node() {
        let pose = CameraPose::default();
        let mut travel = focus_on(&pose, Vec3::new(0.0, 0.0, 100.0), 1.0);
        let mut end = pose;
        travel.advance(10.0, &mut end);
        assert_eq!(end.look_at, Vec3::new(0.0, 0.0, 100.0));
        assert_eq!(end.position.z, 140.0);

        let mut travel = focus_on(&pose, Vec3::ZERO, 1.0);
        travel.advance(10.0, &mut end);
        assert_eq!(end.position, Vec3::new(0.0, 0.0, FOCUS_STANDOFF));
    }

    #[test]
    fn test_auto_rotate_keeps_height_and_radius() {
        let mut pose = CameraPose::default();
        pose.position = Vec3::new(300.0, 50.0, 400.0);
        let radius = (pose.position.x * pose.position.x + pose.position.z * pose.position.z).sqrt();
        auto_rotate_step(&mut pose, 2.0, 0.016);
        assert_eq!(pose.position.y, 50.0);
        let after = (pose.position.x * pose.position.x + pose.position.z * pose.position.z).sqrt();
        assert!((radius - after).abs() < 0.01);
        assert_eq!(pose.look_at, Vec3::ZERO);
    }

    #[test]
    fn test_orbit_preserves_radius_and_target() {
        let mut pose = CameraPose::default();
        pose.position = Vec3::new(100.0, 80.0, 300.0);
        pose.look_at = Vec3::new(10.0, 0.0, -5.0);
        let radius = pose.distance();

        pose.orbit(0.7, -0.3);
        assert!((pose.distance() - radius).abs() < 0.01);
        assert_eq!(pose.look_at, Vec3::new(10.0, 0.0, -5.0));
        assert_eq!(pose.up, Vec3::UP);
    }

    #[test]
    fn test_orbit_pitch_stops_short_of_the_pole() {
        let mut pose = CameraPose::default();
        for _ in 0..50 {
            pose.orbit(0.0, 0.5);
        }
        let offset = pose.position - pose.look_at;
        let radius = offset.length();
        let lateral = (offset.x * offset.x + offset.z * offset.z).sqrt();
        assert!(lateral >= radius * POLE_MARGIN.sin() - 1e-3);
        assert!(offset.y > 0.0 && offset.y < radius);
    }

    #[test]
    fn test_pan_moves_position_and_target_together() {
        let mut pose = CameraPose::default();
        let gap = pose.look_at - pose.position;
        pose.pan(25.0, -10.0);
        assert_eq!(pose.look_at - pose.position, gap);
        assert!((pose.look_at.x - 25.0).abs() < 1e-4);
        assert!((pose.look_at.y + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_dolly_clamps_at_minimum_distance() {
        let mut pose = CameraPose::default();
        pose.dolly(0.5);
        assert!((pose.distance() - 250.0).abs() < 1e-3);
        pose.dolly(1e-6);
        assert!((pose.distance() - MIN_DOLLY_DISTANCE).abs() < 1e-3);
        pose.dolly(2.0);
        assert!((pose.distance() - MIN_DOLLY_DISTANCE * 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_bookmark_wire_names() {
        let value = serde_json::to_value(bookmark("v1", 400.0)).unwrap();
        assert!(value.get("lookAt").is_some());
        assert!(value.get("isOrthographic").is_some());
        assert!(value.get("look_at").is_none());
    }
}
