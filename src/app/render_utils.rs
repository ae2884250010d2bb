use eframe::egui::{Color32, Painter, Pos2, Rect, Vec2};

use crate::camera::CameraPose;
use crate::vec3::Vec3;

/// Vertical field of view of the perspective projection, in degrees.
const FOV_Y_DEGREES: f32 = 50.0;
const NEAR_PLANE: f32 = 0.1;

/// Accepts the color shapes that show up in stored documents: #RGB,
/// #RRGGBB, #RRGGBBAA, rgb(r, g, b) and rgba(r, g, b, a).
pub(super) fn parse_color(text: &str) -> Option<Color32> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }
    let body = text
        .strip_prefix("rgba")
        .or_else(|| text.strip_prefix("rgb"))?;
    let body = body.trim().strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = body.split(',').map(str::trim);
    let red = parts.next()?.parse::<f32>().ok()?;
    let green = parts.next()?.parse::<f32>().ok()?;
    let blue = parts.next()?.parse::<f32>().ok()?;
    let alpha = match parts.next() {
        Some(part) => part.parse::<f32>().ok()?,
        None => 1.0,
    };
    Some(Color32::from_rgba_unmultiplied(
        channel(red),
        channel(green),
        channel(blue),
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
    ))
}

fn channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if !hex.is_ascii() {
        return None;
    }
    let pair = |index: usize| u8::from_str_radix(&hex[index..index + 2], 16).ok();
    match hex.len() {
        3 => {
            let digit = |index: usize| {
                u8::from_str_radix(&hex[index..index + 1], 16)
                    .ok()
                    .map(|d| d * 17)
            };
            Some(Color32::from_rgb(digit(0)?, digit(1)?, digit(2)?))
        }
        6 => Some(Color32::from_rgb(pair(0)?, pair(2)?, pair(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            pair(0)?,
            pair(2)?,
            pair(4)?,
            pair(6)?,
        )),
        _ => None,
    }
}

pub(super) fn color_or(text: &str, fallback: Color32) -> Color32 {
    parse_color(text).unwrap_or(fallback)
}

pub(super) fn color_to_hex(color: Color32) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r(), color.g(), color.b())
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::BLACK);
}

/// Screen radius of a node whose label renders at `text_size` world units.
pub(super) fn node_screen_radius(text_size: f32, scale: f32) -> f32 {
    (text_size * scale * 0.5).clamp(2.5, 60.0)
}

/// Paint fallbacks for unparseable stored colors, matching the default
/// node and link colors documents are created with.
pub(super) const NODE_FALLBACK_COLOR: Color32 = Color32::from_rgb(0x1A, 0x75, 0xFF);
pub(super) const LINK_FALLBACK_COLOR: Color32 = Color32::from_rgb(240, 240, 240);

/// One frame's world-to-screen mapping for a camera pose. Perspective by
/// default; orthographic keeps the scale objects have at the look-at
/// distance, so switching projections does not jump sizes.
pub(super) struct Projector {
    eye: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    center: Pos2,
    focal: f32,
    ortho_scale: f32,
    orthographic: bool,
}

pub(super) struct Projected {
    pub(super) pos: Pos2,
    pub(super) depth: f32,
    pub(super) scale: f32,
}

impl Projector {
    pub(super) fn new(pose: &CameraPose, rect: Rect) -> Projector {
        let (right, up, forward) = pose.basis();
        let focal =
            0.5 * rect.height() / (FOV_Y_DEGREES.to_radians() * 0.5).tan() * pose.zoom.max(0.01);
        Projector {
            eye: pose.position,
            right,
            up,
            forward,
            center: rect.center(),
            focal,
            ortho_scale: focal / pose.distance().max(NEAR_PLANE),
            orthographic: pose.orthographic,
        }
    }

    fn scale_at(&self, depth: f32) -> f32 {
        if self.orthographic {
            self.ortho_scale
        } else {
            self.focal / depth
        }
    }

    /// None when the point sits behind the near plane.
    pub(super) fn project(&self, world: Vec3) -> Option<Projected> {
        let rel = world - self.eye;
        let depth = rel.dot(self.forward);
        if depth <= NEAR_PLANE {
            return None;
        }
        let scale = self.scale_at(depth);
        let x = rel.dot(self.right) * scale;
        let y = rel.dot(self.up) * scale;
        Some(Projected {
            pos: Pos2::new(self.center.x + x, self.center.y - y),
            depth,
            scale,
        })
    }

    /// World displacement that moves a point at the given depth by the
    /// given screen delta. The displacement lies in the view plane, so the
    /// depth of the moved point is unchanged.
    pub(super) fn screen_delta_to_world(&self, delta: Vec2, depth: f32) -> Vec3 {
        let scale = self.scale_at(depth.max(NEAR_PLANE)).max(1e-6);
        self.right * (delta.x / scale) + self.up * (-delta.y / scale)
    }
}

/// Distance from a point to the segment [a, b], for link hit tests.
pub(super) fn segment_distance(point: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq < 1e-6 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    fn frame() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(1280.0, 800.0))
    }

    #[test]
    fn test_parse_color_hex_forms() {
        assert_eq!(parse_color("#1A75FF"), Some(Color32::from_rgb(26, 117, 255)));
        assert_eq!(parse_color("#fff"), Some(Color32::from_rgb(255, 255, 255)));
        assert_eq!(
            parse_color("#F0F0F080"),
            Some(Color32::from_rgba_unmultiplied(240, 240, 240, 128))
        );
    }

    #[test]
    fn test_parse_color_functional_forms() {
        assert_eq!(
            parse_color("rgba(240, 240, 240, 1)"),
            Some(Color32::from_rgba_unmultiplied(240, 240, 240, 255))
        );
        assert_eq!(
            parse_color("rgb(10,20,30)"),
            Some(Color32::from_rgba_unmultiplied(10, 20, 30, 255))
        );
        assert_eq!(
            parse_color("rgba(0, 0, 0, 0.5)"),
            Some(Color32::from_rgba_unmultiplied(0, 0, 0, 128))
        );
    }

    #[test]
    fn test_parse_color_rejects_junk() {
        assert_eq!(parse_color("blue"), None);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("rgb(1,2)"), None);
        assert_eq!(parse_color("#ααα"), None);
        assert_eq!(color_or("junk", Color32::WHITE), Color32::WHITE);
    }

    #[test]
    fn test_color_to_hex_round_trips() {
        let hex = color_to_hex(Color32::from_rgb(26, 117, 255));
        assert_eq!(hex, "#1A75FF");
        assert_eq!(parse_color(&hex), Some(Color32::from_rgb(26, 117, 255)));
    }

    #[test]
    fn test_project_centers_the_look_at_point() {
        let pose = CameraPose::default();
        let projector = Projector::new(&pose, frame());

        let center = projector.project(Vec3::ZERO).unwrap();
        assert!((center.pos.x - 640.0).abs() < 1e-3);
        assert!((center.pos.y - 400.0).abs() < 1e-3);
        assert!((center.depth - 500.0).abs() < 1e-3);

        let right = projector.project(Vec3::new(10.0, 0.0, 0.0)).unwrap();
        assert!(right.pos.x > center.pos.x);
        let above = projector.project(Vec3::new(0.0, 10.0, 0.0)).unwrap();
        assert!(above.pos.y < center.pos.y);
    }

    #[test]
    fn test_project_culls_points_behind_the_camera() {
        let pose = CameraPose::default();
        let projector = Projector::new(&pose, frame());
        assert!(projector.project(Vec3::new(0.0, 0.0, 600.0)).is_none());
    }

    #[test]
    fn test_perspective_shrinks_with_depth_orthographic_does_not() {
        let mut pose = CameraPose::default();
        let projector = Projector::new(&pose, frame());
        let near = projector.project(Vec3::new(0.0, 0.0, 100.0)).unwrap();
        let far = projector.project(Vec3::new(0.0, 0.0, -100.0)).unwrap();
        assert!(near.scale > far.scale);

        pose.orthographic = true;
        let ortho = Projector::new(&pose, frame());
        let near = ortho.project(Vec3::new(0.0, 0.0, 100.0)).unwrap();
        let far = ortho.project(Vec3::new(0.0, 0.0, -100.0)).unwrap();
        assert!((near.scale - far.scale).abs() < 1e-6);
    }

    #[test]
    fn test_screen_delta_round_trips_through_projection() {
        let pose = CameraPose::default();
        let projector = Projector::new(&pose, frame());
        let start = Vec3::new(5.0, -3.0, 0.0);
        let before = projector.project(start).unwrap();

        let delta = vec2(24.0, -10.0);
        let moved = start + projector.screen_delta_to_world(delta, before.depth);
        let after = projector.project(moved).unwrap();

        assert!((after.pos.x - (before.pos.x + delta.x)).abs() < 1e-2);
        assert!((after.pos.y - (before.pos.y + delta.y)).abs() < 1e-2);
        assert!((after.depth - before.depth).abs() < 1e-3);
    }

    #[test]
    fn test_segment_distance() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert!((segment_distance(Pos2::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-5);
        assert!((segment_distance(Pos2::new(-4.0, 0.0), a, b) - 4.0).abs() < 1e-5);
        assert!((segment_distance(Pos2::new(5.0, 0.0), a, a) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_blend_and_dim() {
        let blended = blend_color(Color32::from_rgb(0, 0, 0), Color32::from_rgb(200, 100, 50), 0.5);
        assert_eq!(blended.r(), 100);
        assert_eq!(blended.g(), 50);
        assert_eq!(blended.b(), 25);

        let dimmed = dim_color(Color32::from_rgb(200, 100, 50), 0.5);
        assert_eq!(dimmed.r(), 100);
        assert!(dimmed.a() < 255);
    }
}
