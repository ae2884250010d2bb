use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::vec3::Vec3;

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Deterministic unit direction derived from an id, so spawn offsets and
/// seeded layouts are reproducible across runs.
pub fn stable_unit_dir(id: &str) -> Vec3 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let a = hasher.finish();
    a.hash(&mut hasher);
    let b = hasher.finish();

    let x = ((a & 0xffff_ffff) as f64 / u32::MAX as f64) as f32 * 2.0 - 1.0;
    let y = (((a >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32 * 2.0 - 1.0;
    let z = ((b & 0xffff_ffff) as f64 / u32::MAX as f64) as f32 * 2.0 - 1.0;
    Vec3::new(x, y, z).normalized_or(Vec3::new(1.0, 0.0, 0.0))
}
