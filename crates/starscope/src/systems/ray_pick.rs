use glam::DVec3;

use crate::api::types::StarRecord;
use crate::core::catalog::Catalog;
use crate::systems::geometry::ray_offset;

/// Result of a ray pick against the Structural catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub index: usize,
    pub star: StarRecord,
    /// Distance from the star to the ray.
    pub perpendicular: f64,
    /// Distance from the ray origin to the star.
    pub distance: f64,
    /// Ranking score, lower is better.
    pub score: f64,
}

/// Acceptance radius at `distance` from the ray origin. Grows linearly with
/// distance, floored at 1% of `threshold`.
pub fn adaptive_threshold(threshold: f64, distance: f64) -> f64 {
    threshold * (distance * 0.1).max(0.01)
}

/// Nearest star to a pointing ray. Always a full scan; the grid is not used.
///
/// Stars behind the origin are skipped, stars farther from the ray than the
/// adaptive threshold are rejected, and survivors are ranked by
/// `perpendicular + 0.01 * distance` so near stars win close calls.
pub fn pick_ray(
    catalog: &Catalog,
    origin: DVec3,
    direction: DVec3,
    threshold: f64,
) -> Option<RayHit> {
    let direction = direction.try_normalize()?;
    if !origin.is_finite() || !(threshold > 0.0) {
        return None;
    }
    let mut best: Option<RayHit> = None;
    for (index, star) in catalog.iter().enumerate() {
        let Some(offset) = ray_offset(star.position, origin, direction) else {
            continue;
        };
        if offset.perpendicular > adaptive_threshold(threshold, offset.from_origin) {
            continue;
        }
        let score = offset.perpendicular + 0.01 * offset.from_origin;
        if best.map_or(true, |b| score < b.score) {
            best = Some(RayHit {
                index,
                star: *star,
                perpendicular: offset.perpendicular,
                distance: offset.from_origin,
                score,
            });
        }
    }
    best
}
