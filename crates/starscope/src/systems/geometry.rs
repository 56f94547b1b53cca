use glam::{DQuat, DVec2, DVec3};

/// Integer screen-space grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub x: i64,
    pub y: i64,
}

/// Largest cell coordinate magnitude. Keeps `center ± radius` far from
/// `i64` overflow for any screen position or threshold.
pub const CELL_LIMIT: i64 = 1 << 48;

fn to_cell_coord(v: f64) -> i64 {
    // NaN casts to 0.
    v.clamp(-(CELL_LIMIT as f64), CELL_LIMIT as f64) as i64
}

impl GridCell {
    /// Cell containing a screen position.
    pub fn containing(screen: DVec2, cell_size: f64) -> Self {
        Self {
            x: to_cell_coord((screen.x / cell_size).floor()),
            y: to_cell_coord((screen.y / cell_size).floor()),
        }
    }
}

/// Neighborhood radius (in cells) that covers a pick threshold in pixels.
pub fn search_radius_cells(threshold_px: f64, cell_size: f64) -> i64 {
    to_cell_coord((threshold_px / cell_size).ceil()).max(0) + 1
}

/// Where a point sits relative to a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayOffset {
    /// Signed distance along the ray to the closest point.
    pub t: f64,
    /// Distance from the point to the closest point on the ray.
    pub perpendicular: f64,
    /// Straight-line distance from the ray origin to the point.
    pub from_origin: f64,
}

/// Offset of `point` from the ray `origin + t * direction`. `direction` must be unit length.
/// Returns `None` for points behind the origin.
pub fn ray_offset(point: DVec3, origin: DVec3, direction: DVec3) -> Option<RayOffset> {
    let to_point = point - origin;
    let t = to_point.dot(direction);
    if t < 0.0 {
        return None;
    }
    let closest = origin + direction * t;
    Some(RayOffset {
        t,
        perpendicular: point.distance(closest),
        from_origin: to_point.length(),
    })
}

/// `1 - |q0·q1|`: zero for identical orientations, grows with the rotation angle.
pub fn rotation_delta(a: DQuat, b: DQuat) -> f64 {
    1.0 - a.dot(b).abs().min(1.0)
}
