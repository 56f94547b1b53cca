use glam::DVec2;

use crate::api::types::{CatalogTag, StarRecord};
use crate::core::catalog::Catalog;
use crate::renderer::camera::Camera3D;
use crate::systems::pick_grid::{project_visible, PickEntry, PickGrid};

/// Which candidate set answered a point pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPath {
    Grid,
    FullScan,
}

/// Result of a screen-space pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointHit {
    pub tag: CatalogTag,
    pub index: usize,
    pub star: StarRecord,
    /// Pixel distance from the query position to the star's projection.
    pub screen_distance: f64,
    pub path: PickPath,
}

/// Resolve `screen` to a single star, using `grid` when it is valid for this
/// camera and catalog pair and falling back to a full scan otherwise.
pub fn pick_at(
    grid: Option<&PickGrid>,
    camera: &Camera3D,
    structural: &Catalog,
    local: &Catalog,
    screen: DVec2,
    threshold_px: f64,
) -> Option<PointHit> {
    match grid {
        Some(grid) if grid.is_valid_for(camera, structural, local) => {
            pick_with_grid(grid, structural, local, screen, threshold_px)
        }
        _ => pick_full_scan(camera, structural, local, screen, threshold_px),
    }
}

/// Grid path: only the cell neighborhood around `screen` is considered.
/// The caller is responsible for having checked grid validity.
pub fn pick_with_grid(
    grid: &PickGrid,
    structural: &Catalog,
    local: &Catalog,
    screen: DVec2,
    threshold_px: f64,
) -> Option<PointHit> {
    if !query_is_usable(screen, threshold_px) {
        return None;
    }
    let candidates = grid.candidates(screen, threshold_px);
    resolve(&candidates, structural, local, screen, threshold_px, PickPath::Grid)
}

/// Fallback path: every in-frustum star of both catalogs, no pruning.
pub fn pick_full_scan(
    camera: &Camera3D,
    structural: &Catalog,
    local: &Catalog,
    screen: DVec2,
    threshold_px: f64,
) -> Option<PointHit> {
    if !query_is_usable(screen, threshold_px) {
        return None;
    }
    let candidates = project_visible(&camera.projector(), structural, local);
    resolve(&candidates, structural, local, screen, threshold_px, PickPath::FullScan)
}

fn query_is_usable(screen: DVec2, threshold_px: f64) -> bool {
    screen.is_finite() && threshold_px > 0.0
}

/// Source-prioritized resolution: Local candidates are evaluated first and
/// any Local hit wins outright, even over a closer Structural candidate.
/// Structural candidates are only considered when no Local one qualifies.
pub fn nearest_by_priority(
    candidates: &[PickEntry],
    screen: DVec2,
    threshold_px: f64,
) -> Option<(PickEntry, f64)> {
    CatalogTag::PICK_PRIORITY
        .iter()
        .find_map(|&tag| nearest_in_pass(candidates, tag, screen, threshold_px))
}

/// Closest candidate of one tag strictly within the threshold.
/// Exact ties go to the lower catalog index.
fn nearest_in_pass(
    candidates: &[PickEntry],
    tag: CatalogTag,
    screen: DVec2,
    threshold_px: f64,
) -> Option<(PickEntry, f64)> {
    let mut best: Option<(PickEntry, f64)> = None;
    for entry in candidates.iter().filter(|e| e.tag == tag) {
        let distance = entry.screen.distance(screen);
        if distance >= threshold_px {
            continue;
        }
        let better = match best {
            None => true,
            Some((current, d)) => distance < d || (distance == d && entry.index < current.index),
        };
        if better {
            best = Some((*entry, distance));
        }
    }
    best
}

fn resolve(
    candidates: &[PickEntry],
    structural: &Catalog,
    local: &Catalog,
    screen: DVec2,
    threshold_px: f64,
    path: PickPath,
) -> Option<PointHit> {
    let (entry, screen_distance) = nearest_by_priority(candidates, screen, threshold_px)?;
    let catalog = match entry.tag {
        CatalogTag::Structural => structural,
        CatalogTag::Local => local,
    };
    let star = *catalog.get(entry.index)?;
    Some(PointHit {
        tag: entry.tag,
        index: entry.index,
        star,
        screen_distance,
        path,
    })
}
