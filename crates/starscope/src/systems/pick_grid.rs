use std::collections::HashMap;

use glam::DVec2;

use crate::api::types::CatalogTag;
use crate::core::catalog::Catalog;
use crate::renderer::camera::{Camera3D, CameraSample, ScreenProjector};
use crate::systems::geometry::{search_radius_cells, GridCell};

/// One projected star: which catalog, which index, where on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickEntry {
    pub tag: CatalogTag,
    pub index: usize,
    pub screen: DVec2,
}

/// Both catalogs paired with their tags, Structural first.
pub fn tagged<'a>(structural: &'a Catalog, local: &'a Catalog) -> [(CatalogTag, &'a Catalog); 2] {
    [(CatalogTag::Structural, structural), (CatalogTag::Local, local)]
}

/// Project every in-frustum star of both catalogs. Order is catalog order,
/// Structural before Local.
pub fn project_visible(
    projector: &ScreenProjector,
    structural: &Catalog,
    local: &Catalog,
) -> Vec<PickEntry> {
    let mut entries = Vec::new();
    for (tag, catalog) in tagged(structural, local) {
        for (index, star) in catalog.iter().enumerate() {
            if let Some(screen) = projector.project(star.position) {
                entries.push(PickEntry { tag, index, screen });
            }
        }
    }
    entries
}

/// Screen-space spatial hash over the projected stars of both catalogs.
///
/// Built from scratch for one camera sample and never updated in place.
/// Only valid while the camera instance, its pose, its projection and both
/// catalog epochs are exactly what the grid was built against.
#[derive(Debug, Clone)]
pub struct PickGrid {
    cell_size: f64,
    cells: HashMap<GridCell, Vec<PickEntry>>,
    sample: CameraSample,
    structural_epoch: u64,
    local_epoch: u64,
    entries: usize,
    /// Smallest and largest occupied cell, `None` when the grid is empty.
    bounds: Option<(GridCell, GridCell)>,
}

impl PickGrid {
    pub fn build(
        sample: CameraSample,
        structural: &Catalog,
        local: &Catalog,
        cell_size: f64,
    ) -> Self {
        let projector = sample.projector();
        let visible = project_visible(&projector, structural, local);
        let entries = visible.len();
        let mut cells: HashMap<GridCell, Vec<PickEntry>> = HashMap::new();
        let mut bounds: Option<(GridCell, GridCell)> = None;
        for entry in visible {
            let cell = GridCell::containing(entry.screen, cell_size);
            bounds = Some(match bounds {
                None => (cell, cell),
                Some((min, max)) => (
                    GridCell {
                        x: min.x.min(cell.x),
                        y: min.y.min(cell.y),
                    },
                    GridCell {
                        x: max.x.max(cell.x),
                        y: max.y.max(cell.y),
                    },
                ),
            });
            cells.entry(cell).or_default().push(entry);
        }
        Self {
            cell_size,
            cells,
            sample,
            structural_epoch: structural.epoch(),
            local_epoch: local.epoch(),
            entries,
            bounds,
        }
    }

    /// Whether this grid may answer picks for `camera` over these catalogs.
    pub fn is_valid_for(&self, camera: &Camera3D, structural: &Catalog, local: &Catalog) -> bool {
        self.sample == camera.sample()
            && self.structural_epoch == structural.epoch()
            && self.local_epoch == local.epoch()
    }

    /// Entries in the square cell neighborhood around `screen` that can hold
    /// a star within `threshold_px`. Every entry lives in exactly one bucket,
    /// so distinct cells yield distinct (tag, index) pairs.
    ///
    /// The neighborhood is clipped to the occupied cells. When it still spans
    /// more cells than there are buckets, the buckets are walked instead.
    pub fn candidates(&self, screen: DVec2, threshold_px: f64) -> Vec<PickEntry> {
        let Some((min, max)) = self.bounds else {
            return Vec::new();
        };
        let center = GridCell::containing(screen, self.cell_size);
        let radius = search_radius_cells(threshold_px, self.cell_size);
        let lo = GridCell {
            x: (center.x - radius).max(min.x),
            y: (center.y - radius).max(min.y),
        };
        let hi = GridCell {
            x: (center.x + radius).min(max.x),
            y: (center.y + radius).min(max.y),
        };
        if lo.x > hi.x || lo.y > hi.y {
            return Vec::new();
        }

        let mut found = Vec::new();
        let span = (hi.x - lo.x + 1) as u128 * (hi.y - lo.y + 1) as u128;
        if span > self.cells.len() as u128 {
            for (cell, bucket) in &self.cells {
                if (lo.x..=hi.x).contains(&cell.x) && (lo.y..=hi.y).contains(&cell.y) {
                    found.extend_from_slice(bucket);
                }
            }
            return found;
        }
        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                if let Some(bucket) = self.cells.get(&GridCell { x, y }) {
                    found.extend_from_slice(bucket);
                }
            }
        }
        found
    }

    pub fn bucket(&self, cell: GridCell) -> &[PickEntry] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether two grids hold identical buckets.
    pub fn same_buckets(&self, other: &PickGrid) -> bool {
        self.cell_size == other.cell_size && self.cells == other.cells
    }

    pub fn sample(&self) -> &CameraSample {
        &self.sample
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }
}
