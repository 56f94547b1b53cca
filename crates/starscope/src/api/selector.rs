use glam::{DVec2, DVec3};

use crate::api::config::SelectorConfig;
use crate::api::types::{CatalogTag, SelectionEvent, StarId, StarRecord};
use crate::core::catalog::Catalog;
use crate::core::gateway::{GeneratorGateway, StarGenerator};
use crate::input::queue::{InputEvent, InputQueue};
use crate::renderer::arrays::StarArrays;
use crate::renderer::camera::Camera3D;
use crate::systems::pick_grid::PickGrid;
use crate::systems::point_pick::{self, PointHit};
use crate::systems::ray_pick::{self, RayHit};
use crate::systems::refresh::{InteractionMode, RefreshAction, RefreshController, RefreshPhase};

/// Outcome of one queued pick request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    Point(Option<PointHit>),
    Ray(Option<RayHit>),
}

/// Owner of the Structural and Local catalogs, the pick grid and the refresh
/// state. Everything runs synchronously inside `update`; a catalog is always
/// replaced before the grid is rebuilt against it, so picks never see a grid
/// and a catalog from different epochs.
pub struct StarSelector<G> {
    config: SelectorConfig,
    gateway: GeneratorGateway<G>,
    structural: Catalog,
    local: Catalog,
    grid: Option<PickGrid>,
    refresh: RefreshController,
    mode: InteractionMode,
    events: Vec<SelectionEvent>,
    local_queries: u64,
    grid_builds: u64,
}

impl<G: StarGenerator> StarSelector<G> {
    /// Create a selector and load the Structural catalog. The Local catalog
    /// loads at the first settle (or immediately via [`StarSelector::prime`]).
    pub fn new(generator: G, mut config: SelectorConfig) -> Self {
        config.sanitize();
        let gateway = GeneratorGateway::new(generator, &config);
        let mut selector = Self::with_gateway(gateway, config);
        selector.load_structure();
        selector
    }

    /// A selector with no generator yet. Both catalogs stay empty until
    /// [`StarSelector::reseed`] installs one.
    pub fn uninitialized(mut config: SelectorConfig) -> Self {
        config.sanitize();
        let gateway = GeneratorGateway::uninitialized(&config);
        Self::with_gateway(gateway, config)
    }

    fn with_gateway(gateway: GeneratorGateway<G>, config: SelectorConfig) -> Self {
        Self {
            refresh: RefreshController::new(&config),
            gateway,
            structural: Catalog::empty(0),
            local: Catalog::empty(0),
            grid: None,
            mode: InteractionMode::default(),
            events: Vec::new(),
            local_queries: 0,
            grid_builds: 0,
            config,
        }
    }

    /// Replace the generator (new seed or config), reload the Structural
    /// catalog and force a Local refresh at the next settle.
    pub fn reseed(&mut self, generator: G) {
        self.gateway.set_generator(generator);
        self.load_structure();
        self.refresh.request_refresh();
    }

    /// Reload the Structural catalog from the gateway.
    pub fn load_structure(&mut self) {
        self.structural = self.gateway.query_structure(self.config.structural_max_stars);
        self.grid = None;
        log::info!(
            "structure loaded: {} stars (epoch {}), estimated total {}",
            self.structural.len(),
            self.structural.epoch(),
            self.gateway.estimated_total_stars()
        );
        self.events.push(SelectionEvent::StructureLoaded {
            epoch: self.structural.epoch(),
            count: self.structural.len(),
        });
    }

    /// Query Local around the camera and build the grid right away, without
    /// waiting for a settle. Used on initial load.
    pub fn prime(&mut self, camera: &Camera3D) {
        let center = camera.position;
        let available = self.replace_local(center);
        self.rebuild_grid(camera);
        if available {
            self.refresh.mark_queried(&camera.sample(), center);
        }
    }

    /// Force a Local requery at the next settle (teleport).
    pub fn force_refresh(&mut self) {
        self.refresh.request_refresh();
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Per-frame step. Feeds the camera to the refresh controller and carries
    /// out whatever it decides.
    pub fn update(&mut self, camera: &Camera3D, dt: f64) -> RefreshAction {
        let action = self.refresh.observe(&camera.sample(), dt, self.mode);
        match action {
            RefreshAction::Idle => {}
            RefreshAction::InvalidateGrid => {
                self.grid = None;
            }
            RefreshAction::RebuildGrid => {
                self.rebuild_grid(camera);
                self.refresh.finish(action, None);
            }
            RefreshAction::Requery { center } => {
                let available = self.replace_local(center);
                self.rebuild_grid(camera);
                self.refresh.finish(action, available.then_some(center));
            }
        }
        action
    }

    /// Apply queued input and return the result of every pick request, in order.
    pub fn handle_input(&mut self, camera: &Camera3D, input: &mut InputQueue) -> Vec<Selection> {
        let mut selections = Vec::new();
        for event in input.drain() {
            match event {
                InputEvent::PointerPick { x, y, threshold_px } => {
                    let threshold = threshold_px.unwrap_or(self.config.pick_threshold_px);
                    let hit = self.pick_at(camera, DVec2::new(x, y), threshold);
                    selections.push(Selection::Point(hit));
                }
                InputEvent::RayPick { origin, direction } => {
                    let hit = self.pick_ray(
                        DVec3::from_array(origin),
                        DVec3::from_array(direction),
                        self.config.ray_threshold,
                    );
                    selections.push(Selection::Ray(hit));
                }
                InputEvent::Teleported => self.force_refresh(),
                InputEvent::ModeChanged(mode) => self.set_mode(mode),
            }
        }
        selections
    }

    /// Nearest star to a screen position, Local first. Uses the grid when it
    /// matches `camera`, otherwise scans every in-frustum star.
    pub fn pick_at(&self, camera: &Camera3D, screen: DVec2, threshold_px: f64) -> Option<PointHit> {
        point_pick::pick_at(
            self.grid.as_ref(),
            camera,
            &self.structural,
            &self.local,
            screen,
            threshold_px,
        )
    }

    /// Nearest Structural star to a pointing ray.
    pub fn pick_ray(&self, origin: DVec3, direction: DVec3, threshold: f64) -> Option<RayHit> {
        ray_pick::pick_ray(&self.structural, origin, direction, threshold)
    }

    /// Look a star up by id, Local catalog first.
    pub fn find_star(&self, id: StarId) -> Option<(CatalogTag, usize, &StarRecord)> {
        CatalogTag::PICK_PRIORITY.iter().find_map(|&tag| {
            self.catalog(tag)
                .find(id)
                .map(|(index, star)| (tag, index, star))
        })
    }

    pub fn catalog(&self, tag: CatalogTag) -> &Catalog {
        match tag {
            CatalogTag::Structural => &self.structural,
            CatalogTag::Local => &self.local,
        }
    }

    pub fn structural(&self) -> &Catalog {
        &self.structural
    }

    pub fn local(&self) -> &Catalog {
        &self.local
    }

    pub fn grid(&self) -> Option<&PickGrid> {
        self.grid.as_ref()
    }

    /// Renderer arrays for one catalog.
    pub fn render_arrays(&self, tag: CatalogTag) -> StarArrays {
        StarArrays::from_catalog(self.catalog(tag))
    }

    /// Take the notifications emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SelectionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn refresh_phase(&self) -> RefreshPhase {
        self.refresh.phase()
    }

    pub fn last_query_center(&self) -> Option<DVec3> {
        self.refresh.last_query_center()
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn galaxy_radius(&self) -> f64 {
        self.gateway.galaxy_radius()
    }

    pub fn estimated_total_stars(&self) -> u64 {
        self.gateway.estimated_total_stars()
    }

    /// Number of Local queries issued so far.
    pub fn local_queries(&self) -> u64 {
        self.local_queries
    }

    /// Number of pick grid builds so far.
    pub fn grid_builds(&self) -> u64 {
        self.grid_builds
    }

    /// Returns whether the gateway had a generator to query.
    fn replace_local(&mut self, center: DVec3) -> bool {
        let available = self.gateway.is_available();
        self.local = self.gateway.query_region(center, self.config.local_radius_ly);
        self.local_queries += 1;
        // The old grid indexes the previous snapshot.
        self.grid = None;
        log::info!(
            "local catalog replaced: {} stars around ({:.1}, {:.1}, {:.1}), epoch {}",
            self.local.len(),
            center.x,
            center.y,
            center.z,
            self.local.epoch()
        );
        self.events.push(SelectionEvent::LocalReplaced {
            epoch: self.local.epoch(),
            count: self.local.len(),
        });
        available
    }

    fn rebuild_grid(&mut self, camera: &Camera3D) {
        let grid = PickGrid::build(
            camera.sample(),
            &self.structural,
            &self.local,
            self.config.cell_size_px,
        );
        self.grid_builds += 1;
        log::debug!(
            "pick grid rebuilt: {} entries in {} cells",
            grid.entry_count(),
            grid.cell_count()
        );
        self.events.push(SelectionEvent::GridRebuilt {
            entries: grid.entry_count(),
        });
        self.grid = Some(grid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::RawStar;
    use crate::core::gateway::tests::{raw, FixedGenerator};
    use crate::systems::point_pick::PickPath;

    const DT: f64 = 0.1;

    fn camera() -> Camera3D {
        Camera3D::new(800.0, 600.0, 60f64.to_radians())
    }

    fn raw_at_pixels(cam: &Camera3D, id_base: u64, pixels: &[(f64, f64)]) -> Vec<RawStar> {
        pixels
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                let position = cam.unproject(DVec2::new(x, y), 100.0);
                raw(id_base + i as u64, position.to_array())
            })
            .collect()
    }

    fn run_frames(selector: &mut StarSelector<FixedGenerator>, cam: &Camera3D, frames: usize) {
        for _ in 0..frames {
            selector.update(cam, DT);
        }
    }

    fn selector_with(cam: &Camera3D) -> (StarSelector<FixedGenerator>, FixedGenerator) {
        let generator = FixedGenerator {
            structure: raw_at_pixels(
                cam,
                100,
                &[(10.0, 10.0), (10.0, 40.0), (500.0, 500.0), (101.0, 100.0)],
            ),
            nearby: raw_at_pixels(cam, 200, &[(100.0, 100.0)]),
            ..FixedGenerator::default()
        };
        (StarSelector::new(generator.clone(), SelectorConfig::default()), generator)
    }

    #[test]
    fn first_settle_loads_local_and_builds_grid() {
        let cam = camera();
        let (mut selector, generator) = selector_with(&cam);
        assert_eq!(selector.structural().len(), 4);
        assert!(selector.local().is_empty());

        run_frames(&mut selector, &cam, 5);
        assert_eq!(generator.nearby_calls.get(), 1);
        assert_eq!(selector.local().len(), 1);
        assert!(selector.grid().is_some());
        assert_eq!(selector.refresh_phase(), RefreshPhase::Settled);

        let events = selector.drain_events();
        assert!(matches!(events[0], SelectionEvent::StructureLoaded { count: 4, .. }));
        assert!(events.iter().any(|e| matches!(e, SelectionEvent::LocalReplaced { count: 1, .. })));
        assert!(events.iter().any(|e| matches!(e, SelectionEvent::GridRebuilt { .. })));
    }

    #[test]
    fn small_move_rebuilds_grid_without_requery() {
        let mut cam = camera();
        let (mut selector, generator) = selector_with(&cam);
        run_frames(&mut selector, &cam, 5);
        let builds = selector.grid_builds();

        cam.position.x += 0.5;
        selector.update(&cam, DT);
        assert!(selector.grid().is_none());
        run_frames(&mut selector, &cam, 5);

        assert_eq!(generator.nearby_calls.get(), 1);
        assert_eq!(selector.local_queries(), 1);
        assert_eq!(selector.grid_builds(), builds + 1);
        assert!(selector.grid().is_some());
    }

    #[test]
    fn large_move_requeries_local() {
        let mut cam = camera();
        let (mut selector, generator) = selector_with(&cam);
        run_frames(&mut selector, &cam, 5);

        cam.position.z -= 50.0;
        run_frames(&mut selector, &cam, 5);
        assert_eq!(generator.nearby_calls.get(), 2);
        assert_eq!(selector.last_query_center(), Some(cam.position));
    }

    #[test]
    fn continuous_motion_never_requeries() {
        let mut cam = camera();
        let (mut selector, generator) = selector_with(&cam);
        run_frames(&mut selector, &cam, 5);
        for _ in 0..50 {
            cam.position.x += 10.0;
            selector.update(&cam, DT);
        }
        assert_eq!(generator.nearby_calls.get(), 1);
        assert!(selector.grid().is_none());
    }

    #[test]
    fn picks_use_grid_once_settled_and_scan_while_moving() {
        let mut cam = camera();
        let (mut selector, _) = selector_with(&cam);
        run_frames(&mut selector, &cam, 5);

        let hit = selector.pick_at(&cam, DVec2::new(12.0, 12.0), 5.0).unwrap();
        assert_eq!(hit.star.id, StarId(100));
        assert_eq!(hit.path, PickPath::Grid);

        cam.orientation = glam::DQuat::from_rotation_y(0.05);
        selector.update(&cam, DT);
        let hit = selector.pick_at(&cam, DVec2::new(400.0, 300.0), 1000.0);
        assert_eq!(hit.map(|h| h.path), Some(PickPath::FullScan));
    }

    #[test]
    fn local_star_wins_over_nearby_structural() {
        let cam = camera();
        let (mut selector, _) = selector_with(&cam);
        run_frames(&mut selector, &cam, 5);
        let hit = selector.pick_at(&cam, DVec2::new(100.0, 100.0), 10.0).unwrap();
        assert_eq!(hit.tag, CatalogTag::Local);
        assert_eq!(hit.star.id, StarId(200));
    }

    #[test]
    fn ray_picks_structural_only() {
        let cam = camera();
        let (mut selector, _) = selector_with(&cam);
        run_frames(&mut selector, &cam, 5);
        let (origin, direction) = cam.screen_ray(DVec2::new(100.0, 100.0));
        let hit = selector.pick_ray(origin, direction, 0.1).unwrap();
        assert_eq!(hit.star.id, StarId(103));
    }

    #[test]
    fn uninitialized_selector_degrades_to_no_selection() {
        let cam = camera();
        let mut selector = StarSelector::<FixedGenerator>::uninitialized(SelectorConfig::default());
        run_frames(&mut selector, &cam, 10);
        assert!(selector.local().is_empty());
        assert!(selector.pick_at(&cam, DVec2::new(10.0, 10.0), 10.0).is_none());
        assert!(selector.pick_ray(DVec3::ZERO, DVec3::NEG_Z, 1.0).is_none());
        assert_eq!(selector.galaxy_radius(), 0.0);
    }

    #[test]
    fn reseed_reloads_structure_and_forces_requery() {
        let cam = camera();
        let (mut selector, generator) = selector_with(&cam);
        run_frames(&mut selector, &cam, 5);
        selector.drain_events();

        let replacement = FixedGenerator {
            structure: raw_at_pixels(&cam, 300, &[(50.0, 50.0)]),
            ..generator.clone()
        };
        selector.reseed(replacement);
        assert_eq!(selector.structural().len(), 1);
        run_frames(&mut selector, &cam, 5);
        assert_eq!(generator.nearby_calls.get(), 2);
    }

    #[test]
    fn prime_loads_immediately() {
        let cam = camera();
        let (mut selector, generator) = selector_with(&cam);
        selector.prime(&cam);
        assert_eq!(generator.nearby_calls.get(), 1);
        assert!(selector.grid().is_some());
        assert_eq!(selector.refresh_phase(), RefreshPhase::Settled);
        run_frames(&mut selector, &cam, 10);
        assert_eq!(generator.nearby_calls.get(), 1);
    }

    #[test]
    fn queued_input_is_applied_in_order() {
        let cam = camera();
        let (mut selector, _) = selector_with(&cam);
        run_frames(&mut selector, &cam, 5);

        let mut input = InputQueue::new();
        input.push(InputEvent::PointerPick { x: 12.0, y: 12.0, threshold_px: Some(5.0) });
        input.push(InputEvent::ModeChanged(InteractionMode::Flight));
        input.push(InputEvent::PointerPick { x: 700.0, y: 20.0, threshold_px: None });
        let selections = selector.handle_input(&cam, &mut input);

        assert!(input.is_empty());
        assert_eq!(selections.len(), 2);
        assert!(matches!(selections[0], Selection::Point(Some(h)) if h.star.id == StarId(100)));
        assert_eq!(selections[1], Selection::Point(None));
        assert_eq!(selector.mode(), InteractionMode::Flight);
    }

    #[test]
    fn find_star_prefers_local() {
        let cam = camera();
        let (mut selector, _) = selector_with(&cam);
        run_frames(&mut selector, &cam, 5);
        let (tag, index, _) = selector.find_star(StarId(200)).unwrap();
        assert_eq!((tag, index), (CatalogTag::Local, 0));
        assert_eq!(selector.find_star(StarId(102)).unwrap().0, CatalogTag::Structural);
        assert!(selector.find_star(StarId(9)).is_none());
    }

    #[test]
    fn render_arrays_follow_catalog_epochs() {
        let cam = camera();
        let (mut selector, _) = selector_with(&cam);
        run_frames(&mut selector, &cam, 5);
        let arrays = selector.render_arrays(CatalogTag::Local);
        assert_eq!(arrays.len(), 1);
        assert_eq!(arrays.epoch, selector.local().epoch());
    }

    #[test]
    fn unusable_config_values_fall_back_to_defaults() {
        let cam = camera();
        let (_, generator) = selector_with(&cam);
        let config = SelectorConfig {
            cell_size_px: 0.0,
            pick_threshold_px: f64::INFINITY,
            ray_threshold: f64::NAN,
            ..SelectorConfig::default()
        };
        let mut selector = StarSelector::new(generator, config);
        assert_eq!(selector.config().cell_size_px, 32.0);
        assert_eq!(selector.config().pick_threshold_px, 12.0);
        assert_eq!(selector.config().ray_threshold, 1.0);

        run_frames(&mut selector, &cam, 5);
        assert_eq!(selector.grid().map(|g| g.cell_size()), Some(32.0));
        let hit = selector.pick_at(&cam, DVec2::new(12.0, 12.0), 5.0).unwrap();
        assert_eq!(hit.path, PickPath::Grid);
        assert_eq!(hit.star.id, StarId(100));
    }
}
