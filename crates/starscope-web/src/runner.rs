use starscope::{
    Camera3D, CatalogTag, InputEvent, InputQueue, InteractionMode, ProceduralGalaxy, Selection,
    SelectionEvent, SelectorConfig, StarArrays, StarSelector,
};
use starscope::glam::{DQuat, DVec3};

/// Outcome of the most recent pick, flattened for JS reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickReadout {
    /// -1 = no hit, 0 = Structural, 1 = Local.
    pub tag: i32,
    pub index: u32,
    pub star_id: u64,
    pub distance: f64,
}

impl PickReadout {
    const NONE: PickReadout = PickReadout {
        tag: -1,
        index: 0,
        star_id: 0,
        distance: 0.0,
    };

    fn from_selection(selection: &Selection) -> Self {
        match selection {
            Selection::Point(Some(hit)) => Self {
                tag: tag_code(hit.tag),
                index: hit.index as u32,
                star_id: hit.star.id.0,
                distance: hit.screen_distance,
            },
            Selection::Ray(Some(hit)) => Self {
                tag: tag_code(CatalogTag::Structural),
                index: hit.index as u32,
                star_id: hit.star.id.0,
                distance: hit.perpendicular,
            },
            Selection::Point(None) | Selection::Ray(None) => Self::NONE,
        }
    }
}

fn tag_code(tag: CatalogTag) -> i32 {
    match tag {
        CatalogTag::Structural => 0,
        CatalogTag::Local => 1,
    }
}

/// Owns the selector, the camera mirror and the renderer arrays.
///
/// The browser pushes camera poses and pick requests; `tick` applies them,
/// steps the refresh controller and refreshes the arrays whenever a catalog
/// is replaced.
pub struct SelectorRunner {
    selector: StarSelector<ProceduralGalaxy>,
    camera: Camera3D,
    input: InputQueue,
    structural_arrays: StarArrays,
    local_arrays: StarArrays,
    last_pick: PickReadout,
    /// Bumped whenever either array set changes, so JS knows to re-upload.
    arrays_version: u32,
    primed: bool,
}

impl SelectorRunner {
    pub fn new(seed: u64, config: SelectorConfig) -> Self {
        let selector = StarSelector::new(ProceduralGalaxy::new(seed), config);
        let mut runner = Self {
            camera: Camera3D::new(1280.0, 720.0, 60f64.to_radians()),
            structural_arrays: StarArrays::default(),
            local_arrays: StarArrays::default(),
            input: InputQueue::new(),
            last_pick: PickReadout::NONE,
            arrays_version: 0,
            primed: false,
            selector,
        };
        runner.sync_arrays();
        runner
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn set_camera_pose(&mut self, position: DVec3, orientation: DQuat) {
        self.camera.set_pose(position, orientation);
    }

    pub fn set_viewport(&mut self, width: f64, height: f64, fov_y: f64) {
        self.camera.resize(width, height);
        self.camera.fov_y = fov_y;
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.push_input(InputEvent::ModeChanged(mode));
    }

    pub fn reseed(&mut self, seed: u64) {
        self.selector.reseed(ProceduralGalaxy::new(seed));
        self.sync_arrays();
        log::info!("reseeded galaxy with seed {}", seed);
    }

    /// Run one frame: apply queued input, step refresh, refresh arrays.
    pub fn tick(&mut self, dt: f64) {
        if !self.primed {
            self.selector.prime(&self.camera);
            self.primed = true;
        }

        let selections = self.selector.handle_input(&self.camera, &mut self.input);
        if let Some(last) = selections.last() {
            self.last_pick = PickReadout::from_selection(last);
        }

        self.selector.update(&self.camera, dt);
        self.sync_arrays();
    }

    fn sync_arrays(&mut self) {
        for event in self.selector.drain_events() {
            match event {
                SelectionEvent::StructureLoaded { .. } => {
                    self.structural_arrays = self.selector.render_arrays(CatalogTag::Structural);
                    self.arrays_version = self.arrays_version.wrapping_add(1);
                }
                SelectionEvent::LocalReplaced { .. } => {
                    self.local_arrays = self.selector.render_arrays(CatalogTag::Local);
                    self.arrays_version = self.arrays_version.wrapping_add(1);
                }
                SelectionEvent::GridRebuilt { .. } => {}
            }
        }
    }

    pub fn arrays(&self, tag: CatalogTag) -> &StarArrays {
        match tag {
            CatalogTag::Structural => &self.structural_arrays,
            CatalogTag::Local => &self.local_arrays,
        }
    }

    pub fn arrays_version(&self) -> u32 {
        self.arrays_version
    }

    pub fn last_pick(&self) -> PickReadout {
        self.last_pick
    }

    pub fn selector(&self) -> &StarSelector<ProceduralGalaxy> {
        &self.selector
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> SelectorRunner {
        let config = SelectorConfig {
            structural_max_stars: 500,
            ..SelectorConfig::default()
        };
        let mut runner = SelectorRunner::new(7, config);
        runner.set_camera_pose(DVec3::new(26_000.0, 0.0, 0.0), DQuat::IDENTITY);
        runner
    }

    #[test]
    fn first_tick_primes_local_arrays() {
        let mut runner = runner();
        assert_eq!(runner.arrays(CatalogTag::Structural).len(), 500);
        runner.tick(0.016);
        assert_eq!(
            runner.arrays(CatalogTag::Local).len(),
            runner.selector().local().len()
        );
        assert!(runner.arrays_version() >= 2);
    }

    #[test]
    fn pick_readout_reports_miss() {
        let mut runner = runner();
        runner.tick(0.016);
        runner.push_input(InputEvent::RayPick {
            origin: [1.0e6, 1.0e6, 1.0e6],
            direction: [1.0, 0.0, 0.0],
        });
        runner.tick(0.016);
        assert_eq!(runner.last_pick().tag, -1);
    }

    #[test]
    fn local_star_straight_ahead_is_picked() {
        let mut runner = runner();
        runner.tick(0.016);
        let eye = runner.camera().position;
        let star = runner
            .selector()
            .local()
            .iter()
            .copied()
            .find(|s| s.position.distance(eye) > 0.5)
            .expect("seed 7 populates the Local catalog around the camera");

        let mut aim = Camera3D::new(1280.0, 720.0, 60f64.to_radians());
        aim.position = eye;
        aim.look_at(star.position, DVec3::Y);
        runner.set_camera_pose(aim.position, aim.orientation);

        runner.push_input(InputEvent::PointerPick {
            x: 640.0,
            y: 360.0,
            threshold_px: Some(0.5),
        });
        runner.tick(0.016);
        let readout = runner.last_pick();
        assert_eq!(readout.tag, 1);
        assert!(readout.distance < 0.5);
    }
}
