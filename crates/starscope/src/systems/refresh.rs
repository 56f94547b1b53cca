//! Local-set refresh controller.
//!
//! Watches the camera every frame and decides when the Local catalog must be
//! requeried and when the pick grid must be dropped or rebuilt:
//!
//! ```text
//!   Settled --motion--> Dirty --still for debounce, foreground--> Refreshing --> Settled
//!                        ^  |
//!                        +--+ motion (restarts debounce)
//! ```
//!
//! Requeries are gated by displacement from the last query center; grid
//! rebuilds happen on every settle. A pure rotation never requeries.

use glam::DVec3;

use crate::api::config::SelectorConfig;
use crate::core::time::Debounce;
use crate::renderer::camera::CameraSample;
use crate::systems::geometry::rotation_delta;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Settled,
    Dirty,
    Refreshing,
}

/// What the host is doing with the camera. Only `Explore` counts as the
/// foreground interaction mode in which settles are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Explore,
    /// Camera is mid flight animation.
    Flight,
    /// A different view context (system view, menus) owns the screen.
    Elsewhere,
}

impl InteractionMode {
    pub fn is_foreground(self) -> bool {
        matches!(self, InteractionMode::Explore)
    }
}

/// Work the selector must do this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefreshAction {
    Idle,
    /// Camera moved: the pick grid is no longer trustworthy.
    InvalidateGrid,
    /// Settled close to the last query center: rebuild the grid only.
    RebuildGrid,
    /// Settled far away, or a refresh was forced: requery Local around
    /// `center`, then rebuild the grid.
    Requery { center: DVec3 },
}

/// Controller-private state.
#[derive(Debug, Clone)]
struct RefreshState {
    /// Center of the last successful Local query.
    last_query_center: Option<DVec3>,
    /// Camera sample seen on the previous frame.
    reference: Option<CameraSample>,
    dirty: bool,
    forced: bool,
    debounce: Debounce,
}

#[derive(Debug, Clone)]
pub struct RefreshController {
    phase: RefreshPhase,
    state: RefreshState,
    refresh_distance: f64,
    position_epsilon: f64,
    rotation_epsilon: f64,
}

impl RefreshController {
    /// Starts dirty with a forced refresh pending, so the first settle loads
    /// the Local catalog.
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            phase: RefreshPhase::Dirty,
            state: RefreshState {
                last_query_center: None,
                reference: None,
                dirty: true,
                forced: true,
                debounce: Debounce::new(config.debounce_secs),
            },
            refresh_distance: config.refresh_distance_ly,
            position_epsilon: config.position_epsilon_ly,
            rotation_epsilon: config.rotation_epsilon,
        }
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    pub fn is_dirty(&self) -> bool {
        self.state.dirty
    }

    pub fn last_query_center(&self) -> Option<DVec3> {
        self.state.last_query_center
    }

    /// Force a Local requery at the next settle regardless of displacement
    /// (teleport, reseed).
    pub fn request_refresh(&mut self) {
        self.state.forced = true;
        self.state.dirty = true;
        if self.phase == RefreshPhase::Settled {
            self.phase = RefreshPhase::Dirty;
        }
    }

    /// Feed one frame's camera sample.
    pub fn observe(
        &mut self,
        sample: &CameraSample,
        dt: f64,
        mode: InteractionMode,
    ) -> RefreshAction {
        let moved = self.has_moved(sample);
        self.state.reference = Some(*sample);

        if moved {
            self.state.debounce.reset();
            self.state.dirty = true;
            self.phase = RefreshPhase::Dirty;
            return RefreshAction::InvalidateGrid;
        }
        if !self.state.dirty {
            return RefreshAction::Idle;
        }
        let settled = self.state.debounce.accumulate(dt);
        if !settled || !mode.is_foreground() {
            return RefreshAction::Idle;
        }

        self.phase = RefreshPhase::Refreshing;
        let position = sample.position;
        let displacement = self
            .state
            .last_query_center
            .map_or(f64::INFINITY, |center| center.distance(position));
        let action = if self.state.forced || displacement >= self.refresh_distance {
            RefreshAction::Requery { center: position }
        } else {
            log::debug!(
                "settled {:.3} ly from last query center; rebuilding grid only",
                displacement
            );
            RefreshAction::RebuildGrid
        };
        self.state.dirty = false;
        self.state.forced = false;
        action
    }

    /// Complete a `Refreshing` step. `queried_center` is the center the Local
    /// catalog was actually fetched at, or `None` if the gateway had no
    /// generator, in which case the next settle retries.
    pub fn finish(&mut self, action: RefreshAction, queried_center: Option<DVec3>) {
        if let RefreshAction::Requery { .. } = action {
            match queried_center {
                Some(center) => self.state.last_query_center = Some(center),
                None => self.state.forced = true,
            }
        }
        if self.phase == RefreshPhase::Refreshing {
            self.phase = RefreshPhase::Settled;
        }
    }

    /// Record a query done outside the settle cycle (initial priming) and
    /// mark the controller settled against `sample`.
    pub fn mark_queried(&mut self, sample: &CameraSample, center: DVec3) {
        self.state.reference = Some(*sample);
        self.state.last_query_center = Some(center);
        self.state.dirty = false;
        self.state.forced = false;
        self.state.debounce.reset();
        self.phase = RefreshPhase::Settled;
    }

    fn has_moved(&self, sample: &CameraSample) -> bool {
        let Some(reference) = &self.state.reference else {
            return true;
        };
        reference.camera != sample.camera
            || reference.position.distance(sample.position) > self.position_epsilon
            || rotation_delta(reference.orientation, sample.orientation) > self.rotation_epsilon
            || reference.projection_differs(sample)
    }
}
