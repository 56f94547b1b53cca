use std::sync::atomic::{AtomicU64, Ordering};

use glam::{DMat4, DQuat, DVec2, DVec3, DVec4};

static NEXT_CAMERA_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one camera instance. Two cameras with identical poses still
/// have different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(u64);

/// Perspective camera in the galaxy frame (light-years).
/// Looks down its local -Z axis with +Y up.
#[derive(Debug)]
pub struct Camera3D {
    id: CameraId,
    /// Eye position in light-years.
    pub position: DVec3,
    /// World-from-camera rotation.
    pub orientation: DQuat,
    /// Vertical field of view in radians.
    pub fov_y: f64,
    /// Viewport size in pixels.
    pub viewport: DVec2,
    /// Near clip distance.
    pub near: f64,
    /// Far clip distance.
    pub far: f64,
}

/// Everything that determines where a star lands on screen, captured at one
/// instant. A pick grid is only valid against an identical sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSample {
    pub camera: CameraId,
    pub position: DVec3,
    pub orientation: DQuat,
    pub fov_y: f64,
    pub viewport: DVec2,
    pub near: f64,
    pub far: f64,
}

impl CameraSample {
    /// Whether the projection parameters (not the pose) differ.
    pub fn projection_differs(&self, other: &CameraSample) -> bool {
        self.fov_y != other.fov_y
            || self.viewport != other.viewport
            || self.near != other.near
            || self.far != other.far
    }

    /// Build the projector this sample describes.
    pub fn projector(&self) -> ScreenProjector {
        let aspect = if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        };
        let projection = DMat4::perspective_rh(self.fov_y, aspect, self.near, self.far);
        let view = DMat4::from_rotation_translation(self.orientation, self.position).inverse();
        ScreenProjector {
            view_projection: projection * view,
            viewport: self.viewport,
        }
    }
}

impl Camera3D {
    pub fn new(viewport_width: f64, viewport_height: f64, fov_y: f64) -> Self {
        Self {
            id: CameraId(NEXT_CAMERA_ID.fetch_add(1, Ordering::Relaxed)),
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            fov_y,
            viewport: DVec2::new(viewport_width, viewport_height),
            near: 0.01,
            far: 200_000.0,
        }
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    /// Snapshot the current pose and projection.
    pub fn sample(&self) -> CameraSample {
        CameraSample {
            camera: self.id,
            position: self.position,
            orientation: self.orientation,
            fov_y: self.fov_y,
            viewport: self.viewport,
            near: self.near,
            far: self.far,
        }
    }

    pub fn projector(&self) -> ScreenProjector {
        self.sample().projector()
    }

    pub fn set_pose(&mut self, position: DVec3, orientation: DQuat) {
        self.position = position;
        self.orientation = orientation.normalize();
    }

    /// Resize the viewport (e.g. on window resize).
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = DVec2::new(width, height);
    }

    /// Turn the camera to face `target`. Keeps `up` as close to +Y as possible.
    pub fn look_at(&mut self, target: DVec3, up: DVec3) {
        let forward = target - self.position;
        if forward.length_squared() == 0.0 {
            return;
        }
        let view = DMat4::look_at_rh(self.position, target, up);
        self.orientation = DQuat::from_mat4(&view.inverse()).normalize();
    }

    /// Unit forward direction in world space.
    pub fn forward(&self) -> DVec3 {
        self.orientation * DVec3::NEG_Z
    }

    /// World-space ray through a screen pixel (origin at the eye).
    pub fn screen_ray(&self, screen: DVec2) -> (DVec3, DVec3) {
        let ndc_x = screen.x / self.viewport.x * 2.0 - 1.0;
        let ndc_y = 1.0 - screen.y / self.viewport.y * 2.0;
        let aspect = self.viewport.x / self.viewport.y;
        let half_h = (self.fov_y * 0.5).tan();
        let local = DVec3::new(ndc_x * half_h * aspect, ndc_y * half_h, -1.0);
        (self.position, (self.orientation * local).normalize())
    }

    /// The world point `distance` light-years along the ray through `screen`.
    pub fn unproject(&self, screen: DVec2, distance: f64) -> DVec3 {
        let (origin, direction) = self.screen_ray(screen);
        origin + direction * distance
    }
}

/// Cached view-projection for projecting many points against one camera sample.
#[derive(Debug, Clone, Copy)]
pub struct ScreenProjector {
    view_projection: DMat4,
    viewport: DVec2,
}

impl ScreenProjector {
    /// Screen position in pixels (origin top-left, y down) of a world point,
    /// or `None` if it falls outside the view frustum.
    pub fn project(&self, world: DVec3) -> Option<DVec2> {
        let clip: DVec4 = self.view_projection * world.extend(1.0);
        let w = clip.w;
        if !(w > 0.0) {
            return None;
        }
        if clip.x.abs() > w || clip.y.abs() > w || clip.z < 0.0 || clip.z > w {
            return None;
        }
        let ndc = DVec2::new(clip.x / w, clip.y / w);
        Some(DVec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }

    /// Frustum test without computing screen coordinates.
    pub fn in_frustum(&self, world: DVec3) -> bool {
        self.project(world).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera3D {
        Camera3D::new(800.0, 600.0, 60f64.to_radians())
    }

    #[test]
    fn point_ahead_projects_to_center() {
        let cam = camera();
        let screen = cam.projector().project(DVec3::new(0.0, 0.0, -10.0)).unwrap();
        assert!((screen - DVec2::new(400.0, 300.0)).length() < 1e-9);
    }

    #[test]
    fn point_behind_is_culled() {
        let cam = camera();
        assert!(cam.projector().project(DVec3::new(0.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn point_beyond_far_plane_is_culled() {
        let mut cam = camera();
        cam.far = 100.0;
        assert!(!cam.projector().in_frustum(DVec3::new(0.0, 0.0, -150.0)));
        assert!(cam.projector().in_frustum(DVec3::new(0.0, 0.0, -50.0)));
    }

    #[test]
    fn unproject_round_trips_through_project() {
        let mut cam = camera();
        cam.position = DVec3::new(100.0, -20.0, 5.0);
        cam.look_at(DVec3::new(140.0, 0.0, -30.0), DVec3::Y);
        let projector = cam.projector();
        for &(x, y) in &[(10.0, 10.0), (10.0, 40.0), (500.0, 500.0), (799.0, 1.0)] {
            let screen = DVec2::new(x, y);
            let world = cam.unproject(screen, 250.0);
            let back = projector.project(world).unwrap();
            assert!((back - screen).length() < 1e-6, "{:?} -> {:?}", screen, back);
        }
    }

    #[test]
    fn screen_y_grows_downward() {
        let cam = camera();
        let above = cam.projector().project(DVec3::new(0.0, 1.0, -10.0)).unwrap();
        assert!(above.y < 300.0);
    }

    #[test]
    fn look_at_faces_target() {
        let mut cam = camera();
        cam.position = DVec3::new(5.0, 0.0, 0.0);
        cam.look_at(DVec3::new(5.0, 0.0, 20.0), DVec3::Y);
        assert!((cam.forward() - DVec3::Z).length() < 1e-9);
    }

    #[test]
    fn identical_poses_have_distinct_ids() {
        let a = camera();
        let b = camera();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.sample(), b.sample());
    }

    #[test]
    fn projection_change_is_detected() {
        let mut cam = camera();
        let before = cam.sample();
        cam.resize(1024.0, 768.0);
        assert!(cam.sample().projection_differs(&before));
    }
}
