pub mod arrays;
pub mod camera;

pub use arrays::StarArrays;
pub use camera::{Camera3D, CameraId, CameraSample, ScreenProjector};
