pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod input;

pub use glam;

// Re-export key types at crate root for convenience
pub use api::config::SelectorConfig;
pub use api::selector::{Selection, StarSelector};
pub use api::types::{CatalogTag, RawStar, SelectionEvent, StarId, StarRecord, StarType};
pub use core::catalog::Catalog;
pub use core::gateway::{GatewayError, GeneratorGateway, StarGenerator};
pub use core::time::Debounce;
pub use renderer::arrays::StarArrays;
pub use renderer::camera::{Camera3D, CameraId, CameraSample, ScreenProjector};
pub use input::queue::{InputEvent, InputQueue};
pub use systems::geometry::GridCell;
pub use systems::pick_grid::{PickEntry, PickGrid};
pub use systems::point_pick::{PickPath, PointHit};
pub use systems::ray_pick::{adaptive_threshold, RayHit};
pub use systems::refresh::{InteractionMode, RefreshAction, RefreshController, RefreshPhase};

#[cfg(feature = "procedural")]
pub use core::galaxy::{GalaxyParams, ProceduralGalaxy};
