pub mod runner;

pub use runner::{PickReadout, SelectorRunner};

use std::cell::RefCell;

use starscope::glam::{DQuat, DVec3};
use starscope::{CatalogTag, InputEvent, InteractionMode, SelectorConfig};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<SelectorRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the runner. Calls made before `starscope_init` are ignored
/// and yield `fallback`.
fn with_runner<R>(fallback: R, f: impl FnOnce(&mut SelectorRunner) -> R) -> R {
    RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(runner) => f(runner),
        None => fallback,
    })
}

fn tag_from_code(code: u32) -> CatalogTag {
    if code == 1 {
        CatalogTag::Local
    } else {
        CatalogTag::Structural
    }
}

/// Create the selector. `config_json` may be empty for defaults.
#[wasm_bindgen]
pub fn starscope_init(seed: u64, config_json: &str) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = if config_json.trim().is_empty() {
        SelectorConfig::default()
    } else {
        SelectorConfig::from_json(config_json).unwrap_or_else(|err| {
            log::warn!("invalid selector config ({}); using defaults", err);
            SelectorConfig::default()
        })
    };

    let runner = SelectorRunner::new(seed, config);
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("starscope: initialized with seed {}", seed);
}

#[wasm_bindgen]
pub fn starscope_tick(dt: f64) {
    with_runner((), |r| r.tick(dt));
}

#[wasm_bindgen]
pub fn starscope_reseed(seed: u64) {
    with_runner((), |r| r.reseed(seed));
}

// ---- Camera ----

#[wasm_bindgen]
pub fn starscope_set_camera(px: f64, py: f64, pz: f64, qx: f64, qy: f64, qz: f64, qw: f64) {
    let orientation = DQuat::from_xyzw(qx, qy, qz, qw);
    with_runner((), |r| r.set_camera_pose(DVec3::new(px, py, pz), orientation));
}

#[wasm_bindgen]
pub fn starscope_set_viewport(width: f64, height: f64, fov_y: f64) {
    with_runner((), |r| r.set_viewport(width, height, fov_y));
}

/// 0 = explore, 1 = flight animation, anything else = another view.
#[wasm_bindgen]
pub fn starscope_set_mode(mode: u32) {
    let mode = match mode {
        0 => InteractionMode::Explore,
        1 => InteractionMode::Flight,
        _ => InteractionMode::Elsewhere,
    };
    with_runner((), |r| r.set_mode(mode));
}

#[wasm_bindgen]
pub fn starscope_teleported() {
    with_runner((), |r| r.push_input(InputEvent::Teleported));
}

// ---- Picking (results readable after the next tick) ----

/// `threshold_px` <= 0 uses the configured pick radius.
#[wasm_bindgen]
pub fn starscope_pick_point(x: f64, y: f64, threshold_px: f64) {
    let threshold_px = (threshold_px > 0.0).then_some(threshold_px);
    with_runner((), |r| r.push_input(InputEvent::PointerPick { x, y, threshold_px }));
}

#[wasm_bindgen]
pub fn starscope_pick_ray(ox: f64, oy: f64, oz: f64, dx: f64, dy: f64, dz: f64) {
    with_runner((), |r| {
        r.push_input(InputEvent::RayPick {
            origin: [ox, oy, oz],
            direction: [dx, dy, dz],
        })
    });
}

#[wasm_bindgen]
pub fn starscope_last_pick_tag() -> i32 {
    with_runner(-1, |r| r.last_pick().tag)
}

#[wasm_bindgen]
pub fn starscope_last_pick_index() -> u32 {
    with_runner(0, |r| r.last_pick().index)
}

#[wasm_bindgen]
pub fn starscope_last_pick_id() -> u64 {
    with_runner(0, |r| r.last_pick().star_id)
}

#[wasm_bindgen]
pub fn starscope_last_pick_distance() -> f64 {
    with_runner(0.0, |r| r.last_pick().distance)
}

// ---- Renderer arrays (tag: 0 = Structural, 1 = Local) ----

#[wasm_bindgen]
pub fn starscope_arrays_version() -> u32 {
    with_runner(0, |r| r.arrays_version())
}

#[wasm_bindgen]
pub fn starscope_star_count(tag: u32) -> u32 {
    with_runner(0, |r| r.arrays(tag_from_code(tag)).len() as u32)
}

#[wasm_bindgen]
pub fn starscope_positions_ptr(tag: u32) -> *const f32 {
    with_runner(std::ptr::null(), |r| r.arrays(tag_from_code(tag)).positions_ptr())
}

/// Copy of the flat xyz positions, for hosts without SharedArrayBuffer.
#[wasm_bindgen]
pub fn starscope_positions_copy(tag: u32) -> js_sys::Float32Array {
    with_runner(js_sys::Float32Array::new_with_length(0), |r| {
        js_sys::Float32Array::from(r.arrays(tag_from_code(tag)).positions_flat())
    })
}

#[wasm_bindgen]
pub fn starscope_luminosities_ptr(tag: u32) -> *const f32 {
    with_runner(std::ptr::null(), |r| r.arrays(tag_from_code(tag)).luminosities_ptr())
}

#[wasm_bindgen]
pub fn starscope_temperatures_ptr(tag: u32) -> *const f32 {
    with_runner(std::ptr::null(), |r| r.arrays(tag_from_code(tag)).temperatures_ptr())
}

#[wasm_bindgen]
pub fn starscope_masses_ptr(tag: u32) -> *const f32 {
    with_runner(std::ptr::null(), |r| r.arrays(tag_from_code(tag)).masses_ptr())
}

/// Star ids, `star_count` entries of 8 bytes each.
#[wasm_bindgen]
pub fn starscope_ids_ptr(tag: u32) -> *const u64 {
    with_runner(std::ptr::null(), |r| r.arrays(tag_from_code(tag)).ids_ptr())
}

/// Star type name of one entry, for list views.
#[wasm_bindgen]
pub fn starscope_star_type(tag: u32, index: u32) -> String {
    with_runner(String::new(), |r| {
        r.arrays(tag_from_code(tag))
            .star_types
            .get(index as usize)
            .map(|s| s.to_string())
            .unwrap_or_default()
    })
}

#[wasm_bindgen]
pub fn starscope_galaxy_radius() -> f64 {
    with_runner(0.0, |r| r.selector().galaxy_radius())
}

#[wasm_bindgen]
pub fn starscope_estimated_total_stars() -> f64 {
    with_runner(0.0, |r| r.selector().estimated_total_stars() as f64)
}
