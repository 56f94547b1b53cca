pub mod catalog;
#[cfg(feature = "procedural")]
pub mod galaxy;
pub mod gateway;
pub mod rng;
pub mod time;
