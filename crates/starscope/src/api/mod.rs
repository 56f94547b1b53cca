pub mod config;
pub mod selector;
pub mod types;
