//! Shared types and configuration for the lumen engine.
//!
//! # Invariants
//! - Configuration defaults are the engine's build-time constants.
//! - A loaded configuration is validated before it is handed out.

pub mod config;
pub mod types;

pub use config::{CameraConfig, ConfigError, EngineConfig, GraphicsConfig, OutlineConfig};
pub use types::Transform;

pub fn crate_info() -> &'static str {
    concat!("lumen-common v", env!("CARGO_PKG_VERSION"))
}
