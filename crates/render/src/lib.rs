//! Rendering core: camera, render queues and the flush pipeline.
//!
//! # Invariants
//! - Render queues are frame-scoped: empty before submission, empty after flush.
//! - Opaque items are fully drawn before any transparent item, each queue in FIFO order.
//! - GPU state changes go through [`GraphicsState`]; the sequencing lives here,
//!   the binding lives in a backend crate.
//!
//! The [`trace`] module provides a recording backend that implements every
//! contract without a GPU. It backs the tests and the CLI frame dump.

mod camera;
mod queue;
mod renderable;
mod renderer;
mod state;
pub mod trace;

pub use camera::{Camera, CameraMovement, MAX_PITCH};
pub use renderable::{Renderable, Shader};
pub use renderer::{
    model_matrix, FrameStats, RenderFrame, Renderer, MODEL_UNIFORM, STENCIL_MASK, STENCIL_REF,
};
pub use state::{
    BlendFactor, Capability, CompareFunc, GraphicsState, RenderState, StateCommand, StencilOp,
};

pub fn crate_info() -> &'static str {
    concat!("lumen-render v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
