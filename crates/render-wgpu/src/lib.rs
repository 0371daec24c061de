//! wgpu render backend.
//!
//! The flush pipeline talks to [`WgpuState`] and [`WgpuShader`], which record
//! draws together with a snapshot of the render state they were issued under.
//! [`WgpuRenderer::render`] then replays the recording: each distinct state
//! maps to a cached pipeline, and every stencil clear starts a new render pass.
//!
//! # Invariants
//! - Render state persists across frames, like GPU context state.
//! - Recorded commands and uniforms are consumed by exactly one `render` call.

mod buffers;
mod gpu;
mod mesh;
mod pipeline;
mod recorder;
mod shaders;

pub use buffers::{IndexBuffer, VertexBuffer};
pub use gpu::WgpuRenderer;
pub use mesh::{GpuMesh, MeshData, MeshId, MeshRenderable, Vertex};
pub use pipeline::{PipelineCache, PipelineKey, StencilKey, DEPTH_FORMAT};
pub use recorder::{
    FrameRecorder, GpuCommand, ModelUniform, Program, RecordedFrame, WgpuShader, WgpuState,
};

pub fn crate_info() -> &'static str {
    concat!("lumen-render-wgpu v", env!("CARGO_PKG_VERSION"))
}
