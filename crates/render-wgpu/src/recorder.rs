use crate::mesh::MeshId;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use lumen_render::{
    BlendFactor, Capability, CompareFunc, GraphicsState, MODEL_UNIFORM, RenderState, Shader,
    StateCommand, StencilOp,
};
use std::cell::RefCell;

/// Shader programs known to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
    /// Lit, coloured surface.
    Main,
    /// Flat colour used for the outline fringe.
    Outline,
}

/// Per-draw uniform block, bound with a dynamic offset.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GpuCommand {
    Draw {
        program: Program,
        state: RenderState,
        /// Index into the frame's uniform list.
        slot: u32,
        mesh: MeshId,
    },
    ClearStencil,
}

/// Commands and uniforms captured for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedFrame {
    pub commands: Vec<GpuCommand>,
    pub uniforms: Vec<ModelUniform>,
}

impl RecordedFrame {
    /// Command runs separated by stencil clears. Always yields at least one
    /// (possibly empty) segment.
    pub fn segments(&self) -> impl Iterator<Item = &[GpuCommand]> {
        self.commands
            .split(|c| matches!(c, GpuCommand::ClearStencil))
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, GpuCommand::Draw { .. }))
            .count()
    }
}

/// Backend-side view of GPU state plus the current frame's recording.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    state: RenderState,
    active: Option<Program>,
    frame: RecordedFrame,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn active_program(&self) -> Option<Program> {
        self.active
    }

    pub fn frame(&self) -> &RecordedFrame {
        &self.frame
    }

    /// Hand over the recording and start an empty one. State is kept.
    pub fn take_frame(&mut self) -> RecordedFrame {
        std::mem::take(&mut self.frame)
    }

    fn apply(&mut self, command: StateCommand) {
        if command == StateCommand::ClearStencil {
            self.frame.commands.push(GpuCommand::ClearStencil);
        }
        self.state.apply(&command);
    }

    fn record_draw(&mut self, program: Program, uniform: ModelUniform, mesh: MeshId) {
        if self.active != Some(program) {
            tracing::trace!(?program, "draw issued while another program is enabled");
        }
        let slot = self.frame.uniforms.len() as u32;
        self.frame.uniforms.push(uniform);
        self.frame.commands.push(GpuCommand::Draw {
            program,
            state: self.state,
            slot,
            mesh,
        });
    }
}

/// [`GraphicsState`] backed by a [`FrameRecorder`].
pub struct WgpuState<'r> {
    recorder: &'r RefCell<FrameRecorder>,
}

impl<'r> WgpuState<'r> {
    pub fn new(recorder: &'r RefCell<FrameRecorder>) -> Self {
        Self { recorder }
    }

    fn apply(&mut self, command: StateCommand) {
        self.recorder.borrow_mut().apply(command);
    }
}

impl GraphicsState for WgpuState<'_> {
    fn enable(&mut self, capability: Capability) {
        self.apply(StateCommand::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.apply(StateCommand::Disable(capability));
    }

    fn stencil_op(&mut self, stencil_fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
        self.apply(StateCommand::StencilOp {
            stencil_fail,
            depth_fail,
            pass,
        });
    }

    fn stencil_func(&mut self, func: CompareFunc, reference: u32, mask: u32) {
        self.apply(StateCommand::StencilFunc {
            func,
            reference,
            mask,
        });
    }

    fn stencil_mask(&mut self, mask: u32) {
        self.apply(StateCommand::StencilMask(mask));
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.apply(StateCommand::BlendFunc { src, dst });
    }

    fn clear_stencil(&mut self) {
        self.apply(StateCommand::ClearStencil);
    }
}

/// Shader handle for one [`Program`].
///
/// Only the `model` uniform is consumed; the colour comes from the
/// renderable through [`WgpuShader::set_color`] unless the handle was built
/// with a fixed colour.
pub struct WgpuShader<'r> {
    program: Program,
    recorder: &'r RefCell<FrameRecorder>,
    model: Mat4,
    color: [f32; 4],
    fixed_color: Option<[f32; 4]>,
}

impl<'r> WgpuShader<'r> {
    pub fn new(program: Program, recorder: &'r RefCell<FrameRecorder>) -> Self {
        Self {
            program,
            recorder,
            model: Mat4::IDENTITY,
            color: [1.0; 4],
            fixed_color: None,
        }
    }

    /// Ignore colours set by renderables and always draw with `color`.
    pub fn with_fixed_color(mut self, color: [f32; 4]) -> Self {
        self.fixed_color = Some(color);
        self
    }

    pub fn program(&self) -> Program {
        self.program
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }

    pub fn draw_mesh(&mut self, mesh: MeshId) {
        let uniform = ModelUniform {
            model: self.model.to_cols_array_2d(),
            color: self.fixed_color.unwrap_or(self.color),
        };
        self.recorder
            .borrow_mut()
            .record_draw(self.program, uniform, mesh);
    }
}

impl Shader for WgpuShader<'_> {
    fn enable(&mut self) {
        self.recorder.borrow_mut().active = Some(self.program);
    }

    fn disable(&mut self) {
        let mut recorder = self.recorder.borrow_mut();
        if recorder.active == Some(self.program) {
            recorder.active = None;
        }
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4) {
        if name == MODEL_UNIFORM {
            self.model = *value;
        } else {
            tracing::trace!(name, "uniform not consumed by the wgpu backend");
        }
    }
}
