//! Recording backend: implements the graphics, shader and renderable
//! contracts without a GPU by appending every call to a shared event log.
//!
//! Used by the pipeline tests and by `lumen-cli trace`.

use crate::renderable::{Renderable, Shader};
use crate::renderer::MODEL_UNIFORM;
use crate::state::{
    BlendFactor, Capability, CompareFunc, GraphicsState, RenderState, StateCommand, StencilOp,
};
use glam::{Mat4, Vec3};
use lumen_common::Transform;
use std::cell::RefCell;
use std::rc::Rc;

/// A single recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    State(StateCommand),
    ShaderEnabled(String),
    ShaderDisabled(String),
    Uniform {
        shader: String,
        name: String,
        value: Mat4,
    },
    /// A renderable drew itself; `model` is the shader's model matrix at that time.
    Draw {
        shader: String,
        renderable: String,
        model: Mat4,
    },
}

/// Shared, single-threaded event log. Clones append to the same log.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Rc<RefCell<Vec<TraceEvent>>>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> TraceBackend {
        TraceBackend {
            trace: self.clone(),
            state: RenderState::default(),
        }
    }

    pub fn shader(&self, label: impl Into<String>) -> TraceShader {
        TraceShader {
            label: label.into(),
            trace: self.clone(),
            enabled: false,
            model: Mat4::IDENTITY,
        }
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// `(shader, renderable)` for every draw, in order.
    pub fn draws(&self) -> Vec<(String, String)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Draw {
                    shader, renderable, ..
                } => Some((shader.clone(), renderable.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn draw_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, TraceEvent::Draw { .. }))
            .count()
    }

    /// Human-readable dump, one numbered line per event.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for (i, event) in self.events.borrow().iter().enumerate() {
            let line = match event {
                TraceEvent::State(cmd) => format!("state    {cmd:?}"),
                TraceEvent::ShaderEnabled(label) => format!("enable   {label}"),
                TraceEvent::ShaderDisabled(label) => format!("disable  {label}"),
                TraceEvent::Uniform { shader, name, .. } => format!("uniform  {shader}.{name}"),
                TraceEvent::Draw {
                    shader,
                    renderable,
                    model,
                } => {
                    let (scale, _, translation) = model.to_scale_rotation_translation();
                    format!(
                        "draw     {renderable} via {shader} pos=({:.2}, {:.2}, {:.2}) scale=({:.3}, {:.3}, {:.3})",
                        translation.x, translation.y, translation.z, scale.x, scale.y, scale.z
                    )
                }
            };
            out.push_str(&format!("{i:>4}  {line}\n"));
        }
        out
    }

    fn push(&self, event: TraceEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// [`GraphicsState`] that records commands and tracks the resulting state.
#[derive(Debug)]
pub struct TraceBackend {
    trace: Trace,
    state: RenderState,
}

impl TraceBackend {
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    fn record(&mut self, command: StateCommand) {
        self.state.apply(&command);
        self.trace.push(TraceEvent::State(command));
    }
}

impl GraphicsState for TraceBackend {
    fn enable(&mut self, capability: Capability) {
        self.record(StateCommand::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.record(StateCommand::Disable(capability));
    }

    fn stencil_op(&mut self, stencil_fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
        self.record(StateCommand::StencilOp {
            stencil_fail,
            depth_fail,
            pass,
        });
    }

    fn stencil_func(&mut self, func: CompareFunc, reference: u32, mask: u32) {
        self.record(StateCommand::StencilFunc {
            func,
            reference,
            mask,
        });
    }

    fn stencil_mask(&mut self, mask: u32) {
        self.record(StateCommand::StencilMask(mask));
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.record(StateCommand::BlendFunc { src, dst });
    }

    fn clear_stencil(&mut self) {
        self.record(StateCommand::ClearStencil);
    }
}

/// [`Shader`] that records enable/disable and uniform uploads.
#[derive(Debug)]
pub struct TraceShader {
    label: String,
    trace: Trace,
    enabled: bool,
    model: Mat4,
}

impl TraceShader {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last value uploaded to the model uniform.
    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn record_draw(&mut self, renderable: &str) {
        self.trace.push(TraceEvent::Draw {
            shader: self.label.clone(),
            renderable: renderable.to_owned(),
            model: self.model,
        });
    }
}

impl Shader for TraceShader {
    fn enable(&mut self) {
        self.enabled = true;
        self.trace.push(TraceEvent::ShaderEnabled(self.label.clone()));
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.trace.push(TraceEvent::ShaderDisabled(self.label.clone()));
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4) {
        if name == MODEL_UNIFORM {
            self.model = *value;
        }
        self.trace.push(TraceEvent::Uniform {
            shader: self.label.clone(),
            name: name.to_owned(),
            value: *value,
        });
    }
}

/// Named renderable that draws by recording itself on a [`TraceShader`].
#[derive(Debug, Clone, PartialEq)]
pub struct TraceObject {
    pub name: String,
    pub transform: Transform,
    pub outline: bool,
}

impl TraceObject {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            outline: false,
        }
    }

    pub fn outlined(mut self) -> Self {
        self.outline = true;
        self
    }
}

impl Renderable<TraceShader> for TraceObject {
    fn position(&self) -> Vec3 {
        self.transform.position
    }

    fn rotation_axis(&self) -> Vec3 {
        self.transform.rotation_axis
    }

    fn radian_rotation(&self) -> f32 {
        self.transform.rotation_angle
    }

    fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    fn should_outline(&self) -> bool {
        self.outline
    }

    fn draw(&self, shader: &mut TraceShader) {
        shader.record_draw(&self.name);
    }
}
