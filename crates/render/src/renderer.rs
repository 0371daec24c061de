use crate::queue::RenderQueue;
use crate::renderable::{Renderable, Shader};
use crate::state::{BlendFactor, Capability, CompareFunc, GraphicsState, StencilOp};
use glam::{Mat4, Vec3};
use lumen_common::OutlineConfig;

/// Name of the model-matrix uniform uploaded before every draw.
pub const MODEL_UNIFORM: &str = "model";
/// Stencil value written under every drawn pixel.
pub const STENCIL_REF: u32 = 1;
pub const STENCIL_MASK: u32 = 0xFF;

/// Build `translate * rotate * scale`.
///
/// The rotation is skipped when the angle is zero or the axis is the zero
/// vector, so a degenerate axis never reaches the rotation routine.
pub fn model_matrix(position: Vec3, axis: Vec3, radians: f32, scale: Vec3) -> Mat4 {
    let mut model = Mat4::from_translation(position);
    if axis != Vec3::ZERO && radians != 0.0 {
        model *= Mat4::from_axis_angle(axis.normalize(), radians);
    }
    model * Mat4::from_scale(scale)
}

/// Counters for one flushed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Index of the frame, counting flushed frames from zero.
    pub frame: u64,
    pub opaque: usize,
    pub transparent: usize,
    /// Items that also received an outline pass.
    pub outlines: usize,
}

impl FrameStats {
    pub fn draw_calls(&self) -> usize {
        self.opaque + self.transparent + self.outlines
    }
}

/// Frame-scoped render queues with a two-phase opaque/transparent flush.
///
/// Submissions go through a [`RenderFrame`] obtained from
/// [`Renderer::begin_frame`]. The frame borrows the renderer mutably and
/// `flush` consumes it, so only one frame can be open at a time and nothing
/// can be submitted to a frame once its flush has started.
#[derive(Debug)]
pub struct Renderer {
    outline_margin: f32,
    frames: u64,
    last_stats: FrameStats,
    // Queue sizes of the previous frame, used to pre-size the next one.
    opaque_hint: usize,
    transparent_hint: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&OutlineConfig::default())
    }
}

impl Renderer {
    pub fn new(config: &OutlineConfig) -> Self {
        Self {
            outline_margin: config.margin,
            frames: 0,
            last_stats: FrameStats::default(),
            opaque_hint: 0,
            transparent_hint: 0,
        }
    }

    /// Open the queues for a new frame.
    pub fn begin_frame<'a, S>(&mut self) -> RenderFrame<'_, 'a, S> {
        RenderFrame {
            opaque: RenderQueue::with_capacity(self.opaque_hint),
            transparent: RenderQueue::with_capacity(self.transparent_hint),
            renderer: self,
        }
    }

    pub fn outline_margin(&self) -> f32 {
        self.outline_margin
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn frames_flushed(&self) -> u64 {
        self.frames
    }
}

/// One frame's worth of submissions.
///
/// Holds borrowed renderables only; they must outlive the frame but are never
/// owned by it. Dropping a frame without flushing discards its submissions.
pub struct RenderFrame<'r, 'a, S> {
    renderer: &'r mut Renderer,
    opaque: RenderQueue<'a, S>,
    transparent: RenderQueue<'a, S>,
}

impl<'a, S> RenderFrame<'_, 'a, S> {
    pub fn submit_opaque(&mut self, renderable: &'a dyn Renderable<S>) {
        self.opaque.push(renderable);
    }

    /// Transparent items are drawn in submission order. Callers that need
    /// correct blending must submit them back to front.
    pub fn submit_transparent(&mut self, renderable: &'a dyn Renderable<S>) {
        self.transparent.push(renderable);
    }

    pub fn opaque_len(&self) -> usize {
        self.opaque.len()
    }

    pub fn transparent_len(&self) -> usize {
        self.transparent.len()
    }

    /// Drain both queues: every opaque item, then every transparent item.
    pub fn flush<G>(mut self, gfx: &mut G, shader: &mut S, outline_shader: &mut S) -> FrameStats
    where
        G: GraphicsState + ?Sized,
        S: Shader,
    {
        let frame = self.renderer.frames;
        let _span = tracing::debug_span!("flush", frame).entered();

        let margin = Vec3::splat(self.renderer.outline_margin);
        let mut stats = FrameStats {
            frame,
            ..FrameStats::default()
        };
        self.renderer.opaque_hint = self.opaque.len();
        self.renderer.transparent_hint = self.transparent.len();

        while let Some(current) = self.opaque.front() {
            if draw_item(current, false, gfx, shader, outline_shader, margin) {
                stats.outlines += 1;
            }
            stats.opaque += 1;
            self.opaque.pop_front();
        }

        while let Some(current) = self.transparent.front() {
            if draw_item(current, true, gfx, shader, outline_shader, margin) {
                stats.outlines += 1;
            }
            stats.transparent += 1;
            self.transparent.pop_front();
        }

        self.renderer.frames += 1;
        self.renderer.last_stats = stats;
        tracing::debug!(
            opaque = stats.opaque,
            transparent = stats.transparent,
            outlines = stats.outlines,
            "frame flushed"
        );
        stats
    }
}

impl<S> Drop for RenderFrame<'_, '_, S> {
    fn drop(&mut self) {
        if !self.opaque.is_empty() || !self.transparent.is_empty() {
            tracing::warn!(
                opaque = self.opaque.len(),
                transparent = self.transparent.len(),
                "render frame dropped without flush, discarding submissions"
            );
        }
    }
}

/// Main pass, then the optional stencil-masked outline pass.
/// Returns whether an outline was drawn.
fn draw_item<G, S>(
    item: &dyn Renderable<S>,
    blend: bool,
    gfx: &mut G,
    shader: &mut S,
    outline_shader: &mut S,
    margin: Vec3,
) -> bool
where
    G: GraphicsState + ?Sized,
    S: Shader,
{
    // Every pixel the main pass covers gets STENCIL_REF.
    gfx.enable(Capability::DepthTest);
    gfx.stencil_op(StencilOp::Keep, StencilOp::Keep, StencilOp::Replace);
    gfx.stencil_func(CompareFunc::Always, STENCIL_REF, STENCIL_MASK);
    gfx.stencil_mask(STENCIL_MASK);

    if blend {
        gfx.enable(Capability::Blend);
        gfx.blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
    }

    let position = item.position();
    let axis = item.rotation_axis();
    let angle = item.radian_rotation();
    let scale = item.scale();

    shader.set_uniform_mat4(MODEL_UNIFORM, &model_matrix(position, axis, angle, scale));
    item.draw(shader);

    let outlined = item.should_outline();
    if outlined {
        tracing::trace!(?position, "outline pass");
        // Only the fringe outside the main silhouette passes.
        gfx.stencil_func(CompareFunc::NotEqual, STENCIL_REF, STENCIL_MASK);

        outline_shader.enable();
        outline_shader.set_uniform_mat4(
            MODEL_UNIFORM,
            &model_matrix(position, axis, angle, scale + margin),
        );
        item.draw(outline_shader);
        outline_shader.disable();

        gfx.enable(Capability::DepthTest);
        gfx.stencil_mask(STENCIL_MASK);
        shader.enable();
        gfx.clear_stencil();
    }

    if blend {
        gfx.disable(Capability::Blend);
    }

    outlined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateCommand;
    use crate::trace::{Trace, TraceBackend, TraceEvent, TraceObject, TraceShader};
    use lumen_common::Transform;

    struct Harness {
        trace: Trace,
        gfx: TraceBackend,
        main: TraceShader,
        outline: TraceShader,
        renderer: Renderer,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_config(&OutlineConfig::default())
        }

        fn with_config(config: &OutlineConfig) -> Self {
            let trace = Trace::new();
            Self {
                gfx: trace.backend(),
                main: trace.shader("main"),
                outline: trace.shader("outline"),
                renderer: Renderer::new(config),
                trace,
            }
        }

        fn run(&mut self, opaque: &[TraceObject], transparent: &[TraceObject]) -> FrameStats {
            let mut frame = self.renderer.begin_frame::<TraceShader>();
            for item in opaque {
                frame.submit_opaque(item);
            }
            for item in transparent {
                frame.submit_transparent(item);
            }
            frame.flush(&mut self.gfx, &mut self.main, &mut self.outline)
        }
    }

    fn object(name: &str) -> TraceObject {
        TraceObject::new(name, Transform::default())
    }

    fn draw_names(trace: &Trace) -> Vec<String> {
        trace
            .draws()
            .into_iter()
            .map(|(shader, name)| format!("{shader}:{name}"))
            .collect()
    }

    fn model_of(event: &TraceEvent) -> Mat4 {
        match event {
            TraceEvent::Draw { model, .. } => *model,
            other => panic!("expected draw, got {other:?}"),
        }
    }

    fn draw_events(trace: &Trace) -> Vec<TraceEvent> {
        trace
            .events()
            .into_iter()
            .filter(|e| matches!(e, TraceEvent::Draw { .. }))
            .collect()
    }

    #[test]
    fn opaque_then_transparent_each_in_submission_order() {
        let mut h = Harness::new();
        let items: Vec<TraceObject> = ["a", "x", "b", "y", "c"].into_iter().map(object).collect();

        let mut frame = h.renderer.begin_frame::<TraceShader>();
        frame.submit_opaque(&items[0]);
        frame.submit_transparent(&items[1]);
        frame.submit_opaque(&items[2]);
        frame.submit_transparent(&items[3]);
        frame.submit_opaque(&items[4]);
        assert_eq!(frame.opaque_len(), 3);
        assert_eq!(frame.transparent_len(), 2);
        let stats = frame.flush(&mut h.gfx, &mut h.main, &mut h.outline);

        assert_eq!(
            draw_names(&h.trace),
            vec!["main:a", "main:b", "main:c", "main:x", "main:y"]
        );
        assert_eq!(stats.opaque, 3);
        assert_eq!(stats.transparent, 2);
        assert_eq!(stats.draw_calls(), 5);
    }

    #[test]
    fn queues_are_empty_after_flush() {
        let mut h = Harness::new();
        let items: Vec<TraceObject> = (0..17).map(|i| object(&format!("o{i}"))).collect();
        h.run(&items, &items);

        let frame = h.renderer.begin_frame::<TraceShader>();
        assert_eq!(frame.opaque_len(), 0);
        assert_eq!(frame.transparent_len(), 0);
    }

    #[test]
    fn empty_flush_issues_nothing() {
        let mut h = Harness::new();
        let stats = h.run(&[], &[]);
        assert!(h.trace.is_empty());
        assert_eq!(stats.draw_calls(), 0);
        assert_eq!(h.renderer.frames_flushed(), 1);
    }

    #[test]
    fn second_flush_without_submissions_draws_nothing() {
        let mut h = Harness::new();
        let items = [object("a").outlined(), object("b")];
        let first = h.run(&items, &items);
        assert_eq!(first.draw_calls(), 6);

        h.trace.clear();
        let second = h.run(&[], &[]);
        assert_eq!(h.trace.draw_count(), 0);
        assert!(h.trace.is_empty());
        assert_eq!(second.draw_calls(), 0);
        assert_eq!(second.frame, 1);
    }

    #[test]
    fn outlined_opaque_item_issues_exact_sequence() {
        let mut h = Harness::new();
        let item = TraceObject::new(
            "cube",
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
        )
        .outlined();
        h.run(std::slice::from_ref(&item), &[]);

        let base = model_matrix(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, 0.0, Vec3::ONE);
        let grown = model_matrix(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::Y,
            0.0,
            Vec3::ONE + Vec3::splat(0.025),
        );
        let expected = vec![
            TraceEvent::State(StateCommand::Enable(Capability::DepthTest)),
            TraceEvent::State(StateCommand::StencilOp {
                stencil_fail: StencilOp::Keep,
                depth_fail: StencilOp::Keep,
                pass: StencilOp::Replace,
            }),
            TraceEvent::State(StateCommand::StencilFunc {
                func: CompareFunc::Always,
                reference: 1,
                mask: 0xFF,
            }),
            TraceEvent::State(StateCommand::StencilMask(0xFF)),
            TraceEvent::Uniform {
                shader: "main".into(),
                name: "model".into(),
                value: base,
            },
            TraceEvent::Draw {
                shader: "main".into(),
                renderable: "cube".into(),
                model: base,
            },
            TraceEvent::State(StateCommand::StencilFunc {
                func: CompareFunc::NotEqual,
                reference: 1,
                mask: 0xFF,
            }),
            TraceEvent::ShaderEnabled("outline".into()),
            TraceEvent::Uniform {
                shader: "outline".into(),
                name: "model".into(),
                value: grown,
            },
            TraceEvent::Draw {
                shader: "outline".into(),
                renderable: "cube".into(),
                model: grown,
            },
            TraceEvent::ShaderDisabled("outline".into()),
            TraceEvent::State(StateCommand::Enable(Capability::DepthTest)),
            TraceEvent::State(StateCommand::StencilMask(0xFF)),
            TraceEvent::ShaderEnabled("main".into()),
            TraceEvent::State(StateCommand::ClearStencil),
        ];
        assert_eq!(h.trace.events(), expected);
    }

    #[test]
    fn outline_scale_grows_by_margin() {
        let mut h = Harness::new();
        h.run(&[object("cube").outlined()], &[]);

        let draws = draw_events(&h.trace);
        assert_eq!(draws.len(), 2);
        let (main_scale, _, _) = model_of(&draws[0]).to_scale_rotation_translation();
        let (outline_scale, _, _) = model_of(&draws[1]).to_scale_rotation_translation();
        assert!(main_scale.abs_diff_eq(Vec3::ONE, 1e-6));
        assert!(outline_scale.abs_diff_eq(Vec3::splat(1.025), 1e-6));
    }

    #[test]
    fn outline_margin_comes_from_config() {
        let config = OutlineConfig {
            margin: 0.1,
            ..OutlineConfig::default()
        };
        let mut h = Harness::with_config(&config);
        h.run(&[object("cube").outlined()], &[]);

        let draws = draw_events(&h.trace);
        let (outline_scale, _, _) = model_of(&draws[1]).to_scale_rotation_translation();
        assert!(outline_scale.abs_diff_eq(Vec3::splat(1.1), 1e-6));
    }

    #[test]
    fn no_outline_means_no_outline_shader_activity() {
        let mut h = Harness::new();
        h.run(&[object("a")], &[object("b")]);

        assert_eq!(draw_names(&h.trace), vec!["main:a", "main:b"]);
        let touched_outline = h.trace.events().iter().any(|e| match e {
            TraceEvent::ShaderEnabled(l) | TraceEvent::ShaderDisabled(l) => l == "outline",
            TraceEvent::Uniform { shader, .. } => shader == "outline",
            _ => false,
        });
        assert!(!touched_outline);
        assert!(
            !h.trace
                .events()
                .contains(&TraceEvent::State(StateCommand::ClearStencil))
        );
    }

    #[test]
    fn stencil_cleared_once_per_outlined_item() {
        let mut h = Harness::new();
        let opaque = [object("a").outlined(), object("b"), object("c").outlined()];
        let transparent = [object("d").outlined()];
        let stats = h.run(&opaque, &transparent);

        let clears = h
            .trace
            .events()
            .iter()
            .filter(|e| **e == TraceEvent::State(StateCommand::ClearStencil))
            .count();
        assert_eq!(clears, 3);
        assert_eq!(stats.outlines, 3);
        assert_eq!(h.renderer.last_stats(), stats);
    }

    #[test]
    fn transparent_items_are_wrapped_in_blending() {
        let mut h = Harness::new();
        h.run(&[], &[object("glass")]);

        let commands: Vec<StateCommand> = h
            .trace
            .events()
            .into_iter()
            .filter_map(|e| match e {
                TraceEvent::State(cmd) => Some(cmd),
                _ => None,
            })
            .collect();
        assert_eq!(
            commands,
            vec![
                StateCommand::Enable(Capability::DepthTest),
                StateCommand::StencilOp {
                    stencil_fail: StencilOp::Keep,
                    depth_fail: StencilOp::Keep,
                    pass: StencilOp::Replace,
                },
                StateCommand::StencilFunc {
                    func: CompareFunc::Always,
                    reference: 1,
                    mask: 0xFF,
                },
                StateCommand::StencilMask(0xFF),
                StateCommand::Enable(Capability::Blend),
                StateCommand::BlendFunc {
                    src: BlendFactor::SrcAlpha,
                    dst: BlendFactor::OneMinusSrcAlpha,
                },
                StateCommand::Disable(Capability::Blend),
            ]
        );
        assert!(!h.gfx.state().blend);
    }

    #[test]
    fn outlined_transparent_item_disables_blend_after_outline() {
        let mut h = Harness::new();
        h.run(&[], &[object("glass").outlined()]);

        let events = h.trace.events();
        let clear = events
            .iter()
            .position(|e| *e == TraceEvent::State(StateCommand::ClearStencil))
            .unwrap();
        assert_eq!(
            events[clear + 1],
            TraceEvent::State(StateCommand::Disable(Capability::Blend))
        );
        assert_eq!(events.len(), clear + 2);
    }

    #[test]
    fn opaque_items_never_touch_blending() {
        let mut h = Harness::new();
        h.run(&[object("a").outlined(), object("b")], &[]);

        let blends = h.trace.events().into_iter().any(|e| {
            matches!(
                e,
                TraceEvent::State(
                    StateCommand::Enable(Capability::Blend)
                        | StateCommand::Disable(Capability::Blend)
                        | StateCommand::BlendFunc { .. }
                )
            )
        });
        assert!(!blends);
    }

    #[test]
    fn rotation_skipped_for_zero_angle_or_zero_axis() {
        let position = Vec3::new(4.0, -1.0, 2.0);
        let scale = Vec3::new(2.0, 3.0, 4.0);
        let expected = Mat4::from_translation(position) * Mat4::from_scale(scale);

        assert_eq!(model_matrix(position, Vec3::X, 0.0, scale), expected);
        assert_eq!(model_matrix(position, Vec3::ZERO, 1.2, scale), expected);
        assert_eq!(model_matrix(position, Vec3::ZERO, 0.0, scale), expected);
    }

    #[test]
    fn rotation_applied_with_normalized_axis() {
        let position = Vec3::new(1.0, 0.0, 0.0);
        let model = model_matrix(position, Vec3::new(0.0, 0.0, 5.0), 1.0, Vec3::ONE);
        let expected = Mat4::from_translation(position) * Mat4::from_rotation_z(1.0);
        assert!(model.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn renderer_applies_rotation_guard() {
        let mut h = Harness::new();
        let unrotated = TraceObject::new(
            "zero-axis",
            Transform::from_position(Vec3::X).with_rotation(Vec3::ZERO, 0.7),
        );
        h.run(&[unrotated], &[]);

        let model = model_of(&draw_events(&h.trace)[0]);
        assert_eq!(model, Mat4::from_translation(Vec3::X));
    }

    #[test]
    fn dropped_frame_discards_submissions() {
        let mut h = Harness::new();
        let items = [object("a"), object("b")];
        {
            let mut frame = h.renderer.begin_frame::<TraceShader>();
            frame.submit_opaque(&items[0]);
            frame.submit_transparent(&items[1]);
        }
        assert_eq!(h.renderer.frames_flushed(), 0);

        let stats = h.run(&[], &[]);
        assert_eq!(stats.draw_calls(), 0);
        assert!(h.trace.is_empty());
    }
}
