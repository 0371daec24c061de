//! Graphics state contract.
//!
//! The renderer drives GPU fixed-function state (depth, stencil, blending)
//! through [`GraphicsState`]. Every call is fire-and-forget. A backend may
//! forward the calls to a driver, or record them as [`StateCommand`]s and fold
//! them into a [`RenderState`] snapshot.

/// Toggleable pipeline feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DepthTest,
    StencilTest,
    Blend,
}

/// Action applied to the stencil buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    Invert,
}

/// Comparison used by the stencil (and depth) test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Render-state sink driven by the flush pipeline.
pub trait GraphicsState {
    fn enable(&mut self, capability: Capability);
    fn disable(&mut self, capability: Capability);
    /// Stencil actions for: stencil test fails, depth test fails, both pass.
    fn stencil_op(&mut self, stencil_fail: StencilOp, depth_fail: StencilOp, pass: StencilOp);
    fn stencil_func(&mut self, func: CompareFunc, reference: u32, mask: u32);
    fn stencil_mask(&mut self, mask: u32);
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);
    fn clear_stencil(&mut self);
}

/// One state transition, as issued through [`GraphicsState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateCommand {
    Enable(Capability),
    Disable(Capability),
    StencilOp {
        stencil_fail: StencilOp,
        depth_fail: StencilOp,
        pass: StencilOp,
    },
    StencilFunc {
        func: CompareFunc,
        reference: u32,
        mask: u32,
    },
    StencilMask(u32),
    BlendFunc {
        src: BlendFactor,
        dst: BlendFactor,
    },
    ClearStencil,
}

impl StateCommand {
    /// Replay this command onto another state sink.
    pub fn apply<G: GraphicsState + ?Sized>(&self, gfx: &mut G) {
        match *self {
            StateCommand::Enable(cap) => gfx.enable(cap),
            StateCommand::Disable(cap) => gfx.disable(cap),
            StateCommand::StencilOp {
                stencil_fail,
                depth_fail,
                pass,
            } => gfx.stencil_op(stencil_fail, depth_fail, pass),
            StateCommand::StencilFunc {
                func,
                reference,
                mask,
            } => gfx.stencil_func(func, reference, mask),
            StateCommand::StencilMask(mask) => gfx.stencil_mask(mask),
            StateCommand::BlendFunc { src, dst } => gfx.blend_func(src, dst),
            StateCommand::ClearStencil => gfx.clear_stencil(),
        }
    }
}

/// Snapshot of the fixed-function state that affects a draw.
///
/// Defaults match a freshly created GL context with an 8-bit stencil buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    pub depth_test: bool,
    pub stencil_test: bool,
    pub blend: bool,
    pub stencil_func: CompareFunc,
    pub stencil_ref: u32,
    pub stencil_read_mask: u32,
    pub stencil_write_mask: u32,
    pub stencil_fail: StencilOp,
    pub stencil_depth_fail: StencilOp,
    pub stencil_pass: StencilOp,
    pub blend_src: BlendFactor,
    pub blend_dst: BlendFactor,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: false,
            stencil_test: false,
            blend: false,
            stencil_func: CompareFunc::Always,
            stencil_ref: 0,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            stencil_fail: StencilOp::Keep,
            stencil_depth_fail: StencilOp::Keep,
            stencil_pass: StencilOp::Keep,
            blend_src: BlendFactor::One,
            blend_dst: BlendFactor::Zero,
        }
    }
}

impl RenderState {
    /// Fold a command into the snapshot. Stencil clears touch buffer
    /// contents, not state, and leave the snapshot unchanged.
    pub fn apply(&mut self, command: &StateCommand) {
        match *command {
            StateCommand::Enable(cap) => self.set_capability(cap, true),
            StateCommand::Disable(cap) => self.set_capability(cap, false),
            StateCommand::StencilOp {
                stencil_fail,
                depth_fail,
                pass,
            } => {
                self.stencil_fail = stencil_fail;
                self.stencil_depth_fail = depth_fail;
                self.stencil_pass = pass;
            }
            StateCommand::StencilFunc {
                func,
                reference,
                mask,
            } => {
                self.stencil_func = func;
                self.stencil_ref = reference;
                self.stencil_read_mask = mask;
            }
            StateCommand::StencilMask(mask) => self.stencil_write_mask = mask,
            StateCommand::BlendFunc { src, dst } => {
                self.blend_src = src;
                self.blend_dst = dst;
            }
            StateCommand::ClearStencil => {}
        }
    }

    fn set_capability(&mut self, capability: Capability, on: bool) {
        match capability {
            Capability::DepthTest => self.depth_test = on,
            Capability::StencilTest => self.stencil_test = on,
            Capability::Blend => self.blend = on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<StateCommand>);

    impl GraphicsState for Log {
        fn enable(&mut self, capability: Capability) {
            self.0.push(StateCommand::Enable(capability));
        }
        fn disable(&mut self, capability: Capability) {
            self.0.push(StateCommand::Disable(capability));
        }
        fn stencil_op(&mut self, stencil_fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
            self.0.push(StateCommand::StencilOp {
                stencil_fail,
                depth_fail,
                pass,
            });
        }
        fn stencil_func(&mut self, func: CompareFunc, reference: u32, mask: u32) {
            self.0.push(StateCommand::StencilFunc {
                func,
                reference,
                mask,
            });
        }
        fn stencil_mask(&mut self, mask: u32) {
            self.0.push(StateCommand::StencilMask(mask));
        }
        fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
            self.0.push(StateCommand::BlendFunc { src, dst });
        }
        fn clear_stencil(&mut self) {
            self.0.push(StateCommand::ClearStencil);
        }
    }

    fn sample_commands() -> Vec<StateCommand> {
        vec![
            StateCommand::Enable(Capability::DepthTest),
            StateCommand::StencilOp {
                stencil_fail: StencilOp::Keep,
                depth_fail: StencilOp::Keep,
                pass: StencilOp::Replace,
            },
            StateCommand::StencilFunc {
                func: CompareFunc::NotEqual,
                reference: 1,
                mask: 0xFF,
            },
            StateCommand::StencilMask(0x0F),
            StateCommand::Enable(Capability::Blend),
            StateCommand::BlendFunc {
                src: BlendFactor::SrcAlpha,
                dst: BlendFactor::OneMinusSrcAlpha,
            },
            StateCommand::ClearStencil,
        ]
    }

    #[test]
    fn replay_reproduces_commands() {
        let commands = sample_commands();
        let mut log = Log::default();
        for cmd in &commands {
            cmd.apply(&mut log);
        }
        assert_eq!(log.0, commands);
    }

    #[test]
    fn snapshot_tracks_commands() {
        let mut state = RenderState::default();
        for cmd in &sample_commands() {
            state.apply(cmd);
        }
        assert!(state.depth_test);
        assert!(state.blend);
        assert!(!state.stencil_test);
        assert_eq!(state.stencil_func, CompareFunc::NotEqual);
        assert_eq!(state.stencil_ref, 1);
        assert_eq!(state.stencil_write_mask, 0x0F);
        assert_eq!(state.stencil_pass, StencilOp::Replace);
        assert_eq!(state.blend_src, BlendFactor::SrcAlpha);

        state.apply(&StateCommand::Disable(Capability::Blend));
        assert!(!state.blend);
    }

    #[test]
    fn clear_leaves_snapshot_untouched() {
        let mut state = RenderState::default();
        state.apply(&StateCommand::ClearStencil);
        assert_eq!(state, RenderState::default());
    }
}
