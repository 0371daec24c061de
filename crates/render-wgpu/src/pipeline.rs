//! Render pipelines keyed by the fixed-function state they bake in.
//!
//! wgpu fixes depth, stencil and blend state at pipeline creation, while the
//! flush pipeline toggles them per draw. Each distinct combination seen in a
//! recording gets its own pipeline, created on first use and kept for the
//! lifetime of the cache. The stencil reference is dynamic pass state and is
//! not part of the key.

use crate::mesh::Vertex;
use crate::recorder::Program;
use crate::shaders;
use lumen_render::{BlendFactor, CompareFunc, RenderState, StencilOp};
use std::collections::HashMap;

/// Depth-stencil attachment format shared by every pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilKey {
    pub compare: CompareFunc,
    pub fail: StencilOp,
    pub depth_fail: StencilOp,
    pub pass: StencilOp,
    pub read_mask: u32,
    pub write_mask: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub program: Program,
    pub depth_test: bool,
    /// `None` when the stencil test is disabled.
    pub stencil: Option<StencilKey>,
    /// `(src, dst)` when blending is enabled.
    pub blend: Option<(BlendFactor, BlendFactor)>,
}

impl PipelineKey {
    pub fn new(program: Program, state: &RenderState) -> Self {
        let stencil = state.stencil_test.then_some(StencilKey {
            compare: state.stencil_func,
            fail: state.stencil_fail,
            depth_fail: state.stencil_depth_fail,
            pass: state.stencil_pass,
            read_mask: state.stencil_read_mask,
            write_mask: state.stencil_write_mask,
        });
        let blend = state.blend.then_some((state.blend_src, state.blend_dst));
        Self {
            program,
            depth_test: state.depth_test,
            stencil,
            blend,
        }
    }
}

fn compare_function(func: CompareFunc) -> wgpu::CompareFunction {
    match func {
        CompareFunc::Never => wgpu::CompareFunction::Never,
        CompareFunc::Less => wgpu::CompareFunction::Less,
        CompareFunc::Equal => wgpu::CompareFunction::Equal,
        CompareFunc::LessEqual => wgpu::CompareFunction::LessEqual,
        CompareFunc::Greater => wgpu::CompareFunction::Greater,
        CompareFunc::NotEqual => wgpu::CompareFunction::NotEqual,
        CompareFunc::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
        CompareFunc::Always => wgpu::CompareFunction::Always,
    }
}

fn stencil_operation(op: StencilOp) -> wgpu::StencilOperation {
    match op {
        StencilOp::Keep => wgpu::StencilOperation::Keep,
        StencilOp::Zero => wgpu::StencilOperation::Zero,
        StencilOp::Replace => wgpu::StencilOperation::Replace,
        StencilOp::Increment => wgpu::StencilOperation::IncrementClamp,
        StencilOp::Decrement => wgpu::StencilOperation::DecrementClamp,
        StencilOp::Invert => wgpu::StencilOperation::Invert,
    }
}

fn blend_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
    }
}

fn stencil_state(key: Option<StencilKey>) -> wgpu::StencilState {
    let Some(key) = key else {
        return wgpu::StencilState::default();
    };
    let face = wgpu::StencilFaceState {
        compare: compare_function(key.compare),
        fail_op: stencil_operation(key.fail),
        depth_fail_op: stencil_operation(key.depth_fail),
        pass_op: stencil_operation(key.pass),
    };
    wgpu::StencilState {
        front: face,
        back: face,
        read_mask: key.read_mask,
        write_mask: key.write_mask,
    }
}

fn blend_state(blend: Option<(BlendFactor, BlendFactor)>) -> wgpu::BlendState {
    match blend {
        None => wgpu::BlendState::REPLACE,
        Some((src, dst)) => {
            let component = wgpu::BlendComponent {
                src_factor: blend_factor(src),
                dst_factor: blend_factor(dst),
                operation: wgpu::BlendOperation::Add,
            };
            wgpu::BlendState {
                color: component,
                alpha: component,
            }
        }
    }
}

/// Lazily built pipelines for every [`PipelineKey`] seen so far.
pub struct PipelineCache {
    layout: wgpu::PipelineLayout,
    main_module: wgpu::ShaderModule,
    outline_module: wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub fn new(
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen_pipeline_layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });
        let main_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("main_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MAIN_SHADER.into()),
        });
        let outline_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("outline_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::OUTLINE_SHADER.into()),
        });
        Self {
            layout,
            main_module,
            outline_module,
            color_format,
            pipelines: HashMap::new(),
        }
    }

    /// Make sure a pipeline exists for `key`.
    pub fn prepare(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        tracing::debug!(?key, total = self.pipelines.len() + 1, "creating render pipeline");
        let pipeline = self.create(device, &key);
        self.pipelines.insert(key, pipeline);
    }

    pub fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    fn create(&self, device: &wgpu::Device, key: &PipelineKey) -> wgpu::RenderPipeline {
        let module = match key.program {
            Program::Main => &self.main_module,
            Program::Outline => &self.outline_module,
        };
        let (depth_write_enabled, depth_compare) = if key.depth_test {
            (true, wgpu::CompareFunction::Less)
        } else {
            (false, wgpu::CompareFunction::Always)
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen_pipeline"),
            layout: Some(&self.layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(blend_state(key.blend)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare,
                stencil: stencil_state(key.stencil),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }
}
