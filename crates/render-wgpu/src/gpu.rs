use crate::mesh::{GpuMesh, MeshData, MeshId};
use crate::pipeline::{DEPTH_FORMAT, PipelineCache, PipelineKey};
use crate::recorder::{FrameRecorder, GpuCommand, ModelUniform, Program, WgpuShader, WgpuState};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use lumen_common::OutlineConfig;
use lumen_render::{Capability, GraphicsState};
use std::cell::RefCell;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

const MODEL_UNIFORM_SIZE: u64 = std::mem::size_of::<ModelUniform>() as u64;
const INITIAL_MODEL_SLOTS: u64 = 256;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.15,
    a: 1.0,
};

/// Round `size` up to the next multiple of `alignment`.
fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Replays recorded flushes into wgpu render passes.
///
/// The flush pipeline drives [`WgpuRenderer::graphics_state`] and the
/// shaders from [`WgpuRenderer::shader`]; [`WgpuRenderer::render`] then turns
/// the recording into GPU work.
pub struct WgpuRenderer {
    pipelines: PipelineCache,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_stride: u64,
    model_capacity: u64,
    meshes: Vec<GpuMesh>,
    depth_texture: wgpu::TextureView,
    recorder: RefCell<FrameRecorder>,
    outline_color: [f32; 4],
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        outline: &OutlineConfig,
    ) -> Self {
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::bytes_of(&CameraUniform {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("model_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(MODEL_UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let model_stride = align_to(MODEL_UNIFORM_SIZE, alignment);
        let (model_buffer, model_bind_group) =
            Self::create_model_storage(device, &model_layout, model_stride, INITIAL_MODEL_SLOTS);

        let pipelines =
            PipelineCache::new(device, &[&camera_layout, &model_layout], surface_format);
        let depth_texture = Self::create_depth_texture(device, width, height);

        // Context defaults for the session: depth and stencil testing on.
        let recorder = RefCell::new(FrameRecorder::new());
        {
            let mut gfx = WgpuState::new(&recorder);
            gfx.enable(Capability::DepthTest);
            gfx.enable(Capability::StencilTest);
        }

        tracing::info!(?surface_format, model_stride, "wgpu renderer initialised");

        Self {
            pipelines,
            camera_buffer,
            camera_bind_group,
            model_layout,
            model_buffer,
            model_bind_group,
            model_stride,
            model_capacity: INITIAL_MODEL_SLOTS,
            meshes: Vec::new(),
            depth_texture,
            recorder,
            outline_color: outline.color,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn add_mesh(&mut self, device: &wgpu::Device, data: &MeshData) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(GpuMesh::upload(device, data));
        id
    }

    /// Replace the geometry of an uploaded mesh. Returns `false` for an
    /// unknown id.
    pub fn reload_mesh(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        id: MeshId,
        data: &MeshData,
    ) -> bool {
        let Some(mesh) = self.meshes.get_mut(id.0 as usize) else {
            tracing::warn!(?id, "reload of unknown mesh");
            return false;
        };
        mesh.reload(device, queue, data);
        true
    }

    /// State sink to pass to `RenderFrame::flush`.
    pub fn graphics_state(&self) -> WgpuState<'_> {
        WgpuState::new(&self.recorder)
    }

    /// Shader handle for `program`. The outline program always draws with the
    /// configured outline colour.
    pub fn shader(&self, program: Program) -> WgpuShader<'_> {
        let shader = WgpuShader::new(program, &self.recorder);
        match program {
            Program::Main => shader,
            Program::Outline => shader.with_fixed_color(self.outline_color),
        }
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Replay everything recorded since the last call into `target`.
    ///
    /// Returns the number of draws submitted to the GPU.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        view_proj: Mat4,
    ) -> usize {
        let frame = self.recorder.get_mut().take_frame();

        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform {
                view_proj: view_proj.to_cols_array_2d(),
            }),
        );
        self.upload_models(device, queue, &frame.uniforms);

        for command in &frame.commands {
            if let GpuCommand::Draw { program, state, .. } = command {
                self.pipelines
                    .prepare(device, PipelineKey::new(*program, state));
            }
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lumen_encoder"),
        });

        let mut draws = 0;
        for (index, segment) in frame.segments().enumerate() {
            let (color_load, depth_load) = if index == 0 {
                (wgpu::LoadOp::Clear(CLEAR_COLOR), wgpu::LoadOp::Clear(1.0))
            } else {
                (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lumen_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for command in segment {
                let GpuCommand::Draw {
                    program,
                    state,
                    slot,
                    mesh,
                } = command
                else {
                    continue;
                };
                let Some(gpu_mesh) = self.meshes.get(mesh.0 as usize) else {
                    tracing::warn!(?mesh, "draw references unknown mesh");
                    continue;
                };
                let Some(pipeline) = self.pipelines.get(&PipelineKey::new(*program, state)) else {
                    continue;
                };
                let offset = (u64::from(*slot) * self.model_stride) as u32;
                pass.set_pipeline(pipeline);
                pass.set_stencil_reference(state.stencil_ref);
                pass.set_bind_group(1, &self.model_bind_group, &[offset]);
                gpu_mesh.draw(&mut pass);
                draws += 1;
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        tracing::trace!(draws, pipelines = self.pipelines.len(), "frame submitted");
        draws
    }

    fn upload_models(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        uniforms: &[ModelUniform],
    ) {
        if uniforms.is_empty() {
            return;
        }
        let needed = uniforms.len() as u64;
        if needed > self.model_capacity {
            let capacity = needed.next_power_of_two();
            tracing::debug!(capacity, "growing model uniform buffer");
            let (buffer, bind_group) = Self::create_model_storage(
                device,
                &self.model_layout,
                self.model_stride,
                capacity,
            );
            self.model_buffer = buffer;
            self.model_bind_group = bind_group;
            self.model_capacity = capacity;
        }

        let stride = self.model_stride as usize;
        let mut bytes = vec![0u8; stride * uniforms.len()];
        for (chunk, uniform) in bytes.chunks_exact_mut(stride).zip(uniforms) {
            chunk[..MODEL_UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(uniform));
        }
        queue.write_buffer(&self.model_buffer, 0, &bytes);
    }

    fn create_model_storage(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        slots: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("model_buffer"),
            size: stride * slots,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("model_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(MODEL_UNIFORM_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_stencil_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
