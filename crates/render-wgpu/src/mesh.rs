use crate::buffers::{IndexBuffer, VertexBuffer};
use crate::recorder::WgpuShader;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use lumen_common::Transform;
use lumen_render::Renderable;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const fn v(position: [f32; 3], normal: [f32; 3]) -> Vertex {
    Vertex { position, normal }
}

/// CPU-side geometry, counter-clockwise front faces.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Unit cube centred on the origin.
    pub fn cube() -> Self {
        let p = 0.5_f32;
        #[rustfmt::skip]
        let vertices = vec![
            // +Z
            v([-p, -p,  p], [0.0, 0.0, 1.0]), v([ p, -p,  p], [0.0, 0.0, 1.0]),
            v([ p,  p,  p], [0.0, 0.0, 1.0]), v([-p,  p,  p], [0.0, 0.0, 1.0]),
            // -Z
            v([ p, -p, -p], [0.0, 0.0, -1.0]), v([-p, -p, -p], [0.0, 0.0, -1.0]),
            v([-p,  p, -p], [0.0, 0.0, -1.0]), v([ p,  p, -p], [0.0, 0.0, -1.0]),
            // +X
            v([ p, -p,  p], [1.0, 0.0, 0.0]), v([ p, -p, -p], [1.0, 0.0, 0.0]),
            v([ p,  p, -p], [1.0, 0.0, 0.0]), v([ p,  p,  p], [1.0, 0.0, 0.0]),
            // -X
            v([-p, -p, -p], [-1.0, 0.0, 0.0]), v([-p, -p,  p], [-1.0, 0.0, 0.0]),
            v([-p,  p,  p], [-1.0, 0.0, 0.0]), v([-p,  p, -p], [-1.0, 0.0, 0.0]),
            // +Y
            v([-p,  p,  p], [0.0, 1.0, 0.0]), v([ p,  p,  p], [0.0, 1.0, 0.0]),
            v([ p,  p, -p], [0.0, 1.0, 0.0]), v([-p,  p, -p], [0.0, 1.0, 0.0]),
            // -Y
            v([-p, -p, -p], [0.0, -1.0, 0.0]), v([ p, -p, -p], [0.0, -1.0, 0.0]),
            v([ p, -p,  p], [0.0, -1.0, 0.0]), v([-p, -p,  p], [0.0, -1.0, 0.0]),
        ];
        let indices = (0..6u32)
            .flat_map(|face| {
                let b = face * 4;
                [b, b + 1, b + 2, b + 2, b + 3, b]
            })
            .collect();
        Self { vertices, indices }
    }

    /// Square in the XZ plane facing +Y, side length 1.
    pub fn plane() -> Self {
        Self::grid(1)
    }

    /// [`MeshData::plane`] split into `divisions` x `divisions` cells.
    /// Zero is treated as one.
    pub fn grid(divisions: u32) -> Self {
        let n = divisions.max(1);
        let row = n + 1;
        let up = [0.0, 1.0, 0.0];
        let step = 1.0 / n as f32;

        let vertices = (0..row)
            .flat_map(|r| {
                (0..row).map(move |c| {
                    v([-0.5 + c as f32 * step, 0.0, 0.5 - r as f32 * step], up)
                })
            })
            .collect();
        let indices = (0..n)
            .flat_map(|r| (0..n).map(move |c| r * row + c))
            .flat_map(|a| {
                let b = a + 1;
                let c = a + row + 1;
                let d = a + row;
                [a, b, c, c, d, a]
            })
            .collect();
        Self { vertices, indices }
    }
}

/// Handle to a mesh uploaded through [`crate::WgpuRenderer::add_mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

pub struct GpuMesh {
    vertices: VertexBuffer,
    indices: IndexBuffer,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, data: &MeshData) -> Self {
        Self {
            vertices: VertexBuffer::new(device, &data.vertices),
            indices: IndexBuffer::new(device, &data.indices),
        }
    }

    /// Replace the geometry, reusing the buffers when it fits.
    pub fn reload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &MeshData) {
        self.vertices.load(device, queue, &data.vertices);
        self.indices.load(device, queue, &data.indices);
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.indices.count() == 0 {
            return;
        }
        self.vertices.bind(pass, 0);
        self.indices.bind(pass);
        pass.draw_indexed(0..self.indices.count(), 0, 0..1);
    }
}

/// Scene object drawn with an uploaded mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRenderable {
    pub name: String,
    pub mesh: MeshId,
    pub transform: Transform,
    pub color: [f32; 4],
    pub outline: bool,
}

impl MeshRenderable {
    pub fn new(name: impl Into<String>, mesh: MeshId, transform: Transform) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform,
            color: [0.8, 0.8, 0.8, 1.0],
            outline: false,
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn outlined(mut self) -> Self {
        self.outline = true;
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.color[3] < 1.0
    }
}

impl<'r> Renderable<WgpuShader<'r>> for MeshRenderable {
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

    fn draw(&self, shader: &mut WgpuShader<'r>) {
        shader.set_color(self.color);
        shader.draw_mesh(self.mesh);
    }
}
