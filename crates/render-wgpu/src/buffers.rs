//! Owned GPU buffers for mesh geometry. Dropping a wrapper releases its buffer.

use crate::mesh::Vertex;
use wgpu::util::DeviceExt;

fn create_init(
    device: &wgpu::Device,
    label: &str,
    contents: &[u8],
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: usage | wgpu::BufferUsages::COPY_DST,
    })
}

/// Whether `len` bytes can be written into a buffer of `capacity` bytes.
fn fits(len: u64, capacity: u64) -> bool {
    len <= capacity
}

/// Bytes covered by `count` elements of `stride` bytes, `None` when empty.
/// wgpu rejects empty buffer slices, so empty buffers are never bound.
fn bound_bytes(count: u32, stride: usize) -> Option<u64> {
    (count > 0).then(|| u64::from(count) * stride as u64)
}

/// Re-upload `contents`, writing in place when the buffer is large enough.
fn reload(
    buffer: &mut wgpu::Buffer,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    contents: &[u8],
    usage: wgpu::BufferUsages,
) {
    if fits(contents.len() as u64, buffer.size()) {
        queue.write_buffer(buffer, 0, contents);
    } else {
        tracing::trace!(label, bytes = contents.len(), "growing buffer");
        *buffer = create_init(device, label, contents, usage);
    }
}

/// 32-bit index buffer.
pub struct IndexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl IndexBuffer {
    pub fn new(device: &wgpu::Device, indices: &[u32]) -> Self {
        Self {
            buffer: create_init(
                device,
                "index_buffer",
                bytemuck::cast_slice(indices),
                wgpu::BufferUsages::INDEX,
            ),
            count: indices.len() as u32,
        }
    }

    pub fn load(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, indices: &[u32]) {
        reload(
            &mut self.buffer,
            device,
            queue,
            "index_buffer",
            bytemuck::cast_slice(indices),
            wgpu::BufferUsages::INDEX,
        );
        self.count = indices.len() as u32;
    }

    /// Does nothing when no indices are loaded.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        if let Some(bytes) = bound_bytes(self.count, std::mem::size_of::<u32>()) {
            pass.set_index_buffer(self.buffer.slice(..bytes), wgpu::IndexFormat::Uint32);
        }
    }

    /// Number of indices last loaded.
    pub fn count(&self) -> u32 {
        self.count
    }
}

pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl VertexBuffer {
    pub fn new(device: &wgpu::Device, vertices: &[Vertex]) -> Self {
        Self {
            buffer: create_init(
                device,
                "vertex_buffer",
                bytemuck::cast_slice(vertices),
                wgpu::BufferUsages::VERTEX,
            ),
            count: vertices.len() as u32,
        }
    }

    pub fn load(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, vertices: &[Vertex]) {
        reload(
            &mut self.buffer,
            device,
            queue,
            "vertex_buffer",
            bytemuck::cast_slice(vertices),
            wgpu::BufferUsages::VERTEX,
        );
        self.count = vertices.len() as u32;
    }

    /// Does nothing when no vertices are loaded.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, slot: u32) {
        if let Some(bytes) = bound_bytes(self.count, std::mem::size_of::<Vertex>()) {
            pass.set_vertex_buffer(slot, self.buffer.slice(..bytes));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_writes_in_place_when_it_fits() {
        assert!(fits(96, 96));
        assert!(fits(48, 96));
        assert!(fits(0, 0));
        assert!(!fits(97, 96));
        assert!(!fits(4, 0));
    }

    #[test]
    fn empty_buffers_are_not_bound() {
        assert_eq!(bound_bytes(0, std::mem::size_of::<u32>()), None);
        assert_eq!(bound_bytes(0, std::mem::size_of::<Vertex>()), None);
        assert_eq!(bound_bytes(36, std::mem::size_of::<u32>()), Some(144));
        assert_eq!(bound_bytes(24, std::mem::size_of::<Vertex>()), Some(576));
    }
}
