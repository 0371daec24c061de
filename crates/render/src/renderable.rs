use glam::{Mat4, Vec3};

/// A GPU program handle as seen by the flush pipeline.
pub trait Shader {
    fn enable(&mut self);
    fn disable(&mut self);
    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4);
}

/// Anything the renderer can queue and draw with a shader of type `S`.
///
/// Renderables are owned by application code. The renderer only borrows
/// them for the frame they are submitted in.
pub trait Renderable<S> {
    fn position(&self) -> Vec3;
    fn rotation_axis(&self) -> Vec3;
    /// Rotation around [`Renderable::rotation_axis`], in radians.
    fn radian_rotation(&self) -> f32;
    fn scale(&self) -> Vec3;
    fn should_outline(&self) -> bool;
    fn draw(&self, shader: &mut S);
}
