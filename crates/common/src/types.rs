use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Spatial transform: position, axis-angle rotation, scale.
///
/// The rotation is stored as an axis plus an angle in radians, which is the
/// form the renderer consumes when building model matrices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation_axis: Vec3,
    /// Rotation around `rotation_axis`, in radians.
    pub rotation_angle: f32,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_axis: Vec3::Y,
            rotation_angle: 0.0,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, axis: Vec3, radians: f32) -> Self {
        self.rotation_axis = axis;
        self.rotation_angle = radians;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation_angle, 0.0);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn transform_builders() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::splat(2.0))
            .with_rotation(Vec3::X, 0.5);
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.scale, Vec3::splat(2.0));
        assert_eq!(t.rotation_axis, Vec3::X);
        assert_eq!(t.rotation_angle, 0.5);
    }
}
