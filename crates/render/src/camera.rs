use glam::{Mat4, Vec3};
use lumen_common::config::{CameraConfig, MIN_FOV};

/// Pitch limit in degrees when the pitch is constrained.
pub const MAX_PITCH: f32 = 89.0;

/// Direction of a keyboard-driven camera move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Euler-angle fly camera.
///
/// Yaw, pitch and field of view are kept in degrees. `front`, `right` and
/// `up` are derived from yaw, pitch and the world up vector and are
/// recomputed by every operation that changes one of those.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    movement_speed: f32,
    mouse_sensitivity: f32,
    fov: f32,
    max_fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let defaults = CameraConfig::default();
        Self::new(Vec3::ZERO, Vec3::Y, defaults.yaw, defaults.pitch)
    }
}

impl Camera {
    /// Camera at `position` with the given world up vector and angles in degrees.
    pub fn new(position: Vec3, up: Vec3, yaw: f32, pitch: f32) -> Self {
        let config = CameraConfig {
            yaw,
            pitch,
            ..CameraConfig::default()
        };
        Self::from_config(position, up, &config)
    }

    /// Same as [`Camera::new`] with the vectors given as discrete coordinates.
    #[allow(clippy::too_many_arguments)]
    pub fn from_components(
        x: f32,
        y: f32,
        z: f32,
        up_x: f32,
        up_y: f32,
        up_z: f32,
        yaw: f32,
        pitch: f32,
    ) -> Self {
        Self::new(Vec3::new(x, y, z), Vec3::new(up_x, up_y, up_z), yaw, pitch)
    }

    /// Camera with angles, speed, sensitivity and field of view taken from `config`.
    pub fn from_config(position: Vec3, up: Vec3, config: &CameraConfig) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up,
            right: Vec3::X,
            world_up: up,
            yaw: config.yaw,
            pitch: config.pitch,
            movement_speed: config.movement_speed,
            mouse_sensitivity: config.mouse_sensitivity,
            fov: config.fov,
            max_fov: config.max_fov,
        };
        camera.update_camera_vectors();
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, near, far)
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let (axis, sign) = match direction {
            CameraMovement::Forward => (self.front, 1.0),
            CameraMovement::Backward => (self.front, -1.0),
            CameraMovement::Right => (self.right, 1.0),
            CameraMovement::Left => (self.right, -1.0),
            CameraMovement::Up => (self.world_up, 1.0),
            CameraMovement::Down => (self.world_up, -1.0),
        };
        self.position += axis * (sign * self.movement_speed * delta_time);
    }

    /// Apply a look delta. With `constrain_pitch` the pitch saturates at
    /// ±[`MAX_PITCH`] so the view never flips over the poles.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
        }

        self.update_camera_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.fov = (self.fov - y_offset).clamp(MIN_FOV, self.max_fov.max(MIN_FOV));
    }

    pub fn set_movement_speed(&mut self, speed: f32) {
        self.movement_speed = speed;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    pub fn mouse_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn max_fov(&self) -> f32 {
        self.max_fov
    }

    fn update_camera_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
