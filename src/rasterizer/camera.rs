//! First-person camera: position, pitch/yaw orientation, movement velocities

use super::math::{Mat4, Vec3, Vec4};

/// Camera state
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Facing direction, refreshed by `look_at_target`
    pub direction: Vec3,
    pub forward_velocity: Vec3,
    pub sideways_velocity: Vec3,
    pub pitch: f32,
    pub yaw: f32,
}

impl Camera {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction,
            forward_velocity: Vec3::ZERO,
            sideways_velocity: Vec3::ZERO,
            pitch: 0.0,
            yaw: 0.0,
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    pub fn set_forward_velocity(&mut self, velocity: Vec3) {
        self.forward_velocity = velocity;
    }

    pub fn set_sideways_velocity(&mut self, velocity: Vec3) {
        self.sideways_velocity = velocity;
    }

    /// Accumulates
    pub fn rotate_yaw(&mut self, delta: f32) {
        self.yaw += delta;
    }

    /// Accumulates
    pub fn rotate_pitch(&mut self, delta: f32) {
        self.pitch += delta;
    }

    /// Rotation from pitch (about X) followed by yaw (about Y)
    pub fn rotation(&self) -> Mat4 {
        let mut rotation = Mat4::IDENTITY;
        rotation = Mat4::rotation_x(self.pitch) * rotation;
        rotation = Mat4::rotation_y(self.yaw) * rotation;
        rotation
    }

    /// Point the camera looks at. Updates `direction` from pitch and yaw.
    pub fn look_at_target(&mut self) -> Vec3 {
        let facing = self.rotation() * Vec4::from_vec3(Vec3::FORWARD);
        self.set_direction(facing.xyz());
        self.position + self.direction
    }

    pub fn view_matrix(&mut self) -> Mat4 {
        let target = self.look_at_target();
        Mat4::look_at(self.position, target, Vec3::UP)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::FORWARD)
    }
}
