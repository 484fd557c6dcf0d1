//! Per-frame input snapshot and the camera/settings changes it drives

use macroquad::input::{
    is_key_down, is_key_pressed, is_mouse_button_down, mouse_position, KeyCode, MouseButton,
};

use crate::rasterizer::{Camera, CullMode, RasterSettings, RenderMode, Vec3};

/// Camera speed in units per second
pub const MOVE_SPEED: f32 = 5.0;
/// Radians per pixel of mouse motion
pub const MOUSE_SENSITIVITY: f32 = 0.01;

/// Everything the frame loop needs from the keyboard and mouse
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    /// Mouse motion in pixels while the right button is held
    pub mouse_delta: (f32, f32),
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Render mode selected this frame
    pub render_mode: Option<RenderMode>,
    /// Cull mode selected this frame
    pub cull_mode: Option<CullMode>,
    /// Switch between 320x240 and 640x480
    pub toggle_resolution: bool,
    pub quit: bool,
}

/// Samples macroquad input, remembering the last mouse position for deltas
#[derive(Debug, Default)]
pub struct InputPoller {
    last_mouse: Option<(f32, f32)>,
}

impl InputPoller {
    pub fn new() -> Self {
        Self { last_mouse: None }
    }

    pub fn poll(&mut self) -> InputState {
        let mouse = mouse_position();
        let mouse_delta = match self.last_mouse {
            Some((lx, ly)) if is_mouse_button_down(MouseButton::Right) => (mouse.0 - lx, mouse.1 - ly),
            _ => (0.0, 0.0),
        };
        self.last_mouse = Some(mouse);

        const MODE_KEYS: [KeyCode; 6] = [
            KeyCode::Key1,
            KeyCode::Key2,
            KeyCode::Key3,
            KeyCode::Key4,
            KeyCode::Key5,
            KeyCode::Key6,
        ];
        let render_mode = MODE_KEYS
            .iter()
            .filter(|k| is_key_pressed(**k))
            .find_map(|k| render_mode_for_key(*k));
        let cull_mode = [KeyCode::C, KeyCode::X]
            .iter()
            .filter(|k| is_key_pressed(**k))
            .find_map(|k| cull_mode_for_key(*k));

        InputState {
            mouse_delta,
            forward: is_key_down(KeyCode::W),
            backward: is_key_down(KeyCode::S),
            left: is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::D),
            up: is_key_down(KeyCode::Space),
            down: is_key_down(KeyCode::LeftControl),
            render_mode,
            cull_mode,
            toggle_resolution: is_key_pressed(KeyCode::R),
            quit: is_key_pressed(KeyCode::Escape),
        }
    }
}

/// Number keys 1-6 pick a render mode
pub fn render_mode_for_key(key: KeyCode) -> Option<RenderMode> {
    match key {
        KeyCode::Key1 => Some(RenderMode::WireVertices),
        KeyCode::Key2 => Some(RenderMode::Wire),
        KeyCode::Key3 => Some(RenderMode::Fill),
        KeyCode::Key4 => Some(RenderMode::FillWire),
        KeyCode::Key5 => Some(RenderMode::Textured),
        KeyCode::Key6 => Some(RenderMode::TexturedWire),
        _ => None,
    }
}

pub fn cull_mode_for_key(key: KeyCode) -> Option<CullMode> {
    match key {
        KeyCode::C => Some(CullMode::Backface),
        KeyCode::X => Some(CullMode::None),
        _ => None,
    }
}

/// Mouse look, then movement along the current facing direction
pub fn apply_camera_input(camera: &mut Camera, input: &InputState, dt: f32) {
    let (dx, dy) = input.mouse_delta;
    camera.rotate_yaw(dx * MOUSE_SENSITIVITY);
    camera.rotate_pitch(dy * MOUSE_SENSITIVITY);

    let forward = camera.direction;
    let right = forward.cross(Vec3::UP);
    let step = MOVE_SPEED * dt;

    if input.forward {
        camera.set_forward_velocity(forward * step);
        camera.set_position(camera.position + camera.forward_velocity);
    }
    if input.backward {
        camera.set_forward_velocity(forward * -step);
        camera.set_position(camera.position + camera.forward_velocity);
    }
    if input.left {
        camera.set_sideways_velocity(right * step);
        camera.set_position(camera.position + camera.sideways_velocity);
    }
    if input.right {
        camera.set_sideways_velocity(right * -step);
        camera.set_position(camera.position + camera.sideways_velocity);
    }
    if input.up {
        camera.set_position(camera.position + Vec3::new(0.0, step, 0.0));
    }
    if input.down {
        camera.set_position(camera.position + Vec3::new(0.0, -step, 0.0));
    }
}

/// Apply render mode, cull mode and resolution changes. Returns true when anything changed.
pub fn apply_settings_input(settings: &mut RasterSettings, input: &InputState) -> bool {
    let mut changed = false;
    if let Some(mode) = input.render_mode {
        if settings.render_mode != mode {
            settings.render_mode = mode;
            log::info!("render mode: {}", mode);
            changed = true;
        }
    }
    if let Some(cull) = input.cull_mode {
        if settings.cull_mode != cull {
            settings.cull_mode = cull;
            log::info!("cull mode: {}", cull);
            changed = true;
        }
    }
    if input.toggle_resolution {
        settings.low_resolution = !settings.low_resolution;
        changed = true;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 1e-5
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(render_mode_for_key(KeyCode::Key1), Some(RenderMode::WireVertices));
        assert_eq!(render_mode_for_key(KeyCode::Key2), Some(RenderMode::Wire));
        assert_eq!(render_mode_for_key(KeyCode::Key6), Some(RenderMode::TexturedWire));
        assert_eq!(render_mode_for_key(KeyCode::Key7), None);
        assert_eq!(cull_mode_for_key(KeyCode::C), Some(CullMode::Backface));
        assert_eq!(cull_mode_for_key(KeyCode::X), Some(CullMode::None));
        assert_eq!(cull_mode_for_key(KeyCode::Z), None);
    }

    #[test]
    fn test_forward_and_back() {
        let mut cam = Camera::default();
        let input = InputState { forward: true, ..InputState::default() };
        apply_camera_input(&mut cam, &input, 0.5);
        assert!(approx(cam.position, Vec3::new(0.0, 0.0, 2.5)));
        assert!(approx(cam.forward_velocity, Vec3::new(0.0, 0.0, 2.5)));

        let input = InputState { backward: true, ..InputState::default() };
        apply_camera_input(&mut cam, &input, 0.1);
        assert!(approx(cam.position, Vec3::new(0.0, 0.0, 2.0)));
    }

    #[test]
    fn test_strafe_and_vertical() {
        let mut cam = Camera::default();
        // facing +Z, A strafes towards -X
        let input = InputState { left: true, up: true, ..InputState::default() };
        apply_camera_input(&mut cam, &input, 1.0);
        assert!(approx(cam.position, Vec3::new(-5.0, 5.0, 0.0)));
        assert!(approx(cam.sideways_velocity, Vec3::new(-5.0, 0.0, 0.0)));

        let input = InputState { right: true, down: true, ..InputState::default() };
        apply_camera_input(&mut cam, &input, 1.0);
        assert!(approx(cam.position, Vec3::ZERO));
    }

    #[test]
    fn test_mouse_rotates() {
        let mut cam = Camera::default();
        let input = InputState { mouse_delta: (10.0, -20.0), ..InputState::default() };
        apply_camera_input(&mut cam, &input, 0.016);
        assert!((cam.yaw - 0.1).abs() < 1e-6);
        assert!((cam.pitch + 0.2).abs() < 1e-6);
        assert!(approx(cam.position, Vec3::ZERO));
    }

    #[test]
    fn test_settings_input() {
        let mut settings = RasterSettings::default();
        assert!(!apply_settings_input(&mut settings, &InputState::default()));

        let input = InputState {
            render_mode: Some(RenderMode::Wire),
            cull_mode: Some(CullMode::None),
            ..InputState::default()
        };
        assert!(apply_settings_input(&mut settings, &input));
        assert_eq!(settings.render_mode, RenderMode::Wire);
        assert_eq!(settings.cull_mode, CullMode::None);
        assert!(!apply_settings_input(&mut settings, &input));

        let toggle = InputState { toggle_resolution: true, ..InputState::default() };
        assert!(apply_settings_input(&mut settings, &toggle));
        assert!(!settings.low_resolution);
    }
}
