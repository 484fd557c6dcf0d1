//! Application state and the per-frame update/render steps
//!
//! Everything the frame loop touches lives in `AppState`; the loop in
//! `main` only samples input, calls `update` and `render`, then presents.

use std::time::Duration;

use crate::input::{apply_camera_input, apply_settings_input, InputState};
use crate::rasterizer::{
    begin_frame, render_triangles, Camera, Framebuffer, Pipeline, RasterSettings, Vec3, HEIGHT,
    HEIGHT_HI, WIDTH, WIDTH_HI,
};
use crate::world::{Scene, SceneConfig};

/// Frame pacing against a target frame rate
#[derive(Debug, Clone)]
pub struct FrameTimer {
    target: Duration,
    previous: Option<f64>,
}

impl FrameTimer {
    /// A `target_fps` of 0 disables the cap
    pub fn new(target_fps: u32) -> Self {
        let target = if target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(1_000_000_000 / target_fps as u64)
        };
        Self { target, previous: None }
    }

    pub fn target(&self) -> Duration {
        self.target
    }

    /// How long to wait after spending `spent` on the current frame
    pub fn remaining(&self, spent: Duration) -> Duration {
        self.target.saturating_sub(spent)
    }

    /// Seconds since the previous tick (0 on the first)
    pub fn tick(&mut self, now: f64) -> f32 {
        let dt = match self.previous {
            Some(prev) => (now - prev).max(0.0) as f32,
            None => 0.0,
        };
        self.previous = Some(now);
        dt
    }
}

/// Framebuffer size for the resolution setting
pub fn viewport_size(settings: &RasterSettings) -> (usize, usize) {
    if settings.low_resolution {
        (WIDTH, HEIGHT)
    } else {
        (WIDTH_HI, HEIGHT_HI)
    }
}

/// Main application state
pub struct AppState {
    pub camera: Camera,
    pub scene: Scene,
    pub pipeline: Pipeline,
    pub framebuffer: Framebuffer,
    pub settings: RasterSettings,
    pub timer: FrameTimer,
}

impl AppState {
    pub fn new(config: &SceneConfig, scene: Scene) -> Self {
        let settings = config.settings.clone();
        let (width, height) = viewport_size(&settings);

        let mut camera = Camera::new(config.camera.position, Vec3::FORWARD);
        camera.rotate_yaw(config.camera.yaw);
        camera.rotate_pitch(config.camera.pitch);

        let projection = &config.projection;
        let pipeline = Pipeline::new(width, height, projection.fov_y(), projection.z_near, projection.z_far);

        let timer = FrameTimer::new(config.target_fps);

        log::info!(
            "{}x{}, fov {:.0} deg, mode {}, culling {}",
            pipeline.width(),
            pipeline.height(),
            projection.fov_y_degrees,
            settings.render_mode,
            settings.cull_mode
        );
        log::debug!("frame budget {:?} ({} fps)", timer.target(), config.target_fps);

        Self {
            camera,
            scene,
            pipeline,
            framebuffer: Framebuffer::new(width, height),
            settings,
            timer,
        }
    }

    /// Apply input and advance the scene by `dt` seconds
    pub fn update(&mut self, input: &InputState, dt: f32) {
        if apply_settings_input(&mut self.settings, input) {
            self.apply_resolution();
        }
        apply_camera_input(&mut self.camera, input, dt);
        self.scene.update(dt);
    }

    /// Resize the framebuffer and projection to match `settings.low_resolution`
    fn apply_resolution(&mut self) {
        let (width, height) = viewport_size(&self.settings);
        if (width, height) != (self.framebuffer.width, self.framebuffer.height) {
            self.framebuffer.resize(width, height);
            self.pipeline.resize(width, height);
            log::info!("resolution: {}x{}", self.pipeline.width(), self.pipeline.height());
        }
    }

    /// Transform every mesh and rasterize the frame into the framebuffer
    pub fn render(&mut self) {
        let view = self.camera.view_matrix();

        self.pipeline.begin_frame();
        for (id, mesh) in self.scene.iter() {
            self.pipeline.process_mesh(
                id,
                &mesh.vertices,
                &mesh.faces,
                &mesh.world_matrix(),
                &view,
                &self.settings,
            );
        }

        begin_frame(&mut self.framebuffer, &self.settings);
        render_triangles(&mut self.framebuffer, self.pipeline.triangles(), &self.settings, &self.scene);
    }
}
