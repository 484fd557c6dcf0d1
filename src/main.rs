//! Scanline Engine: CPU software renderer
//!
//! Renders textured OBJ meshes with a scanline rasterizer into an RGBA
//! framebuffer, then blits it to the window:
//! - Perspective projection with frustum clipping
//! - Backface culling and flat shading
//! - Depth-buffered, perspective-correct texture mapping
//! - Wireframe, vertex and grid overlays
//! - Low resolution (320x240) by default

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod input;
mod rasterizer;
mod world;

use std::path::{Path, PathBuf};

use clap::Parser;
use macroquad::prelude::{
    clear_background, draw_text, draw_texture_ex, get_time, next_frame, screen_height,
    screen_width, vec2, Conf, DrawTextureParams, FilterMode, Texture2D, BLACK, WHITE,
};

use app::AppState;
use input::InputPoller;
use rasterizer::{CullMode, Present, RenderMode, HEIGHT, WIDTH};
use world::{builtin_scene, load_scene, save_scene, Scene, SceneConfig};

/// Scanline Engine - CPU software renderer
#[derive(Parser, Debug)]
#[command(name = "scanline-engine", version, about = "CPU scanline software renderer")]
struct Args {
    /// Scene file (RON). Falls back to a built-in cube when missing.
    #[arg(short, long, default_value = "assets/scene.ron")]
    scene: PathBuf,

    /// Render mode: wire, wire+vertices, fill, fill+wire, textured, textured+wire
    #[arg(short, long)]
    mode: Option<RenderMode>,

    /// Face culling: backface or none
    #[arg(long)]
    cull: Option<CullMode>,

    /// Render at 640x480 instead of 320x240
    #[arg(long)]
    hi_res: bool,

    /// Write the effective scene settings (after the flags above) to a RON file
    #[arg(long, value_name = "PATH")]
    save_scene: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Scanline Engine v{}", VERSION),
        window_width: WIDTH as i32 * 3,
        window_height: HEIGHT as i32 * 3,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Blits the framebuffer to the window, scaled to fit with nearest filtering
struct Screen;

impl Present for Screen {
    fn present(&mut self, pixels: &[u8], width: usize, height: usize) {
        let texture = Texture2D::from_rgba8(width as u16, height as u16, pixels);
        texture.set_filter(FilterMode::Nearest);

        let scale = (screen_width() / width as f32).min(screen_height() / height as f32);
        let draw_w = width as f32 * scale;
        let draw_h = height as f32 * scale;
        draw_texture_ex(
            &texture,
            (screen_width() - draw_w) * 0.5,
            (screen_height() - draw_h) * 0.5,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(draw_w, draw_h)),
                ..Default::default()
            },
        );
    }
}

/// Scene file plus the meshes it lists. Any failure falls back to the built-in cube.
fn load_scene_or_builtin(path: &Path) -> (SceneConfig, Scene) {
    if !path.exists() {
        log::info!("no scene file at {}, using built-in cube", path.display());
        return (SceneConfig::default(), builtin_scene());
    }

    let config = match load_scene(path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("failed to load scene {}: {}", path.display(), e);
            return (SceneConfig::default(), builtin_scene());
        }
    };

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    match Scene::from_config(&config, base_dir) {
        Ok(scene) if !scene.is_empty() => (config, scene),
        Ok(_) => {
            log::warn!("scene {} lists no meshes, adding built-in cube", path.display());
            (config, builtin_scene())
        }
        Err(e) => {
            log::error!("failed to load scene meshes: {}", e);
            (config, builtin_scene())
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    log::info!("=== Scanline Engine v{} ===", VERSION);

    let (mut config, scene) = load_scene_or_builtin(&args.scene);
    if let Some(mode) = args.mode {
        config.settings.render_mode = mode;
    }
    if let Some(cull) = args.cull {
        config.settings.cull_mode = cull;
    }
    if args.hi_res {
        config.settings.low_resolution = false;
    }
    if let Some(path) = &args.save_scene {
        match save_scene(&config, path) {
            Ok(()) => log::info!("saved scene to {}", path.display()),
            Err(e) => log::error!("failed to save scene {}: {}", path.display(), e),
        }
    }

    let mut app = AppState::new(&config, scene);
    let mut poller = InputPoller::new();
    let mut screen = Screen;

    loop {
        let frame_start = get_time();
        let dt = app.timer.tick(frame_start);

        let input = poller.poll();
        if input.quit {
            break;
        }

        app.update(&input, dt);
        app.render();

        clear_background(BLACK);
        app.framebuffer.present(&mut screen);
        draw_text(
            &format!("{} | cull {} | 1-6 mode, C/X cull, R resolution", app.settings.render_mode, app.settings.cull_mode),
            8.0,
            20.0,
            20.0,
            WHITE,
        );

        #[cfg(not(target_arch = "wasm32"))]
        {
            let spent = std::time::Duration::from_secs_f64((get_time() - frame_start).max(0.0));
            let wait = app.timer.remaining(spent);
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }

        next_frame().await
    }
}
