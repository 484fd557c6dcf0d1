//! Scene description and loading
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files.
//! Mesh and texture paths are resolved relative to the scene file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{create_test_cube, load_obj, load_texture, Mesh, MeshError};
use crate::rasterizer::{Color, MeshId, RasterSettings, Texture, TextureSource, Vec3};

/// Error type for scene loading
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("mesh {path}: {source}")]
    Mesh {
        path: PathBuf,
        #[source]
        source: MeshError,
    },
}

/// Starting camera placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { position: Vec3::ZERO, yaw: 0.0, pitch: 0.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Vertical field of view
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { fov_y_degrees: 60.0, z_near: 0.1, z_far: 100.0 }
    }
}

impl ProjectionConfig {
    pub fn fov_y(&self) -> f32 {
        self.fov_y_degrees.to_radians()
    }
}

/// A mesh entry in a scene file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    pub obj: PathBuf,
    #[serde(default)]
    pub texture: Option<PathBuf>,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default)]
    pub translation: Vec3,
    /// Radians per second about X, Y, Z
    #[serde(default)]
    pub spin: Vec3,
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

/// Everything a scene file describes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub settings: RasterSettings,
    pub target_fps: u32,
    pub meshes: Vec<MeshConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
            settings: RasterSettings::default(),
            target_fps: 30,
            meshes: Vec::new(),
        }
    }
}

/// Load a scene description from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneConfig, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Load a scene description from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<SceneConfig, SceneError> {
    let config: SceneConfig = ron::from_str(s)?;
    Ok(config)
}

/// Save a scene description to a RON file
pub fn save_scene<P: AsRef<Path>>(config: &SceneConfig, path: P) -> Result<(), SceneError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Meshes being rendered, addressed by `MeshId`
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self { meshes: Vec::new() }
    }

    /// Add a mesh and return its id
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes.iter().enumerate().map(|(i, m)| (MeshId(i), m))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Advance every mesh's spin
    pub fn update(&mut self, dt: f32) {
        for mesh in &mut self.meshes {
            mesh.update(dt);
        }
    }

    /// Load the meshes listed in `config`, resolving paths against `base_dir`.
    /// An unreadable texture is replaced by a checkerboard; an unreadable mesh
    /// is an error.
    pub fn from_config(config: &SceneConfig, base_dir: &Path) -> Result<Self, SceneError> {
        let mut scene = Scene::new();

        for entry in &config.meshes {
            let obj_path = base_dir.join(&entry.obj);
            let mut mesh = load_obj(&obj_path).map_err(|source| SceneError::Mesh {
                path: obj_path.clone(),
                source,
            })?;

            if let Some(texture) = &entry.texture {
                let texture_path = base_dir.join(texture);
                mesh.texture = Some(match load_texture(&texture_path) {
                    Ok(t) => t,
                    Err(e) => {
                        log::warn!(
                            "texture {} for mesh '{}' unavailable ({}), using checkerboard",
                            texture_path.display(),
                            mesh.name,
                            e
                        );
                        fallback_texture()
                    }
                });
            }

            mesh.scale = entry.scale;
            mesh.rotation = entry.rotation;
            mesh.translation = entry.translation;
            mesh.spin = entry.spin;
            scene.add_mesh(mesh);
        }

        log::info!("scene ready: {} meshes", scene.len());
        Ok(scene)
    }
}

impl TextureSource for Scene {
    fn texture(&self, mesh: MeshId) -> Option<&Texture> {
        self.mesh(mesh).and_then(|m| m.texture.as_ref())
    }
}

/// Texture used when an image cannot be loaded
pub fn fallback_texture() -> Texture {
    Texture::checkerboard(32, 32, Color::new(200, 200, 200), Color::new(80, 80, 160))
}

/// Scene used when no scene file is available: a spinning checkered cube
/// in front of the camera
pub fn builtin_scene() -> Scene {
    let mut cube = create_test_cube().with_texture(fallback_texture());
    cube.translation = Vec3::new(0.0, 0.0, 5.0);
    cube.spin = Vec3::new(0.3, 0.5, 0.0);

    let mut scene = Scene::new();
    scene.add_mesh(cube);
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{CullMode, RenderMode};

    const SCENE: &str = r#"(
        camera: (position: (x: 0.0, y: 1.0, z: -2.0), yaw: 0.5),
        projection: (fov_y_degrees: 90.0),
        settings: (render_mode: FillWire, cull_mode: None),
        target_fps: 60,
        meshes: [
            (
                obj: "crab.obj",
                texture: Some("crab.png"),
                translation: (x: -3.0, y: 0.0, z: 10.0),
            ),
        ],
    )"#;

    #[test]
    fn test_parse_scene_with_defaults() {
        let config = load_scene_from_str(SCENE).unwrap();
        assert_eq!(config.camera.position, Vec3::new(0.0, 1.0, -2.0));
        assert_eq!(config.camera.pitch, 0.0);
        assert!((config.projection.fov_y() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(config.projection.z_far, 100.0);
        assert_eq!(config.settings.render_mode, RenderMode::FillWire);
        assert_eq!(config.settings.cull_mode, CullMode::None);
        assert_eq!(config.settings.light_dir, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(config.target_fps, 60);

        let mesh = &config.meshes[0];
        assert_eq!(mesh.obj, PathBuf::from("crab.obj"));
        assert_eq!(mesh.scale, Vec3::ONE);
        assert_eq!(mesh.spin, Vec3::ZERO);
    }

    #[test]
    fn test_empty_scene_is_default() {
        let config = load_scene_from_str("()").unwrap();
        assert_eq!(config.target_fps, 30);
        assert!(config.meshes.is_empty());
    }

    #[test]
    fn test_malformed_scene() {
        assert!(matches!(
            load_scene_from_str("(target_fps: \"fast\")"),
            Err(SceneError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join("scanline_engine_scene_test.ron");
        let config = load_scene_from_str(SCENE).unwrap();
        save_scene(&config, &path).unwrap();
        let reloaded = load_scene(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(reloaded.meshes.len(), 1);
        assert_eq!(reloaded.meshes[0].texture, Some(PathBuf::from("crab.png")));
        assert_eq!(reloaded.settings.render_mode, RenderMode::FillWire);
    }

    #[test]
    fn test_from_config_loads_obj_and_falls_back_on_texture() {
        let dir = std::env::temp_dir().join("scanline_engine_scene_assets");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tri.obj"), "v 0 0 0\nv 0 1 0\nv 1 0 0\nf 1 2 3\n").unwrap();

        let config = SceneConfig {
            meshes: vec![MeshConfig {
                obj: PathBuf::from("tri.obj"),
                texture: Some(PathBuf::from("missing.png")),
                scale: Vec3::ONE,
                rotation: Vec3::ZERO,
                translation: Vec3::new(0.0, 0.0, 4.0),
                spin: Vec3::new(0.0, 1.0, 0.0),
            }],
            ..SceneConfig::default()
        };

        let scene = Scene::from_config(&config, &dir).unwrap();
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(scene.len(), 1);
        let mesh = scene.mesh(MeshId(0)).unwrap();
        assert_eq!(mesh.faces.len(), 1);
        assert_eq!(mesh.translation, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(scene.texture(MeshId(0)).map(|t| t.name.as_str()), Some("checkerboard"));
        assert!(scene.texture(MeshId(1)).is_none());
    }

    #[test]
    fn test_from_config_missing_mesh() {
        let config = SceneConfig {
            meshes: vec![MeshConfig {
                obj: PathBuf::from("nope.obj"),
                texture: None,
                scale: Vec3::ONE,
                rotation: Vec3::ZERO,
                translation: Vec3::ZERO,
                spin: Vec3::ZERO,
            }],
            ..SceneConfig::default()
        };
        let result = Scene::from_config(&config, Path::new("/nonexistent"));
        assert!(matches!(result, Err(SceneError::Mesh { source: MeshError::Io(_), .. })));
    }

    #[test]
    fn test_shipped_scene_loads() {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        let config = load_scene(assets.join("scene.ron")).unwrap();
        let scene = Scene::from_config(&config, &assets).unwrap();

        assert_eq!(scene.len(), 2);
        let texture = scene.texture(MeshId(0)).unwrap();
        assert_eq!((texture.width, texture.height), (64, 64));
        assert_eq!(texture.name, "crate");
        assert!(scene.texture(MeshId(1)).is_none());
        // quad faces split in two, pyramid base too
        assert_eq!(scene.meshes[0].faces.len(), 12);
        assert_eq!(scene.meshes[1].faces.len(), 6);
    }

    #[test]
    fn test_builtin_scene_and_update() {
        let mut scene = builtin_scene();
        assert_eq!(scene.len(), 1);
        assert!(scene.texture(MeshId(0)).is_some());
        scene.update(2.0);
        let cube = scene.mesh(MeshId(0)).unwrap();
        assert!((cube.rotation - Vec3::new(0.6, 1.0, 0.0)).len() < 1e-6);
    }
}
