//! Core types for the rasterizer

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::math::{Vec2, Vec3};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    /// Background grid dots
    pub const GRID: Color = Color { r: 0x44, g: 0x44, b: 0x44, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Apply shading (multiply by intensity 0.0-1.0)
    pub fn shade(self, intensity: f32) -> Self {
        let i = intensity.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * i) as u8,
            g: (self.g as f32 * i) as u8,
            b: (self.b as f32 * i) as u8,
            a: self.a,
        }
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[cfg(test)]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::with_alpha(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

/// A triangle face (indices into the owning mesh's vertex array)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub indices: [usize; 3],
    pub uvs: [Vec2; 3],
    pub color: Color,
}

impl Face {
    pub fn with_uvs(indices: [usize; 3], uvs: [Vec2; 3]) -> Self {
        Self {
            indices,
            uvs,
            color: Color::WHITE,
        }
    }
}

/// Handle to a mesh owned by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeshId(pub usize);

/// Lookup of the decoded texture belonging to a mesh
pub trait TextureSource {
    fn texture(&self, mesh: MeshId) -> Option<&Texture>;
}

impl TextureSource for [Texture] {
    fn texture(&self, mesh: MeshId) -> Option<&Texture> {
        self.get(mesh.0)
    }
}

/// Simple texture (array of colors)
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::WHITE; width * height],
            name: String::new(),
        }
    }

    /// Load texture from an image file (PNG, JPEG or BMP)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, image::ImageError> {
        let path = path.as_ref();
        let img = image::open(path)?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self::from_image(img, name))
    }

    fn from_image(img: image::DynamicImage, name: String) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        }
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut texture = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                texture.pixels[y * width + x] = if checker { color1 } else { color2 };
            }
        }
        texture.name = "checkerboard".to_string();
        texture
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Sample at UV coordinates with wrap-around tiling (no filtering).
    /// Callers must check `is_empty` first.
    pub fn sample_wrapped(&self, u: f32, v: f32) -> Color {
        let tx = ((u * self.width as f32) as i32).unsigned_abs() as usize % self.width;
        let ty = ((v * self.height as f32) as i32).unsigned_abs() as usize % self.height;
        self.pixels[ty * self.width + tx]
    }
}

/// What gets drawn for each screen-space triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    Wire,
    WireVertices,
    Fill,
    FillWire,
    Textured,
    TexturedWire,
}

impl RenderMode {
    pub fn draws_fill(self) -> bool {
        matches!(self, RenderMode::Fill | RenderMode::FillWire)
    }

    pub fn draws_textured(self) -> bool {
        matches!(self, RenderMode::Textured | RenderMode::TexturedWire)
    }

    pub fn draws_wire(self) -> bool {
        matches!(
            self,
            RenderMode::Wire | RenderMode::WireVertices | RenderMode::FillWire | RenderMode::TexturedWire
        )
    }

    pub fn draws_vertices(self) -> bool {
        self == RenderMode::WireVertices
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Wire => "wire",
            RenderMode::WireVertices => "wire+vertices",
            RenderMode::Fill => "fill",
            RenderMode::FillWire => "fill+wire",
            RenderMode::Textured => "textured",
            RenderMode::TexturedWire => "textured+wire",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RenderMode {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wire" => Ok(RenderMode::Wire),
            "wire+vertices" => Ok(RenderMode::WireVertices),
            "fill" => Ok(RenderMode::Fill),
            "fill+wire" => Ok(RenderMode::FillWire),
            "textured" => Ok(RenderMode::Textured),
            "textured+wire" => Ok(RenderMode::TexturedWire),
            other => Err(ParseSettingError::RenderMode(other.to_string())),
        }
    }
}

/// Face culling method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullMode {
    Backface,
    None,
}

impl fmt::Display for CullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CullMode::Backface => f.write_str("backface"),
            CullMode::None => f.write_str("none"),
        }
    }
}

impl FromStr for CullMode {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backface" => Ok(CullMode::Backface),
            "none" => Ok(CullMode::None),
            other => Err(ParseSettingError::CullMode(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseSettingError {
    #[error("unknown render mode '{0}' (expected wire, wire+vertices, fill, fill+wire, textured or textured+wire)")]
    RenderMode(String),
    #[error("unknown cull mode '{0}' (expected backface or none)")]
    CullMode(String),
}

/// Per-primitive failures. The offending primitive is skipped, the frame goes on.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RasterError {
    #[error("clipped polygon needs {count} vertices, capacity is {max}")]
    GeometryOverflow { count: usize, max: usize },
    #[error("triangle has zero screen-space area")]
    DegenerateTriangle,
    #[error("texture has a zero dimension")]
    EmptyTexture,
}

/// Rasterizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    pub render_mode: RenderMode,
    pub cull_mode: CullMode,
    /// Light direction (for flat shading)
    pub light_dir: Vec3,
    /// Draw the dotted background grid
    pub show_grid: bool,
    /// Use low resolution (320x240) instead of high resolution
    pub low_resolution: bool,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Textured,
            cull_mode: CullMode::Backface,
            light_dir: Vec3::new(0.0, 0.0, 1.0),
            show_grid: true,
            low_resolution: true,
        }
    }
}
