//! CPU scanline rasterizer
//!
//! Features:
//! - Perspective projection with frustum clipping (Sutherland-Hodgman)
//! - Backface culling and flat shading from a single directional light
//! - Flat-bottom / flat-top scanline fill with a 1/w depth buffer
//! - Perspective-correct texture mapping with wrap-around tiling
//! - Wireframe and vertex overlays

mod math;
mod types;
mod camera;
mod clipping;
mod pipeline;
mod render;

pub use math::*;
pub use types::*;
pub use camera::*;
pub use pipeline::*;
pub use render::*;

/// Low resolution framebuffer dimensions
pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 240;

/// High resolution dimensions (2x)
pub const WIDTH_HI: usize = 640;
pub const HEIGHT_HI: usize = 480;
