//! Core rendering functions
//! Scanline triangle rasterization with a depth buffer and
//! perspective-correct texture mapping

use super::math::{barycentric_weights, Vec2, Vec4};
use super::pipeline::ScreenTriangle;
use super::types::{Color, RasterError, RasterSettings, Texture, TextureSource};

/// Depth value of an empty pixel (farthest possible)
pub const FAR_DEPTH: f32 = 1.0;

/// Spacing of the background grid dots
const GRID_SPACING: usize = 10;

/// Half size of the square drawn on each vertex
const VERTEX_MARKER_HALF: i32 = 3;

/// Display collaborator receiving the finished color buffer
pub trait Present {
    /// `pixels` is RGBA, 4 bytes per pixel, row-major
    fn present(&mut self, pixels: &[u8], width: usize, height: usize);
}

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>,    // RGBA, 4 bytes per pixel
    pub zbuffer: Vec<f32>,  // Depth buffer, FAR_DEPTH when empty
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            zbuffer: vec![FAR_DEPTH; width * height],
            width,
            height,
        }
    }

    /// Reallocate for a new resolution (contents are discarded)
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            *self = Self::new(width, height);
        }
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    pub fn clear_depth(&mut self) {
        self.zbuffer.fill(FAR_DEPTH);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            None
        } else {
            Some(y as usize * self.width + x as usize)
        }
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx * 4..idx * 4 + 4].copy_from_slice(&color.to_bytes());
        }
    }

    #[cfg(test)]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|idx| {
            let p = &self.pixels[idx * 4..idx * 4 + 4];
            Color::from_bytes([p[0], p[1], p[2], p[3]])
        })
    }

    /// Out-of-bounds reads report the far plane
    pub fn depth_at(&self, x: i32, y: i32) -> f32 {
        match self.index(x, y) {
            Some(idx) => self.zbuffer[idx],
            None => FAR_DEPTH,
        }
    }

    pub fn set_depth(&mut self, x: i32, y: i32, depth: f32) {
        if let Some(idx) = self.index(x, y) {
            self.zbuffer[idx] = depth;
        }
    }

    /// Write color and depth if `depth` is strictly nearer than the stored value
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, depth: f32, color: Color) -> bool {
        if let Some(idx) = self.index(x, y) {
            if depth < self.zbuffer[idx] {
                self.zbuffer[idx] = depth;
                self.pixels[idx * 4..idx * 4 + 4].copy_from_slice(&color.to_bytes());
                return true;
            }
        }
        false
    }

    /// Hand the color buffer to the display
    pub fn present<P: Present + ?Sized>(&self, target: &mut P) {
        target.present(&self.pixels, self.width, self.height);
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Filled rectangle covering x..=x+width, y..=y+height
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        for py in y..=y + height {
            for px in x..=x + width {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Dotted background grid
    pub fn draw_grid(&mut self, color: Color) {
        for y in (0..self.height).step_by(GRID_SPACING) {
            for x in (0..self.width).step_by(GRID_SPACING) {
                self.set_pixel(x as i32, y as i32, color);
            }
        }
    }
}

/// Screen positions of the sorted vertices, rejecting zero-area triangles
fn screen_corners(v: &[ScanVertex; 3]) -> Result<[Vec2; 3], RasterError> {
    let corners = [v[0].point.xy(), v[1].point.xy(), v[2].point.xy()];
    let [a, b, c] = corners;
    if (c - a).cross(b - a) == 0.0 {
        return Err(RasterError::DegenerateTriangle);
    }
    Ok(corners)
}

/// Vertex after truncation to the pixel grid, carrying its attributes
#[derive(Clone, Copy)]
struct ScanVertex {
    x: i32,
    y: i32,
    point: Vec4,
    uv: Vec2,
}

/// Truncate to pixel coordinates and sort by ascending y (stable 3-compare sort)
fn sorted_vertices(tri: &ScreenTriangle) -> [ScanVertex; 3] {
    let mut v = [0, 1, 2].map(|i| {
        let p = tri.points[i];
        let x = p.x as i32;
        let y = p.y as i32;
        ScanVertex {
            x,
            y,
            point: Vec4::new(x as f32, y as f32, p.z, p.w),
            uv: tri.uvs[i],
        }
    });

    if v[0].y > v[1].y {
        v.swap(0, 1);
    }
    if v[1].y > v[2].y {
        v.swap(1, 2);
    }
    if v[0].y > v[1].y {
        v.swap(0, 1);
    }
    v
}

/// Walk the flat-bottom (top vertex to middle) and flat-top (middle to bottom)
/// halves and call `plot` for every covered pixel inside a `width` x `height` target.
fn scan_triangle<F: FnMut(i32, i32)>(v: &[ScanVertex; 3], width: usize, height: usize, mut plot: F) {
    let (x0, y0) = (v[0].x, v[0].y);
    let (x1, y1) = (v[1].x, v[1].y);
    let (x2, y2) = (v[2].x, v[2].y);
    let max_x = width as i32 - 1;
    let max_y = height as i32 - 1;

    let long_slope = if y2 != y0 {
        (x2 - x0) as f32 / (y2 - y0).abs() as f32
    } else {
        0.0
    };

    let mut span = |y: i32, short_slope: f32| {
        let mut x_start = (x1 as f32 + (y - y1) as f32 * short_slope) as i32;
        let mut x_end = (x0 as f32 + (y - y0) as f32 * long_slope) as i32;
        if x_end < x_start {
            std::mem::swap(&mut x_start, &mut x_end);
        }
        for x in x_start.max(0)..=x_end.min(max_x) {
            plot(x, y);
        }
    };

    if y1 != y0 {
        let short_slope = (x1 - x0) as f32 / (y1 - y0).abs() as f32;
        for y in y0.max(0)..=y1.min(max_y) {
            span(y, short_slope);
        }
    }

    if y2 != y1 {
        let short_slope = (x2 - x1) as f32 / (y2 - y1).abs() as f32;
        for y in y1.max(0)..=y2.min(max_y) {
            span(y, short_slope);
        }
    }
}

/// Fill a triangle with a solid color.
/// Depth is `1 - interpolated(1/w)`, so nearer pixels have smaller values.
pub fn draw_filled_triangle(fb: &mut Framebuffer, tri: &ScreenTriangle, color: Color) -> Result<(), RasterError> {
    let v = sorted_vertices(tri);
    let [a, b, c] = screen_corners(&v)?;
    let inv_w = [1.0 / v[0].point.w, 1.0 / v[1].point.w, 1.0 / v[2].point.w];

    let (width, height) = (fb.width, fb.height);
    scan_triangle(&v, width, height, |x, y| {
        let Some(w) = barycentric_weights(a, b, c, Vec2::new(x as f32, y as f32)) else {
            return;
        };
        let interpolated_inv_w = inv_w[0] * w.x + inv_w[1] * w.y + inv_w[2] * w.z;
        fb.set_pixel_with_depth(x, y, 1.0 - interpolated_inv_w, color);
    });

    Ok(())
}

/// Fill a triangle with perspective-correct texture samples
pub fn draw_textured_triangle(fb: &mut Framebuffer, tri: &ScreenTriangle, texture: &Texture) -> Result<(), RasterError> {
    if texture.is_empty() {
        return Err(RasterError::EmptyTexture);
    }

    let mut v = sorted_vertices(tri);
    // Image rows run top-down, texture V runs bottom-up
    for vert in &mut v {
        vert.uv.y = 1.0 - vert.uv.y;
    }

    let [a, b, c] = screen_corners(&v)?;
    let inv_w = [1.0 / v[0].point.w, 1.0 / v[1].point.w, 1.0 / v[2].point.w];
    let u_over_w = [v[0].uv.x * inv_w[0], v[1].uv.x * inv_w[1], v[2].uv.x * inv_w[2]];
    let v_over_w = [v[0].uv.y * inv_w[0], v[1].uv.y * inv_w[1], v[2].uv.y * inv_w[2]];

    let (width, height) = (fb.width, fb.height);
    scan_triangle(&v, width, height, |x, y| {
        let Some(w) = barycentric_weights(a, b, c, Vec2::new(x as f32, y as f32)) else {
            return;
        };

        let interpolated_inv_w = inv_w[0] * w.x + inv_w[1] * w.y + inv_w[2] * w.z;
        let depth = 1.0 - interpolated_inv_w;
        if depth >= fb.depth_at(x, y) {
            return;
        }

        let u = (u_over_w[0] * w.x + u_over_w[1] * w.y + u_over_w[2] * w.z) / interpolated_inv_w;
        let tv = (v_over_w[0] * w.x + v_over_w[1] * w.y + v_over_w[2] * w.z) / interpolated_inv_w;

        fb.set_pixel(x, y, texture.sample_wrapped(u, tv));
        fb.set_depth(x, y, depth);
    });

    Ok(())
}

/// Triangle outline
pub fn draw_wireframe(fb: &mut Framebuffer, tri: &ScreenTriangle, color: Color) {
    let p = tri.points.map(|p| (p.x as i32, p.y as i32));
    fb.draw_line(p[0].0, p[0].1, p[1].0, p[1].1, color);
    fb.draw_line(p[1].0, p[1].1, p[2].0, p[2].1, color);
    fb.draw_line(p[2].0, p[2].1, p[0].0, p[0].1, color);
}

/// Start a frame: clear color and depth, draw the background
pub fn begin_frame(fb: &mut Framebuffer, settings: &RasterSettings) {
    fb.clear(Color::BLACK);
    fb.clear_depth();
    if settings.show_grid {
        fb.draw_grid(Color::GRID);
    }
}

/// Rasterize the frame's triangles in emission order according to the render mode.
/// Primitives that fail are skipped.
pub fn render_triangles<T: TextureSource + ?Sized>(
    fb: &mut Framebuffer,
    triangles: &[ScreenTriangle],
    settings: &RasterSettings,
    textures: &T,
) {
    let mode = settings.render_mode;

    for tri in triangles {
        if mode.draws_fill() {
            if let Err(e) = draw_filled_triangle(fb, tri, tri.color) {
                log::trace!("skipped filled triangle: {}", e);
            }
        }

        if mode.draws_textured() {
            let result = match textures.texture(tri.mesh) {
                Some(texture) => draw_textured_triangle(fb, tri, texture),
                None => draw_filled_triangle(fb, tri, tri.color),
            };
            if let Err(e) = result {
                log::trace!("skipped textured triangle: {}", e);
            }
        }

        if mode.draws_wire() {
            draw_wireframe(fb, tri, Color::WHITE);
        }

        if mode.draws_vertices() {
            for p in &tri.points {
                fb.draw_rect(
                    p.x as i32 - VERTEX_MARKER_HALF,
                    p.y as i32 - VERTEX_MARKER_HALF,
                    2 * VERTEX_MARKER_HALF,
                    2 * VERTEX_MARKER_HALF,
                    Color::RED,
                );
            }
        }
    }
}
