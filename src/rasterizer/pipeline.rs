//! Per-frame geometry stage: world/view transform, backface culling,
//! frustum clipping, flat shading and projection to screen space.

use super::clipping::{Frustum, Polygon};
use super::math::{Mat4, Vec2, Vec3, Vec4};
use super::types::{Color, CullMode, Face, MeshId, RasterSettings};

/// Triangle ready for rasterization.
/// `points` are in pixels (x, y), normalized depth (z) and view-space depth (w).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTriangle {
    pub points: [Vec4; 3],
    pub uvs: [Vec2; 3],
    pub color: Color,
    pub mesh: MeshId,
}

/// Scale, then rotate about X, Y, Z, then translate
pub fn world_matrix(scale: Vec3, rotation: Vec3, translation: Vec3) -> Mat4 {
    let mut world = Mat4::scale(scale.x, scale.y, scale.z);
    world = Mat4::rotation_x(rotation.x) * world;
    world = Mat4::rotation_y(rotation.y) * world;
    world = Mat4::rotation_z(rotation.z) * world;
    Mat4::translation(translation.x, translation.y, translation.z) * world
}

/// Unit normal of triangle (a, b, c), from the normalized edges a->b and a->c
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = (b - a).normalize();
    let ac = (c - a).normalize();
    ab.cross(ac).normalize()
}

/// Horizontal field of view matching `fov_y` on a `width` x `height` viewport
pub fn horizontal_fov(fov_y: f32, width: usize, height: usize) -> f32 {
    let aspect_x = width as f32 / height as f32;
    2.0 * ((fov_y / 2.0).tan() * aspect_x).atan()
}

pub struct Pipeline {
    width: usize,
    height: usize,
    fov_y: f32,
    z_near: f32,
    z_far: f32,
    projection: Mat4,
    frustum: Frustum,
    triangles: Vec<ScreenTriangle>,
}

impl Pipeline {
    pub fn new(width: usize, height: usize, fov_y: f32, z_near: f32, z_far: f32) -> Self {
        let mut pipeline = Self {
            width,
            height,
            fov_y,
            z_near,
            z_far,
            projection: Mat4::IDENTITY,
            frustum: Frustum::new(fov_y, fov_y, z_near, z_far),
            triangles: Vec::new(),
        };
        pipeline.rebuild_projection();
        pipeline
    }

    fn rebuild_projection(&mut self) {
        let aspect_y = self.height as f32 / self.width as f32;
        let fov_x = horizontal_fov(self.fov_y, self.width, self.height);
        self.projection = Mat4::perspective(self.fov_y, aspect_y, self.z_near, self.z_far);
        self.frustum = Frustum::new(fov_x, self.fov_y, self.z_near, self.z_far);
    }

    /// Change viewport size (e.g. when toggling resolution)
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.rebuild_projection();
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Drop last frame's triangles, keeping the allocation
    pub fn begin_frame(&mut self) {
        self.triangles.clear();
    }

    pub fn triangles(&self) -> &[ScreenTriangle] {
        &self.triangles
    }

    /// Transform, cull, clip, shade and project every face of a mesh,
    /// appending the surviving triangles to this frame's list.
    pub fn process_mesh(
        &mut self,
        mesh: MeshId,
        vertices: &[Vec3],
        faces: &[Face],
        world: &Mat4,
        view: &Mat4,
        settings: &RasterSettings,
    ) {
        let model_view = *view * *world;
        self.triangles.reserve(faces.len());

        for (face_idx, face) in faces.iter().enumerate() {
            let Some(points) = face_vertices(vertices, face) else {
                log::trace!("mesh {:?}: face {} references a missing vertex, skipped", mesh, face_idx);
                continue;
            };

            let camera_space = points.map(|p| model_view.mul_vec4(Vec4::from_vec3(p)).xyz());
            let normal = face_normal(camera_space[0], camera_space[1], camera_space[2]);

            if settings.cull_mode == CullMode::Backface {
                let camera_ray = -camera_space[0];
                if normal.dot(camera_ray) < 0.0 {
                    continue;
                }
            }

            let mut polygon = Polygon::from_triangle(camera_space, face.uvs);
            if let Err(e) = polygon.clip(&self.frustum) {
                log::trace!("mesh {:?}: face {} skipped: {}", mesh, face_idx, e);
                continue;
            }

            let intensity = -normal.dot(settings.light_dir);
            let color = face.color.shade(intensity);

            for clipped in polygon.triangles() {
                let points = clipped.points.map(|p| self.to_screen(p));
                self.triangles.push(ScreenTriangle {
                    points,
                    uvs: clipped.uvs,
                    color,
                    mesh,
                });
            }
        }
    }

    /// Project a camera-space point and map it to pixel coordinates
    fn to_screen(&self, p: Vec3) -> Vec4 {
        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;

        let mut projected = self.projection.mul_vec4_project(Vec4::from_vec3(p));
        projected.x *= half_w;
        projected.y *= half_h;
        // screen y grows downwards
        projected.y = -projected.y;
        projected.x += half_w;
        projected.y += half_h;
        projected
    }
}

fn face_vertices(vertices: &[Vec3], face: &Face) -> Option<[Vec3; 3]> {
    Some([
        *vertices.get(face.indices[0])?,
        *vertices.get(face.indices[1])?,
        *vertices.get(face.indices[2])?,
    ])
}
