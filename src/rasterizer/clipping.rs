//! View-frustum clipping in camera space
//!
//! Polygons are clipped against each frustum plane in turn, keeping the
//! part on the positive side of the plane normal. The result is convex and
//! gets fanned back into triangles.

use super::math::{Vec2, Vec3};
use super::types::RasterError;

/// A triangle clipped against all six planes grows by at most one vertex per plane
pub const MAX_POLYGON_VERTICES: usize = 3 + FrustumPlane::COUNT;

/// Half-space `dot(x - point, normal) >= 0` is inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    pub fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.point).dot(self.normal)
    }
}

/// Frustum planes in clip order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumPlane {
    Left,
    Right,
    Top,
    Bottom,
    Near,
    Far,
}

impl FrustumPlane {
    pub const COUNT: usize = 6;

    pub const ALL: [FrustumPlane; FrustumPlane::COUNT] = [
        FrustumPlane::Left,
        FrustumPlane::Right,
        FrustumPlane::Top,
        FrustumPlane::Bottom,
        FrustumPlane::Near,
        FrustumPlane::Far,
    ];
}

/// The six clip planes of a symmetric perspective frustum
#[derive(Debug, Clone)]
pub struct Frustum {
    planes: [Plane; FrustumPlane::COUNT],
}

impl Frustum {
    /// `fov_x`/`fov_y` are full angles in radians
    pub fn new(fov_x: f32, fov_y: f32, z_near: f32, z_far: f32) -> Self {
        let (sin_x, cos_x) = (fov_x / 2.0).sin_cos();
        let (sin_y, cos_y) = (fov_y / 2.0).sin_cos();

        let origin = Vec3::ZERO;
        let planes = FrustumPlane::ALL.map(|which| match which {
            FrustumPlane::Left => Plane::new(origin, Vec3::new(cos_x, 0.0, sin_x)),
            FrustumPlane::Right => Plane::new(origin, Vec3::new(-cos_x, 0.0, sin_x)),
            FrustumPlane::Top => Plane::new(origin, Vec3::new(0.0, -cos_y, sin_y)),
            FrustumPlane::Bottom => Plane::new(origin, Vec3::new(0.0, cos_y, sin_y)),
            FrustumPlane::Near => Plane::new(Vec3::new(0.0, 0.0, z_near), Vec3::new(0.0, 0.0, 1.0)),
            FrustumPlane::Far => Plane::new(Vec3::new(0.0, 0.0, z_far), Vec3::new(0.0, 0.0, -1.0)),
        });
        Self { planes }
    }

    pub fn plane(&self, which: FrustumPlane) -> &Plane {
        &self.planes[which as usize]
    }
}

/// Camera-space triangle produced by re-triangulating a clipped polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedTriangle {
    pub points: [Vec3; 3],
    pub uvs: [Vec2; 3],
}

/// Convex polygon with per-vertex texture coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
}

impl Polygon {
    pub fn from_triangle(points: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        let mut vertices = Vec::with_capacity(MAX_POLYGON_VERTICES);
        let mut tex = Vec::with_capacity(MAX_POLYGON_VERTICES);
        vertices.extend_from_slice(&points);
        tex.extend_from_slice(&uvs);
        Self { vertices, uvs: tex }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Keep the part of the polygon on the inside of `plane`.
    /// Vertices exactly on the plane are dropped; crossing edges contribute
    /// their intersection point.
    pub fn clip_against_plane(&mut self, plane: &Plane) -> Result<(), RasterError> {
        let n = self.len();
        if n == 0 {
            return Ok(());
        }

        let mut inside_vertices = Vec::with_capacity(MAX_POLYGON_VERTICES);
        let mut inside_uvs = Vec::with_capacity(MAX_POLYGON_VERTICES);

        let mut prev = n - 1;
        let mut prev_dot = plane.signed_distance(self.vertices[prev]);

        for curr in 0..n {
            let curr_dot = plane.signed_distance(self.vertices[curr]);

            if curr_dot * prev_dot < 0.0 {
                let t = prev_dot / (prev_dot - curr_dot);
                inside_vertices.push(self.vertices[prev].lerp(self.vertices[curr], t));
                inside_uvs.push(self.uvs[prev].lerp(self.uvs[curr], t));
            }

            if curr_dot > 0.0 {
                inside_vertices.push(self.vertices[curr]);
                inside_uvs.push(self.uvs[curr]);
            }

            prev = curr;
            prev_dot = curr_dot;
        }

        if inside_vertices.len() > MAX_POLYGON_VERTICES {
            return Err(RasterError::GeometryOverflow {
                count: inside_vertices.len(),
                max: MAX_POLYGON_VERTICES,
            });
        }

        self.vertices = inside_vertices;
        self.uvs = inside_uvs;
        Ok(())
    }

    /// Clip against all frustum planes (left, right, top, bottom, near, far)
    pub fn clip(&mut self, frustum: &Frustum) -> Result<(), RasterError> {
        for which in FrustumPlane::ALL {
            if self.is_empty() {
                break;
            }
            self.clip_against_plane(frustum.plane(which))?;
        }
        Ok(())
    }

    /// Fan triangulation around vertex 0
    pub fn triangles(&self) -> Vec<ClippedTriangle> {
        let n = self.len();
        if n < 3 {
            return Vec::new();
        }

        (0..n - 2)
            .map(|i| ClippedTriangle {
                points: [self.vertices[0], self.vertices[i + 1], self.vertices[i + 2]],
                uvs: [self.uvs[0], self.uvs[i + 1], self.uvs[i + 2]],
            })
            .collect()
    }
}
