//! Vector and matrix math for the transform pipeline
//!
//! Left-handed coordinates: +X right, +Y up, +Z into the screen.
//! Matrices are row-major and multiply column vectors (`m * v`).

use std::ops::{Add, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const FORWARD: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy; a zero vector stays zero instead of turning into NaN
    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Linear interpolation towards `other`
    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        Vec3 {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            z: lerp(self.z, other.z, t),
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        self.scale(-1.0)
    }
}

/// 2D Vector (screen positions and texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Z component of the 3D cross product (signed parallelogram area)
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        Vec2 {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
        }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Homogeneous 4D vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Promote a point (w = 1)
    pub fn from_vec3(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z, w: 1.0 }
    }

    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn xy(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// 4x4 matrix, `m[row][col]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn scale(sx: f32, sy: f32, sz: f32) -> Self {
        let mut r = Self::IDENTITY;
        r.m[0][0] = sx;
        r.m[1][1] = sy;
        r.m[2][2] = sz;
        r
    }

    pub fn translation(tx: f32, ty: f32, tz: f32) -> Self {
        let mut r = Self::IDENTITY;
        r.m[0][3] = tx;
        r.m[1][3] = ty;
        r.m[2][3] = tz;
        r
    }

    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::IDENTITY;
        r.m[1][1] = c;
        r.m[1][2] = -s;
        r.m[2][1] = s;
        r.m[2][2] = c;
        r
    }

    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::IDENTITY;
        r.m[0][0] = c;
        r.m[0][2] = s;
        r.m[2][0] = -s;
        r.m[2][2] = c;
        r
    }

    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::IDENTITY;
        r.m[0][0] = c;
        r.m[0][1] = -s;
        r.m[1][0] = s;
        r.m[1][1] = c;
        r
    }

    /// Perspective projection.
    /// `aspect` is height / width. After `mul_vec4_project`, view-space z in
    /// [near, far] lands in [0, 1] and `w` holds the original view-space z.
    pub fn perspective(fov_y: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let mut r = Mat4 { m: [[0.0; 4]; 4] };
        r.m[0][0] = aspect * f;
        r.m[1][1] = f;
        r.m[2][2] = z_far / (z_far - z_near);
        r.m[2][3] = (-z_far * z_near) / (z_far - z_near);
        r.m[3][2] = 1.0;
        r
    }

    /// View matrix looking from `eye` towards `target`
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let z = (target - eye).normalize();
        let x = up.cross(z).normalize();
        let y = z.cross(x);

        Mat4 {
            m: [
                [x.x, x.y, x.z, -x.dot(eye)],
                [y.x, y.y, y.z, -y.dot(eye)],
                [z.x, z.y, z.z, -z.dot(eye)],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn mul_vec4(&self, v: Vec4) -> Vec4 {
        let row = |i: usize| {
            self.m[i][0] * v.x + self.m[i][1] * v.y + self.m[i][2] * v.z + self.m[i][3] * v.w
        };
        Vec4::new(row(0), row(1), row(2), row(3))
    }

    /// Multiply, then divide x/y/z by w. The returned `w` is left undivided.
    pub fn mul_vec4_project(&self, v: Vec4) -> Vec4 {
        let mut result = self.mul_vec4(v);
        if result.w != 0.0 {
            result.x /= result.w;
            result.y /= result.w;
            result.z /= result.w;
        }
        result
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        let mut r = Mat4 { m: [[0.0; 4]; 4] };
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j]
                    + self.m[i][3] * other.m[3][j];
            }
        }
        r
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        self.mul_vec4(v)
    }
}

/// Barycentric weights (alpha, beta, gamma) of `p` in triangle (a, b, c),
/// from ratios of signed parallelogram areas.
/// Returns `None` for a zero-area triangle.
pub fn barycentric_weights(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> Option<Vec3> {
    let ac = c - a;
    let ab = b - a;
    let area = ac.cross(ab);
    if area == 0.0 {
        return None;
    }

    let ap = p - a;
    let pc = c - p;
    let pb = b - p;

    let alpha = pc.cross(pb) / area;
    let beta = ac.cross(ap) / area;
    let gamma = 1.0 - alpha - beta;

    Some(Vec3::new(alpha, beta, gamma))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!((c.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
        let n = Vec3::new(3.0, 0.0, 4.0).normalize();
        assert!(approx(n.len(), 1.0));
    }

    #[test]
    fn test_vec4_round_trip() {
        let v = Vec3::new(1.5, -2.25, 7.0);
        let h = Vec4::from_vec3(v);
        assert_eq!(h.w, 1.0);
        assert_eq!(h.xyz(), v);
    }

    #[test]
    fn test_perspective_projects_depth_into_w() {
        let proj = Mat4::perspective(60f32.to_radians(), 1.0, 0.1, 100.0);
        let p = proj.mul_vec4_project(Vec4::from_vec3(Vec3::new(0.0, 0.0, 5.0)));
        assert!(approx(p.y, 0.0));
        assert!(approx(p.x, 0.0));
        assert!(approx(p.w, 5.0));
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn test_perspective_maps_near_and_far_to_unit_range() {
        let proj = Mat4::perspective(60f32.to_radians(), 0.75, 0.1, 100.0);
        let near = proj.mul_vec4_project(Vec4::from_vec3(Vec3::new(0.0, 0.0, 0.1)));
        let far = proj.mul_vec4_project(Vec4::from_vec3(Vec3::new(0.0, 0.0, 100.0)));
        assert!(near.z.abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_look_at_from_origin_down_z_is_identity() {
        let view = Mat4::look_at(Vec3::ZERO, Vec3::FORWARD, Vec3::UP);
        for i in 0..4 {
            for j in 0..4 {
                assert!(approx(view.m[i][j], Mat4::IDENTITY.m[i][j]));
            }
        }
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(2.0, 3.0, -4.0);
        let view = Mat4::look_at(eye, eye + Vec3::new(1.0, 0.0, 0.0), Vec3::UP);
        let p = view * Vec4::from_vec3(eye);
        assert!(approx(p.x, 0.0) && approx(p.y, 0.0) && approx(p.z, 0.0));
        // A point one unit along the view direction ends up on +Z
        let ahead = view * Vec4::from_vec3(eye + Vec3::new(1.0, 0.0, 0.0));
        assert!(approx(ahead.z, 1.0));
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let r = Mat4::rotation_y(std::f32::consts::FRAC_PI_2);
        let v = r * Vec4::from_vec3(Vec3::FORWARD);
        assert!(approx(v.x, 1.0));
        assert!(approx(v.z, 0.0));
    }

    #[test]
    fn test_matrix_product_applies_right_to_left() {
        let m = Mat4::translation(1.0, 0.0, 0.0) * Mat4::scale(2.0, 2.0, 2.0);
        let v = m * Vec4::from_vec3(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(v.xyz(), Vec3::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn test_barycentric_at_vertices() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        let c = Vec2::new(5.0, 10.0);

        let wa = barycentric_weights(a, b, c, a).unwrap();
        let wb = barycentric_weights(a, b, c, b).unwrap();
        let wc = barycentric_weights(a, b, c, c).unwrap();

        assert!(approx(wa.x, 1.0) && approx(wa.y, 0.0) && approx(wa.z, 0.0));
        assert!(approx(wb.x, 0.0) && approx(wb.y, 1.0) && approx(wb.z, 0.0));
        assert!(approx(wc.x, 0.0) && approx(wc.y, 0.0) && approx(wc.z, 1.0));
    }

    #[test]
    fn test_barycentric_inside() {
        let bc = barycentric_weights(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, 10.0),
            Vec2::new(5.0, 3.0),
        )
        .unwrap();
        assert!(bc.x >= 0.0 && bc.y >= 0.0 && bc.z >= 0.0);
        assert!(approx(bc.x + bc.y + bc.z, 1.0));
    }

    #[test]
    fn test_barycentric_degenerate() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(5.0, 5.0);
        let c = Vec2::new(10.0, 10.0);
        assert!(barycentric_weights(a, b, c, Vec2::new(1.0, 1.0)).is_none());
    }
}
