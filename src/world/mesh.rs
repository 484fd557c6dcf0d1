//! Mesh data: vertices, triangle faces, optional texture and a model transform

use crate::rasterizer::{world_matrix, Face, Mat4, Texture, Vec2, Vec3};

/// A triangle mesh placed in the scene
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    /// Vertices in model space
    pub vertices: Vec<Vec3>,
    /// Faces referencing vertices by index
    pub faces: Vec<Face>,
    /// Decoded texture. Textured render modes fall back to solid fill without one.
    pub texture: Option<Texture>,
    pub scale: Vec3,
    /// Euler angles (radians) about X, Y, Z
    pub rotation: Vec3,
    pub translation: Vec3,
    /// Rotation added per second
    pub spin: Vec3,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            faces: Vec::new(),
            texture: None,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            translation: Vec3::ZERO,
            spin: Vec3::ZERO,
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, x: f32, y: f32, z: f32) -> usize {
        self.vertices.push(Vec3::new(x, y, z));
        self.vertices.len() - 1
    }

    /// Add a triangle face
    pub fn add_tri(&mut self, v0: usize, v1: usize, v2: usize, uvs: [Vec2; 3]) {
        self.faces.push(Face::with_uvs([v0, v1, v2], uvs));
    }

    /// Add a quad as two triangles (v0, v1, v2) and (v0, v2, v3), mapping the
    /// full texture across it
    pub fn add_quad(&mut self, v0: usize, v1: usize, v2: usize, v3: usize) {
        let uv0 = Vec2::new(0.0, 1.0);
        let uv1 = Vec2::new(0.0, 0.0);
        let uv2 = Vec2::new(1.0, 0.0);
        let uv3 = Vec2::new(1.0, 1.0);
        self.add_tri(v0, v1, v2, [uv0, uv1, uv2]);
        self.add_tri(v0, v2, v3, [uv0, uv2, uv3]);
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn world_matrix(&self) -> Mat4 {
        world_matrix(self.scale, self.rotation, self.translation)
    }

    /// Advance the spin animation
    pub fn update(&mut self, dt: f32) {
        self.rotation = self.rotation + self.spin * dt;
    }
}

/// Unit cube (-1..1 on each axis), every face wound clockwise when seen from outside
pub fn create_test_cube() -> Mesh {
    let mut mesh = Mesh::new("cube");

    let v0 = mesh.add_vertex(-1.0, -1.0, -1.0);
    let v1 = mesh.add_vertex(-1.0, 1.0, -1.0);
    let v2 = mesh.add_vertex(1.0, 1.0, -1.0);
    let v3 = mesh.add_vertex(1.0, -1.0, -1.0);
    let v4 = mesh.add_vertex(1.0, 1.0, 1.0);
    let v5 = mesh.add_vertex(1.0, -1.0, 1.0);
    let v6 = mesh.add_vertex(-1.0, 1.0, 1.0);
    let v7 = mesh.add_vertex(-1.0, -1.0, 1.0);

    // Front (-Z)
    mesh.add_quad(v0, v1, v2, v3);
    // Right (+X)
    mesh.add_quad(v3, v2, v4, v5);
    // Back (+Z)
    mesh.add_quad(v5, v4, v6, v7);
    // Left (-X)
    mesh.add_quad(v7, v6, v1, v0);
    // Top (+Y)
    mesh.add_quad(v1, v6, v4, v2);
    // Bottom (-Y)
    mesh.add_quad(v5, v7, v0, v3);

    mesh
}
