//! Wavefront OBJ loading
//!
//! Reads `v`, `vt` and `f` records. Face corners may be written as `v`,
//! `v/vt`, `v/vt/vn` or `v//vn`; polygons are fan-triangulated. Every other
//! record is ignored.

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::Mesh;
use crate::rasterizer::{Face, Texture, Vec2, Vec3};

/// Error type for mesh and texture loading
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("line {line}: {kind} index {index} out of range ({count} defined)")]
    IndexOutOfRange {
        line: usize,
        kind: &'static str,
        index: usize,
        count: usize,
    },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// One face corner, 0-based
#[derive(Debug, Clone, Copy)]
struct Corner {
    vertex: usize,
    uv: Option<usize>,
}

/// Load a mesh from an OBJ file. The mesh is named after the file stem.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mesh = parse_obj_str(&name, &contents)?;
    log::info!(
        "loaded mesh '{}' from {}: {} vertices, {} faces",
        mesh.name,
        path.display(),
        mesh.vertices.len(),
        mesh.faces.len()
    );
    Ok(mesh)
}

/// Parse OBJ text into a mesh
pub fn parse_obj_str(name: &str, src: &str) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new(name);
    let mut tex_coords: Vec<Vec2> = Vec::new();
    // Indices are checked once every record is read
    let mut polygons: Vec<(usize, Vec<Corner>)> = Vec::new();

    for (i, raw) in src.lines().enumerate() {
        let line = i + 1;
        let mut tokens = raw.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let x = parse_float(tokens.next(), line, "vertex x")?;
                let y = parse_float(tokens.next(), line, "vertex y")?;
                let z = parse_float(tokens.next(), line, "vertex z")?;
                mesh.vertices.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let u = parse_float(tokens.next(), line, "texture u")?;
                let v = match tokens.next() {
                    Some(t) => parse_float(Some(t), line, "texture v")?,
                    None => 0.0,
                };
                tex_coords.push(Vec2::new(u, v));
            }
            "f" => {
                let corners = tokens
                    .map(|t| parse_corner(t, line))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(MeshError::Parse {
                        line,
                        message: format!("face needs at least 3 vertices, got {}", corners.len()),
                    });
                }
                polygons.push((line, corners));
            }
            _ => {}
        }
    }

    for (line, corners) in &polygons {
        for corner in corners {
            check_index(*line, "vertex", corner.vertex, mesh.vertices.len())?;
            if let Some(uv) = corner.uv {
                check_index(*line, "texture coordinate", uv, tex_coords.len())?;
            }
        }

        let uv_of = |c: &Corner| c.uv.map(|i| tex_coords[i]).unwrap_or_default();
        let first = &corners[0];
        for pair in corners[1..].windows(2) {
            mesh.faces.push(Face::with_uvs(
                [first.vertex, pair[0].vertex, pair[1].vertex],
                [uv_of(first), uv_of(&pair[0]), uv_of(&pair[1])],
            ));
        }
    }

    Ok(mesh)
}

/// Decode a texture image (PNG, JPEG or BMP)
pub fn load_texture<P: AsRef<Path>>(path: P) -> Result<Texture, MeshError> {
    let texture = Texture::from_file(path.as_ref())?;
    log::info!(
        "loaded texture '{}' ({}x{})",
        texture.name,
        texture.width,
        texture.height
    );
    Ok(texture)
}

fn parse_float(token: Option<&str>, line: usize, what: &str) -> Result<f32, MeshError> {
    let token = token.ok_or_else(|| MeshError::Parse {
        line,
        message: format!("missing {}", what),
    })?;
    token.parse::<f32>().map_err(|_| MeshError::Parse {
        line,
        message: format!("invalid {} '{}'", what, token),
    })
}

/// 1-based OBJ index to 0-based. Relative (negative) indices are rejected.
fn parse_index(token: &str, line: usize) -> Result<usize, MeshError> {
    match token.parse::<i64>() {
        Ok(i) if i > 0 => Ok(i as usize - 1),
        Ok(i) => Err(MeshError::Parse {
            line,
            message: format!("unsupported index {} (indices are 1-based and absolute)", i),
        }),
        Err(_) => Err(MeshError::Parse {
            line,
            message: format!("invalid index '{}'", token),
        }),
    }
}

fn parse_corner(token: &str, line: usize) -> Result<Corner, MeshError> {
    let mut parts = token.split('/');
    let vertex = parse_index(parts.next().unwrap_or_default(), line)?;
    let uv = match parts.next() {
        Some("") | None => None,
        Some(t) => Some(parse_index(t, line)?),
    };
    Ok(Corner { vertex, uv })
}

fn check_index(line: usize, kind: &'static str, index: usize, count: usize) -> Result<(), MeshError> {
    if index < count {
        Ok(())
    } else {
        Err(MeshError::IndexOutOfRange { line, kind, index: index + 1, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a unit quad
o quad
v 0.0 0.0 0.0
v 0.0 1.0 0.0
v 1.0 1.0 0.0
v 1.0 0.0 0.0
vt 0.0 0.0
vt 0.0 1.0
vt 1.0 1.0
vt 1.0 0.0
vn 0.0 0.0 -1.0
s off
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mesh = parse_obj_str("quad", QUAD).unwrap();
        assert_eq!(mesh.name, "quad");
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.faces[0].indices, [0, 1, 2]);
        assert_eq!(mesh.faces[1].indices, [0, 2, 3]);
        assert_eq!(mesh.faces[1].uvs[2], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_corner_forms() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.25\nf 1 2/1 3//1\n";
        let mesh = parse_obj_str("tri", src).unwrap();
        assert_eq!(mesh.faces.len(), 1);
        let face = mesh.faces[0];
        assert_eq!(face.indices, [0, 1, 2]);
        assert_eq!(face.uvs[0], Vec2::default());
        assert_eq!(face.uvs[1], Vec2::new(0.5, 0.25));
        assert_eq!(face.uvs[2], Vec2::default());
    }

    #[test]
    fn test_faces_may_precede_vertices() {
        let src = "f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n";
        let mesh = parse_obj_str("late", src).unwrap();
        assert_eq!(mesh.faces.len(), 1);
    }

    #[test]
    fn test_out_of_range_index() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n";
        match parse_obj_str("bad", src) {
            Err(MeshError::IndexOutOfRange { line, kind, index, count }) => {
                assert_eq!((line, kind, index, count), (4, "vertex", 4, 3));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_negative_index_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        assert!(matches!(
            parse_obj_str("rel", src),
            Err(MeshError::Parse { line: 4, .. })
        ));
    }

    #[test]
    fn test_malformed_vertex() {
        assert!(matches!(
            parse_obj_str("bad", "v 1.0 nope 2.0\n"),
            Err(MeshError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_obj_str("bad", "v 1.0\n"),
            Err(MeshError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_face_too_small() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(matches!(parse_obj_str("bad", src), Err(MeshError::Parse { line: 3, .. })));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_obj("/nonexistent/definitely/missing.obj"),
            Err(MeshError::Io(_))
        ));
    }
}
