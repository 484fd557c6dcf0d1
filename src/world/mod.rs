//! World module - meshes and the scenes that hold them
//!
//! - Mesh data with a per-mesh model transform and spin
//! - Wavefront OBJ and texture loading
//! - RON scene files

mod mesh;
mod obj;
mod scene;

pub use mesh::*;
pub use obj::*;
pub use scene::*;
