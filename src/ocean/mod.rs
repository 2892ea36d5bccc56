//! Ocean surface geometry.

pub mod mesh;

pub use mesh::{OceanMesh, Vertex, TILE_REPEAT};
