//! Ocean patch mesh: a flat XZ grid displaced on the GPU.

use bytemuck::{Pod, Zeroable};

/// Vertex data for the ocean mesh (rest position + UV coordinates).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Number of simulation tiles the mesh spans per side. UVs run from 0 to
/// this value and the sampler wraps, so the patch repeats seamlessly.
pub const TILE_REPEAT: u32 = 3;

/// Static ocean grid. All motion comes from the displacement texture
/// sampled in the vertex shader, so the buffers never change after
/// creation; a resolution or scale change builds a new mesh.
pub struct OceanMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl OceanMesh {
    /// Build the grid for an N-mode simulation over a patch of `scale`
    /// meters. Half the simulation resolution in vertices across the whole
    /// tiled extent is plenty; the highest spatial frequencies barely move
    /// the surface.
    pub fn new(modes: u32, scale: f32) -> Self {
        let quads = (modes / 2).max(2) as usize;
        let extent = scale * TILE_REPEAT as f32;
        let spacing = extent / quads as f32;
        let half = extent / 2.0;

        let mut vertices = Vec::with_capacity((quads + 1) * (quads + 1));
        for z in 0..=quads {
            for x in 0..=quads {
                vertices.push(Vertex {
                    position: [x as f32 * spacing - half, 0.0, z as f32 * spacing - half],
                    uv: [
                        x as f32 / quads as f32 * TILE_REPEAT as f32,
                        z as f32 / quads as f32 * TILE_REPEAT as f32,
                    ],
                });
            }
        }

        // counter-clockwise winding, viewed from above
        let mut indices = Vec::with_capacity(quads * quads * 6);
        for z in 0..quads {
            for x in 0..quads {
                let top_left = (z * (quads + 1) + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((z + 1) * (quads + 1) + x) as u32;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        Self { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_dimensions() {
        let mesh = OceanMesh::new(64, 100.0);
        let quads = 32;
        assert_eq!(mesh.vertices.len(), (quads + 1) * (quads + 1));
        assert_eq!(mesh.indices.len(), quads * quads * 6);
    }

    #[test]
    fn test_mesh_centered_on_origin() {
        let mesh = OceanMesh::new(64, 100.0);
        let extent = 100.0 * TILE_REPEAT as f32;
        let min_x = mesh
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::INFINITY, f32::min);
        let max_x = mesh
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(min_x, -extent / 2.0);
        assert_eq!(max_x, extent / 2.0);
    }

    #[test]
    fn test_uv_spans_tile_repeat() {
        let mesh = OceanMesh::new(64, 100.0);
        let max_u = mesh
            .vertices
            .iter()
            .map(|v| v.uv[0])
            .fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(max_u, TILE_REPEAT as f32);
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = OceanMesh::new(32, 50.0);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_minimum_resolution_clamped() {
        // even a degenerate mode count yields a drawable grid
        let mesh = OceanMesh::new(2, 10.0);
        assert!(!mesh.indices.is_empty());
    }
}
