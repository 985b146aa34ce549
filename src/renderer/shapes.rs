//! Triangle lists for the scene's mesh kinds
//!
//! Quads and rings are built in local units and placed with the mesh
//! transform; point clouds are already in world space.

use glam::Vec3;
use std::f32::consts::TAU;

use super::vertex::Vertex;
use crate::scene::{MeshDesc, MeshKind};

/// Local-space corner with texture coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalVertex {
    pub position: Vec3,
    pub uv: [f32; 2],
}

impl LocalVertex {
    const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: Vec3::new(x, y, 0.0),
            uv: [u, v],
        }
    }
}

/// Unit square, texture row 0 at the top
pub fn quad() -> Vec<LocalVertex> {
    let tl = LocalVertex::new(-0.5, 0.5, 0.0, 0.0);
    let tr = LocalVertex::new(0.5, 0.5, 1.0, 0.0);
    let bl = LocalVertex::new(-0.5, -0.5, 0.0, 1.0);
    let br = LocalVertex::new(0.5, -0.5, 1.0, 1.0);
    vec![tl, bl, tr, tr, bl, br]
}

/// Annulus between `inner` and 1.0
pub fn ring(inner: f32, segments: u32) -> Vec<LocalVertex> {
    let segments = segments.max(3);
    let inner = inner.clamp(0.0, 1.0);
    let mut vertices = Vec::with_capacity(segments as usize * 6);

    let at = |r: f32, theta: f32| {
        let (s, c) = theta.sin_cos();
        // Map the unit disc onto the texture square
        LocalVertex::new(r * c, r * s, 0.5 + 0.5 * r * c, 0.5 - 0.5 * r * s)
    };

    for i in 0..segments {
        let t1 = i as f32 / segments as f32 * TAU;
        let t2 = (i + 1) as f32 / segments as f32 * TAU;

        let o1 = at(1.0, t1);
        let o2 = at(1.0, t2);
        let i1 = at(inner, t1);
        let i2 = at(inner, t2);

        vertices.extend_from_slice(&[o1, i1, o2, o2, i1, i2]);
    }

    vertices
}

/// One square of side `size` per point
pub fn points(centers: &[Vec3], size: f32, color: [f32; 4]) -> Vec<Vertex> {
    let h = size * 0.5;
    let mut vertices = Vec::with_capacity(centers.len() * 6);
    for c in centers {
        let corner = |dx: f32, dy: f32, u: f32, v: f32| {
            Vertex::new([c.x + dx, c.y + dy, c.z], [u, v], color)
        };
        let tl = corner(-h, h, 0.0, 0.0);
        let tr = corner(h, h, 1.0, 0.0);
        let bl = corner(-h, -h, 0.0, 1.0);
        let br = corner(h, -h, 1.0, 1.0);
        vertices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
    }
    vertices
}

/// World-space triangles for a mesh
pub fn mesh_vertices(desc: &MeshDesc, local: &[LocalVertex], points_ws: &[Vec3]) -> Vec<Vertex> {
    match desc.kind {
        MeshKind::Points { size } => points(points_ws, size, desc.color),
        MeshKind::Quad | MeshKind::Ring { .. } => local
            .iter()
            .map(|v| {
                let p = desc.transform.apply(v.position);
                Vertex::new(p.to_array(), v.uv, desc.color)
            })
            .collect(),
    }
}

/// Local geometry for a kind (empty for point clouds)
pub fn local_geometry(kind: MeshKind) -> Vec<LocalVertex> {
    match kind {
        MeshKind::Quad => quad(),
        MeshKind::Ring { inner, segments } => ring(inner, segments),
        MeshKind::Points { .. } => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;

    #[test]
    fn test_ring_radii() {
        let verts = ring(0.8, 32);
        assert_eq!(verts.len(), 32 * 6);
        for v in &verts {
            let r = v.position.truncate().length();
            assert!((r - 1.0).abs() < 1e-5 || (r - 0.8).abs() < 1e-5);
            assert!((0.0..=1.0).contains(&v.uv[0]) && (0.0..=1.0).contains(&v.uv[1]));
        }
    }

    #[test]
    fn test_quad_is_placed_by_transform() {
        let desc = MeshDesc::new(MeshKind::Quad)
            .placed(Transform::at(Vec3::new(1.0, 2.0, -3.0)).with_uniform_scale(2.0));
        let verts = mesh_vertices(&desc, &quad(), &[]);
        assert_eq!(verts.len(), 6);
        let xs: Vec<f32> = verts.iter().map(|v| v.position[0]).collect();
        assert!(xs.iter().all(|&x| (x - 0.0).abs() < 1e-6 || (x - 2.0).abs() < 1e-6));
        assert!(verts.iter().all(|v| v.position[2] == -3.0));
    }

    #[test]
    fn test_points_expand_to_squares() {
        let centers = [Vec3::new(0.1, 0.2, 0.12), Vec3::ZERO];
        let verts = points(&centers, 0.02, [1.0; 4]);
        assert_eq!(verts.len(), 12);
        assert!((verts[0].position[0] - 0.09).abs() < 1e-6);
        assert_eq!(verts[0].position[2], 0.12);
    }
}
