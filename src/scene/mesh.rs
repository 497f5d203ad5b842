use crate::core::geometry::{Vertex, VertexArray};
use crate::core::math::{Vector2, Vector3};
use serde::Deserialize;
use std::f32::consts::PI;

pub const DEFAULT_SPHERE_SEGMENTS: usize = 64;

/// How sphere vertices get their normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalMode {
    /// Per-triangle edge cross product; gives a faceted look.
    Flat,
    /// Radial direction of the sphere at each vertex; gives smooth shading.
    #[default]
    Analytic,
}

/// Unnormalized face normal `(b - a) × (c - a)`.
///
/// Counter-clockwise winding seen from outside yields the outward normal.
#[inline]
pub fn triangle_normal(a: Vector3, b: Vector3, c: Vector3) -> Vector3 {
    (b - a).cross(c - a)
}

/// Unit direction for longitude `phi` and polar angle `theta` (0 at +Y).
#[inline]
fn sphere_direction(phi: f32, theta: f32) -> Vector3 {
    Vector3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin())
}

/// UV sphere with the default tessellation and smooth normals.
pub fn make_sphere_mesh(radius: f32) -> VertexArray {
    make_sphere_mesh_with(radius, DEFAULT_SPHERE_SEGMENTS, NormalMode::Analytic)
}

/// UV sphere centred at the origin with `segments` steps in both longitude
/// and latitude, emitted as `2 * segments²` triangles.
///
/// The longitude index wraps around so the last column of cells reuses the
/// first column of points and the seam is closed exactly.
pub fn make_sphere_mesh_with(radius: f32, segments: usize, normals: NormalMode) -> VertexArray {
    let mut vertices = VertexArray::new();
    if segments == 0 {
        return vertices;
    }

    let n = segments as f32;
    let point = |i: usize, j: usize| {
        let dir = sphere_direction(2.0 * PI * (i % segments) as f32 / n, PI * j as f32 / n);
        let uv = Vector2::new(i as f32 / n, j as f32 / n);
        (dir * radius, dir, uv)
    };

    for i in 0..segments {
        for j in 0..segments {
            let p1 = point(i, j);
            let p2 = point(i + 1, j);
            let p3 = point(i + 1, j + 1);
            let p4 = point(i, j + 1);

            for tri in [[p1, p2, p3], [p4, p1, p3]] {
                let face = triangle_normal(tri[0].0, tri[1].0, tri[2].0);
                for (position, radial, uv) in tri {
                    let normal = match normals {
                        NormalMode::Flat => face,
                        NormalMode::Analytic => radial,
                    };
                    vertices.push(Vertex::new(position, normal, uv));
                }
            }
        }
    }
    vertices
}

/// Face table: corner positions followed by the face normal.
#[rustfmt::skip]
const CUBE_VERTICES: [[f32; 6]; 36] = [
    [1.0, 1.0, 0.0,   0.0, 0.0, -1.0],
    [1.0, 0.0, 0.0,   0.0, 0.0, -1.0],
    [0.0, 0.0, 0.0,   0.0, 0.0, -1.0],
    [0.0, 1.0, 0.0,   0.0, 0.0, -1.0],
    [1.0, 1.0, 0.0,   0.0, 0.0, -1.0],
    [0.0, 0.0, 0.0,   0.0, 0.0, -1.0],

    [0.0, 0.0, 1.0,   0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0,   0.0, 0.0, 1.0],
    [1.0, 1.0, 1.0,   0.0, 0.0, 1.0],
    [0.0, 0.0, 1.0,   0.0, 0.0, 1.0],
    [1.0, 1.0, 1.0,   0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0,   0.0, 0.0, 1.0],

    [0.0, 0.0, 0.0,   0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0,   0.0, -1.0, 0.0],
    [1.0, 0.0, 1.0,   0.0, -1.0, 0.0],
    [0.0, 0.0, 0.0,   0.0, -1.0, 0.0],
    [1.0, 0.0, 1.0,   0.0, -1.0, 0.0],
    [0.0, 0.0, 1.0,   0.0, -1.0, 0.0],

    [1.0, 1.0, 1.0,   0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0,   0.0, 1.0, 0.0],
    [0.0, 1.0, 0.0,   0.0, 1.0, 0.0],
    [0.0, 1.0, 1.0,   0.0, 1.0, 0.0],
    [1.0, 1.0, 1.0,   0.0, 1.0, 0.0],
    [0.0, 1.0, 0.0,   0.0, 1.0, 0.0],

    [0.0, 1.0, 1.0,  -1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0,  -1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0,  -1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0,  -1.0, 0.0, 0.0],
    [0.0, 1.0, 1.0,  -1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0,  -1.0, 0.0, 0.0],

    [1.0, 0.0, 0.0,   1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0,   1.0, 0.0, 0.0],
    [1.0, 1.0, 1.0,   1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0,   1.0, 0.0, 0.0],
    [1.0, 1.0, 1.0,   1.0, 0.0, 0.0],
    [1.0, 0.0, 1.0,   1.0, 0.0, 0.0],
];

/// Unit cube spanning (0,0,0)..(1,1,1), twelve triangles with face normals.
pub fn make_cube_mesh() -> VertexArray {
    CUBE_VERTICES
        .iter()
        .map(|v| {
            Vertex::new(
                Vector3::new(v[0], v[1], v[2]),
                Vector3::new(v[3], v[4], v[5]),
                Vector2::zeros(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centroid(tri: &[Vertex]) -> Vector3 {
        (tri[0].position + tri[1].position + tri[2].position) / 3.0
    }

    #[test]
    fn cube_has_36_vertices_in_unit_box() {
        let cube = make_cube_mesh();
        assert_eq!(cube.len(), 36);
        assert_eq!(cube.triangle_count(), 12);
        for v in cube.iter() {
            for k in 0..3 {
                assert!(v.position[k] == 0.0 || v.position[k] == 1.0);
            }
            assert_eq!(v.normal.length(), 1.0);
        }
    }

    #[test]
    fn cube_winding_matches_face_normals() {
        let cube = make_cube_mesh();
        for tri in cube.triangles() {
            let n = triangle_normal(tri[0].position, tri[1].position, tri[2].position);
            let listed = tri[0].normal;
            assert!(n.dot(listed) > 0.0, "inward triangle {tri:?}");
            assert!(n.cross(listed).length() < 1e-6);
        }
    }

    #[test]
    fn sphere_vertex_count_and_radius() {
        for (radius, segments) in [(1.0_f32, 8_usize), (0.5, 16), (2.5, 64)] {
            let sphere = make_sphere_mesh_with(radius, segments, NormalMode::Flat);
            assert_eq!(sphere.len(), 2 * segments * segments * 3);
            for v in sphere.iter() {
                assert!((v.position.length() - radius).abs() < 1e-4 * radius.max(1.0));
            }
        }
    }

    #[test]
    fn default_sphere_uses_64_segments() {
        let sphere = make_sphere_mesh(0.5);
        assert_eq!(sphere.len(), 2 * 64 * 64 * 3);
    }

    #[test]
    fn analytic_normals_are_radial() {
        let sphere = make_sphere_mesh_with(2.0, 12, NormalMode::Analytic);
        for v in sphere.iter() {
            assert!((v.normal.length() - 1.0).abs() < 1e-5);
            assert!((v.position / 2.0 - v.normal).length() < 1e-5);
        }
    }

    #[test]
    fn flat_normals_point_outward() {
        let sphere = make_sphere_mesh_with(1.0, 16, NormalMode::Flat);
        let mut checked = 0;
        for tri in sphere.triangles() {
            let n = tri[0].normal;
            // triangles collapsed at the poles have no area
            if n.length() < 1e-7 {
                continue;
            }
            assert_eq!(n, tri[1].normal);
            assert!(n.dot(centroid(tri)) > 0.0);
            checked += 1;
        }
        assert!(checked > 2 * 16 * 14);
    }

    #[test]
    fn longitude_seam_is_closed() {
        let segments = 10;
        let sphere = make_sphere_mesh_with(1.0, segments, NormalMode::Analytic);
        let cells: Vec<_> = sphere.as_slice().chunks_exact(6).collect();
        // cell (i = segments - 1, j = 3): p2 must coincide with p1 of cell (0, 3)
        let last = cells[(segments - 1) * segments + 3];
        let first = cells[3];
        assert_eq!(last[1].position, first[0].position);
    }

    #[test]
    fn zero_segments_yield_empty_mesh() {
        assert!(make_sphere_mesh_with(1.0, 0, NormalMode::Flat).is_empty());
    }
}
