//! Six-face HDR cubemap stored on the CPU.
//!
//! Face order and texel orientation follow the usual GL convention
//! (+X, -X, +Y, -Y, +Z, -Z; row 0 at the bottom of each face), so a map filled
//! through [`capture_views`] samples back correctly with [`CubeMap::sample`].

use crate::core::math::transform::TransformFactory;
use crate::core::math::{MathError, Matrix4, Vector3, Vector4, deg2rad};
use rayon::prelude::*;

pub const FACE_COUNT: usize = 6;

/// Projection shared by all six capture views: 90° square frustum.
pub fn capture_projection() -> Matrix4 {
    TransformFactory::perspective(deg2rad(90.0), 1.0, 0.1, 10.0)
}

/// Views from the origin through each face, in face order.
pub fn capture_views() -> Result<[Matrix4; FACE_COUNT], MathError> {
    let eye = Vector3::zeros();
    let x = Vector3::x_axis();
    let y = Vector3::y_axis();
    let z = Vector3::z_axis();
    Ok([
        TransformFactory::look_at(&eye, &x, &-y)?,
        TransformFactory::look_at(&eye, &-x, &-y)?,
        TransformFactory::look_at(&eye, &y, &z)?,
        TransformFactory::look_at(&eye, &-y, &-z)?,
        TransformFactory::look_at(&eye, &z, &-y)?,
        TransformFactory::look_at(&eye, &-z, &-y)?,
    ])
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubeMap {
    size: usize,
    faces: [Vec<Vector3>; FACE_COUNT],
}

impl CubeMap {
    /// Fills every texel with `radiance(direction)`, where `direction` is the
    /// unit vector through the texel center.
    pub fn render<F>(size: usize, radiance: F) -> Result<Self, MathError>
    where
        F: Fn(Vector3) -> Vector3 + Sync,
    {
        let size = size.max(1);
        let projection = capture_projection();
        let views = capture_views()?;

        let mut faces: [Vec<Vector3>; FACE_COUNT] = Default::default();
        for (face, view) in faces.iter_mut().zip(views.iter()) {
            let unproject = (projection * *view).invert()?;
            *face = (0..size * size)
                .into_par_iter()
                .map(|i| {
                    let (x, y) = (i % size, i / size);
                    let ndc = Vector4::new(
                        (x as f32 + 0.5) / size as f32 * 2.0 - 1.0,
                        (y as f32 + 0.5) / size as f32 * 2.0 - 1.0,
                        1.0,
                        1.0,
                    );
                    let world = unproject.mul_vector(ndc);
                    match (world.xyz() / world.w).normalize() {
                        Ok(dir) => radiance(dir),
                        Err(_) => Vector3::zeros(),
                    }
                })
                .collect();
        }

        Ok(Self { size, faces })
    }

    /// Uniform color in every direction.
    pub fn constant(size: usize, color: Vector3) -> Self {
        let size = size.max(1);
        Self {
            size,
            faces: std::array::from_fn(|_| vec![color; size * size]),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn face(&self, index: usize) -> &[Vector3] {
        &self.faces[index]
    }

    /// Bilinear lookup along `direction` (need not be normalized).
    /// A zero direction returns black.
    pub fn sample(&self, direction: Vector3) -> Vector3 {
        let Some((face, u, v)) = face_coordinates(direction) else {
            return Vector3::zeros();
        };
        let texels = &self.faces[face];
        let n = self.size;
        let max = (n - 1) as f32;

        // clamp to edge, texel centers at +0.5
        let fx = (u * n as f32 - 0.5).clamp(0.0, max);
        let fy = (v * n as f32 - 0.5).clamp(0.0, max);
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(n - 1);
        let y1 = (y0 + 1).min(n - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let row0 = texels[y0 * n + x0].lerp(texels[y0 * n + x1], tx);
        let row1 = texels[y1 * n + x0].lerp(texels[y1 * n + x1], tx);
        row0.lerp(row1, ty)
    }
}

/// Face index and `(s, t)` in [0, 1] for a lookup direction.
fn face_coordinates(d: Vector3) -> Option<(usize, f32, f32)> {
    let (ax, ay, az) = (d.x.abs(), d.y.abs(), d.z.abs());
    let (face, sc, tc, ma) = if ax >= ay && ax >= az {
        if d.x > 0.0 {
            (0, -d.z, -d.y, ax)
        } else {
            (1, d.z, -d.y, ax)
        }
    } else if ay >= az {
        if d.y > 0.0 {
            (2, d.x, d.z, ay)
        } else {
            (3, d.x, -d.z, ay)
        }
    } else if d.z > 0.0 {
        (4, d.x, -d.y, az)
    } else {
        (5, -d.x, -d.y, az)
    };

    if !ma.is_finite() || ma <= 0.0 {
        return None;
    }
    Some((face, (sc / ma + 1.0) * 0.5, (tc / ma + 1.0) * 0.5))
}
