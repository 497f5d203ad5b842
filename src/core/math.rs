pub mod interpolation;
pub mod matrix;
pub mod transform;
pub mod vector;

pub use matrix::Matrix4;
pub use vector::{Vector2, Vector3, Vector4};

use thiserror::Error;

/// Failures of the numeric primitives on degenerate input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("cannot normalize a zero-length or non-finite vector")]
    DegenerateVector,
    #[error("matrix is singular and has no inverse")]
    SingularMatrix,
}

#[inline]
pub fn deg2rad(degrees: f32) -> f32 {
    degrees * (std::f32::consts::PI / 180.0)
}

/// Affine combination `sa * a + sb * b`.
#[inline]
pub fn combine(a: Vector3, b: Vector3, sa: f32, sb: f32) -> Vector3 {
    a * sa + b * sb
}

/// `A·B`: when applied to a column vector, B's transform happens first.
#[inline]
pub fn dotm(a: &Matrix4, b: &Matrix4) -> Matrix4 {
    a.mul_matrix(b)
}

/// Matrix times column vector (`M·v`).
#[inline]
pub fn rdotv(m: &Matrix4, v: Vector4) -> Vector4 {
    m.mul_vector(v)
}

/// Row vector times matrix (`vᵀ·M`).
#[inline]
pub fn ldotv(v: Vector4, m: &Matrix4) -> Vector4 {
    Vector4::new(
        v.dot(m.column(0)),
        v.dot(m.column(1)),
        v.dot(m.column(2)),
        v.dot(m.column(3)),
    )
}
