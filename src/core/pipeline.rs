use crate::core::geometry::Vertex;
use crate::core::math::{Vector3, Vector4};
use std::ops::{Add, Mul};

/// Values that can be blended across a triangle with barycentric weights.
///
/// `Send + Sync` because fragments are shaded from several threads.
pub trait Interpolatable:
    Copy + Clone + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

impl Interpolatable for Vector3 {}

/// Programmable stages of the software pipeline.
pub trait Shader: Send + Sync {
    /// Per-vertex outputs interpolated for each fragment.
    type Varying: Interpolatable;

    /// Returns the clip-space position and the varyings of one vertex.
    fn vertex(&self, vertex: &Vertex) -> (Vector4, Self::Varying);

    /// Linear RGB radiance of a fragment.
    fn fragment(&self, varying: Self::Varying) -> Vector3;
}
