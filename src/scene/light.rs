use crate::core::math::{MathError, Vector3};

/// Single directional light shared by the whole scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Points from the scene towards the light. Need not be unit length;
    /// its magnitude also scales the shadow camera distance.
    pub direction: Vector3,
    pub color: Vector3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vector3::repeat(1.0),
            color: Vector3::repeat(1.0),
        }
    }
}

impl DirectionalLight {
    pub fn new(direction: Vector3, color: Vector3) -> Self {
        Self { direction, color }
    }

    /// Unit vector from a surface point towards the light.
    pub fn to_light(&self) -> Result<Vector3, MathError> {
        self.direction.normalize()
    }

    /// Eye position of the shadow camera: `direction * distance`.
    pub fn shadow_eye(&self, distance: f32) -> Vector3 {
        self.direction * distance
    }

    /// Up vector for the shadow camera, switching away from Y when the light
    /// is nearly overhead.
    pub fn shadow_up(&self) -> Vector3 {
        match self.direction.normalize() {
            Ok(d) if d.y.abs() > 0.9 => Vector3::z_axis(),
            _ => Vector3::y_axis(),
        }
    }
}
