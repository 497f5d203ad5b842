//! Diffuse irradiance convolution.

use super::cubemap::CubeMap;
use super::tangent_frame;
use crate::core::math::{MathError, Vector3};
use std::f32::consts::PI;

/// Convolves `environment` with a clamped cosine lobe into a `size`² map.
///
/// The hemisphere is integrated as a Riemann sum over a `sample_delta`
/// (radians) grid in φ and θ. The result is `π · mean(L cosθ sinθ)`, so a
/// constant environment of radiance `c` gives `c` back.
pub fn convolve(environment: &CubeMap, size: usize, sample_delta: f32) -> Result<CubeMap, MathError> {
    let delta = sample_delta.max(1e-3);
    CubeMap::render(size, |normal| irradiance_at(environment, normal, delta))
}

fn irradiance_at(environment: &CubeMap, normal: Vector3, delta: f32) -> Vector3 {
    let (right, up) = tangent_frame(normal);
    let mut sum = Vector3::zeros();
    let mut samples = 0u32;

    let mut phi = 0.0_f32;
    while phi < 2.0 * PI {
        let mut theta = 0.0_f32;
        while theta < 0.5 * PI {
            let (sin_t, cos_t) = theta.sin_cos();
            let tangent_sample = Vector3::new(sin_t * phi.cos(), sin_t * phi.sin(), cos_t);
            let dir = right * tangent_sample.x + up * tangent_sample.y + normal * tangent_sample.z;

            sum += environment.sample(dir) * (cos_t * sin_t);
            samples += 1;
            theta += delta;
        }
        phi += delta;
    }

    if samples == 0 {
        return Vector3::zeros();
    }
    sum * (PI / samples as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_environment_is_preserved() {
        let env = CubeMap::constant(4, Vector3::new(1.0, 0.5, 0.25));
        let irradiance = convolve(&env, 2, 0.05).unwrap();
        let got = irradiance.sample(Vector3::new(0.3, 0.9, -0.2));
        assert!((got.x - 1.0).abs() < 0.03, "{got:?}");
        assert!((got.y - 0.5).abs() < 0.015);
        assert!((got.z - 0.25).abs() < 0.01);
    }

    #[test]
    fn lit_hemisphere_dominates() {
        // white above the horizon, black below
        let env = CubeMap::render(8, |d| if d.y > 0.0 { Vector3::repeat(1.0) } else { Vector3::zeros() })
            .unwrap();
        let irradiance = convolve(&env, 4, 0.1).unwrap();
        let up = irradiance.sample(Vector3::y_axis()).x;
        let side = irradiance.sample(Vector3::x_axis()).x;
        let down = irradiance.sample(-Vector3::y_axis()).x;
        assert!(up > side && side > down);
        assert!(up > 0.8 && down < 0.2);
    }
}
