//! Image-based lighting precomputation.
//!
//! An equirectangular environment is captured into a cubemap, then reduced
//! to the three inputs of split-sum IBL: a diffuse irradiance map, a GGX
//! prefiltered mip chain indexed by roughness, and the BRDF lookup table.

pub mod brdf;
pub mod cubemap;
pub mod environment;
pub mod irradiance;
pub mod prefilter;

pub use brdf::BrdfLut;
pub use cubemap::CubeMap;
pub use environment::EquirectMap;

use crate::core::math::{MathError, Vector2, Vector3};
use crate::io::config::EnvironmentConfig;
use log::info;
use std::f32::consts::PI;
use std::time::Instant;

/// Everything the PBR shader and the background pass sample.
#[derive(Debug, Clone)]
pub struct IblMaps {
    environment: CubeMap,
    irradiance: CubeMap,
    prefiltered: Vec<CubeMap>,
    brdf: BrdfLut,
}

impl IblMaps {
    pub fn precompute(source: &EquirectMap, settings: &EnvironmentConfig) -> Result<Self, MathError> {
        let start = Instant::now();
        let environment = CubeMap::render(settings.cube_size, |dir| source.sample(dir))?;
        info!(
            "Environment captured to {0}x{0} cubemap in {1:?}",
            settings.cube_size,
            start.elapsed()
        );

        let start = Instant::now();
        let irradiance = irradiance::convolve(
            &environment,
            settings.irradiance_size,
            settings.irradiance_sample_delta,
        )?;
        info!("Irradiance map ready in {:?}", start.elapsed());

        let start = Instant::now();
        let prefiltered = prefilter::prefilter(
            &environment,
            settings.prefilter_size,
            settings.prefilter_mip_levels,
            settings.prefilter_samples,
        )?;
        info!(
            "Prefiltered {} mip levels in {:?}",
            prefiltered.len(),
            start.elapsed()
        );

        let start = Instant::now();
        let brdf = BrdfLut::integrate(settings.brdf_lut_size, settings.brdf_samples);
        info!("BRDF lookup table ready in {:?}", start.elapsed());

        Ok(Self {
            environment,
            irradiance,
            prefiltered,
            brdf,
        })
    }

    /// Flat lighting from every direction; skips all convolution work.
    pub fn uniform(color: Vector3, brdf: BrdfLut) -> Self {
        Self {
            environment: CubeMap::constant(1, color),
            irradiance: CubeMap::constant(1, color),
            prefiltered: vec![CubeMap::constant(1, color)],
            brdf,
        }
    }

    /// Radiance seen along `dir`, used for the background.
    pub fn background(&self, dir: Vector3) -> Vector3 {
        self.environment.sample(dir)
    }

    /// Cosine-weighted irradiance around normal `n`, already divided by π.
    pub fn irradiance(&self, n: Vector3) -> Vector3 {
        self.irradiance.sample(n)
    }

    /// Prefiltered radiance along reflection `r`, blending the two mip
    /// levels that bracket `roughness`.
    pub fn prefiltered(&self, r: Vector3, roughness: f32) -> Vector3 {
        let last = self.prefiltered.len().saturating_sub(1);
        let lod = roughness.clamp(0.0, 1.0) * last as f32;
        let lo = (lod.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        let a = self.prefiltered[lo].sample(r);
        if hi == lo {
            return a;
        }
        a.lerp(self.prefiltered[hi].sample(r), lod - lo as f32)
    }

    /// `(scale, bias)` applied to F0 in the split-sum approximation.
    pub fn brdf(&self, n_dot_v: f32, roughness: f32) -> Vector2 {
        self.brdf.lookup(n_dot_v, roughness)
    }

    pub fn mip_levels(&self) -> usize {
        self.prefiltered.len()
    }
}

/// Point `i` of an `n`-point Hammersley set in [0, 1)².
pub(crate) fn hammersley(i: u32, n: u32) -> Vector2 {
    let radical_inverse = i.reverse_bits() as f32 * 2.328_306_4e-10;
    Vector2::new(i as f32 / n as f32, radical_inverse)
}

/// Orthonormal `(tangent, bitangent)` around unit `n`.
pub(crate) fn tangent_frame(n: Vector3) -> (Vector3, Vector3) {
    let up = if n.y.abs() < 0.999 {
        Vector3::y_axis()
    } else {
        Vector3::x_axis()
    };
    let tangent = up.cross(n).normalize().unwrap_or(Vector3::z_axis());
    let bitangent = n.cross(tangent);
    (tangent, bitangent)
}

/// GGX-distributed half vector around `n` for perceptual `roughness`.
pub(crate) fn importance_sample_ggx(xi: Vector2, n: Vector3, roughness: f32) -> Vector3 {
    let a = roughness * roughness;
    let phi = 2.0 * PI * xi.x;
    let cos_theta = ((1.0 - xi.y) / (1.0 + (a * a - 1.0) * xi.y)).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    let (tangent, bitangent) = tangent_frame(n);
    tangent * (phi.cos() * sin_theta) + bitangent * (phi.sin() * sin_theta) + n * cos_theta
}

/// Mirror `v` about `h`: `2 (v·h) h - v`.
pub(crate) fn reflect(v: Vector3, h: Vector3) -> Vector3 {
    h * (2.0 * v.dot(h)) - v
}
