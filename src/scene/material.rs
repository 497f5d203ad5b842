use crate::core::math::Vector3;

/// Surface parameters of the metallic-roughness PBR model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Roughness as authored (0 = mirror, 1 = fully rough); squared before use.
    pub perceptual_roughness: f32,
    /// 0.0 = dielectric, 1.0 = metal.
    pub metallic: f32,
    /// Specular reflectance of dielectrics, remapped to F0 = 0.16 * r².
    pub reflectance: f32,
    pub base_color: Vector3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            perceptual_roughness: 0.5,
            metallic: 0.0,
            reflectance: 0.5,
            base_color: Vector3::repeat(1.0),
        }
    }
}

/// Smallest perceptual roughness fed into the BRDF; lower values alias badly.
pub const MIN_PERCEPTUAL_ROUGHNESS: f32 = 0.045;

impl Material {
    pub fn new(base_color: Vector3, metallic: f32, perceptual_roughness: f32) -> Self {
        Self {
            base_color,
            metallic,
            perceptual_roughness,
            ..Self::default()
        }
    }

    /// Perceptual roughness clamped to the range the shading model can handle.
    pub fn clamped_roughness(&self) -> f32 {
        self.perceptual_roughness.clamp(MIN_PERCEPTUAL_ROUGHNESS, 1.0)
    }

    /// `alpha = roughness²`.
    pub fn alpha(&self) -> f32 {
        let r = self.clamped_roughness();
        r * r
    }

    pub fn diffuse_color(&self) -> Vector3 {
        self.base_color * (1.0 - self.metallic.clamp(0.0, 1.0))
    }

    /// Reflectance at normal incidence.
    pub fn f0(&self) -> Vector3 {
        let metallic = self.metallic.clamp(0.0, 1.0);
        let dielectric = 0.16 * self.reflectance * self.reflectance * (1.0 - metallic);
        Vector3::repeat(dielectric) + self.base_color * metallic
    }
}
