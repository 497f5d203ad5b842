use crate::core::geometry::Vertex;
use crate::core::math::{MathError, Matrix4, Vector3, Vector4};
use crate::core::pipeline::{Interpolatable, Shader};
use crate::ibl::IblMaps;
use crate::pipeline::shaders::shadow::ShadowMap;
use crate::scene::light::DirectionalLight;
use crate::scene::material::Material;
use std::f32::consts::PI;
use std::ops::{Add, Mul};

/// Ambient term used when no environment maps are bound.
const FALLBACK_AMBIENT: f32 = 0.03;

/// Data passed from the vertex to the fragment stage.
#[derive(Clone, Copy, Debug)]
pub struct PbrVarying {
    pub world_pos: Vector3,
    pub normal: Vector3,
}

impl Add for PbrVarying {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            world_pos: self.world_pos + other.world_pos,
            normal: self.normal + other.normal,
        }
    }
}

impl Mul<f32> for PbrVarying {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            world_pos: self.world_pos * scalar,
            normal: self.normal * scalar,
        }
    }
}

impl Interpolatable for PbrVarying {}

/// Metallic-roughness shading: one directional light with optional shadow
/// map, plus split-sum image-based ambient lighting.
pub struct PbrShader<'a> {
    pub model_matrix: Matrix4,
    pub view_projection: Matrix4,
    pub normal_matrix: Matrix4,
    pub camera_pos: Vector3,
    pub material: Material,

    /// Unit vector towards the light.
    pub light_dir: Vector3,
    pub light_color: Vector3,

    pub shadow_map: Option<&'a ShadowMap>,
    pub ibl: Option<&'a IblMaps>,
}

impl<'a> PbrShader<'a> {
    /// Fails when `model` cannot be inverted for the normal matrix or the
    /// light has no direction.
    pub fn new(
        model: Matrix4,
        view_projection: Matrix4,
        camera_pos: Vector3,
        material: Material,
        light: &DirectionalLight,
    ) -> Result<Self, MathError> {
        Ok(Self {
            model_matrix: model,
            view_projection,
            normal_matrix: model.normal_matrix()?,
            camera_pos,
            material,
            light_dir: light.to_light()?,
            light_color: light.color,
            shadow_map: None,
            ibl: None,
        })
    }

    pub fn with_shadow_map(mut self, shadow_map: Option<&'a ShadowMap>) -> Self {
        self.shadow_map = shadow_map;
        self
    }

    pub fn with_ibl(mut self, ibl: Option<&'a IblMaps>) -> Self {
        self.ibl = ibl;
        self
    }

    // --- BRDF terms ---

    /// GGX normal distribution; squares `roughness` internally.
    fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
        let a = roughness * roughness;
        let a2 = a * a;
        let denom = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
        a2 / (PI * denom * denom).max(0.0001)
    }

    /// Schlick-GGX with the direct-lighting `k = (r + 1)² / 8`.
    fn geometry_schlick_ggx(n_dot_x: f32, roughness: f32) -> f32 {
        let r = roughness + 1.0;
        let k = (r * r) / 8.0;
        n_dot_x / (n_dot_x * (1.0 - k) + k).max(0.0001)
    }

    fn geometry_smith(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
        Self::geometry_schlick_ggx(n_dot_v, roughness) * Self::geometry_schlick_ggx(n_dot_l, roughness)
    }

    fn fresnel_schlick(cos_theta: f32, f0: Vector3) -> Vector3 {
        let val = (1.0 - cos_theta).clamp(0.0, 1.0).powi(5);
        f0 + (Vector3::repeat(1.0) - f0) * val
    }

    /// Fresnel for ambient light, damped on rough surfaces.
    fn fresnel_schlick_roughness(cos_theta: f32, f0: Vector3, roughness: f32) -> Vector3 {
        let val = (1.0 - cos_theta).clamp(0.0, 1.0).powi(5);
        let max_reflect = Vector3::new(
            f0.x.max(1.0 - roughness),
            f0.y.max(1.0 - roughness),
            f0.z.max(1.0 - roughness),
        );
        f0 + (max_reflect - f0) * val
    }

    fn direct_light(&self, n: Vector3, v: Vector3, world_pos: Vector3) -> Vector3 {
        let l = self.light_dir;
        let n_dot_l = n.dot(l).max(0.0);
        if n_dot_l <= 0.0 {
            return Vector3::zeros();
        }
        let Ok(h) = (v + l).normalize() else {
            return Vector3::zeros();
        };

        let roughness = self.material.clamped_roughness();
        let n_dot_v = n.dot(v).max(0.0);
        let n_dot_h = n.dot(h).max(0.0);
        let h_dot_v = h.dot(v).max(0.0);

        let shadow = self
            .shadow_map
            .map_or(1.0, |map| map.visibility(world_pos, n_dot_l));
        if shadow <= 0.0 {
            return Vector3::zeros();
        }

        let d = Self::distribution_ggx(n_dot_h, roughness);
        let g = Self::geometry_smith(n_dot_v, n_dot_l, roughness);
        let f = Self::fresnel_schlick(h_dot_v, self.material.f0());

        let specular = f * (d * g) / (4.0 * n_dot_v * n_dot_l + 0.0001);
        let k_d = Vector3::repeat(1.0) - f;
        let diffuse = k_d.component_mul(self.material.diffuse_color()) / PI;

        (diffuse + specular).component_mul(self.light_color) * (n_dot_l * shadow)
    }

    fn ambient_light(&self, n: Vector3, v: Vector3) -> Vector3 {
        let diffuse_color = self.material.diffuse_color();
        let Some(ibl) = self.ibl else {
            return diffuse_color * FALLBACK_AMBIENT;
        };

        let roughness = self.material.clamped_roughness();
        let f0 = self.material.f0();
        let n_dot_v = n.dot(v).max(0.0);

        let f = Self::fresnel_schlick_roughness(n_dot_v, f0, roughness);
        let k_d = Vector3::repeat(1.0) - f;
        let diffuse = ibl.irradiance(n).component_mul(diffuse_color).component_mul(k_d);

        let r = n * (2.0 * n.dot(v)) - v;
        let brdf = ibl.brdf(n_dot_v, roughness);
        let specular = ibl
            .prefiltered(r, roughness)
            .component_mul(f0 * brdf.x + Vector3::repeat(brdf.y));

        diffuse + specular
    }
}

impl Shader for PbrShader<'_> {
    type Varying = PbrVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4, Self::Varying) {
        let world = self.model_matrix * vertex.position.to_point();
        let normal = self.normal_matrix.transform_vector(vertex.normal);
        (
            self.view_projection * world,
            PbrVarying {
                world_pos: world.xyz(),
                normal,
            },
        )
    }

    fn fragment(&self, varying: Self::Varying) -> Vector3 {
        let Ok(v) = (self.camera_pos - varying.world_pos).normalize() else {
            return Vector3::zeros();
        };
        // degenerate normals (e.g. sphere poles with flat normals) face the viewer
        let n = varying.normal.normalize().unwrap_or(v);

        self.direct_light(n, v, varying.world_pos) + self.ambient_light(n, v)
    }
}
