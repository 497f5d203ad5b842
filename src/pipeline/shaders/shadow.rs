use crate::core::geometry::Vertex;
use crate::core::math::{Matrix4, Vector3, Vector4};
use crate::core::pipeline::{Interpolatable, Shader};
use std::ops::{Add, Mul};

#[derive(Clone, Copy, Debug)]
pub struct ShadowVarying; // depth only, nothing to interpolate

impl Add for ShadowVarying {
    type Output = Self;
    fn add(self, _other: Self) -> Self {
        Self
    }
}

impl Mul<f32> for ShadowVarying {
    type Output = Self;
    fn mul(self, _scalar: f32) -> Self {
        Self
    }
}

impl Interpolatable for ShadowVarying {}

pub struct ShadowShader {
    pub mvp_matrix: Matrix4,
}

impl ShadowShader {
    pub fn new(model: &Matrix4, light_space: &Matrix4) -> Self {
        Self {
            mvp_matrix: *light_space * *model,
        }
    }
}

impl Shader for ShadowShader {
    type Varying = ShadowVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4, Self::Varying) {
        (self.mvp_matrix * vertex.position.to_point(), ShadowVarying)
    }

    fn fragment(&self, _varying: Self::Varying) -> Vector3 {
        // only the depth write matters
        Vector3::zeros()
    }
}

/// Depth rendered from the light, sampled by the lit pass.
#[derive(Debug, Clone)]
pub struct ShadowMap {
    pub depth: Vec<f32>,
    pub size: usize,
    pub light_space: Matrix4,
    pub bias: f32,
    /// PCF radius in texels; 0 takes a single tap.
    pub pcf_kernel: i32,
}

impl ShadowMap {
    /// Fraction of light reaching `world_pos`: 1 fully lit, 0 fully shadowed.
    pub fn visibility(&self, world_pos: Vector3, n_dot_l: f32) -> f32 {
        if self.size == 0 || self.depth.len() < self.size * self.size {
            return 1.0;
        }

        let light_space_pos = self.light_space * world_pos.to_point();
        if light_space_pos.w.abs() < 1e-6 {
            return 1.0;
        }
        let proj = light_space_pos.xyz() / light_space_pos.w;

        let u = proj.x * 0.5 + 0.5;
        let v = 1.0 - (proj.y * 0.5 + 0.5); // rows run top-down
        let current_depth = proj.z * 0.5 + 0.5;

        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) || current_depth > 1.0 {
            return 1.0;
        }

        // steeper surfaces need more bias
        let bias = self.bias.max(self.bias * 10.0 * (1.0 - n_dot_l));
        let max_texel = (self.size - 1) as f32;
        let texel_size = 1.0 / self.size as f32;
        let kernel = self.pcf_kernel.max(0);

        let mut lit = 0.0;
        for dx in -kernel..=kernel {
            for dy in -kernel..=kernel {
                let x = ((u + dx as f32 * texel_size) * max_texel).clamp(0.0, max_texel) as usize;
                let y = ((v + dy as f32 * texel_size) * max_texel).clamp(0.0, max_texel) as usize;
                if current_depth - bias <= self.depth[y * self.size + x] {
                    lit += 1.0;
                }
            }
        }
        lit / ((kernel * 2 + 1).pow(2) as f32)
    }
}
