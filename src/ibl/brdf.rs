//! Split-sum BRDF integration table.

use super::{hammersley, importance_sample_ggx, reflect};
use crate::core::math::{Vector2, Vector3};
use rayon::prelude::*;

/// `(scale, bias)` to F0 indexed by `(n·v, roughness)`, both in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct BrdfLut {
    size: usize,
    texels: Vec<Vector2>,
}

impl BrdfLut {
    /// Row `y` holds roughness `(y + 0.5) / size`, column `x` holds
    /// `n·v = (x + 0.5) / size`.
    pub fn integrate(size: usize, sample_count: u32) -> Self {
        let size = size.max(1);
        let sample_count = sample_count.max(1);
        let texels = (0..size * size)
            .into_par_iter()
            .map(|i| {
                let n_dot_v = ((i % size) as f32 + 0.5) / size as f32;
                let roughness = ((i / size) as f32 + 0.5) / size as f32;
                integrate_brdf(n_dot_v, roughness, sample_count)
            })
            .collect();
        Self { size, texels }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Bilinear, clamped to the table edges.
    pub fn lookup(&self, n_dot_v: f32, roughness: f32) -> Vector2 {
        let n = self.size;
        let max = (n - 1) as f32;
        let fx = (n_dot_v * n as f32 - 0.5).clamp(0.0, max);
        let fy = (roughness * n as f32 - 0.5).clamp(0.0, max);
        let (x0, y0) = (fx as usize, fy as usize);
        let (x1, y1) = ((x0 + 1).min(n - 1), (y0 + 1).min(n - 1));
        let (tx, ty) = (fx - x0 as f32, fy - y0 as f32);

        let at = |x: usize, y: usize| self.texels[y * n + x];
        let mix = |a: Vector2, b: Vector2, t: f32| a + (b - a) * t;
        mix(mix(at(x0, y0), at(x1, y0), tx), mix(at(x0, y1), at(x1, y1), tx), ty)
    }
}

/// Schlick-GGX with the IBL remapping `k = α / 2`.
fn geometry_schlick_ggx(n_dot_x: f32, roughness: f32) -> f32 {
    let k = roughness * roughness / 2.0;
    n_dot_x / (n_dot_x * (1.0 - k) + k)
}

fn integrate_brdf(n_dot_v: f32, roughness: f32, sample_count: u32) -> Vector2 {
    let v = Vector3::new((1.0 - n_dot_v * n_dot_v).sqrt(), 0.0, n_dot_v);
    let n = Vector3::z_axis();

    let mut a = 0.0;
    let mut b = 0.0;
    for i in 0..sample_count {
        let h = importance_sample_ggx(hammersley(i, sample_count), n, roughness);
        let l = reflect(v, h);

        let n_dot_l = l.z.max(0.0);
        let n_dot_h = h.z.max(0.0);
        let v_dot_h = v.dot(h).max(0.0);
        if n_dot_l > 0.0 && n_dot_h > 0.0 {
            let g = geometry_schlick_ggx(n_dot_v, roughness) * geometry_schlick_ggx(n_dot_l, roughness);
            let g_vis = g * v_dot_h / (n_dot_h * n_dot_v);
            let fc = (1.0 - v_dot_h).powi(5);
            a += (1.0 - fc) * g_vis;
            b += fc * g_vis;
        }
    }
    Vector2::new(a, b) / sample_count as f32
}
