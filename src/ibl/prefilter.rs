//! GGX prefiltered environment mip chain for specular IBL.

use super::cubemap::CubeMap;
use super::{hammersley, importance_sample_ggx, reflect};
use crate::core::math::{MathError, Vector3};

/// Builds `mip_levels` cubemaps, level `m` sized `base_size >> m` and
/// convolved for roughness `m / (mip_levels - 1)`.
///
/// Level 0 is a plain resample of the source (mirror reflection).
pub fn prefilter(
    environment: &CubeMap,
    base_size: usize,
    mip_levels: usize,
    sample_count: u32,
) -> Result<Vec<CubeMap>, MathError> {
    let mip_levels = mip_levels.max(1);
    let sample_count = sample_count.max(1);

    (0..mip_levels)
        .map(|mip| {
            let size = (base_size >> mip).max(1);
            let roughness = mip as f32 / (mip_levels - 1).max(1) as f32;
            CubeMap::render(size, |n| {
                if roughness < 0.01 {
                    environment.sample(n)
                } else {
                    convolve_ggx(environment, n, roughness, sample_count)
                }
            })
        })
        .collect()
}

/// Assumes `N = V = R`, so the lobe is centered on the lookup direction.
fn convolve_ggx(environment: &CubeMap, n: Vector3, roughness: f32, sample_count: u32) -> Vector3 {
    let mut color = Vector3::zeros();
    let mut total_weight = 0.0;

    for i in 0..sample_count {
        let h = importance_sample_ggx(hammersley(i, sample_count), n, roughness);
        let Ok(l) = reflect(n, h).normalize() else {
            continue;
        };
        let n_dot_l = n.dot(l);
        if n_dot_l > 0.0 {
            color += environment.sample(l) * n_dot_l;
            total_weight += n_dot_l;
        }
    }

    if total_weight > 0.0 {
        color / total_weight
    } else {
        environment.sample(n)
    }
}
