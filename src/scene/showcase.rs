//! Material test scene: a grid of spheres on a grey slab, metallic rising
//! along one axis and roughness along the other.

use crate::core::math::Vector3;
use crate::pipeline::graphics::Graphics;
use crate::scene::material::Material;

pub const GRID_SIZE: usize = 7;
const SPACING: f32 = 1.5;
/// Diameter of each sphere; the built-in mesh has diameter 1.
const SPHERE_SCALE: f32 = 1.2;

/// Material of the sphere in `row` (metallic) and `column` (roughness).
pub fn grid_material(row: usize, column: usize) -> Material {
    let last = (GRID_SIZE - 1) as f32;
    Material::new(
        Vector3::new(0.9, 0.2, 0.1),
        row as f32 / last,
        (column as f32 / last).clamp(0.05, 1.0),
    )
}

/// Queues the slab and all spheres. Returns how many draws were accepted.
pub fn submit(graphics: &mut Graphics) -> usize {
    let extent = SPACING * GRID_SIZE as f32;
    let mut queued = usize::from(graphics.draw_cube(
        0.0,
        -0.5,
        0.0,
        extent,
        0.5,
        extent,
        Material::new(Vector3::repeat(0.5), 0.0, 0.8),
    ));

    for row in 0..GRID_SIZE {
        for column in 0..GRID_SIZE {
            queued += usize::from(graphics.draw_sphere(
                SPACING * (column as f32 + 0.5),
                SPHERE_SCALE * 0.5,
                SPACING * (row as f32 + 0.5),
                SPHERE_SCALE,
                grid_material(row, column),
            ));
        }
    }
    queued
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::Config;
    use crate::pipeline::queue::MeshId;

    #[test]
    fn corners_span_the_material_range() {
        let smooth_dielectric = grid_material(0, 0);
        assert_eq!(smooth_dielectric.metallic, 0.0);
        assert_eq!(smooth_dielectric.perceptual_roughness, 0.05);

        let rough_metal = grid_material(GRID_SIZE - 1, GRID_SIZE - 1);
        assert_eq!(rough_metal.metallic, 1.0);
        assert_eq!(rough_metal.perceptual_roughness, 1.0);
    }

    #[test]
    fn spheres_rest_on_the_slab() {
        let mut config = Config::default();
        config.render.width = 4;
        config.render.height = 4;
        config.render.sphere_segments = 4;
        let mut graphics = Graphics::with_environment(&config, None);

        assert_eq!(submit(&mut graphics), GRID_SIZE * GRID_SIZE + 1);
        let spheres: Vec<_> = graphics
            .queue()
            .iter()
            .filter(|cmd| cmd.mesh == MeshId::SPHERE)
            .collect();
        assert_eq!(spheres.len(), GRID_SIZE * GRID_SIZE);
        for cmd in spheres {
            // lowest point of the scaled unit-diameter sphere
            let bottom = cmd.model.transform_point(Vector3::new(0.0, -0.5, 0.0));
            assert!(bottom.y.abs() < 1e-6);
        }
    }
}
