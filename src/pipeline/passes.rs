use crate::core::color::encode_rgb8;
use crate::core::framebuffer::FrameBuffer;
use crate::core::math::transform::TransformFactory;
use crate::core::math::{MathError, Matrix4, Vector3, Vector4};
use crate::ibl::IblMaps;
use crate::io::config::ShadowConfig;
use crate::pipeline::queue::CommandQueue;
use crate::pipeline::renderer::{MeshRegistry, Renderer};
use crate::pipeline::shaders::pbr::PbrShader;
use crate::pipeline::shaders::shadow::{ShadowMap, ShadowShader};
use crate::scene::light::DirectionalLight;
use image::RgbImage;
use log::{error, warn};
use rayon::prelude::*;

/// Counters reported by one call to `Graphics::update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub shadow_draws: usize,
    pub color_draws: usize,
    /// Color draws skipped because of a singular model matrix or an unknown mesh.
    pub failed_draws: usize,
    /// Commands rejected by a full queue while the frame was built.
    pub dropped_commands: usize,
}

/// Projection · view of the shadow camera: placed at `direction * distance`,
/// looking at the origin through an orthographic box.
pub fn light_space_matrix(
    light: &DirectionalLight,
    settings: &ShadowConfig,
) -> Result<Matrix4, MathError> {
    let eye = light.shadow_eye(settings.distance);
    let view = TransformFactory::look_at(&eye, &Vector3::zeros(), &light.shadow_up())?;
    let [left, right, bottom, top, near, far] = settings.bounds;
    let projection = TransformFactory::orthographic(left, right, bottom, top, near, far);
    Ok(projection * view)
}

/// Executes the shadow mapping pass and returns the captured depth together
/// with the number of meshes actually drawn.
pub fn render_shadow_pass(
    queue: &CommandQueue,
    meshes: &MeshRegistry,
    shadow_renderer: &mut Renderer,
    light_space: Matrix4,
    settings: &ShadowConfig,
) -> (ShadowMap, usize) {
    shadow_renderer.clear(Vector3::zeros());

    let renderer = &*shadow_renderer;
    let mut drawn = 0;
    queue.drain_for_shadow_pass(|cmd| {
        if let Some(vertices) = meshes.get(cmd.mesh) {
            let shader = ShadowShader::new(&cmd.model, &light_space);
            renderer.draw_mesh(vertices, &shader);
            drawn += 1;
        }
    });

    let framebuffer = &shadow_renderer.framebuffer;
    let map = ShadowMap {
        depth: framebuffer.depth_snapshot(),
        size: framebuffer.buffer_width,
        light_space,
        bias: settings.bias,
        pcf_kernel: settings.pcf_kernel,
    };
    (map, drawn)
}

/// Per-frame inputs shared by every draw of the color pass.
pub struct ColorPass<'a> {
    pub view_projection: Matrix4,
    pub camera_pos: Vector3,
    pub light: &'a DirectionalLight,
    pub shadow_map: Option<&'a ShadowMap>,
    pub ibl: Option<&'a IblMaps>,
}

/// Executes the lit pass. Returns `(visited, failed)`; a failed draw is
/// logged and skipped, the rest of the frame still renders.
pub fn render_color_pass(
    queue: &CommandQueue,
    meshes: &MeshRegistry,
    renderer: &Renderer,
    pass: &ColorPass<'_>,
) -> (usize, usize) {
    let mut failed = 0;
    let visited = queue.drain_for_color_pass(|cmd| {
        let Some(vertices) = meshes.get(cmd.mesh) else {
            warn!("Skipping draw of unknown {}", cmd.mesh);
            failed += 1;
            return;
        };
        match PbrShader::new(
            cmd.model,
            pass.view_projection,
            pass.camera_pos,
            cmd.material,
            pass.light,
        ) {
            Ok(shader) => {
                let shader = shader.with_shadow_map(pass.shadow_map).with_ibl(pass.ibl);
                renderer.draw_mesh(vertices, &shader);
            }
            Err(e) => {
                error!("Skipping draw of {}: {}", cmd.mesh, e);
                failed += 1;
            }
        }
    });
    (visited, failed)
}

/// Paints the environment behind everything the color pass left uncovered.
///
/// Rays come from the far plane unprojected through the rotation part of
/// `view`, so the sky stays put while the camera moves.
pub fn render_background(
    framebuffer: &mut FrameBuffer,
    view: &Matrix4,
    projection: &Matrix4,
    ibl: &IblMaps,
) -> Result<(), MathError> {
    let mut rotation = *view;
    for row in 0..3 {
        rotation.set(row, 3, 0.0);
    }
    let inverse = (*projection * rotation).invert()?;

    let width = framebuffer.buffer_width as f32;
    let height = framebuffer.buffer_height as f32;
    framebuffer.fill_uncovered(|x, y| {
        let ndc_x = (x as f32 + 0.5) / width * 2.0 - 1.0;
        let ndc_y = 1.0 - (y as f32 + 0.5) / height * 2.0;
        let p = inverse * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);
        let dir = if p.w == 0.0 { p.xyz() } else { p.xyz() / p.w };
        ibl.background(dir)
    });
    Ok(())
}

/// Post-processing: exposure -> tone mapping -> gamma -> 8-bit RGB.
pub fn post_process_to_image(framebuffer: &FrameBuffer, exposure: f32, use_aces: bool) -> RgbImage {
    let width = framebuffer.width;
    let mut image = RgbImage::new(width as u32, framebuffer.height as u32);
    if width == 0 || framebuffer.height == 0 {
        return image;
    }

    image
        .par_chunks_mut(width * 3)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.chunks_exact_mut(3).enumerate() {
                if let Some(color) = framebuffer.get_pixel(x, y) {
                    pixel.copy_from_slice(&encode_rgb8(color, exposure, use_aces));
                }
            }
        });
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibl::BrdfLut;
    use crate::pipeline::queue::{DrawCommand, MeshId};
    use crate::scene::material::Material;
    use crate::scene::mesh::make_cube_mesh;

    #[test]
    fn light_space_sees_the_origin() {
        let light = DirectionalLight::new(Vector3::new(0.6, 1.0, 0.3), Vector3::repeat(1.0));
        let m = light_space_matrix(&light, &ShadowConfig::default()).unwrap();

        let origin = m.transform_point(Vector3::zeros());
        assert!(origin.x.abs() <= 1.0 && origin.y.abs() <= 1.0 && origin.z.abs() <= 1.0);
        // the box is shifted: -2..18 around the view axis
        assert!((origin.x + 0.8).abs() < 1e-4, "{origin:?}");

        // further from the light than the far plane
        let beyond = m.transform_point(light.direction * -20.0);
        assert!(beyond.z > 1.0);
    }

    #[test]
    fn degenerate_light_is_an_error() {
        let light = DirectionalLight::new(Vector3::zeros(), Vector3::repeat(1.0));
        assert!(light_space_matrix(&light, &ShadowConfig::default()).is_err());
    }

    #[test]
    fn color_pass_skips_singular_and_unknown_draws() {
        let mut meshes = MeshRegistry::new();
        let cube = meshes.upload(make_cube_mesh());
        let mut queue = CommandQueue::with_capacity(4);
        let material = Material::default();
        queue.push(DrawCommand { mesh: cube, model: Matrix4::identity(), material });
        queue.push(DrawCommand { mesh: cube, model: Matrix4::zeros(), material });
        queue.push(DrawCommand { mesh: MeshId(9), model: Matrix4::identity(), material });

        let renderer = Renderer::new(4, 4, 1);
        let light = DirectionalLight::default();
        let pass = ColorPass {
            view_projection: Matrix4::identity(),
            camera_pos: Vector3::new(0.0, 0.0, 5.0),
            light: &light,
            shadow_map: None,
            ibl: None,
        };
        assert_eq!(render_color_pass(&queue, &meshes, &renderer, &pass), (3, 2));
    }

    #[test]
    fn shadow_pass_captures_occluder_depth() {
        let mut meshes = MeshRegistry::new();
        let cube = meshes.upload(make_cube_mesh());
        let mut queue = CommandQueue::with_capacity(2);
        queue.push(DrawCommand {
            mesh: cube,
            model: TransformFactory::translation(&Vector3::new(-0.5, -0.5, -0.5), 1.0),
            material: Material::default(),
        });

        let mut renderer = Renderer::new(8, 8, 1);
        renderer.rasterizer.set_cull_mode(crate::core::rasterizer::CullMode::None);
        let settings = ShadowConfig::default();
        let (map, drawn) =
            render_shadow_pass(&queue, &meshes, &mut renderer, Matrix4::identity(), &settings);

        assert_eq!(drawn, 1);
        assert_eq!(map.size, 8);
        // nearest face of the cube sits at z = -0.5
        let center = map.depth[4 * 8 + 4];
        assert!((center - 0.25).abs() < 1e-5, "{center}");
        // behind the cube is in shadow, in front of it is lit
        assert_eq!(map.visibility(Vector3::new(0.0, 0.0, 0.9), 1.0), 0.0);
        assert_eq!(map.visibility(Vector3::new(0.0, 0.0, -0.9), 1.0), 1.0);
    }

    #[test]
    fn shadow_pass_counts_only_known_meshes() {
        let mut meshes = MeshRegistry::new();
        let cube = meshes.upload(make_cube_mesh());
        let mut queue = CommandQueue::with_capacity(4);
        let material = Material::default();
        queue.push(DrawCommand { mesh: cube, model: Matrix4::identity(), material });
        queue.push(DrawCommand { mesh: MeshId(9), model: Matrix4::identity(), material });
        queue.push(DrawCommand { mesh: MeshId::INVALID, model: Matrix4::identity(), material });

        let mut renderer = Renderer::new(4, 4, 1);
        let (_, drawn) = render_shadow_pass(
            &queue,
            &meshes,
            &mut renderer,
            Matrix4::identity(),
            &ShadowConfig::default(),
        );
        assert_eq!(drawn, 1);
    }

    #[test]
    fn background_fills_only_uncovered_pixels() {
        let mut renderer = Renderer::new(4, 4, 1);
        renderer.clear(Vector3::zeros());
        assert!(renderer.framebuffer.depth_test_and_update(0, 0, 0.5));
        renderer.framebuffer.set_pixel_safe(0, 0, Vector3::x_axis());

        let sky = IblMaps::uniform(Vector3::new(0.2, 0.4, 0.8), BrdfLut::integrate(4, 8));
        let view = TransformFactory::look_at(
            &Vector3::new(3.0, 2.0, 1.0),
            &Vector3::zeros(),
            &Vector3::y_axis(),
        )
        .unwrap();
        let projection = TransformFactory::perspective(1.0, 1.0, 0.1, 100.0);
        render_background(&mut renderer.framebuffer, &view, &projection, &sky).unwrap();

        assert_eq!(renderer.framebuffer.get_pixel(0, 0), Some(Vector3::x_axis()));
        let filled = renderer.framebuffer.get_pixel(3, 2).unwrap();
        assert!((filled - Vector3::new(0.2, 0.4, 0.8)).length() < 1e-5);
    }

    #[test]
    fn post_process_encodes_every_pixel() {
        let mut fb = FrameBuffer::new(3, 2, 2);
        fb.clear(Vector3::repeat(100.0), f32::INFINITY);
        let image = post_process_to_image(&fb, 1.0, true);
        assert_eq!(image.dimensions(), (3, 2));
        assert!(image.pixels().all(|p| p.0 == [255, 255, 255]));

        let black = post_process_to_image(&FrameBuffer::new(2, 2, 1), 1.0, false);
        assert!(black.pixels().all(|p| p.0 == [0, 0, 0]));
    }
}
