use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::VertexArray;
use crate::core::math::transform::TransformFactory;
use crate::core::math::{MathError, Matrix4, Vector3};
use crate::core::rasterizer::CullMode;
use crate::ibl::{EquirectMap, IblMaps};
use crate::io::AssetError;
use crate::io::config::{Config, EnvironmentConfig, RenderConfig, ShadowConfig, vec3};
use crate::io::obj_loader::load_obj;
use crate::pipeline::passes::{
    ColorPass, FrameStats, light_space_matrix, post_process_to_image, render_background,
    render_color_pass, render_shadow_pass,
};
use crate::pipeline::queue::{CommandQueue, DrawCommand, MeshId};
use crate::pipeline::renderer::{MeshRegistry, Renderer};
use crate::scene::camera::Camera;
use crate::scene::light::DirectionalLight;
use crate::scene::material::Material;
use crate::scene::mesh::{make_cube_mesh, make_sphere_mesh_with};
use image::RgbImage;
use log::{debug, info, warn};
use std::path::Path;
use thiserror::Error;

/// Radius of the built-in sphere mesh; `draw_sphere` scales it.
pub const SPHERE_RADIUS: f32 = 0.5;

/// Resolution of the fallback sky when no HDR file can be read.
const PROCEDURAL_SKY_SIZE: (usize, usize) = (512, 256);

#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error(transparent)]
    Math(#[from] MathError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("{0} has not been uploaded")]
    UnknownMesh(MeshId),
}

/// Immediate-mode front end of the renderer.
///
/// Scene code submits draws during a frame; [`update`](Self::update) then
/// renders them in order (shadow pass, color pass, background) and empties
/// the queue for the next frame.
pub struct Graphics {
    render: RenderConfig,
    shadow: ShadowConfig,
    near: f32,
    far: f32,

    color_renderer: Renderer,
    shadow_renderer: Renderer,
    meshes: MeshRegistry,
    queue: CommandQueue,

    light: DirectionalLight,
    clear_color: Vector3,
    show_environment: bool,
    ibl: Option<IblMaps>,
}

impl Graphics {
    /// Builds the render targets, uploads the built-in meshes and
    /// precomputes image-based lighting.
    pub fn new(config: &Config) -> Result<Self, GraphicsError> {
        let source = load_environment(&config.environment);
        let ibl = IblMaps::precompute(&source, &config.environment)?;
        Ok(Self::with_environment(config, Some(ibl)))
    }

    /// Like [`new`](Self::new) with ready-made lighting maps. Without maps the
    /// ambient term is a small constant and no background is drawn.
    pub fn with_environment(config: &Config, ibl: Option<IblMaps>) -> Self {
        let render = config.render.clone();
        let shadow = config.shadow.clone();

        let mut color_renderer = Renderer::new(render.width, render.height, render.samples);
        color_renderer.rasterizer.set_cull_mode(render.cull_mode);
        // both faces cast shadows
        let mut shadow_renderer = Renderer::new(shadow.map_size, shadow.map_size, 1);
        shadow_renderer.rasterizer.set_cull_mode(CullMode::None);

        let mut meshes = MeshRegistry::new();
        meshes.upload(make_sphere_mesh_with(
            SPHERE_RADIUS,
            render.sphere_segments,
            render.sphere_normals,
        ));
        meshes.upload(make_cube_mesh());

        info!(
            "Graphics ready: {}x{} ({}x SSAA), shadow map {}, queue capacity {}",
            render.width, render.height, render.samples, shadow.map_size, render.queue_capacity
        );

        Self {
            queue: CommandQueue::with_capacity(render.queue_capacity),
            light: DirectionalLight::new(vec3(config.light.direction), vec3(config.light.color)),
            clear_color: vec3(render.clear_color),
            show_environment: render.show_environment,
            near: config.camera.near,
            far: config.camera.far,
            render,
            shadow,
            color_renderer,
            shadow_renderer,
            meshes,
            ibl,
        }
    }

    // --- Submission ---

    /// Queues the built-in sphere, scaled by `radius`. Returns false when the
    /// queue is full.
    pub fn draw_sphere(&mut self, x: f32, y: f32, z: f32, radius: f32, material: Material) -> bool {
        let model = TransformFactory::translation(&Vector3::new(x, y, z), 1.0)
            * TransformFactory::scaling(&Vector3::repeat(radius));
        self.submit(MeshId::SPHERE, model, material)
    }

    /// Queues the unit cube stretched to `w × h × d` with its minimum corner
    /// at `(x, y, z)`.
    pub fn draw_cube(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
        h: f32,
        d: f32,
        material: Material,
    ) -> bool {
        let model = TransformFactory::translation(&Vector3::new(x, y, z), 1.0)
            * TransformFactory::scaling(&Vector3::new(w, h, d));
        self.submit(MeshId::CUBE, model, material)
    }

    /// Queues an uploaded mesh. `rotation` holds Euler angles in radians,
    /// applied Z first, then Y, then X.
    pub fn draw_model(
        &mut self,
        mesh: MeshId,
        position: Vector3,
        scale: Vector3,
        rotation: Vector3,
        material: Material,
    ) -> Result<bool, GraphicsError> {
        if !self.meshes.contains(mesh) {
            return Err(GraphicsError::UnknownMesh(mesh));
        }
        let model = TransformFactory::translation(&position, 1.0)
            * TransformFactory::rotation_x(rotation.x)
            * TransformFactory::rotation_y(rotation.y)
            * TransformFactory::rotation_z(rotation.z)
            * TransformFactory::scaling(&scale);
        Ok(self.submit(mesh, model, material))
    }

    fn submit(&mut self, mesh: MeshId, model: Matrix4, material: Material) -> bool {
        self.queue.push(DrawCommand {
            mesh,
            model,
            material,
        })
    }

    // --- Scene state ---

    pub fn set_light(&mut self, direction: Vector3, color: Vector3) {
        self.light = DirectionalLight::new(direction, color);
    }

    pub fn light(&self) -> &DirectionalLight {
        &self.light
    }

    pub fn set_clear_color(&mut self, color: Vector3) {
        self.clear_color = color;
    }

    /// Draws the environment behind the scene instead of the clear color.
    pub fn show_environment(&mut self, show: bool) {
        self.show_environment = show;
    }

    pub fn upload_mesh(&mut self, vertices: VertexArray) -> MeshId {
        let id = self.meshes.upload(vertices);
        debug!("Uploaded {}", id);
        id
    }

    pub fn load_model(&mut self, path: &Path) -> Result<MeshId, AssetError> {
        let vertices = load_obj(path)?;
        Ok(self.upload_mesh(vertices))
    }

    // --- Frame ---

    /// Renders everything submitted since the last call, then clears the
    /// queue. The queue is cleared even when the frame fails.
    pub fn update(&mut self, camera: &Camera) -> Result<FrameStats, GraphicsError> {
        let result = self.render_frame(camera);
        self.queue.clear();
        let stats = result?;
        debug!("{stats:?}");
        Ok(stats)
    }

    fn render_frame(&mut self, camera: &Camera) -> Result<FrameStats, GraphicsError> {
        let mut stats = FrameStats {
            dropped_commands: self.queue.dropped(),
            ..FrameStats::default()
        };

        self.light.to_light()?;
        let view = camera.view_matrix()?;
        let aspect = self.render.width as f32 / self.render.height.max(1) as f32;
        let projection = camera.projection_matrix(aspect, self.near, self.far);

        // 1. Shadow pass
        let shadow_map = if self.shadow.enabled {
            let light_space = light_space_matrix(&self.light, &self.shadow)?;
            let (map, drawn) = render_shadow_pass(
                &self.queue,
                &self.meshes,
                &mut self.shadow_renderer,
                light_space,
                &self.shadow,
            );
            stats.shadow_draws = drawn;
            Some(map)
        } else {
            None
        };

        // 2. Color target reset
        self.color_renderer.clear(self.clear_color);

        // 3. Color pass
        let pass = ColorPass {
            view_projection: projection * view,
            camera_pos: camera.position(),
            light: &self.light,
            shadow_map: shadow_map.as_ref(),
            ibl: self.ibl.as_ref(),
        };
        let (drawn, failed) = render_color_pass(&self.queue, &self.meshes, &self.color_renderer, &pass);
        stats.color_draws = drawn;
        stats.failed_draws = failed;

        // 4. Background
        if self.show_environment
            && let Some(ibl) = &self.ibl
        {
            render_background(&mut self.color_renderer.framebuffer, &view, &projection, ibl)?;
        }

        Ok(stats)
    }

    // --- Output ---

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.color_renderer.framebuffer
    }

    pub fn ibl(&self) -> Option<&IblMaps> {
        self.ibl.as_ref()
    }

    /// The last rendered frame, tone mapped to 8-bit sRGB.
    pub fn image(&self) -> RgbImage {
        post_process_to_image(
            &self.color_renderer.framebuffer,
            self.render.exposure,
            self.render.use_aces,
        )
    }
}

/// Reads the configured HDR, or builds a procedural sky when there is none.
fn load_environment(settings: &EnvironmentConfig) -> EquirectMap {
    if let Some(path) = &settings.hdr_path {
        match EquirectMap::load(path) {
            Ok(map) => {
                info!("Loaded environment {} ({}x{})", path.display(), map.width(), map.height());
                return map;
            }
            Err(e) => warn!(
                "Failed to load environment {}: {}. Using a procedural sky",
                path.display(),
                e
            ),
        }
    }
    EquirectMap::procedural_sky(PROCEDURAL_SKY_SIZE.0, PROCEDURAL_SKY_SIZE.1)
}
