use crate::core::math::Vector3;
use crate::core::rasterizer::CullMode;
use crate::io::AssetError;
use crate::scene::mesh::NormalMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub shadow: ShadowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, AssetError> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    // --- Output & Quality ---
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_exposure")]
    pub exposure: f32,
    #[serde(default = "default_true")]
    pub use_aces: bool,

    // --- Frame ---
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 3],
    #[serde(default = "default_true")]
    pub show_environment: bool,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub cull_mode: CullMode,

    // --- Built-in meshes ---
    #[serde(default = "default_sphere_segments")]
    pub sphere_segments: usize,
    #[serde(default)]
    pub sphere_normals: NormalMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            samples: default_samples(),
            exposure: default_exposure(),
            use_aces: true,
            clear_color: default_clear_color(),
            show_environment: true,
            queue_capacity: default_queue_capacity(),
            cull_mode: CullMode::default(),
            sphere_segments: default_sphere_segments(),
            sphere_normals: NormalMode::default(),
        }
    }
}

fn default_width() -> usize {
    1280
}
fn default_height() -> usize {
    960
}
fn default_samples() -> usize {
    1
}
fn default_exposure() -> f32 {
    1.0
}
fn default_clear_color() -> [f32; 3] {
    [0.2, 0.5, 0.1]
}
fn default_queue_capacity() -> usize {
    1024
}
fn default_sphere_segments() -> usize {
    64
}
fn default_true() -> bool {
    true
}

/// Orthographic light camera used for the depth pass.
#[derive(Debug, Clone, Deserialize)]
pub struct ShadowConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_shadow_map_size")]
    pub map_size: usize,
    /// The light eye sits at `direction * distance`.
    #[serde(default = "default_shadow_distance")]
    pub distance: f32,
    /// `[left, right, bottom, top, near, far]`.
    #[serde(default = "default_shadow_bounds")]
    pub bounds: [f32; 6],
    #[serde(default = "default_shadow_bias")]
    pub bias: f32,
    #[serde(default = "default_pcf_kernel")]
    pub pcf_kernel: i32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            map_size: default_shadow_map_size(),
            distance: default_shadow_distance(),
            bounds: default_shadow_bounds(),
            bias: default_shadow_bias(),
            pcf_kernel: default_pcf_kernel(),
        }
    }
}

fn default_shadow_map_size() -> usize {
    1024
}
fn default_shadow_distance() -> f32 {
    8.0
}
fn default_shadow_bounds() -> [f32; 6] {
    [-2.0, 18.0, -10.0, 10.0, 1.0, 20.0]
}
fn default_shadow_bias() -> f32 {
    0.005
}
fn default_pcf_kernel() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default = "default_camera_front")]
    pub front: [f32; 3],
    #[serde(default = "default_camera_up")]
    pub up: [f32; 3],
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            front: default_camera_front(),
            up: default_camera_up(),
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            sensitivity: default_sensitivity(),
            move_speed: default_move_speed(),
        }
    }
}

fn default_camera_position() -> [f32; 3] {
    [4.027637, 17.071016, 10.351642]
}
fn default_camera_front() -> [f32; 3] {
    [-0.001730, -0.943801, -0.330509]
}
fn default_camera_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}
fn default_fov() -> f32 {
    30.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    1000.0
}
fn default_sensitivity() -> f32 {
    0.1
}
fn default_move_speed() -> f32 {
    0.5
}

#[derive(Debug, Clone, Deserialize)]
pub struct LightConfig {
    /// Towards the light; the magnitude also scales the shadow eye distance.
    #[serde(default = "default_light_direction")]
    pub direction: [f32; 3],
    #[serde(default = "default_light_color")]
    pub color: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: default_light_direction(),
            color: default_light_color(),
        }
    }
}

fn default_light_direction() -> [f32; 3] {
    [0.6, 1.0, 0.3]
}
fn default_light_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// IBL inputs and precomputation resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    /// Equirectangular HDR; a procedural sky is used when absent or unreadable.
    #[serde(default = "default_hdr_path")]
    pub hdr_path: Option<PathBuf>,
    #[serde(default = "default_cube_size")]
    pub cube_size: usize,
    #[serde(default = "default_irradiance_size")]
    pub irradiance_size: usize,
    /// Riemann step of the irradiance integral, in radians.
    #[serde(default = "default_irradiance_sample_delta")]
    pub irradiance_sample_delta: f32,
    #[serde(default = "default_prefilter_size")]
    pub prefilter_size: usize,
    #[serde(default = "default_prefilter_mip_levels")]
    pub prefilter_mip_levels: usize,
    #[serde(default = "default_prefilter_samples")]
    pub prefilter_samples: u32,
    #[serde(default = "default_brdf_lut_size")]
    pub brdf_lut_size: usize,
    #[serde(default = "default_brdf_samples")]
    pub brdf_samples: u32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            hdr_path: default_hdr_path(),
            cube_size: default_cube_size(),
            irradiance_size: default_irradiance_size(),
            irradiance_sample_delta: default_irradiance_sample_delta(),
            prefilter_size: default_prefilter_size(),
            prefilter_mip_levels: default_prefilter_mip_levels(),
            prefilter_samples: default_prefilter_samples(),
            brdf_lut_size: default_brdf_lut_size(),
            brdf_samples: default_brdf_samples(),
        }
    }
}

fn default_hdr_path() -> Option<PathBuf> {
    Some(PathBuf::from("assets/spruit_sunrise_4k.hdr"))
}
fn default_cube_size() -> usize {
    128
}
fn default_irradiance_size() -> usize {
    16
}
fn default_irradiance_sample_delta() -> f32 {
    0.05
}
fn default_prefilter_size() -> usize {
    64
}
fn default_prefilter_mip_levels() -> usize {
    5
}
fn default_prefilter_samples() -> u32 {
    64
}
fn default_brdf_lut_size() -> usize {
    64
}
fn default_brdf_samples() -> u32 {
    256
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// Chess board in its initial position.
    #[default]
    Chess,
    /// Grid of spheres sweeping metallic and roughness.
    Materials,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub kind: SceneKind,
    /// Directory holding `pawn.obj`, `rook.obj`, ...
    #[serde(default = "default_pieces_dir")]
    pub pieces_dir: PathBuf,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            kind: SceneKind::default(),
            pieces_dir: default_pieces_dir(),
        }
    }
}

fn default_pieces_dir() -> PathBuf {
    PathBuf::from("assets/pieces")
}

/// Scripted input replayed by the headless frame loop.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_frames")]
    pub frames: usize,
    /// Output file; frame numbers are inserted before the extension when
    /// more than one frame is rendered.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_frame_time")]
    pub frame_time: f32,
    /// Cursor motion per frame, in pixels.
    #[serde(default = "default_mouse_step")]
    pub mouse_step: [f32; 2],
    /// Keys held down on every frame, e.g. `["w", "a"]`.
    #[serde(default)]
    pub keys: Vec<String>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            output: default_output(),
            frame_time: default_frame_time(),
            mouse_step: default_mouse_step(),
            keys: Vec::new(),
        }
    }
}

fn default_frames() -> usize {
    1
}
fn default_output() -> PathBuf {
    PathBuf::from("chess.png")
}
fn default_frame_time() -> f32 {
    1.0 / 30.0
}
fn default_mouse_step() -> [f32; 2] {
    [0.0, 0.0]
}

/// `[x, y, z]` config triples as vectors.
pub fn vec3(a: [f32; 3]) -> Vector3 {
    Vector3::from_array(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!((config.render.width, config.render.height), (1280, 960));
        assert_eq!(config.render.clear_color, [0.2, 0.5, 0.1]);
        assert_eq!(config.render.queue_capacity, 1024);
        assert_eq!(config.shadow.map_size, 1024);
        assert_eq!(config.shadow.bounds, [-2.0, 18.0, -10.0, 10.0, 1.0, 20.0]);
        assert_eq!(config.camera.fov, 30.0);
        assert_eq!(config.light.direction, [0.6, 1.0, 0.3]);
        assert_eq!(config.environment.prefilter_mip_levels, 5);
        assert_eq!(config.scene.kind, SceneKind::Chess);
        assert_eq!(config.animation.frames, 1);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [render]
            width = 320
            cull_mode = "none"
            sphere_normals = "flat"

            [environment]
            hdr_path = "sky.hdr"

            [scene]
            kind = "materials"

            [animation]
            frames = 4
            keys = ["w", "d"]
            "#,
        )
        .unwrap();
        assert_eq!(config.render.width, 320);
        assert_eq!(config.render.height, 960);
        assert_eq!(config.render.cull_mode, CullMode::None);
        assert_eq!(config.render.sphere_normals, NormalMode::Flat);
        assert_eq!(config.environment.hdr_path, Some(PathBuf::from("sky.hdr")));
        assert_eq!(config.environment.cube_size, 128);
        assert_eq!(config.scene.kind, SceneKind::Materials);
        assert_eq!(config.animation.keys, vec!["w", "d"]);
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(Config::from_toml("[render]\nwidth = \"wide\""), Err(AssetError::Toml(_))));
        assert!(matches!(Config::load("/nonexistent/scene.toml"), Err(AssetError::Io(_))));
    }
}
