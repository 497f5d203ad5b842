use crate::core::math::MathError;
use crate::io::AssetError;
use crate::io::config::{CameraConfig, Config, SceneKind, vec3};
use crate::io::image::{frame_path, save_image};
use crate::pipeline::graphics::{Graphics, GraphicsError};
use crate::scene::camera::Camera;
use crate::scene::chess::{self, Board, PieceModels};
use crate::scene::showcase;
use crate::ui::input::{CameraController, InputError, ScriptedInput};
use log::{info, warn};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Graphics(#[from] GraphicsError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Math(#[from] MathError),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// What gets submitted every frame.
pub enum Scene {
    Chess { board: Board, models: PieceModels },
    Materials,
}

impl Scene {
    /// Builds the scene, uploading whatever meshes it needs.
    pub fn load(config: &Config, graphics: &mut Graphics) -> Self {
        match config.scene.kind {
            SceneKind::Chess => Scene::Chess {
                board: Board::initial(),
                models: PieceModels::load(graphics, &config.scene.pieces_dir),
            },
            SceneKind::Materials => Scene::Materials,
        }
    }

    /// Queues one frame of draws and returns how many were accepted.
    pub fn submit(&self, graphics: &mut Graphics) -> Result<usize, GraphicsError> {
        match self {
            Scene::Chess { board, models } => chess::submit(board, models, graphics),
            Scene::Materials => Ok(showcase::submit(graphics)),
        }
    }
}

pub fn build_camera(settings: &CameraConfig) -> Result<Camera, MathError> {
    Ok(Camera::new(
        vec3(settings.position),
        vec3(settings.front),
        vec3(settings.up),
        settings.fov,
    )?
    .with_sensitivity(settings.sensitivity))
}

/// Renders the configured number of frames headlessly, one PNG each.
pub fn run(config: &Config) -> Result<(), AppError> {
    let frames = config.animation.frames.max(1);
    info!(
        "Rendering {} frame(s) of the {:?} scene at {}x{}",
        frames, config.scene.kind, config.render.width, config.render.height
    );
    let start_time = Instant::now();

    let mut graphics = Graphics::new(config)?;
    let scene = Scene::load(config, &mut graphics);
    let mut camera = build_camera(&config.camera)?;
    let controller = CameraController::new(config.camera.move_speed);
    let mut input = ScriptedInput::from_config(&config.animation)?;

    info!("Setup completed in {:.2?}", start_time.elapsed());

    for frame in 1..=frames {
        let frame_start = Instant::now();
        camera.tick(frame as f32 * config.animation.frame_time);
        controller.update(&input.next_frame(), &mut camera)?;

        scene.submit(&mut graphics)?;
        let stats = graphics.update(&camera)?;
        if stats.failed_draws > 0 || stats.dropped_commands > 0 {
            warn!(
                "Frame {}: {} draw(s) failed, {} dropped",
                frame, stats.failed_draws, stats.dropped_commands
            );
        }

        let path = frame_path(&config.animation.output, frame, frames);
        save_image(&graphics.image(), &path)?;
        info!("Frame {}/{} done in {:.2?}", frame, frames, frame_start.elapsed());
    }

    info!("Done in {:.2?}", start_time.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_matches_the_config_pose() {
        let camera = build_camera(&CameraConfig::default()).unwrap();
        assert_eq!(camera.position(), Camera::default().position());
        assert!((camera.front() - Camera::default().front()).length() < 1e-5);
        assert_eq!(camera.fov(), 30.0);
    }

    #[test]
    fn camera_without_a_direction_is_rejected() {
        let settings = CameraConfig {
            front: [0.0, 0.0, 0.0],
            ..CameraConfig::default()
        };
        assert!(matches!(build_camera(&settings), Err(MathError::DegenerateVector)));
    }

    #[test]
    fn materials_scene_needs_no_assets() {
        let mut config = Config::default();
        config.render.width = 4;
        config.render.height = 4;
        config.render.sphere_segments = 4;
        config.scene.kind = SceneKind::Materials;
        let mut graphics = Graphics::with_environment(&config, None);

        let scene = Scene::load(&config, &mut graphics);
        assert!(matches!(scene, Scene::Materials));
        assert_eq!(scene.submit(&mut graphics).unwrap(), 50);
    }
}
