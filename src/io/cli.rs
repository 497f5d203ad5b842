use crate::io::AssetError;
use crate::io::config::{Config, SceneKind};
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Headless renderer for a 3D chess board.
#[derive(Parser, Debug)]
#[command(name = "chess3d", version)]
#[command(about = "Software-rasterized PBR chess board, rendered to PNG")]
pub struct Cli {
    /// Configuration file (TOML); built-in defaults when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Scene to render
    #[arg(long, value_enum)]
    pub scene: Option<SceneKind>,

    /// Number of frames to render
    #[arg(short, long)]
    pub frames: Option<usize>,

    /// Output image; frame numbers are added when rendering several frames
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Loads the configuration and applies the command-line overrides.
    pub fn into_config(self) -> Result<Config, AssetError> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading config: {}", path.display());
                Config::load(path)?
            }
            None => {
                info!("Using default settings");
                Config::default()
            }
        };

        if let Some(scene) = self.scene {
            config.scene.kind = scene;
        }
        if let Some(frames) = self.frames {
            config.animation.frames = frames;
        }
        if let Some(output) = self.output {
            config.animation.output = output;
        }
        Ok(config)
    }
}
