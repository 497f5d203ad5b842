pub mod cli;
pub mod config;
pub mod image;
pub mod obj_loader;

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or decode something from disk.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to load OBJ: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("image error: {0}")]
    Image(#[from] ::image::ImageError),
    #[error("model {} has no triangles", .0.display())]
    EmptyModel(PathBuf),
}
