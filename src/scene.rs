pub mod camera;
pub mod chess;
pub mod light;
pub mod material;
pub mod mesh;
pub mod showcase;
