pub mod graphics;
pub mod passes;
pub mod queue;
pub mod renderer;
pub mod shaders;
