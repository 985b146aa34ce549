//! WebGPU rendering module
//!
//! Draws the scene as textured, tinted triangles sorted by depth.

pub mod shapes;
pub mod sprite_pipeline;
pub mod vertex;

pub use sprite_pipeline::WgpuScene;
