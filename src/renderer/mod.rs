//! Rendering module
//!
//! `scene` composes the game state into flat-colored triangles in level
//! pixels; `pipeline` uploads them to WebGPU each frame.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::build_scene;
pub use vertex::Vertex;
