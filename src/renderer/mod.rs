//! WebGPU rendering module
//!
//! Everything is drawn as instanced boxes: entity parts, water tiles, grass
//! blades and rain streaks.

pub mod instances;
pub mod pipeline;
pub mod vertex;

pub use instances::{Lighting, build_instances, lighting};
pub use pipeline::RenderState;
