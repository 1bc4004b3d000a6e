//! Rendering backend for viewfinder-rs.
//!
//! This crate provides the wgpu-based frame presentation engine:
//! - GPU resource setup (screen quad, stream texture, shader pipeline)
//! - The latest-wins frame streaming surface fed by producer threads
//! - The per-refresh draw step combining the crop-to-fill projection with
//!   each frame's texture transform

pub mod engine;
pub mod error;
pub mod quad;
pub mod shader;
pub mod stream;

pub use engine::{PresentEngine, QuadUniforms};
pub use error::{RenderError, RenderResult};
pub use quad::QuadBuffers;
pub use shader::{ShaderBuilder, STREAM_QUAD_SHADER};
pub use stream::{FrameSender, StreamFrame, StreamSurface, Y_FLIP_TRANSFORM};
