//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create the output surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// Shader compilation or pipeline validation was rejected.
    #[error("shader build failed: {0}")]
    ShaderBuildFailed(String),

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,

    /// Pixel readback needs the offscreen target of a headless engine.
    #[error("readback requires a headless render target")]
    NoReadbackTarget,

    /// GPU buffer mapping failed during readback.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
