//! Error types for the viewfinder host.

use thiserror::Error;

/// Errors surfaced by the host integration layer.
#[derive(Error, Debug)]
pub enum ViewfinderError {
    /// The windowing event loop could not be created or run.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The presentation engine failed to initialize.
    #[error("render error: {0}")]
    Render(#[from] viewfinder_render::RenderError),
}

/// A specialized Result type for viewfinder operations.
pub type Result<T> = std::result::Result<T, ViewfinderError>;
