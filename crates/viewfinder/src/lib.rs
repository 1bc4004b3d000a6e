//! viewfinder: full-screen presentation of a streamed camera-style feed.
//!
//! The host side of the presentation engine: opens a window, drives one
//! draw per display refresh, and wires a frame producer into the engine's
//! streaming surface. The engine itself lives in `viewfinder-render`; the
//! crop-to-fill math lives in `viewfinder-core`.
//!
//! # Quick Start
//!
//! ```no_run
//! fn main() -> viewfinder::Result<()> {
//!     // Opens the window and blocks until it is closed.
//!     viewfinder::show()
//! }
//! ```

mod app;
mod error;
mod init;
pub mod source;

pub use app::HostEvent;
pub use error::{Result, ViewfinderError};
pub use init::{show, show_with_rotation};
pub use source::FrameSource;

// Re-export the types hosts interact with
pub use viewfinder_core::{Extent, GeometryPhase, Rotation, ViewGeometry};
pub use viewfinder_render::{FrameSender, PresentEngine, RenderError, StreamFrame};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
