//! Core geometry for viewfinder-rs.
//!
//! This crate provides the GPU-free half of the presentation engine:
//! - [`Extent`] — screen and source dimension pairs, with `(0, 0)` as the
//!   "unknown" sentinel
//! - [`Rotation`] — the display-rotation hint and its compensation matrix
//! - [`projection`] — the crop-to-fill projection math
//! - [`ViewGeometry`] — render-thread-owned state tying the three together

// Internal geometry helpers don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod extent;
pub mod geometry;
pub mod projection;
pub mod rotation;

pub use extent::Extent;
pub use geometry::{GeometryPhase, ViewGeometry};
pub use projection::{crop_scale, fill_projection, model_view_projection, view_matrix, CropScale};
pub use rotation::Rotation;

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
