//! The crop-to-fill projection.
//!
//! Maps a streamed source image onto a screen-filling quad so that the image
//! always covers the whole output surface: the axis whose relative aspect
//! overflows is cropped, the other is kept at full scale, and the source's
//! own aspect ratio is preserved (no anisotropic stretch).

use glam::{Mat4, Vec3};

use crate::extent::Extent;
use crate::rotation::Rotation;

/// Per-axis orthographic scale pair derived from the two aspect ratios.
///
/// The overflowing axis carries `max(aspect) / min(aspect)`; the other is
/// exactly `1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropScale {
    /// Horizontal orthographic half-extent.
    pub x: f32,
    /// Vertical orthographic half-extent.
    pub y: f32,
}

impl CropScale {
    /// Scale pair for the given output aspect and (already swapped) source
    /// aspect.
    #[must_use]
    pub fn from_aspects(screen_aspect: f32, source_aspect: f32) -> Self {
        if screen_aspect > source_aspect {
            Self {
                x: 1.0,
                y: screen_aspect / source_aspect,
            }
        } else {
            Self {
                x: source_aspect / screen_aspect,
                y: 1.0,
            }
        }
    }

    /// Fraction of the cropped axis that stays visible.
    #[must_use]
    pub fn visible_fraction(self) -> f32 {
        1.0 / self.x.max(self.y)
    }
}

/// View matrix for the quad: eye one unit in front, looking at the origin.
#[must_use]
pub fn view_matrix() -> Mat4 {
    Mat4::look_at_rh(Vec3::Z, Vec3::ZERO, Vec3::Y)
}

/// Crop scale for known screen and source extents.
///
/// Source dimensions arrive in sensor-native (landscape) orientation, so the
/// source aspect is swapped before comparing against the output surface.
/// Returns `None` while either extent is unknown.
#[must_use]
pub fn crop_scale(screen: Extent, source: Extent) -> Option<CropScale> {
    Some(CropScale::from_aspects(
        screen.aspect()?,
        source.swapped_aspect()?,
    ))
}

/// Orthographic projection with the overflowing axis widened to the crop
/// scale.
#[must_use]
pub fn fill_projection(scale: CropScale) -> Mat4 {
    Mat4::orthographic_rh(-scale.x, scale.x, -scale.y, scale.y, -1.0, 1.0)
}

/// Full model-view-projection for the quad: crop-to-fill projection, view,
/// then the display-rotation compensation.
///
/// Returns `None` while either extent is unknown; callers treat that as
/// "projection undefined" and draw nothing (or an untransformed clear).
#[must_use]
pub fn model_view_projection(screen: Extent, source: Extent, rotation: Rotation) -> Option<Mat4> {
    let scale = crop_scale(screen, source)?;
    Some(fill_projection(scale) * view_matrix() * rotation.matrix())
}
