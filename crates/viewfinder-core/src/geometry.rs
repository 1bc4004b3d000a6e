//! Render-thread geometry state.
//!
//! [`ViewGeometry`] is owned exclusively by the render thread; size
//! notifications from other threads are marshaled onto that thread before
//! they land here, so no lock is needed.

use glam::Mat4;

use crate::extent::Extent;
use crate::projection;
use crate::rotation::Rotation;

/// Where the engine is in its geometry lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryPhase {
    /// At least one extent is still unknown; the projection is undefined.
    AwaitingGeometry,
    /// Both extents are known and the projection is valid. Later size
    /// changes keep the phase at `Ready` — values may change, they never
    /// revert to unknown.
    Ready,
}

/// Screen/source extents, the rotation hint, and the derived projection.
///
/// The projection is a pure function of its three inputs; it is recomputed
/// from scratch (not incrementally updated) the first time it is read after
/// any input changed.
#[derive(Debug, Clone)]
pub struct ViewGeometry {
    screen: Extent,
    source: Extent,
    rotation: Rotation,
    mvp: Option<Mat4>,
    stale: bool,
}

impl ViewGeometry {
    /// Creates geometry state with both extents unknown.
    #[must_use]
    pub fn new(rotation: Rotation) -> Self {
        Self {
            screen: Extent::UNKNOWN,
            source: Extent::UNKNOWN,
            rotation,
            mvp: None,
            stale: false,
        }
    }

    /// Records a new output surface size.
    ///
    /// Idempotent for identical values. Once a size is known it never
    /// reverts to unknown: a zero-sided extent (the sentinel a minimized
    /// surface reports) keeps the last known geometry.
    pub fn set_screen(&mut self, extent: Extent) {
        if !extent.is_known() && self.screen.is_known() {
            return;
        }
        if self.screen != extent {
            self.screen = extent;
            self.stale = true;
        }
    }

    /// Records a new source stream size (sensor-native orientation).
    ///
    /// Same idempotence and never-revert rules as [`Self::set_screen`].
    pub fn set_source(&mut self, extent: Extent) {
        if !extent.is_known() && self.source.is_known() {
            return;
        }
        if self.source != extent {
            self.source = extent;
            self.stale = true;
        }
    }

    /// Current output surface size.
    #[must_use]
    pub fn screen(&self) -> Extent {
        self.screen
    }

    /// Current source stream size.
    #[must_use]
    pub fn source(&self) -> Extent {
        self.source
    }

    /// The display-rotation hint supplied at construction.
    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> GeometryPhase {
        if self.screen.is_known() && self.source.is_known() {
            GeometryPhase::Ready
        } else {
            GeometryPhase::AwaitingGeometry
        }
    }

    /// Current model-view-projection, recomputing it if a size changed since
    /// the last read. `None` until both extents are known.
    pub fn mvp(&mut self) -> Option<Mat4> {
        if self.stale {
            self.mvp = projection::model_view_projection(self.screen, self.source, self.rotation);
            self.stale = false;
            if self.mvp.is_some() {
                log::debug!(
                    "projection recomputed: screen {} source {}",
                    self.screen,
                    self.source
                );
            }
        }
        self.mvp
    }
}
