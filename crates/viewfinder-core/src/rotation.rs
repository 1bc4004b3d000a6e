//! Display rotation hints.

use glam::{Mat4, Vec3};

/// Rotation of the display relative to the source's native orientation.
///
/// Supplied once at engine construction and immutable afterwards; hosts that
/// recreate the rendering context on device rotation construct a new engine
/// with the new hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    /// Display matches the native orientation.
    #[default]
    Deg0,
    /// Display is rotated a quarter turn.
    Deg90,
    /// Display is upside down.
    Deg180,
    /// Display is rotated three quarter turns.
    Deg270,
}

impl Rotation {
    /// Converts from whole degrees. Only the four quarter turns are valid.
    #[must_use]
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Returns the rotation in degrees.
    #[must_use]
    pub const fn degrees(self) -> f32 {
        match self {
            Rotation::Deg0 => 0.0,
            Rotation::Deg90 => 90.0,
            Rotation::Deg180 => 180.0,
            Rotation::Deg270 => 270.0,
        }
    }

    /// Compensation matrix: a turn about the viewing axis.
    ///
    /// The quad faces the viewer along +Z, so compensating a counter-
    /// clockwise display rotation means turning the image about -Z.
    #[must_use]
    pub fn matrix(self) -> Mat4 {
        Mat4::from_axis_angle(Vec3::NEG_Z, self.degrees().to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn assert_vec4_near(actual: Vec4, expected: Vec4) {
        assert!(
            (actual - expected).length() < 1e-6,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_from_degrees() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::Deg0));
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(180), Some(Rotation::Deg180));
        assert_eq!(Rotation::from_degrees(270), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(360), Some(Rotation::Deg0));
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let m = Rotation::Deg0.matrix();
        assert!((m - Mat4::IDENTITY).to_cols_array().iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_quarter_turn_maps_axes() {
        // About -Z, a quarter turn sends +X to -Y and +Y to +X.
        let m = Rotation::Deg90.matrix();
        assert_vec4_near(m * Vec4::X, Vec4::new(0.0, -1.0, 0.0, 0.0));
        assert_vec4_near(m * Vec4::Y, Vec4::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_half_turn_negates_plane() {
        let m = Rotation::Deg180.matrix();
        assert_vec4_near(m * Vec4::X, Vec4::new(-1.0, 0.0, 0.0, 0.0));
        assert_vec4_near(m * Vec4::Y, Vec4::new(0.0, -1.0, 0.0, 0.0));
    }

    #[test]
    fn test_opposite_quarter_turns_cancel() {
        let m = Rotation::Deg90.matrix() * Rotation::Deg270.matrix();
        assert!((m - Mat4::IDENTITY).to_cols_array().iter().all(|v| v.abs() < 1e-5));
    }
}
