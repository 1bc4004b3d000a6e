//! Host-facing geometry contract tests.
//!
//! These exercise the crop-to-fill behavior through the public API, with no
//! GPU involved.

use viewfinder::{Extent, GeometryPhase, Rotation, ViewGeometry};
use viewfinder_core::{crop_scale, model_view_projection};

#[test]
fn portrait_phone_against_landscape_stream() {
    // 1080x2400 screen, 1920x1080 sensor-native stream: the horizontal axis
    // overflows by 25%, the vertical axis maps one-to-one.
    let scale = crop_scale(Extent::new(1080, 2400), Extent::new(1920, 1080)).unwrap();
    assert!((scale.x - 1.25).abs() < 1e-6);
    assert!((scale.y - 1.0).abs() < f32::EPSILON);
}

#[test]
fn matched_aspects_need_no_crop() {
    let scale = crop_scale(Extent::new(1000, 1000), Extent::new(1000, 1000)).unwrap();
    assert_eq!((scale.x, scale.y), (1.0, 1.0));
}

#[test]
fn projection_undefined_until_both_sizes_known() {
    let screen = Extent::new(1080, 2400);
    assert!(model_view_projection(screen, Extent::UNKNOWN, Rotation::Deg0).is_none());
    assert!(model_view_projection(Extent::UNKNOWN, screen, Rotation::Deg0).is_none());
}

#[test]
fn engine_geometry_walks_to_ready_and_stays() {
    let mut geometry = ViewGeometry::new(Rotation::Deg0);
    assert_eq!(geometry.phase(), GeometryPhase::AwaitingGeometry);

    // Resize first, as hosts typically report the surface before the
    // capture side has negotiated.
    geometry.set_screen(Extent::new(1080, 2400));
    assert_eq!(geometry.phase(), GeometryPhase::AwaitingGeometry);
    assert!(geometry.mvp().is_none());

    geometry.set_source(Extent::new(1920, 1080));
    assert_eq!(geometry.phase(), GeometryPhase::Ready);
    let ready = geometry.mvp().expect("projection valid once both known");
    assert!(ready.to_cols_array().iter().all(|v| v.is_finite()));

    // Identical resize: bit-identical projection.
    geometry.set_screen(Extent::new(1080, 2400));
    assert_eq!(
        geometry.mvp().unwrap().to_cols_array(),
        ready.to_cols_array()
    );

    // Zero-sided notification after readiness never reverts the phase.
    geometry.set_screen(Extent::UNKNOWN);
    assert_eq!(geometry.phase(), GeometryPhase::Ready);
}

#[test]
fn all_four_rotations_yield_finite_projections() {
    for rotation in [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ] {
        let mvp =
            model_view_projection(Extent::new(1080, 2400), Extent::new(1920, 1080), rotation)
                .unwrap();
        assert!(mvp.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
