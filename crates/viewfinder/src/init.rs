//! Entry points for the viewfinder application.

use viewfinder_core::Rotation;

use crate::error::Result;

/// Opens the viewfinder window with no display-rotation compensation.
///
/// Blocks until the window is closed.
pub fn show() -> Result<()> {
    show_with_rotation(Rotation::Deg0)
}

/// Opens the viewfinder window, compensating for the given display rotation.
///
/// The hint is fixed for the lifetime of the window; hosts that track live
/// device rotation reopen the viewfinder with the new hint.
pub fn show_with_rotation(rotation: Rotation) -> Result<()> {
    let _ = env_logger::try_init();
    log::info!("viewfinder starting (rotation {}°)", rotation.degrees());
    crate::app::run_app(rotation)
}
