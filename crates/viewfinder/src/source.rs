//! Synthetic frame source.
//!
//! Stands in for a platform capture stack: announces a negotiated
//! sensor-native resolution once, then streams a moving RGBA test pattern
//! through the [`FrameSender`] at a steady rate. Frames carry the Y-flip
//! texture transform typical of top-left-origin capture buffers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use viewfinder_render::{FrameSender, StreamFrame};

/// Sensor-native (landscape) resolution of the synthetic stream.
pub const SOURCE_WIDTH: u32 = 1280;
/// Sensor-native height of the synthetic stream.
pub const SOURCE_HEIGHT: u32 = 720;

/// Nominal inter-frame delay, roughly 30 frames per second.
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Handle to the producer thread.
pub struct FrameSource {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FrameSource {
    /// Spawns the producer thread.
    ///
    /// `on_resolution` is invoked once, from the producer thread, with the
    /// negotiated sensor-native resolution before the first frame is sent —
    /// the host marshals it back onto the render thread.
    pub fn spawn(
        sender: FrameSender,
        on_resolution: impl FnOnce(u32, u32) + Send + 'static,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            on_resolution(SOURCE_WIDTH, SOURCE_HEIGHT);
            log::info!("frame source started at {SOURCE_WIDTH}x{SOURCE_HEIGHT}");

            let mut tick: u32 = 0;
            while !stop_flag.load(Ordering::Relaxed) {
                let data = test_pattern(SOURCE_WIDTH, SOURCE_HEIGHT, tick);
                sender.submit(StreamFrame::rgba(SOURCE_WIDTH, SOURCE_HEIGHT, data));
                tick = tick.wrapping_add(1);
                thread::sleep(FRAME_INTERVAL);
            }
            log::info!("frame source stopped");
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signals the producer thread to stop and waits for it to finish.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Horizontally drifting color gradient, tightly packed RGBA8.
fn test_pattern(width: u32, height: u32, tick: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    let shift = (tick * 4) % width;
    for y in 0..height {
        for x in 0..width {
            let px = (x + shift) % width;
            data.push((px * 255 / width) as u8);
            data.push((y * 255 / height) as u8);
            data.push(((px + y) * 255 / (width + height)) as u8);
            data.push(255);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use viewfinder_render::StreamSurface;

    #[test]
    fn test_pattern_is_well_formed() {
        let data = test_pattern(32, 16, 0);
        assert!(StreamFrame::rgba(32, 16, data).is_well_formed());
    }

    #[test]
    fn test_pattern_drifts_over_time() {
        assert_ne!(test_pattern(32, 16, 0), test_pattern(32, 16, 3));
    }

    #[test]
    fn test_source_announces_resolution_then_streams() {
        let (_surface, sender) = StreamSurface::new();
        let (tx, rx) = mpsc::channel();
        let mut source = FrameSource::spawn(sender, move |width, height| {
            tx.send((width, height)).unwrap();
        });

        let (width, height) = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("resolution announced before first frame");
        assert_eq!((width, height), (SOURCE_WIDTH, SOURCE_HEIGHT));

        source.stop();
    }

    #[test]
    fn test_stop_joins_producer() {
        let (_surface, sender) = StreamSurface::new();
        let mut source = FrameSource::spawn(sender, |_, _| {});
        // Give the producer a moment to push at least one frame.
        thread::sleep(Duration::from_millis(100));
        source.stop();
    }
}
