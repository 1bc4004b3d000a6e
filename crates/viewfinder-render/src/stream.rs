//! The frame streaming surface.
//!
//! Producer threads hand RGBA frames to a single-slot, latest-wins mailbox;
//! the render thread latches the newest one into the stream texture on each
//! draw. Older undelivered frames are replaced silently — no queue, no
//! backpressure. The stream texture is sampled-only from the shader's point
//! of view and written solely by latched frames, the crate-local analog of
//! an external/opaque texture.

use std::sync::{Arc, Mutex};

use glam::Mat4;

use viewfinder_core::Extent;

/// Texture transform that flips the V axis, the usual orientation fix for
/// buffers whose origin is the top-left corner.
pub const Y_FLIP_TRANSFORM: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, //
    0.0, -1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 1.0, 0.0, 1.0,
]);

/// One streamed frame: tightly packed RGBA8 pixels plus the transform
/// describing how its data maps onto unit texture coordinates.
#[derive(Debug, Clone)]
pub struct StreamFrame {
    /// Frame size in pixels.
    pub extent: Extent,
    /// RGBA8 payload, `width * height * 4` bytes.
    pub data: Vec<u8>,
    /// Texture-coordinate transform for this frame.
    pub transform: Mat4,
}

impl StreamFrame {
    /// Frame with the standard top-left-origin flip transform.
    #[must_use]
    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            extent: Extent::new(width, height),
            data,
            transform: Y_FLIP_TRANSFORM,
        }
    }

    /// Same frame with an explicit texture transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Whether the payload length matches `width * height * 4`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.data.len() as u64
            == u64::from(self.extent.width) * u64::from(self.extent.height) * 4
    }
}

type Slot = Mutex<Option<StreamFrame>>;

/// Producer-side handle: submits frames into the mailbox from any thread.
#[derive(Clone)]
pub struct FrameSender {
    slot: Arc<Slot>,
}

impl FrameSender {
    /// Replaces whatever frame is pending. Never blocks beyond the slot
    /// swap.
    pub fn submit(&self, frame: StreamFrame) {
        *self.slot.lock().expect("frame slot poisoned") = Some(frame);
    }
}

/// Render-thread side of the stream: owns the stream texture and the
/// transform of the most recently latched frame.
pub struct StreamSurface {
    slot: Arc<Slot>,
    texture: Option<wgpu::Texture>,
    view: Option<wgpu::TextureView>,
    texture_extent: Extent,
    transform: Mat4,
    latched: bool,
}

impl StreamSurface {
    /// Creates the surface and its producer handle.
    #[must_use]
    pub fn new() -> (Self, FrameSender) {
        let slot: Arc<Slot> = Arc::default();
        let sender = FrameSender {
            slot: Arc::clone(&slot),
        };
        (
            Self {
                slot,
                texture: None,
                view: None,
                texture_extent: Extent::UNKNOWN,
                transform: Mat4::IDENTITY,
                latched: false,
            },
            sender,
        )
    }

    fn take_pending(&self) -> Option<StreamFrame> {
        self.slot.lock().expect("frame slot poisoned").take()
    }

    /// Latches the most recently submitted frame into the stream texture.
    ///
    /// Non-blocking: with nothing pending, the previously latched image and
    /// transform stay current — the expected steady state whenever the
    /// display refreshes faster than the producer. Malformed payloads are
    /// dropped without disturbing the latched state. Returns `true` when the
    /// stream texture was (re)allocated, so callers can rebind it.
    pub fn latch_latest(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let Some(frame) = self.take_pending() else {
            return false;
        };
        if !frame.is_well_formed() {
            log::warn!(
                "dropping malformed stream frame: {} bytes for {}",
                frame.data.len(),
                frame.extent
            );
            return false;
        }

        let reallocated = self.texture.is_none() || self.texture_extent != frame.extent;
        if reallocated {
            self.allocate(device, frame.extent);
        }

        if let Some(texture) = &self.texture {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &frame.data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * frame.extent.width),
                    rows_per_image: Some(frame.extent.height),
                },
                wgpu::Extent3d {
                    width: frame.extent.width,
                    height: frame.extent.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        self.transform = frame.transform;
        self.latched = true;
        reallocated
    }

    fn allocate(&mut self, device: &wgpu::Device, extent: Extent) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("stream texture"),
            size: wgpu::Extent3d {
                width: extent.width,
                height: extent.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::info!("stream texture allocated at {extent}");
        self.texture = Some(texture);
        self.view = Some(view);
        self.texture_extent = extent;
    }

    /// Transform matching the most recently latched frame (identity before
    /// the first latch).
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Whether any frame has ever been latched.
    #[must_use]
    pub fn has_frame(&self) -> bool {
        self.latched
    }

    /// View of the stream texture, once allocated.
    #[must_use]
    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.view.as_ref()
    }
}
