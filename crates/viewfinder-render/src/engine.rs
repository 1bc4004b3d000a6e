//! The frame presentation engine.
//!
//! Owns the GPU program, the screen-filling quad, and the per-refresh draw
//! step that latches the newest streamed frame and presents it with the
//! crop-to-fill projection. All state in here is render-thread-exclusive;
//! size notifications must be marshaled onto that thread before calling in.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use viewfinder_core::{Extent, GeometryPhase, Rotation, ViewGeometry};

use crate::error::{RenderError, RenderResult};
use crate::quad::QuadBuffers;
use crate::shader::{ShaderBuilder, STREAM_QUAD_SHADER};
use crate::stream::{FrameSender, StreamSurface};

/// Quad uniforms for the GPU: the crop-to-fill MVP and the latched frame's
/// texture transform.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadUniforms {
    /// Model-view-projection matrix, column major.
    pub mvp: [[f32; 4]; 4],
    /// Texture-coordinate transform, column major.
    pub tex_transform: [[f32; 4]; 4],
}

impl Default for QuadUniforms {
    fn default() -> Self {
        Self {
            mvp: glam::Mat4::IDENTITY.to_cols_array_2d(),
            tex_transform: glam::Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

/// Offscreen color target used when the engine runs without a window.
struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl OffscreenTarget {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// The frame presentation engine backed by wgpu.
///
/// Setup compiles the shader pipeline, uploads the quad geometry, creates
/// the stream texture surface, and hands the producer-side [`FrameSender`]
/// to the one-shot `on_stream` handler. After that the host drives it with
/// [`resize`](Self::resize), [`set_source_extent`](Self::set_source_extent),
/// and one [`draw`](Self::draw) per display refresh.
pub struct PresentEngine {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: wgpu::SurfaceConfiguration,
    offscreen: Option<OffscreenTarget>,
    /// `None` when the shader build was rejected; draws short-circuit.
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    quad: QuadBuffers,
    stream: StreamSurface,
    geometry: ViewGeometry,
}

impl PresentEngine {
    /// Creates an engine presenting to a window surface.
    ///
    /// `on_stream` is invoked exactly once, with the producer handle the
    /// host binds as the frame destination.
    pub async fn new_windowed(
        window: Arc<winit::window::Window>,
        rotation: Rotation,
        on_stream: impl FnOnce(FrameSender),
    ) -> RenderResult<Self> {
        let size = window.inner_size();
        Self::new_internal(Some(window), size.width, size.height, rotation, on_stream).await
    }

    /// Creates an engine presenting to an offscreen target, for tests and
    /// environments without a window. Pixels are read back with
    /// [`render_to_image`](Self::render_to_image).
    pub async fn new_headless(
        width: u32,
        height: u32,
        rotation: Rotation,
        on_stream: impl FnOnce(FrameSender),
    ) -> RenderResult<Self> {
        Self::new_internal(None, width, height, rotation, on_stream).await
    }

    async fn new_internal(
        window: Option<Arc<winit::window::Window>>,
        width: u32,
        height: u32,
        rotation: Rotation,
        on_stream: impl FnOnce(FrameSender),
    ) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = match &window {
            Some(window) => Some(instance.create_surface(window.clone())?),
            None => None,
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface.as_ref(),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        log::info!("using graphics adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await?;

        let width = width.max(1);
        let height = height.max(1);

        let format = match &surface {
            Some(surface) => {
                let caps = surface.get_capabilities(&adapter);
                caps.formats
                    .iter()
                    .find(|f| f.is_srgb())
                    .copied()
                    .unwrap_or(caps.formats[0])
            }
            None => wgpu::TextureFormat::Rgba8UnormSrgb,
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let offscreen = match &surface {
            Some(surface) => {
                surface.configure(&device, &surface_config);
                None
            }
            None => Some(OffscreenTarget::new(&device, format, width, height)),
        };

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("stream sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("stream quad bind group layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad uniforms"),
            contents: bytemuck::bytes_of(&QuadUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let quad = QuadBuffers::new(&device);

        let pipeline =
            Self::build_pipeline(&device, &bind_group_layout, format).await;

        let (stream, sender) = StreamSurface::new();
        on_stream(sender);

        let mut geometry = ViewGeometry::new(rotation);
        geometry.set_screen(Extent::new(width, height));

        log::info!("presentation engine ready at {width}x{height}");

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            offscreen,
            pipeline,
            bind_group_layout,
            bind_group: None,
            sampler,
            uniform_buffer,
            quad,
            stream,
            geometry,
        })
    }

    /// Builds the quad pipeline inside a validation error scope.
    ///
    /// A rejected shader or pipeline leaves the program handle `None` —
    /// the GL status-flag model: log the diagnostic, keep running, draw
    /// nothing.
    async fn build_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> Option<wgpu::RenderPipeline> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = match ShaderBuilder::new()
            .with_source(STREAM_QUAD_SHADER)
            .with_label("stream quad shader")
            .build_module(device)
        {
            Ok(module) => module,
            Err(error) => {
                log::error!("stream quad shader build rejected: {error}");
                let _ = device.pop_error_scope().await;
                return None;
            }
        };

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("stream quad pipeline layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_layouts = QuadBuffers::layouts();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("stream quad pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &vertex_layouts,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        match device.pop_error_scope().await {
            None => Some(pipeline),
            Some(error) => {
                log::error!("stream quad shader build rejected: {error}");
                None
            }
        }
    }

    /// Notifies the engine of a new output surface size.
    ///
    /// Reconfigures the presentation surface and marks the projection stale.
    /// A zero-sided size is the "unknown" sentinel: the surface keeps its
    /// old configuration and the last known geometry stays in effect.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.geometry.set_screen(Extent::new(width, height));
        if width == 0 || height == 0 {
            return;
        }

        self.surface_config.width = width;
        self.surface_config.height = height;
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.surface_config);
        }
        if self.offscreen.is_some() {
            self.offscreen = Some(OffscreenTarget::new(
                &self.device,
                self.surface_config.format,
                width,
                height,
            ));
        }
        log::debug!("output surface resized to {width}x{height}");
    }

    /// Notifies the engine of the source stream's sensor-native size.
    pub fn set_source_extent(&mut self, width: u32, height: u32) {
        self.geometry.set_source(Extent::new(width, height));
    }

    /// Current geometry lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> GeometryPhase {
        self.geometry.phase()
    }

    /// Whether the shader pipeline built successfully.
    #[must_use]
    pub fn is_program_valid(&self) -> bool {
        self.pipeline.is_some()
    }

    /// The geometry state owned by this engine.
    #[must_use]
    pub fn geometry(&self) -> &ViewGeometry {
        &self.geometry
    }

    /// Draws one frame. Invoked once per display refresh.
    ///
    /// Latches the newest streamed frame (non-blocking; redraws the previous
    /// image when nothing new arrived), refreshes the projection if a size
    /// changed, and issues the quad draw. With an invalid program or before
    /// the first latched frame the output is cleared and nothing else is
    /// drawn.
    pub fn draw(&mut self) -> RenderResult<()> {
        if self.stream.latch_latest(&self.device, &self.queue) {
            self.rebind_stream_texture();
        }

        let tex_transform = self.stream.transform();
        let mvp = self.geometry.mvp().unwrap_or(glam::Mat4::IDENTITY);
        let uniforms = QuadUniforms {
            mvp: mvp.to_cols_array_2d(),
            tex_transform: tex_transform.to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let frame = match &self.surface {
            Some(surface) => match surface.get_current_texture() {
                Ok(frame) => Some(frame),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    surface.configure(&self.device, &self.surface_config);
                    return Ok(());
                }
                Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
                Err(error) => {
                    log::warn!("skipping refresh: {error}");
                    return Ok(());
                }
            },
            None => None,
        };

        let frame_view = frame
            .as_ref()
            .map(|f| f.texture.create_view(&wgpu::TextureViewDescriptor::default()));
        let target_view = match (&frame_view, &self.offscreen) {
            (Some(view), _) => view,
            (None, Some(offscreen)) => &offscreen.view,
            (None, None) => return Ok(()),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("stream quad encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("stream quad pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let (Some(pipeline), Some(bind_group)) = (&self.pipeline, &self.bind_group) {
                if self.stream.has_frame() {
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(0, bind_group, &[]);
                    pass.set_vertex_buffer(0, self.quad.positions.slice(..));
                    pass.set_vertex_buffer(1, self.quad.tex_coords.slice(..));
                    pass.set_index_buffer(self.quad.indices.slice(..), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..QuadBuffers::INDEX_COUNT, 0, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        if let Some(frame) = frame {
            frame.present();
        }
        Ok(())
    }

    /// Draws a frame into the offscreen target and reads it back as tightly
    /// packed RGBA8 rows.
    pub fn render_to_image(&mut self) -> RenderResult<Vec<u8>> {
        self.draw()?;

        let Some(offscreen) = &self.offscreen else {
            return Err(RenderError::NoReadbackTarget);
        };
        let width = self.surface_config.width;
        let height = self.surface_config.height;
        let unpadded = 4 * width;
        let padded = unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback buffer"),
            size: u64::from(padded) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &offscreen.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity(unpadded as usize * height as usize);
        for row in 0..height {
            let start = row as usize * padded as usize;
            pixels.extend_from_slice(&data[start..start + unpadded as usize]);
        }
        drop(data);
        buffer.unmap();

        Ok(pixels)
    }

    /// Rebinds the stream texture after it was (re)allocated.
    fn rebind_stream_texture(&mut self) {
        let bind_group = match self.stream.view() {
            Some(view) => Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("stream quad bind group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            })),
            None => None,
        };
        if bind_group.is_some() {
            self.bind_group = bind_group;
        }
    }
}
