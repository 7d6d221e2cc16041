use anyhow::{bail, ensure, Context, Result};
use log::warn;
use wgpu::util::DeviceExt;

use super::accumulation::{DispatchGrid, Extent, HostImage};
use super::backend::FrameBackend;
use super::gpu_context::{GpuContext, WindowSurface};
use crate::loaders::skybox::Skybox;
use crate::scene::SceneBuffers;
use crate::types::{AccumulateUniforms, FrameUniforms};

const IMAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
const BYTES_PER_PIXEL: u32 = 16;

/// An Rgba32Float texture usable as working, history or display image
pub struct GpuImage {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    extent: Extent,
}

impl GpuImage {
    fn new(device: &wgpu::Device, extent: Extent, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent3d(extent),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: IMAGE_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            extent,
        }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }
}

struct SceneBinding {
    spheres: wgpu::Buffer,
    triangles: wgpu::Buffer,
}

struct SurfacePresenter {
    window: WindowSurface,
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
}

enum DisplayTarget {
    Surface(SurfacePresenter),
    Offscreen(Option<GpuImage>),
}

/// wgpu implementation of [`FrameBackend`]
///
/// Runs the path tracing and accumulation compute passes and presents
/// history either to a window surface or to an offscreen display texture
/// that can be read back.
pub struct GpuBackend {
    gpu: GpuContext,
    trace_pipeline: wgpu::ComputePipeline,
    trace_layout: wgpu::BindGroupLayout,
    accumulate_pipeline: wgpu::ComputePipeline,
    accumulate_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    accumulate_buffer: wgpu::Buffer,
    skybox: GpuImage,
    scene: Option<SceneBinding>,
    scratch: Option<GpuImage>,
    target: DisplayTarget,
}

impl GpuBackend {
    /// Backend presenting to a window surface
    pub fn with_surface(gpu: GpuContext, window: WindowSurface, skybox: &Skybox) -> Self {
        let presenter = SurfacePresenter::new(gpu.device(), window);
        Self::build(gpu, skybox, DisplayTarget::Surface(presenter))
    }

    /// Backend presenting to an offscreen texture; see [`GpuBackend::read_display`]
    pub fn offscreen(gpu: GpuContext, skybox: &Skybox) -> Self {
        Self::build(gpu, skybox, DisplayTarget::Offscreen(None))
    }

    fn build(gpu: GpuContext, skybox: &Skybox, target: DisplayTarget) -> Self {
        let device = gpu.device();

        let trace_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Path Tracing Bind Group Layout"),
            entries: &[
                uniform_entry(0),
                storage_buffer_entry(1),
                storage_buffer_entry(2),
                texture_entry(3, wgpu::ShaderStages::COMPUTE),
                storage_texture_entry(4),
            ],
        });
        let trace_pipeline = compute_pipeline(
            device,
            "Path Tracing",
            include_str!("../shaders/path_tracer.wgsl"),
            &trace_layout,
        );

        let accumulate_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Accumulate Bind Group Layout"),
            entries: &[
                uniform_entry(0),
                texture_entry(1, wgpu::ShaderStages::COMPUTE),
                texture_entry(2, wgpu::ShaderStages::COMPUTE),
                storage_texture_entry(3),
            ],
        });
        let accumulate_pipeline = compute_pipeline(
            device,
            "Accumulate",
            include_str!("../shaders/accumulate.wgsl"),
            &accumulate_layout,
        );

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let accumulate_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Accumulate Uniform Buffer"),
            size: std::mem::size_of::<AccumulateUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let skybox = upload_skybox(&gpu, skybox);

        Self {
            gpu,
            trace_pipeline,
            trace_layout,
            accumulate_pipeline,
            accumulate_layout,
            frame_buffer,
            accumulate_buffer,
            skybox,
            scene: None,
            scratch: None,
            target,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// Current surface size, if presenting to a window
    pub fn surface_extent(&self) -> Option<Extent> {
        match &self.target {
            DisplayTarget::Surface(p) => Some(Extent::new(p.window.config.width, p.window.config.height)),
            DisplayTarget::Offscreen(_) => None,
        }
    }

    /// Reconfigure the window surface; offscreen targets ignore this
    pub fn resize(&mut self, extent: Extent) {
        if let DisplayTarget::Surface(presenter) = &mut self.target {
            presenter.window.resize(self.gpu.device(), extent.width, extent.height);
        }
    }

    /// Copy the offscreen display texture back to host memory
    pub fn read_display(&self) -> Result<HostImage> {
        let display = match &self.target {
            DisplayTarget::Offscreen(Some(display)) => display,
            DisplayTarget::Offscreen(None) => bail!("Nothing has been presented yet"),
            DisplayTarget::Surface(_) => bail!("Surface targets cannot be read back"),
        };

        let extent = display.extent;
        let unpadded = extent.width * BYTES_PER_PIXEL;
        let padded = padded_bytes_per_row(extent.width);

        let staging = self.gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("Display Readback Buffer"),
            size: padded as u64 * extent.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.encoder("Display Readback Encoder");
        encoder.copy_texture_to_buffer(
            display.texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(extent.height),
                },
            },
            extent3d(extent),
        );
        self.gpu.submit_and_wait(encoder.finish())?;

        let bytes = self.gpu.read_buffer_sync(&staging)?;
        let mut image = HostImage::new(extent);
        for (row, chunk) in image
            .pixels_mut()
            .chunks_exact_mut(extent.width as usize)
            .enumerate()
        {
            let start = row * padded as usize;
            let texels = &bytes[start..start + unpadded as usize];
            for (dst, texel) in chunk.iter_mut().zip(texels.chunks_exact(BYTES_PER_PIXEL as usize)) {
                *dst = bytemuck::pod_read_unaligned(texel);
            }
        }
        Ok(image)
    }

    fn encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    fn ensure_scratch(&mut self, extent: Extent) {
        if self.scratch.as_ref().map_or(true, |s| s.extent != extent) {
            self.scratch = Some(GpuImage::new(self.gpu.device(), extent, "Accumulate Scratch"));
        }
    }
}

impl FrameBackend for GpuBackend {
    type Image = GpuImage;

    fn allocate_image(&mut self, extent: Extent, label: &str) -> Result<GpuImage> {
        ensure!(!extent.is_empty(), "Cannot allocate a zero-area image");
        Ok(GpuImage::new(self.gpu.device(), extent, label))
    }

    fn bind_scene(&mut self, scene: &SceneBuffers) -> Result<()> {
        let device = self.gpu.device();
        let spheres = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Buffer"),
            contents: &scene.sphere_upload_bytes(),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let triangles = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Triangle Buffer"),
            contents: &scene.triangle_upload_bytes(),
            usage: wgpu::BufferUsages::STORAGE,
        });
        self.scene = Some(SceneBinding { spheres, triangles });
        Ok(())
    }

    fn release_scene(&mut self) {
        if let Some(binding) = self.scene.take() {
            binding.spheres.destroy();
            binding.triangles.destroy();
        }
    }

    fn trace(
        &mut self,
        uniforms: &FrameUniforms,
        grid: DispatchGrid,
        working: &mut GpuImage,
    ) -> Result<()> {
        let scene = self
            .scene
            .as_ref()
            .context("No scene bound before dispatch")?;

        self.gpu
            .queue()
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(uniforms));

        let bind_group = self.gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Path Tracing Bind Group"),
            layout: &self.trace_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: scene.spheres.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: scene.triangles.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&self.skybox.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&working.view),
                },
            ],
        });

        let mut encoder = self.encoder("Path Tracing Encoder");
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Path Tracing Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.trace_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(grid.x, grid.y, 1);
        }
        self.gpu.submit_and_wait(encoder.finish())
    }

    fn accumulate(
        &mut self,
        working: &GpuImage,
        history: &mut GpuImage,
        sample_count: u32,
    ) -> Result<()> {
        ensure!(
            working.extent == history.extent,
            "working {:?} and history {:?} extents differ",
            working.extent,
            history.extent
        );
        let extent = history.extent;

        self.gpu.queue().write_buffer(
            &self.accumulate_buffer,
            0,
            bytemuck::bytes_of(&AccumulateUniforms::new(sample_count)),
        );

        self.ensure_scratch(extent);
        let scratch = self
            .scratch
            .as_ref()
            .context("Accumulate scratch image missing")?;

        let bind_group = self.gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Accumulate Bind Group"),
            layout: &self.accumulate_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.accumulate_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&working.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&history.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&scratch.view),
                },
            ],
        });

        let grid = DispatchGrid::covering(extent);
        let mut encoder = self.encoder("Accumulate Encoder");
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Accumulate Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.accumulate_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(grid.x, grid.y, 1);
        }
        encoder.copy_texture_to_texture(
            scratch.texture.as_image_copy(),
            history.texture.as_image_copy(),
            extent3d(extent),
        );
        self.gpu.submit_and_wait(encoder.finish())
    }

    fn present(&mut self, history: &GpuImage) -> Result<()> {
        match &mut self.target {
            DisplayTarget::Surface(presenter) => presenter.present(&self.gpu, history),
            DisplayTarget::Offscreen(display) => {
                let device = self.gpu.device();
                let display = match display.take() {
                    Some(d) if d.extent == history.extent => display.insert(d),
                    _ => display.insert(GpuImage::new(device, history.extent, "Display Texture")),
                };

                let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Display Copy Encoder"),
                });
                encoder.copy_texture_to_texture(
                    history.texture.as_image_copy(),
                    display.texture.as_image_copy(),
                    extent3d(history.extent),
                );
                self.gpu.submit_and_wait(encoder.finish())
            }
        }
    }
}

impl SurfacePresenter {
    fn new(device: &wgpu::Device, window: WindowSurface) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Display Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/display.wgsl").into()),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Display Bind Group Layout"),
            entries: &[texture_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Display Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Display Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: window.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
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

        Self {
            window,
            pipeline,
            layout,
        }
    }

    fn present(&mut self, gpu: &GpuContext, history: &GpuImage) -> Result<()> {
        let frame = match self.window.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.window.surface.configure(gpu.device(), &self.window.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface frame timed out, skipping present");
                return Ok(());
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to acquire surface frame")),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Display Bind Group"),
            layout: &self.layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&history.view),
            }],
        });

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Display Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Display Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1); // fullscreen triangle
        }

        gpu.queue().submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

// === Helpers ===

fn extent3d(extent: Extent) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: extent.width,
        height: extent.height,
        depth_or_array_layers: 1,
    }
}

/// Row pitch for texture-to-buffer copies
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

fn upload_skybox(gpu: &GpuContext, skybox: &Skybox) -> GpuImage {
    let skybox = skybox.within_limit(gpu.device().limits().max_texture_dimension_2d);
    let extent = Extent::new(skybox.width, skybox.height);
    let image = GpuImage::new(gpu.device(), extent, "Skybox Texture");
    gpu.queue().write_texture(
        image.texture.as_image_copy(),
        skybox.bytes(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(BYTES_PER_PIXEL * skybox.width),
            rows_per_image: Some(skybox.height),
        },
        extent3d(extent),
    );
    image
}

fn compute_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::ComputePipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        module: &shader,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    })
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_buffer_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn storage_texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::StorageTexture {
            access: wgpu::StorageTextureAccess::WriteOnly,
            format: IMAGE_FORMAT,
            view_dimension: wgpu::TextureViewDimension::D2,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_rows_are_aligned() {
        assert_eq!(padded_bytes_per_row(16), 256);
        assert_eq!(padded_bytes_per_row(17), 512);
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(640) % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);
    }
}
