//! The scene composition renderer: owns the wgpu surface and pipelines and
//! runs the per-frame protocol. Each frame clears, bails out early when
//! tracking is lost, draws world-space content (the image quad, then the
//! hotspot layer) under the pose-or-fallback transform, and finally draws
//! screen-locked overlay content under the fixed 2-D projection.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable, cast_slice};
use gallery_engine::hotspot::HotspotSprite;
use gallery_engine::pose::PoseFrame;
use gallery_engine::{GalleryConfig, HotspotId, ProjectorCalibration, UiLayer};
use glam::{Mat4, Vec3};
use log::{debug, info, warn};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::carousel::ImageCarousel;
use crate::primitive::{MeshData, Primitive};
use crate::scene::SceneState;
use crate::shaders::{FLAT_SHADER, TEXTURED_SHADER};

/// The hotspot layer never holds more than the four command spots.
const MAX_HOTSPOTS: usize = 4;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Globals {
    transform: [[f32; 4]; 4],
    tint: [f32; 4],
}

impl Globals {
    fn new(transform: Mat4, tint: [f32; 4]) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            tint,
        }
    }
}

struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl UniformSlot {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label}-uniform")),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-bind-group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    fn write(&self, queue: &wgpu::Queue, globals: Globals) {
        queue.write_buffer(&self.buffer, 0, cast_slice(&[globals]));
    }
}

pub struct GalleryRenderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,

    textured_pipeline: wgpu::RenderPipeline,
    flat_pipeline: wgpu::RenderPipeline,
    texture_bind_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    quad: Primitive,
    disc: Primitive,
    cursor: Primitive,
    quad_slot: UniformSlot,
    cursor_slot: UniformSlot,
    hotspot_slots: Vec<UniformSlot>,

    scene: SceneState,
    ui: UiLayer,
    carousel: ImageCarousel,
    selections: Receiver<HotspotId>,
    pose_tx: Sender<PoseFrame>,
    poses: Receiver<PoseFrame>,
    running: bool,
}

impl GalleryRenderer {
    pub async fn new(
        window: Arc<Window>,
        config: GalleryConfig,
        calibration: ProjectorCalibration,
        carousel: ImageCarousel,
    ) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("creating wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .context("requesting wgpu adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("gallery-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("requesting wgpu device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Opaque);

        let uniform_bind_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("globals-bind-group-layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let texture_bind_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("surface-image-bind-group-layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("surface-image-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let textured_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("textured-shader"),
            source: wgpu::ShaderSource::Wgsl(TEXTURED_SHADER.into()),
        });
        let flat_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("flat-shader"),
            source: wgpu::ShaderSource::Wgsl(FLAT_SHADER.into()),
        });

        let position_layout = wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 2) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x2],
        };
        let texcoord_layout = wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 2) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![1 => Float32x2],
        };

        let textured_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("textured-pipeline-layout"),
                bind_group_layouts: &[&uniform_bind_layout, &texture_bind_layout],
                push_constant_ranges: &[],
            });
        let textured_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("textured-pipeline"),
            layout: Some(&textured_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &textured_shader,
                entry_point: "vs_main",
                buffers: &[position_layout.clone(), texcoord_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &textured_shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let flat_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flat-pipeline-layout"),
            bind_group_layouts: &[&uniform_bind_layout],
            push_constant_ranges: &[],
        });
        let flat_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("flat-pipeline"),
            layout: Some(&flat_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &flat_shader,
                entry_point: "vs_main",
                buffers: &[position_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &flat_shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let quad_slot = UniformSlot::new(&device, &uniform_bind_layout, "image-quad");
        let cursor_slot = UniformSlot::new(&device, &uniform_bind_layout, "cursor");
        let hotspot_slots = (0..MAX_HOTSPOTS)
            .map(|idx| UniformSlot::new(&device, &uniform_bind_layout, &format!("hotspot-{idx}")))
            .collect();

        let (selection_tx, selections) = mpsc::channel();
        let (pose_tx, poses) = mpsc::channel();
        let mut ui = UiLayer::new();
        ui.set_listener(selection_tx);

        let cursor_mesh = MeshData::cross(config.marker_thickness / 100.0);
        let mut renderer = Self {
            window,
            surface,
            device,
            queue,
            surface_config: wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format: surface_format,
                width: size.width.max(1),
                height: size.height.max(1),
                present_mode: wgpu::PresentMode::Fifo,
                alpha_mode,
                view_formats: vec![],
                desired_maximum_frame_latency: 1,
            },
            size,
            textured_pipeline,
            flat_pipeline,
            texture_bind_layout,
            sampler,
            quad: Primitive::new(MeshData::quad()),
            disc: Primitive::new(MeshData::circle(360)),
            cursor: Primitive::new(cursor_mesh),
            quad_slot,
            cursor_slot,
            hotspot_slots,
            scene: SceneState::new(config, calibration),
            ui,
            carousel,
            selections,
            pose_tx,
            poses,
            running: false,
        };

        renderer.surface.configure(&renderer.device, &renderer.surface_config);
        renderer.apply_viewport(size);
        renderer.setup_gpu();
        Ok(renderer)
    }

    pub fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.scene.aspect_ratio()
    }

    /// Brings the pipeline up: all mutable state re-derived from the stored
    /// configuration. Idempotent with `stop`.
    pub fn start(&mut self) {
        self.scene.reset();
        self.running = true;
        info!("composition pipeline started");
    }

    /// Tears the pipeline state down without touching GPU resources.
    pub fn stop(&mut self) {
        self.running = false;
        self.scene.reset();
        info!("composition pipeline stopped");
    }

    /// The external tracker owns its own reset; this end only notes the
    /// request and drops the stale view matrix.
    pub fn tracker_reset(&mut self) {
        info!("tracker reset requested");
        self.scene.reset();
    }

    /// Viewport resize: reconfigure the surface, recompute aspect ratio and
    /// projection, rebuild the hotspot layout under the new aspect, and
    /// re-run GPU setup for every resource owner.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.apply_viewport(new_size);
        self.setup_gpu();
    }

    /// The sending half of the pose feed; an external tracker (or the mouse
    /// shim) pushes frames here and the render thread drains them.
    pub fn pose_sender(&self) -> Sender<PoseFrame> {
        self.pose_tx.clone()
    }

    /// One sample from the pose feed: gates the scene, forwards the pointer
    /// to every hotspot, then applies whatever selections fired.
    pub fn on_pose_frame(&mut self, frame: &PoseFrame) {
        if !self.running {
            return;
        }
        self.scene.apply_pose(frame);
        self.ui.on_pointer_event(frame.pointer[0], frame.pointer[1]);
        self.drain_selections();
    }

    fn drain_poses(&mut self) {
        while let Ok(frame) = self.poses.try_recv() {
            self.on_pose_frame(&frame);
        }
    }

    pub fn zoom_in(&mut self) {
        self.scene.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.scene.zoom_out();
    }

    /// Cursor change plus texture rebind; no GPU re-setup involved.
    pub fn next(&mut self) {
        let image = self.carousel.next();
        info!("showing {}", image.label());
    }

    pub fn prev(&mut self) {
        let image = self.carousel.prev();
        info!("showing {}", image.label());
    }

    pub fn render(&mut self) -> Result<(), SurfaceError> {
        self.drain_poses();
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gallery-encoder"),
            });

        let world = if self.running {
            self.scene.world_transform()
        } else {
            None
        };
        let sprites = self.ui.sprites();

        if let Some(world) = world {
            let image_aspect = self.carousel.current().aspect_ratio();
            self.quad_slot.write(
                &self.queue,
                Globals::new(
                    world * Mat4::from_scale(Vec3::new(1.0, 1.0 / image_aspect, 1.0)),
                    [1.0, 1.0, 1.0, 1.0],
                ),
            );
            for (slot, sprite) in self.hotspot_slots.iter().zip(sprites.iter()) {
                slot.write(&self.queue, Globals::new(hotspot_transform(world, sprite), sprite.tint));
            }
            self.cursor_slot.write(
                &self.queue,
                Globals::new(
                    self.scene.screen_transform()
                        * Mat4::from_scale(Vec3::splat(self.scene.config().marker_size)),
                    [1.0, 1.0, 1.0, 1.0],
                ),
            );
        }

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gallery-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // With tracking lost the frame stays clear-only; not even the
            // screen-space cursor is drawn.
            if world.is_some() {
                if let Some(image_bind) = self.carousel.current().bind_group() {
                    rpass.set_pipeline(&self.textured_pipeline);
                    rpass.set_bind_group(0, &self.quad_slot.bind_group, &[]);
                    rpass.set_bind_group(1, image_bind, &[]);
                    self.quad.draw(&mut rpass);
                }

                rpass.set_pipeline(&self.flat_pipeline);
                for (slot, _) in self.hotspot_slots.iter().zip(sprites.iter()) {
                    rpass.set_bind_group(0, &slot.bind_group, &[]);
                    self.disc.draw(&mut rpass);
                }

                // Overlay content stays screen-locked regardless of pose.
                rpass.set_bind_group(0, &self.cursor_slot.bind_group, &[]);
                self.cursor.draw(&mut rpass);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn apply_viewport(&mut self, size: PhysicalSize<u32>) {
        self.scene.set_viewport(size.width, size.height);
        self.ui.set_aspect_ratio(self.scene.aspect_ratio());
        let config = self.scene.config().clone();
        self.ui.configure(&config);
        if self.ui.spots().len() > self.hotspot_slots.len() {
            warn!(
                "{} hotspots configured but only {} draw slots",
                self.ui.spots().len(),
                self.hotspot_slots.len()
            );
        }
        debug!(
            "viewport {}x{} (aspect {:.3}), {} hotspots",
            size.width,
            size.height,
            self.scene.aspect_ratio(),
            self.ui.spots().len()
        );
    }

    /// One-time GPU setup for every resource owner; re-run on surface
    /// recreation.
    fn setup_gpu(&mut self) {
        let thickness = self.scene.config().marker_thickness / 100.0;
        self.cursor.set_mesh(MeshData::cross(thickness));
        self.quad.realize(&self.device, "image-quad");
        self.disc.realize(&self.device, "hotspot-disc");
        self.cursor.realize(&self.device, "cursor-cross");
        self.carousel
            .realize_all(&self.device, &self.queue, &self.texture_bind_layout, &self.sampler);
    }

    fn drain_selections(&mut self) {
        while let Ok(id) = self.selections.try_recv() {
            info!("hotspot selected: {}", id.label());
            match id {
                HotspotId::Prev => self.prev(),
                HotspotId::ZoomIn => self.zoom_in(),
                HotspotId::Next => self.next(),
                HotspotId::ZoomOut => self.zoom_out(),
            }
        }
    }
}

fn hotspot_transform(world: Mat4, sprite: &HotspotSprite) -> Mat4 {
    world
        * Mat4::from_translation(Vec3::new(sprite.center[0], sprite.center[1], 0.0))
        * Mat4::from_scale(Vec3::new(sprite.scale, sprite.scale, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotspot_transform_places_the_unit_disc() {
        let sprite = HotspotSprite {
            center: [0.5, -0.25],
            scale: 0.2,
            tint: [1.0, 1.0, 1.0, 1.0],
        };
        let m = hotspot_transform(Mat4::IDENTITY, &sprite);
        let center = m * glam::vec4(0.0, 0.0, 0.0, 1.0);
        assert!((center.x - 0.5).abs() < 1e-6);
        assert!((center.y + 0.25).abs() < 1e-6);
        let rim = m * glam::vec4(1.0, 0.0, 0.0, 1.0);
        assert!((rim.x - 0.7).abs() < 1e-6);
    }

    #[test]
    fn globals_block_matches_the_shader_layout() {
        assert_eq!(std::mem::size_of::<Globals>(), 80);
    }
}
