//! Textured sprite pipeline implementing `SceneGraph`
//!
//! Every frame rebuilds one vertex buffer from the visible meshes, sorted
//! back to front by Z, and draws consecutive meshes that share a texture in
//! a single call. Untextured meshes sample a 1x1 white texture.

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use wgpu::util::DeviceExt;

use super::shapes::{LocalVertex, local_geometry, mesh_vertices};
use super::vertex::{CameraUniform, Vertex, colors};
use crate::scene::{MeshDesc, MeshId, OrthoCamera, SceneGraph, TextureId, Transform};
use crate::texture::Raster;

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

struct MeshEntry {
    desc: MeshDesc,
    local: Vec<LocalVertex>,
    points: Vec<Vec3>,
}

/// Run of vertices drawn with one texture
struct Batch {
    texture: Option<TextureId>,
    start: u32,
    end: u32,
}

pub struct WgpuScene {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,

    textures: HashMap<TextureId, GpuTexture>,
    meshes: BTreeMap<MeshId, MeshEntry>,
    next_id: u32,

    pub size: (u32, u32),
}

impl WgpuScene {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("carnival-darts-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera"),
            contents: bytemuck::bytes_of(&CameraUniform {
                view_proj: OrthoCamera::for_viewport(width, height)
                    .view_proj()
                    .to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
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
            label: Some("sprite_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&camera_layout, &texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let mut white_raster = Raster::new(1, 1);
        white_raster.clear([255, 255, 255, 255]);
        let white = upload(&device, &queue, &texture_layout, &sampler, &white_raster);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            camera_buffer,
            camera_bind_group,
            texture_layout,
            sampler,
            white,
            textures: HashMap::new(),
            meshes: BTreeMap::new(),
            next_id: 0,
            size: (width, height),
        })
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Visible meshes back to front, flattened into batches
    fn build_vertices(&self) -> (Vec<Vertex>, Vec<Batch>) {
        let mut order: Vec<&MeshEntry> = self.meshes.values().filter(|m| m.desc.visible).collect();
        // Stable sort keeps creation order for equal depths
        order.sort_by(|a, b| {
            a.desc
                .transform
                .position
                .z
                .total_cmp(&b.desc.transform.position.z)
        });

        let mut vertices = Vec::new();
        let mut batches: Vec<Batch> = Vec::new();
        for entry in order {
            let start = vertices.len() as u32;
            vertices.extend(mesh_vertices(&entry.desc, &entry.local, &entry.points));
            let end = vertices.len() as u32;
            if start == end {
                continue;
            }
            match batches.last_mut() {
                Some(last) if last.texture == entry.desc.texture && last.end == start => {
                    last.end = end;
                }
                _ => batches.push(Batch {
                    texture: entry.desc.texture,
                    start,
                    end,
                }),
            }
        }
        (vertices, batches)
    }

    fn draw(&mut self, camera: &OrthoCamera) -> Result<(), wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform {
                view_proj: camera.view_proj().to_cols_array_2d(),
            }),
        );

        let (vertices, batches) = self.build_vertices();
        let vertex_buffer = (!vertices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("vertex_buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let [r, g, b, a] = colors::BACKGROUND.map(f64::from);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(buffer) = vertex_buffer.as_ref() {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                for batch in &batches {
                    let texture = batch
                        .texture
                        .and_then(|id| self.textures.get(&id))
                        .unwrap_or(&self.white);
                    render_pass.set_bind_group(1, &texture.bind_group, &[]);
                    render_pass.draw(batch.start..batch.end, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn texture_size(raster: &Raster) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: raster.width(),
        height: raster.height(),
        depth_or_array_layers: 1,
    }
}

fn write_pixels(queue: &wgpu::Queue, texture: &wgpu::Texture, raster: &Raster) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        raster.as_bytes(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * raster.width()),
            rows_per_image: Some(raster.height()),
        },
        texture_size(raster),
    );
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    raster: &Raster,
) -> GpuTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("sprite_texture"),
        size: texture_size(raster),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    write_pixels(queue, &texture, raster);

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("texture_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuTexture {
        texture,
        bind_group,
        width: raster.width(),
        height: raster.height(),
    }
}

impl SceneGraph for WgpuScene {
    fn create_texture(&mut self, raster: &Raster) -> TextureId {
        let id = TextureId(self.next());
        let gpu = upload(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            raster,
        );
        self.textures.insert(id, gpu);
        id
    }

    fn update_texture(&mut self, id: TextureId, raster: &Raster) {
        let Some(existing) = self.textures.get(&id) else {
            log::warn!("update_texture: unknown texture {id:?}");
            return;
        };
        if existing.width == raster.width() && existing.height == raster.height() {
            write_pixels(&self.queue, &existing.texture, raster);
            return;
        }
        // Size changed: reallocate under the same id
        let gpu = upload(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            raster,
        );
        self.textures.insert(id, gpu);
    }

    fn create_mesh(&mut self, desc: MeshDesc) -> MeshId {
        let id = MeshId(self.next());
        self.meshes.insert(
            id,
            MeshEntry {
                local: local_geometry(desc.kind),
                desc,
                points: Vec::new(),
            },
        );
        id
    }

    fn set_transform(&mut self, id: MeshId, transform: Transform) {
        if let Some(mesh) = self.meshes.get_mut(&id) {
            mesh.desc.transform = transform;
        }
    }

    fn set_color(&mut self, id: MeshId, color: [f32; 4]) {
        if let Some(mesh) = self.meshes.get_mut(&id) {
            mesh.desc.color = color;
        }
    }

    fn set_points(&mut self, id: MeshId, points: &[Vec3]) {
        if let Some(mesh) = self.meshes.get_mut(&id) {
            mesh.points.clear();
            mesh.points.extend_from_slice(points);
        }
    }

    fn set_visible(&mut self, id: MeshId, visible: bool) {
        if let Some(mesh) = self.meshes.get_mut(&id) {
            mesh.desc.visible = visible;
        }
    }

    fn remove_mesh(&mut self, id: MeshId) {
        self.meshes.remove(&id);
    }

    fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn render(&mut self, camera: &OrthoCamera) {
        match self.draw(camera) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let (w, h) = self.size;
                self.resize(w, h);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}
