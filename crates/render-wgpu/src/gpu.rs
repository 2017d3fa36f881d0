use crate::mesh::{self, Vertex};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use showcase_materials::{Material, MaterialKind, Side};
use showcase_render::{Camera, Renderer};
use showcase_scene::{Primitive, Scene, SceneObject};
use wgpu::util::DeviceExt;

const AMBIENT: f32 = 0.15;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    light_pos: [f32; 4],
    light_color: [f32; 4],
    clip: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    params: [f32; 4],
    specular: [f32; 4],
    flags: [f32; 4],
}

/// Shader mode for a preset.
fn preset_mode(kind: &MaterialKind) -> f32 {
    match kind {
        MaterialKind::Basic => 0.0,
        MaterialKind::Normal => 1.0,
        MaterialKind::Matcap => 2.0,
        MaterialKind::Depth => 3.0,
        MaterialKind::Lambert => 4.0,
        MaterialKind::Phong { .. } => 5.0,
        MaterialKind::Toon => 6.0,
        MaterialKind::Standard { .. } => 7.0,
        MaterialKind::Physical { .. } => 8.0,
    }
}

fn instance_data(object: &SceneObject, material: &Material) -> InstanceData {
    let t = &object.transform;
    let cols = Mat4::from_scale_rotation_translation(t.scale, t.rotation, t.position).to_cols_array_2d();
    let c = material.color;

    let (params, specular) = match material.kind {
        MaterialKind::Phong {
            shininess,
            specular,
        } => (
            [0.0, 1.0, shininess, 0.0],
            [specular.r, specular.g, specular.b, 0.0],
        ),
        MaterialKind::Standard {
            metalness,
            roughness,
            ..
        } => ([metalness, roughness, 0.0, 0.0], [0.0; 4]),
        MaterialKind::Physical {
            metalness,
            roughness,
            clearcoat,
            sheen,
            ..
        } => ([metalness, roughness, 0.0, clearcoat], [0.0, 0.0, 0.0, sheen]),
        _ => ([0.0; 4], [0.0; 4]),
    };

    InstanceData {
        model_0: cols[0],
        model_1: cols[1],
        model_2: cols[2],
        model_3: cols[3],
        color: [c.r, c.g, c.b, material.effective_opacity()],
        params,
        specular,
        flags: [
            preset_mode(&material.kind),
            if material.flat_shading { 1.0 } else { 0.0 },
            0.0,
            0.0,
        ],
    }
}

/// Near and far planes recovered from a right-handed, zero-to-one depth
/// perspective matrix.
fn clip_planes(projection: &Mat4) -> (f32, f32) {
    let m22 = projection.z_axis.z;
    let m32 = projection.w_axis.z;
    (m32 / m22, m32 / (m22 + 1.0))
}

fn pipeline_index(side: Side, transparent: bool) -> usize {
    let side = match side {
        Side::Front => 0,
        Side::Back => 1,
        Side::Double => 2,
    };
    side * 2 + usize::from(transparent)
}

struct GpuMesh {
    primitive: Primitive,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// What one GPU frame drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draws: u32,
    /// Objects left out: material missing or instance buffer full.
    pub skipped: u32,
}

/// Offscreen color target the scene is drawn into before the blit.
struct SceneTarget {
    view: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

/// wgpu-based scene renderer.
///
/// One pipeline per (side, blending) pair; every object is one instanced
/// draw of its primitive's mesh. Meshes are tessellated on first use.
/// Texture maps are not sampled, surfaces use the material color.
///
/// The scene is drawn at the render size into an offscreen target, then
/// stretched over the frame's view. The render size and the swapchain size
/// are independent, so a capped pixel ratio never changes the swapchain.
pub struct WgpuRenderer {
    pipelines: Vec<wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    blit_pipeline: wgpu::RenderPipeline,
    blit_layout: wgpu::BindGroupLayout,
    blit_sampler: wgpu::Sampler,
    target: SceneTarget,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    /// `width` and `height` are the render size in physical pixels.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                view: Mat4::IDENTITY.to_cols_array_2d(),
                camera_pos: [0.0; 4],
                light_pos: [0.0; 4],
                light_color: [0.0; 4],
                clip: [0.1, 100.0, AMBIENT, 0.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("material_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MATERIAL_SHADER.into()),
        });

        let mut pipelines = Vec::with_capacity(6);
        for side in [Side::Front, Side::Back, Side::Double] {
            for transparent in [false, true] {
                debug_assert_eq!(pipelines.len(), pipeline_index(side, transparent));
                pipelines.push(Self::create_pipeline(
                    device,
                    &pipeline_layout,
                    &shader,
                    surface_format,
                    side,
                    transparent,
                ));
            }
        }

        let max_instances = 1024u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bind_group_layout"),
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
        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let blit_pipeline = Self::create_blit_pipeline(device, &blit_layout, surface_format);
        let target = Self::create_scene_target(
            device,
            &blit_layout,
            &blit_sampler,
            surface_format,
            width,
            height,
        );
        tracing::debug!(?surface_format, width, height, "wgpu renderer created");

        Self {
            pipelines,
            uniform_buffer,
            uniform_bind_group,
            meshes: Vec::new(),
            instance_buffer,
            max_instances,
            depth_texture,
            blit_pipeline,
            blit_layout,
            blit_sampler,
            target,
            surface_format,
        }
    }

    fn create_blit_pipeline(
        device: &wgpu::Device,
        blit_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLIT_SHADER.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pipeline_layout"),
            bind_group_layouts: &[blit_layout],
            push_constant_ranges: &[],
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_scene_target(
        device: &wgpu::Device,
        blit_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> SceneTarget {
        let size = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scene_color_texture"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bind_group"),
            layout: blit_layout,
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
        SceneTarget {
            view,
            blit_bind_group,
            size,
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        side: Side,
        transparent: bool,
    ) -> wgpu::RenderPipeline {
        let cull_mode = match side {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        };
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("material_pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x2,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                            8 => Float32x4,
                            9 => Float32x4,
                            10 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(if transparent {
                        wgpu::BlendState::ALPHA_BLENDING
                    } else {
                        wgpu::BlendState::REPLACE
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: !transparent,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Change the render size. A no-op when the size is unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if (width.max(1), height.max(1)) == self.target.size {
            return;
        }
        self.depth_texture = Self::create_depth_texture(device, width, height);
        self.target = Self::create_scene_target(
            device,
            &self.blit_layout,
            &self.blit_sampler,
            self.surface_format,
            width,
            height,
        );
        tracing::debug!(width, height, "render size changed");
    }

    /// Size of the offscreen scene target in physical pixels.
    pub fn render_size(&self) -> (u32, u32) {
        self.target.size
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    fn mesh_index(&mut self, device: &wgpu::Device, primitive: &Primitive) -> usize {
        if let Some(i) = self.meshes.iter().position(|m| m.primitive == *primitive) {
            return i;
        }
        let data = mesh::build(primitive);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        tracing::debug!(
            shape = primitive.name(),
            triangles = data.triangle_count(),
            "mesh uploaded"
        );
        self.meshes.push(GpuMesh {
            primitive: *primitive,
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        });
        self.meshes.len() - 1
    }

    /// Render one frame of the scene into `view`. Opaque objects draw first,
    /// then transparent ones back to front.
    pub fn render<C: Camera>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &C,
    ) -> FrameStats {
        let projection = camera.projection();
        let (near, far) = clip_planes(&projection);
        let eye = camera.position();
        let (light_pos, light_color) = scene
            .lights()
            .first()
            .map(|l| {
                let c = l.color;
                (
                    l.position,
                    [c.r * l.intensity, c.g * l.intensity, c.b * l.intensity, 0.0],
                )
            })
            .unwrap_or((Vec3::ZERO, [0.0; 4]));
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
                view: camera.view().to_cols_array_2d(),
                camera_pos: eye.extend(1.0).to_array(),
                light_pos: light_pos.extend(1.0).to_array(),
                light_color,
                clip: [near, far, AMBIENT, 0.0],
            }),
        );

        struct Draw {
            mesh: usize,
            pipeline: usize,
            transparent: bool,
            distance: f32,
        }

        let mut stats = FrameStats::default();
        let mut instances: Vec<InstanceData> = Vec::new();
        let mut draws: Vec<Draw> = Vec::new();
        for object in scene.objects().values() {
            let Some(material) = scene.materials().get(object.material) else {
                stats.skipped += 1;
                continue;
            };
            if instances.len() >= self.max_instances as usize {
                stats.skipped += 1;
                continue;
            }
            let mesh = self.mesh_index(device, &object.primitive);
            instances.push(instance_data(object, material));
            draws.push(Draw {
                mesh,
                pipeline: pipeline_index(material.side, material.transparent),
                transparent: material.transparent,
                distance: object.transform.position.distance(eye),
            });
        }
        if stats.skipped > 0 {
            tracing::warn!(skipped = stats.skipped, "objects left out of frame");
        }

        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        // Instance index is the draw's position before sorting.
        let mut order: Vec<usize> = (0..draws.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&draws[a], &draws[b]);
            a.transparent
                .cmp(&b.transparent)
                .then(b.distance.total_cmp(&a.distance))
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.15,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for i in order {
                let draw = &draws[i];
                let mesh = &self.meshes[draw.mesh];
                let instance = i as u32;
                pass.set_pipeline(&self.pipelines[draw.pipeline]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, instance..instance + 1);
                stats.draws += 1;
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &self.target.blit_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
        stats
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// A renderer bound to one acquired surface texture, usable wherever a
/// [`Renderer`] is expected.
pub struct FrameTarget<'a> {
    pub renderer: &'a mut WgpuRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub view: &'a wgpu::TextureView,
}

impl Renderer for FrameTarget<'_> {
    type Output = FrameStats;

    fn render<C: Camera>(&mut self, scene: &Scene, camera: &C) -> FrameStats {
        self.renderer
            .render(self.device, self.queue, self.view, scene, camera)
    }
}
