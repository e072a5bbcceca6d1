//! WebGPU render pipeline setup and the per-frame scene assembly.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use wgpu::util::DeviceExt;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::assets::{Assets, TextureKey};
use crate::settings::Settings;
use crate::sim::cutscene::Phase;
use crate::sim::object::{GameObject, Room, Shape};
use crate::sim::state::GameState;
use crate::sim::{Camera, grab};

/// Shadow light position and ground plane
const SHADOW_LIGHT: Vec4 = Vec4::new(0.0, 30.0, 0.0, 1.0);
const SHADOW_PLANE: Vec4 = Vec4::new(0.0, 1.0, 0.0, 0.0);
const SHADOW_LIFT: f32 = 0.01;

const SKYBOX_HALF: f32 = 90.0;
const BUTTON_PLATE_SCALE: Vec3 = Vec3::new(2.4, 0.2, 2.4);

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    light_pos: [f32; 4],
}

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    scene_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    textures: HashMap<TextureKey, wgpu::BindGroup>,
    white: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        assets: &Assets,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("anamorph-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
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

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_layout"),
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

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals_buffer"),
            contents: bytemuck::bytes_of(&Globals {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                camera_pos: [0.0; 4],
                light_pos: [0.0, 30.0, 0.0, 1.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("diffuse_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = make_texture_bind_group(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            1,
            1,
            &[255, 255, 255, 255],
            "white",
        );

        let mut textures = HashMap::new();
        for key in TextureKey::ALL {
            if let Some(image) = assets.get(key) {
                let rgba = image.to_rgba();
                textures.insert(
                    key,
                    make_texture_bind_group(
                        &device,
                        &queue,
                        &texture_layout,
                        &sampler,
                        image.width.max(1),
                        image.height.max(1),
                        &rgba,
                        key.path(),
                    ),
                );
            }
        }

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            immediate_size: 0,
        });

        let make_pipeline = |label: &str, vs: &str, fs: &str, depth: Option<wgpu::DepthStencilState>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(vs),
                    buffers: &[Vertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs),
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
                depth_stencil: depth,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let depth_write = wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };
        let depth_pass_through = wgpu::DepthStencilState {
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            ..depth_write.clone()
        };

        let scene_pipeline = make_pipeline("scene_pipeline", "vs_main", "fs_main", Some(depth_write));
        let sky_pipeline = make_pipeline("sky_pipeline", "vs_sky", "fs_sky", Some(depth_pass_through.clone()));
        let overlay_pipeline =
            make_pipeline("overlay_pipeline", "vs_overlay", "fs_overlay", Some(depth_pass_through));

        let depth_view = make_depth_view(&device, width, height);

        Self {
            surface,
            device,
            queue,
            config,
            scene_pipeline,
            sky_pipeline,
            overlay_pipeline,
            globals_buffer,
            globals_bind_group,
            textures,
            white,
            depth_view,
            size: (width, height),
        }
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = make_depth_view(&self.device, new_width, new_height);
        }
    }

    /// Assemble the frame from simulation state and draw it.
    pub fn render(&mut self, state: &GameState, settings: &Settings) -> Result<(), wgpu::SurfaceError> {
        let (eye, view) = camera_view(state);
        let aspect = self.size.0 as f32 / self.size.1.max(1) as f32;
        let proj = Mat4::perspective_rh(settings.fov_degrees.to_radians(), aspect, 0.1, 300.0);

        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals {
                view_proj: (proj * view).to_cols_array_2d(),
                camera_pos: [eye.x, eye.y, eye.z, 1.0],
                light_pos: [SHADOW_LIGHT.x, SHADOW_LIGHT.y, SHADOW_LIGHT.z, 1.0],
            }),
        );

        let frame = FrameBatches::build(state, settings, view, eye, aspect, &self.textures);

        let output = self.surface.get_current_texture()?;
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let upload = |verts: &[Vertex], label: &str| -> Option<(wgpu::Buffer, u32)> {
            if verts.is_empty() {
                return None;
            }
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(verts),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            Some((buffer, verts.len() as u32))
        };

        let sky_buf = upload(&frame.sky, "sky_vertices");
        let scene_buf = upload(&frame.scene, "scene_vertices");
        let textured_bufs: Vec<(TextureKey, (wgpu::Buffer, u32))> = frame
            .textured
            .iter()
            .filter_map(|(key, verts)| upload(verts, "textured_vertices").map(|b| (*key, b)))
            .collect();
        let overlay_buf = upload(&frame.overlay, "overlay_vertices");

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.05,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_bind_group(0, &self.globals_bind_group, &[]);

            if let Some((buf, count)) = &sky_buf {
                pass.set_pipeline(&self.sky_pipeline);
                pass.set_bind_group(1, self.textures.get(&TextureKey::Sky).unwrap_or(&self.white), &[]);
                pass.set_vertex_buffer(0, buf.slice(..));
                pass.draw(0..*count, 0..1);
            }

            pass.set_pipeline(&self.scene_pipeline);
            if let Some((buf, count)) = &scene_buf {
                pass.set_bind_group(1, &self.white, &[]);
                pass.set_vertex_buffer(0, buf.slice(..));
                pass.draw(0..*count, 0..1);
            }
            for (key, (buf, count)) in &textured_bufs {
                pass.set_bind_group(1, self.textures.get(key).unwrap_or(&self.white), &[]);
                pass.set_vertex_buffer(0, buf.slice(..));
                pass.draw(0..*count, 0..1);
            }

            if let Some((buf, count)) = &overlay_buf {
                pass.set_pipeline(&self.overlay_pipeline);
                pass.set_bind_group(1, &self.white, &[]);
                pass.set_vertex_buffer(0, buf.slice(..));
                pass.draw(0..*count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Camera pose for the frame: the player's eye, or the cut-scene override.
fn camera_view(state: &GameState) -> (Vec3, Mat4) {
    if let Some(pose) = state.cutscene.camera_pose() {
        let view = Mat4::look_at_rh(pose.position, pose.target, pose.up);
        (pose.position, view)
    } else {
        (state.camera.position, state.camera.view_matrix())
    }
}

/// All vertex batches for one frame.
struct FrameBatches {
    sky: Vec<Vertex>,
    scene: Vec<Vertex>,
    textured: HashMap<TextureKey, Vec<Vertex>>,
    overlay: Vec<Vertex>,
}

impl FrameBatches {
    fn build(
        state: &GameState,
        settings: &Settings,
        view: Mat4,
        eye: Vec3,
        aspect: f32,
        loaded: &HashMap<TextureKey, wgpu::BindGroup>,
    ) -> Self {
        let mut frame = Self {
            sky: Vec::new(),
            scene: Vec::with_capacity(4096),
            textured: HashMap::new(),
            overlay: Vec::new(),
        };
        let cs = &state.cutscene;
        let (stacks, slices) = settings.quality.sphere_segments();

        if settings.skybox && loaded.contains_key(&TextureKey::Sky) {
            shapes::skybox(&mut frame.sky, eye, SKYBOX_HALF);
        }

        let room_gone = |room: Room| match room {
            Room::Room1 => cs.room1_exploded,
            Room::Room2 => cs.room2_exploded,
        };

        // Scenery and dynamic objects
        for obj in &state.objects {
            if room_gone(obj.room) {
                continue;
            }
            if obj.id == state.exit_door_id && !state.exit_door_present() {
                continue;
            }
            if obj.id == state.box_id && !state.puzzle_clear {
                continue;
            }
            frame.push_object(obj, loaded, stacks, slices);

            if settings.trails_enabled() {
                frame.push_trail(obj, stacks, slices);
            }
            if settings.shadows_enabled() && !obj.is_static {
                frame.push_shadow(obj, stacks, slices);
            }
        }

        // Wall pieces
        for entity in &state.walls {
            if room_gone(entity.room) {
                continue;
            }
            for seg in &entity.wall.segments {
                let model = shapes::model_matrix(seg.position, Vec3::ZERO, seg.scale);
                let color = [seg.color.x, seg.color.y, seg.color.z, 1.0];
                shapes::cuboid(&mut frame.scene, &model, color);
            }
        }

        // Pressure plates
        for (i, button) in state.buttons.iter().enumerate() {
            let room = if i == 2 { Room::Room2 } else { Room::Room1 };
            if room_gone(room) {
                continue;
            }
            let center = button.position + Vec3::new(0.0, BUTTON_PLATE_SCALE.y * 0.5, 0.0);
            let model = shapes::model_matrix(center, Vec3::ZERO, BUTTON_PLATE_SCALE);
            let color = if button.pressed {
                colors::BUTTON_ON
            } else {
                colors::BUTTON_OFF
            };
            shapes::cuboid(&mut frame.scene, &model, color);
        }

        // Anamorphic pieces until the puzzle collapses them into the box
        if !state.puzzle_clear && !cs.room2_exploded {
            let textured = loaded.contains_key(&TextureKey::Picture);
            for piece in &state.puzzle.pieces {
                let model = shapes::model_matrix(piece.position, piece.rotation, piece.scale);
                if textured {
                    shapes::projected_cuboid(
                        frame.textured.entry(TextureKey::Picture).or_default(),
                        &model,
                        [1.0, 1.0, 1.0, 1.0],
                        &state.puzzle,
                    );
                } else {
                    shapes::cuboid(&mut frame.scene, &model, [0.85, 0.85, 0.9, 1.0]);
                }
            }
        }

        // Explosion effects
        if cs.fuel > 0 {
            let right = Vec3::new(view.x_axis.x, view.y_axis.x, view.z_axis.x);
            let up = Vec3::new(view.x_axis.y, view.y_axis.y, view.z_axis.y);
            shapes::particle_quads(
                &mut frame.scene,
                &cs.particles,
                right,
                up,
                0.08,
                settings.effective_particle_limit(),
            );
            shapes::debris_triangles(&mut frame.scene, &cs.debris, settings.effective_debris_limit());
        }

        // Crosshair, highlighted over a grabbable target
        if cs.phase == Phase::Normal {
            let color = if state.held.is_some() || pick_would_hit(&state.camera, &state.objects) {
                colors::CROSSHAIR_ACTIVE
            } else {
                colors::CROSSHAIR
            };
            shapes::crosshair(&mut frame.overlay, aspect, color);
        }

        frame
    }

    fn push_object(
        &mut self,
        obj: &GameObject,
        loaded: &HashMap<TextureKey, wgpu::BindGroup>,
        stacks: u32,
        slices: u32,
    ) {
        let color = [obj.color.x, obj.color.y, obj.color.z, 1.0];
        match obj.shape {
            Shape::Sphere => {
                shapes::uv_sphere(&mut self.scene, obj.position, obj.scale, color, stacks, slices);
            }
            Shape::Cube => {
                let model = shapes::model_matrix(obj.position, obj.rotation, obj.scale);
                match obj.face_textures {
                    Some(faces) => {
                        // Axis pairs: 0 = x sides, 1 = y top/bottom, 2 = z front/back.
                        // Empty or unloaded slots draw with vertex color.
                        for (axis, key) in [(0, faces.sides), (1, faces.top), (2, faces.front)] {
                            let out = match key {
                                Some(key) if loaded.contains_key(&key) => {
                                    self.textured.entry(key).or_default()
                                }
                                _ => &mut self.scene,
                            };
                            shapes::cuboid_face_pair(out, &model, color, axis);
                        }
                    }
                    None => shapes::cuboid(&mut self.scene, &model, color),
                }
            }
        }
    }

    /// Fading translucent ghosts along the held-object trail.
    fn push_trail(&mut self, obj: &GameObject, stacks: u32, slices: u32) {
        for (i, ghost) in obj.trail.iter().enumerate().skip(1) {
            let alpha = (0.5 - 0.05 * i as f32).max(0.0);
            let color = [obj.color.x, obj.color.y, obj.color.z, alpha];
            match obj.shape {
                Shape::Sphere => shapes::uv_sphere(
                    &mut self.scene,
                    ghost.position,
                    ghost.scale,
                    color,
                    stacks,
                    slices,
                ),
                Shape::Cube => {
                    let model = shapes::model_matrix(ghost.position, Vec3::ZERO, ghost.scale);
                    shapes::cuboid(&mut self.scene, &model, color);
                }
            }
        }
    }

    /// Planar blob shadow: generate the object mesh, then flatten every
    /// vertex onto the floor plane.
    fn push_shadow(&mut self, obj: &GameObject, stacks: u32, slices: u32) {
        let shadow = shapes::shadow_matrix(SHADOW_LIGHT, SHADOW_PLANE);
        let mut temp = Vec::new();
        match obj.shape {
            Shape::Sphere => shapes::uv_sphere(
                &mut temp,
                obj.position,
                obj.scale,
                colors::SHADOW,
                stacks,
                slices,
            ),
            Shape::Cube => {
                let model = shapes::model_matrix(obj.position, obj.rotation, obj.scale);
                shapes::cuboid(&mut temp, &model, colors::SHADOW);
            }
        }
        for mut v in temp {
            let flat = shadow.project_point3(Vec3::from_array(v.position));
            v.position = [flat.x, flat.y + SHADOW_LIFT, flat.z];
            v.normal = [0.0, 1.0, 0.0];
            self.scene.push(v);
        }
    }
}

fn pick_would_hit(camera: &Camera, objects: &[GameObject]) -> bool {
    grab::pick(camera, objects).is_some()
}

fn make_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
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
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[allow(clippy::too_many_arguments)]
fn make_texture_bind_group(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
    rgba: &[u8],
    label: &str,
) -> wgpu::BindGroup {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
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
    })
}
