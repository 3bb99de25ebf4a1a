//! WebGPU forward renderer for the stage.
//!
//! Nodes are kept in creation order, which is parent-first, so world
//! matrices resolve in a single pass. Opaque meshes draw first, then the
//! contact shadow, then transparent meshes sorted back to front.

use crate::core::{SurfaceMesh, TransformState};
use crate::scene::{MaterialDesc, MeshDesc, SceneRenderer, Shading, StageDesc, ToneMapping};
use fnv::FnvHashMap;
use glam::{Mat4, Vec3};
use std::rc::Rc;
use web_sys as web;

mod helpers;
use helpers::GpuMesh;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    lights: [[f32; 4]; 2],
    lightformers: [[f32; 4]; 2],
    ambient: [f32; 4],
    shadow: [f32; 4],
}

// One slot of the dynamic-offset draw buffer; padded to the offset alignment.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct DrawUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    material: [f32; 4],
    params: [f32; 4],
    _pad: [[f32; 4]; 9],
}

const DRAW_STRIDE: u64 = std::mem::size_of::<DrawUniforms>() as u64;
const SHADOW_KIND: f32 = 3.0;

impl DrawUniforms {
    fn new(model: Mat4, m: &MaterialDesc) -> Self {
        let kind = match m.shading {
            Shading::Standard => 0.0,
            Shading::Glass => 1.0,
            Shading::Unlit => 2.0,
        };
        Self {
            model: model.to_cols_array_2d(),
            color: [m.color[0], m.color[1], m.color[2], m.opacity],
            material: [m.roughness, m.metalness, m.transmission, m.clearcoat],
            params: [kind, m.env_intensity, 0.0, 0.0],
            _pad: [[0.0; 4]; 9],
        }
    }

    fn shadow(model: Mat4, opacity: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: [0.0, 0.0, 0.0, opacity],
            material: [1.0, 0.0, 0.0, 0.0],
            params: [SHADOW_KIND, 0.0, 0.0, 0.0],
            _pad: [[0.0; 4]; 9],
        }
    }
}

/// Handle to a node in the renderer's hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderNode(usize);

struct MeshInstance {
    gpu: usize,
    material: MaterialDesc,
    scale: Vec3,
}

struct NodeRecord {
    parent: Option<usize>,
    local: Mat4,
    mesh: Option<MeshInstance>,
}

#[derive(Clone, Copy)]
struct DrawCall {
    slot: u32,
    mesh: usize,
}

pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_tex: wgpu::Texture,
    depth_view: wgpu::TextureView,

    opaque_pipeline: wgpu::RenderPipeline,
    blend_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bg: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bg: wgpu::BindGroup,
    draw_capacity: usize,

    meshes: Vec<GpuMesh>,
    // Keyed by the shared surface's address; `retained` keeps the key alive.
    mesh_cache: FnvHashMap<*const SurfaceMesh, usize>,
    retained: Vec<Rc<SurfaceMesh>>,
    nodes: Vec<NodeRecord>,
    stage: Option<StageDesc>,
    shadow: Option<(usize, Mat4)>,

    world: Vec<Mat4>,
    draws: Vec<DrawUniforms>,
    opaque: Vec<DrawCall>,
    transparent: Vec<(f32, DrawCall)>,

    width: u32,
    height: u32,
    clear_color: wgpu::Color,
}

impl GpuRenderer {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Default limits avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let (depth_tex, depth_view) = helpers::create_depth_texture(&device, width, height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::core::SCENE_WGSL.into()),
        });
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[helpers::uniform_layout_entry(
                false,
                std::mem::size_of::<Globals>() as u64,
            )],
        });
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bgl"),
            entries: &[helpers::uniform_layout_entry(true, DRAW_STRIDE)],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&globals_layout, &draw_layout],
            push_constant_ranges: &[],
        });
        let opaque_pipeline =
            helpers::make_scene_pipeline(&device, "opaque_pipeline", &layout, &shader, format, None, true);
        let blend_pipeline = helpers::make_scene_pipeline(
            &device,
            "blend_pipeline",
            &layout,
            &shader,
            format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
        );

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let draw_capacity = 256;
        let (draw_buffer, draw_bg) = create_draw_buffer(&device, &draw_layout, draw_capacity);

        log::info!("[render] surface {}x{} format={:?}", width, height, format);
        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_tex,
            depth_view,
            opaque_pipeline,
            blend_pipeline,
            globals_buffer,
            globals_bg,
            draw_layout,
            draw_buffer,
            draw_bg,
            draw_capacity,
            meshes: Vec::new(),
            mesh_cache: FnvHashMap::default(),
            retained: Vec::new(),
            nodes: Vec::new(),
            stage: None,
            shadow: None,
            world: Vec::new(),
            draws: Vec::new(),
            opaque: Vec::new(),
            transparent: Vec::new(),
            width,
            height,
            clear_color: wgpu::Color {
                r: 0.02,
                g: 0.03,
                b: 0.05,
                a: 1.0,
            },
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            let (tex, view) = helpers::create_depth_texture(&self.device, width, height);
            self.depth_tex = tex;
            self.depth_view = view;
            log::debug!("[render] resized to {}x{} ({:?})", width, height, self.depth_tex.size());
        }
    }

    fn upload(&mut self, label: &str, surface: &Rc<SurfaceMesh>) -> usize {
        let key = Rc::as_ptr(surface);
        if let Some(&index) = self.mesh_cache.get(&key) {
            return index;
        }
        let index = self.meshes.len();
        self.meshes.push(helpers::upload_mesh(&self.device, label, surface));
        self.mesh_cache.insert(key, index);
        self.retained.push(surface.clone());
        index
    }

    fn push_node(
        &mut self,
        label: &'static str,
        parent: Option<RenderNode>,
        transform: &TransformState,
        mesh: Option<MeshInstance>,
    ) -> anyhow::Result<RenderNode> {
        if let Some(p) = parent {
            anyhow::ensure!(p.0 < self.nodes.len(), "unknown parent node {} for {}", p.0, label);
        }
        self.nodes.push(NodeRecord {
            parent: parent.map(|p| p.0),
            local: transform.matrix(Vec3::ONE),
            mesh,
        });
        Ok(RenderNode(self.nodes.len() - 1))
    }

    fn ensure_draw_capacity(&mut self, needed: usize) {
        if needed <= self.draw_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        let (buffer, bg) = create_draw_buffer(&self.device, &self.draw_layout, capacity);
        self.draw_buffer = buffer;
        self.draw_bg = bg;
        self.draw_capacity = capacity;
    }

    fn collect_draws(&mut self, view: Mat4) {
        self.world.clear();
        self.draws.clear();
        self.opaque.clear();
        self.transparent.clear();

        for node in &self.nodes {
            let world = match node.parent {
                Some(p) => self.world[p] * node.local,
                None => node.local,
            };
            self.world.push(world);
            let Some(mesh) = &node.mesh else { continue };
            let model = world * Mat4::from_scale(mesh.scale);
            let call = DrawCall {
                slot: self.draws.len() as u32,
                mesh: mesh.gpu,
            };
            self.draws.push(DrawUniforms::new(model, &mesh.material));
            if mesh.material.is_transparent() {
                let depth = view.transform_point3(model.w_axis.truncate()).z;
                self.transparent.push((depth, call));
            } else {
                self.opaque.push(call);
            }
        }
        // View-space z is negative in front of the camera: most negative draws first.
        self.transparent.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    fn write_globals(&self, stage: &StageDesc, elapsed: f64) {
        let camera = stage
            .camera
            .with_aspect(self.width as f32 / self.height.max(1) as f32);
        let light = |i: usize| {
            let l = &stage.lights[i];
            l.position.normalize_or_zero().extend(l.intensity).to_array()
        };
        let lightformer = |i: usize| {
            let lf = &stage.environment.lightformers[i];
            lf.position.normalize_or_zero().extend(lf.intensity * 0.25).to_array()
        };
        let shadow = &stage.contact_shadow;
        let globals = Globals {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.eye.extend(1.0).to_array(),
            lights: [light(0), light(1)],
            lightformers: [lightformer(0), lightformer(1)],
            ambient: [
                stage.ambient_intensity,
                1.0,
                elapsed as f32,
                if stage.tone_mapping == ToneMapping::AcesFilmic { 1.0 } else { 0.0 },
            ],
            shadow: [shadow.opacity, shadow.blur, shadow.scale, shadow.far],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }
}

fn create_draw_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("draws"),
        size: DRAW_STRIDE * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("draws_bg"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(DRAW_STRIDE),
            }),
        }],
    });
    (buffer, bg)
}

impl SceneRenderer for GpuRenderer {
    type Node = RenderNode;

    fn configure_stage(&mut self, stage: &StageDesc) -> anyhow::Result<()> {
        let shadow = &stage.contact_shadow;
        let plane = Rc::new(SurfaceMesh::ground_plane(shadow.scale));
        let mesh = self.upload("contact_shadow", &plane);
        self.shadow = Some((mesh, Mat4::from_translation(shadow.position)));
        self.stage = Some(stage.clone());
        Ok(())
    }

    fn create_group(
        &mut self,
        label: &'static str,
        parent: Option<RenderNode>,
        transform: TransformState,
    ) -> anyhow::Result<RenderNode> {
        self.push_node(label, parent, &transform, None)
    }

    fn create_mesh(&mut self, parent: Option<RenderNode>, mesh: MeshDesc) -> anyhow::Result<RenderNode> {
        let gpu = self.upload(mesh.label, &mesh.surface);
        self.push_node(
            mesh.label,
            parent,
            &mesh.transform,
            Some(MeshInstance {
                gpu,
                material: mesh.material,
                scale: mesh.scale,
            }),
        )
    }

    fn set_transform(&mut self, node: RenderNode, transform: &TransformState) {
        if let Some(record) = self.nodes.get_mut(node.0) {
            record.local = transform.matrix(Vec3::ONE);
        }
    }

    fn submit(&mut self, elapsed: f64) -> anyhow::Result<()> {
        let stage = self
            .stage
            .take()
            .ok_or_else(|| anyhow::anyhow!("stage not configured"))?;
        let view = stage.camera.view_matrix();
        self.write_globals(&stage, elapsed);
        self.stage = Some(stage);

        self.collect_draws(view);
        let shadow_call = self.shadow.map(|(mesh, model)| {
            let slot = self.draws.len() as u32;
            let opacity = self
                .stage
                .as_ref()
                .map_or(0.0, |s| s.contact_shadow.opacity);
            self.draws.push(DrawUniforms::shadow(model, opacity));
            DrawCall { slot, mesh }
        });
        self.ensure_draw_capacity(self.draws.len());
        self.queue
            .write_buffer(&self.draw_buffer, 0, bytemuck::cast_slice(&self.draws));

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.surface.configure(&self.device, &self.config);
                anyhow::bail!("surface {:?}; reconfigured", e);
            }
            Err(e) => anyhow::bail!("surface error: {:?}", e),
        };
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
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
            });
            rpass.set_bind_group(0, &self.globals_bg, &[]);

            let meshes = &self.meshes;
            let draw_bg = &self.draw_bg;
            let draw = |rpass: &mut wgpu::RenderPass<'_>, call: DrawCall| {
                let mesh = &meshes[call.mesh];
                rpass.set_bind_group(1, draw_bg, &[call.slot * DRAW_STRIDE as u32]);
                rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
                rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
            };

            rpass.set_pipeline(&self.opaque_pipeline);
            for call in &self.opaque {
                draw(&mut rpass, *call);
            }
            rpass.set_pipeline(&self.blend_pipeline);
            if let Some(call) = shadow_call {
                draw(&mut rpass, call);
            }
            for (_, call) in &self.transparent {
                draw(&mut rpass, *call);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

const _: () = assert!(DRAW_STRIDE == 256);
