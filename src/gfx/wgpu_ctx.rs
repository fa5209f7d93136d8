//! wgpu implementation of the graphics collaborator.
//!
//! Emulates the immediate-mode contract of [`GfxContext`] over wgpu: target
//! brackets are a CPU-side binding stack, and every draw or clear records and
//! submits one small command encoder, so each call is logically complete when
//! it returns. Pipelines are cached per (shader, attachment format, blend,
//! cull) and named uniforms are laid out into a shadow buffer that is
//! uploaded before each draw.

use std::borrow::Cow;
use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::error::{PostFxError, PostFxResult};
use crate::gfx::{
    Color, GfxContext, MeshId, PixelFormat, QuadVertex, ShaderDesc, ShaderId, TargetDesc, TargetId,
    TextureFilter, TextureParams, TextureWrap, UniformType,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Debug, Clone, Copy)]
struct Viewport {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

struct TargetEntry {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    depth: Option<wgpu::Texture>,
    depth_view: Option<wgpu::TextureView>,
    sampler: wgpu::Sampler,
    desc: TargetDesc,
}

struct UniformField {
    name: &'static str,
    ty: UniformType,
    offset: usize,
}

struct ShaderEntry {
    vertex_module: wgpu::ShaderModule,
    /// Fragment entry point module; identical to `vertex_module` when both
    /// stages share one source.
    fragment_module: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    fields: Vec<UniformField>,
    /// CPU copy of the uniform block, uploaded before each draw.
    shadow: Vec<u8>,
    uniform_buffer: Option<wgpu::Buffer>,
    texture_units: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    format: wgpu::TextureFormat,
    blend: bool,
    cull: bool,
}

struct MeshEntry {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

struct Binding {
    target: TargetId,
    viewport: Viewport,
}

/// Per-frame presentation attachment supplied by the embedding application.
struct Presentation {
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
}

/// [`GfxContext`] over a wgpu device/queue pair.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,

    targets: HashMap<u32, TargetEntry>,
    shaders: HashMap<u32, ShaderEntry>,
    meshes: HashMap<u32, MeshEntry>,
    next_target: u32,
    next_shader: u32,
    next_mesh: u32,

    /// Nested target bracket stack; empty means the presentation surface.
    bound: Vec<Binding>,
    /// Viewport of the innermost binding (or the screen).
    viewport: Viewport,
    screen_viewport: Viewport,

    units: HashMap<u32, TargetId>,
    /// Mirrors the GL-style active unit selector; retained as queryable
    /// state, bindings themselves are explicit per unit.
    active_unit: u32,

    blend: bool,
    cull_face: bool,
    /// Tracked for contract completeness; chain draws never attach depth.
    depth_test: bool,

    presentation: Option<Presentation>,
}

impl WgpuContext {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            targets: HashMap::new(),
            shaders: HashMap::new(),
            meshes: HashMap::new(),
            next_target: 0,
            next_shader: 0,
            next_mesh: 0,
            bound: Vec::new(),
            viewport: Viewport { x: 0, y: 0, width: 0, height: 0 },
            screen_viewport: Viewport { x: 0, y: 0, width: 0, height: 0 },
            units: HashMap::new(),
            active_unit: 0,
            blend: false,
            cull_face: false,
            depth_test: false,
            presentation: None,
        }
    }

    /// Acquire a headless device/queue pair on the best available adapter.
    pub fn headless() -> PostFxResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| PostFxError::device("no suitable GPU adapter"))?;

        log::info!("postfx adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("postfx-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))
        .map_err(PostFxError::device)?;

        Ok(Self::new(device, queue))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// The GL-style active texture unit selector.
    pub fn active_unit(&self) -> u32 {
        self.active_unit
    }

    pub fn is_blend_enabled(&self) -> bool {
        self.blend
    }

    pub fn is_cull_face_enabled(&self) -> bool {
        self.cull_face
    }

    pub fn is_depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    /// Supply the frame's surface view; draws issued outside any target
    /// bracket land here. Must be refreshed every frame before presenting.
    pub fn set_presentation_target(
        &mut self,
        view: wgpu::TextureView,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) {
        self.screen_viewport = Viewport { x: 0, y: 0, width, height };
        if self.bound.is_empty() {
            self.viewport = self.screen_viewport;
        }
        self.presentation = Some(Presentation { view, format });
    }

    /// Drop the per-frame surface view after presenting.
    pub fn clear_presentation_target(&mut self) {
        self.presentation = None;
    }

    fn color_format(format: PixelFormat) -> wgpu::TextureFormat {
        match format {
            PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
            PixelFormat::Rgba16F => wgpu::TextureFormat::Rgba16Float,
        }
    }

    fn address_mode(wrap: TextureWrap) -> wgpu::AddressMode {
        match wrap {
            TextureWrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            TextureWrap::Repeat => wgpu::AddressMode::Repeat,
            TextureWrap::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }

    fn filter_mode(filter: TextureFilter) -> wgpu::FilterMode {
        match filter {
            TextureFilter::Nearest => wgpu::FilterMode::Nearest,
            TextureFilter::Linear => wgpu::FilterMode::Linear,
        }
    }

    fn make_sampler(&self, params: &TextureParams) -> wgpu::Sampler {
        self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("postfx_target_sampler"),
            address_mode_u: Self::address_mode(params.wrap_u),
            address_mode_v: Self::address_mode(params.wrap_v),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: Self::filter_mode(params.mag_filter),
            min_filter: Self::filter_mode(params.min_filter),
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        })
    }

    /// The view and format the next draw or clear will write to.
    fn current_attachment(&self) -> (&wgpu::TextureView, wgpu::TextureFormat, Option<&wgpu::TextureView>) {
        match self.bound.last() {
            Some(binding) => {
                let entry = self
                    .targets
                    .get(&binding.target.0)
                    .expect("bound render target was destroyed while still bound");
                (&entry.view, Self::color_format(entry.desc.format), entry.depth_view.as_ref())
            }
            None => {
                let p = self
                    .presentation
                    .as_ref()
                    .expect("no presentation target set; draws outside a bracket need set_presentation_target()");
                (&p.view, p.format, None)
            }
        }
    }

    fn pipeline_for<'s>(
        device: &wgpu::Device,
        shader: &'s mut ShaderEntry,
        key: PipelineKey,
    ) -> &'s wgpu::RenderPipeline {
        if !shader.pipelines.contains_key(&key) {
            let blend = if key.blend { Some(wgpu::BlendState::ALPHA_BLENDING) } else { None };
            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("postfx_pipeline"),
                layout: Some(&shader.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader.vertex_module,
                    entry_point: "vs_main",
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x2,
                                offset: 0,
                                shader_location: 0,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x2,
                                offset: 8,
                                shader_location: 1,
                            },
                        ],
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader.fragment_module,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: key.format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: if key.cull { Some(wgpu::Face::Back) } else { None },
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                // Chain passes never attach depth; the depth toggle brackets
                // the caller's own scene passes.
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
            });
            shader.pipelines.insert(key, pipeline);
        }
        shader.pipelines.get(&key).unwrap()
    }
}

impl GfxContext for WgpuContext {
    fn create_target(&mut self, desc: &TargetDesc) -> PostFxResult<TargetId> {
        if desc.width == 0 || desc.height == 0 {
            return Err(PostFxError::device(format!(
                "invalid target dimensions {}x{}",
                desc.width, desc.height
            )));
        }

        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("postfx_target_color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::color_format(desc.format),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let (depth, depth_view) = if desc.has_depth {
            let depth = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("postfx_target_depth"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
            (Some(depth), Some(depth_view))
        } else {
            (None, None)
        };

        // Sampling parameters are fixed at creation time.
        let sampler = self.make_sampler(&desc.params);

        let id = self.next_target;
        self.next_target += 1;
        self.targets.insert(
            id,
            TargetEntry { texture, view, depth, depth_view, sampler, desc: *desc },
        );
        Ok(TargetId(id))
    }

    fn destroy_target(&mut self, target: TargetId) {
        debug_assert!(
            !self.bound.iter().any(|b| b.target == target),
            "destroying {:?} while it is bound",
            target
        );
        if let Some(entry) = self.targets.remove(&target.0) {
            entry.texture.destroy();
            if let Some(depth) = entry.depth {
                depth.destroy();
            }
        }
        self.units.retain(|_, bound| *bound != target);
    }

    fn begin_target(&mut self, target: TargetId) {
        let entry = self.targets.get(&target.0).expect("begin_target: unknown target");
        let viewport = Viewport { x: 0, y: 0, width: entry.desc.width, height: entry.desc.height };
        self.bound.push(Binding { target, viewport });
        self.viewport = viewport;
    }

    fn end_target(&mut self) {
        assert!(self.bound.pop().is_some(), "end_target without a matching begin_target");
        self.viewport = match self.bound.last() {
            Some(binding) => binding.viewport,
            None => self.screen_viewport,
        };
    }

    fn bound_target(&self) -> Option<TargetId> {
        self.bound.last().map(|b| b.target)
    }

    fn clear_current(&mut self, color: Color) {
        let (view, _, depth_view) = self.current_attachment();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("postfx_clear") });
        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("postfx_clear_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: color.r as f64,
                            g: color.g as f64,
                            b: color.b as f64,
                            a: color.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: depth_view.map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(Some(encoder.finish()));
    }

    fn set_texture_params(&mut self, target: TargetId, params: &TextureParams) {
        let sampler = self.make_sampler(params);
        if let Some(entry) = self.targets.get_mut(&target.0) {
            entry.sampler = sampler;
            entry.desc.params = *params;
        }
    }

    fn bind_texture(&mut self, target: TargetId, unit: u32) {
        debug_assert!(self.targets.contains_key(&target.0), "bind_texture: unknown target");
        self.units.insert(unit, target);
        self.active_unit = unit;
    }

    fn set_active_unit(&mut self, unit: u32) {
        self.active_unit = unit;
    }

    fn set_blend(&mut self, enabled: bool) {
        self.blend = enabled;
    }

    fn set_cull_face(&mut self, enabled: bool) {
        self.cull_face = enabled;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = Viewport { x, y, width, height };
        if let Some(binding) = self.bound.last_mut() {
            binding.viewport = self.viewport;
        }
    }

    fn compile_shader(&mut self, desc: &ShaderDesc<'_>) -> PostFxResult<ShaderId> {
        log::debug!(
            "compiling shader program ({} uniform(s), {} texture unit(s)){}",
            desc.uniforms.len(),
            desc.texture_units,
            if desc.defines.is_empty() { String::new() } else { format!(" w/ defines: {:?}", desc.defines) }
        );

        let preprocess = |source: &str| -> String {
            if desc.defines.is_empty() {
                source.to_string()
            } else {
                format!("{}\n{}", desc.defines, source)
            }
        };

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let vertex_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("postfx_shader_vs"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(preprocess(desc.vertex))),
        });
        let fragment_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("postfx_shader_fs"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(preprocess(desc.fragment))),
        });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(PostFxError::shader(error));
        }

        // Lay out the declared uniforms as a tightly packed block of 4-byte
        // scalars, padded to 16 bytes as WGSL uniform blocks require.
        let mut fields = Vec::with_capacity(desc.uniforms.len());
        let mut offset = 0usize;
        for spec in desc.uniforms {
            if fields.iter().any(|f: &UniformField| f.name == spec.name) {
                return Err(PostFxError::shader(format!("duplicate uniform {:?}", spec.name)));
            }
            fields.push(UniformField { name: spec.name, ty: spec.ty, offset });
            offset += 4;
        }
        let shadow_len = (offset + 15) / 16 * 16;

        let mut layout_entries = Vec::new();
        for unit in 0..desc.texture_units {
            layout_entries.push(wgpu::BindGroupLayoutEntry {
                binding: unit * 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
            layout_entries.push(wgpu::BindGroupLayoutEntry {
                binding: unit * 2 + 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }
        if !desc.uniforms.is_empty() {
            layout_entries.push(wgpu::BindGroupLayoutEntry {
                binding: desc.texture_units * 2,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }

        let bind_group_layout =
            self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("postfx_shader_bind_group_layout"),
                entries: &layout_entries,
            });
        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("postfx_shader_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let uniform_buffer = if desc.uniforms.is_empty() {
            None
        } else {
            Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("postfx_shader_uniforms"),
                size: shadow_len as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }))
        };

        let id = self.next_shader;
        self.next_shader += 1;
        self.shaders.insert(
            id,
            ShaderEntry {
                vertex_module,
                fragment_module,
                bind_group_layout,
                pipeline_layout,
                pipelines: HashMap::new(),
                fields,
                shadow: vec![0u8; shadow_len],
                uniform_buffer,
                texture_units: desc.texture_units,
            },
        );
        Ok(ShaderId(id))
    }

    fn destroy_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader.0);
    }

    fn set_uniform_f(&mut self, shader: ShaderId, name: &str, value: f32) -> PostFxResult<()> {
        let entry = self
            .shaders
            .get_mut(&shader.0)
            .ok_or_else(|| PostFxError::shader("set_uniform_f: unknown shader"))?;
        let field = entry
            .fields
            .iter()
            .find(|f| f.name == name && f.ty == UniformType::Float)
            .ok_or_else(|| PostFxError::shader(format!("unknown float uniform {:?}", name)))?;
        entry.shadow[field.offset..field.offset + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn set_uniform_i(&mut self, shader: ShaderId, name: &str, value: i32) -> PostFxResult<()> {
        let entry = self
            .shaders
            .get_mut(&shader.0)
            .ok_or_else(|| PostFxError::shader("set_uniform_i: unknown shader"))?;
        let field = entry
            .fields
            .iter()
            .find(|f| f.name == name && f.ty == UniformType::Int)
            .ok_or_else(|| PostFxError::shader(format!("unknown int uniform {:?}", name)))?;
        entry.shadow[field.offset..field.offset + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn create_mesh(&mut self, vertices: &[QuadVertex]) -> PostFxResult<MeshId> {
        if vertices.is_empty() {
            return Err(PostFxError::device("create_mesh: empty vertex list"));
        }
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("postfx_mesh"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let id = self.next_mesh;
        self.next_mesh += 1;
        self.meshes.insert(id, MeshEntry { buffer, vertex_count: vertices.len() as u32 });
        Ok(MeshId(id))
    }

    fn destroy_mesh(&mut self, mesh: MeshId) {
        if let Some(entry) = self.meshes.remove(&mesh.0) {
            entry.buffer.destroy();
        }
    }

    fn draw(&mut self, mesh: MeshId, shader: ShaderId) {
        // Split the struct so the shader entry can be borrowed mutably (for
        // lazy pipeline creation) alongside the target and mesh tables.
        let Self {
            device,
            queue,
            targets,
            shaders,
            meshes,
            bound,
            presentation,
            units,
            viewport,
            blend,
            cull_face,
            ..
        } = self;

        let mesh_entry = meshes.get(&mesh.0).expect("draw: unknown mesh");
        let shader_entry = shaders.get_mut(&shader.0).expect("draw: unknown shader");

        let (attachment_view, format) = match bound.last() {
            Some(binding) => {
                let entry = targets
                    .get(&binding.target.0)
                    .expect("draw: bound render target was destroyed while still bound");
                (&entry.view, Self::color_format(entry.desc.format))
            }
            None => {
                let p = presentation.as_ref().expect(
                    "no presentation target set; draws outside a bracket need set_presentation_target()",
                );
                (&p.view, p.format)
            }
        };

        // Upload the uniform shadow buffer.
        if let Some(buffer) = &shader_entry.uniform_buffer {
            queue.write_buffer(buffer, 0, &shader_entry.shadow);
        }

        // Gather the texture units the program samples.
        let mut bind_entries = Vec::new();
        for unit in 0..shader_entry.texture_units {
            let target = units
                .get(&unit)
                .unwrap_or_else(|| panic!("draw: no texture bound to unit {}", unit));
            let target_entry = targets
                .get(&target.0)
                .expect("draw: texture unit references a destroyed target");
            bind_entries.push(wgpu::BindGroupEntry {
                binding: unit * 2,
                resource: wgpu::BindingResource::TextureView(&target_entry.view),
            });
            bind_entries.push(wgpu::BindGroupEntry {
                binding: unit * 2 + 1,
                resource: wgpu::BindingResource::Sampler(&target_entry.sampler),
            });
        }
        if let Some(buffer) = &shader_entry.uniform_buffer {
            bind_entries.push(wgpu::BindGroupEntry {
                binding: shader_entry.texture_units * 2,
                resource: buffer.as_entire_binding(),
            });
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("postfx_draw_bind_group"),
            layout: &shader_entry.bind_group_layout,
            entries: &bind_entries,
        });

        let key = PipelineKey { format, blend: *blend, cull: *cull_face };
        let pipeline = Self::pipeline_for(device, shader_entry, key);

        let viewport = *viewport;
        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("postfx_draw") });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("postfx_draw_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_viewport(
                viewport.x as f32,
                viewport.y as f32,
                viewport.width as f32,
                viewport.height as f32,
                0.0,
                1.0,
            );
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &bind_group, &[]);
            rpass.set_vertex_buffer(0, mesh_entry.buffer.slice(..));
            rpass.draw(0..mesh_entry.vertex_count, 0..1);
        }
        queue.submit(Some(encoder.finish()));
    }
}
