//! Graphics collaborator surface.
//!
//! The chain core never talks to a GPU API directly. Everything it needs is
//! expressed through the object-safe [`GfxContext`] trait: off-screen render
//! targets with nestable begin/end bracketing, numbered texture units, global
//! pipeline toggles, shader programs with named uniforms, and a draw call for
//! a small vertex buffer. [`wgpu_ctx::WgpuContext`] implements the trait over
//! wgpu; tests drive the core with a recording mock instead.

use crate::error::PostFxResult;

pub mod wgpu_ctx;

/// Opaque handle to an off-screen render target owned by a [`GfxContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u32);

/// Opaque handle to a compiled shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Opaque handle to an uploaded vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Color pixel format of an off-screen target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8,
    Rgba16F,
}

/// Texture coordinate wrap mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Sampling parameters applied to a target's color texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    pub wrap_u: TextureWrap,
    pub wrap_v: TextureWrap,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            wrap_u: TextureWrap::ClampToEdge,
            wrap_v: TextureWrap::ClampToEdge,
            min_filter: TextureFilter::Nearest,
            mag_filter: TextureFilter::Nearest,
        }
    }
}

/// Construction descriptor for an off-screen render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Attach a depth buffer alongside the color texture.
    pub has_depth: bool,
    pub params: TextureParams,
}

impl TargetDesc {
    /// RGBA8 color target with clamp-to-edge nearest sampling.
    pub fn color(width: u32, height: u32, has_depth: bool) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            has_depth,
            params: TextureParams::default(),
        }
    }

    /// Same descriptor at different dimensions.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// RGBA clear/blend color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const CLEAR: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Vertex layout for chain geometry (fullscreen quads).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    /// Position in clip space.
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Declared type of a named shader uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Int,
}

/// Declaration of one named uniform in a [`ShaderDesc`].
///
/// Backends without runtime uniform reflection (wgpu) use the declaration
/// order to lay out a uniform block; names must be unique per shader.
#[derive(Debug, Clone, Copy)]
pub struct UniformSpec {
    pub name: &'static str,
    pub ty: UniformType,
}

impl UniformSpec {
    pub const fn float(name: &'static str) -> Self {
        Self { name, ty: UniformType::Float }
    }

    pub const fn int(name: &'static str) -> Self {
        Self { name, ty: UniformType::Int }
    }
}

/// Source-level descriptor of a shader program.
///
/// `defines` is prefixed verbatim to both stages before compilation, the
/// preprocessor hook effects use for compile-time pass counts and the like.
#[derive(Debug, Clone, Copy)]
pub struct ShaderDesc<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
    pub defines: &'a str,
    pub uniforms: &'a [UniformSpec],
    /// Number of texture units the program samples, starting at unit 0.
    pub texture_units: u32,
}

impl<'a> ShaderDesc<'a> {
    /// Program sampling a single texture with no uniforms.
    pub fn passthrough(vertex: &'a str, fragment: &'a str) -> Self {
        Self { vertex, fragment, defines: "", uniforms: &[], texture_units: 1 }
    }
}

/// The boundary the chain core consumes from the graphics API.
///
/// All operations are synchronous relative to the call; a draw is logically
/// complete when the method returns. Implementations are driven from the
/// single thread that owns the GPU context.
pub trait GfxContext {
    /// Create an off-screen render target. The target's sampling parameters
    /// are applied exactly once at creation; the previously bound target (if
    /// any) is still bound when this returns.
    fn create_target(&mut self, desc: &TargetDesc) -> PostFxResult<TargetId>;

    /// Destroy a target and release its GPU resources.
    fn destroy_target(&mut self, target: TargetId);

    /// Bind `target` as the active framebuffer and set its full viewport,
    /// remembering the previous binding. Brackets nest.
    fn begin_target(&mut self, target: TargetId);

    /// Restore the binding and viewport that were active before the matching
    /// [`begin_target`](Self::begin_target).
    fn end_target(&mut self);

    /// The currently bound target, or `None` when rendering to the screen.
    fn bound_target(&self) -> Option<TargetId>;

    /// Clear the currently bound target (color, plus depth when attached).
    fn clear_current(&mut self, color: Color);

    /// Re-apply sampling parameters to a target's color texture. Recovery
    /// hook for re-establishing texture state after a context loss.
    fn set_texture_params(&mut self, target: TargetId, params: &TextureParams);

    /// Bind a target's color texture to the numbered texture unit.
    fn bind_texture(&mut self, target: TargetId, unit: u32);

    /// Select the active texture unit.
    fn set_active_unit(&mut self, unit: u32);

    /// Global alpha blending toggle.
    fn set_blend(&mut self, enabled: bool);

    /// Global face culling toggle.
    fn set_cull_face(&mut self, enabled: bool);

    /// Global depth test toggle.
    fn set_depth_test(&mut self, enabled: bool);

    /// Override the viewport of the current binding.
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Compile a shader program from vertex and fragment source.
    fn compile_shader(&mut self, desc: &ShaderDesc<'_>) -> PostFxResult<ShaderId>;

    /// Destroy a compiled shader program.
    fn destroy_shader(&mut self, shader: ShaderId);

    /// Set a named float uniform declared in the program's [`ShaderDesc`].
    fn set_uniform_f(&mut self, shader: ShaderId, name: &str, value: f32) -> PostFxResult<()>;

    /// Set a named integer uniform declared in the program's [`ShaderDesc`].
    fn set_uniform_i(&mut self, shader: ShaderId, name: &str, value: i32) -> PostFxResult<()>;

    /// Upload a triangle-strip vertex buffer.
    fn create_mesh(&mut self, vertices: &[QuadVertex]) -> PostFxResult<MeshId>;

    /// Destroy an uploaded vertex buffer.
    fn destroy_mesh(&mut self, mesh: MeshId);

    /// Draw a mesh with the given program into the current binding (the
    /// screen when no target is bound), honoring the blend toggle and the
    /// current viewport.
    fn draw(&mut self, mesh: MeshId, shader: ShaderId);
}
