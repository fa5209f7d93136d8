//! Fullscreen-quad blit primitive.

use crate::error::PostFxResult;
use crate::framebuffer::FrameBuffer;
use crate::gfx::{GfxContext, MeshId, QuadVertex, ShaderDesc, ShaderId};

/// Built-in passthrough shader source (WGSL, vertex and fragment in one
/// module).
const BLIT_SHADER: &str = include_str!("../shaders/blit.wgsl");

/// Clip-space triangle strip covering the whole viewport.
const FULLSCREEN_QUAD: [QuadVertex; 4] = [
    QuadVertex { position: [-1.0, -1.0], uv: [0.0, 0.0] },
    QuadVertex { position: [1.0, -1.0], uv: [1.0, 0.0] },
    QuadVertex { position: [-1.0, 1.0], uv: [0.0, 1.0] },
    QuadVertex { position: [1.0, 1.0], uv: [1.0, 1.0] },
];

/// Draws a buffer's texture onto the screen or into another buffer.
///
/// This is the minimal primitive every pass in the chain uses to move pixels:
/// one fullscreen quad, one passthrough shader, the source texture on unit 0.
pub struct FrameBufferRenderer {
    shader: ShaderId,
    mesh: MeshId,
}

impl FrameBufferRenderer {
    pub fn new(gfx: &mut dyn GfxContext) -> PostFxResult<Self> {
        let shader = gfx.compile_shader(&ShaderDesc::passthrough(BLIT_SHADER, BLIT_SHADER))?;
        let mesh = gfx.create_mesh(&FULLSCREEN_QUAD)?;
        Ok(Self { shader, mesh })
    }

    /// The shared viewport quad. Effects drawing their own shaders can reuse
    /// it instead of uploading another copy.
    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    /// Blit `src` onto the screen over the given viewport rectangle.
    ///
    /// No target bracket is opened: the draw lands on whatever is currently
    /// bound, which outside of any bracket is the presentation surface.
    pub fn render_to_screen_at(
        &self,
        gfx: &mut dyn GfxContext,
        src: &FrameBuffer,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) {
        src.bind_texture(gfx, 0);
        gfx.set_viewport(x, y, width, height);
        gfx.draw(self.mesh, self.shader);
    }

    /// Blit `src` onto the screen at the buffer's own dimensions.
    pub fn render_to_screen(&self, gfx: &mut dyn GfxContext, src: &FrameBuffer) {
        self.render_to_screen_at(gfx, src, 0, 0, src.width(), src.height());
    }

    /// Blit `src` into `dst` inside a nested target bracket.
    pub fn render_to_fbo(&self, gfx: &mut dyn GfxContext, src: &FrameBuffer, dst: &FrameBuffer) {
        src.bind_texture(gfx, 0);
        dst.begin(gfx);
        gfx.draw(self.mesh, self.shader);
        dst.end(gfx);
    }

    /// Release the shader and mesh, consuming the renderer.
    pub fn dispose(self, gfx: &mut dyn GfxContext) {
        gfx.destroy_shader(self.shader);
        gfx.destroy_mesh(self.mesh);
    }
}
