//! Off-screen color buffers and the machinery that moves pixels between them.
//!
//! [`FrameBuffer`] is an owned handle to one GPU render target. The handle is
//! only ever produced by [`pool::FrameBufferPool`] (or an in-place resize) and
//! moving the value is the ownership transfer protocol: whoever holds the
//! `FrameBuffer` is the one entity allowed to render into it, and giving it
//! back to the pool consumes it. Use-after-free is therefore a move error at
//! compile time rather than a runtime hazard.

pub mod ping_pong;
pub mod pool;
pub mod queue;
pub mod renderer;

pub use ping_pong::PingPongBuffers;
pub use pool::FrameBufferPool;
pub use queue::FrameBufferQueue;
pub use renderer::FrameBufferRenderer;

use crate::gfx::{GfxContext, TargetDesc, TargetId};

/// An owned off-screen color target with fixed dimensions, pixel format,
/// optional depth attachment and sampling parameters.
///
/// Buffers hold GPU resources, so destruction is explicit via
/// [`dispose`](FrameBuffer::dispose); dropping the handle without disposing
/// leaks the underlying target until the graphics context itself goes away.
#[derive(Debug)]
pub struct FrameBuffer {
    target: TargetId,
    desc: TargetDesc,
}

impl FrameBuffer {
    /// Create a new buffer by allocating a target from the context.
    pub(crate) fn create(
        gfx: &mut dyn GfxContext,
        desc: TargetDesc,
    ) -> crate::error::PostFxResult<Self> {
        let target = gfx.create_target(&desc)?;
        log::debug!(
            "framebuffer created: {:?} {}x{} depth={}",
            target,
            desc.width,
            desc.height,
            desc.has_depth
        );
        Ok(Self { target, desc })
    }

    /// Identity of the underlying render target.
    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn desc(&self) -> &TargetDesc {
        &self.desc
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn has_depth(&self) -> bool {
        self.desc.has_depth
    }

    /// Open this buffer as the active render destination. Brackets nest; the
    /// previous binding is restored by [`end`](FrameBuffer::end).
    pub fn begin(&self, gfx: &mut dyn GfxContext) {
        gfx.begin_target(self.target);
    }

    /// Close the capture bracket opened by [`begin`](FrameBuffer::begin).
    pub fn end(&self, gfx: &mut dyn GfxContext) {
        gfx.end_target();
    }

    /// Bind the color texture to the numbered texture unit for sampling.
    pub fn bind_texture(&self, gfx: &mut dyn GfxContext, unit: u32) {
        gfx.bind_texture(self.target, unit);
    }

    /// Re-apply sampling parameters. Recovery hook after a context loss.
    pub fn rebind(&self, gfx: &mut dyn GfxContext) {
        gfx.set_texture_params(self.target, &self.desc.params);
    }

    /// Destroy the underlying target, consuming the handle.
    pub fn dispose(self, gfx: &mut dyn GfxContext) {
        log::debug!("framebuffer disposed: {:?}", self.target);
        gfx.destroy_target(self.target);
    }
}
