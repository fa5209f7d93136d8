//! Shared pooling and blitting services for the chain and its effects.

use crate::error::PostFxResult;
use crate::framebuffer::{FrameBufferPool, FrameBufferRenderer};
use crate::gfx::{GfxContext, TargetDesc};

/// Bundles the buffer pool and the blit renderer, and tracks the current
/// logical buffer dimensions. One render context is owned by one manager and
/// handed to every effect's render call.
pub struct RenderContext {
    buffer_pool: FrameBufferPool,
    buffer_renderer: FrameBufferRenderer,
    buffer_width: u32,
    buffer_height: u32,
}

impl RenderContext {
    pub fn new(
        gfx: &mut dyn GfxContext,
        width: u32,
        height: u32,
        has_depth: bool,
    ) -> PostFxResult<Self> {
        assert!(
            width > 0 && height > 0,
            "render context dimensions must be positive: {}x{}",
            width,
            height
        );

        let buffer_pool = FrameBufferPool::new(TargetDesc::color(width, height, has_depth), usize::MAX);
        let buffer_renderer = FrameBufferRenderer::new(gfx)?;
        Ok(Self { buffer_pool, buffer_renderer, buffer_width: width, buffer_height: height })
    }

    /// Change the logical buffer dimensions. Propagates to the pool, which
    /// discards its pooled buffers when the dimensions actually differ so
    /// future obtains construct at the new size. Must be called before any
    /// effect relies on the new dimensions.
    pub fn resize(&mut self, gfx: &mut dyn GfxContext, width: u32, height: u32) {
        assert!(
            width > 0 && height > 0,
            "render context dimensions must be positive: {}x{}",
            width,
            height
        );
        self.buffer_width = width;
        self.buffer_height = height;
        self.buffer_pool.resize(gfx, width, height);
    }

    pub fn buffer_pool(&self) -> &FrameBufferPool {
        &self.buffer_pool
    }

    pub fn buffer_pool_mut(&mut self) -> &mut FrameBufferPool {
        &mut self.buffer_pool
    }

    pub fn buffer_renderer(&self) -> &FrameBufferRenderer {
        &self.buffer_renderer
    }

    pub fn buffer_width(&self) -> u32 {
        self.buffer_width
    }

    pub fn buffer_height(&self) -> u32 {
        self.buffer_height
    }

    /// Release the pool and renderer, consuming the context.
    pub fn dispose(self, gfx: &mut dyn GfxContext) {
        self.buffer_pool.dispose(gfx);
        self.buffer_renderer.dispose(gfx);
    }
}
