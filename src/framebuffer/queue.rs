//! Looped access over a fixed ring of off-screen buffers.
//!
//! Multi-pass effects that need frame history (motion trails, feedback
//! accumulation) rotate through the queue instead of ping-ponging.

use crate::error::PostFxResult;
use crate::framebuffer::FrameBuffer;
use crate::gfx::{GfxContext, TargetDesc, TextureParams};

pub struct FrameBufferQueue {
    buffers: Vec<FrameBuffer>,
    current: usize,
    desc: TargetDesc,
}

impl FrameBufferQueue {
    /// Create a queue of `count` buffers constructed from `desc`.
    ///
    /// # Panics
    /// If `count` is zero.
    pub fn new(gfx: &mut dyn GfxContext, desc: TargetDesc, count: usize) -> PostFxResult<Self> {
        assert!(count >= 1, "frame buffer queue needs at least 1 buffer");

        let mut buffers = Vec::with_capacity(count);
        for _ in 0..count {
            buffers.push(FrameBuffer::create(gfx, desc)?);
        }
        Ok(Self { buffers, current: 0, desc })
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn current(&self) -> &FrameBuffer {
        &self.buffers[self.current]
    }

    /// Advance to the next buffer in the ring and return it.
    pub fn change_to_next(&mut self) -> &FrameBuffer {
        self.current = (self.current + 1) % self.buffers.len();
        self.current()
    }

    /// Destroy and recreate every buffer at the new dimensions.
    pub fn resize(&mut self, gfx: &mut dyn GfxContext, width: u32, height: u32) -> PostFxResult<()> {
        assert!(width > 0 && height > 0, "queue dimensions must be positive: {}x{}", width, height);

        let count = self.buffers.len();
        self.desc = self.desc.with_size(width, height);

        for buffer in self.buffers.drain(..) {
            buffer.dispose(gfx);
        }
        for _ in 0..count {
            self.buffers.push(FrameBuffer::create(gfx, self.desc)?);
        }
        self.current = 0;
        Ok(())
    }

    /// Change the sampling parameters of every buffer, applying them
    /// immediately.
    pub fn set_texture_params(&mut self, gfx: &mut dyn GfxContext, params: TextureParams) {
        self.desc.params = params;
        for buffer in &mut self.buffers {
            // Keep each handle's descriptor in sync so a later rebind uses
            // the updated parameters.
            buffer.desc.params = params;
            buffer.rebind(gfx);
        }
    }

    /// Re-apply sampling parameters after a context loss.
    pub fn rebind(&self, gfx: &mut dyn GfxContext) {
        for buffer in &self.buffers {
            buffer.rebind(gfx);
        }
    }

    /// Destroy every buffer, consuming the queue.
    pub fn dispose(self, gfx: &mut dyn GfxContext) {
        for buffer in self.buffers {
            buffer.dispose(gfx);
        }
    }
}
