//! Recycling pool for off-screen buffers of one fixed configuration.

use crate::error::PostFxResult;
use crate::framebuffer::FrameBuffer;
use crate::gfx::{GfxContext, TargetDesc};

/// A bounded free-list of [`FrameBuffer`]s sharing a single construction
/// descriptor, to avoid per-frame target allocation.
///
/// `obtain` hands ownership of a buffer to the caller; `free` takes it back.
/// Freeing past `max` destroys the excess buffer instead of growing storage.
/// The pool does not detect double-frees at runtime in release builds; the
/// ownership-transfer API makes them a compile-time move error for any one
/// handle, and a `debug_assert!` rejects a duplicate target id that would
/// indicate a hand-constructed alias.
pub struct FrameBufferPool {
    desc: TargetDesc,
    /// The maximum number of free buffers stored in this pool.
    max: usize,
    /// The highest number of free buffers ever held. Never decreases.
    peak: usize,
    free: Vec<FrameBuffer>,
}

impl FrameBufferPool {
    /// Create a pool constructing buffers from `desc`, storing at most `max`
    /// free buffers. Pass `usize::MAX` for an effectively unbounded pool.
    pub fn new(desc: TargetDesc, max: usize) -> Self {
        Self { desc, max, peak: 0, free: Vec::new() }
    }

    /// The construction configuration applied to every new buffer.
    pub fn desc(&self) -> &TargetDesc {
        &self.desc
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// High-water mark of the free list.
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// The number of buffers available to be obtained.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Return a ready-to-use buffer, either freshly constructed with the
    /// pool's fixed configuration or a previously freed one.
    pub fn obtain(&mut self, gfx: &mut dyn GfxContext) -> PostFxResult<FrameBuffer> {
        match self.free.pop() {
            Some(buffer) => Ok(buffer),
            None => FrameBuffer::create(gfx, self.desc),
        }
    }

    /// Put a buffer back into the pool, making it eligible to be returned by
    /// [`obtain`](Self::obtain). If the pool already holds `max` free buffers,
    /// or the buffer was constructed for different dimensions than the pool's
    /// current configuration, the buffer is destroyed instead.
    pub fn free(&mut self, gfx: &mut dyn GfxContext, buffer: FrameBuffer) {
        debug_assert!(
            !self.free.iter().any(|b| b.target() == buffer.target()),
            "buffer {:?} is already in the pool's free list",
            buffer.target()
        );

        let matches_desc = *buffer.desc() == self.desc;
        if matches_desc && self.free.len() < self.max {
            self.free.push(buffer);
            self.peak = self.peak.max(self.free.len());
        } else {
            buffer.dispose(gfx);
        }
    }

    /// Pre-warm the pool with up to `count` new buffers, bounded by `max`.
    pub fn fill(&mut self, gfx: &mut dyn GfxContext, count: usize) -> PostFxResult<()> {
        for _ in 0..count {
            if self.free.len() >= self.max {
                break;
            }
            let buffer = FrameBuffer::create(gfx, self.desc)?;
            self.free.push(buffer);
        }
        self.peak = self.peak.max(self.free.len());
        Ok(())
    }

    /// Change target dimensions for all future constructions. If the
    /// dimensions actually differ, every currently pooled buffer is destroyed
    /// immediately and recreation happens lazily on the next
    /// [`obtain`](Self::obtain).
    pub fn resize(&mut self, gfx: &mut dyn GfxContext, width: u32, height: u32) {
        assert!(width > 0 && height > 0, "pool dimensions must be positive: {}x{}", width, height);
        if self.desc.width == width && self.desc.height == height {
            return;
        }
        log::debug!(
            "framebuffer pool resize {}x{} -> {}x{}, discarding {} pooled buffer(s)",
            self.desc.width,
            self.desc.height,
            width,
            height,
            self.free.len()
        );
        self.desc = self.desc.with_size(width, height);
        self.clear(gfx);
    }

    /// Destroy all currently pooled free buffers.
    pub fn clear(&mut self, gfx: &mut dyn GfxContext) {
        for buffer in self.free.drain(..) {
            buffer.dispose(gfx);
        }
    }

    /// Destroy all pooled buffers and release the pool.
    pub fn dispose(mut self, gfx: &mut dyn GfxContext) {
        self.clear(gfx);
    }
}
