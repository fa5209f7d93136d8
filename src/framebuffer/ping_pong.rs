//! Double-buffer wrapper driving the read/write handoff between chain passes.

use crate::error::PostFxResult;
use crate::framebuffer::FrameBuffer;
use crate::gfx::{Color, GfxContext};

/// A pair of [`FrameBuffer`]s with swappable roles: `dst` is the current
/// write target, `src` the current read source.
///
/// [`begin`](PingPongBuffers::begin) opens `dst` as the active render target
/// and [`end`](PingPongBuffers::end) closes it; between the two, any number of
/// [`swap`](PingPongBuffers::swap) calls exchange the roles while keeping the
/// new `dst` open, which is what lets chained passes write without ever
/// leaving the capture bracket. After `n` swaps from an initial `(A, B)`
/// pairing the roles are `(A, B)` for even `n` and `(B, A)` for odd `n`;
/// callers rely on this parity to predict final buffer identity.
pub struct PingPongBuffers {
    buf_dst: FrameBuffer,
    buf_src: FrameBuffer,
    /// True only between `begin()` and `end()`.
    capturing: bool,
}

impl PingPongBuffers {
    pub fn new(dst: FrameBuffer, src: FrameBuffer) -> Self {
        Self { buf_dst: dst, buf_src: src, capturing: false }
    }

    /// Start capturing into the destination buffer.
    ///
    /// # Panics
    /// If the wrapper is already capturing.
    pub fn begin(&mut self, gfx: &mut dyn GfxContext) {
        assert!(!self.capturing, "ping-pong buffer is already in capturing state");
        self.capturing = true;
        self.buf_dst.begin(gfx);
    }

    /// Stop capturing.
    ///
    /// # Panics
    /// If the wrapper is not capturing.
    pub fn end(&mut self, gfx: &mut dyn GfxContext) {
        assert!(
            self.capturing,
            "ping-pong buffer is not in capturing state; begin() must be called before end()"
        );
        self.buf_dst.end(gfx);
        self.capturing = false;
    }

    /// Exchange the source/destination roles. May be called in either state;
    /// while capturing, the old destination is closed as a render target and
    /// the new one opened, so writes from the very next draw land correctly.
    pub fn swap(&mut self, gfx: &mut dyn GfxContext) {
        if self.capturing {
            self.buf_dst.end(gfx);
        }

        std::mem::swap(&mut self.buf_dst, &mut self.buf_src);

        if self.capturing {
            self.buf_dst.begin(gfx);
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// The read source of the current ping-pong chain.
    pub fn src_buffer(&self) -> &FrameBuffer {
        &self.buf_src
    }

    /// The write destination as of the latest [`swap`](PingPongBuffers::swap).
    pub fn dst_buffer(&self) -> &FrameBuffer {
        &self.buf_dst
    }

    /// Clear both physical buffers with the given color.
    ///
    /// Usable in either state: when idle, an internal bracket is opened and
    /// closed around the clears; when capturing, the external bracket is left
    /// untouched. The two internal swaps cancel out, so the externally
    /// observable dst/src pairing is preserved.
    pub fn clear(&mut self, gfx: &mut dyn GfxContext, color: Color) {
        let was_capturing = self.capturing;
        if !was_capturing {
            self.begin(gfx);
        }

        gfx.clear_current(color);
        self.swap(gfx);
        gfx.clear_current(color);
        self.swap(gfx);

        if !was_capturing {
            self.end(gfx);
        }
    }

    /// Destroy and recreate both buffers at the new dimensions, preserving
    /// format, depth attachment and sampling parameters.
    ///
    /// # Panics
    /// If called inside a capture bracket.
    pub fn resize(
        &mut self,
        gfx: &mut dyn GfxContext,
        width: u32,
        height: u32,
    ) -> PostFxResult<()> {
        assert!(!self.capturing, "cannot resize ping-pong buffers while capturing");
        assert!(width > 0 && height > 0, "buffer dimensions must be positive: {}x{}", width, height);

        let dst_desc = self.buf_dst.desc().with_size(width, height);
        let src_desc = self.buf_src.desc().with_size(width, height);

        let old_dst = std::mem::replace(&mut self.buf_dst, FrameBuffer::create(gfx, dst_desc)?);
        old_dst.dispose(gfx);
        let old_src = std::mem::replace(&mut self.buf_src, FrameBuffer::create(gfx, src_desc)?);
        old_src.dispose(gfx);
        Ok(())
    }

    /// Re-apply sampling parameters on both buffers after a context loss.
    pub fn rebind(&self, gfx: &mut dyn GfxContext) {
        self.buf_dst.rebind(gfx);
        self.buf_src.rebind(gfx);
    }

    /// Destroy both buffers, consuming the wrapper.
    pub fn dispose(self, gfx: &mut dyn GfxContext) {
        self.buf_dst.dispose(gfx);
        self.buf_src.dispose(gfx);
    }
}
