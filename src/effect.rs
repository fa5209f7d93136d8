//! The contract every chained effect implements.

use crate::context::RenderContext;
use crate::framebuffer::PingPongBuffers;
use crate::gfx::GfxContext;

/// A unit of work in the effect chain: one src-to-dst image transform.
///
/// `render` must read exclusively from `buffers.src_buffer()` and write
/// exclusively into `buffers.dst_buffer()` (through the context's
/// [`FrameBufferRenderer`](crate::framebuffer::FrameBufferRenderer) or its own
/// draw calls), and must never swap the wrapper itself. Swap timing between
/// effects belongs to the [`PostFxManager`](crate::manager::PostFxManager);
/// effects stay pure transforms.
pub trait PostFxEffect {
    /// Advance time-dependent effect state.
    fn update(&mut self, delta: f32) {
        let _ = delta;
    }

    /// Notification of the current buffer dimensions. Called when the effect
    /// is added to a chain and on every chain resize, so per-effect resources
    /// can be allocated at the right size.
    fn resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Re-establish GPU state (uniforms, texture parameters) after a context
    /// loss.
    fn rebind(&mut self, gfx: &mut dyn GfxContext) {
        let _ = gfx;
    }

    /// Apply the effect: sample the wrapper's source buffer, draw into its
    /// destination buffer.
    fn render(
        &mut self,
        gfx: &mut dyn GfxContext,
        context: &mut RenderContext,
        buffers: &PingPongBuffers,
    );

    /// Disabled effects are skipped by the chain without any GPU side effect.
    fn is_disabled(&self) -> bool {
        false
    }

    /// Release effect-owned GPU resources.
    fn dispose(&mut self, gfx: &mut dyn GfxContext) {
        let _ = gfx;
    }
}
