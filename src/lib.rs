//! Screen-space post-processing effect chain over off-screen buffers.
//!
//! The pipeline captures a rendered scene into an off-screen buffer, runs an
//! ordered chain of image-space effects over it with a ping-pong double
//! buffer, and blits the result to the screen or into another buffer:
//!
//! ```text
//! begin_capture -> scene draws -> end_capture -> apply_effects -> render_to_screen
//! ```
//!
//! [`manager::PostFxManager`] drives that sequence; effects implement
//! [`effect::PostFxEffect`] and stay pure src-to-dst transforms. All GPU
//! access goes through the [`gfx::GfxContext`] collaborator trait, with
//! [`gfx::wgpu_ctx::WgpuContext`] as the wgpu backend.

pub mod context;
pub mod effect;
pub mod error;
pub mod framebuffer;
pub mod gfx;
pub mod manager;

pub use context::RenderContext;
pub use effect::PostFxEffect;
pub use error::{PostFxError, PostFxResult};
pub use framebuffer::{
    FrameBuffer, FrameBufferPool, FrameBufferQueue, FrameBufferRenderer, PingPongBuffers,
};
pub use gfx::{Color, GfxContext};
pub use manager::{EffectKey, PostFxManager};
