//! Effect chain orchestration: capture, apply, present.

use crate::context::RenderContext;
use crate::effect::PostFxEffect;
use crate::error::PostFxResult;
use crate::framebuffer::{FrameBuffer, PingPongBuffers};
use crate::gfx::{Color, GfxContext};

/// Registration handle returned by [`PostFxManager::add_effect`], used to
/// remove or re-prioritize an effect later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectKey(u64);

struct EffectEntry {
    effect: Box<dyn PostFxEffect>,
    priority: i32,
    /// Monotonically increasing registration id; doubles as the insertion
    /// order tie-break under the stable priority sort.
    key: u64,
}

/// Handles post-processing effects: captures the rendered scene into an
/// off-screen buffer, applies a chain of effects on it and renders the result
/// to the screen or into another buffer.
///
/// # Call order contract
///
/// The manager is a three-state machine: idle, capturing, applying effects.
/// `begin_capture`/`end_capture` bracket scene rendering, `apply_effects`
/// runs the chain (transiently entering the applying state), and the
/// `render_to_*` methods present the result from the idle state. State-gated
/// methods called in the wrong state panic with a precondition message; such
/// calls are caller bugs, not recoverable conditions.
///
/// Effects run in ascending priority order; equal priorities preserve
/// insertion order.
pub struct PostFxManager {
    context: RenderContext,
    ping_pong: PingPongBuffers,
    effects: Vec<EffectEntry>,
    next_key: u64,

    capturing: bool,
    applying_effects: bool,
    disabled: bool,
    blending_enabled: bool,

    width: u32,
    height: u32,
}

impl PostFxManager {
    /// Create a manager with internal buffers of the given dimensions.
    pub fn new(
        gfx: &mut dyn GfxContext,
        width: u32,
        height: u32,
        has_depth: bool,
    ) -> PostFxResult<Self> {
        let mut context = RenderContext::new(gfx, width, height, has_depth)?;
        let dst = context.buffer_pool_mut().obtain(gfx)?;
        let src = context.buffer_pool_mut().obtain(gfx)?;

        Ok(Self {
            context,
            ping_pong: PingPongBuffers::new(dst, src),
            effects: Vec::new(),
            next_key: 0,
            capturing: false,
            applying_effects: false,
            disabled: false,
            blending_enabled: false,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn is_applying_effects(&self) -> bool {
        self.applying_effects
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disable the whole chain; `apply_effects` becomes a no-op.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_blending_enabled(&self) -> bool {
        self.blending_enabled
    }

    /// Enable alpha blending around the chain and presentation stages to
    /// preserve buffer alpha values. Off by default.
    pub fn set_blending_enabled(&mut self, blending_enabled: bool) {
        self.blending_enabled = blending_enabled;
    }

    /// The last active destination buffer; holds the chain result after
    /// [`apply_effects`](Self::apply_effects).
    pub fn result_buffer(&self) -> &FrameBuffer {
        self.ping_pong.dst_buffer()
    }

    pub fn ping_pong(&self) -> &PingPongBuffers {
        &self.ping_pong
    }

    pub fn render_context(&self) -> &RenderContext {
        &self.context
    }

    pub fn render_context_mut(&mut self) -> &mut RenderContext {
        &mut self.context
    }

    /// Add an effect with priority 0. Effects of equal priority run in
    /// insertion order.
    pub fn add_effect(&mut self, effect: Box<dyn PostFxEffect>) -> EffectKey {
        self.add_effect_with_priority(effect, 0)
    }

    /// Add an effect at the given chain priority (lower runs earlier) and
    /// transfer its ownership to the manager. The effect is immediately
    /// notified of the current buffer dimensions.
    pub fn add_effect_with_priority(
        &mut self,
        mut effect: Box<dyn PostFxEffect>,
        priority: i32,
    ) -> EffectKey {
        effect.resize(self.width, self.height);

        let key = self.next_key;
        self.next_key += 1;
        self.effects.push(EffectEntry { effect, priority, key });
        self.sort_effects();
        EffectKey(key)
    }

    /// Remove an effect from the chain, handing its ownership back.
    pub fn remove_effect(&mut self, key: EffectKey) -> Option<Box<dyn PostFxEffect>> {
        let index = self.effects.iter().position(|e| e.key == key.0)?;
        Some(self.effects.remove(index).effect)
    }

    /// Remove every effect from the chain, handing ownership back.
    pub fn remove_all_effects(&mut self) -> Vec<Box<dyn PostFxEffect>> {
        self.effects.drain(..).map(|e| e.effect).collect()
    }

    /// Change an effect's chain priority. Returns false when the key is no
    /// longer registered.
    pub fn set_effect_priority(&mut self, key: EffectKey, priority: i32) -> bool {
        match self.effects.iter_mut().find(|e| e.key == key.0) {
            Some(entry) => {
                entry.priority = priority;
                self.sort_effects();
                true
            }
            None => false,
        }
    }

    /// True when at least one enabled effect is registered.
    pub fn has_enabled_effects(&self) -> bool {
        self.effects.iter().any(|e| !e.effect.is_disabled())
    }

    fn sort_effects(&mut self) {
        // Stable: equal priorities keep their relative insertion order.
        self.effects.sort_by_key(|e| e.priority);
    }

    /// Forward the frame delta to every effect, in chain order.
    pub fn update(&mut self, delta: f32) {
        for entry in &mut self.effects {
            entry.effect.update(delta);
        }
    }

    /// Clear both internal buffers with [`Color::CLEAR`].
    pub fn clear(&mut self, gfx: &mut dyn GfxContext) {
        self.clear_color(gfx, Color::CLEAR);
    }

    /// Clear both internal buffers with the color specified.
    ///
    /// # Panics
    /// If called while capturing or while applying effects.
    pub fn clear_color(&mut self, gfx: &mut dyn GfxContext, color: Color) {
        assert!(!self.applying_effects, "cannot clear when applying effects");
        assert!(!self.capturing, "cannot clear when capturing");

        self.ping_pong.clear(gfx, color);
    }

    /// Resize the internal buffers and notify the render context (which
    /// invalidates its pool) and every registered effect, enabled or not, in
    /// registration order.
    ///
    /// # Panics
    /// If called while capturing or while applying effects.
    pub fn resize(&mut self, gfx: &mut dyn GfxContext, width: u32, height: u32) -> PostFxResult<()> {
        assert!(!self.applying_effects, "cannot resize when applying effects");
        assert!(!self.capturing, "cannot resize when capturing");

        self.width = width;
        self.height = height;

        self.ping_pong.resize(gfx, width, height)?;
        self.context.resize(gfx, width, height);

        let mut order: Vec<usize> = (0..self.effects.len()).collect();
        order.sort_by_key(|&i| self.effects[i].key);
        for i in order {
            self.effects[i].effect.resize(width, height);
        }
        Ok(())
    }

    /// Starts capturing the scene into the internal destination buffer.
    /// Idempotent while already capturing.
    ///
    /// # Panics
    /// If called while applying effects.
    pub fn begin_capture(&mut self, gfx: &mut dyn GfxContext) {
        assert!(
            !self.applying_effects,
            "capture is not available while the chain is applying effects"
        );

        if self.capturing {
            return;
        }

        self.capturing = true;
        self.ping_pong.begin(gfx);
    }

    /// Stops capturing the scene.
    ///
    /// # Panics
    /// If no capture is in progress.
    pub fn end_capture(&mut self, gfx: &mut dyn GfxContext) {
        assert!(self.capturing, "capture is not started; begin_capture() must be called first");

        self.capturing = false;
        self.ping_pong.end(gfx);
    }

    /// Copy an externally rendered buffer into the internal destination
    /// buffer, establishing it as the captured frame without a capture
    /// bracket.
    ///
    /// # Panics
    /// If called while capturing or while applying effects.
    pub fn use_as_input(&mut self, gfx: &mut dyn GfxContext, input: &FrameBuffer) {
        assert!(!self.capturing, "cannot set the input buffer while capturing");
        assert!(!self.applying_effects, "cannot set the input buffer while applying effects");

        self.context.buffer_renderer().render_to_fbo(gfx, input, self.ping_pong.dst_buffer());
    }

    /// Run the effect chain over the captured frame.
    ///
    /// Skips disabled effects; a disabled chain or an all-disabled effect
    /// list is a true no-op (no swap, no GPU side effects). Otherwise the
    /// wrapper is swapped once so the captured frame becomes the read source,
    /// then each enabled effect renders src into dst with a swap between
    /// consecutive effects. Global pipeline toggles mutated for the chain
    /// (blend per configuration, face culling and depth test off) are scoped
    /// to this call and restored even if an effect panics.
    ///
    /// # Panics
    /// If called while capturing.
    pub fn apply_effects(&mut self, gfx: &mut dyn GfxContext) {
        assert!(!self.capturing, "end_capture() must be called before applying the effects");

        if self.disabled {
            return;
        }

        // Snapshot the enabled subsequence in chain order.
        let active: Vec<usize> = self
            .effects
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.effect.is_disabled())
            .map(|(i, _)| i)
            .collect();

        if active.is_empty() {
            return;
        }

        self.applying_effects = true;

        let Self { effects, context, ping_pong, applying_effects, blending_enabled, .. } = self;
        let mut scope = ChainStateScope::enter(gfx, *blending_enabled, applying_effects);

        // Swap so the captured frame sits in the src buffer.
        ping_pong.swap(scope.gfx());
        ping_pong.begin(scope.gfx());

        for (pos, &i) in active.iter().enumerate() {
            effects[i].effect.render(scope.gfx(), context, ping_pong);
            if pos < active.len() - 1 {
                ping_pong.swap(scope.gfx());
            }
        }

        ping_pong.end(scope.gfx());
        // Scope drop: texture unit 0 re-activated, blend restored, applying
        // flag cleared.
    }

    /// Blit the result buffer onto the screen at the buffer's dimensions.
    ///
    /// # Panics
    /// If called while capturing.
    pub fn render_to_screen(&mut self, gfx: &mut dyn GfxContext) {
        assert!(!self.capturing, "end_capture() must be called before rendering the result");

        let blending = self.blending_enabled;
        if blending {
            gfx.set_blend(true);
        }
        self.context.buffer_renderer().render_to_screen(gfx, self.ping_pong.dst_buffer());
        if blending {
            gfx.set_blend(false);
        }
    }

    /// Blit the result buffer onto the given screen rectangle.
    ///
    /// # Panics
    /// If called while capturing.
    pub fn render_to_screen_at(
        &mut self,
        gfx: &mut dyn GfxContext,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) {
        assert!(!self.capturing, "end_capture() must be called before rendering the result");

        let blending = self.blending_enabled;
        if blending {
            gfx.set_blend(true);
        }
        self.context.buffer_renderer().render_to_screen_at(
            gfx,
            self.ping_pong.dst_buffer(),
            x,
            y,
            width,
            height,
        );
        if blending {
            gfx.set_blend(false);
        }
    }

    /// Blit the result buffer into another off-screen buffer.
    ///
    /// # Panics
    /// If called while capturing.
    pub fn render_to_fbo(&mut self, gfx: &mut dyn GfxContext, output: &FrameBuffer) {
        assert!(!self.capturing, "end_capture() must be called before rendering the result");

        let blending = self.blending_enabled;
        if blending {
            gfx.set_blend(true);
        }
        self.context.buffer_renderer().render_to_fbo(gfx, self.ping_pong.dst_buffer(), output);
        if blending {
            gfx.set_blend(false);
        }
    }

    /// Re-establish texture parameters and effect GPU state after a context
    /// loss.
    pub fn rebind(&mut self, gfx: &mut dyn GfxContext) {
        self.ping_pong.rebind(gfx);
        for entry in &mut self.effects {
            entry.effect.rebind(gfx);
        }
    }

    /// Dispose every owned effect and the internal buffers, consuming the
    /// manager.
    pub fn dispose(mut self, gfx: &mut dyn GfxContext) {
        for entry in &mut self.effects {
            entry.effect.dispose(gfx);
        }
        self.ping_pong.dispose(gfx);
        self.context.dispose(gfx);
    }
}

/// Scoped bracket for the global GPU state the chain mutates.
///
/// Entering enables blending (when configured) and disables face culling and
/// depth testing; dropping re-activates texture unit 0, restores the blend
/// toggle and clears the manager's applying flag. Running the restore in
/// `Drop` keeps global state consistent even when an effect unwinds.
struct ChainStateScope<'a> {
    gfx: &'a mut dyn GfxContext,
    blending: bool,
    applying_flag: &'a mut bool,
}

impl<'a> ChainStateScope<'a> {
    fn enter(gfx: &'a mut dyn GfxContext, blending: bool, applying_flag: &'a mut bool) -> Self {
        if blending {
            gfx.set_blend(true);
        }
        gfx.set_cull_face(false);
        gfx.set_depth_test(false);
        Self { gfx, blending, applying_flag }
    }

    fn gfx(&mut self) -> &mut dyn GfxContext {
        self.gfx
    }
}

impl Drop for ChainStateScope<'_> {
    fn drop(&mut self) {
        // Ensure the default texture unit 0 is active for whoever renders
        // next.
        self.gfx.set_active_unit(0);
        if self.blending {
            self.gfx.set_blend(false);
        }
        *self.applying_flag = false;
    }
}
