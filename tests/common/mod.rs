//! Test-only recording implementation of the graphics collaborator.
//!
//! Tracks live targets, the binding stack, texture units and pipeline
//! toggles, and records every draw/clear/toggle so chain behavior is
//! observable without a GPU adapter.
#![allow(dead_code)] // each test binary uses a different subset

use std::collections::{HashMap, HashSet};

use postfx::gfx::{
    Color, GfxContext, MeshId, QuadVertex, ShaderDesc, ShaderId, TargetDesc, TargetId,
    TextureParams,
};
use postfx::PostFxResult;

/// One recorded draw call: the target bound at the time (None = screen), the
/// texture bound to unit 0, and the viewport in effect.
#[derive(Debug, Clone, Copy)]
pub struct DrawRecord {
    pub bound: Option<TargetId>,
    pub unit0: Option<TargetId>,
    pub viewport: (i32, i32, u32, u32),
}

#[derive(Default)]
pub struct MockGfx {
    next_id: u32,

    pub live_targets: HashMap<u32, TargetDesc>,
    pub destroyed_targets: Vec<TargetId>,
    pub created_targets: usize,

    bound: Vec<TargetId>,
    viewport: (i32, i32, u32, u32),

    pub units: HashMap<u32, TargetId>,
    pub active_unit: u32,

    pub blend: bool,
    pub cull_face: bool,
    pub depth_test: bool,
    /// Every blend toggle in call order.
    pub blend_changes: Vec<bool>,

    pub shaders: HashSet<u32>,
    pub meshes: HashSet<u32>,

    /// Clears recorded as (bound target, color).
    pub clears: Vec<(Option<TargetId>, Color)>,
    pub draws: Vec<DrawRecord>,
    pub rebinds: Vec<TargetId>,
}

impl MockGfx {
    pub fn new() -> Self {
        // Route crate logs into the test harness when RUST_LOG is set.
        let _ = env_logger::builder().is_test(true).try_init();
        Self::default()
    }

    pub fn destroy_count(&self, target: TargetId) -> usize {
        self.destroyed_targets.iter().filter(|t| **t == target).count()
    }

    pub fn bind_depth(&self) -> usize {
        self.bound.len()
    }
}

impl GfxContext for MockGfx {
    fn create_target(&mut self, desc: &TargetDesc) -> PostFxResult<TargetId> {
        let id = self.next_id;
        self.next_id += 1;
        self.live_targets.insert(id, *desc);
        self.created_targets += 1;
        Ok(TargetId(id))
    }

    fn destroy_target(&mut self, target: TargetId) {
        assert!(
            self.live_targets.remove(&target.0).is_some(),
            "double destroy of {:?}",
            target
        );
        self.destroyed_targets.push(target);
    }

    fn begin_target(&mut self, target: TargetId) {
        assert!(self.live_targets.contains_key(&target.0), "begin of dead {:?}", target);
        let desc = self.live_targets[&target.0];
        self.bound.push(target);
        self.viewport = (0, 0, desc.width, desc.height);
    }

    fn end_target(&mut self) {
        assert!(self.bound.pop().is_some(), "end_target with empty binding stack");
    }

    fn bound_target(&self) -> Option<TargetId> {
        self.bound.last().copied()
    }

    fn clear_current(&mut self, color: Color) {
        self.clears.push((self.bound_target(), color));
    }

    fn set_texture_params(&mut self, target: TargetId, _params: &TextureParams) {
        self.rebinds.push(target);
    }

    fn bind_texture(&mut self, target: TargetId, unit: u32) {
        assert!(self.live_targets.contains_key(&target.0), "binding dead {:?}", target);
        self.units.insert(unit, target);
    }

    fn set_active_unit(&mut self, unit: u32) {
        self.active_unit = unit;
    }

    fn set_blend(&mut self, enabled: bool) {
        self.blend = enabled;
        self.blend_changes.push(enabled);
    }

    fn set_cull_face(&mut self, enabled: bool) {
        self.cull_face = enabled;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = (x, y, width, height);
    }

    fn compile_shader(&mut self, _desc: &ShaderDesc<'_>) -> PostFxResult<ShaderId> {
        let id = self.next_id;
        self.next_id += 1;
        self.shaders.insert(id);
        Ok(ShaderId(id))
    }

    fn destroy_shader(&mut self, shader: ShaderId) {
        assert!(self.shaders.remove(&shader.0), "double destroy of {:?}", shader);
    }

    fn set_uniform_f(&mut self, _shader: ShaderId, _name: &str, _value: f32) -> PostFxResult<()> {
        Ok(())
    }

    fn set_uniform_i(&mut self, _shader: ShaderId, _name: &str, _value: i32) -> PostFxResult<()> {
        Ok(())
    }

    fn create_mesh(&mut self, _vertices: &[QuadVertex]) -> PostFxResult<MeshId> {
        let id = self.next_id;
        self.next_id += 1;
        self.meshes.insert(id);
        Ok(MeshId(id))
    }

    fn destroy_mesh(&mut self, mesh: MeshId) {
        assert!(self.meshes.remove(&mesh.0), "double destroy of {:?}", mesh);
    }

    fn draw(&mut self, _mesh: MeshId, _shader: ShaderId) {
        self.draws.push(DrawRecord {
            bound: self.bound_target(),
            unit0: self.units.get(&0).copied(),
            viewport: self.viewport,
        });
    }
}
