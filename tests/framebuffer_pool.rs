//! Pool lifecycle behavior: bounded recycling, peak accounting, resize
//! invalidation.

mod common;

use common::MockGfx;
use postfx::gfx::TargetDesc;
use postfx::{FrameBufferPool, GfxContext};

fn pool(max: usize) -> FrameBufferPool {
    FrameBufferPool::new(TargetDesc::color(64, 32, false), max)
}

#[test]
fn obtain_constructs_with_pool_config() {
    let mut gfx = MockGfx::new();
    let mut pool = pool(8);

    let buffer = pool.obtain(&mut gfx).unwrap();
    assert_eq!(buffer.width(), 64);
    assert_eq!(buffer.height(), 32);
    assert!(!buffer.has_depth());
    assert_eq!(gfx.created_targets, 1);

    pool.free(&mut gfx, buffer);
    pool.dispose(&mut gfx);
}

#[test]
fn freed_buffer_is_reused() {
    let mut gfx = MockGfx::new();
    let mut pool = pool(8);

    let a = pool.obtain(&mut gfx).unwrap();
    let id = a.target();
    pool.free(&mut gfx, a);
    assert_eq!(pool.free_count(), 1);

    let b = pool.obtain(&mut gfx).unwrap();
    assert_eq!(b.target(), id);
    assert_eq!(gfx.created_targets, 1, "no new target for a pooled obtain");

    pool.free(&mut gfx, b);
    pool.dispose(&mut gfx);
}

#[test]
fn free_past_max_destroys_the_excess_buffer() {
    let mut gfx = MockGfx::new();
    let mut pool = pool(2);

    let a = pool.obtain(&mut gfx).unwrap();
    let b = pool.obtain(&mut gfx).unwrap();
    let c = pool.obtain(&mut gfx).unwrap();
    let c_id = c.target();

    pool.free(&mut gfx, a);
    pool.free(&mut gfx, b);
    pool.free(&mut gfx, c);

    assert_eq!(pool.free_count(), 2);
    assert_eq!(gfx.destroy_count(c_id), 1, "overflow buffer destroyed exactly once");

    pool.dispose(&mut gfx);
}

#[test]
fn free_count_never_exceeds_max() {
    let mut gfx = MockGfx::new();
    let mut pool = pool(3);

    let mut held = Vec::new();
    for _ in 0..6 {
        held.push(pool.obtain(&mut gfx).unwrap());
    }
    for buffer in held {
        pool.free(&mut gfx, buffer);
        assert!(pool.free_count() <= pool.max());
    }
    assert_eq!(pool.free_count(), 3);

    pool.dispose(&mut gfx);
}

#[test]
fn peak_is_monotone_and_tracks_the_high_water_mark() {
    let mut gfx = MockGfx::new();
    let mut pool = pool(8);

    let a = pool.obtain(&mut gfx).unwrap();
    let b = pool.obtain(&mut gfx).unwrap();
    assert_eq!(pool.peak(), 0);

    pool.free(&mut gfx, a);
    pool.free(&mut gfx, b);
    assert_eq!(pool.peak(), 2);

    // Draining the free list does not lower the peak.
    let a = pool.obtain(&mut gfx).unwrap();
    let b = pool.obtain(&mut gfx).unwrap();
    assert_eq!(pool.free_count(), 0);
    assert_eq!(pool.peak(), 2);

    pool.free(&mut gfx, a);
    assert_eq!(pool.peak(), 2);
    pool.free(&mut gfx, b);
    pool.dispose(&mut gfx);
}

#[test]
fn fill_prewarms_up_to_max() {
    let mut gfx = MockGfx::new();
    let mut pool = pool(3);

    pool.fill(&mut gfx, 10).unwrap();
    assert_eq!(pool.free_count(), 3);
    assert_eq!(pool.peak(), 3);
    assert_eq!(gfx.created_targets, 3);

    pool.dispose(&mut gfx);
}

#[test]
fn obtain_does_not_disturb_the_current_binding() {
    let mut gfx = MockGfx::new();
    let mut pool = pool(8);

    let outer = pool.obtain(&mut gfx).unwrap();
    outer.begin(&mut gfx);
    let bound = gfx.bound_target();

    let inner = pool.obtain(&mut gfx).unwrap();
    assert_eq!(gfx.bound_target(), bound, "construction must not rebind");

    outer.end(&mut gfx);
    pool.free(&mut gfx, inner);
    pool.free(&mut gfx, outer);
    pool.dispose(&mut gfx);
}

#[test]
fn resize_to_same_dimensions_keeps_pooled_buffers() {
    let mut gfx = MockGfx::new();
    let mut pool = pool(4);

    pool.fill(&mut gfx, 2).unwrap();
    pool.resize(&mut gfx, 64, 32);

    assert_eq!(pool.free_count(), 2);
    assert!(gfx.destroyed_targets.is_empty());

    pool.dispose(&mut gfx);
}

#[test]
fn resize_to_new_dimensions_discards_and_recreates_lazily() {
    let mut gfx = MockGfx::new();
    let mut pool = pool(4);

    pool.fill(&mut gfx, 2).unwrap();
    pool.resize(&mut gfx, 128, 128);

    assert_eq!(pool.free_count(), 0);
    assert_eq!(gfx.destroyed_targets.len(), 2);

    let buffer = pool.obtain(&mut gfx).unwrap();
    assert_eq!(buffer.width(), 128);
    assert_eq!(buffer.height(), 128);

    pool.free(&mut gfx, buffer);
    pool.dispose(&mut gfx);
}

#[test]
fn free_of_a_stale_sized_buffer_destroys_it() {
    let mut gfx = MockGfx::new();
    let mut pool = pool(4);

    let stale = pool.obtain(&mut gfx).unwrap();
    pool.resize(&mut gfx, 128, 128);

    let stale_id = stale.target();
    pool.free(&mut gfx, stale);
    assert_eq!(pool.free_count(), 0);
    assert_eq!(gfx.destroy_count(stale_id), 1);

    pool.dispose(&mut gfx);
}

#[test]
fn clear_destroys_every_pooled_buffer() {
    let mut gfx = MockGfx::new();
    let mut pool = pool(8);

    pool.fill(&mut gfx, 3).unwrap();
    pool.clear(&mut gfx);

    assert_eq!(pool.free_count(), 0);
    assert_eq!(gfx.destroyed_targets.len(), 3);
    assert!(gfx.live_targets.is_empty());

    pool.dispose(&mut gfx);
}
