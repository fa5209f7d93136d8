//! Ping-pong wrapper protocol: capture brackets, swap parity, state-dependent
//! clear and resize.

mod common;

use common::MockGfx;
use postfx::gfx::{Color, TargetDesc, TargetId};
use postfx::{FrameBufferPool, GfxContext, PingPongBuffers};

fn wrapper(gfx: &mut MockGfx) -> (PingPongBuffers, FrameBufferPool) {
    let mut pool = FrameBufferPool::new(TargetDesc::color(64, 64, false), usize::MAX);
    let dst = pool.obtain(gfx).unwrap();
    let src = pool.obtain(gfx).unwrap();
    (PingPongBuffers::new(dst, src), pool)
}

fn ids(buffers: &PingPongBuffers) -> (TargetId, TargetId) {
    (buffers.dst_buffer().target(), buffers.src_buffer().target())
}

#[test]
fn swap_parity_alternates_roles() {
    let mut gfx = MockGfx::new();
    let (mut buffers, _pool) = wrapper(&mut gfx);

    let (a, b) = ids(&buffers);
    for n in 1..=5 {
        buffers.swap(&mut gfx);
        if n % 2 == 0 {
            assert_eq!(ids(&buffers), (a, b), "even swap count restores the pairing");
        } else {
            assert_eq!(ids(&buffers), (b, a), "odd swap count exchanges the pairing");
        }
    }
}

#[test]
fn begin_end_without_swap_keeps_the_pairing() {
    let mut gfx = MockGfx::new();
    let (mut buffers, _pool) = wrapper(&mut gfx);

    let before = ids(&buffers);
    buffers.begin(&mut gfx);
    assert!(buffers.is_capturing());
    assert_eq!(gfx.bound_target(), Some(before.0), "dst is the open render target");
    buffers.end(&mut gfx);

    assert!(!buffers.is_capturing());
    assert_eq!(ids(&buffers), before);
    assert_eq!(gfx.bind_depth(), 0);
}

#[test]
#[should_panic(expected = "already in capturing state")]
fn begin_twice_panics() {
    let mut gfx = MockGfx::new();
    let (mut buffers, _pool) = wrapper(&mut gfx);

    buffers.begin(&mut gfx);
    buffers.begin(&mut gfx);
}

#[test]
#[should_panic(expected = "not in capturing state")]
fn end_without_begin_panics() {
    let mut gfx = MockGfx::new();
    let (mut buffers, _pool) = wrapper(&mut gfx);

    buffers.end(&mut gfx);
}

#[test]
fn swap_while_capturing_reopens_the_new_destination() {
    let mut gfx = MockGfx::new();
    let (mut buffers, _pool) = wrapper(&mut gfx);
    let (a, b) = ids(&buffers);

    buffers.begin(&mut gfx);
    assert_eq!(gfx.bound_target(), Some(a));

    buffers.swap(&mut gfx);
    assert_eq!(gfx.bound_target(), Some(b), "swap closes the old dst and opens the new one");
    assert_eq!(gfx.bind_depth(), 1, "still exactly one open bracket");

    buffers.end(&mut gfx);
    assert_eq!(gfx.bind_depth(), 0);
}

#[test]
fn clear_while_idle_clears_both_and_closes_its_bracket() {
    let mut gfx = MockGfx::new();
    let (mut buffers, _pool) = wrapper(&mut gfx);
    let before = ids(&buffers);

    buffers.clear(&mut gfx, Color::CLEAR);

    assert!(!buffers.is_capturing());
    assert_eq!(ids(&buffers), before, "pairing preserved across clear");
    assert_eq!(gfx.bind_depth(), 0);

    let cleared: Vec<_> = gfx.clears.iter().filter_map(|(t, _)| *t).collect();
    assert_eq!(cleared.len(), 2);
    assert!(cleared.contains(&before.0));
    assert!(cleared.contains(&before.1));
}

#[test]
fn clear_while_capturing_preserves_the_external_bracket() {
    let mut gfx = MockGfx::new();
    let (mut buffers, _pool) = wrapper(&mut gfx);
    let before = ids(&buffers);

    buffers.begin(&mut gfx);
    buffers.clear(&mut gfx, Color::BLACK);

    assert!(buffers.is_capturing());
    assert_eq!(ids(&buffers), before);
    assert_eq!(gfx.bound_target(), Some(before.0), "dst is still the open target");
    assert_eq!(gfx.bind_depth(), 1);

    buffers.end(&mut gfx);
}

#[test]
fn resize_recreates_both_buffers() {
    let mut gfx = MockGfx::new();
    let (mut buffers, _pool) = wrapper(&mut gfx);
    let (old_dst, old_src) = ids(&buffers);

    buffers.resize(&mut gfx, 128, 256).unwrap();

    assert_eq!(buffers.dst_buffer().width(), 128);
    assert_eq!(buffers.dst_buffer().height(), 256);
    assert_eq!(buffers.src_buffer().width(), 128);
    assert_eq!(gfx.destroy_count(old_dst), 1);
    assert_eq!(gfx.destroy_count(old_src), 1);

    let (new_dst, new_src) = ids(&buffers);
    assert_ne!(new_dst, old_dst);
    assert_ne!(new_src, old_src);
}

#[test]
#[should_panic(expected = "cannot resize ping-pong buffers while capturing")]
fn resize_while_capturing_panics() {
    let mut gfx = MockGfx::new();
    let (mut buffers, _pool) = wrapper(&mut gfx);

    buffers.begin(&mut gfx);
    let _ = buffers.resize(&mut gfx, 128, 128);
}

#[test]
fn rebind_reapplies_params_on_both_buffers() {
    let mut gfx = MockGfx::new();
    let (buffers, _pool) = wrapper(&mut gfx);
    let (a, b) = ids(&buffers);

    buffers.rebind(&mut gfx);

    assert!(gfx.rebinds.contains(&a));
    assert!(gfx.rebinds.contains(&b));
}
