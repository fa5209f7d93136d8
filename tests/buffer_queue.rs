//! Ring rotation and lifecycle of the frame-history buffer queue.

mod common;

use common::MockGfx;
use postfx::gfx::{TargetDesc, TextureFilter, TextureParams};
use postfx::FrameBufferQueue;

#[test]
fn rotation_wraps_around_the_ring() {
    let mut gfx = MockGfx::new();
    let mut queue = FrameBufferQueue::new(&mut gfx, TargetDesc::color(32, 32, false), 3).unwrap();

    let first = queue.current().target();
    let second = queue.change_to_next().target();
    let third = queue.change_to_next().target();
    assert_ne!(first, second);
    assert_ne!(second, third);

    assert_eq!(queue.change_to_next().target(), first, "fourth step wraps to the start");

    queue.dispose(&mut gfx);
}

#[test]
#[should_panic(expected = "at least 1 buffer")]
fn empty_queue_is_rejected() {
    let mut gfx = MockGfx::new();
    let _ = FrameBufferQueue::new(&mut gfx, TargetDesc::color(32, 32, false), 0);
}

#[test]
fn resize_recreates_all_buffers_and_resets_the_cursor() {
    let mut gfx = MockGfx::new();
    let mut queue = FrameBufferQueue::new(&mut gfx, TargetDesc::color(32, 32, false), 2).unwrap();

    let first = queue.current().target();
    queue.change_to_next();
    queue.resize(&mut gfx, 64, 64).unwrap();

    assert_eq!(queue.len(), 2);
    assert_eq!(gfx.destroyed_targets.len(), 2);
    assert_eq!(queue.current().width(), 64);
    assert_ne!(queue.current().target(), first);

    queue.dispose(&mut gfx);
}

#[test]
fn set_texture_params_applies_to_every_buffer() {
    let mut gfx = MockGfx::new();
    let mut queue = FrameBufferQueue::new(&mut gfx, TargetDesc::color(32, 32, false), 2).unwrap();

    let params = TextureParams {
        min_filter: TextureFilter::Linear,
        mag_filter: TextureFilter::Linear,
        ..TextureParams::default()
    };
    queue.set_texture_params(&mut gfx, params);

    assert_eq!(gfx.rebinds.len(), 2);
    assert_eq!(queue.current().desc().params, params);

    queue.dispose(&mut gfx);
}
