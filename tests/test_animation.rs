//! Tests for `swipecard::animation` - spring settling.
use std::time::Duration;

use swipecard::animation::{OffsetAnimation, SpringSpec};

const FRAME: Duration = Duration::from_millis(16);

fn run_to_end(anim: &mut OffsetAnimation, max_frames: usize) -> Vec<f64> {
    let mut values = Vec::new();
    for _ in 0..max_frames {
        let done = anim.tick(FRAME);
        values.push(anim.value());
        if done {
            break;
        }
    }
    values
}

#[test]
fn test_settles_exactly_on_target() {
    let mut anim = OffsetAnimation::new(-100.0, -140.0, SpringSpec::SETTLE);
    run_to_end(&mut anim, 200);
    assert!(anim.is_finished());
    assert_eq!(anim.value(), -140.0);
    assert_eq!(anim.target(), -140.0);
}

#[test]
fn test_settles_within_a_second() {
    let mut anim = OffsetAnimation::new(-140.0, 0.0, SpringSpec::DISMISS);
    let frames = run_to_end(&mut anim, 63).len();
    assert!(anim.is_finished(), "still moving after {frames} frames");
}

#[test]
fn test_moves_toward_target() {
    let mut anim = OffsetAnimation::new(0.0, -140.0, SpringSpec::SETTLE);
    anim.tick(FRAME);
    assert!(anim.value() < 0.0);
    assert!(!anim.is_finished());
}

#[test]
fn test_no_animation_when_already_there() {
    let mut anim = OffsetAnimation::new(-140.0, -140.0, SpringSpec::SETTLE);
    assert!(anim.is_finished());
    assert!(anim.tick(FRAME));
    assert_eq!(anim.value(), -140.0);
}

#[test]
fn test_one_large_tick_is_stable() {
    let mut anim = OffsetAnimation::new(-190.0, 0.0, SpringSpec::SETTLE);
    assert!(anim.tick(Duration::from_secs(3)));
    assert_eq!(anim.value(), 0.0);
}

#[test]
fn test_spring_parameters() {
    assert_eq!(SpringSpec::default(), SpringSpec::SETTLE);
    assert!(SpringSpec::DISMISS.stiffness() > SpringSpec::SETTLE.stiffness());
    assert!(SpringSpec::SETTLE.damping() > 0.0);
}
