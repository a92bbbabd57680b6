//! Tests for `swipecard::card` - the per-card gesture engine end to end.
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use swipecard::action::SwipeAction;
use swipecard::card::{CardConfig, CardEvent, CardSnapshot, SwipeCard};
use swipecard::classifier::GestureSample;
use swipecard::config::SwipeThresholds;
use swipecard::geometry::CardGeometry;
use swipecard::haptics::HapticKind;
use swipecard::reveal::RevealState;

// -- Helpers --------------------------------------------------

const SETTLE: Duration = Duration::from_secs(2);

fn counter() -> Rc<Cell<u32>> {
    Rc::new(Cell::new(0))
}

fn counted(counter: &Rc<Cell<u32>>) -> impl Fn() + 'static {
    let counter = Rc::clone(counter);
    move || counter.set(counter.get() + 1)
}

/// Favorite + delete, 70 pt buttons: opens to -140.
fn two_actions(fav: &Rc<Cell<u32>>, del: &Rc<Cell<u32>>) -> CardConfig {
    CardConfig::new(vec![
        SwipeAction::favorite(false, counted(fav)),
        SwipeAction::delete(counted(del)),
    ])
}

/// Wide buttons so the full-swipe threshold is reachable: opens to -280.
fn wide(fav: &Rc<Cell<u32>>, del: &Rc<Cell<u32>>) -> CardConfig {
    two_actions(fav, del).with_geometry(CardGeometry {
        card_height: 100.0,
        button_size: 140.0,
        spacing: 0.0,
        edge_padding: 0.0,
    })
}

fn card() -> SwipeCard {
    SwipeCard::new(two_actions(&counter(), &counter()))
}

fn drag(card: &mut SwipeCard, xs: &[f64]) -> Vec<CardEvent> {
    xs.iter()
        .enumerate()
        .flat_map(|(i, &dx)| {
            card.on_sample(GestureSample::new(dx, 0.0, Duration::from_millis(16 * i as u64)))
        })
        .collect()
}

fn reveal(card: &mut SwipeCard) {
    drag(card, &[-20.0, -100.0]);
    card.on_release();
    card.tick(SETTLE);
    assert_eq!(card.state(), RevealState::Revealed);
}

fn changed(from: RevealState, to: RevealState) -> CardEvent {
    CardEvent::StateChanged { from, to }
}

fn haptics(events: &[CardEvent]) -> Vec<HapticKind> {
    events
        .iter()
        .filter_map(|e| match e {
            CardEvent::Haptic(kind) => Some(*kind),
            _ => None,
        })
        .collect()
}

// -- Classification -------------------------------------------

#[test]
fn test_small_movement_leaves_card_resting() {
    let mut c = card();
    assert!(drag(&mut c, &[-5.0, -10.0]).is_empty());
    assert_eq!(c.state(), RevealState::Resting);
    assert_eq!(c.effective_offset(), 0.0);
}

#[test]
fn test_vertical_scroll_leaves_card_resting() {
    let mut c = card();
    c.on_sample(GestureSample::new(-10.0, 40.0, Duration::ZERO));
    c.on_sample(GestureSample::new(-20.0, 120.0, Duration::from_millis(16)));
    assert!(c.on_release().is_empty());
    assert_eq!(c.state(), RevealState::Resting);
    assert_eq!(c.effective_offset(), 0.0);
}

#[test]
fn test_qualified_drag_enters_dragging() {
    let mut c = card();
    let events = drag(&mut c, &[-20.0]);
    assert_eq!(events, vec![changed(RevealState::Resting, RevealState::Dragging)]);
    assert_eq!(c.effective_offset(), -20.0);
    assert!(c.is_gesture_active());
}

// -- Offset bounds --------------------------------------------

#[test]
fn test_drag_is_clamped_to_overscroll() {
    let mut c = card();
    drag(&mut c, &[-20.0, -1000.0]);
    assert_eq!(c.effective_offset(), -190.0);
    assert_eq!(c.offset_bounds(), (-190.0, 0.0));
}

#[test]
fn test_drag_right_from_rest_stays_at_zero() {
    let mut c = card();
    drag(&mut c, &[30.0, 80.0]);
    assert_eq!(c.state(), RevealState::Dragging);
    assert_eq!(c.effective_offset(), 0.0);
}

// -- Release --------------------------------------------------

#[test]
fn test_short_drag_snaps_back() {
    let mut c = card();
    drag(&mut c, &[-20.0, -60.0]);
    let events = c.on_release();
    assert_eq!(events, vec![changed(RevealState::Dragging, RevealState::Resting)]);
    assert_eq!(c.effective_offset(), 0.0);
    assert_eq!(c.visual_offset(), -60.0);
    assert!(c.is_animating());

    assert!(!c.tick(SETTLE));
    assert_eq!(c.visual_offset(), 0.0);
}

#[test]
fn test_long_drag_reveals_actions() {
    let mut c = card();
    let events = drag(&mut c, &[-20.0, -100.0]);
    assert_eq!(haptics(&events), vec![HapticKind::Light]);

    let events = c.on_release();
    assert_eq!(events, vec![changed(RevealState::Dragging, RevealState::Revealed)]);
    assert_eq!(c.effective_offset(), -140.0);

    c.tick(SETTLE);
    assert_eq!(c.visual_offset(), -140.0);
    assert_eq!(c.button_progress(), vec![1.0, 1.0]);
}

#[test]
fn test_cancel_resolves_like_release() {
    let mut c = card();
    drag(&mut c, &[-20.0, -100.0]);
    c.on_cancel();
    assert_eq!(c.state(), RevealState::Revealed);
    assert!(!c.is_gesture_active());
}

#[test]
fn test_release_without_gesture_is_noop() {
    let mut c = card();
    assert!(c.on_release().is_empty());
    assert_eq!(c.state(), RevealState::Resting);
}

#[test]
fn test_reveal_haptic_fires_once_per_gesture() {
    let mut c = card();
    let events = drag(&mut c, &[-20.0, -90.0, -70.0, -95.0, -60.0, -100.0]);
    assert_eq!(haptics(&events), vec![HapticKind::Light]);
}

// -- Full swipe -----------------------------------------------

#[test]
fn test_full_swipe_triggers_last_action() {
    let (fav, del) = (counter(), counter());
    let mut c = SwipeCard::new(wide(&fav, &del).with_full_swipe(true));

    let events = drag(&mut c, &[-20.0, -100.0, -300.0]);
    assert_eq!(haptics(&events), vec![HapticKind::Light, HapticKind::Heavy]);

    let events = c.on_release();
    assert_eq!(
        events,
        vec![
            changed(RevealState::Dragging, RevealState::Triggering),
            CardEvent::ActionTriggered { index: 1 },
            CardEvent::Haptic(HapticKind::Success),
            changed(RevealState::Triggering, RevealState::Resting),
        ]
    );
    assert_eq!((fav.get(), del.get()), (0, 1));
    assert_eq!(c.state(), RevealState::Resting);
    assert_eq!(c.effective_offset(), 0.0);
}

#[test]
fn test_full_swipe_disabled_reveals_instead() {
    let (fav, del) = (counter(), counter());
    let mut c = SwipeCard::new(wide(&fav, &del));

    let events = drag(&mut c, &[-20.0, -300.0]);
    assert_eq!(haptics(&events), vec![HapticKind::Light]);
    c.on_release();
    assert_eq!(c.state(), RevealState::Revealed);
    assert_eq!(c.effective_offset(), -280.0);
    assert_eq!(del.get(), 0);
}

#[test]
fn test_full_swipe_out_of_reach_reveals() {
    let (fav, del) = (counter(), counter());
    let mut c = SwipeCard::new(two_actions(&fav, &del).with_full_swipe(true));
    drag(&mut c, &[-20.0, -1000.0]);
    c.on_release();
    assert_eq!(c.state(), RevealState::Revealed);
    assert_eq!(del.get(), 0);
}

#[test]
fn test_full_swipe_from_open_card_does_not_trigger() {
    let (fav, del) = (counter(), counter());
    let mut c = SwipeCard::new(wide(&fav, &del).with_full_swipe(true));
    drag(&mut c, &[-20.0, -150.0]);
    c.on_release();
    c.tick(SETTLE);
    assert_eq!(c.state(), RevealState::Revealed);

    drag(&mut c, &[-20.0, -500.0]);
    assert_eq!(c.effective_offset(), -330.0);
    c.on_release();
    assert_eq!(c.state(), RevealState::Revealed);
    assert_eq!(del.get(), 0);
}

#[test]
fn test_repeated_release_after_full_swipe_fires_once() {
    let (fav, del) = (counter(), counter());
    let mut c = SwipeCard::new(wide(&fav, &del).with_full_swipe(true));
    drag(&mut c, &[-20.0, -300.0]);

    assert!(!c.on_release().is_empty());
    assert!(c.on_release().is_empty());
    assert!(c.on_cancel().is_empty());
    assert!(c.tap_action(1).is_empty());
    assert_eq!((fav.get(), del.get()), (0, 1));
    assert_eq!(c.state(), RevealState::Resting);
}

#[test]
fn test_open_card_past_full_threshold_stays_silent() {
    // Three default buttons open to -210, so overscroll reaches -260.
    let (fav, del) = (counter(), counter());
    let mut c = SwipeCard::new(
        CardConfig::new(vec![
            SwipeAction::favorite(false, counted(&fav)),
            SwipeAction::add(|| {}),
            SwipeAction::delete(counted(&del)),
        ])
        .with_full_swipe(true),
    );
    reveal(&mut c);
    assert_eq!(c.effective_offset(), -210.0);

    let events = drag(&mut c, &[-20.0, -50.0]);
    assert_eq!(c.effective_offset(), -260.0);
    assert!(haptics(&events).is_empty());

    c.on_release();
    assert_eq!(c.state(), RevealState::Revealed);
    assert_eq!(del.get(), 0);
}

#[test]
fn test_library_overscroll_is_capped() {
    let th = SwipeThresholds {
        overscroll: 500.0,
        ..SwipeThresholds::default()
    };
    let config = CardConfig::new(vec![SwipeAction::add(|| {})]).with_thresholds(th);
    let mut c = SwipeCard::new(config);
    drag(&mut c, &[-20.0, -1000.0]);
    assert_eq!(c.offset_bounds(), (-120.0, 0.0));
    assert_eq!(c.effective_offset(), -120.0);
}

// -- Button taps ----------------------------------------------

#[test]
fn test_tap_action_runs_callback_and_closes() {
    let (fav, del) = (counter(), counter());
    let mut c = SwipeCard::new(two_actions(&fav, &del));
    reveal(&mut c);

    let events = c.tap_action(0);
    assert_eq!(
        events,
        vec![
            CardEvent::Haptic(HapticKind::Medium),
            changed(RevealState::Revealed, RevealState::Triggering),
            CardEvent::ActionTriggered { index: 0 },
            CardEvent::Haptic(HapticKind::Success),
            changed(RevealState::Triggering, RevealState::Resting),
        ]
    );
    assert_eq!((fav.get(), del.get()), (1, 0));
    assert_eq!(c.effective_offset(), 0.0);
}

#[test]
fn test_double_tap_action_fires_once() {
    let (fav, del) = (counter(), counter());
    let mut c = SwipeCard::new(two_actions(&fav, &del));
    reveal(&mut c);

    c.tap_action(1);
    assert!(c.tap_action(1).is_empty());
    assert_eq!(del.get(), 1);
}

#[test]
fn test_tap_action_on_resting_card_is_ignored() {
    let (fav, del) = (counter(), counter());
    let mut c = SwipeCard::new(two_actions(&fav, &del));
    assert!(c.tap_action(0).is_empty());
    assert_eq!(fav.get(), 0);
}

#[test]
fn test_tap_action_needs_visible_button() {
    let (fav, del) = (counter(), counter());
    let mut c = SwipeCard::new(two_actions(&fav, &del));
    drag(&mut c, &[-20.0, -81.0]);
    c.on_release();
    assert_eq!(c.state(), RevealState::Revealed);

    // The leading button is still mostly hidden until the spring opens it.
    assert!(c.tap_action(0).is_empty());
    assert!(!c.button_appearance()[0].hit_testable);

    c.tick(SETTLE);
    assert!(c.button_appearance()[0].hit_testable);
    assert!(!c.tap_action(0).is_empty());
    assert_eq!(fav.get(), 1);
}

#[test]
fn test_tap_on_body_closes_without_action() {
    let (fav, del) = (counter(), counter());
    let mut c = SwipeCard::new(two_actions(&fav, &del));
    reveal(&mut c);

    let events = c.tap();
    assert_eq!(events, vec![changed(RevealState::Revealed, RevealState::Resting)]);
    assert_eq!((fav.get(), del.get()), (0, 0));
    assert_eq!(c.effective_offset(), 0.0);
}

#[test]
fn test_tap_on_resting_card_is_noop() {
    let mut c = card();
    assert!(c.tap().is_empty());
}

#[test]
fn test_button_at_tray_position() {
    let c = card();
    assert_eq!(c.button_at(10.0), Some(0));
    assert_eq!(c.button_at(100.0), Some(1));
    assert_eq!(c.button_at(150.0), None);
}

// -- Dragging an open card ------------------------------------

#[test]
fn test_open_card_dragged_right_closes() {
    let mut c = card();
    reveal(&mut c);

    let events = drag(&mut c, &[30.0]);
    assert_eq!(events, vec![changed(RevealState::Revealed, RevealState::Dragging)]);
    assert_eq!(c.effective_offset(), -110.0);

    drag(&mut c, &[30.0, 100.0]);
    assert_eq!(c.effective_offset(), -40.0);
    c.on_release();
    assert_eq!(c.state(), RevealState::Resting);
}

#[test]
fn test_open_card_nudged_stays_open() {
    let mut c = card();
    reveal(&mut c);
    let events = drag(&mut c, &[30.0, 40.0]);
    assert!(haptics(&events).is_empty());
    c.on_release();
    assert_eq!(c.state(), RevealState::Revealed);
    assert_eq!(c.effective_offset(), -140.0);
}

#[test]
fn test_new_drag_interrupts_spring() {
    let mut c = card();
    drag(&mut c, &[-20.0, -100.0]);
    c.on_release();
    assert!(c.is_animating());

    drag(&mut c, &[30.0]);
    assert!(!c.is_animating());
    assert_eq!(c.visual_offset(), c.effective_offset());
}

// -- No actions -----------------------------------------------

#[test]
fn test_card_without_actions_never_moves() {
    let mut c = SwipeCard::new(CardConfig::new(Vec::new()));
    assert_eq!(c.total_reveal_width(), 0.0);
    assert!(drag(&mut c, &[-20.0, -200.0]).is_empty());
    assert!(c.on_release().is_empty());
    assert_eq!(c.state(), RevealState::Resting);
    assert_eq!(c.effective_offset(), 0.0);
}

// -- Reset / observers ----------------------------------------

#[test]
fn test_reset_returns_to_rest_immediately() {
    let mut c = card();
    drag(&mut c, &[-20.0, -100.0]);
    c.on_release();

    let events = c.reset();
    assert_eq!(events, vec![changed(RevealState::Revealed, RevealState::Resting)]);
    assert_eq!(c.visual_offset(), 0.0);
    assert!(!c.is_animating());
    assert!(c.reset().is_empty());
}

#[test]
fn test_observer_sees_changes_only() {
    let seen: Rc<RefCell<Vec<CardSnapshot>>> = Rc::default();
    let mut c = card();
    let sink = Rc::clone(&seen);
    c.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.clone()));

    drag(&mut c, &[-5.0]);
    assert!(seen.borrow().is_empty());

    drag(&mut c, &[-20.0]);
    drag(&mut c, &[-20.0]);
    {
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].state, RevealState::Dragging);
        assert_eq!(seen[0].effective_offset, -20.0);
    }

    c.on_release();
    c.tick(SETTLE);
    let last = seen.borrow().last().cloned().unwrap();
    assert_eq!(last, c.snapshot());
    assert_eq!(last.state, RevealState::Resting);
    assert_eq!(last.visual_offset, 0.0);
}
