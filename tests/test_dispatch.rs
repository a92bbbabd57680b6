//! Tests for `swipecard::dispatch` and `swipecard::action`.
use std::cell::Cell;
use std::rc::Rc;

use swipecard::action::{ActionPreset, SwipeAction};
use swipecard::dispatch::ActionDispatcher;

fn counted(counter: &Rc<Cell<u32>>) -> impl Fn() + 'static {
    let counter = Rc::clone(counter);
    move || counter.set(counter.get() + 1)
}

// -- ActionDispatcher -----------------------------------------

#[test]
fn test_dispatch_runs_callback_once_per_arm() {
    let hits = Rc::new(Cell::new(0));
    let actions = vec![SwipeAction::delete(counted(&hits))];
    let mut d = ActionDispatcher::new();

    d.arm();
    assert!(d.dispatch(&actions, 0));
    assert!(!d.dispatch(&actions, 0));
    assert_eq!(hits.get(), 1);
    assert!(!d.is_armed());
}

#[test]
fn test_dispatch_without_arm_is_dropped() {
    let hits = Rc::new(Cell::new(0));
    let actions = vec![SwipeAction::add(counted(&hits))];
    let mut d = ActionDispatcher::new();
    assert!(!d.dispatch(&actions, 0));
    assert_eq!(hits.get(), 0);
}

#[test]
fn test_racing_dispatches_only_first_wins() {
    let first = Rc::new(Cell::new(0));
    let second = Rc::new(Cell::new(0));
    let actions = vec![
        SwipeAction::add(counted(&first)),
        SwipeAction::delete(counted(&second)),
    ];
    let mut d = ActionDispatcher::new();
    d.arm();
    assert!(d.dispatch(&actions, 1));
    assert!(!d.dispatch(&actions, 0));
    assert_eq!((first.get(), second.get()), (0, 1));
}

#[test]
fn test_rearm_allows_next_gesture() {
    let hits = Rc::new(Cell::new(0));
    let actions = vec![SwipeAction::add(counted(&hits))];
    let mut d = ActionDispatcher::new();
    for _ in 0..3 {
        d.arm();
        d.dispatch(&actions, 0);
    }
    assert_eq!(hits.get(), 3);
}

#[test]
fn test_out_of_range_index_keeps_arm() {
    let hits = Rc::new(Cell::new(0));
    let actions = vec![SwipeAction::add(counted(&hits))];
    let mut d = ActionDispatcher::new();
    d.arm();
    assert!(!d.dispatch(&actions, 4));
    assert!(d.is_armed());
}

// -- SwipeAction ----------------------------------------------

#[test]
fn test_presets() {
    let delete = SwipeAction::delete(|| {});
    assert_eq!(delete.icon(), "trash.fill");
    assert_eq!(delete.label(), Some("Delete"));
    assert_eq!(delete.color(), "destructive");

    let share = SwipeAction::preset(ActionPreset::Share, || {});
    assert_eq!(share.display_name(), "Share");
}

#[test]
fn test_favorite_icon_reflects_state() {
    assert_eq!(SwipeAction::favorite(false, || {}).icon(), "heart");
    assert_eq!(SwipeAction::favorite(true, || {}).icon(), "heart.fill");
}

#[test]
fn test_custom_action_without_label() {
    let action = SwipeAction::new("flag", None, "#FF0000", || {});
    assert_eq!(action.label(), None);
    assert_eq!(action.display_name(), "flag");
}

#[test]
fn test_preset_names_parse() {
    assert_eq!("archive".parse::<ActionPreset>().unwrap(), ActionPreset::Archive);
    assert!("explode".parse::<ActionPreset>().is_err());
}
