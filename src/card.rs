//! Per-card gesture engine.
//!
//! [`SwipeCard`] is the explicit state container for one list row.  It takes
//! drag samples and discrete release/tap events, and produces:
//!
//! * the reactive values the view binds to (state, offset, per-button
//!   progress), delivered to observers as a [`CardSnapshot`] whenever they
//!   change;
//! * side-channel [`CardEvent`]s (haptics, triggered actions, transitions)
//!   returned from each call.
//!
//! The card knows nothing about platform gesture types; adapters such as
//! [`crate::touch`] translate platform input into [`GestureSample`]s.
use std::time::Duration;

use log::debug;

use crate::action::SwipeAction;
use crate::animation::{OffsetAnimation, SpringSpec};
use crate::classifier::{Classification, GestureClassifier, GestureSample};
use crate::config::{ActionConfig, CardProfile, SwipeThresholds};
use crate::dispatch::ActionDispatcher;
use crate::geometry::CardGeometry;
use crate::haptics::{HapticKind, ThresholdHapticScheduler};
use crate::offset::{DragOrigin, OffsetController};
use crate::projector::{ButtonAppearance, ButtonRevealProjector};
use crate::reveal::{ReleaseOutcome, RevealState, RevealStateMachine};

/// Construction-time configuration, immutable for the card's lifetime.
#[derive(Debug)]
pub struct CardConfig {
    pub actions: Vec<SwipeAction>,
    pub geometry: CardGeometry,
    pub thresholds: SwipeThresholds,
    pub enable_full_swipe: bool,
}

impl CardConfig {
    pub fn new(actions: Vec<SwipeAction>) -> Self {
        Self {
            actions,
            geometry: CardGeometry::default(),
            thresholds: SwipeThresholds::default(),
            enable_full_swipe: false,
        }
    }

    /// Build from a configured profile.  `callback_for` supplies the trigger
    /// callback of each configured action.
    pub fn from_profile(
        profile: &CardProfile,
        mut callback_for: impl FnMut(usize, &ActionConfig) -> Box<dyn Fn()>,
    ) -> Self {
        let actions = profile
            .actions
            .iter()
            .enumerate()
            .map(|(index, action)| {
                SwipeAction::new(
                    action.icon.clone(),
                    action.label.clone(),
                    action.color.clone(),
                    callback_for(index, action),
                )
            })
            .collect();
        Self {
            actions,
            geometry: profile.geometry,
            thresholds: profile.thresholds,
            enable_full_swipe: profile.enable_full_swipe,
        }
    }

    pub fn with_geometry(mut self, geometry: CardGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_thresholds(mut self, thresholds: SwipeThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_full_swipe(mut self, enabled: bool) -> Self {
        self.enable_full_swipe = enabled;
        self
    }
}

/// Discrete output of one input call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardEvent {
    StateChanged { from: RevealState, to: RevealState },
    Haptic(HapticKind),
    ActionTriggered { index: usize },
}

/// Values the view layer binds to.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSnapshot {
    pub state: RevealState,
    pub effective_offset: f64,
    pub visual_offset: f64,
    pub button_progress: Vec<f64>,
}

type Observer = Box<dyn FnMut(&CardSnapshot)>;

pub struct SwipeCard {
    config: CardConfig,
    total_width: f64,
    classifier: GestureClassifier,
    offset: OffsetController,
    machine: RevealStateMachine,
    projector: ButtonRevealProjector,
    haptics: ThresholdHapticScheduler,
    dispatcher: ActionDispatcher,
    animation: Option<OffsetAnimation>,
    gesture_active: bool,
    observers: Vec<Observer>,
    last_notified: Option<CardSnapshot>,
}

impl SwipeCard {
    pub fn new(config: CardConfig) -> Self {
        let count = config.actions.len();
        let th = config.thresholds;
        Self {
            total_width: config.geometry.total_reveal_width(count),
            classifier: GestureClassifier::new(th.axis_ratio, th.dead_zone, count > 0),
            offset: OffsetController::new(th.overscroll),
            machine: RevealStateMachine::new(),
            projector: ButtonRevealProjector::new(config.geometry, count),
            haptics: ThresholdHapticScheduler::new(),
            dispatcher: ActionDispatcher::new(),
            animation: None,
            gesture_active: false,
            observers: Vec::new(),
            last_notified: None,
            config,
        }
    }

    // -- Accessors ------------------------------------------------

    pub fn state(&self) -> RevealState {
        self.machine.state()
    }

    /// Clamped logical offset: the live drag position, or the decided resting
    /// position once a gesture has ended.
    pub fn effective_offset(&self) -> f64 {
        self.offset.effective()
    }

    /// Offset currently on screen, including any in-flight spring.
    pub fn visual_offset(&self) -> f64 {
        self.animation
            .as_ref()
            .map_or_else(|| self.offset.effective(), OffsetAnimation::value)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture_active
    }

    pub fn total_reveal_width(&self) -> f64 {
        self.total_width
    }

    /// Legal `(min, max)` range of the effective offset.
    pub fn offset_bounds(&self) -> (f64, f64) {
        self.offset.bounds(self.total_width)
    }

    pub fn actions(&self) -> &[SwipeAction] {
        &self.config.actions
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn button_progress(&self) -> Vec<f64> {
        self.projector.progress_all(self.visual_offset())
    }

    pub fn button_appearance(&self) -> Vec<ButtonAppearance> {
        self.projector.appearance_all(self.visual_offset())
    }

    /// Button under `tray_x`, measured from the left edge of the open tray.
    pub fn button_at(&self, tray_x: f64) -> Option<usize> {
        self.config
            .geometry
            .button_at(tray_x, self.config.actions.len())
    }

    pub fn snapshot(&self) -> CardSnapshot {
        CardSnapshot {
            state: self.state(),
            effective_offset: self.effective_offset(),
            visual_offset: self.visual_offset(),
            button_progress: self.button_progress(),
        }
    }

    /// Register an observer.  It is called after any input that changes the
    /// snapshot, never twice with the same values.
    pub fn subscribe(&mut self, observer: impl FnMut(&CardSnapshot) + 'static) {
        self.last_notified = Some(self.snapshot());
        self.observers.push(Box::new(observer));
    }

    // -- Input ----------------------------------------------------

    /// Process one drag sample.
    pub fn on_sample(&mut self, sample: GestureSample) -> Vec<CardEvent> {
        let mut events = Vec::new();
        if self.config.actions.is_empty() {
            return events;
        }

        if !self.gesture_active {
            if self.state() == RevealState::Triggering {
                return events;
            }
            self.gesture_active = true;
            self.classifier.reset();
            self.dispatcher.arm();
        }

        if self.classifier.classify(&sample) == Classification::Pending {
            return events;
        }

        if self.state() != RevealState::Dragging {
            let from = self.state();
            let Some(origin) = self.machine.begin_drag() else {
                return events;
            };
            // A new drag overrides whatever spring was still running.
            self.animation = None;
            self.haptics
                .begin(origin, self.offset.effective(), &self.config.thresholds);
            self.transition(&mut events, from, RevealState::Dragging);
        }

        let origin = self.machine.origin().unwrap_or(DragOrigin::Resting);
        let offset = self
            .offset
            .track(origin, sample.translation_x, self.total_width);
        events.extend(
            self.haptics
                .on_offset(offset, &self.config.thresholds, self.config.enable_full_swipe)
                .into_iter()
                .map(CardEvent::Haptic),
        );

        self.finish(events)
    }

    /// End of the gesture.  The outcome is decided from the last offset.
    pub fn on_release(&mut self) -> Vec<CardEvent> {
        let mut events = Vec::new();
        if !self.gesture_active {
            return events;
        }
        self.gesture_active = false;
        self.haptics.reset();
        self.classifier.reset();

        let Some(decision) = self.machine.release(
            self.offset.effective(),
            self.total_width,
            &self.config.thresholds,
            self.config.enable_full_swipe,
        ) else {
            // Never qualified: nothing moved, nothing to undo.
            return self.finish(events);
        };

        self.transition(&mut events, RevealState::Dragging, decision.next_state);
        match decision.outcome {
            ReleaseOutcome::Trigger => {
                let last = self.config.actions.len() - 1;
                self.run_trigger(&mut events, last);
            }
            ReleaseOutcome::Reveal | ReleaseOutcome::SnapBack => {
                self.animate_to(decision.target_offset, SpringSpec::SETTLE);
            }
        }

        self.finish(events)
    }

    /// Platform cancelled the gesture; handled exactly like a release.
    pub fn on_cancel(&mut self) -> Vec<CardEvent> {
        self.on_release()
    }

    /// Tap on the card body: closes an open card without triggering.
    pub fn tap(&mut self) -> Vec<CardEvent> {
        let mut events = Vec::new();
        if self.state() == RevealState::Dragging {
            return events;
        }
        self.gesture_active = false;
        self.classifier.reset();

        if self.machine.dismiss() {
            self.transition(&mut events, RevealState::Revealed, RevealState::Resting);
            self.animate_to(0.0, SpringSpec::DISMISS);
        }
        self.finish(events)
    }

    /// Tap on revealed action button `index`.
    pub fn tap_action(&mut self, index: usize) -> Vec<CardEvent> {
        let mut events = Vec::new();
        if self.state() != RevealState::Revealed {
            debug!("Ignoring tap on action {index} while {}", self.state());
            return events;
        }
        if !self.projector.is_hit_testable(index, self.visual_offset()) {
            debug!("Action {index} is not hit-testable at the current offset");
            return events;
        }

        events.push(CardEvent::Haptic(HapticKind::Medium));
        self.gesture_active = false;
        self.dispatcher.arm();
        if self.machine.begin_trigger() {
            self.transition(&mut events, RevealState::Revealed, RevealState::Triggering);
            self.run_trigger(&mut events, index);
        }
        self.finish(events)
    }

    /// Close an open card on request of the list (another row opened).
    pub fn dismiss(&mut self) -> Vec<CardEvent> {
        let mut events = Vec::new();
        if self.machine.dismiss() {
            self.transition(&mut events, RevealState::Revealed, RevealState::Resting);
            self.animate_to(0.0, SpringSpec::DISMISS);
        }
        self.finish(events)
    }

    /// Snap straight to `Resting`, dropping any gesture and animation.
    /// Used when the row is rebound to a different item.
    pub fn reset(&mut self) -> Vec<CardEvent> {
        let mut events = Vec::new();
        let from = self.state();
        self.machine.reset();
        self.offset.snap_to(0.0);
        self.animation = None;
        self.classifier.reset();
        self.haptics.reset();
        self.dispatcher = ActionDispatcher::new();
        self.gesture_active = false;
        if from != RevealState::Resting {
            self.transition(&mut events, from, RevealState::Resting);
        }
        self.finish(events)
    }

    /// Advance the running spring.  Returns `true` while still animating.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if let Some(animation) = self.animation.as_mut() {
            if animation.tick(dt) {
                self.animation = None;
            }
        }
        self.notify();
        self.animation.is_some()
    }

    // -- Internals ------------------------------------------------

    fn run_trigger(&mut self, events: &mut Vec<CardEvent>, index: usize) {
        if self.dispatcher.dispatch(&self.config.actions, index) {
            events.push(CardEvent::ActionTriggered { index });
            events.push(CardEvent::Haptic(HapticKind::Success));
        }
        if self.machine.finish_trigger() {
            self.transition(events, RevealState::Triggering, RevealState::Resting);
        }
        self.animate_to(0.0, SpringSpec::DISMISS);
    }

    fn animate_to(&mut self, target: f64, spec: SpringSpec) {
        let from = self.visual_offset();
        self.offset.snap_to(target);
        let animation = OffsetAnimation::new(from, target, spec);
        self.animation = (!animation.is_finished()).then_some(animation);
    }

    fn transition(&self, events: &mut Vec<CardEvent>, from: RevealState, to: RevealState) {
        debug!("Card {from} -> {to}");
        events.push(CardEvent::StateChanged { from, to });
    }

    fn finish(&mut self, events: Vec<CardEvent>) -> Vec<CardEvent> {
        self.notify();
        events
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        if self.last_notified.as_ref() == Some(&snapshot) {
            return;
        }
        for observer in &mut self.observers {
            observer(&snapshot);
        }
        self.last_notified = Some(snapshot);
    }
}
