//! Reveal state machine and release-time decision logic.
use log::debug;
use strum::{Display, EnumString, IntoStaticStr};

use crate::config::SwipeThresholds;
use crate::offset::DragOrigin;

/// The single source of truth for a card's reveal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RevealState {
    #[default]
    Resting,
    Dragging,
    Revealed,
    Triggering,
}

/// The three mutually exclusive results of releasing a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReleaseOutcome {
    SnapBack,
    Reveal,
    Trigger,
}

/// What happens when a drag ends: computed synchronously, animated later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseDecision {
    pub outcome: ReleaseOutcome,
    pub next_state: RevealState,
    pub target_offset: f64,
}

impl ReleaseDecision {
    fn snap_back() -> Self {
        Self {
            outcome: ReleaseOutcome::SnapBack,
            next_state: RevealState::Resting,
            target_offset: 0.0,
        }
    }

    fn reveal(total: f64) -> Self {
        Self {
            outcome: ReleaseOutcome::Reveal,
            next_state: RevealState::Revealed,
            target_offset: -total,
        }
    }

    fn trigger() -> Self {
        Self {
            outcome: ReleaseOutcome::Trigger,
            next_state: RevealState::Triggering,
            target_offset: 0.0,
        }
    }
}

/// Four-state reveal model.  The enum only changes at gesture boundaries;
/// while dragging, only the numeric offset moves.
#[derive(Debug, Clone, Default)]
pub struct RevealStateMachine {
    state: RevealState,
    origin: Option<DragOrigin>,
}

impl RevealStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    /// Origin of the drag in progress, if any.
    pub fn origin(&self) -> Option<DragOrigin> {
        self.origin
    }

    /// Pure release decision.
    ///
    /// | origin   | condition                                   | outcome  |
    /// |----------|---------------------------------------------|----------|
    /// | Resting  | full swipe enabled, offset < full threshold | Trigger  |
    /// | Resting  | offset < reveal threshold                   | Reveal   |
    /// | Resting  | otherwise                                   | SnapBack |
    /// | Revealed | offset > -total / 2                         | SnapBack |
    /// | Revealed | otherwise                                   | Reveal   |
    pub fn decide(
        origin: DragOrigin,
        offset: f64,
        total: f64,
        thresholds: &SwipeThresholds,
        enable_full_swipe: bool,
    ) -> ReleaseDecision {
        if total <= 0.0 || !offset.is_finite() {
            return ReleaseDecision::snap_back();
        }

        match origin {
            DragOrigin::Resting => {
                if enable_full_swipe && offset < thresholds.full_swipe_threshold {
                    ReleaseDecision::trigger()
                } else if offset < thresholds.reveal_threshold {
                    ReleaseDecision::reveal(total)
                } else {
                    ReleaseDecision::snap_back()
                }
            }
            DragOrigin::Revealed => {
                if offset > -total / 2.0 {
                    ReleaseDecision::snap_back()
                } else {
                    ReleaseDecision::reveal(total)
                }
            }
        }
    }

    /// Enter `Dragging`.  Returns the origin, or `None` when no drag may
    /// start from the current state.
    pub fn begin_drag(&mut self) -> Option<DragOrigin> {
        let origin = match self.state {
            RevealState::Resting => DragOrigin::Resting,
            RevealState::Revealed => DragOrigin::Revealed,
            RevealState::Dragging | RevealState::Triggering => {
                debug!("Ignoring drag start while {}", self.state);
                return None;
            }
        };
        self.state = RevealState::Dragging;
        self.origin = Some(origin);
        Some(origin)
    }

    /// Decide and apply the release transition.  A release outside
    /// `Dragging` is a no-op.
    pub fn release(
        &mut self,
        offset: f64,
        total: f64,
        thresholds: &SwipeThresholds,
        enable_full_swipe: bool,
    ) -> Option<ReleaseDecision> {
        if self.state != RevealState::Dragging {
            debug!("Ignoring release while {}", self.state);
            return None;
        }
        let origin = self.origin.take().unwrap_or(DragOrigin::Resting);
        let decision = Self::decide(origin, offset, total, thresholds, enable_full_swipe);
        self.state = decision.next_state;
        Some(decision)
    }

    /// `Revealed → Triggering` for a direct tap on an action button.
    pub fn begin_trigger(&mut self) -> bool {
        if self.state != RevealState::Revealed {
            return false;
        }
        self.state = RevealState::Triggering;
        true
    }

    /// `Triggering → Resting` once the action has been dispatched.
    pub fn finish_trigger(&mut self) -> bool {
        if self.state != RevealState::Triggering {
            return false;
        }
        self.state = RevealState::Resting;
        true
    }

    /// `Revealed → Resting` without triggering anything.
    pub fn dismiss(&mut self) -> bool {
        if self.state != RevealState::Revealed {
            return false;
        }
        self.state = RevealState::Resting;
        true
    }

    /// Force `Resting`, e.g. when the row is rebound to another item.
    pub fn reset(&mut self) {
        self.state = RevealState::Resting;
        self.origin = None;
    }
}
