//! Haptic feedback kinds and threshold crossing detection.
use strum::{Display, EnumString, IntoStaticStr};

use crate::config::SwipeThresholds;
use crate::offset::DragOrigin;

/// Feedback events handed to the external haptics service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum HapticKind {
    /// Reveal threshold crossed.
    Light,
    /// Revealed button tapped.
    Medium,
    /// Full-swipe threshold crossed.
    Heavy,
    /// Action callback completed.
    Success,
}

/// Fires each threshold haptic at most once per gesture.
#[derive(Debug, Clone, Default)]
pub struct ThresholdHapticScheduler {
    reveal_fired: bool,
    full_swipe_fired: bool,
}

impl ThresholdHapticScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for a new gesture starting at `start_offset`.  Thresholds the card
    /// is already past (a revealed card being dragged again) are treated as
    /// fired, since no crossing happens.  A drag from an open card can never
    /// trigger, so its full-swipe haptic stays silent.
    pub fn begin(
        &mut self,
        origin: DragOrigin,
        start_offset: f64,
        thresholds: &SwipeThresholds,
    ) {
        let magnitude = start_offset.abs();
        self.reveal_fired = magnitude > thresholds.reveal_threshold.abs();
        self.full_swipe_fired = origin == DragOrigin::Revealed
            || magnitude > thresholds.full_swipe_threshold.abs();
    }

    /// Feed the latest effective offset; returns the haptics that fire now.
    /// A single jump past both thresholds yields both, light first.
    pub fn on_offset(
        &mut self,
        offset: f64,
        thresholds: &SwipeThresholds,
        enable_full_swipe: bool,
    ) -> Vec<HapticKind> {
        let mut fired = Vec::new();
        let magnitude = offset.abs();

        if !self.reveal_fired && magnitude > thresholds.reveal_threshold.abs() {
            self.reveal_fired = true;
            fired.push(HapticKind::Light);
        }
        if enable_full_swipe
            && !self.full_swipe_fired
            && magnitude > thresholds.full_swipe_threshold.abs()
        {
            self.full_swipe_fired = true;
            fired.push(HapticKind::Heavy);
        }
        fired
    }

    /// Clear both flags; called on every release or cancel.
    pub fn reset(&mut self) {
        self.reveal_fired = false;
        self.full_swipe_fired = false;
    }

    pub fn reveal_fired(&self) -> bool {
        self.reveal_fired
    }

    pub fn full_swipe_fired(&self) -> bool {
        self.full_swipe_fired
    }
}
