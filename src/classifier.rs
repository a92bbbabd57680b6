//! Horizontal-intent classification of drag samples.
use std::time::Duration;

/// One drag sample.  Translations are cumulative since the gesture started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub translation_x: f64,
    pub translation_y: f64,
    pub timestamp: Duration,
}

impl GestureSample {
    pub fn new(translation_x: f64, translation_y: f64, timestamp: Duration) -> Self {
        Self {
            translation_x,
            translation_y,
            timestamp,
        }
    }
}

/// Outcome of classifying the latest sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Not (yet) a horizontal swipe; the card must stay untouched.
    Pending,
    /// A horizontal swipe.  Sticky for the rest of the gesture.
    Horizontal,
}

/// Decides whether a gesture is a horizontal swipe candidate.
///
/// Qualifies when `|dx| > |dy| × axis_ratio` and `|dx| > dead_zone`.  Once
/// qualified, later samples are not re-evaluated until [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    axis_ratio: f64,
    dead_zone: f64,
    enabled: bool,
    qualified: bool,
}

impl GestureClassifier {
    pub fn new(axis_ratio: f64, dead_zone: f64, enabled: bool) -> Self {
        Self {
            axis_ratio,
            dead_zone,
            enabled,
            qualified: false,
        }
    }

    /// Start a new gesture.
    pub fn reset(&mut self) {
        self.qualified = false;
    }

    pub fn is_qualified(&self) -> bool {
        self.qualified
    }

    pub fn classify(&mut self, sample: &GestureSample) -> Classification {
        if !self.enabled {
            return Classification::Pending;
        }
        if self.qualified {
            return Classification::Horizontal;
        }

        let horizontal = sample.translation_x.abs();
        let vertical = sample.translation_y.abs();
        // NaN compares false on both sides, so a broken sample never qualifies.
        if horizontal > vertical * self.axis_ratio && horizontal > self.dead_zone {
            self.qualified = true;
            Classification::Horizontal
        } else {
            Classification::Pending
        }
    }
}
