//! Per-button reveal progress.
use crate::geometry::CardGeometry;

/// Progress above which a button accepts taps.  Opacity equals progress, so
/// anything tappable is at least half visible.
pub const HIT_TEST_MIN_PROGRESS: f64 = 0.5;

/// Visual transform the view layer applies to one button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonAppearance {
    pub progress: f64,
    pub scale: f64,
    pub opacity: f64,
    pub hit_testable: bool,
}

impl ButtonAppearance {
    fn from_progress(progress: f64) -> Self {
        Self {
            progress,
            scale: 0.8 + 0.2 * progress,
            opacity: progress,
            hit_testable: progress > HIT_TEST_MIN_PROGRESS,
        }
    }
}

/// `1 - (1 - t)^3`
pub fn ease_out_cubic(t: f64) -> f64 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Maps the card offset to a 0..1 progress per action button.
///
/// Buttons uncover from the trailing edge inward: the last action appears
/// first.
#[derive(Debug, Clone, Copy)]
pub struct ButtonRevealProjector {
    geometry: CardGeometry,
    count: usize,
    eased: bool,
}

impl ButtonRevealProjector {
    pub fn new(geometry: CardGeometry, count: usize) -> Self {
        Self {
            geometry,
            count,
            eased: true,
        }
    }

    /// Linear progress instead of the ease-out curve.
    pub fn linear(mut self) -> Self {
        self.eased = false;
        self
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn progress(&self, index: usize, offset: f64) -> f64 {
        let size = self.geometry.button_size;
        if size <= 0.0 || !offset.is_finite() {
            return 0.0;
        }
        let Some(start) = self.geometry.reveal_start(index, self.count) else {
            return 0.0;
        };

        let linear = ((offset.abs() - start) / size).clamp(0.0, 1.0);
        if self.eased { ease_out_cubic(linear) } else { linear }
    }

    pub fn progress_all(&self, offset: f64) -> Vec<f64> {
        (0..self.count).map(|i| self.progress(i, offset)).collect()
    }

    pub fn appearance(&self, index: usize, offset: f64) -> ButtonAppearance {
        ButtonAppearance::from_progress(self.progress(index, offset))
    }

    pub fn appearance_all(&self, offset: f64) -> Vec<ButtonAppearance> {
        (0..self.count).map(|i| self.appearance(i, offset)).collect()
    }

    pub fn is_hit_testable(&self, index: usize, offset: f64) -> bool {
        self.appearance(index, offset).hit_testable
    }
}
