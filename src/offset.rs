//! Clamping of raw drag translation into the card's effective offset.

/// Upper limit for the rubber-band slack past the reveal width.
pub const MAX_OVERSCROLL: f64 = 50.0;

/// Which resting state a drag started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOrigin {
    Resting,
    Revealed,
}

/// Holds the card's effective horizontal offset and keeps it inside
/// `[-(total_reveal_width + overscroll), 0]`.
#[derive(Debug, Clone)]
pub struct OffsetController {
    overscroll: f64,
    offset: f64,
}

impl OffsetController {
    pub fn new(overscroll: f64) -> Self {
        Self {
            overscroll: if overscroll.is_finite() {
                overscroll.clamp(0.0, MAX_OVERSCROLL)
            } else {
                0.0
            },
            offset: 0.0,
        }
    }

    /// Pure clamping rule.
    ///
    /// From rest only leftward motion counts.  From an open card the drag is
    /// measured relative to `-total`, so moving right closes it and moving
    /// left gets a little overscroll.
    pub fn clamp(&self, origin: DragOrigin, raw_x: f64, total: f64) -> f64 {
        let raw_x = if raw_x.is_finite() { raw_x } else { 0.0 };
        let total = total.max(0.0);
        match origin {
            DragOrigin::Resting => raw_x.clamp(-(total + self.overscroll), 0.0),
            DragOrigin::Revealed => -total + raw_x.clamp(-self.overscroll, total),
        }
    }

    /// Clamp and store a new sample's offset.
    pub fn track(&mut self, origin: DragOrigin, raw_x: f64, total: f64) -> f64 {
        self.offset = self.clamp(origin, raw_x, total);
        self.offset
    }

    /// Replace the offset with a decided resting position.
    pub fn snap_to(&mut self, target: f64) {
        self.offset = target;
    }

    pub fn effective(&self) -> f64 {
        self.offset
    }

    pub fn overscroll(&self) -> f64 {
        self.overscroll
    }

    /// Legal `(min, max)` range for a given reveal width.
    pub fn bounds(&self, total: f64) -> (f64, f64) {
        (-(total.max(0.0) + self.overscroll), 0.0)
    }
}
