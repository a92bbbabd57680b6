//! Card and action-button geometry.
//!
//! All values are in device-independent points.  The same reveal-width
//! formula drives offset clamping, button projection and tray hit-testing,
//! so the three always agree.

/// Per-card layout constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardGeometry {
    pub card_height: f64,
    pub button_size: f64,
    pub spacing: f64,
    pub edge_padding: f64,
}

impl Default for CardGeometry {
    fn default() -> Self {
        Self {
            card_height: 100.0,
            button_size: 70.0,
            spacing: 0.0,
            edge_padding: 0.0,
        }
    }
}

impl CardGeometry {
    /// Width of the action tray when `count` actions are pinned open.
    ///
    /// `count × button + (count − 1) × spacing + 2 × padding`, or `0` when
    /// there is nothing to reveal.  Negative inputs collapse to `0`.
    pub fn total_reveal_width(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let n = count as f64;
        let width = n * self.button_size + (n - 1.0) * self.spacing + 2.0 * self.edge_padding;
        if width.is_finite() { width.max(0.0) } else { 0.0 }
    }

    /// Distance from the trailing edge at which button `index` starts to
    /// uncover.  The last action sits nearest the edge and uncovers first.
    pub fn reveal_start(&self, index: usize, count: usize) -> Option<f64> {
        if index >= count {
            return None;
        }
        let reverse_index = (count - 1 - index) as f64;
        Some(self.edge_padding + reverse_index * (self.button_size + self.spacing))
    }

    /// Horizontal span `[left, right)` of button `index`, measured from the
    /// left edge of the tray.
    pub fn button_span(&self, index: usize, count: usize) -> Option<(f64, f64)> {
        if index >= count {
            return None;
        }
        let left = self.edge_padding + index as f64 * (self.button_size + self.spacing);
        Some((left, left + self.button_size))
    }

    /// Which button (if any) lies under `x`, measured from the tray's left edge.
    pub fn button_at(&self, x: f64, count: usize) -> Option<usize> {
        (0..count).find(|&i| {
            self.button_span(i, count)
                .is_some_and(|(left, right)| x >= left && x < right)
        })
    }
}
