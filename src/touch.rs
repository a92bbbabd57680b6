//! Touch event classification and translation - no I/O, no hardware, fully testable.
//!
//! Raw multi-touch events are buffered until `SYN_REPORT`, converted into
//! points, assigned to a list row by their start position and turned into
//! [`GestureSample`]s, releases and taps for a [`SwipeList`].  The adapter
//! follows the first finger down.  Events for other multi-touch slots are
//! dropped until it lifts.

use std::fmt;
use std::time::Instant;

use log::trace;

use crate::classifier::GestureSample;
use crate::list::{RowEvent, SwipeList};
use crate::reveal::RevealState;

// -- TouchEvent -----------------------------------------------

/// Intermediate representation of a relevant touch event,
/// decoupled from `evdev` types for testability.
#[derive(Debug, Clone, PartialEq)]
pub enum TouchEvent {
    PositionX(f64),
    PositionY(f64),
    TrackingId(i32),
    /// Following position and tracking events belong to this MT slot.
    Slot(i32),
    FingerUp,
    SynReport,
}

/// Input for a list, produced from raw touches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListInput {
    Sample { slot: usize, sample: GestureSample },
    Release { slot: usize },
    /// Short, stationary touch at `x` points from the row's left edge.
    Tap { slot: usize, x: f64 },
}

// -- Surface --------------------------------------------------

/// Maps device coordinates onto list rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub points_per_unit: f64,
    pub row_height: f64,
    pub rows: usize,
}

impl Surface {
    /// Device coordinates to points relative to the top-left corner.
    pub fn to_points(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.x_range.0) * self.points_per_unit,
            (y - self.y_range.0) * self.points_per_unit,
        )
    }

    /// Row width in points.
    pub fn width(&self) -> f64 {
        (self.x_range.1 - self.x_range.0) * self.points_per_unit
    }

    /// Row under a vertical position in points.
    pub fn row_at(&self, y: f64) -> Option<usize> {
        if self.row_height <= 0.0 || y < 0.0 || !y.is_finite() {
            return None;
        }
        let row = (y / self.row_height) as usize;
        (row < self.rows).then_some(row)
    }
}

// -- TouchTracker ---------------------------------------------

#[derive(Debug, Clone, Copy)]
struct TouchStart {
    x: f64,
    y: f64,
    time: Instant,
    slot: Option<usize>,
}

/// Turns one finger's raw events into list input.
#[derive(Debug)]
pub struct TouchTracker {
    surface: Surface,
    tap_distance_max: f64,

    start: Option<TouchStart>,
    current: Option<(f64, f64)>,
    max_travel: f64,

    pending_x: Option<f64>,
    pending_y: Option<f64>,
    tracking_id: Option<i32>,

    // Current MT slot survives resets; the kernel only reports changes.
    mt_slot: i32,
    followed: Option<i32>,
}

impl TouchTracker {
    pub fn new(surface: Surface, tap_distance_max: f64) -> Self {
        Self {
            surface,
            tap_distance_max,
            start: None,
            current: None,
            max_travel: 0.0,
            pending_x: None,
            pending_y: None,
            tracking_id: None,
            mt_slot: 0,
            followed: None,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Tracking ID of the followed contact.
    pub fn tracking_id(&self) -> Option<i32> {
        self.tracking_id
    }

    /// Row the current touch started on.
    pub fn active_slot(&self) -> Option<usize> {
        self.start.and_then(|s| s.slot)
    }

    /// Reset touch tracking.
    pub fn reset(&mut self) {
        self.start = None;
        self.current = None;
        self.max_travel = 0.0;
        self.pending_x = None;
        self.pending_y = None;
        self.tracking_id = None;
        self.followed = None;
    }

    /// Switch the MT slot that following events refer to.
    pub fn select_slot(&mut self, slot: i32) {
        self.mt_slot = slot;
    }

    /// Whether events for the current MT slot belong to the followed contact.
    pub fn follows_current_slot(&self) -> bool {
        self.followed.is_none_or(|slot| slot == self.mt_slot)
    }

    /// Buffer a pending X coordinate until `SYN_REPORT`.
    pub fn set_pending_x(&mut self, x: f64) {
        self.pending_x = Some(x);
    }

    /// Buffer a pending Y coordinate until `SYN_REPORT`.
    pub fn set_pending_y(&mut self, y: f64) {
        self.pending_y = Some(y);
    }

    /// Remember the tracking ID of the first contact and follow its slot.
    pub fn set_tracking_id(&mut self, id: i32) {
        self.tracking_id.get_or_insert(id);
        self.followed.get_or_insert(self.mt_slot);
    }

    /// Commit buffered X/Y on `SYN_REPORT`.
    pub fn flush_pending(&mut self) -> Option<ListInput> {
        self.flush_pending_at(Instant::now())
    }

    /// Commit buffered X/Y as if the report arrived at `now`.
    pub fn flush_pending_at(&mut self, now: Instant) -> Option<ListInput> {
        if self.pending_x.is_none() && self.pending_y.is_none() {
            return None;
        }

        // Points, not device units; a missing axis keeps its last value.
        let (last_x, last_y) = self.current.unwrap_or((0.0, 0.0));
        let (px, py) = self.surface.to_points(
            self.pending_x.unwrap_or(f64::NAN),
            self.pending_y.unwrap_or(f64::NAN),
        );
        let point = (
            if px.is_nan() { last_x } else { px },
            if py.is_nan() { last_y } else { py },
        );
        self.pending_x = None;
        self.pending_y = None;
        self.current = Some(point);

        let start = *self.start.get_or_insert(TouchStart {
            x: point.0,
            y: point.1,
            time: now,
            slot: self.surface.row_at(point.1),
        });

        let dx = point.0 - start.x;
        let dy = point.1 - start.y;
        self.max_travel = self.max_travel.max(dx.hypot(dy));

        let slot = start.slot?;
        Some(ListInput::Sample {
            slot,
            sample: GestureSample::new(dx, dy, now.saturating_duration_since(start.time)),
        })
    }

    /// Finger lifted: a release, or a tap if the touch barely moved.
    pub fn finger_up(&mut self) -> Option<ListInput> {
        let start = self.start?;
        let slot = start.slot?;
        let x = self.current.map_or(start.x, |(x, _)| x);
        Some(if self.max_travel < self.tap_distance_max {
            ListInput::Tap { slot, x }
        } else {
            ListInput::Release { slot }
        })
    }
}

// -- Core processing ------------------------------------------

/// Feed a sequence of [`TouchEvent`]s through the tracker into a list and
/// collect the resulting row events.  This is the **core event-processing
/// logic** - pure, deterministic, and fully testable without hardware.
pub fn process_touch_events<K: PartialEq + fmt::Debug>(
    tracker: &mut TouchTracker,
    list: &mut SwipeList<K>,
    events: &[TouchEvent],
) -> Vec<RowEvent> {
    let mut out = Vec::new();
    for event in events {
        let other_contact = !tracker.follows_current_slot();
        let input = match event {
            TouchEvent::Slot(slot) => {
                tracker.select_slot(*slot);
                None
            }
            TouchEvent::PositionX(_)
            | TouchEvent::PositionY(_)
            | TouchEvent::TrackingId(_)
            | TouchEvent::FingerUp
                if other_contact =>
            {
                None
            }
            TouchEvent::PositionX(x) => {
                tracker.set_pending_x(*x);
                None
            }
            TouchEvent::PositionY(y) => {
                tracker.set_pending_y(*y);
                None
            }
            TouchEvent::TrackingId(id) => {
                tracker.set_tracking_id(*id);
                None
            }
            TouchEvent::SynReport => tracker.flush_pending(),
            TouchEvent::FingerUp => {
                if let Some(last) = tracker.flush_pending() {
                    out.extend(apply_input(list, tracker.surface(), last));
                }
                let input = tracker.finger_up();
                tracker.reset();
                input
            }
        };
        if let Some(input) = input {
            out.extend(apply_input(list, tracker.surface(), input));
        }
    }
    out
}

/// Route one input to the list.  Taps on an open row are hit-tested
/// against the action tray at the row's trailing edge.
pub fn apply_input<K: PartialEq + fmt::Debug>(
    list: &mut SwipeList<K>,
    surface: &Surface,
    input: ListInput,
) -> Vec<RowEvent> {
    trace!("{input:?}");
    match input {
        ListInput::Sample { slot, sample } => list.on_sample(slot, sample),
        ListInput::Release { slot } => list.on_release(slot),
        ListInput::Tap { slot, x } => {
            // A generous tap radius can swallow a drag that already qualified.
            if list
                .card(slot)
                .is_some_and(|card| card.state() == RevealState::Dragging)
            {
                return list.on_release(slot);
            }
            let button = list
                .card(slot)
                .filter(|card| card.state() == RevealState::Revealed)
                .and_then(|card| {
                    let tray_left = surface.width() - card.total_reveal_width();
                    (x >= tray_left)
                        .then(|| card.button_at(x - tray_left))
                        .flatten()
                });
            match button {
                Some(index) => list.tap_action(slot, index),
                None => list.tap(slot),
            }
        }
    }
}

// -- Helpers --------------------------------------------------

/// Parse a USB vendor:product ID string into `(vendor, product)`.
///
/// Accepts formats like `"1234:5678"` or `"USB:1234:5678"` (case-insensitive).
/// Returns `None` if the format is invalid or the hex values cannot be parsed.
pub fn parse_usb_id(raw: &str) -> Option<(u16, u16)> {
    let cleaned = raw.to_lowercase().replace("usb:", "");
    let (vendor_str, product_str) = cleaned.split_once(':')?;
    let vendor = u16::from_str_radix(vendor_str, 16).ok()?;
    let product = u16::from_str_radix(product_str, 16).ok()?;
    Some((vendor, product))
}

/// Classify a single `evdev::InputEvent` into one of the touch-relevant
/// categories the tracker cares about.  Returns `None` for irrelevant events.
pub fn classify_event(event: &evdev::InputEvent) -> Option<TouchEvent> {
    use evdev::{AbsoluteAxisType, InputEventKind};

    match event.kind() {
        InputEventKind::AbsAxis(axis) => match axis {
            AbsoluteAxisType::ABS_MT_SLOT => Some(TouchEvent::Slot(event.value())),
            AbsoluteAxisType::ABS_MT_POSITION_X => {
                Some(TouchEvent::PositionX(event.value() as f64))
            }
            AbsoluteAxisType::ABS_MT_POSITION_Y => {
                Some(TouchEvent::PositionY(event.value() as f64))
            }
            AbsoluteAxisType::ABS_MT_TRACKING_ID => {
                if event.value() == -1 {
                    Some(TouchEvent::FingerUp)
                } else {
                    Some(TouchEvent::TrackingId(event.value()))
                }
            }
            _ => None,
        },
        InputEventKind::Synchronization(evdev::Synchronization::SYN_REPORT) => {
            Some(TouchEvent::SynReport)
        }
        _ => None,
    }
}
