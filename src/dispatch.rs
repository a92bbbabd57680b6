//! Single-fire action dispatch.
use log::debug;

use crate::action::SwipeAction;

/// Runs at most one action per input gesture.
///
/// A full-swipe release racing a button tap, or a duplicated release event,
/// reaches the dispatcher twice; only the first call runs the callback.
#[derive(Debug, Clone, Default)]
pub struct ActionDispatcher {
    armed: bool,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow one dispatch for the gesture that is starting.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Invoke `actions[index]` if armed.  Returns whether it ran.
    pub fn dispatch(&mut self, actions: &[SwipeAction], index: usize) -> bool {
        if !self.armed {
            debug!("Dropping duplicate dispatch of action {index}");
            return false;
        }
        let Some(action) = actions.get(index) else {
            debug!("No action at index {index} ({} configured)", actions.len());
            return false;
        };

        self.armed = false;
        action.trigger();
        debug!("Triggered action '{}'", action.display_name());
        true
    }
}
