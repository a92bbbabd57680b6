//! List container: routes input to rows and keeps at most one row open.
use std::fmt;
use std::time::Duration;

use log::debug;

use crate::card::{CardEvent, CardSnapshot, SwipeCard};
use crate::classifier::GestureSample;
use crate::reveal::RevealState;

/// Tracks which row, if any, is currently revealed.
#[derive(Debug, Clone, Default)]
pub struct RevealCoordinator {
    revealed: Option<usize>,
}

impl RevealCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revealed(&self) -> Option<usize> {
        self.revealed
    }

    /// The open row that has to close before `slot` may open.
    pub fn must_dismiss_for(&self, slot: usize) -> Option<usize> {
        self.revealed.filter(|&open| open != slot)
    }

    /// Record the state `slot` ended up in after an input.
    pub fn record(&mut self, slot: usize, state: RevealState) {
        if state == RevealState::Revealed {
            self.revealed = Some(slot);
        } else if self.revealed == Some(slot) {
            self.revealed = None;
        }
    }

    /// Adjust for a removed row.
    pub fn forget(&mut self, slot: usize) {
        self.revealed = match self.revealed {
            Some(open) if open == slot => None,
            Some(open) if open > slot => Some(open - 1),
            other => other,
        };
    }
}

/// A card event tagged with the row that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowEvent {
    pub slot: usize,
    pub event: CardEvent,
}

/// A mounted row: the bound item's identity and its gesture state.
pub struct ListRow<K> {
    pub item_id: K,
    pub card: SwipeCard,
}

/// Rows of swipeable cards sharing the single-open invariant.
pub struct SwipeList<K> {
    rows: Vec<ListRow<K>>,
    coordinator: RevealCoordinator,
}

impl<K> Default for SwipeList<K> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            coordinator: RevealCoordinator::new(),
        }
    }
}

impl<K: PartialEq + fmt::Debug> SwipeList<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn card(&self, slot: usize) -> Option<&SwipeCard> {
        self.rows.get(slot).map(|row| &row.card)
    }

    pub fn item_id(&self, slot: usize) -> Option<&K> {
        self.rows.get(slot).map(|row| &row.item_id)
    }

    pub fn revealed(&self) -> Option<usize> {
        self.coordinator.revealed()
    }

    /// Mount a row; returns its slot.
    pub fn push(&mut self, item_id: K, card: SwipeCard) -> usize {
        self.rows.push(ListRow { item_id, card });
        self.rows.len() - 1
    }

    /// Unmount a row.  Later rows shift up by one slot.
    pub fn remove(&mut self, slot: usize) -> Option<ListRow<K>> {
        if slot >= self.rows.len() {
            return None;
        }
        self.coordinator.forget(slot);
        Some(self.rows.remove(slot))
    }

    /// Bind a (possibly different) item to `slot`.  A new identity resets
    /// the row's gesture state.
    pub fn rebind(&mut self, slot: usize, item_id: K) -> Vec<RowEvent> {
        let Some(row) = self.rows.get_mut(slot) else {
            return Vec::new();
        };
        if row.item_id == item_id {
            return Vec::new();
        }
        debug!("Row {slot} rebound from {:?} to {item_id:?}", row.item_id);
        row.item_id = item_id;
        let events = row.card.reset();
        self.coordinator.record(slot, row.card.state());
        tag(slot, events)
    }

    /// Register an observer on one row's card.
    pub fn subscribe(
        &mut self,
        slot: usize,
        observer: impl FnMut(&CardSnapshot) + 'static,
    ) -> bool {
        match self.rows.get_mut(slot) {
            Some(row) => {
                row.card.subscribe(observer);
                true
            }
            None => false,
        }
    }

    // -- Input routing --------------------------------------------

    pub fn on_sample(&mut self, slot: usize, sample: GestureSample) -> Vec<RowEvent> {
        let Some(row) = self.rows.get_mut(slot) else {
            return Vec::new();
        };
        let was_dragging = row.card.state() == RevealState::Dragging;
        let events = tag(slot, row.card.on_sample(sample));
        let started = !was_dragging && row.card.state() == RevealState::Dragging;

        let mut out = Vec::new();
        if started {
            // Close the open sibling before this row can reach Revealed.
            out.extend(self.dismiss_others(slot));
        }
        out.extend(events);
        self.sync(slot);
        out
    }

    pub fn on_release(&mut self, slot: usize) -> Vec<RowEvent> {
        let Some(row) = self.rows.get_mut(slot) else {
            return Vec::new();
        };
        let events = tag(slot, row.card.on_release());
        self.settle(slot, events)
    }

    pub fn on_cancel(&mut self, slot: usize) -> Vec<RowEvent> {
        self.on_release(slot)
    }

    pub fn tap(&mut self, slot: usize) -> Vec<RowEvent> {
        if slot >= self.rows.len() {
            return Vec::new();
        }
        let mut out = self.dismiss_others(slot);
        out.extend(tag(slot, self.rows[slot].card.tap()));
        self.sync(slot);
        out
    }

    pub fn tap_action(&mut self, slot: usize, index: usize) -> Vec<RowEvent> {
        let Some(row) = self.rows.get_mut(slot) else {
            return Vec::new();
        };
        let events = tag(slot, row.card.tap_action(index));
        self.settle(slot, events)
    }

    /// Close whichever row is open.
    pub fn dismiss_all(&mut self) -> Vec<RowEvent> {
        let Some(open) = self.coordinator.revealed() else {
            return Vec::new();
        };
        let Some(row) = self.rows.get_mut(open) else {
            self.coordinator.record(open, RevealState::Resting);
            return Vec::new();
        };
        let events = tag(open, row.card.dismiss());
        self.sync(open);
        events
    }

    /// Advance all running springs.  Returns `true` while any row animates.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.rows
            .iter_mut()
            .fold(false, |animating, row| row.card.tick(dt) || animating)
    }

    // -- Internals ------------------------------------------------

    /// After a row may have become Revealed, make sure it is the only one.
    fn settle(&mut self, slot: usize, events: Vec<RowEvent>) -> Vec<RowEvent> {
        let mut out = Vec::new();
        if self.rows[slot].card.state() == RevealState::Revealed {
            out.extend(self.dismiss_others(slot));
        }
        out.extend(events);
        self.sync(slot);
        out
    }

    fn dismiss_others(&mut self, slot: usize) -> Vec<RowEvent> {
        let Some(open) = self.coordinator.must_dismiss_for(slot) else {
            return Vec::new();
        };
        let Some(row) = self.rows.get_mut(open) else {
            self.coordinator.record(open, RevealState::Resting);
            return Vec::new();
        };
        debug!("Dismissing row {open} for row {slot}");
        let events = tag(open, row.card.dismiss());
        self.coordinator.record(open, row.card.state());
        events
    }

    fn sync(&mut self, slot: usize) {
        if let Some(row) = self.rows.get(slot) {
            self.coordinator.record(slot, row.card.state());
        }
    }
}

fn tag(slot: usize, events: Vec<CardEvent>) -> Vec<RowEvent> {
    events
        .into_iter()
        .map(|event| RowEvent { slot, event })
        .collect()
}
