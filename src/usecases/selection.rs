//! In-progress multi-slot selection. Pure state, no I/O.
//!
//! Toggle is the only mutation primitive besides remove/clear, so no
//! duplicate start time can ever enter the set.

use crate::domain::SlotInstance;

/// Result of a toggle attempt, for the display collaborator to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The slot is already booked; the set was not touched.
    RejectedBooked,
}

/// The student's chosen, not-yet-submitted slots. Insertion order is kept
/// for display; the submission path re-sorts by start regardless.
#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    chosen: Vec<SlotInstance>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the slot, or remove it if one with the same start is present.
    /// Booked slots are rejected without mutating the set.
    pub fn toggle(&mut self, slot: &SlotInstance) -> ToggleOutcome {
        if slot.is_booked {
            return ToggleOutcome::RejectedBooked;
        }
        if let Some(pos) = self.chosen.iter().position(|s| s.start == slot.start) {
            self.chosen.remove(pos);
            ToggleOutcome::Removed
        } else {
            self.chosen.push(slot.clone());
            ToggleOutcome::Added
        }
    }

    /// Remove by display position. Returns the removed slot, if any.
    pub fn remove(&mut self, index: usize) -> Option<SlotInstance> {
        if index < self.chosen.len() {
            Some(self.chosen.remove(index))
        } else {
            None
        }
    }

    /// Empties the set. Called on tutor switch and after a successful submit.
    pub fn clear(&mut self) {
        self.chosen.clear();
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn contains_start(&self, start: chrono::NaiveDateTime) -> bool {
        self.chosen.iter().any(|s| s.start == start)
    }

    /// Slots in insertion order, for the selection summary.
    pub fn iter(&self) -> impl Iterator<Item = &SlotInstance> {
        self.chosen.iter()
    }

    /// Snapshot sorted by start, the order the submitter commits in.
    pub fn sorted(&self) -> Vec<SlotInstance> {
        let mut slots = self.chosen.clone();
        slots.sort_by_key(|s| s.start);
        slots
    }
}
