//! Session context for one selected tutor: rendered slots, in-progress
//! selection, and a tutor-scoped realtime subscription.
//!
//! Tutor switch means opening a new session; dropping the old one tears
//! down its subscription, so no stale tutor filter can leak.

use crate::domain::{mark_booked, DomainError, SlotInstance, Tutor};
use crate::ports::{BookingEvents, RealtimeFeed};
use crate::usecases::schedule_service::ScheduleService;
use crate::usecases::selection::{SelectionSet, ToggleOutcome};
use chrono::NaiveDateTime;
use tracing::debug;

/// Everything the display collaborator needs for one tutor: explicit state
/// passed around instead of shared globals.
pub struct BookingSession {
    tutor: Tutor,
    slots: Vec<SlotInstance>,
    pub selection: SelectionSet,
    events: BookingEvents,
}

impl BookingSession {
    /// Open a session: subscribe first (so no booking event can slip between
    /// load and subscribe), then derive the slot set.
    pub async fn open(
        schedule: &ScheduleService,
        feed: &dyn RealtimeFeed,
        tutor: Tutor,
        now: NaiveDateTime,
    ) -> Result<Self, DomainError> {
        let events = feed.subscribe(tutor.id);
        let slots = schedule.load_slots(tutor.id, now).await?;
        Ok(Self {
            tutor,
            slots,
            selection: SelectionSet::new(),
            events,
        })
    }

    pub fn tutor(&self) -> &Tutor {
        &self.tutor
    }

    pub fn slots(&self) -> &[SlotInstance] {
        &self.slots
    }

    /// Apply any pending realtime booking events to the rendered slots.
    /// Duplicate or out-of-order deliveries are harmless because marking is
    /// sticky. Returns the number of slots newly flipped to booked.
    pub fn absorb_pending(&mut self) -> usize {
        let pending = self.events.drain();
        if pending.is_empty() {
            return 0;
        }
        let booked_before = self.slots.iter().filter(|s| s.is_booked).count();
        mark_booked(&mut self.slots, &pending);
        let newly_booked = self.slots.iter().filter(|s| s.is_booked).count() - booked_before;
        debug!(
            tutor_id = self.tutor.id,
            events = pending.len(),
            newly_booked,
            "absorbed realtime bookings"
        );
        newly_booked
    }

    /// Toggle the slot at a display position. None if out of range.
    pub fn toggle_at(&mut self, index: usize) -> Option<ToggleOutcome> {
        let slot = self.slots.get(index)?.clone();
        Some(self.selection.toggle(&slot))
    }

    /// Labels of the chosen slots in insertion order (count + removable list).
    pub fn selection_summary(&self) -> Vec<String> {
        self.selection.iter().map(|s| s.label()).collect()
    }

    /// Post-submission reset: drop the selection and re-derive slots.
    pub async fn reset(
        &mut self,
        schedule: &ScheduleService,
        now: NaiveDateTime,
    ) -> Result<(), DomainError> {
        self.selection.clear();
        self.slots = schedule.load_slots(self.tutor.id, now).await?;
        Ok(())
    }
}
