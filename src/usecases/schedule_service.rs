//! Loads a tutor's rules and bookings, expands slots, marks conflicts.
//!
//! Full loads re-derive the slot set from scratch; `refresh_window` only
//! re-queries bookings inside the visible range and re-marks (sticky).

use crate::domain::{expand_slots, mark_booked, DomainError, SlotInstance};
use crate::ports::BookingStore;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{debug, info};

/// Schedule service. Turns persisted rules + bookings into rendered slots.
pub struct ScheduleService {
    store: Arc<dyn BookingStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Derive the full bookable slot set for a tutor as of `now`: expand the
    /// weekly rules over the horizon, then mark slots taken by confirmed
    /// bookings. Cheap enough to re-run on every view change.
    pub async fn load_slots(
        &self,
        tutor_id: i64,
        now: NaiveDateTime,
    ) -> Result<Vec<SlotInstance>, DomainError> {
        let rules = self.store.availability_rules(tutor_id).await?;
        let mut slots = expand_slots(&rules, now);

        let bookings = self.store.confirmed_bookings(tutor_id, None).await?;
        mark_booked(&mut slots, &bookings);

        info!(
            tutor_id,
            rules = rules.len(),
            slots = slots.len(),
            booked = slots.iter().filter(|s| s.is_booked).count(),
            "expanded availability"
        );
        Ok(slots)
    }

    /// Incremental refresh: re-query confirmed bookings within [from, to)
    /// and mark matching slots booked. Never flips booked back to available,
    /// so a narrow window cannot corrupt slots outside it. Returns the
    /// number of newly booked slots.
    pub async fn refresh_window(
        &self,
        slots: &mut [SlotInstance],
        tutor_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<usize, DomainError> {
        let bookings = self
            .store
            .confirmed_bookings(tutor_id, Some((from, to)))
            .await?;

        let booked_before = slots.iter().filter(|s| s.is_booked).count();
        mark_booked(slots, &bookings);
        let newly_booked = slots.iter().filter(|s| s.is_booked).count() - booked_before;

        debug!(tutor_id, newly_booked, "window refresh");
        Ok(newly_booked)
    }
}
