//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{AvailabilityRule, Booking, DomainError, NewBooking, Tutor};
use chrono::NaiveDateTime;
use tokio::sync::broadcast;

/// Persistence port. The store owns the uniqueness invariant: no two
/// confirmed bookings for the same tutor share a start time.
#[async_trait::async_trait]
pub trait BookingStore: Send + Sync {
    /// All tutors, ordered by name.
    async fn list_tutors(&self) -> Result<Vec<Tutor>, DomainError>;

    /// Weekly availability rules for one tutor, in stable store order.
    async fn availability_rules(&self, tutor_id: i64)
        -> Result<Vec<AvailabilityRule>, DomainError>;

    /// Confirmed bookings for one tutor. With `window = Some((from, to))`
    /// only bookings with `from <= start < to` are returned, supporting
    /// incremental refresh of the visible date range.
    async fn confirmed_bookings(
        &self,
        tutor_id: i64,
        window: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> Result<Vec<Booking>, DomainError>;

    /// Insert exactly one confirmed booking. Returns the created id, or
    /// `DomainError::Conflict` when the (tutor_id, start) pair is already
    /// claimed by a confirmed booking. The insert is the serialization
    /// point; callers never pre-check availability.
    async fn insert_booking(&self, booking: &NewBooking) -> Result<i64, DomainError>;
}

/// Realtime port. Streams booking-created events so other viewers' bookings
/// show up without a manual reload.
pub trait RealtimeFeed: Send + Sync {
    /// Subscribe to bookings created for one tutor. The returned handle is
    /// the teardown: drop it to unsubscribe (e.g. on tutor switch).
    fn subscribe(&self, tutor_id: i64) -> BookingEvents;
}

/// Tutor-scoped event stream. Delivery is at-least-once and unordered;
/// consumers stay correct because booked-marking is sticky.
pub struct BookingEvents {
    tutor_id: i64,
    rx: broadcast::Receiver<Booking>,
}

impl BookingEvents {
    pub fn new(tutor_id: i64, rx: broadcast::Receiver<Booking>) -> Self {
        Self { tutor_id, rx }
    }

    pub fn tutor_id(&self) -> i64 {
        self.tutor_id
    }

    /// Await the next booking for this tutor. Events for other tutors are
    /// skipped; a lagged receiver keeps going (missed events are recovered
    /// by the next full window refresh). Returns None when the hub is gone.
    pub async fn recv(&mut self) -> Option<Booking> {
        loop {
            match self.rx.recv().await {
                Ok(booking) if booking.tutor_id == self.tutor_id => return Some(booking),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Drain without waiting. Returns whatever is pending for this tutor.
    pub fn drain(&mut self) -> Vec<Booking> {
        let mut pending = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(booking) if booking.tutor_id == self.tutor_id => pending.push(booking),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        pending
    }
}
