//! Broadcast-channel hub for booking-created events.
//!
//! Stores publish every created booking to the hub; sessions subscribe with
//! a tutor filter. Filtering happens on the consumer side (BookingEvents),
//! mirroring a topic subscription on one table with a column filter.

use crate::domain::Booking;
use crate::ports::{BookingEvents, RealtimeFeed};
use tokio::sync::broadcast;

/// In-process realtime hub. Cloneable handles come from `publisher()`.
pub struct ChannelFeed {
    tx: broadcast::Sender<Booking>,
}

impl ChannelFeed {
    /// `capacity` bounds how many undelivered events a slow subscriber may
    /// lag behind; lagged receivers skip ahead and recover on the next full
    /// window refresh.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Sender handle for stores to publish created bookings on.
    pub fn publisher(&self) -> broadcast::Sender<Booking> {
        self.tx.clone()
    }
}

impl RealtimeFeed for ChannelFeed {
    fn subscribe(&self, tutor_id: i64) -> BookingEvents {
        BookingEvents::new(tutor_id, self.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookingStatus;
    use chrono::NaiveDate;

    fn booking(tutor_id: i64, hour: u32) -> Booking {
        let start = NaiveDate::from_ymd_opt(2026, 8, 31)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        Booking {
            id: 1,
            tutor_id,
            student_name: "Thandi".into(),
            student_email: "thandi@example.com".into(),
            start,
            end: start + chrono::Duration::hours(1),
            status: BookingStatus::Confirmed,
        }
    }

    #[tokio::test]
    async fn subscription_filters_by_tutor() {
        let feed = ChannelFeed::new(8);
        let publisher = feed.publisher();
        let mut events = feed.subscribe(1);

        publisher.send(booking(2, 9)).unwrap();
        publisher.send(booking(1, 10)).unwrap();

        let received = events.recv().await.unwrap();
        assert_eq!(received.tutor_id, 1);
        assert_eq!(events.drain().len(), 0);
    }

    #[tokio::test]
    async fn drain_returns_all_pending_for_the_tutor() {
        let feed = ChannelFeed::new(8);
        let publisher = feed.publisher();
        let mut events = feed.subscribe(1);

        publisher.send(booking(1, 9)).unwrap();
        publisher.send(booking(2, 9)).unwrap();
        publisher.send(booking(1, 11)).unwrap();

        let pending = events.drain();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|b| b.tutor_id == 1));
    }
}
