//! In-memory BookingStore for demo mode and tests.
//!
//! Same contract as the SQLite store, including the confirmed
//! (tutor_id, start) uniqueness check, without touching disk.

use crate::domain::{
    AvailabilityRule, Booking, BookingStatus, DomainError, NewBooking, Tutor,
};
use crate::ports::BookingStore;
use chrono::{NaiveDateTime, NaiveTime};
use tokio::sync::{broadcast, RwLock};
use tracing::info;

#[derive(Default)]
struct Inner {
    tutors: Vec<Tutor>,
    rules: Vec<AvailabilityRule>,
    bookings: Vec<Booking>,
    next_id: i64,
    insert_calls: usize,
    /// When set, inserts fail with a Store error once this many more succeed.
    remaining_ok: Option<usize>,
}

/// In-memory store. Safe to share via Arc; all state behind one RwLock.
pub struct MemoryStore {
    inner: RwLock<Inner>,
    events: Option<broadcast::Sender<Booking>>,
}

impl MemoryStore {
    /// `events`: optional realtime hub publisher; every created booking is
    /// broadcast on it, like the SQLite store does.
    pub fn new(events: Option<broadcast::Sender<Booking>>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
            events,
        }
    }

    pub async fn add_tutor(&self, name: &str, subject: Option<&str>) -> i64 {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.tutors.push(Tutor {
            id,
            name: name.to_string(),
            subject: subject.map(str::to_string),
        });
        id
    }

    /// `start`/`end` in "HH:MM". Panics on malformed input: seeding is
    /// programmer-controlled data.
    pub async fn add_rule(&self, tutor_id: i64, day_of_week: u8, start: &str, end: &str) {
        let parse = |s| NaiveTime::parse_from_str(s, "%H:%M").expect("HH:MM rule time");
        let mut inner = self.inner.write().await;
        inner.rules.push(AvailabilityRule {
            tutor_id,
            day_of_week,
            start: parse(start),
            end: parse(end),
        });
    }

    /// Seed a small demo dataset so the TUI is usable out of the box.
    pub async fn seed_demo(&self) {
        let naledi = self.add_tutor("Naledi Dlamini", Some("Mathematics")).await;
        let bongani = self.add_tutor("Bongani Khumalo", Some("Physics")).await;
        // Mon/Wed mornings and Tue/Thu afternoons, one window each.
        self.add_rule(naledi, 1, "09:00", "12:00").await;
        self.add_rule(naledi, 3, "09:00", "12:00").await;
        self.add_rule(bongani, 2, "14:00", "18:00").await;
        self.add_rule(bongani, 4, "14:00", "17:00").await;
        info!("seeded in-memory demo data (2 tutors)");
    }

    /// Test hook: how many insert attempts reached the store.
    pub async fn insert_calls(&self) -> usize {
        self.inner.read().await.insert_calls
    }

    /// Test hook: let `n` more inserts succeed, then fail with a Store error.
    pub async fn fail_after(&self, n: usize) {
        self.inner.write().await.remaining_ok = Some(n);
    }
}

#[async_trait::async_trait]
impl BookingStore for MemoryStore {
    async fn list_tutors(&self) -> Result<Vec<Tutor>, DomainError> {
        let mut tutors = self.inner.read().await.tutors.clone();
        tutors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tutors)
    }

    async fn availability_rules(
        &self,
        tutor_id: i64,
    ) -> Result<Vec<AvailabilityRule>, DomainError> {
        Ok(self
            .inner
            .read()
            .await
            .rules
            .iter()
            .filter(|r| r.tutor_id == tutor_id)
            .cloned()
            .collect())
    }

    async fn confirmed_bookings(
        &self,
        tutor_id: i64,
        window: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> Result<Vec<Booking>, DomainError> {
        let mut bookings: Vec<Booking> = self
            .inner
            .read()
            .await
            .bookings
            .iter()
            .filter(|b| b.tutor_id == tutor_id && b.status == BookingStatus::Confirmed)
            .filter(|b| match window {
                Some((from, to)) => b.start >= from && b.start < to,
                None => true,
            })
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.start);
        Ok(bookings)
    }

    async fn insert_booking(&self, booking: &NewBooking) -> Result<i64, DomainError> {
        let created = {
            let mut inner = self.inner.write().await;
            inner.insert_calls += 1;

            if let Some(remaining) = inner.remaining_ok.as_mut() {
                if *remaining == 0 {
                    return Err(DomainError::Store("injected store failure".into()));
                }
                *remaining -= 1;
            }

            let taken = inner.bookings.iter().any(|b| {
                b.tutor_id == booking.tutor_id
                    && b.start == booking.start
                    && b.status == BookingStatus::Confirmed
            });
            if taken {
                return Err(DomainError::Conflict(format!(
                    "slot {} is already booked",
                    booking.start
                )));
            }

            let id = inner.next_id;
            inner.next_id += 1;
            let created = Booking {
                id,
                tutor_id: booking.tutor_id,
                student_name: booking.student_name.clone(),
                student_email: booking.student_email.clone(),
                start: booking.start,
                end: booking.end,
                status: BookingStatus::Confirmed,
            };
            inner.bookings.push(created.clone());
            created
        };

        if let Some(tx) = &self.events {
            let _ = tx.send(created.clone());
        }
        Ok(created.id)
    }
}
