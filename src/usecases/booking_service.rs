//! Submission path: validate locally, then commit one booking per slot,
//! strictly in start order.
//!
//! Inserts are sequential, not transactional. A conflict aborts the rest of
//! the submission but already-committed slots stay committed: the store's
//! uniqueness constraint is the single source of truth for conflicts, so no
//! pre-check or rollback happens here.

use crate::domain::{BookingReceipt, DomainError, NewBooking};
use crate::ports::BookingStore;
use crate::usecases::selection::SelectionSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Booking submitter. Owns nothing but the store handle.
pub struct BookingService {
    store: Arc<dyn BookingStore>,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Commit the selection for a student. Validation failures never reach
    /// the store. On conflict the error reports how many sessions were
    /// already confirmed; those are not rolled back.
    pub async fn submit(
        &self,
        tutor_id: i64,
        student_name: &str,
        student_email: &str,
        selection: &SelectionSet,
    ) -> Result<BookingReceipt, DomainError> {
        if selection.is_empty() {
            return Err(DomainError::Validation(
                "Please select at least one session".into(),
            ));
        }
        let name = student_name.trim();
        let email = student_email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(DomainError::Validation(
                "Please fill in all required fields".into(),
            ));
        }

        let slots = selection.sorted();
        let total = slots.len();
        let mut committed = 0usize;

        for slot in &slots {
            let result = self
                .store
                .insert_booking(&NewBooking {
                    tutor_id,
                    student_name: name.to_string(),
                    student_email: email.to_string(),
                    start: slot.start,
                    end: slot.end,
                })
                .await;

            match result {
                Ok(id) => {
                    committed += 1;
                    info!(tutor_id, booking_id = id, start = %slot.start, "booking committed");
                }
                Err(DomainError::Conflict(_)) => {
                    warn!(
                        tutor_id,
                        start = %slot.start,
                        committed,
                        total,
                        "conflict mid-submission; aborting remaining slots"
                    );
                    return Err(DomainError::Conflict(format!(
                        "One or more slots were just booked by someone else. \
                         {committed} of {total} session(s) were confirmed before the conflict. \
                         Please refresh and try again."
                    )));
                }
                Err(e) => {
                    warn!(tutor_id, start = %slot.start, committed, error = %e, "submission aborted");
                    return Err(e);
                }
            }
        }

        info!(tutor_id, sessions = committed, recipient = email, "booking confirmed");
        Ok(BookingReceipt {
            sessions: committed,
            recipient: email.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::memory_store::MemoryStore;
    use crate::domain::SlotInstance;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn monday(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 31)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn slot(hour: u32) -> SlotInstance {
        SlotInstance {
            tutor_id: 1,
            start: monday(hour),
            end: monday(hour) + Duration::hours(1),
            is_booked: false,
        }
    }

    fn selection_of(hours: &[u32]) -> SelectionSet {
        let mut selection = SelectionSet::new();
        for &h in hours {
            selection.toggle(&slot(h));
        }
        selection
    }

    #[tokio::test]
    async fn empty_selection_is_rejected_locally() {
        let store = Arc::new(MemoryStore::new(None));
        let service = BookingService::new(Arc::clone(&store) as Arc<dyn BookingStore>);

        let err = service
            .submit(1, "Thandi", "thandi@example.com", &SelectionSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(store.insert_calls().await, 0);
    }

    #[tokio::test]
    async fn blank_student_fields_are_rejected_locally() {
        let store = Arc::new(MemoryStore::new(None));
        let service = BookingService::new(Arc::clone(&store) as Arc<dyn BookingStore>);

        let err = service
            .submit(1, "   ", "thandi@example.com", &selection_of(&[9]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(store.insert_calls().await, 0);
    }

    #[tokio::test]
    async fn full_success_reports_count_and_recipient() {
        let store = Arc::new(MemoryStore::new(None));
        let tutor_id = store.add_tutor("Naledi", None).await;
        let service = BookingService::new(Arc::clone(&store) as Arc<dyn BookingStore>);

        let mut selection = SelectionSet::new();
        selection.toggle(&slot(11));
        selection.toggle(&slot(9));

        let receipt = service
            .submit(tutor_id, " Thandi ", " thandi@example.com ", &selection)
            .await
            .unwrap();
        assert_eq!(receipt.sessions, 2);
        assert_eq!(receipt.recipient, "thandi@example.com");

        let booked = store.confirmed_bookings(tutor_id, None).await.unwrap();
        let starts: Vec<_> = booked.iter().map(|b| b.start).collect();
        assert_eq!(starts, vec![monday(9), monday(11)]); // committed in start order
    }

    #[tokio::test]
    async fn conflict_keeps_earlier_commits_and_aborts_the_rest() {
        let store = Arc::new(MemoryStore::new(None));
        let tutor_id = store.add_tutor("Naledi", None).await;

        // Another client grabs 11:00 between selection and submission.
        store
            .insert_booking(&NewBooking {
                tutor_id,
                student_name: "Lerato".into(),
                student_email: "lerato@example.com".into(),
                start: monday(11),
                end: monday(12),
            })
            .await
            .unwrap();

        let service = BookingService::new(Arc::clone(&store) as Arc<dyn BookingStore>);
        let err = service
            .submit(
                tutor_id,
                "Thandi",
                "thandi@example.com",
                &selection_of(&[9, 11, 13]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let booked = store.confirmed_bookings(tutor_id, None).await.unwrap();
        // 09:00 committed and kept; 11:00 belongs to the other client; 13:00 never attempted.
        assert!(booked
            .iter()
            .any(|b| b.start == monday(9) && b.student_name == "Thandi"));
        assert!(booked
            .iter()
            .any(|b| b.start == monday(11) && b.student_name == "Lerato"));
        assert!(!booked.iter().any(|b| b.start == monday(13)));
    }

    #[tokio::test]
    async fn store_failure_surfaces_without_rollback() {
        let store = Arc::new(MemoryStore::new(None));
        let tutor_id = store.add_tutor("Naledi", None).await;
        store.fail_after(1).await;

        let service = BookingService::new(Arc::clone(&store) as Arc<dyn BookingStore>);
        let err = service
            .submit(tutor_id, "Thandi", "thandi@example.com", &selection_of(&[9, 10]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Store(_)));

        let booked = store.confirmed_bookings(tutor_id, None).await.unwrap();
        assert_eq!(booked.len(), 1);
        assert_eq!(booked[0].start, monday(9));
    }
}
