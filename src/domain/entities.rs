//! Domain entities. Pure data structures for the core business.
//!
//! No SQL/UI types here — these are mapped from adapters.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A tutor offering bookable sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tutor {
    pub id: i64,
    pub name: String,
    pub subject: Option<String>,
}

/// A tutor's recurring weekly open window for one day of the week.
///
/// `day_of_week` uses 0 = Sunday .. 6 = Saturday. Owned by tutor management;
/// the engine never mutates rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub tutor_id: i64,
    pub day_of_week: u8,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Confirmed,
        }
    }
}

/// A committed session. Confirmed bookings are unique per (tutor_id, start);
/// the store enforces that, not the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub tutor_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
}

/// Payload for creating one confirmed booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub tutor_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// A concrete one-hour bookable window derived from a rule for one date.
///
/// Ephemeral: regenerated on every view change, never persisted. Identity is
/// the start instant. All times are local to the single configured zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInstance {
    pub tutor_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_booked: bool,
}

impl SlotInstance {
    /// Human label for the display collaborator, e.g. "Mon Sep 01 09:00-10:00".
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            self.start.format("%a %b %d %H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Result of a fully successful submission.
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub sessions: usize,
    pub recipient: String,
}
