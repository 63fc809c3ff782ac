//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod schedule;

pub use entities::{
    AvailabilityRule, Booking, BookingReceipt, BookingStatus, NewBooking, SlotInstance, Tutor,
};
pub use errors::DomainError;
pub use schedule::{expand_slots, mark_booked, HORIZON_DAYS};
