//! Application use cases. Orchestrate domain logic via ports.

pub mod booking_service;
pub mod schedule_service;
pub mod selection;
pub mod session;

pub use booking_service::BookingService;
pub use schedule_service::ScheduleService;
pub use selection::{SelectionSet, ToggleOutcome};
pub use session::BookingSession;
