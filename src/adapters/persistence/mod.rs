//! Persistence adapters. Implement BookingStore.
//!
//! SQLite for real runs; in-memory for demo mode and tests. Both enforce
//! the same uniqueness invariant on confirmed (tutor_id, start).

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
