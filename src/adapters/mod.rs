//! Infrastructure adapters. Implement outbound ports.
//!
//! Persistence, realtime fan-out, terminal UI. Map errors to DomainError.

pub mod persistence;
pub mod realtime;
pub mod ui;
