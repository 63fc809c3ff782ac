//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: UI/CLI drives the booking flow.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive flow (pick tutor, toggle slots, submit).
    async fn run(&self) -> Result<(), DomainError>;
}
