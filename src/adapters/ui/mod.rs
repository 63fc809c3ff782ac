//! Terminal UI adapter. Implements InputPort with inquire prompts.

pub mod banner;
pub mod tui;

pub use tui::TuiInputPort;

/// Prints the welcome banner. Call once at startup (after tracing init).
pub fn init_ui() {
    banner::print_welcome();
}
