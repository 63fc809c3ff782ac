//! Implements InputPort. Inquire-based interactive booking flow.
//!
//! Pick a tutor, toggle slots, review the selection, submit. All booking
//! semantics live in the use cases; this adapter only renders and prompts.

use crate::domain::{DomainError, Tutor};
use crate::ports::{BookingStore, InputPort, RealtimeFeed};
use crate::usecases::{BookingService, BookingSession, ScheduleService, ToggleOutcome};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{InquireError, Select, Text};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const MENU_PAGE_SIZE: usize = 12;

/// What ended a tutor session.
enum SessionExit {
    SwitchTutor,
    Quit,
}

fn is_cancel(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

fn prompt_err(e: InquireError) -> DomainError {
    DomainError::Interrupted(e.to_string())
}

/// TUI adapter. Inquire prompts over the booking use cases.
pub struct TuiInputPort {
    store: Arc<dyn BookingStore>,
    feed: Arc<dyn RealtimeFeed>,
    schedule: Arc<ScheduleService>,
    bookings: Arc<BookingService>,
    /// Tutor name to preselect on startup (TUTORBOOK_TUTOR), once.
    preselect: Option<String>,
}

impl TuiInputPort {
    pub fn new(
        store: Arc<dyn BookingStore>,
        feed: Arc<dyn RealtimeFeed>,
        schedule: Arc<ScheduleService>,
        bookings: Arc<BookingService>,
        preselect: Option<String>,
    ) -> Self {
        Self {
            store,
            feed,
            schedule,
            bookings,
            preselect,
        }
    }

    fn pick_tutor(tutors: &[Tutor], preselect: Option<String>) -> Result<Option<Tutor>, DomainError> {
        if let Some(name) = preselect {
            if let Some(tutor) = tutors.iter().find(|t| t.name == name) {
                println!("Preselected tutor: {}", tutor.name);
                return Ok(Some(tutor.clone()));
            }
            warn!(tutor = %name, "preselected tutor not found; asking interactively");
        }

        let options: Vec<String> = tutors
            .iter()
            .map(|t| match &t.subject {
                Some(subject) => format!("{} ({})", t.name, subject),
                None => t.name.clone(),
            })
            .collect();
        match Select::new("Select a tutor", options).raw_prompt() {
            Ok(choice) => Ok(Some(tutors[choice.index].clone())),
            Err(e) if is_cancel(&e) => Ok(None),
            Err(e) => Err(prompt_err(e)),
        }
    }

    async fn run_session(&self, tutor: Tutor) -> Result<SessionExit, DomainError> {
        let now = chrono::Local::now().naive_local();
        let mut session =
            BookingSession::open(&self.schedule, self.feed.as_ref(), tutor, now).await?;
        println!(
            "{}'s availability: {} slot(s) over the next six weeks",
            session.tutor().name,
            session.slots().len()
        );

        loop {
            let newly_booked = session.absorb_pending();
            if newly_booked > 0 {
                println!("{newly_booked} slot(s) were just booked by other students");
            }

            let mut options: Vec<String> = session
                .slots()
                .iter()
                .map(|slot| {
                    let marker = if slot.is_booked {
                        "[booked]  "
                    } else if session.selection.contains_start(slot.start) {
                        "[chosen]  "
                    } else {
                        "          "
                    };
                    format!("{marker}{}", slot.label())
                })
                .collect();
            let first_action = options.len();
            options.push(format!("Review selection ({})", session.selection.len()));
            options.push("Confirm booking".into());
            options.push("Clear selection".into());
            options.push("Switch tutor".into());
            options.push("Quit".into());

            let index = match Select::new("Pick a slot or an action", options)
                .with_page_size(MENU_PAGE_SIZE)
                .raw_prompt()
            {
                Ok(choice) => choice.index,
                Err(e) if is_cancel(&e) => return Ok(SessionExit::Quit),
                Err(e) => return Err(prompt_err(e)),
            };

            if index < first_action {
                match session.toggle_at(index) {
                    Some(ToggleOutcome::Added) => println!("Added to your selection"),
                    Some(ToggleOutcome::Removed) => println!("Removed from your selection"),
                    Some(ToggleOutcome::RejectedBooked) => {
                        println!("This slot is already booked")
                    }
                    None => {}
                }
                continue;
            }

            match index - first_action {
                0 => Self::review_selection(&mut session)?,
                1 => self.confirm_booking(&mut session).await?,
                2 => {
                    session.selection.clear();
                    println!("Selection cleared");
                }
                3 => return Ok(SessionExit::SwitchTutor),
                _ => return Ok(SessionExit::Quit),
            }
        }
    }

    /// Show the chosen slots; picking one removes it.
    fn review_selection(session: &mut BookingSession) -> Result<(), DomainError> {
        if session.selection.is_empty() {
            println!("No sessions selected yet");
            return Ok(());
        }
        let mut options = session.selection_summary();
        options.push("Back".into());
        let back = options.len() - 1;

        match Select::new("Selected sessions (pick one to remove)", options).raw_prompt() {
            Ok(choice) if choice.index < back => {
                if let Some(removed) = session.selection.remove(choice.index) {
                    println!("Removed {}", removed.label());
                }
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) if is_cancel(&e) => Ok(()),
            Err(e) => Err(prompt_err(e)),
        }
    }

    async fn confirm_booking(&self, session: &mut BookingSession) -> Result<(), DomainError> {
        if session.selection.is_empty() {
            println!("Please select at least one session");
            return Ok(());
        }

        let name = match Text::new("Your name:").prompt() {
            Ok(s) => s,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(prompt_err(e)),
        };
        let email = match Text::new("Your email:").prompt() {
            Ok(s) => s,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(prompt_err(e)),
        };

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!(
            "Booking {} session(s)...",
            session.selection.len()
        ));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self
            .bookings
            .submit(session.tutor().id, &name, &email, &session.selection)
            .await;
        spinner.finish_and_clear();

        match result {
            Ok(receipt) => {
                println!(
                    "Booking confirmed! {} session(s) booked. Confirmation sent to {}",
                    receipt.sessions, receipt.recipient
                );
                let now = chrono::Local::now().naive_local();
                session.reset(&self.schedule, now).await?;
            }
            // Validation and Conflict carry their own user-facing text;
            // anything else renders as a generic storage failure.
            Err(e) => {
                println!("Booking failed: {e}");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let mut preselect = self.preselect.clone();
        loop {
            let tutors = self.store.list_tutors().await?;
            if tutors.is_empty() {
                return Err(DomainError::Store("no tutors available".into()));
            }
            let Some(tutor) = Self::pick_tutor(&tutors, preselect.take())? else {
                return Ok(());
            };
            match self.run_session(tutor).await? {
                SessionExit::SwitchTutor => continue,
                SessionExit::Quit => return Ok(()),
            }
        }
    }
}
