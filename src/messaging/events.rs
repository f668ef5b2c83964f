/// Event types for the registration wizard
///
/// Events represent things that have happened (past tense).
/// They are broadcast to all subscribers; a front end renders notices and
/// progress from them.
use crate::wizard::availability::{AvailabilityState, WatchedField};
use crate::wizard::branch::Branch;
use crate::wizard::draft::Field;
use crate::wizard::submission::SubmissionFailure;

/// Wizard events
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Branch selection finished and the numbered steps began
    BranchSelected { branch: Branch, total_steps: usize },

    /// Current step changed (0 is branch selection)
    StepChanged { from: usize, to: usize },

    /// "Next" was blocked by invalid fields
    ValidationFailed { step: usize, fields: Vec<Field> },

    /// A watched field's remote availability changed
    AvailabilityChanged {
        field: WatchedField,
        state: AvailabilityState,
    },

    /// Registration request sent
    SubmissionStarted,

    /// Registration accepted by the backend
    Registered,

    /// Transient notice for a failed submission
    SubmissionFailed { failure: SubmissionFailure },

    /// Session torn down
    Shutdown,
}

impl Event {
    /// Short label for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::BranchSelected { .. } => "branch_selected",
            Event::StepChanged { .. } => "step_changed",
            Event::ValidationFailed { .. } => "validation_failed",
            Event::AvailabilityChanged { .. } => "availability_changed",
            Event::SubmissionStarted => "submission_started",
            Event::Registered => "registered",
            Event::SubmissionFailed { .. } => "submission_failed",
            Event::Shutdown => "shutdown",
        }
    }

    /// Whether the event should surface as a user-facing notice
    pub fn is_notice(&self) -> bool {
        matches!(self, Event::SubmissionFailed { .. } | Event::Registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::Registered.name(), "registered");
        assert_eq!(
            Event::StepChanged { from: 1, to: 2 }.name(),
            "step_changed"
        );
    }

    #[test]
    fn test_notice_events() {
        let failed = Event::SubmissionFailed {
            failure: SubmissionFailure::DuplicateEmail,
        };
        assert!(failed.is_notice());
        assert!(Event::Registered.is_notice());
        assert!(!Event::SubmissionStarted.is_notice());
    }
}
