/// Registration wizard module
///
/// Drives a multi-step sign-up for clients and lawyers. The branch chosen up
/// front decides which steps exist, which fields are validated and which keys
/// the final payload carries.
///
/// ## Architecture
///
/// ```text
/// RegistrationSession
///   ├── RegistrationDraft (every field the user can fill)
///   ├── Branch -> StepPlan (ordered WizardSteps, total, terms step)
///   ├── validate_step (pure, returns the full ErrorMap)
///   ├── AvailabilityTracker (debounced email / username / phone checks)
///   └── Submission (payload assembly, in-flight guard, failure notices)
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// use wizard::{RegistrationSession, UserType};
///
/// let mut session = RegistrationSession::new(api, &config)?;
/// session.select_user_type(UserType::Client)?;
///
/// session.update_field(Field::Email, |d| d.email = "ali@example.com".into())?;
/// session.poll();
///
/// while session.current_step() < session.total_steps() {
///     session.advance()?;
/// }
/// session.submit()?;
/// ```
///
/// ## Branches
///
/// 1. **Client** - basic info, account and location, terms
/// 2. **Dashboard lawyer** - same as client; creating a firm adds firm details
/// 3. **Marketplace lawyer** - nine steps covering licensing, courts,
///    experience, Khebra registration and services

pub mod availability;
pub mod branch;
pub mod catalog;
pub mod clock;
pub mod draft;
pub mod payload;
pub mod session;
pub mod steps;
pub mod submission;
pub mod validation;

// Re-export commonly used types
pub use availability::{AvailabilityState, AvailabilityTracker, WatchedField};
pub use branch::{compute_total_steps, Branch};
pub use catalog::CourtId;
pub use clock::{Clock, ManualClock, SystemClock};
pub use draft::{Field, LawyerMode, LawyerWorkMode, RegistrationDraft, UserType};
pub use payload::{build_payload, RegistrationPayload};
pub use session::{RegistrationSession, SubmissionOutcome, SubmissionTicket, WizardPhase};
pub use steps::{StepPlan, WizardStep};
pub use submission::SubmissionFailure;
pub use validation::{validate_step, ErrorMap};
