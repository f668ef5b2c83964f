/// Registration session
///
/// Owns one wizard run: the draft, the current phase, the visible error map,
/// availability tracking and the submission guard. All transitions take
/// `&mut self`; the only background work is the availability worker, whose
/// results are folded back in by `poll`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use super::availability::{AvailabilityState, AvailabilityTracker, CheckRequest, Resolution, WatchedField};
use super::branch::{compute_total_steps, Branch};
use super::clock::{Clock, SystemClock};
use super::draft::{Field, LawyerMode, LawyerWorkMode, RegistrationDraft, UserType};
use super::payload::{build_payload, RegistrationPayload};
use super::steps::WizardStep;
use super::submission::SubmissionFailure;
use super::validation::{validate_step, ErrorMap};
use crate::api::{AvailabilityWorker, RegistrationApi};
use crate::config::Config;
use crate::error::{ApiError, WizardError};
use crate::messaging::{Event, EventBus, SubscriberId};

/// Where the session is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    BranchSelect,
    Step(usize),
    Submitting,
    Success,
}

/// Result of a finished submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Registered,
    Failed(SubmissionFailure),
}

/// Proof that a submission was started; carries the payload to send.
///
/// The session stays in `Submitting` until the ticket is handed back to
/// `complete_submission` or `cancel_submission`.
#[derive(Debug)]
#[must_use = "hand the ticket back to complete_submission or cancel_submission"]
pub struct SubmissionTicket {
    payload: RegistrationPayload,
}

impl SubmissionTicket {
    pub fn payload(&self) -> &RegistrationPayload {
        &self.payload
    }
}

pub struct RegistrationSession {
    draft: RegistrationDraft,
    phase: WizardPhase,
    errors: ErrorMap,
    availability: AvailabilityTracker,
    clock: Arc<dyn Clock>,
    api: Arc<dyn RegistrationApi>,
    worker: Option<AvailabilityWorker>,
    events: EventBus,
    country: String,
}

impl RegistrationSession {
    /// Start a session against `api` using wall-clock time
    pub fn new(api: Arc<dyn RegistrationApi>, config: &Config) -> std::io::Result<Self> {
        Self::with_clock(api, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        api: Arc<dyn RegistrationApi>,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> std::io::Result<Self> {
        let worker = AvailabilityWorker::spawn(Arc::clone(&api))?;

        Ok(Self {
            draft: RegistrationDraft::new(),
            phase: WizardPhase::BranchSelect,
            errors: ErrorMap::new(),
            availability: AvailabilityTracker::new(config.debounce()),
            clock,
            api,
            worker: Some(worker),
            events: EventBus::new(),
            country: config.default_country.clone(),
        })
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn branch(&self) -> Option<Branch> {
        Branch::from_draft(&self.draft)
    }

    pub fn total_steps(&self) -> usize {
        compute_total_steps(&self.draft)
    }

    /// Numbered step; 0 during branch selection, the final step while submitting
    pub fn current_step(&self) -> usize {
        match self.phase {
            WizardPhase::BranchSelect => 0,
            WizardPhase::Step(n) => n,
            WizardPhase::Submitting | WizardPhase::Success => self.total_steps(),
        }
    }

    pub fn current_wizard_step(&self) -> Option<WizardStep> {
        let branch = self.branch()?;
        match self.phase {
            WizardPhase::Step(n) => branch.plan().step_at(n),
            _ => None,
        }
    }

    pub fn availability(&self, field: WatchedField) -> AvailabilityState {
        self.availability.state(field)
    }

    pub fn subscribe(&self) -> (Receiver<Event>, SubscriberId) {
        self.events.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == WizardPhase::Submitting
    }

    pub fn is_completed(&self) -> bool {
        self.phase == WizardPhase::Success
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        match self.phase {
            WizardPhase::Success => Err(WizardError::Completed),
            WizardPhase::Submitting => Err(WizardError::SubmissionInFlight),
            _ => Ok(()),
        }
    }

    fn move_to(&mut self, phase: WizardPhase) {
        let from = self.current_step();
        self.phase = phase;
        let to = self.current_step();
        if from != to {
            tracing::info!("Wizard step {} -> {}", from, to);
            self.events.publish(Event::StepChanged { from, to });
        }
    }

    /// Apply a branch pick. Only the last choice of a branch (client,
    /// marketplace, or a work mode) leaves branch selection, so leftover
    /// sub-choices from an earlier pick are offered again.
    fn after_branch_pick(&mut self, final_choice: bool) {
        if final_choice {
            self.enter_steps_if_ready();
        } else {
            self.clamp_step();
        }
    }

    /// Leave branch selection once the branch needs no further sub-choice
    fn enter_steps_if_ready(&mut self) {
        if self.phase != WizardPhase::BranchSelect {
            self.clamp_step();
            return;
        }
        let Some(branch) = self.branch().filter(Branch::is_ready) else {
            return;
        };

        let total_steps = branch.plan().total_steps();
        tracing::info!(?branch, total_steps, "Branch selected");
        self.events.publish(Event::BranchSelected { branch, total_steps });
        self.move_to(WizardPhase::Step(1));
    }

    /// Keep the current step inside a plan that may have shrunk
    fn clamp_step(&mut self) {
        if let WizardPhase::Step(n) = self.phase {
            let total = self.total_steps();
            if n > total {
                self.move_to(WizardPhase::Step(total));
            }
        }
    }

    pub fn select_user_type(&mut self, user_type: UserType) -> Result<WizardPhase, WizardError> {
        self.ensure_editable()?;
        self.replace_with(Field::UserType, |d| d.user_type = Some(user_type));
        self.after_branch_pick(user_type == UserType::Client);
        Ok(self.phase)
    }

    pub fn select_lawyer_mode(&mut self, mode: LawyerMode) -> Result<WizardPhase, WizardError> {
        self.ensure_editable()?;
        self.replace_with(Field::LawyerMode, |d| {
            d.user_type = Some(UserType::Lawyer);
            d.lawyer_mode = Some(mode);
        });
        self.after_branch_pick(mode == LawyerMode::Marketplace);
        Ok(self.phase)
    }

    pub fn select_work_mode(&mut self, work_mode: LawyerWorkMode) -> Result<WizardPhase, WizardError> {
        self.ensure_editable()?;
        self.replace_with(Field::LawyerWorkMode, |d| {
            d.user_type = Some(UserType::Lawyer);
            d.lawyer_mode = Some(LawyerMode::Dashboard);
            d.lawyer_work_mode = Some(work_mode);
        });
        self.after_branch_pick(true);
        Ok(self.phase)
    }

    /// Edit one field. The draft is replaced as a whole, the field's error is
    /// cleared and watched fields restart their availability debounce.
    pub fn update_field<F>(&mut self, field: Field, edit: F) -> Result<(), WizardError>
    where
        F: FnOnce(&mut RegistrationDraft),
    {
        self.ensure_editable()?;
        self.replace_with(field, edit);

        if matches!(field, Field::UserType | Field::LawyerMode | Field::LawyerWorkMode) {
            self.clamp_step();
        }
        Ok(())
    }

    fn replace_with<F>(&mut self, field: Field, edit: F)
    where
        F: FnOnce(&mut RegistrationDraft),
    {
        let mut next = self.draft.clone();
        edit(&mut next);
        self.draft = next;

        self.errors.remove(field);
        if let Some(watched) = WatchedField::from_field(field) {
            let value = self.watched_value(watched).to_string();
            self.availability.on_edit(watched, &value, self.clock.now());
        }
    }

    /// Swap in a complete draft, e.g. one loaded from a file.
    ///
    /// Clears all errors and schedules availability checks for every
    /// watched field.
    pub fn replace_draft(&mut self, draft: RegistrationDraft) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft = draft;
        self.errors.clear();

        let now = self.clock.now();
        for watched in WatchedField::ALL {
            let value = self.watched_value(watched).to_string();
            self.availability.on_edit(watched, &value, now);
        }

        self.enter_steps_if_ready();
        Ok(())
    }

    fn watched_value(&self, field: WatchedField) -> &str {
        match field {
            WatchedField::Email => &self.draft.email,
            WatchedField::Username => &self.draft.username,
            WatchedField::Phone => &self.draft.phone,
        }
    }

    /// Dispatch due availability checks and apply finished ones.
    /// Returns how many results changed state.
    pub fn poll(&mut self) -> usize {
        let outcomes = match &self.worker {
            Some(worker) => worker.drain(),
            None => Vec::new(),
        };
        let applied = outcomes
            .into_iter()
            .filter(|o| self.apply_check(&o.request, &o.result) != Resolution::Stale)
            .count();

        let due = self.availability.take_due(self.clock.now());
        for request in due {
            self.events.publish(Event::AvailabilityChanged {
                field: request.field,
                state: AvailabilityState::Checking,
            });
            if let Some(worker) = &self.worker {
                worker.dispatch(request);
            }
        }

        applied
    }

    /// Poll until every due availability check has finished, or until
    /// `timeout` passes. Checks still inside their debounce window are left
    /// scheduled.
    pub fn settle_availability(&mut self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll();
            if !self.availability_busy() {
                return;
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::debug!("Availability checks did not settle in {:?}", timeout);
                return;
            }

            let wait = (deadline - now).min(Duration::from_millis(25));
            let outcome = self.worker.as_ref().and_then(|w| w.recv_timeout(wait));
            if let Some(outcome) = outcome {
                self.apply_check(&outcome.request, &outcome.result);
            }
        }
    }

    fn availability_busy(&self) -> bool {
        let due = self
            .availability
            .next_deadline()
            .is_some_and(|deadline| deadline <= self.clock.now());

        due || WatchedField::ALL
            .iter()
            .any(|f| self.availability.state(*f) == AvailabilityState::Checking)
    }

    /// Feed one check result in directly
    pub fn apply_check(&mut self, request: &CheckRequest, result: &Result<bool, ApiError>) -> Resolution {
        let resolution = self.availability.resolve(request, result);
        if resolution == Resolution::Stale {
            return resolution;
        }

        let field = request.field;
        if resolution == Resolution::Taken {
            self.errors.insert(field.field(), field.taken_message());
        }
        self.events.publish(Event::AvailabilityChanged {
            field,
            state: self.availability.state(field),
        });
        resolution
    }

    /// A taken error outlives validation passes until its field is edited
    fn restore_taken_errors(&mut self) {
        for watched in WatchedField::ALL {
            let field = watched.field();
            if self.availability.state(watched) == AvailabilityState::Taken
                && !self.errors.contains(field)
            {
                self.errors.insert(field, watched.taken_message());
            }
        }
    }

    /// Watched fields that the given step collects
    fn watched_on(branch: Branch, step: WizardStep) -> &'static [WatchedField] {
        match step {
            WizardStep::BasicInfo if branch.collects_phone_with_identity() => &WatchedField::ALL,
            WizardStep::BasicInfo => &[WatchedField::Email, WatchedField::Username],
            WizardStep::AccountAndPhone => &[WatchedField::Phone],
            _ => &[],
        }
    }

    fn validate_current(&self, step: usize) -> ErrorMap {
        let mut errors = validate_step(step, &self.draft);

        let Some(branch) = self.branch() else {
            return errors;
        };
        let Some(wizard_step) = branch.plan().step_at(step) else {
            return errors;
        };

        for watched in Self::watched_on(branch, wizard_step) {
            let field = watched.field();
            if self.availability.state(*watched) == AvailabilityState::Taken
                && !errors.contains(field)
            {
                errors.insert(field, watched.taken_message());
            }
        }
        errors
    }

    /// "Next": validate the current step and move forward on success
    pub fn advance(&mut self) -> Result<usize, WizardError> {
        self.ensure_editable()?;

        let WizardPhase::Step(step) = self.phase else {
            self.enter_steps_if_ready();
            return match self.phase {
                WizardPhase::Step(n) => Ok(n),
                _ => Err(WizardError::BranchIncomplete),
            };
        };

        let errors = self.validate_current(step);
        if !errors.is_empty() {
            let count = errors.len();
            tracing::info!(step, count, "Step blocked by validation");
            self.events.publish(Event::ValidationFailed {
                step,
                fields: errors.fields().collect(),
            });
            self.errors = errors;
            self.restore_taken_errors();
            return Err(WizardError::ValidationFailed { step, count });
        }

        self.errors.clear();
        self.restore_taken_errors();
        let next = (step + 1).min(self.total_steps());
        self.move_to(WizardPhase::Step(next));
        Ok(next)
    }

    /// "Back": always allowed, never validates, keeps the draft
    pub fn retreat(&mut self) -> Result<usize, WizardError> {
        self.ensure_editable()?;

        match self.phase {
            WizardPhase::Step(n) if n > 1 => self.move_to(WizardPhase::Step(n - 1)),
            WizardPhase::Step(_) => self.move_to(WizardPhase::BranchSelect),
            _ => {}
        }
        Ok(self.current_step())
    }

    /// Validate the final step and enter the in-flight state
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, WizardError> {
        let step = match self.phase {
            WizardPhase::Success => return Err(WizardError::Completed),
            WizardPhase::Submitting => {
                tracing::debug!("Ignoring submit while a submission is in flight");
                return Err(WizardError::SubmissionInFlight);
            }
            WizardPhase::BranchSelect => return Err(WizardError::BranchIncomplete),
            WizardPhase::Step(n) => n,
        };

        let total = self.total_steps();
        if step != total {
            return Err(WizardError::NotOnFinalStep {
                current: step,
                total,
            });
        }

        let errors = self.validate_current(step);
        if !errors.is_empty() {
            let count = errors.len();
            self.events.publish(Event::ValidationFailed {
                step,
                fields: errors.fields().collect(),
            });
            self.errors = errors;
            self.restore_taken_errors();
            return Err(WizardError::ValidationFailed { step, count });
        }
        self.errors.clear();
        self.restore_taken_errors();

        let payload = build_payload(&self.draft, &self.country)?;
        self.phase = WizardPhase::Submitting;
        self.events.publish(Event::SubmissionStarted);

        Ok(SubmissionTicket { payload })
    }

    /// Apply the backend's answer to a started submission
    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<(), ApiError>,
    ) -> SubmissionOutcome {
        drop(ticket);

        match result {
            Ok(()) => {
                tracing::info!("Registration completed");
                self.phase = WizardPhase::Success;
                self.availability.cancel_all();
                self.events.publish(Event::Registered);
                SubmissionOutcome::Registered
            }
            Err(e) => {
                let failure = SubmissionFailure::classify(&e);
                tracing::warn!("Registration failed: {} ({:?})", e, failure);
                self.phase = WizardPhase::Step(self.total_steps());
                self.events.publish(Event::SubmissionFailed {
                    failure: failure.clone(),
                });
                SubmissionOutcome::Failed(failure)
            }
        }
    }

    /// Give up on a started submission without a backend answer; the
    /// session returns to the final step with the draft intact
    pub fn cancel_submission(&mut self, ticket: SubmissionTicket) {
        drop(ticket);
        if self.phase == WizardPhase::Submitting {
            tracing::info!("Submission cancelled before a response");
            self.phase = WizardPhase::Step(self.total_steps());
        }
    }

    /// Validate, send and apply the result in one call
    pub fn submit(&mut self) -> Result<SubmissionOutcome, WizardError> {
        let ticket = self.begin_submission()?;
        let result = self.api.register(ticket.payload());
        Ok(self.complete_submission(ticket, result))
    }

    /// Cancel pending checks and stop the worker
    pub fn shutdown(&mut self) {
        self.availability.cancel_all();
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
            self.events.publish(Event::Shutdown);
        }
    }
}

impl Drop for RegistrationSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ServerErrorBody;
    use crate::wizard::clock::ManualClock;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeApi {
        taken: Vec<String>,
        register_result: Mutex<Option<ApiError>>,
        registrations: Mutex<Vec<RegistrationPayload>>,
    }

    impl RegistrationApi for FakeApi {
        fn check_availability(&self, _field: WatchedField, value: &str) -> Result<bool, ApiError> {
            Ok(!self.taken.iter().any(|t| t == value))
        }

        fn register(&self, payload: &RegistrationPayload) -> Result<(), ApiError> {
            self.registrations.lock().push(payload.clone());
            match self.register_result.lock().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    fn session_with(api: FakeApi) -> (RegistrationSession, Arc<FakeApi>, ManualClock) {
        let api = Arc::new(api);
        let clock = ManualClock::new();
        let session = RegistrationSession::with_clock(
            api.clone(),
            &Config::default(),
            Arc::new(clock.clone()),
        )
        .unwrap();
        (session, api, clock)
    }

    fn fill_client_step1(session: &mut RegistrationSession) {
        session.update_field(Field::FirstName, |d| d.first_name = "Ali".into()).unwrap();
        session.update_field(Field::LastName, |d| d.last_name = "Ahmad".into()).unwrap();
        session.update_field(Field::Username, |d| d.username = "aliahmad".into()).unwrap();
        session.update_field(Field::Email, |d| d.email = "ali@example.com".into()).unwrap();
        session.update_field(Field::Phone, |d| d.phone = "0512345678".into()).unwrap();
    }

    fn fill_step2(session: &mut RegistrationSession) {
        session.update_field(Field::Password, |d| d.password = "Passw0rd!".into()).unwrap();
        session
            .update_field(Field::ConfirmPassword, |d| d.confirm_password = "Passw0rd!".into())
            .unwrap();
        session.update_field(Field::Nationality, |d| d.nationality = "saudi".into()).unwrap();
        session.update_field(Field::Region, |d| d.region = "riyadh".into()).unwrap();
        session.update_field(Field::City, |d| d.city = "Riyadh".into()).unwrap();
    }

    fn accept_terms(session: &mut RegistrationSession) {
        session.update_field(Field::AgreedTerms, |d| d.agreed_terms = true).unwrap();
        session.update_field(Field::AgreedPrivacy, |d| d.agreed_privacy = true).unwrap();
    }

    #[test]
    fn test_branch_selection_jumps_to_step_one() {
        let (mut session, _, _) = session_with(FakeApi::default());
        assert_eq!(session.phase(), WizardPhase::BranchSelect);

        assert_eq!(
            session.select_user_type(UserType::Lawyer).unwrap(),
            WizardPhase::BranchSelect
        );
        assert_eq!(
            session.select_lawyer_mode(LawyerMode::Dashboard).unwrap(),
            WizardPhase::BranchSelect
        );
        assert_eq!(
            session.select_work_mode(LawyerWorkMode::CreateFirm).unwrap(),
            WizardPhase::Step(1)
        );
        assert_eq!(session.total_steps(), 4);
    }

    #[test]
    fn test_leftover_sub_choice_is_offered_again() {
        let (mut session, _, _) = session_with(FakeApi::default());
        session.select_lawyer_mode(LawyerMode::Marketplace).unwrap();
        assert_eq!(session.retreat().unwrap(), 0);

        // lawyerMode is still set, but picking "lawyer" only records the user type
        assert_eq!(
            session.select_user_type(UserType::Lawyer).unwrap(),
            WizardPhase::BranchSelect
        );
        assert_eq!(session.draft().lawyer_mode, Some(LawyerMode::Marketplace));

        session.select_work_mode(LawyerWorkMode::Solo).unwrap();
        assert_eq!(session.retreat().unwrap(), 0);
        assert_eq!(
            session.select_lawyer_mode(LawyerMode::Dashboard).unwrap(),
            WizardPhase::BranchSelect
        );
        assert_eq!(
            session.select_work_mode(LawyerWorkMode::JoinFirm).unwrap(),
            WizardPhase::Step(1)
        );
    }

    #[test]
    fn test_advance_blocks_and_replaces_errors() {
        let (mut session, _, _) = session_with(FakeApi::default());
        session.select_user_type(UserType::Client).unwrap();

        let err = session.advance().unwrap_err();
        assert!(matches!(err, WizardError::ValidationFailed { step: 1, .. }));
        assert!(session.errors().contains(Field::FirstName));

        // Editing clears only that field's error
        session.update_field(Field::FirstName, |d| d.first_name = "Ali".into()).unwrap();
        assert!(!session.errors().contains(Field::FirstName));
        assert!(session.errors().contains(Field::LastName));

        fill_client_step1(&mut session);
        assert_eq!(session.advance().unwrap(), 2);
        assert!(session.errors().is_empty());
    }

    #[test]
    fn test_retreat_is_unconditional() {
        let (mut session, _, _) = session_with(FakeApi::default());
        session.select_user_type(UserType::Client).unwrap();
        fill_client_step1(&mut session);
        session.advance().unwrap();

        assert_eq!(session.retreat().unwrap(), 1);
        assert_eq!(session.retreat().unwrap(), 0);
        assert_eq!(session.phase(), WizardPhase::BranchSelect);
        assert_eq!(session.retreat().unwrap(), 0);
        assert_eq!(session.draft().first_name, "Ali");
    }

    #[test]
    fn test_taken_username_blocks_until_edited() {
        let api = FakeApi {
            taken: vec!["aliahmad".to_string()],
            ..Default::default()
        };
        let (mut session, _, clock) = session_with(api);
        session.select_user_type(UserType::Client).unwrap();
        fill_client_step1(&mut session);

        clock.advance_ms(500);
        session.settle_availability(Duration::from_secs(5));
        assert_eq!(session.availability(WatchedField::Username), AvailabilityState::Taken);
        assert_eq!(session.availability(WatchedField::Email), AvailabilityState::Available);
        assert!(session.errors().contains(Field::Username));

        assert!(session.advance().is_err());
        assert!(session.errors().contains(Field::Username));

        session.update_field(Field::Username, |d| d.username = "ali.ahmad".into()).unwrap();
        assert!(!session.errors().contains(Field::Username));
        assert_eq!(session.availability(WatchedField::Username), AvailabilityState::Idle);
        assert_eq!(session.advance().unwrap(), 2);
    }

    #[test]
    fn test_submission_guard_and_failure_recovery() {
        let api = FakeApi::default();
        *api.register_result.lock() = Some(ApiError::Rejected {
            endpoint: "/auth/register".to_string(),
            status: 400,
            body: ServerErrorBody {
                code: Some("PASSWORD_BREACHED".to_string()),
                ..Default::default()
            },
        });
        let (mut session, api, _) = session_with(api);
        let (events, _id) = session.subscribe();

        session.select_user_type(UserType::Client).unwrap();
        fill_client_step1(&mut session);
        session.advance().unwrap();
        assert!(matches!(
            session.begin_submission(),
            Err(WizardError::NotOnFinalStep { current: 2, total: 3 })
        ));

        fill_step2(&mut session);
        session.advance().unwrap();
        accept_terms(&mut session);

        let ticket = session.begin_submission().unwrap();
        assert!(session.is_submitting());
        assert_eq!(session.begin_submission().unwrap_err(), WizardError::SubmissionInFlight);
        assert_eq!(session.retreat().unwrap_err(), WizardError::SubmissionInFlight);

        let result = api.register(ticket.payload());
        let outcome = session.complete_submission(ticket, result);
        assert_eq!(outcome, SubmissionOutcome::Failed(SubmissionFailure::PasswordBreached));
        assert_eq!(session.phase(), WizardPhase::Step(3));
        assert!(session.errors().is_empty());
        assert_eq!(session.draft().password, "Passw0rd!");

        let notices: Vec<Event> = events.try_iter().filter(Event::is_notice).collect();
        assert_eq!(
            notices,
            vec![Event::SubmissionFailed {
                failure: SubmissionFailure::PasswordBreached
            }]
        );

        assert_eq!(session.submit().unwrap(), SubmissionOutcome::Registered);
        assert!(session.is_completed());
        assert_eq!(api.registrations.lock().len(), 2);

        assert_eq!(
            session.update_field(Field::City, |d| d.city = "Jeddah".into()),
            Err(WizardError::Completed)
        );
        assert_eq!(session.submit().unwrap_err(), WizardError::Completed);
    }

    #[test]
    fn test_cancelled_submission_returns_to_final_step() {
        let (mut session, api, _) = session_with(FakeApi::default());
        session.select_user_type(UserType::Client).unwrap();
        fill_client_step1(&mut session);
        session.advance().unwrap();
        fill_step2(&mut session);
        session.advance().unwrap();
        accept_terms(&mut session);

        let ticket = session.begin_submission().unwrap();
        assert!(session.is_submitting());
        session.cancel_submission(ticket);

        assert_eq!(session.phase(), WizardPhase::Step(3));
        assert!(api.registrations.lock().is_empty());
        session.update_field(Field::City, |d| d.city = "Jeddah".into()).unwrap();
        assert_eq!(session.submit().unwrap(), SubmissionOutcome::Registered);
    }

    #[test]
    fn test_branch_change_clamps_step() {
        let (mut session, _, _) = session_with(FakeApi::default());
        session.select_lawyer_mode(LawyerMode::Marketplace).unwrap();
        assert_eq!(session.total_steps(), 9);

        session.update_field(Field::LawyerMode, |d| d.lawyer_mode = Some(LawyerMode::Dashboard)).unwrap();
        assert_eq!(session.total_steps(), 3);
        assert_eq!(session.current_step(), 1);
    }

    #[test]
    fn test_shutdown_cancels_pending_checks() {
        let (mut session, _, clock) = session_with(FakeApi::default());
        session.select_user_type(UserType::Client).unwrap();
        session.update_field(Field::Username, |d| d.username = "aliahmad".into()).unwrap();

        session.shutdown();
        clock.advance_ms(1000);
        assert_eq!(session.poll(), 0);
        assert_eq!(session.availability(WatchedField::Username), AvailabilityState::Idle);
    }
}
