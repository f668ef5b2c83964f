/// Availability checker
///
/// Tracks the remote "is this already registered?" status of the email,
/// username and phone fields. Each field has its own debounce slot: an edit
/// cancels whatever that field had scheduled and, if the value passes the
/// guard, schedules one check for `now + window`. Due checks are handed out
/// by `take_due`, and results come back through `resolve`, which drops any
/// result belonging to a superseded edit.

use std::time::{Duration, Instant};

use super::draft::Field;
use super::validation::is_valid_phone;
use crate::error::ApiError;

pub const MIN_CHECK_LEN: usize = 3;

/// Fields with a remote availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchedField {
    Email,
    Username,
    Phone,
}

impl WatchedField {
    pub const ALL: [WatchedField; 3] = [WatchedField::Email, WatchedField::Username, WatchedField::Phone];

    pub fn from_field(field: Field) -> Option<Self> {
        match field {
            Field::Email => Some(WatchedField::Email),
            Field::Username => Some(WatchedField::Username),
            Field::Phone => Some(WatchedField::Phone),
            _ => None,
        }
    }

    pub fn field(&self) -> Field {
        match self {
            WatchedField::Email => Field::Email,
            WatchedField::Username => Field::Username,
            WatchedField::Phone => Field::Phone,
        }
    }

    /// Request body key for the availability endpoint
    pub fn as_str(&self) -> &'static str {
        self.field().as_str()
    }

    /// Whether a value is worth asking the backend about
    pub fn passes_guard(&self, value: &str) -> bool {
        match self {
            WatchedField::Email | WatchedField::Username => value.chars().count() >= MIN_CHECK_LEN,
            WatchedField::Phone => is_valid_phone(value),
        }
    }

    /// Error shown while the value is taken
    pub fn taken_message(&self) -> &'static str {
        match self {
            WatchedField::Email => "This email is already registered",
            WatchedField::Username => "This username is already taken",
            WatchedField::Phone => "This phone number is already registered",
        }
    }

    fn index(&self) -> usize {
        match self {
            WatchedField::Email => 0,
            WatchedField::Username => 1,
            WatchedField::Phone => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvailabilityState {
    #[default]
    Idle,
    Checking,
    Available,
    Taken,
}

/// One check handed to the network layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub field: WatchedField,
    pub value: String,
    generation: u64,
}

/// Outcome of feeding a result back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The field was edited after this check was issued
    Stale,
    /// Transport or endpoint failure, degraded silently
    Reset,
    Available,
    Taken,
}

#[derive(Debug, Default)]
struct Slot {
    state: AvailabilityState,
    generation: u64,
    pending: Option<(String, Instant)>,
}

/// Per-field debounce and state tracking
#[derive(Debug)]
pub struct AvailabilityTracker {
    window: Duration,
    slots: [Slot; 3],
}

impl AvailabilityTracker {
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(500);

    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slots: Default::default(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn state(&self, field: WatchedField) -> AvailabilityState {
        self.slots[field.index()].state
    }

    pub fn has_pending(&self, field: WatchedField) -> bool {
        self.slots[field.index()].pending.is_some()
    }

    /// Record an edit. Returns true when a check was scheduled.
    pub fn on_edit(&mut self, field: WatchedField, value: &str, now: Instant) -> bool {
        let window = self.window;
        let slot = &mut self.slots[field.index()];
        slot.generation += 1;
        slot.state = AvailabilityState::Idle;

        if !field.passes_guard(value) {
            slot.pending = None;
            return false;
        }

        slot.pending = Some((value.to_string(), now + window));
        tracing::debug!(field = field.as_str(), "Availability check scheduled");
        true
    }

    /// Hand out every check whose quiet period has elapsed
    pub fn take_due(&mut self, now: Instant) -> Vec<CheckRequest> {
        let mut due = Vec::new();
        for field in WatchedField::ALL {
            let slot = &mut self.slots[field.index()];
            let ready = matches!(&slot.pending, Some((_, at)) if *at <= now);
            if !ready {
                continue;
            }
            if let Some((value, _)) = slot.pending.take() {
                slot.state = AvailabilityState::Checking;
                due.push(CheckRequest {
                    field,
                    value,
                    generation: slot.generation,
                });
            }
        }
        due
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots
            .iter()
            .filter_map(|s| s.pending.as_ref().map(|(_, at)| *at))
            .min()
    }

    /// Apply a finished check
    pub fn resolve(&mut self, request: &CheckRequest, result: &Result<bool, ApiError>) -> Resolution {
        let slot = &mut self.slots[request.field.index()];
        if slot.generation != request.generation {
            return Resolution::Stale;
        }

        match result {
            Ok(true) => {
                slot.state = AvailabilityState::Available;
                Resolution::Available
            }
            Ok(false) => {
                slot.state = AvailabilityState::Taken;
                Resolution::Taken
            }
            Err(e) => {
                tracing::debug!(field = request.field.as_str(), "Availability check unavailable: {}", e);
                slot.state = AvailabilityState::Idle;
                Resolution::Reset
            }
        }
    }

    /// Drop all scheduled checks and invalidate those in flight
    pub fn cancel_all(&mut self) {
        for slot in &mut self.slots {
            slot.pending = None;
            slot.generation += 1;
            if slot.state == AvailabilityState::Checking {
                slot.state = AvailabilityState::Idle;
            }
        }
    }
}

impl Default for AvailabilityTracker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport_error() -> ApiError {
        ApiError::UnexpectedStatus {
            endpoint: "/auth/check-availability".to_string(),
            status: 404,
        }
    }

    #[test]
    fn test_short_values_never_schedule() {
        let mut tracker = AvailabilityTracker::default();
        let start = Instant::now();

        assert!(!tracker.on_edit(WatchedField::Username, "a", start));
        assert!(!tracker.on_edit(WatchedField::Username, "al", start));
        assert!(tracker.take_due(start + Duration::from_secs(5)).is_empty());
        assert_eq!(tracker.state(WatchedField::Username), AvailabilityState::Idle);
    }

    #[test]
    fn test_check_fires_after_window() {
        let mut tracker = AvailabilityTracker::default();
        let start = Instant::now();

        assert!(tracker.on_edit(WatchedField::Username, "ali", start));
        assert!(tracker.take_due(start + Duration::from_millis(499)).is_empty());

        let due = tracker.take_due(start + Duration::from_millis(500));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].value, "ali");
        assert_eq!(tracker.state(WatchedField::Username), AvailabilityState::Checking);

        // Handed out once only
        assert!(tracker.take_due(start + Duration::from_secs(2)).is_empty());
    }

    #[test]
    fn test_edit_within_window_restarts_debounce() {
        let mut tracker = AvailabilityTracker::default();
        let start = Instant::now();

        tracker.on_edit(WatchedField::Email, "ali@ex", start);
        tracker.on_edit(WatchedField::Email, "ali@example.com", start + Duration::from_millis(300));

        assert!(tracker.take_due(start + Duration::from_millis(600)).is_empty());
        let due = tracker.take_due(start + Duration::from_millis(800));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].value, "ali@example.com");
    }

    #[test]
    fn test_fields_are_independent() {
        let mut tracker = AvailabilityTracker::default();
        let start = Instant::now();

        tracker.on_edit(WatchedField::Email, "ali@example.com", start);
        tracker.on_edit(WatchedField::Phone, "0512345678", start + Duration::from_millis(200));
        assert_eq!(
            tracker.next_deadline(),
            Some(start + Duration::from_millis(500))
        );

        let due = tracker.take_due(start + Duration::from_millis(500));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].field, WatchedField::Email);
        assert!(tracker.has_pending(WatchedField::Phone));
    }

    #[test]
    fn test_phone_guard() {
        let mut tracker = AvailabilityTracker::default();
        let start = Instant::now();
        assert!(!tracker.on_edit(WatchedField::Phone, "05123", start));
        assert!(!tracker.on_edit(WatchedField::Phone, "1234567890", start));
        assert!(tracker.on_edit(WatchedField::Phone, "0512345678", start));
    }

    #[test]
    fn test_resolution_transitions() {
        let mut tracker = AvailabilityTracker::default();
        let start = Instant::now();
        let later = start + Duration::from_secs(1);

        tracker.on_edit(WatchedField::Username, "ali", start);
        let req = tracker.take_due(later).remove(0);
        assert_eq!(tracker.resolve(&req, &Ok(false)), Resolution::Taken);
        assert_eq!(tracker.state(WatchedField::Username), AvailabilityState::Taken);

        tracker.on_edit(WatchedField::Username, "ali2", later);
        let req = tracker.take_due(later + Duration::from_secs(1)).remove(0);
        assert_eq!(tracker.resolve(&req, &Err(transport_error())), Resolution::Reset);
        assert_eq!(tracker.state(WatchedField::Username), AvailabilityState::Idle);
    }

    #[test]
    fn test_stale_results_are_ignored() {
        let mut tracker = AvailabilityTracker::default();
        let start = Instant::now();

        tracker.on_edit(WatchedField::Username, "ali", start);
        let req = tracker.take_due(start + Duration::from_secs(1)).remove(0);

        tracker.on_edit(WatchedField::Username, "alia", start + Duration::from_secs(1));
        assert_eq!(tracker.resolve(&req, &Ok(false)), Resolution::Stale);
        assert_eq!(tracker.state(WatchedField::Username), AvailabilityState::Idle);
    }

    #[test]
    fn test_cancel_all() {
        let mut tracker = AvailabilityTracker::default();
        let start = Instant::now();

        tracker.on_edit(WatchedField::Email, "ali@example.com", start);
        tracker.on_edit(WatchedField::Username, "ali", start);
        let in_flight = tracker.take_due(start + Duration::from_secs(1));
        tracker.on_edit(WatchedField::Phone, "0512345678", start + Duration::from_secs(1));

        tracker.cancel_all();
        assert!(tracker.next_deadline().is_none());
        for req in &in_flight {
            assert_eq!(tracker.resolve(req, &Ok(true)), Resolution::Stale);
        }
    }
}
