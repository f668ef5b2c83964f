/// Messaging module for wizard events
///
/// The session publishes an `Event` for every transition; front ends
/// subscribe and render progress and transient notices from them.
///
/// ## Architecture
///
/// ```text
/// ┌─────────────────────┐     Event      ┌─────────────┐
/// │ RegistrationSession │ ─────────────> │  Event Bus  │
/// └─────────────────────┘                └─────────────┘
///                                               │
///                                               │ Publishes
///                                               ▼
///                                         ┌────────────┐
///                                         │ Subscribers│
///                                         │ (CLI, UI)  │
///                                         └────────────┘
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let (rx, _id) = session.subscribe();
///
/// session.submit()?;
///
/// for event in rx.try_iter().filter(Event::is_notice) {
///     match event {
///         Event::SubmissionFailed { failure } => eprintln!("{}", failure),
///         _ => {}
///     }
/// }
/// ```

pub mod bus;
pub mod events;

pub use bus::{EventBus, SubscriberId};
pub use events::Event;
