//! Multi-step form wizard
//!
//! Drives a [`FormSchema`] through its steps and into the submitter.
//!
//! ```text
//!            advance (step k complete)       submit (step N complete)
//!  Step(1) ─────────────▶ ... ─────────────▶ Step(N) ─────────────▶ Submitting
//!     ▲       ◀───────────      retreat                                │
//!     │                                               ┌────────────────┤
//!     │                          Failure(reason):     │                │ Success
//!     │                          back to Step(N),     ▼                ▼
//!     │                          fields kept       Step(N)         Submitted
//!     └─────────────────── reset to defaults ──────────────────────────┘
//! ```
//!
//! Every operation is total: anything not allowed in the current state is a
//! no-op that reports why through [`Navigation`] or [`SubmitAttempt`].
//!
//! The state lives behind a mutex and `submit` takes `&self`, so a page
//! that fires submit twice (double click) while the first is pending gets
//! the second rejected instead of a duplicate booking.

use crate::form::{BookingForm, ContactForm, Fields, FormSchema};
use crate::notify::{Notice, NotificationSink};
use crate::submit::{SubmitOutcome, Submission, Submitter};
use crate::util::lock;
use chrono::{Local, NaiveDate};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Supplies "today" for date rules
pub type TodayFn = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub type BookingWizard = Wizard<BookingForm>;
pub type ContactWizard = Wizard<ContactForm>;

/// Render state of a wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    pub current_step: u8,
    pub fields: Fields,
    pub is_submitting: bool,
}

impl WizardState {
    fn initial<F: FormSchema>() -> Self {
        Self {
            current_step: 1,
            fields: F::defaults(),
            is_submitting: false,
        }
    }
}

/// Where the wizard is, as a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    Step(u8),
    Submitting,
}

/// Why an operation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocked {
    /// The step still has required input missing
    StepIncomplete(u8),
    /// Already on the first step
    FirstStep,
    /// Already on the last step (submit instead)
    LastStep,
    /// Submit is only available on the last step
    NotOnFinalStep(u8),
    /// A submission is in flight
    Submitting,
}

/// Result of `advance` / `retreat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: u8, to: u8 },
    Blocked(Blocked),
}

impl Navigation {
    pub fn moved(&self) -> bool {
        matches!(self, Navigation::Moved { .. })
    }
}

/// Result of `submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAttempt {
    /// Endpoint accepted it; the form is back at step 1 with defaults
    Submitted,
    /// Endpoint refused it; still on the last step with fields intact
    Failed(String),
    /// Submit was not allowed; the endpoint was not called
    Rejected(Blocked),
}

/// Clears the in-flight flag if a pending submit is dropped mid-await
struct InFlight<'a> {
    state: &'a Mutex<WizardState>,
    armed: bool,
}

impl InFlight<'_> {
    fn settle(mut self, apply: impl FnOnce(&mut WizardState)) {
        self.armed = false;
        apply(&mut lock(self.state));
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock(self.state).is_submitting = false;
        }
    }
}

/// Step-by-step controller for one form
pub struct Wizard<F: FormSchema> {
    state: Mutex<WizardState>,
    submitter: Arc<dyn Submitter>,
    notifier: Arc<dyn NotificationSink>,
    today: TodayFn,
    timeout: Option<Duration>,
    _form: PhantomData<fn() -> F>,
}

impl<F: FormSchema> Wizard<F> {
    pub fn new(submitter: Arc<dyn Submitter>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            state: Mutex::new(WizardState::initial::<F>()),
            submitter,
            notifier,
            today: Arc::new(|| Local::now().date_naive()),
            timeout: None,
            _form: PhantomData,
        }
    }

    /// Give up on the endpoint after `limit` and treat it as a failure
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Override the clock used by date rules
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Render state
    // ─────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> WizardState {
        lock(&self.state).clone()
    }

    pub fn current_step(&self) -> u8 {
        lock(&self.state).current_step
    }

    pub fn is_submitting(&self) -> bool {
        lock(&self.state).is_submitting
    }

    pub fn phase(&self) -> WizardPhase {
        let state = lock(&self.state);
        if state.is_submitting {
            WizardPhase::Submitting
        } else {
            WizardPhase::Step(state.current_step)
        }
    }

    pub fn field(&self, name: &str) -> String {
        lock(&self.state).fields.get(name).to_string()
    }

    pub fn steps(&self) -> u8 {
        F::STEPS
    }

    pub fn is_step_complete(&self, step: u8) -> bool {
        let today = (self.today)();
        F::is_step_complete(step, &lock(&self.state).fields, today)
    }

    /// Whether the "Next" affordance should be enabled
    pub fn can_advance(&self) -> bool {
        let state = lock(&self.state);
        !state.is_submitting
            && state.current_step < F::STEPS
            && F::is_step_complete(state.current_step, &state.fields, (self.today)())
    }

    /// Whether the submit affordance should be enabled
    pub fn can_submit(&self) -> bool {
        let state = lock(&self.state);
        !state.is_submitting
            && state.current_step == F::STEPS
            && first_incomplete_step::<F>(&state.fields, (self.today)()).is_none()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────

    /// Update one field. Allowed on any step; never moves between steps.
    pub fn set_field(&self, name: &str, value: impl Into<String>) {
        lock(&self.state).fields.set(name, value);
    }

    /// Move to the next step if the current one is complete
    pub fn advance(&self) -> Navigation {
        let today = (self.today)();
        let mut state = lock(&self.state);
        let from = state.current_step;

        let outcome = if state.is_submitting {
            Navigation::Blocked(Blocked::Submitting)
        } else if from >= F::STEPS {
            Navigation::Blocked(Blocked::LastStep)
        } else if !F::is_step_complete(from, &state.fields, today) {
            Navigation::Blocked(Blocked::StepIncomplete(from))
        } else {
            state.current_step = from + 1;
            Navigation::Moved { from, to: from + 1 }
        };

        tracing::debug!(form = %F::KIND, step = from, ?outcome, "advance");
        outcome
    }

    /// Move back one step
    pub fn retreat(&self) -> Navigation {
        let mut state = lock(&self.state);
        let from = state.current_step;

        let outcome = if state.is_submitting {
            Navigation::Blocked(Blocked::Submitting)
        } else if from <= 1 {
            Navigation::Blocked(Blocked::FirstStep)
        } else {
            state.current_step = from - 1;
            Navigation::Moved { from, to: from - 1 }
        };

        tracing::debug!(form = %F::KIND, step = from, ?outcome, "retreat");
        outcome
    }

    /// Send the form. Only valid on the last step, once every step is complete.
    ///
    /// Fields can change on any step, so all steps are re-checked here.
    ///
    /// On success a single confirmation notice is sent and the form resets.
    /// On failure (including timeout) an error notice is sent and the user
    /// stays on the last step with everything they typed.
    pub async fn submit(&self) -> SubmitAttempt {
        let today = (self.today)();
        let fields = {
            let mut state = lock(&self.state);
            let blocked = if state.is_submitting {
                Some(Blocked::Submitting)
            } else if state.current_step != F::STEPS {
                Some(Blocked::NotOnFinalStep(state.current_step))
            } else {
                first_incomplete_step::<F>(&state.fields, today).map(Blocked::StepIncomplete)
            };

            if let Some(reason) = blocked {
                tracing::debug!(form = %F::KIND, ?reason, "submit rejected");
                return SubmitAttempt::Rejected(reason);
            }

            state.is_submitting = true;
            state.fields.clone()
        };

        let in_flight = InFlight {
            state: &self.state,
            armed: true,
        };

        tracing::info!(form = %F::KIND, "Submitting");
        let pending = self.submitter.submit(Submission::new(F::KIND, fields));
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .unwrap_or_else(|_| {
                    SubmitOutcome::Failure(format!("No response after {}s", limit.as_secs_f32()))
                }),
            None => pending.await,
        };

        match outcome {
            SubmitOutcome::Success => {
                in_flight.settle(|state| *state = WizardState::initial::<F>());
                tracing::info!(form = %F::KIND, "Submitted, form reset");
                self.notifier.notify(F::success_notice());
                SubmitAttempt::Submitted
            }
            SubmitOutcome::Failure(reason) => {
                in_flight.settle(|state| {
                    state.is_submitting = false;
                    state.current_step = F::STEPS;
                });
                tracing::warn!(form = %F::KIND, %reason, "Submission failed");
                self.notifier.notify(Notice::error(
                    format!("{} not sent", F::KIND.label()),
                    format!("{}. Your details are still here, please try again.", reason),
                ));
                SubmitAttempt::Failed(reason)
            }
        }
    }
}

/// Lowest step whose required input is missing
fn first_incomplete_step<F: FormSchema>(fields: &Fields, today: NaiveDate) -> Option<u8> {
    (1..=F::STEPS).find(|&step| !F::is_step_complete(step, fields, today))
}

impl<F: FormSchema> fmt::Debug for Wizard<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wizard")
            .field("form", &F::KIND)
            .field("state", &*lock(&self.state))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::field;
    use crate::notify::{NoticeLevel, ToastQueue};
    use futures::future::{BoxFuture, FutureExt};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    /// Endpoint that answers with a fixed outcome, optionally after a gate opens
    struct ScriptedSubmitter {
        outcome: SubmitOutcome,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedSubmitter {
        fn new(outcome: SubmitOutcome) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn gated(outcome: SubmitOutcome, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(outcome)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Submitter for ScriptedSubmitter {
        fn submit(&self, _submission: Submission) -> BoxFuture<'static, SubmitOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self.outcome.clone();
            let gate = self.gate.clone();
            async move {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                outcome
            }
            .boxed()
        }
    }

    fn booking(
        submitter: Arc<ScriptedSubmitter>,
        toasts: &ToastQueue,
    ) -> BookingWizard {
        BookingWizard::new(submitter, Arc::new(toasts.clone())).with_today(today)
    }

    fn fill_to_last_step(wizard: &BookingWizard) {
        wizard.set_field(field::SERVICE, "Teeth Cleaning");
        assert!(wizard.advance().moved());
        wizard.set_field(field::DATE, "2026-03-12");
        assert!(wizard.advance().moved());
        wizard.set_field(field::TIME, "10:00 AM");
        assert!(wizard.advance().moved());
        wizard.set_field(field::NAME, "Jennifer L.");
        wizard.set_field(field::PHONE, "(555) 123-4567");
        wizard.set_field(field::EMAIL, "jen@example.com");
    }

    #[test]
    fn test_advance_gated_by_first_step() {
        let toasts = ToastQueue::default();
        let wizard = booking(Arc::new(ScriptedSubmitter::new(SubmitOutcome::Success)), &toasts);

        assert_eq!(
            wizard.advance(),
            Navigation::Blocked(Blocked::StepIncomplete(1))
        );
        assert_eq!(wizard.current_step(), 1);

        wizard.set_field(field::SERVICE, "Teeth Cleaning");
        assert_eq!(wizard.advance(), Navigation::Moved { from: 1, to: 2 });
        assert_eq!(wizard.current_step(), 2);
    }

    #[test]
    fn test_advance_succeeds_iff_step_complete() {
        let toasts = ToastQueue::default();
        let wizard = booking(Arc::new(ScriptedSubmitter::new(SubmitOutcome::Success)), &toasts);
        let inputs = [
            (field::SERVICE, "General Checkup"),
            (field::DATE, "2026-03-10"),
            (field::TIME, "2:00 PM"),
        ];

        for (k, (name, value)) in inputs.into_iter().enumerate() {
            let step = k as u8 + 1;
            let before = wizard.snapshot();
            assert!(!wizard.is_step_complete(step));
            assert!(!wizard.advance().moved());
            assert_eq!(wizard.snapshot(), before);

            wizard.set_field(name, value);
            assert!(wizard.is_step_complete(step));
            assert_eq!(wizard.advance(), Navigation::Moved { from: step, to: step + 1 });
        }

        // Last step: advancing is never possible, even when complete
        wizard.set_field(field::NAME, "Robert K.");
        wizard.set_field(field::PHONE, "555");
        wizard.set_field(field::EMAIL, "rk@example.com");
        assert!(wizard.is_step_complete(4));
        assert_eq!(wizard.advance(), Navigation::Blocked(Blocked::LastStep));
        assert_eq!(wizard.current_step(), 4);
    }

    #[test]
    fn test_past_date_blocks_step_two() {
        let toasts = ToastQueue::default();
        let wizard = booking(Arc::new(ScriptedSubmitter::new(SubmitOutcome::Success)), &toasts);
        wizard.set_field(field::SERVICE, "Cosmetic Consultation");
        wizard.advance();

        wizard.set_field(field::DATE, "2026-03-09");
        assert!(!wizard.can_advance());
        assert_eq!(
            wizard.advance(),
            Navigation::Blocked(Blocked::StepIncomplete(2))
        );
    }

    #[test]
    fn test_retreat() {
        let toasts = ToastQueue::default();
        let wizard = booking(Arc::new(ScriptedSubmitter::new(SubmitOutcome::Success)), &toasts);
        assert_eq!(wizard.retreat(), Navigation::Blocked(Blocked::FirstStep));
        assert_eq!(wizard.current_step(), 1);

        fill_to_last_step(&wizard);
        assert_eq!(wizard.retreat(), Navigation::Moved { from: 4, to: 3 });
        assert_eq!(wizard.retreat(), Navigation::Moved { from: 3, to: 2 });
        assert_eq!(wizard.retreat(), Navigation::Moved { from: 2, to: 1 });
        assert_eq!(wizard.retreat(), Navigation::Blocked(Blocked::FirstStep));

        // Going back keeps what was entered
        assert_eq!(wizard.field(field::TIME), "10:00 AM");
    }

    #[test]
    fn test_set_field_never_moves() {
        let toasts = ToastQueue::default();
        let wizard = booking(Arc::new(ScriptedSubmitter::new(SubmitOutcome::Success)), &toasts);
        wizard.set_field(field::EMAIL, "early@example.com");
        wizard.set_field(field::SERVICE, "Other (please specify)");
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.field(field::EMAIL), "early@example.com");
    }

    #[tokio::test]
    async fn test_successful_submit_resets_and_notifies_once() {
        let toasts = ToastQueue::default();
        let submitter = Arc::new(ScriptedSubmitter::new(SubmitOutcome::Success));
        let wizard = booking(submitter.clone(), &toasts);
        fill_to_last_step(&wizard);
        assert!(wizard.can_submit());

        assert_eq!(wizard.submit().await, SubmitAttempt::Submitted);

        let state = wizard.snapshot();
        assert_eq!(state.current_step, 1);
        assert_eq!(state.fields, BookingForm::defaults());
        assert!(!state.is_submitting);
        assert_eq!(submitter.calls(), 1);

        let notices = toasts.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert_eq!(notices[0].title, "Appointment Booked!");
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_fields() {
        let toasts = ToastQueue::default();
        let submitter = Arc::new(ScriptedSubmitter::new(SubmitOutcome::Failure(
            "Service unavailable".into(),
        )));
        let wizard = booking(submitter.clone(), &toasts);
        fill_to_last_step(&wizard);
        let before = wizard.snapshot();

        assert_eq!(
            wizard.submit().await,
            SubmitAttempt::Failed("Service unavailable".into())
        );
        assert_eq!(wizard.snapshot(), before);
        assert_eq!(wizard.phase(), WizardPhase::Step(4));

        let notices = toasts.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].title, "Booking not sent");

        // Retry is allowed straight away
        assert!(wizard.can_submit());
        assert!(matches!(wizard.submit().await, SubmitAttempt::Failed(_)));
        assert_eq!(submitter.calls(), 2);
    }

    #[tokio::test]
    async fn test_submit_rejected_before_last_step() {
        let toasts = ToastQueue::default();
        let submitter = Arc::new(ScriptedSubmitter::new(SubmitOutcome::Success));
        let wizard = booking(submitter.clone(), &toasts);
        wizard.set_field(field::SERVICE, "Teeth Cleaning");

        assert_eq!(
            wizard.submit().await,
            SubmitAttempt::Rejected(Blocked::NotOnFinalStep(1))
        );
        assert_eq!(submitter.calls(), 0);
        assert!(toasts.is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejected_when_last_step_incomplete() {
        let toasts = ToastQueue::default();
        let submitter = Arc::new(ScriptedSubmitter::new(SubmitOutcome::Success));
        let wizard = booking(submitter.clone(), &toasts);
        fill_to_last_step(&wizard);
        wizard.set_field(field::PHONE, "");

        assert_eq!(
            wizard.submit().await,
            SubmitAttempt::Rejected(Blocked::StepIncomplete(4))
        );
        assert_eq!(submitter.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_rechecks_earlier_steps() {
        let toasts = ToastQueue::default();
        let submitter = Arc::new(ScriptedSubmitter::new(SubmitOutcome::Success));
        let wizard = booking(submitter.clone(), &toasts);
        fill_to_last_step(&wizard);

        // Edits made from the last step can empty an earlier one
        wizard.set_field(field::SERVICE, "");
        wizard.set_field(field::DATE, "");
        assert!(wizard.is_step_complete(4));
        assert!(!wizard.can_submit());
        assert_eq!(
            wizard.submit().await,
            SubmitAttempt::Rejected(Blocked::StepIncomplete(1))
        );

        wizard.set_field(field::SERVICE, "Teeth Cleaning");
        assert_eq!(
            wizard.submit().await,
            SubmitAttempt::Rejected(Blocked::StepIncomplete(2))
        );
        assert_eq!(submitter.calls(), 0);
        assert!(toasts.is_empty());
        assert_eq!(wizard.current_step(), 4);
    }

    #[tokio::test]
    async fn test_submit_rejects_date_that_has_passed() {
        let toasts = ToastQueue::default();
        let submitter = Arc::new(ScriptedSubmitter::new(SubmitOutcome::Success));
        let wizard = booking(submitter.clone(), &toasts);
        fill_to_last_step(&wizard);

        // Page left open until after the chosen day
        let wizard =
            wizard.with_today(|| NaiveDate::from_ymd_opt(2026, 3, 13).unwrap());
        assert_eq!(
            wizard.submit().await,
            SubmitAttempt::Rejected(Blocked::StepIncomplete(2))
        );
        assert_eq!(submitter.calls(), 0);
    }

    #[tokio::test]
    async fn test_double_submit_calls_endpoint_once() {
        let toasts = ToastQueue::default();
        let gate = Arc::new(Notify::new());
        let submitter = Arc::new(ScriptedSubmitter::gated(SubmitOutcome::Success, gate.clone()));
        let wizard = booking(submitter.clone(), &toasts);
        fill_to_last_step(&wizard);

        let first = wizard.submit();
        let second = async {
            // Runs while the first submit waits on the gate
            while !wizard.is_submitting() {
                tokio::task::yield_now().await;
            }
            let attempt = wizard.submit().await;
            assert!(wizard.is_submitting());
            assert_eq!(wizard.phase(), WizardPhase::Submitting);
            assert_eq!(wizard.retreat(), Navigation::Blocked(Blocked::Submitting));
            gate.notify_one();
            attempt
        };

        let (first, second) = tokio::join!(first, second);
        assert_eq!(first, SubmitAttempt::Submitted);
        assert_eq!(second, SubmitAttempt::Rejected(Blocked::Submitting));
        assert_eq!(submitter.calls(), 1);
        assert_eq!(toasts.drain().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let toasts = ToastQueue::default();
        let gate = Arc::new(Notify::new());
        let submitter = Arc::new(ScriptedSubmitter::gated(SubmitOutcome::Success, gate));
        let wizard = booking(submitter, &toasts).with_timeout(Duration::from_secs(10));
        fill_to_last_step(&wizard);

        let attempt = wizard.submit().await;
        assert!(matches!(attempt, SubmitAttempt::Failed(reason) if reason.contains("10s")));
        assert_eq!(wizard.current_step(), 4);
        assert!(!wizard.is_submitting());
        assert_eq!(wizard.field(field::NAME), "Jennifer L.");
    }

    #[tokio::test]
    async fn test_dropped_submit_clears_in_flight_flag() {
        let toasts = ToastQueue::default();
        let gate = Arc::new(Notify::new());
        let submitter = Arc::new(ScriptedSubmitter::gated(SubmitOutcome::Success, gate));
        let wizard = booking(submitter, &toasts);
        fill_to_last_step(&wizard);

        {
            let pending = wizard.submit();
            tokio::pin!(pending);
            // Poll once so the submission is in flight, then abandon it
            assert!(futures::poll!(pending.as_mut()).is_pending());
            assert!(wizard.is_submitting());
        }

        assert!(!wizard.is_submitting());
        assert!(wizard.can_submit());
        assert!(toasts.is_empty());
    }

    #[tokio::test]
    async fn test_contact_form_single_step() {
        let toasts = ToastQueue::default();
        let submitter = Arc::new(ScriptedSubmitter::new(SubmitOutcome::Success));
        let wizard = ContactWizard::new(submitter.clone(), Arc::new(toasts.clone()));

        assert_eq!(wizard.steps(), 1);
        assert_eq!(wizard.advance(), Navigation::Blocked(Blocked::LastStep));
        assert_eq!(
            wizard.submit().await,
            SubmitAttempt::Rejected(Blocked::StepIncomplete(1))
        );

        wizard.set_field(field::NAME, "Lisa T.");
        wizard.set_field(field::EMAIL, "lisa@example.com");
        wizard.set_field(field::SUBJECT, "Emergency");
        wizard.set_field(field::MESSAGE, "Chipped a tooth, can you fit me in?");
        assert_eq!(wizard.submit().await, SubmitAttempt::Submitted);

        assert_eq!(wizard.field(field::SUBJECT), "General Question");
        assert_eq!(wizard.field(field::MESSAGE), "");
        assert_eq!(toasts.drain()[0].title, "Message Sent!");
    }
}
