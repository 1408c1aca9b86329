//! Submission capability: where finished forms go
//!
//! The wizard treats submission as a boundary call with unknown latency
//! that either succeeds or fails with a reason. Swapping the simulated
//! endpoint for a real backend means implementing [`Submitter`]; the
//! wizard itself does not change.

use crate::form::{Fields, FormKind};
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Simulated latency of a booking request
pub const BOOKING_DELAY: Duration = Duration::from_millis(2000);

/// Simulated latency of a contact message
pub const CONTACT_DELAY: Duration = Duration::from_millis(1500);

/// Payload handed to the submitter
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub form: FormKind,
    pub fields: Fields,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(form: FormKind, fields: Fields) -> Self {
        Self {
            form,
            fields,
            submitted_at: Utc::now(),
        }
    }

    /// Names of the fields that carry a value. Safe to log; values are not.
    pub fn filled_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Result of a submission attempt as reported by the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Success,
    Failure(String),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Success)
    }
}

/// Capability to persist a finished form
///
/// The returned future owns everything it needs, so the caller may hold
/// no locks and borrow nothing while it is pending.
pub trait Submitter: Send + Sync {
    fn submit(&self, submission: Submission) -> BoxFuture<'static, SubmitOutcome>;
}

/// Stand-in endpoint: waits a fixed delay, then succeeds
///
/// `fail_first` makes the first N attempts fail, which is how the demo
/// shows the retry path.
#[derive(Debug)]
pub struct SimulatedSubmitter {
    delay: Duration,
    fail_first: u32,
    attempts: AtomicU32,
}

impl SimulatedSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fail_first: 0,
            attempts: AtomicU32::new(0),
        }
    }

    pub fn failing_first(mut self, attempts: u32) -> Self {
        self.fail_first = attempts;
        self
    }

    /// Number of submissions received so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Submitter for SimulatedSubmitter {
    fn submit(&self, submission: Submission) -> BoxFuture<'static, SubmitOutcome> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let fail = attempt <= self.fail_first;
        let delay = self.delay;

        async move {
            tracing::debug!(
                form = %submission.form,
                attempt,
                fields = ?submission.filled_fields(),
                "Simulated submit"
            );

            tokio::time::sleep(delay).await;

            if fail {
                SubmitOutcome::Failure(format!("Service unavailable (attempt {})", attempt))
            } else {
                SubmitOutcome::Success
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::field;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_submit_waits_then_succeeds() {
        let submitter = SimulatedSubmitter::new(BOOKING_DELAY);
        let started = tokio::time::Instant::now();

        let outcome = submitter
            .submit(Submission::new(FormKind::Booking, Fields::new()))
            .await;

        assert_eq!(outcome, SubmitOutcome::Success);
        assert!(started.elapsed() >= BOOKING_DELAY);
        assert_eq!(submitter.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_submit_fails_first_attempts() {
        let submitter = SimulatedSubmitter::new(CONTACT_DELAY).failing_first(2);
        let submission = Submission::new(FormKind::Contact, Fields::new());

        assert!(!submitter.submit(submission.clone()).await.is_success());
        assert!(!submitter.submit(submission.clone()).await.is_success());
        assert!(submitter.submit(submission).await.is_success());
    }

    #[test]
    fn test_submission_payload_shape() {
        let fields = Fields::from_iter([(field::NAME, "Lisa T."), (field::EMAIL, "lisa@example.com")]);
        let json = serde_json::to_value(Submission::new(FormKind::Contact, fields)).unwrap();

        assert_eq!(json["form"], "contact");
        assert_eq!(json["fields"]["name"], "Lisa T.");
        assert!(json["submitted_at"].is_string());
    }

    #[test]
    fn test_filled_fields_lists_names_only() {
        let fields = Fields::from_iter([
            (field::NAME, "Lisa T."),
            (field::PHONE, ""),
            (field::EMAIL, "lisa@example.com"),
        ]);
        let submission = Submission::new(FormKind::Booking, fields);

        assert_eq!(submission.filled_fields(), vec![field::EMAIL, field::NAME]);
    }
}
