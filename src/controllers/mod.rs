//! Interaction controllers
//!
//! Framework-independent state machines behind the site's interactive
//! sections. Each controller owns its state exclusively and exposes it
//! read-only; the page renders from snapshots and calls operations.
//!
//! | Controller | Section | Capabilities used |
//! |------------|---------|-------------------|
//! | [`RevealController`] | every section | [`ViewportObserver`](crate::viewport::ViewportObserver) |
//! | [`Wizard`] | booking, contact | [`Submitter`](crate::submit::Submitter), [`NotificationSink`](crate::notify::NotificationSink) |
//! | [`Carousel`] | testimonials | [`Scheduler`](crate::scheduler::Scheduler) |
//! | [`CountUp`] | about | [`Scheduler`](crate::scheduler::Scheduler) |
//!
//! No controller shares mutable state with another. The only link is the
//! reveal hook, which hands a start action to the count-up.

pub mod carousel;
pub mod countup;
pub mod reveal;
pub mod wizard;

pub use carousel::{Carousel, CarouselState, TimerPolicy};
pub use countup::{CountUp, CountUpSettings, CountUpState, Counter};
pub use reveal::{RevealController, VisibilityState};
pub use wizard::{
    Blocked, BookingWizard, ContactWizard, Navigation, SubmitAttempt, Wizard, WizardPhase,
    WizardState,
};
