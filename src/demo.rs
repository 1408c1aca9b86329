// Demo mode: a headless visit to the practice website
//
// Drives every controller with real timers so the logs read like a session:
// - Scrolls a simulated page, revealing sections as they come into view
// - The About reveal kicks off the stats count-up
// - The testimonial carousel auto-advances, with a couple of manual clicks
// - Books an appointment (optionally failing the first attempts) and
//   sends a contact message
// - Prints the toasts the visitor would have seen
//
// Run with: cargo run --release -- demo --fail-first 1

use crate::config::Config;
use crate::controllers::{
    countup::practice_stats, BookingWizard, Carousel, ContactWizard, CountUp, RevealController,
    SubmitAttempt,
};
use crate::form::{field, DATE_FORMAT};
use crate::notify::{Notice, NotificationSink, ToastQueue};
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::submit::SimulatedSubmitter;
use crate::viewport::{Region, RegionId, ScrollViewport, ViewportObserver};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::sleep;

/// Height of the simulated browser window
const VIEWPORT_HEIGHT: f64 = 800.0;

/// Pixels scrolled per step
const SCROLL_STEP: f64 = 200.0;

/// Page sections, top to bottom: (id, height)
const SECTIONS: &[(&str, f64)] = &[
    ("hero", 800.0),
    ("about", 600.0),
    ("services", 900.0),
    ("testimonials", 500.0),
    ("booking", 900.0),
    ("contact", 700.0),
];

/// Options set from the command line
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Make the booking endpoint refuse this many attempts first
    pub fail_first: u32,
    /// Pause between scroll steps
    pub scroll_pause: Duration,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            fail_first: 0,
            scroll_pause: Duration::from_millis(300),
        }
    }
}

/// One patient quote on the carousel
#[derive(Debug, Clone, Serialize)]
pub struct Testimonial {
    pub name: &'static str,
    pub text: &'static str,
    pub rating: u8,
}

/// Quotes shown in the testimonials section
pub fn testimonials() -> Vec<Testimonial> {
    vec![
        Testimonial {
            name: "Sarah M.",
            text: "Dr. Johnson made me feel so comfortable during my visit. The staff is friendly and the office is very clean and modern.",
            rating: 5,
        },
        Testimonial {
            name: "Mike R.",
            text: "I was nervous about getting dental work done, but the team here was amazing. They explained everything and made sure I was comfortable.",
            rating: 5,
        },
        Testimonial {
            name: "Jennifer L.",
            text: "Best dental experience I've ever had! The technology they use is impressive and the results are perfect.",
            rating: 5,
        },
        Testimonial {
            name: "Robert K.",
            text: "My whole family comes here now. Dr. Johnson is great with kids and adults alike. Highly recommend!",
            rating: 5,
        },
        Testimonial {
            name: "Lisa T.",
            text: "Emergency dental care was needed and they saw me right away. Professional and caring service.",
            rating: 5,
        },
    ]
}

/// What the visitor ended up seeing
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    /// Sections revealed, in page order
    pub revealed: Vec<String>,
    /// Final count-up values
    pub stats: Vec<(String, u64)>,
    /// Testimonial on screen when the visit ended
    pub testimonial: String,
    /// Calls made to the booking endpoint
    pub booking_attempts: u32,
    /// Toasts shown during the visit, oldest first
    pub notices: Vec<Notice>,
}

/// Run the walkthrough until it finishes or `shutdown_rx` fires.
/// Returns `None` when interrupted; every controller is torn down either way.
pub async fn run_demo(
    config: &Config,
    options: DemoOptions,
    shutdown_rx: oneshot::Receiver<()>,
) -> anyhow::Result<Option<DemoReport>> {
    tokio::select! {
        report = walkthrough(config, &options) => report.map(Some),
        // A dropped sender disables this branch rather than interrupting
        Ok(()) = shutdown_rx => {
            tracing::info!("Demo interrupted");
            Ok(None)
        }
    }
}

async fn walkthrough(config: &Config, options: &DemoOptions) -> anyhow::Result<DemoReport> {
    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::current()?);
    let toasts = ToastQueue::new(
        config.notifications.capacity,
        config.notifications.toast_duration(),
    );
    let notifier: Arc<dyn NotificationSink> = Arc::new(toasts.clone());

    // Lay out the page
    let viewport = Arc::new(ScrollViewport::new(VIEWPORT_HEIGHT));
    let mut top = 0.0;
    for (id, height) in SECTIONS {
        viewport.place(*id, Region::new(top, *height));
        top += height;
    }
    let page_height = top;

    // Stats animate once the About section shows up
    let stats = CountUp::new(practice_stats(), Arc::clone(&scheduler), config.stats.settings());

    let observer: Arc<dyn ViewportObserver> = viewport.clone();
    let mut reveals: Vec<RevealController> = SECTIONS
        .iter()
        .map(|(id, _)| {
            let mut reveal =
                RevealController::with_threshold(Arc::clone(&observer), config.reveal.threshold);
            if *id == "about" {
                reveal = reveal.on_reveal(stats.trigger());
            }
            reveal.attach(Some(RegionId::from(*id)));
            reveal
        })
        .collect();

    let mut carousel = Carousel::new(
        testimonials(),
        Arc::clone(&scheduler),
        config.carousel.interval(),
        config.carousel.on_manual,
    )?;
    carousel.start();
    tracing::info!(
        testimonials = carousel.len(),
        interval_ms = config.carousel.interval_ms,
        "Testimonial carousel running"
    );

    // Scroll to the bottom of the page
    while viewport.offset() + VIEWPORT_HEIGHT < page_height {
        sleep(options.scroll_pause).await;
        viewport.scroll_by(SCROLL_STEP);
        tracing::debug!(offset = viewport.offset(), "Scrolled");
    }

    // A visitor clicking through the quotes
    let shown = carousel.next();
    tracing::info!(index = shown, name = carousel.active().name, "Next testimonial");
    let shown = carousel.prev();
    tracing::info!(index = shown, name = carousel.active().name, "Previous testimonial");

    let booking_submitter = Arc::new(
        SimulatedSubmitter::new(config.booking.delay()).failing_first(options.fail_first),
    );
    book_appointment(config, Arc::clone(&booking_submitter), Arc::clone(&notifier)).await;

    send_message(config, Arc::clone(&notifier)).await;

    // Let the count-up land on its targets if it is still running
    let settle = config.stats.settings().start_delay + config.stats.settings().duration;
    let _ = tokio::time::timeout(settle, async {
        while !stats.is_finished() {
            sleep(Duration::from_millis(50)).await;
        }
    })
    .await;

    let revealed = SECTIONS
        .iter()
        .zip(&reveals)
        .filter(|(_, reveal)| reveal.is_revealed())
        .map(|((id, _), _)| id.to_string())
        .collect();

    let report = DemoReport {
        revealed,
        stats: stats.values(),
        testimonial: carousel.active().name.to_string(),
        booking_attempts: booking_submitter.attempts(),
        notices: toasts.drain(),
    };

    // Teardown
    carousel.stop();
    stats.stop();
    for reveal in &mut reveals {
        reveal.detach();
    }
    tracing::debug!(watching = viewport.watching(), "Controllers detached");

    Ok(report)
}

/// Walk the booking wizard from an empty form to a confirmed appointment
async fn book_appointment(
    config: &Config,
    submitter: Arc<SimulatedSubmitter>,
    notifier: Arc<dyn NotificationSink>,
) {
    let mut wizard = BookingWizard::new(submitter, notifier);
    if let Some(limit) = config.booking.timeout() {
        wizard = wizard.with_timeout(limit);
    }

    // Too eager: nothing picked yet
    let nav = wizard.advance();
    tracing::info!(?nav, "Tried to skip the service step");

    wizard.set_field(field::SERVICE, "Teeth Cleaning");
    wizard.advance();

    let visit = chrono::Local::now().date_naive() + chrono::Duration::days(3);
    wizard.set_field(field::DATE, visit.format(DATE_FORMAT).to_string());
    wizard.advance();

    wizard.set_field(field::TIME, "10:00 AM");
    wizard.advance();

    wizard.set_field(field::NAME, "Alex Rivera");
    wizard.set_field(field::PHONE, "(555) 123-4567");
    wizard.set_field(field::EMAIL, "alex@example.com");

    // Fields survive a failed attempt, so retrying is just submitting again
    loop {
        match wizard.submit().await {
            SubmitAttempt::Submitted => {
                tracing::info!(step = wizard.current_step(), "Appointment booked");
                break;
            }
            SubmitAttempt::Failed(reason) => {
                tracing::warn!(%reason, name = %wizard.field(field::NAME), "Booking failed, retrying");
            }
            SubmitAttempt::Rejected(blocked) => {
                tracing::warn!(?blocked, "Booking rejected");
                break;
            }
        }
    }
}

/// Fill and send the one-step contact form
async fn send_message(config: &Config, notifier: Arc<dyn NotificationSink>) {
    let submitter = Arc::new(SimulatedSubmitter::new(config.contact.delay()));
    let mut wizard = ContactWizard::new(submitter, notifier);
    if let Some(limit) = config.contact.timeout() {
        wizard = wizard.with_timeout(limit);
    }

    wizard.set_field(field::NAME, "Alex Rivera");
    wizard.set_field(field::EMAIL, "alex@example.com");
    wizard.set_field(field::MESSAGE, "Do you offer weekend appointments?");

    match wizard.submit().await {
        SubmitAttempt::Submitted => tracing::info!("Contact message sent"),
        other => tracing::warn!(?other, "Contact message not sent"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoticeLevel;

    fn quick_config() -> Config {
        let mut config = Config::default();
        config.carousel.interval_ms = 1000;
        config.booking.submit_delay_ms = 200;
        config.contact.submit_delay_ms = 100;
        config
    }

    fn quick_options(fail_first: u32) -> DemoOptions {
        DemoOptions {
            fail_first,
            scroll_pause: Duration::from_millis(50),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_walkthrough_reveals_every_section() {
        let (_tx, rx) = oneshot::channel();
        let report = run_demo(&quick_config(), quick_options(0), rx)
            .await
            .unwrap()
            .expect("demo should finish");

        let expected: Vec<String> = SECTIONS.iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(report.revealed, expected);
        assert_eq!(
            report.stats,
            vec![
                ("patients".to_string(), 10000),
                ("experience".to_string(), 15),
                ("satisfaction".to_string(), 99),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_walkthrough_retries_failed_booking() {
        let (_tx, rx) = oneshot::channel();
        let report = run_demo(&quick_config(), quick_options(2), rx)
            .await
            .unwrap()
            .expect("demo should finish");

        assert_eq!(report.booking_attempts, 3);
        let levels: Vec<NoticeLevel> = report.notices.iter().map(|n| n.level).collect();
        assert_eq!(
            levels,
            vec![
                NoticeLevel::Error,
                NoticeLevel::Error,
                NoticeLevel::Success,
                NoticeLevel::Success,
            ]
        );
        assert_eq!(report.notices[2].title, "Appointment Booked!");
        assert_eq!(report.notices[3].title, "Message Sent!");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_walkthrough() {
        let (tx, rx) = oneshot::channel();
        tx.send(()).unwrap();
        let report = run_demo(&quick_config(), quick_options(0), rx).await.unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn test_testimonials_are_five_star() {
        let quotes = testimonials();
        assert_eq!(quotes.len(), 5);
        assert!(quotes.iter().all(|t| t.rating == 5));
    }
}
