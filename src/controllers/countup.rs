//! Count-up statistics (About section)
//!
//! Once the About section reveals, its headline numbers count up from zero:
//! a short pause, then a fixed number of evenly spaced steps, landing
//! exactly on the targets. The timer ends itself on the last step.

use crate::scheduler::{Scheduler, TimerHandle};
use crate::util::lock;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Timing of the animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountUpSettings {
    /// Pause between the trigger and the first step
    pub start_delay: Duration,
    /// Time from first to last step
    pub duration: Duration,
    /// Number of steps (at least 1)
    pub steps: u32,
}

impl Default for CountUpSettings {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(800),
            duration: Duration::from_millis(2000),
            steps: 60,
        }
    }
}

impl CountUpSettings {
    fn period(&self) -> Duration {
        self.duration / self.steps.max(1)
    }
}

/// One animated number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub label: String,
    pub target: u64,
}

impl Counter {
    pub fn new(label: impl Into<String>, target: u64) -> Self {
        Self {
            label: label.into(),
            target,
        }
    }
}

/// The About section's numbers
pub fn practice_stats() -> Vec<Counter> {
    vec![
        Counter::new("patients", 10_000),
        Counter::new("experience", 15),
        Counter::new("satisfaction", 99),
    ]
}

/// Progress through the animation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountUpState {
    step: u32,
    steps: u32,
    counters: Vec<Counter>,
}

impl CountUpState {
    pub fn new(counters: Vec<Counter>, steps: u32) -> Self {
        Self {
            step: 0,
            steps: steps.max(1),
            counters,
        }
    }

    /// Move one step. `Break` once the final step is reached.
    pub fn advance(&mut self) -> ControlFlow<()> {
        if self.step < self.steps {
            self.step += 1;
        }
        if self.is_finished() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.steps
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// Current value of every counter, `floor(target * step / steps)`
    pub fn values(&self) -> Vec<(String, u64)> {
        self.counters
            .iter()
            .map(|counter| (counter.label.clone(), self.value_of(counter.target)))
            .collect()
    }

    fn value_of(&self, target: u64) -> u64 {
        if self.is_finished() {
            return target;
        }
        (target as u128 * self.step as u128 / self.steps as u128) as u64
    }
}

struct CountUpInner {
    state: Mutex<CountUpState>,
    scheduler: Arc<dyn Scheduler>,
    settings: CountUpSettings,
    started: AtomicBool,
    stopped: AtomicBool,
    delay: Mutex<Option<TimerHandle>>,
    run: Mutex<Option<TimerHandle>>,
}

impl CountUpInner {
    fn start(self: &Arc<Self>) {
        if self.stopped.load(Ordering::SeqCst) || self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(
            delay_ms = self.settings.start_delay.as_millis() as u64,
            "Count-up scheduled"
        );

        let inner = Arc::clone(self);
        let handle = self.scheduler.schedule_once(
            self.settings.start_delay,
            Box::new(move || inner.begin_counting()),
        );
        *lock(&self.delay) = Some(handle);
    }

    fn begin_counting(self: &Arc<Self>) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }

        let inner = Arc::clone(self);
        let handle = self.scheduler.schedule(
            self.settings.period(),
            Box::new(move || {
                let flow = lock(&inner.state).advance();
                if flow.is_break() {
                    tracing::debug!("Count-up finished");
                }
                flow
            }),
        );

        // stop() may have run while the timer was being created
        if self.stopped.load(Ordering::SeqCst) {
            handle.cancel();
            return;
        }
        *lock(&self.run) = Some(handle);
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let delay = lock(&self.delay).take();
        let run = lock(&self.run).take();
        drop(delay);
        drop(run);
    }
}

/// Count-up animation for a set of counters
pub struct CountUp {
    inner: Arc<CountUpInner>,
}

impl CountUp {
    pub fn new(counters: Vec<Counter>, scheduler: Arc<dyn Scheduler>, settings: CountUpSettings) -> Self {
        Self {
            inner: Arc::new(CountUpInner {
                state: Mutex::new(CountUpState::new(counters, settings.steps)),
                scheduler,
                settings,
                started: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                delay: Mutex::new(None),
                run: Mutex::new(None),
            }),
        }
    }

    /// Begin the animation. Only the first call counts.
    pub fn start(&self) {
        self.inner.start();
    }

    /// A start action to hand to something else, such as a reveal hook
    pub fn trigger(&self) -> impl FnOnce() + Send + 'static {
        let inner = Arc::clone(&self.inner);
        move || inner.start()
    }

    /// Cancel any pending or running timer. The animation can't be restarted.
    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn values(&self) -> Vec<(String, u64)> {
        lock(&self.inner.state).values()
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        lock(&self.inner.state).is_finished()
    }
}

impl Drop for CountUp {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for CountUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountUp")
            .field("state", &*lock(&self.inner.state))
            .field("settings", &self.inner.settings)
            .field("started", &self.is_started())
            .finish()
    }
}
