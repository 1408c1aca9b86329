//! Timer capability for time-driven controllers
//!
//! Controllers never read a clock or spawn timers themselves. They ask a
//! [`Scheduler`] for a recurring or one-shot task and keep the returned
//! [`TimerHandle`]. Cancelling or dropping the handle guarantees the task
//! never runs again, which is how teardown stops a carousel or count-up
//! from writing into a section that is gone.
//!
//! # Implementations
//!
//! - [`TokioScheduler`] - real timers, one tokio task per schedule
//! - [`ManualScheduler`] - virtual clock that only moves when told to

use crate::util::lock;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};

/// Smallest period a recurring task may use (a zero period would spin)
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Body of a recurring task. Returning `Break` ends the schedule.
pub type RepeatingTask = Box<dyn FnMut() -> ControlFlow<()> + Send + 'static>;

/// Body of a one-shot task
pub type OnceTask = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run work later, on a fixed period or once.
pub trait Scheduler: Send + Sync {
    /// Run `task` every `period`, first run one full period from now.
    fn schedule(&self, period: Duration, task: RepeatingTask) -> TimerHandle;

    /// Run `task` once after `delay`.
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerHandle;
}

/// Cancellation handle for a scheduled task
///
/// Cancels on drop. Holding the handle is what keeps the timer alive.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    /// Wrap the scheduler-specific cancellation action
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancel the task now
    pub fn cancel(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokio
// ─────────────────────────────────────────────────────────────────────────────

/// Scheduler backed by tokio tasks
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime the caller is running on
    pub fn current() -> anyhow::Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| anyhow::anyhow!("Timers need a running tokio runtime: {}", e))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, period: Duration, mut task: RepeatingTask) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        let join = self.handle.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            // A stalled loop should not burst through the missed ticks
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if task().is_break() {
                    break;
                }
            }
        });
        TimerHandle::new(move || join.abort())
    }

    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerHandle {
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        TimerHandle::new(move || join.abort())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Manual (virtual clock)
// ─────────────────────────────────────────────────────────────────────────────

enum Job {
    Repeating(RepeatingTask),
    Once(OnceTask),
}

struct Entry {
    id: u64,
    due: Duration,
    period: Duration,
    /// `None` while the job is executing outside the lock
    job: Option<Job>,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry>,
}

/// Deterministic scheduler driven by [`ManualScheduler::advance`]
///
/// Tasks run on the caller's thread, in due order (ties in scheduling
/// order), with no lock held, so a task may schedule or cancel timers.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        lock(&self.clock).now
    }

    /// Number of live (not yet cancelled or finished) timers
    pub fn pending(&self) -> usize {
        lock(&self.clock).entries.len()
    }

    /// Move the clock forward, running everything that falls due
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;

        while let Some((id, due, job)) = self.take_due(target) {
            match job {
                Job::Once(task) => task(),
                Job::Repeating(mut task) => {
                    let flow = task();
                    let leftover = self.requeue(id, due, task, flow);
                    // Dropped outside the lock: a task may own timer handles
                    drop(leftover);
                }
            }
        }

        let mut clock = lock(&self.clock);
        clock.now = clock.now.max(target);
    }

    fn insert(&self, due_in: Duration, period: Duration, job: Job) -> TimerHandle {
        let id = {
            let mut clock = lock(&self.clock);
            let id = clock.next_id;
            clock.next_id += 1;
            let due = clock.now + due_in;
            clock.entries.push(Entry {
                id,
                due,
                period,
                job: Some(job),
            });
            id
        };

        let clock: Weak<Mutex<ManualClock>> = Arc::downgrade(&self.clock);
        TimerHandle::new(move || {
            let Some(clock) = clock.upgrade() else {
                return;
            };
            let removed = {
                let mut clock = lock(&clock);
                clock
                    .entries
                    .iter()
                    .position(|entry| entry.id == id)
                    .map(|pos| clock.entries.remove(pos))
            };
            drop(removed);
        })
    }

    fn take_due(&self, target: Duration) -> Option<(u64, Duration, Job)> {
        let mut clock = lock(&self.clock);

        let pos = clock
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.job.is_some() && entry.due <= target)
            .min_by_key(|(_, entry)| (entry.due, entry.id))
            .map(|(pos, _)| pos)?;

        let due = clock.entries[pos].due;
        clock.now = clock.now.max(due);

        let is_once = matches!(clock.entries[pos].job, Some(Job::Once(_)));
        if is_once {
            let entry = clock.entries.remove(pos);
            entry.job.map(|job| (entry.id, due, job))
        } else {
            let entry = &mut clock.entries[pos];
            entry.job.take().map(|job| (entry.id, due, job))
        }
    }

    fn requeue(
        &self,
        id: u64,
        due: Duration,
        task: RepeatingTask,
        flow: ControlFlow<()>,
    ) -> Option<RepeatingTask> {
        let mut clock = lock(&self.clock);

        let Some(pos) = clock.entries.iter().position(|entry| entry.id == id) else {
            // Cancelled while it was running
            return Some(task);
        };

        if flow.is_break() {
            clock.entries.remove(pos);
            return Some(task);
        }

        let entry = &mut clock.entries[pos];
        entry.due = due + entry.period;
        entry.job = Some(Job::Repeating(task));
        None
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, period: Duration, task: RepeatingTask) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        self.insert(period, period, Job::Repeating(task))
    }

    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerHandle {
        self.insert(delay, Duration::ZERO, Job::Once(task))
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clock = lock(&self.clock);
        f.debug_struct("ManualScheduler")
            .field("now", &clock.now)
            .field("pending", &clock.entries.len())
            .finish()
    }
}
