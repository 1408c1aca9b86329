//! Rotating carousel (testimonials)
//!
//! The carousel shows one item at a time and moves on by itself every
//! interval. Visitors can also step with the arrows or jump with the dots.
//!
//! Two sources write the same index: the timer and the visitor. How they
//! interact is a [`TimerPolicy`]:
//!
//! - `Keep` - the timer ignores manual moves and keeps its rhythm. A click
//!   just before a tick is followed by the tick almost at once.
//! - `Restart` - every manual move restarts the countdown, so the item the
//!   visitor picked stays up for a full interval.

use crate::scheduler::{Scheduler, TimerHandle};
use crate::util::lock;
use serde::Deserialize;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Time each item stays up before the carousel moves on
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

/// How manual navigation interacts with the auto-advance timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPolicy {
    /// Timer keeps running untouched
    #[default]
    Keep,
    /// Manual navigation restarts the countdown
    #[serde(alias = "reset")]
    Restart,
}

impl TimerPolicy {
    /// Convert to string for TOML serialization
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Restart => "restart",
        }
    }
}

/// Active position within a fixed number of items. Always in `0..len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselState {
    active_index: usize,
    len: usize,
}

impl CarouselState {
    /// `None` for an empty carousel
    pub fn new(len: usize) -> Option<Self> {
        (len > 0).then_some(Self {
            active_index: 0,
            len,
        })
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn tick(&mut self) -> usize {
        self.next()
    }

    pub fn next(&mut self) -> usize {
        self.active_index = (self.active_index + 1) % self.len;
        self.active_index
    }

    pub fn prev(&mut self) -> usize {
        self.active_index = (self.active_index + self.len - 1) % self.len;
        self.active_index
    }

    /// Jump to `index` taken modulo the length, negatives included
    pub fn go_to(&mut self, index: i64) -> usize {
        self.active_index = index.rem_euclid(self.len as i64) as usize;
        self.active_index
    }
}

/// Timer-driven carousel over a fixed list of items
pub struct Carousel<T> {
    items: Arc<[T]>,
    state: Arc<Mutex<CarouselState>>,
    scheduler: Arc<dyn Scheduler>,
    interval: Duration,
    policy: TimerPolicy,
    timer: Option<TimerHandle>,
}

impl<T> Carousel<T> {
    /// Build a stopped carousel at index 0. Fails on an empty item list.
    pub fn new(
        items: Vec<T>,
        scheduler: Arc<dyn Scheduler>,
        interval: Duration,
        policy: TimerPolicy,
    ) -> anyhow::Result<Self> {
        let state = CarouselState::new(items.len())
            .ok_or_else(|| anyhow::anyhow!("Carousel needs at least one item"))?;

        Ok(Self {
            items: items.into(),
            state: Arc::new(Mutex::new(state)),
            scheduler,
            interval,
            policy,
            timer: None,
        })
    }

    /// Start auto-advancing. No-op if already running.
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }
        let state = Arc::clone(&self.state);
        self.timer = Some(self.scheduler.schedule(
            self.interval,
            Box::new(move || {
                let index = lock(&state).tick();
                tracing::trace!(index, "Carousel tick");
                ControlFlow::Continue(())
            }),
        ));
        tracing::debug!(interval_ms = self.interval.as_millis() as u64, "Carousel started");
    }

    /// Cancel the timer. The current item stays put.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
            tracing::debug!("Carousel stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// One automatic step forward (what the timer does)
    pub fn tick(&self) -> usize {
        lock(&self.state).tick()
    }

    pub fn next(&mut self) -> usize {
        let index = lock(&self.state).next();
        self.after_manual();
        index
    }

    pub fn prev(&mut self) -> usize {
        let index = lock(&self.state).prev();
        self.after_manual();
        index
    }

    pub fn go_to(&mut self, index: i64) -> usize {
        let index = lock(&self.state).go_to(index);
        self.after_manual();
        index
    }

    pub fn active_index(&self) -> usize {
        lock(&self.state).active_index()
    }

    pub fn active(&self) -> &T {
        &self.items[self.active_index()]
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn policy(&self) -> TimerPolicy {
        self.policy
    }

    fn after_manual(&mut self) {
        if self.policy == TimerPolicy::Restart && self.is_running() {
            self.stop();
            self.start();
        }
    }
}

impl<T> Drop for Carousel<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<T> fmt::Debug for Carousel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carousel")
            .field("state", &*lock(&self.state))
            .field("interval", &self.interval)
            .field("policy", &self.policy)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    const M: usize = 5;

    fn carousel(scheduler: &ManualScheduler, policy: TimerPolicy) -> Carousel<&'static str> {
        Carousel::new(
            vec!["Sarah M.", "Mike R.", "Jennifer L.", "Robert K.", "Lisa T."],
            Arc::new(scheduler.clone()),
            DEFAULT_INTERVAL,
            policy,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_carousel_rejected() {
        let scheduler = ManualScheduler::new();
        let result = Carousel::<u8>::new(
            Vec::new(),
            Arc::new(scheduler),
            DEFAULT_INTERVAL,
            TimerPolicy::Keep,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_n_ticks_wrap_modulo_len() {
        let mut state = CarouselState::new(M).unwrap();
        for n in 1..=23 {
            state.tick();
            assert_eq!(state.active_index(), n % M);
        }
    }

    #[test]
    fn test_prev_then_next_round_trips() {
        for start in 0..M as i64 {
            let mut state = CarouselState::new(M).unwrap();
            state.go_to(start);
            state.prev();
            state.next();
            assert_eq!(state.active_index(), start as usize);
        }
    }

    #[test]
    fn test_prev_from_zero_wraps_to_last() {
        let scheduler = ManualScheduler::new();
        let mut carousel = carousel(&scheduler, TimerPolicy::Keep);
        assert_eq!(carousel.prev(), 4);
        assert_eq!(*carousel.active(), "Lisa T.");
    }

    #[test]
    fn test_go_to_any_integer() {
        let mut state = CarouselState::new(M).unwrap();
        for (index, expected) in [(0, 0), (3, 3), (5, 0), (12, 2), (-1, 4), (-6, 4), (-10, 0)] {
            assert_eq!(state.go_to(index), expected, "go_to({})", index);
        }
        assert_eq!(state.go_to(i64::MIN), i64::MIN.rem_euclid(M as i64) as usize);
    }

    #[test]
    fn test_single_item_stays_put() {
        let mut state = CarouselState::new(1).unwrap();
        assert_eq!(state.tick(), 0);
        assert_eq!(state.prev(), 0);
        assert_eq!(state.go_to(-7), 0);
    }

    #[test]
    fn test_timer_advances_every_interval() {
        let scheduler = ManualScheduler::new();
        let mut carousel = carousel(&scheduler, TimerPolicy::Keep);
        carousel.start();

        scheduler.advance(Duration::from_millis(4999));
        assert_eq!(carousel.active_index(), 0);
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(carousel.active_index(), 1);
        scheduler.advance(DEFAULT_INTERVAL * 6);
        assert_eq!(carousel.active_index(), 7 % M);
    }

    #[test]
    fn test_keep_policy_does_not_touch_timer() {
        let scheduler = ManualScheduler::new();
        let mut carousel = carousel(&scheduler, TimerPolicy::Keep);
        carousel.start();

        scheduler.advance(Duration::from_millis(4000));
        carousel.go_to(3);
        // The first schedule still fires at t=5000
        scheduler.advance(Duration::from_millis(1000));
        assert_eq!(carousel.active_index(), 4);
    }

    #[test]
    fn test_restart_policy_resets_countdown() {
        let scheduler = ManualScheduler::new();
        let mut carousel = carousel(&scheduler, TimerPolicy::Restart);
        carousel.start();

        scheduler.advance(Duration::from_millis(4000));
        carousel.next();
        assert_eq!(carousel.active_index(), 1);

        scheduler.advance(Duration::from_millis(1000));
        assert_eq!(carousel.active_index(), 1);
        scheduler.advance(Duration::from_millis(4000));
        assert_eq!(carousel.active_index(), 2);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_stop_and_drop_cancel_timer() {
        let scheduler = ManualScheduler::new();
        let mut carousel = carousel(&scheduler, TimerPolicy::Keep);
        carousel.start();
        carousel.start();
        assert_eq!(scheduler.pending(), 1);

        carousel.stop();
        assert_eq!(scheduler.pending(), 0);
        scheduler.advance(DEFAULT_INTERVAL * 3);
        assert_eq!(carousel.active_index(), 0);

        carousel.start();
        drop(carousel);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_manual_navigation_without_timer() {
        let scheduler = ManualScheduler::new();
        let mut carousel = carousel(&scheduler, TimerPolicy::Restart);
        carousel.next();
        carousel.next();
        assert_eq!(carousel.active_index(), 2);
        assert!(!carousel.is_running());
        assert_eq!(scheduler.pending(), 0);
    }
}
