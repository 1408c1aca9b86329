//! Reveal-on-scroll trigger
//!
//! Every section fades in the first time it is at least 30% on screen and
//! then stays visible. [`RevealController`] owns that one bit of state.
//!
//! ```text
//!  Hidden ──(intersecting ≥ threshold)──▶ Revealed
//!    ▲                                       │
//!    └──────────── never ◀───────────────────┘
//! ```
//!
//! The controller stops observing as soon as it reveals, and `detach` (or
//! dropping the controller) releases the observation if it never fired.

use crate::util::lock;
use crate::viewport::{Intersection, IntersectionCallback, RegionId, ViewportObserver};
use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Share of a section that must be on screen before it reveals
pub const DEFAULT_REVEAL_THRESHOLD: f64 = 0.3;

/// Hook run once when the section reveals
pub type RevealHook = Box<dyn FnOnce() + Send + 'static>;

/// Render state of a section's entrance animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityState {
    pub has_been_revealed: bool,
}

struct RevealShared {
    revealed: AtomicBool,
    on_reveal: Mutex<Option<RevealHook>>,
}

impl RevealShared {
    /// Flip to revealed. Only the first call has any effect.
    fn reveal(&self, region: &RegionId) {
        if self.revealed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!(section = %region, "Section revealed");

        let hook = lock(&self.on_reveal).take();
        if let Some(hook) = hook {
            hook();
        }
    }
}

/// One-way visibility flag for a single section
pub struct RevealController {
    observer: Arc<dyn ViewportObserver>,
    threshold: f64,
    shared: Arc<RevealShared>,
    region: Option<RegionId>,
}

impl RevealController {
    pub fn new(observer: Arc<dyn ViewportObserver>) -> Self {
        Self::with_threshold(observer, DEFAULT_REVEAL_THRESHOLD)
    }

    pub fn with_threshold(observer: Arc<dyn ViewportObserver>, threshold: f64) -> Self {
        Self {
            observer,
            threshold: threshold.clamp(0.0, 1.0),
            shared: Arc::new(RevealShared {
                revealed: AtomicBool::new(false),
                on_reveal: Mutex::new(None),
            }),
            region: None,
        }
    }

    /// Run `hook` once, at the moment the section reveals
    pub fn on_reveal(self, hook: impl FnOnce() + Send + 'static) -> Self {
        *lock(&self.shared.on_reveal) = Some(Box::new(hook));
        self
    }

    /// Start watching `target`. A region that isn't mounted yet (`None`) is ignored.
    pub fn attach(&mut self, target: Option<RegionId>) {
        let Some(region) = target else {
            tracing::trace!("Reveal attach skipped: region not mounted");
            return;
        };

        self.detach();

        if self.is_revealed() {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let threshold = self.threshold;
        let name = region.clone();
        let callback: IntersectionCallback = Box::new(move |entry: Intersection| {
            if !(entry.is_intersecting && entry.ratio >= threshold) {
                return ControlFlow::Continue(());
            }
            shared.reveal(&name);
            ControlFlow::Break(())
        });

        self.observer.observe(&region, threshold, callback);

        // The initial entry may already have revealed and ended the observation
        if !self.is_revealed() {
            self.region = Some(region);
        }
    }

    /// Stop watching. Safe to call repeatedly or when never attached.
    pub fn detach(&mut self) {
        let Some(region) = self.region.take() else {
            return;
        };
        // A reveal ends the observation from inside the callback
        if !self.is_revealed() {
            self.observer.unobserve(&region);
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.shared.revealed.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> VisibilityState {
        VisibilityState {
            has_been_revealed: self.is_revealed(),
        }
    }

    /// Whether an observation is still live
    pub fn is_attached(&self) -> bool {
        self.region.is_some() && !self.is_revealed()
    }
}

impl Drop for RevealController {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for RevealController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealController")
            .field("region", &self.region)
            .field("threshold", &self.threshold)
            .field("revealed", &self.is_revealed())
            .finish()
    }
}
