//! Viewport visibility capability
//!
//! The reveal controller needs exactly one thing from the outside world:
//! "tell me when this region is at least X% on screen". That is the
//! [`ViewportObserver`] contract, modelled on the browser's intersection
//! observer:
//!
//! - `observe` delivers an initial entry for the current layout right away,
//!   so a region that is already on screen never needs an extra scroll
//! - afterwards an entry is delivered each time the region crosses the
//!   threshold in either direction
//! - the callback returns `Break` once it has seen enough, which ends the
//!   observation the same way `unobserve` does
//!
//! [`ScrollViewport`] implements the contract over plain page geometry and
//! is what the demo and the tests scroll around in.

use crate::util::lock;
use std::collections::HashMap;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Mutex;

/// Identifier of an observable page region (a section id such as "booking")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One observation of a region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Whether the visible share is at or above the observation threshold
    pub is_intersecting: bool,
    /// Visible share of the region, 0.0 to 1.0
    pub ratio: f64,
}

/// Observation callback. `Break` stops observing the region.
pub type IntersectionCallback = Box<dyn FnMut(Intersection) -> ControlFlow<()> + Send + 'static>;

/// Capability to watch regions enter and leave the viewport
pub trait ViewportObserver: Send + Sync {
    /// Start watching `region`; replaces any previous callback for it
    fn observe(&self, region: &RegionId, threshold: f64, callback: IntersectionCallback);

    /// Stop watching `region`. Unknown regions are ignored.
    fn unobserve(&self, region: &RegionId);
}

// ─────────────────────────────────────────────────────────────────────────────
// Geometric viewport
// ─────────────────────────────────────────────────────────────────────────────

/// Vertical placement of a region on the page, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub top: f64,
    pub height: f64,
}

impl Region {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Share of this region inside the window `[offset, offset + viewport)`
    pub fn visible_ratio(&self, offset: f64, viewport: f64) -> f64 {
        if self.height <= 0.0 {
            return 0.0;
        }
        let start = self.top.max(offset);
        let end = (self.top + self.height).min(offset + viewport);
        ((end - start).max(0.0) / self.height).clamp(0.0, 1.0)
    }
}

struct Watcher {
    threshold: f64,
    above: bool,
    /// `None` while the callback runs outside the lock
    callback: Option<IntersectionCallback>,
}

struct Layout {
    offset: f64,
    height: f64,
    regions: HashMap<RegionId, Region>,
    watchers: HashMap<RegionId, Watcher>,
}

impl Layout {
    fn ratio(&self, id: &RegionId) -> f64 {
        // Regions that are not laid out yet are treated as off screen
        self.regions
            .get(id)
            .map(|region| region.visible_ratio(self.offset, self.height))
            .unwrap_or(0.0)
    }
}

/// A scrollable window over a vertically laid out page
pub struct ScrollViewport {
    layout: Mutex<Layout>,
}

impl ScrollViewport {
    /// Create a viewport `height` pixels tall, scrolled to the top
    pub fn new(height: f64) -> Self {
        Self {
            layout: Mutex::new(Layout {
                offset: 0.0,
                height,
                regions: HashMap::new(),
                watchers: HashMap::new(),
            }),
        }
    }

    /// Lay out (or move) a region, notifying its watcher if that crosses the threshold
    pub fn place(&self, id: impl Into<RegionId>, region: Region) {
        lock(&self.layout).regions.insert(id.into(), region);
        self.dispatch_crossings();
    }

    /// Scroll to an absolute offset
    pub fn scroll_to(&self, offset: f64) {
        lock(&self.layout).offset = offset.max(0.0);
        self.dispatch_crossings();
    }

    /// Scroll relative to the current offset
    pub fn scroll_by(&self, delta: f64) {
        let offset = self.offset() + delta;
        self.scroll_to(offset);
    }

    pub fn offset(&self) -> f64 {
        lock(&self.layout).offset
    }

    /// Visible share of a region at the current offset
    pub fn ratio(&self, id: &RegionId) -> f64 {
        lock(&self.layout).ratio(id)
    }

    /// Number of regions currently being observed
    pub fn watching(&self) -> usize {
        lock(&self.layout).watchers.len()
    }

    /// Deliver one entry per watcher whose threshold side changed
    fn dispatch_crossings(&self) {
        let due: Vec<(RegionId, Intersection, IntersectionCallback)> = {
            let mut layout = lock(&self.layout);
            let ratios: Vec<(RegionId, f64)> = layout
                .watchers
                .keys()
                .map(|id| (id.clone(), layout.ratio(id)))
                .collect();

            ratios
                .into_iter()
                .filter_map(|(id, ratio)| {
                    let watcher = layout.watchers.get_mut(&id)?;
                    let above = ratio >= watcher.threshold;
                    if above == watcher.above {
                        return None;
                    }
                    watcher.above = above;
                    let callback = watcher.callback.take()?;
                    let entry = Intersection {
                        is_intersecting: above,
                        ratio,
                    };
                    Some((id, entry, callback))
                })
                .collect()
        };

        for (id, entry, callback) in due {
            self.run_callback(&id, entry, callback);
        }
    }

    fn run_callback(&self, id: &RegionId, entry: Intersection, mut callback: IntersectionCallback) {
        let flow = callback(entry);

        let leftover = {
            let mut layout = lock(&self.layout);
            let slot_open = layout
                .watchers
                .get(id)
                .is_some_and(|watcher| watcher.callback.is_none());

            if !slot_open {
                // Unobserved or re-observed while the callback ran
                Some(callback)
            } else if flow.is_break() {
                layout.watchers.remove(id);
                Some(callback)
            } else {
                if let Some(watcher) = layout.watchers.get_mut(id) {
                    watcher.callback = Some(callback);
                }
                None
            }
        };
        drop(leftover);
    }
}

impl ViewportObserver for ScrollViewport {
    fn observe(&self, region: &RegionId, threshold: f64, callback: IntersectionCallback) {
        let entry = {
            let mut layout = lock(&self.layout);
            let ratio = layout.ratio(region);
            let above = ratio >= threshold;
            layout.watchers.insert(
                region.clone(),
                Watcher {
                    threshold,
                    above,
                    callback: None,
                },
            );
            Intersection {
                is_intersecting: above,
                ratio,
            }
        };

        tracing::trace!(region = %region, ratio = entry.ratio, "Observing region");
        self.run_callback(region, entry, callback);
    }

    fn unobserve(&self, region: &RegionId) {
        let removed = lock(&self.layout).watchers.remove(region);
        drop(removed);
    }
}

impl fmt::Debug for ScrollViewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = lock(&self.layout);
        f.debug_struct("ScrollViewport")
            .field("offset", &layout.offset)
            .field("height", &layout.height)
            .field("regions", &layout.regions.len())
            .field("watching", &layout.watchers.len())
            .finish()
    }
}
