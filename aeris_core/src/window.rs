//! Bounded event windows.
//!
//! A window incrementally admits new events and evicts stale ones on every
//! admission, so its contents are always the substrate a downstream
//! algorithm (flow, clustering, corner detection) can consume directly.
//! Three admission/eviction policies: fixed duration, fixed count, and
//! spatial ROI gating with time eviction.
//!
//! Windows assume events are admitted in (wrap-aware) time order, the
//! order any single decoded stream produces. Eviction scans from both
//! ends of the underlying queue, which is exact under that assumption.

use aeris_types::{Event, PixelRect, Stamp};

use crate::error::{AerisError, AerisResult};
use crate::queue::{EventHandle, EventQueue};
use crate::stamp::wrap_delta;

/// Fixed-duration temporal window.
///
/// On admission of an event at stamp `t`, every held event outside
/// `[t - t_lower, t + t_upper)` (circular arithmetic) is evicted.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    queue: EventQueue,
    t_lower: u32,
    t_upper: u32,
}

impl TimeWindow {
    /// Window keeping events within `t_lower` ticks behind and strictly
    /// less than `t_upper` ticks ahead of the newest admitted event.
    pub fn new(t_lower: u32, t_upper: u32) -> AerisResult<Self> {
        if t_lower == 0 && t_upper == 0 {
            return Err(AerisError::InvalidConfig(
                "time window needs a non-zero span".into(),
            ));
        }
        Ok(Self {
            queue: EventQueue::new(),
            t_lower,
            t_upper,
        })
    }

    /// Trailing window of `duration` ticks: keeps the admitted event and
    /// everything up to `duration` ticks behind it.
    pub fn from_duration(duration: u32) -> AerisResult<Self> {
        Self::new(duration, 1)
    }

    /// Admit an event, evicting everything outside its window.
    pub fn add_event(&mut self, event: EventHandle) {
        let now = event.stamp();
        self.evict_outside(now);
        self.queue.push_back(event);
    }

    fn evict_outside(&mut self, now: Stamp) {
        let t_lower = self.t_lower as i64;
        let t_upper = self.t_upper as i64;
        let inside = move |e: &Event| {
            let d = wrap_delta(now, e.stamp());
            -t_lower <= d && d < t_upper
        };
        while let Some(front) = self.queue.front() {
            if inside(front) {
                break;
            }
            self.queue.pop_front();
        }
        while let Some(back) = self.queue.back() {
            if inside(back) {
                break;
            }
            self.queue.pop_back();
        }
    }

    pub fn events(&self) -> &EventQueue {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn t_lower(&self) -> u32 {
        self.t_lower
    }

    pub fn t_upper(&self) -> u32 {
        self.t_upper
    }
}

/// Fixed-count window: admitting the N+1th event evicts the oldest.
#[derive(Debug, Clone)]
pub struct CountWindow {
    queue: EventQueue,
    capacity: usize,
}

impl CountWindow {
    pub fn new(capacity: usize) -> AerisResult<Self> {
        if capacity == 0 {
            return Err(AerisError::InvalidConfig(
                "count window capacity must be at least 1".into(),
            ));
        }
        Ok(Self {
            queue: EventQueue::with_capacity(capacity),
            capacity,
        })
    }

    pub fn add_event(&mut self, event: EventHandle) {
        while self.queue.len() >= self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(event);
    }

    pub fn events(&self) -> &EventQueue {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Spatial ROI window: admission is gated on the event's pixel falling
/// inside a rectangle; eviction by time, exactly like [`TimeWindow`].
///
/// Events without pixel coordinates (IMU, skin, cochlea) are never
/// admitted.
#[derive(Debug, Clone)]
pub struct RoiWindow {
    window: TimeWindow,
    roi: PixelRect,
}

impl RoiWindow {
    pub fn new(roi: PixelRect, t_lower: u32, t_upper: u32) -> AerisResult<Self> {
        Ok(Self {
            window: TimeWindow::new(t_lower, t_upper)?,
            roi,
        })
    }

    /// Admit the event if it lies inside the ROI. Returns whether it was
    /// admitted; eviction runs only on admission.
    pub fn add_event(&mut self, event: EventHandle) -> bool {
        match event.pixel() {
            Some((x, y)) if self.roi.contains(x, y) => {
                self.window.add_event(event);
                true
            }
            _ => false,
        }
    }

    /// Move or resize the region of interest. Held events are not
    /// re-filtered; they age out by time.
    pub fn set_roi(&mut self, roi: PixelRect) {
        self.roi = roi;
    }

    pub fn roi(&self) -> PixelRect {
        self.roi
    }

    pub fn events(&self) -> &EventQueue {
        self.window.events()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
