//! Ordered container of shared event handles.
//!
//! Events are reference-counted (`Arc`) so several windows and queues can
//! hold the same decoded event concurrently; an event is freed exactly
//! once, when the last container drops its handle. Cloning a queue clones
//! the bookkeeping (handles), never the payloads.

use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Arc;

use aeris_types::Event;

use crate::stamp::wrap_cmp;

/// Shared handle to a decoded event.
pub type EventHandle = Arc<Event>;

/// An ordered, sortable sequence of event handles.
///
/// Not internally thread-safe: hand completed queues between threads
/// whole, or guard a shared one with the coarse lock in
/// [`Collector`](crate::batch::Collector).
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<EventHandle>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push_back(&mut self, event: EventHandle) {
        self.events.push_back(event);
    }

    pub fn push_front(&mut self, event: EventHandle) {
        self.events.push_front(event);
    }

    pub fn pop_back(&mut self) -> Option<EventHandle> {
        self.events.pop_back()
    }

    pub fn pop_front(&mut self) -> Option<EventHandle> {
        self.events.pop_front()
    }

    /// Remove a contiguous range, releasing those handles.
    ///
    /// The range is clamped to the current length.
    pub fn erase_range(&mut self, range: Range<usize>) {
        let end = range.end.min(self.events.len());
        let start = range.start.min(end);
        self.events.drain(start..end);
    }

    pub fn front(&self) -> Option<&EventHandle> {
        self.events.front()
    }

    pub fn back(&self) -> Option<&EventHandle> {
        self.events.back()
    }

    pub fn get(&self, index: usize) -> Option<&EventHandle> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventHandle> {
        self.events.iter()
    }

    /// Stable sort by timestamp.
    ///
    /// `wrap_aware = false` is plain numeric order; `wrap_aware = true`
    /// treats stamps through the circular comparator, so a small stamp
    /// just after a rollover sorts *after* a large pre-rollover one.
    /// Equal stamps keep their insertion order either way — downstream
    /// algorithms rely on arrival order as the tie-break for
    /// same-microsecond bursts.
    pub fn sort(&mut self, wrap_aware: bool) {
        if self.events.len() < 2 {
            return;
        }
        let slice = self.events.make_contiguous();
        if wrap_aware {
            slice.sort_by(|a, b| wrap_cmp(a.stamp(), b.stamp()));
        } else {
            slice.sort_by(|a, b| a.stamp().cmp(&b.stamp()));
        }
    }
}

impl Extend<EventHandle> for EventQueue {
    fn extend<I: IntoIterator<Item = EventHandle>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}

impl FromIterator<EventHandle> for EventQueue {
    fn from_iter<I: IntoIterator<Item = EventHandle>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EventQueue {
    type Item = EventHandle;
    type IntoIter = std::collections::vec_deque::IntoIter<EventHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventQueue {
    type Item = &'a EventHandle;
    type IntoIter = std::collections::vec_deque::Iter<'a, EventHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
