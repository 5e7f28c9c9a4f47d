//! Bulk batch aggregation and the producer/consumer collector.
//!
//! Outbound: [`EventBatch`] groups encoded events by type tag — a tag
//! followed by that type's word-groups — which is exactly the flat shape
//! any outer transport envelope can wrap. Inbound: [`read_batch`]
//! mirrors it, dispatching each group through the type registry and
//! skipping malformed records without abandoning the rest of the batch.
//!
//! [`Collector`] is the one concurrency primitive in the crate: a
//! coarse-grained mutex around a whole queue, filled by producer
//! callbacks and swapped out empty by the consumer in a single locked
//! operation. A periodic flusher finding nothing queued just skips that
//! cycle; nothing blocks indefinitely.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use aeris_types::{Event, EventKind};

use crate::codec::{encode_into, info_for_tag};
use crate::queue::{EventHandle, EventQueue};

/// Encoded events grouped by type tag, in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct EventBatch {
    groups: Vec<(EventKind, Vec<u32>)>,
    len: usize,
}

impl EventBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one event into its tag group.
    pub fn push(&mut self, event: &Event) {
        let kind = event.kind();
        let index = match self.groups.iter().position(|(k, _)| *k == kind) {
            Some(index) => index,
            None => {
                self.groups.push((kind, Vec::new()));
                self.groups.len() - 1
            }
        };
        encode_into(event, &mut self.groups[index].1);
        self.len += 1;
    }

    /// The tag groups, ready for an outer envelope: each entry is the
    /// wire tag plus that type's concatenated word-groups.
    pub fn groups(&self) -> impl Iterator<Item = (&'static str, &[u32])> {
        self.groups.iter().map(|(kind, words)| (kind.tag(), words.as_slice()))
    }

    /// Number of events pushed (not words).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.len = 0;
    }
}

impl Extend<Event> for EventBatch {
    fn extend<I: IntoIterator<Item = Event>>(&mut self, iter: I) {
        for event in iter {
            self.push(&event);
        }
    }
}

/// Diagnostics from one [`read_batch`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Events decoded successfully
    pub decoded: usize,
    /// Words abandoned in malformed group tails
    pub dropped_words: usize,
    /// Whole groups skipped because their tag was unknown
    pub unknown_tags: usize,
}

/// Decode a tag-grouped batch, skipping what cannot be decoded.
///
/// Unknown tags skip the whole group (logged, counted); a malformed or
/// truncated record abandons the remainder of its group only — every
/// other group still decodes.
pub fn read_batch<'t, 'w, I>(groups: I) -> (Vec<Event>, DecodeStats)
where
    I: IntoIterator<Item = (&'t str, &'w [u32])>,
{
    let mut events = Vec::new();
    let mut stats = DecodeStats::default();

    for (tag, words) in groups {
        let Some(info) = info_for_tag(tag) else {
            stats.unknown_tags += 1;
            stats.dropped_words += words.len();
            log::warn!("skipping batch group with unknown tag '{tag}' ({} words)", words.len());
            continue;
        };
        let mut cursor = 0;
        while cursor < words.len() {
            match crate::codec::decode_one(info.kind, words, cursor) {
                Some((event, next)) => {
                    events.push(event);
                    stats.decoded += 1;
                    cursor = next;
                }
                None => {
                    let dropped = words.len() - cursor;
                    stats.dropped_words += dropped;
                    log::warn!(
                        "abandoning malformed tail of '{tag}' group ({dropped} words)"
                    );
                    break;
                }
            }
        }
    }

    (events, stats)
}

/// Coarse-locked accumulation queue shared between producer callbacks and
/// a consumer thread.
///
/// The whole queue is swapped out under the lock by [`drain`]
/// (append-then-swap), so the consumer walks its batch entirely outside
/// the lock. The stop flag is cooperative: producers and the flusher
/// poll it between batches, never mid-operation.
#[derive(Debug, Default)]
pub struct Collector {
    queue: Mutex<EventQueue>,
    stop: AtomicBool,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event under the lock.
    pub fn push(&self, event: EventHandle) {
        self.queue.lock().push_back(event);
    }

    /// Append a whole decoded batch under one lock acquisition.
    pub fn push_batch<I: IntoIterator<Item = EventHandle>>(&self, events: I) {
        self.queue.lock().extend(events);
    }

    /// Swap the accumulated queue out, leaving an empty one. Returns the
    /// batch — possibly empty, in which case the caller skips this cycle.
    pub fn drain(&self) -> EventQueue {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Events currently queued.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Ask the run loops using this collector to wind down.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeris_types::{AddressEvent, FlowEvent, ImuEvent, Polarity, Stamp};
    use std::sync::Arc;

    fn ae(stamp: u32) -> Event {
        Event::Address(AddressEvent::new(Stamp::new(stamp), 1, 2, Polarity::On))
    }

    fn flow(stamp: u32) -> Event {
        Event::Flow(FlowEvent {
            ae: AddressEvent::new(Stamp::new(stamp), 3, 4, Polarity::Off),
            vx: 2.5,
            vy: -2.5,
        })
    }

    #[test]
    fn batch_groups_by_tag_in_first_appearance_order() {
        let mut batch = EventBatch::new();
        batch.push(&ae(1));
        batch.push(&flow(2));
        batch.push(&ae(3));
        batch.push(&Event::Imu(ImuEvent {
            stamp: Stamp::new(4),
            ..Default::default()
        }));

        let tags: Vec<&str> = batch.groups().map(|(tag, _)| tag).collect();
        assert_eq!(tags, ["AE", "FLOW", "IMU"]);
        assert_eq!(batch.len(), 4);

        let (_, ae_words) = batch.groups().next().unwrap();
        assert_eq!(ae_words.len(), 4); // two AEs, two words each
    }

    #[test]
    fn batch_round_trips_through_read_batch() {
        let mut batch = EventBatch::new();
        let originals = vec![ae(10), flow(20), ae(30), flow(40)];
        batch.extend(originals.clone());

        let (decoded, stats) = read_batch(batch.groups());
        assert_eq!(stats.decoded, 4);
        assert_eq!(stats.dropped_words, 0);
        assert_eq!(stats.unknown_tags, 0);
        // Grouping reorders across types but preserves order within one
        assert_eq!(
            decoded,
            vec![ae(10), ae(30), flow(20), flow(40)]
        );
    }

    #[test]
    fn unknown_tag_skips_group_and_continues() {
        let mut batch = EventBatch::new();
        batch.push(&ae(1));
        let ae_words: Vec<u32> = batch.groups().next().unwrap().1.to_vec();

        let bogus = [1u32, 2, 3];
        let groups = vec![
            ("WAT", bogus.as_slice()),
            ("AE", ae_words.as_slice()),
        ];
        let (decoded, stats) = read_batch(groups);
        assert_eq!(decoded, vec![ae(1)]);
        assert_eq!(stats.unknown_tags, 1);
        assert_eq!(stats.dropped_words, 3);
    }

    #[test]
    fn truncated_group_tail_is_dropped_not_fatal() {
        let mut batch = EventBatch::new();
        batch.push(&ae(1));
        batch.push(&ae(2));
        let mut words: Vec<u32> = batch.groups().next().unwrap().1.to_vec();
        words.pop(); // amputate the last payload word

        let (decoded, stats) = read_batch(vec![("AE", words.as_slice())]);
        assert_eq!(decoded, vec![ae(1)]);
        assert_eq!(stats.decoded, 1);
        assert_eq!(stats.dropped_words, 1);
    }

    #[test]
    fn collector_drain_swaps_whole_queue() {
        let collector = Collector::new();
        collector.push(Arc::new(ae(1)));
        collector.push_batch((2..5u32).map(|i| Arc::new(ae(i))));
        assert_eq!(collector.len(), 4);

        let batch = collector.drain();
        assert_eq!(batch.len(), 4);
        assert!(collector.is_empty());
        // Empty drain: the skip-this-cycle case
        assert!(collector.drain().is_empty());
    }

    #[test]
    fn collector_works_across_threads() {
        let collector = Arc::new(Collector::new());
        let producer = {
            let collector = Arc::clone(&collector);
            std::thread::spawn(move || {
                for i in 0..1000u32 {
                    collector.push(Arc::new(ae(i)));
                }
                collector.request_stop();
            })
        };

        let mut received = 0;
        while !(collector.stop_requested() && collector.is_empty()) {
            received += collector.drain().len();
            std::thread::yield_now();
        }
        received += collector.drain().len();
        producer.join().unwrap();
        assert_eq!(received, 1000);
    }
}
