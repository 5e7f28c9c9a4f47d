//! Raw device byte stream decoding.
//!
//! Sensor and network readers hand this module contiguous byte buffers in
//! whatever chunk sizes the transport produced. Words are little-endian;
//! the stamp word's marker bit is the alignment anchor: when it is missing
//! where a stamp word is expected, the decoder resynchronizes by advancing
//! one byte at a time until the marker reappears, counting dropped bytes
//! for diagnostics. Partial events at the end of a chunk are carried over
//! to the next [`feed`](RawStreamDecoder::feed) call.

use aeris_types::{Event, EventKind};

use crate::codec::layout::{parse_stamp_word, KIND_CODE_BITS};
use crate::codec::info;
use crate::stamp::StampUnwrapper;

/// A decoded event together with its monotonic (unwrapped) time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    pub event: Event,
    /// Unwrapped 64-bit time in stamp ticks
    pub time: u64,
}

/// Streaming decoder for one raw device byte stream.
///
/// Owns the stream's [`StampUnwrapper`] — one decoder per source, never
/// shared, so rollover detection stays consistent. Device streams deliver
/// stamps in non-decreasing order, which is exactly what the unwrapper
/// requires.
#[derive(Debug, Default)]
pub struct RawStreamDecoder {
    buf: Vec<u8>,
    unwrapper: StampUnwrapper,
    dropped_bytes: u64,
}

impl RawStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as many complete events as `bytes` (plus any carried-over
    /// tail) contains.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<TimedEvent> {
        self.buf.extend_from_slice(bytes);
        let mut out = Vec::new();
        let mut cursor = 0usize;
        let mut resync_run = 0u64;

        while self.buf.len() - cursor >= 4 {
            let word = read_word_le(&self.buf[cursor..cursor + 4]);
            let Some((stamp, inline_kind)) = parse_stamp_word(word) else {
                cursor += 1;
                resync_run += 1;
                continue;
            };
            let kind = match inline_kind {
                Some(kind) => kind,
                // No room for a kind code on wide-stamp builds: raw
                // device streams carry address-events only there.
                None if KIND_CODE_BITS == 0 => EventKind::Address,
                // Code bits present but unrecognized: corrupt word, keep
                // scanning byte-wise.
                None => {
                    cursor += 1;
                    resync_run += 1;
                    continue;
                }
            };

            let info = info(kind);
            let total_bytes = info.word_count() * 4;
            if self.buf.len() - cursor < total_bytes {
                break; // wait for the rest of this event
            }

            if resync_run > 0 {
                self.dropped_bytes += resync_run;
                log::warn!("raw stream resynchronized after dropping {resync_run} bytes");
                resync_run = 0;
            }

            let payload: Vec<u32> = self.buf[cursor + 4..cursor + total_bytes]
                .chunks_exact(4)
                .map(read_word_le)
                .collect();
            let event = (info.decode_payload)(stamp, &payload);
            let time = self.unwrapper.unwrap(stamp);
            out.push(TimedEvent { event, time });
            cursor += total_bytes;
        }

        // Bytes skipped at the very tail stay dropped even if no marker
        // has reappeared yet.
        if resync_run > 0 {
            self.dropped_bytes += resync_run;
            log::warn!("raw stream dropped {resync_run} bytes without resync");
        }

        self.buf.drain(..cursor);
        out
    }

    /// Total bytes discarded during resynchronization so far.
    pub fn dropped_bytes(&self) -> u64 {
        self.dropped_bytes
    }

    /// Bytes buffered waiting for the rest of a partial event.
    pub fn pending_bytes(&self) -> usize {
        self.buf.len()
    }

    /// Rollovers seen on this stream.
    pub fn n_wraps(&self) -> u64 {
        self.unwrapper.n_wraps()
    }
}

/// Little-endian word read through an explicit unaligned Pod read.
#[inline]
fn read_word_le(bytes: &[u8]) -> u32 {
    u32::from_le(bytemuck::pod_read_unaligned::<u32>(&bytes[..4]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_into;
    use aeris_types::{AddressEvent, Polarity, Stamp, MAX_STAMP};

    fn to_le_bytes(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    fn ae(stamp: u32, x: u16) -> Event {
        Event::Address(AddressEvent::new(Stamp::new(stamp), x, 5, Polarity::On))
    }

    #[test]
    fn clean_stream_decodes_fully() {
        let mut words = Vec::new();
        for i in 0..10u32 {
            encode_into(&ae(1000 + i, i as u16), &mut words);
        }
        let mut decoder = RawStreamDecoder::new();
        let events = decoder.feed(&to_le_bytes(&words));
        assert_eq!(events.len(), 10);
        assert_eq!(decoder.dropped_bytes(), 0);
        assert_eq!(decoder.pending_bytes(), 0);
        assert_eq!(events[3].event, ae(1003, 3));
        assert_eq!(events[3].time, 1003);
    }

    #[test]
    fn resynchronizes_after_garbage_prefix() {
        // Stamp bytes all below 0x80 so the garbage window can never fake
        // a marker bit.
        let mut words = Vec::new();
        encode_into(&ae(0x101010, 1), &mut words);
        encode_into(&ae(0x101011, 2), &mut words);
        let mut bytes = vec![0x01, 0x02, 0x03];
        bytes.extend(to_le_bytes(&words));

        let mut decoder = RawStreamDecoder::new();
        let events = decoder.feed(&bytes);
        assert_eq!(events.len(), 2);
        assert_eq!(decoder.dropped_bytes(), 3);
        assert_eq!(events[0].event, ae(0x101010, 1));
    }

    #[test]
    fn partial_event_carries_across_feeds() {
        let mut words = Vec::new();
        encode_into(&ae(42, 7), &mut words);
        let bytes = to_le_bytes(&words);
        let mut decoder = RawStreamDecoder::new();

        let split = 5; // mid-payload
        assert!(decoder.feed(&bytes[..split]).is_empty());
        assert_eq!(decoder.pending_bytes(), split);
        let events = decoder.feed(&bytes[split..]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, ae(42, 7));
        assert_eq!(decoder.dropped_bytes(), 0);
    }

    #[test]
    fn unwraps_across_rollover() {
        let mut words = Vec::new();
        encode_into(&ae(MAX_STAMP - 2, 0), &mut words);
        encode_into(&ae(3, 0), &mut words);
        let mut decoder = RawStreamDecoder::new();
        let events = decoder.feed(&to_le_bytes(&words));
        assert_eq!(events[0].time, (MAX_STAMP - 2) as u64);
        assert_eq!(events[1].time, MAX_STAMP as u64 + 3);
        assert_eq!(decoder.n_wraps(), 1);
    }
}
