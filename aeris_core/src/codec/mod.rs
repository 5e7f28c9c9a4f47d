//! # Event Codec
//!
//! Encoding and decoding of address-events to and from compact integer
//! word packets, plus the static type registry that drives decode
//! dispatch.
//!
//! Every encoded event is `1 + payload_words(kind)` words: the stamp word
//! (timestamp marker, optional inline kind code, wrapping stamp) followed
//! by the variant's fixed payload. Decode validates remaining capacity
//! against the registry before touching the data and returns `None` — not
//! a panic — for truncated input, so a caller can skip the malformed tail
//! of a batch and keep going.
//!
//! Adding a new event variant means adding its `aeris_types` struct, its
//! pack/unpack pair in [`layout`], and one [`EventTypeInfo`] row here.

pub mod layout;
pub mod raw;

use std::collections::HashMap;
use std::sync::OnceLock;

use aeris_types::{
    AddressEvent, BoxEvent, EarEvent, Event, EventKind, FlowEvent, GaussianEvent, ImuEvent,
    LabelledAddressEvent, NeuronEvent, SkinEvent, SkinSample, Stamp,
};

use layout::{
    f32_from_word, make_stamp_word, pack_address, pack_ear, pack_extent, pack_imu, pack_neuron,
    pack_skin, parse_stamp_word, unpack_address, unpack_ear, unpack_extent, unpack_imu,
    unpack_neuron, unpack_skin, word_from_f32,
};

/// Registry row for one event variant: its tag, fixed payload word count,
/// an empty-instance factory, and the payload decoder.
pub struct EventTypeInfo {
    pub kind: EventKind,
    pub tag: &'static str,
    /// Number of payload words following the stamp word
    pub payload_words: usize,
    /// Zero-argument factory producing an empty instance of the variant
    pub factory: fn() -> Event,
    decode_payload: fn(Stamp, &[u32]) -> Event,
}

impl EventTypeInfo {
    /// Total encoded size in words, stamp word included.
    pub const fn word_count(&self) -> usize {
        1 + self.payload_words
    }
}

fn decode_ts(stamp: Stamp, _payload: &[u32]) -> Event {
    Event::Stamp(stamp)
}

fn decode_ae(stamp: Stamp, payload: &[u32]) -> Event {
    Event::Address(unpack_address(stamp, payload[0]))
}

fn decode_lae(stamp: Stamp, payload: &[u32]) -> Event {
    Event::Labelled(LabelledAddressEvent {
        ae: unpack_address(stamp, payload[0]),
        id: payload[1] as i32,
    })
}

fn decode_flow(stamp: Stamp, payload: &[u32]) -> Event {
    Event::Flow(FlowEvent {
        ae: unpack_address(stamp, payload[0]),
        vx: f32_from_word(payload[1]),
        vy: f32_from_word(payload[2]),
    })
}

fn decode_gae(stamp: Stamp, payload: &[u32]) -> Event {
    Event::Gaussian(GaussianEvent {
        lae: LabelledAddressEvent {
            ae: unpack_address(stamp, payload[0]),
            id: payload[1] as i32,
        },
        sig_x2: f32_from_word(payload[2]),
        sig_y2: f32_from_word(payload[3]),
        sig_xy: f32_from_word(payload[4]),
    })
}

fn decode_ske(stamp: Stamp, payload: &[u32]) -> Event {
    Event::Skin(unpack_skin(stamp, payload[0]))
}

fn decode_sks(stamp: Stamp, payload: &[u32]) -> Event {
    Event::SkinSample(SkinSample {
        address: unpack_skin(stamp, payload[0]),
        value: payload[1] as u16,
    })
}

fn decode_imu(stamp: Stamp, payload: &[u32]) -> Event {
    Event::Imu(unpack_imu(stamp, payload[0]))
}

fn decode_neu(stamp: Stamp, payload: &[u32]) -> Event {
    Event::Neuron(unpack_neuron(stamp, payload[0]))
}

fn decode_ear(stamp: Stamp, payload: &[u32]) -> Event {
    Event::Ear(unpack_ear(stamp, payload[0]))
}

fn decode_box(stamp: Stamp, payload: &[u32]) -> Event {
    let (width, height) = unpack_extent(payload[1]);
    Event::Box(BoxEvent {
        ae: unpack_address(stamp, payload[0]),
        width,
        height,
    })
}

/// The static type registry, in wire-code order. Built at compile time,
/// never mutated.
static REGISTRY: [EventTypeInfo; 11] = [
    EventTypeInfo {
        kind: EventKind::Stamp,
        tag: "TS",
        payload_words: 0,
        factory: || Event::Stamp(Stamp::new(0)),
        decode_payload: decode_ts,
    },
    EventTypeInfo {
        kind: EventKind::Address,
        tag: "AE",
        payload_words: 1,
        factory: || Event::Address(AddressEvent::default()),
        decode_payload: decode_ae,
    },
    EventTypeInfo {
        kind: EventKind::Labelled,
        tag: "LAE",
        payload_words: 2,
        factory: || Event::Labelled(LabelledAddressEvent::default()),
        decode_payload: decode_lae,
    },
    EventTypeInfo {
        kind: EventKind::Flow,
        tag: "FLOW",
        payload_words: 3,
        factory: || Event::Flow(FlowEvent::default()),
        decode_payload: decode_flow,
    },
    EventTypeInfo {
        kind: EventKind::Gaussian,
        tag: "GAE",
        payload_words: 5,
        factory: || Event::Gaussian(GaussianEvent::default()),
        decode_payload: decode_gae,
    },
    EventTypeInfo {
        kind: EventKind::Skin,
        tag: "SKE",
        payload_words: 1,
        factory: || Event::Skin(SkinEvent::default()),
        decode_payload: decode_ske,
    },
    EventTypeInfo {
        kind: EventKind::SkinSample,
        tag: "SKS",
        payload_words: 2,
        factory: || Event::SkinSample(SkinSample::default()),
        decode_payload: decode_sks,
    },
    EventTypeInfo {
        kind: EventKind::Imu,
        tag: "IMU",
        payload_words: 1,
        factory: || Event::Imu(ImuEvent::default()),
        decode_payload: decode_imu,
    },
    EventTypeInfo {
        kind: EventKind::Neuron,
        tag: "NEU",
        payload_words: 1,
        factory: || Event::Neuron(NeuronEvent::default()),
        decode_payload: decode_neu,
    },
    EventTypeInfo {
        kind: EventKind::Ear,
        tag: "EAR",
        payload_words: 1,
        factory: || Event::Ear(EarEvent::default()),
        decode_payload: decode_ear,
    },
    EventTypeInfo {
        kind: EventKind::Box,
        tag: "BOX",
        payload_words: 2,
        factory: || Event::Box(BoxEvent::default()),
        decode_payload: decode_box,
    },
];

/// All registered event types, in wire-code order.
pub fn registry() -> &'static [EventTypeInfo] {
    &REGISTRY
}

/// Registry row for a kind. O(1) — kinds index the table by code.
pub fn info(kind: EventKind) -> &'static EventTypeInfo {
    &REGISTRY[kind.code() as usize]
}

/// Registry row for a wire tag, or `None` for an unrecognized tag.
pub fn info_for_tag(tag: &str) -> Option<&'static EventTypeInfo> {
    static BY_TAG: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();
    let map = BY_TAG.get_or_init(|| {
        REGISTRY
            .iter()
            .enumerate()
            .map(|(index, info)| (info.tag, index))
            .collect()
    });
    map.get(tag).map(|&index| &REGISTRY[index])
}

/// Append the wire words of `event` (stamp word + payload) to `out`.
///
/// Out-of-range field values are masked to their wire bit width.
pub fn encode_into(event: &Event, out: &mut Vec<u32>) {
    out.push(make_stamp_word(event.kind(), event.stamp()));
    match event {
        Event::Stamp(_) => {}
        Event::Address(ae) => out.push(pack_address(ae)),
        Event::Labelled(e) => {
            out.push(pack_address(&e.ae));
            out.push(e.id as u32);
        }
        Event::Flow(e) => {
            out.push(pack_address(&e.ae));
            out.push(word_from_f32(e.vx));
            out.push(word_from_f32(e.vy));
        }
        Event::Gaussian(e) => {
            out.push(pack_address(&e.lae.ae));
            out.push(e.lae.id as u32);
            out.push(word_from_f32(e.sig_x2));
            out.push(word_from_f32(e.sig_y2));
            out.push(word_from_f32(e.sig_xy));
        }
        Event::Skin(e) => out.push(pack_skin(e)),
        Event::SkinSample(e) => {
            out.push(pack_skin(&e.address));
            out.push(e.value as u32);
        }
        Event::Imu(e) => out.push(pack_imu(e)),
        Event::Neuron(e) => out.push(pack_neuron(e)),
        Event::Ear(e) => out.push(pack_ear(e)),
        Event::Box(e) => {
            out.push(pack_address(&e.ae));
            out.push(pack_extent(e.width, e.height));
        }
    }
}

/// Encode a single event into a fresh word vector.
pub fn encode(event: &Event) -> Vec<u32> {
    let mut out = Vec::with_capacity(info(event.kind()).word_count());
    encode_into(event, &mut out);
    out
}

/// Decode one event of `kind` starting at `cursor`.
///
/// Returns the event and the advanced cursor, or `None` when not enough
/// words remain (the cursor is then conceptually unmoved — the caller
/// decides whether to abandon the rest of the group). A stamp word with
/// the marker bit missing also fails: that is word-level corruption, not
/// a short read.
pub fn decode_one(kind: EventKind, words: &[u32], cursor: usize) -> Option<(Event, usize)> {
    let info = info(kind);
    let needed = info.word_count();
    if cursor + needed > words.len() {
        return None;
    }
    let (stamp, inline_kind) = parse_stamp_word(words[cursor])?;
    if let Some(inline) = inline_kind {
        if inline != kind {
            // Batch tag grouping is authoritative; the inline code is a
            // fast-path hint only.
            log::debug!(
                "inline kind code {:?} disagrees with batch tag {:?}; trusting the tag",
                inline,
                kind
            );
        }
    }
    let event = (info.decode_payload)(stamp, &words[cursor + 1..cursor + needed]);
    Some((event, cursor + needed))
}
