//! Wire word layouts.
//!
//! Every encoded event is one stamp word followed by a fixed number of
//! payload words. All fields are packed LSB-first at fixed offsets:
//!
//! ```text
//! stamp word: marker[31] | kind code[STAMP_BITS..STAMP_BITS+5] | stamp[0..STAMP_BITS]
//! AE payload: corner[22] | channel[21] | y[11..21] | x[1..11] | polarity[0]
//! SKE payload: error[17] | sample[16] | side[15] | body_part[12..15]
//!              | cross_base[11] | taxel[1..11] | polarity[0]
//! IMU payload: channel[20] | sensor[16..20] | value[0..16]
//! NEU payload: neuron_id[0..20]
//! EAR payload: channel[21] | frequency_band[1..11] | polarity[0]
//! BOX extent:  height[16..32] | width[0..16]
//! ```
//!
//! On 31-bit stamp builds the stamp word has no room for the kind code;
//! decode then relies on batch tag grouping alone.

use aeris_types::{
    AddressEvent, Channel, EarEvent, EventKind, ImuEvent, NeuronEvent, Polarity, SkinEvent, Stamp,
    MAX_STAMP, STAMP_BITS,
};

/// Timestamp marker: set on every stamp word, used by the raw-stream
/// decoder to detect byte misalignment.
pub const STAMP_MARKER: u32 = 1 << 31;

/// Width of the inline kind code in the stamp word (0 when the stamp
/// leaves no room).
pub const KIND_CODE_BITS: u32 = if STAMP_BITS <= 25 { 5 } else { 0 };

const STAMP_MASK: u32 = MAX_STAMP - 1;
const KIND_CODE_MASK: u32 = (1 << KIND_CODE_BITS) - 1;

#[inline]
fn get(word: u32, lo: u32, len: u32) -> u32 {
    (word >> lo) & ((1u32 << len) - 1)
}

#[inline]
fn put(lo: u32, len: u32, value: u32) -> u32 {
    (value & ((1u32 << len) - 1)) << lo
}

/// Raw bit pattern of an `f32`, for float fields crossing the wire in
/// integer word slots. Exact: sign, subnormals and NaN payloads survive.
#[inline]
pub fn word_from_f32(value: f32) -> u32 {
    value.to_bits()
}

/// Inverse of [`word_from_f32`].
#[inline]
pub fn f32_from_word(word: u32) -> f32 {
    f32::from_bits(word)
}

/// Build the stamp word for an event of `kind`.
pub fn make_stamp_word(kind: EventKind, stamp: Stamp) -> u32 {
    let mut word = STAMP_MARKER | (stamp.raw() & STAMP_MASK);
    if KIND_CODE_BITS > 0 {
        word |= (kind.code() as u32 & KIND_CODE_MASK) << STAMP_BITS;
    }
    word
}

/// Split a stamp word into its stamp and (where present) inline kind.
///
/// Returns `None` if the timestamp marker bit is not set — the caller is
/// looking at a payload word or a misaligned byte window.
pub fn parse_stamp_word(word: u32) -> Option<(Stamp, Option<EventKind>)> {
    if word & STAMP_MARKER == 0 {
        return None;
    }
    let stamp = Stamp::new(word & STAMP_MASK);
    let kind = if KIND_CODE_BITS > 0 {
        EventKind::from_code(get(word, STAMP_BITS, KIND_CODE_BITS) as u8)
    } else {
        None
    };
    Some((stamp, kind))
}

pub fn pack_address(ae: &AddressEvent) -> u32 {
    put(0, 1, ae.polarity.bit())
        | put(1, 10, ae.x as u32)
        | put(11, 10, ae.y as u32)
        | put(21, 1, ae.channel.bit())
        | put(22, 1, ae.corner as u32)
}

pub fn unpack_address(stamp: Stamp, word: u32) -> AddressEvent {
    AddressEvent {
        stamp,
        x: get(word, 1, 10) as u16,
        y: get(word, 11, 10) as u16,
        polarity: Polarity::from_bit(get(word, 0, 1)),
        channel: Channel::from_bit(get(word, 21, 1)),
        corner: get(word, 22, 1) != 0,
    }
}

pub fn pack_skin(ev: &SkinEvent) -> u32 {
    put(0, 1, ev.polarity.bit())
        | put(1, 10, ev.taxel as u32)
        | put(11, 1, ev.cross_base as u32)
        | put(12, 3, ev.body_part as u32)
        | put(15, 1, ev.side.bit())
        | put(16, 1, ev.is_sample as u32)
        | put(17, 1, ev.error as u32)
}

pub fn unpack_skin(stamp: Stamp, word: u32) -> SkinEvent {
    SkinEvent {
        stamp,
        taxel: get(word, 1, 10) as u16,
        polarity: Polarity::from_bit(get(word, 0, 1)),
        cross_base: get(word, 11, 1) != 0,
        body_part: get(word, 12, 3) as u8,
        side: Channel::from_bit(get(word, 15, 1)),
        is_sample: get(word, 16, 1) != 0,
        error: get(word, 17, 1) != 0,
    }
}

pub fn pack_imu(ev: &ImuEvent) -> u32 {
    put(0, 16, ev.value as u16 as u32) | put(16, 4, ev.sensor as u32) | put(20, 1, ev.channel.bit())
}

pub fn unpack_imu(stamp: Stamp, word: u32) -> ImuEvent {
    ImuEvent {
        stamp,
        value: get(word, 0, 16) as u16 as i16,
        sensor: get(word, 16, 4) as u8,
        channel: Channel::from_bit(get(word, 20, 1)),
    }
}

pub fn pack_neuron(ev: &NeuronEvent) -> u32 {
    put(0, 20, ev.neuron_id)
}

pub fn unpack_neuron(stamp: Stamp, word: u32) -> NeuronEvent {
    NeuronEvent {
        stamp,
        neuron_id: get(word, 0, 20),
    }
}

pub fn pack_ear(ev: &EarEvent) -> u32 {
    put(0, 1, ev.polarity.bit()) | put(1, 10, ev.frequency_band as u32) | put(21, 1, ev.channel.bit())
}

pub fn unpack_ear(stamp: Stamp, word: u32) -> EarEvent {
    EarEvent {
        stamp,
        frequency_band: get(word, 1, 10) as u16,
        polarity: Polarity::from_bit(get(word, 0, 1)),
        channel: Channel::from_bit(get(word, 21, 1)),
    }
}

pub fn pack_extent(width: u16, height: u16) -> u32 {
    put(0, 16, width as u32) | put(16, 16, height as u32)
}

pub fn unpack_extent(word: u32) -> (u16, u16) {
    (get(word, 0, 16) as u16, get(word, 16, 16) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_word_round_trips_kind_and_stamp() {
        let stamp = Stamp::new(0x12345);
        let word = make_stamp_word(EventKind::Flow, stamp);
        assert_ne!(word & STAMP_MARKER, 0);
        let (parsed, kind) = parse_stamp_word(word).unwrap();
        assert_eq!(parsed, stamp);
        if KIND_CODE_BITS > 0 {
            assert_eq!(kind, Some(EventKind::Flow));
        } else {
            assert_eq!(kind, None);
        }
    }

    #[test]
    fn payload_word_is_not_a_stamp_word() {
        let ae = AddressEvent::new(Stamp::new(0), 300, 200, Polarity::On);
        assert!(parse_stamp_word(pack_address(&ae)).is_none());
    }

    #[test]
    fn address_fields_round_trip_at_extremes() {
        for (x, y) in [(0u16, 0u16), (1023, 1023), (304, 239)] {
            for polarity in [Polarity::Off, Polarity::On] {
                let mut ae = AddressEvent::new(Stamp::new(99), x, y, polarity);
                ae.channel = Channel::Right;
                ae.corner = true;
                let back = unpack_address(Stamp::new(99), pack_address(&ae));
                assert_eq!(back, ae);
            }
        }
    }

    #[test]
    fn oversized_fields_are_masked_not_smeared() {
        // x beyond 10 bits must not bleed into y
        let ae = AddressEvent::new(Stamp::new(0), 0x7FF, 0, Polarity::Off);
        let back = unpack_address(Stamp::new(0), pack_address(&ae));
        assert_eq!(back.x, 0x3FF);
        assert_eq!(back.y, 0);
    }

    #[test]
    fn float_words_are_bit_exact() {
        for v in [
            0.0f32,
            -0.0,
            1.5,
            -1234.5678,
            f32::MIN_POSITIVE,
            1.0e-42, // subnormal
            f32::MAX,
            f32::INFINITY,
            f32::NEG_INFINITY,
        ] {
            let back = f32_from_word(word_from_f32(v));
            assert_eq!(back.to_bits(), v.to_bits(), "{v}");
        }
    }

    #[test]
    fn imu_value_sign_survives() {
        let ev = ImuEvent {
            stamp: Stamp::new(1),
            value: -32768,
            sensor: 9,
            channel: Channel::Right,
        };
        let back = unpack_imu(Stamp::new(1), pack_imu(&ev));
        assert_eq!(back, ev);
    }
}
