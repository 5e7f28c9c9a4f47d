// Address-event variants for neuromorphic sensors
//
// Every event carries a wrapping hardware timestamp plus a variant-specific
// payload. The concrete variants form a closed set dispatched via
// [`EventKind`] — there is no open inheritance; shared pixel fields are
// factored into [`AddressEvent`] and embedded by value where needed.

use serde::{Deserialize, Serialize};

use crate::MAX_STAMP;

/// A wrapping hardware clock value, always kept in `[0, MAX_STAMP)`.
///
/// Plain `Ord` on `Stamp` is *straight* numeric ordering. Wrap-aware
/// comparison (where a numerically smaller stamp may be logically later)
/// lives in `aeris_core::stamp` — dense bursts around a counter rollover
/// cannot be ordered without that context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Stamp(u32);

impl Stamp {
    /// Wrap a raw counter value into the valid range (high bits masked off).
    pub const fn new(raw: u32) -> Self {
        Self(raw & (MAX_STAMP - 1))
    }

    /// The raw counter value.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for Stamp {
    fn from(raw: u32) -> Self {
        Self::new(raw)
    }
}

impl std::fmt::Display for Stamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Stamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Stamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Mask on the way in so the in-range invariant survives deserialization
        u32::deserialize(deserializer).map(Stamp::new)
    }
}

/// Contrast-change polarity of a pixel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum Polarity {
    /// Luminance decrease (OFF event)
    #[default]
    Off = 0,
    /// Luminance increase (ON event)
    On = 1,
}

impl Polarity {
    pub const fn from_bit(bit: u32) -> Self {
        if bit & 1 == 0 {
            Polarity::Off
        } else {
            Polarity::On
        }
    }

    pub const fn bit(self) -> u32 {
        self as u32
    }
}

/// Stereo channel (left/right sensor) an event originated from.
///
/// Also reused as the body `side` for skin events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum Channel {
    #[default]
    Left = 0,
    Right = 1,
}

impl Channel {
    pub const fn from_bit(bit: u32) -> Self {
        if bit & 1 == 0 {
            Channel::Left
        } else {
            Channel::Right
        }
    }

    pub const fn bit(self) -> u32 {
        self as u32
    }
}

/// Single pixel-level sensor reading from an event camera.
///
/// Pixel coordinates are bounded by the 10-bit wire fields (0..=1023),
/// which covers every supported sensor resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AddressEvent {
    /// Wrapping hardware timestamp
    pub stamp: Stamp,
    /// Pixel column
    pub x: u16,
    /// Pixel row
    pub y: u16,
    /// Contrast-change polarity
    pub polarity: Polarity,
    /// Stereo channel
    pub channel: Channel,
    /// Corner flag set by upstream corner detectors
    pub corner: bool,
}

impl AddressEvent {
    pub fn new(stamp: Stamp, x: u16, y: u16, polarity: Polarity) -> Self {
        Self {
            stamp,
            x,
            y,
            polarity,
            channel: Channel::Left,
            corner: false,
        }
    }
}

/// Address event tagged with an integer identity (cluster or track id).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LabelledAddressEvent {
    pub ae: AddressEvent,
    /// Cluster/track identity assigned by a downstream tracker
    pub id: i32,
}

/// Address event with an attached optical-flow velocity estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FlowEvent {
    pub ae: AddressEvent,
    /// Horizontal velocity in pixels per second
    pub vx: f32,
    /// Vertical velocity in pixels per second
    pub vy: f32,
}

/// Labelled event carrying the 2D Gaussian shape of a tracked blob.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GaussianEvent {
    pub lae: LabelledAddressEvent,
    /// Variance along x
    pub sig_x2: f32,
    /// Variance along y
    pub sig_y2: f32,
    /// Covariance
    pub sig_xy: f32,
}

/// Tactile event from a skin taxel array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SkinEvent {
    pub stamp: Stamp,
    /// Taxel identifier within the body part (10-bit wire field)
    pub taxel: u16,
    pub polarity: Polarity,
    /// Pressure crossed the baseline rather than a relative change
    pub cross_base: bool,
    /// Body part identifier (3-bit wire field)
    pub body_part: u8,
    /// Body side the taxel array is mounted on
    pub side: Channel,
    /// This address announces an analog sample; a value half follows
    pub is_sample: bool,
    /// Error flag raised by the skin preprocessor
    pub error: bool,
}

/// Complete analog skin reading: the announcing address plus its 16-bit
/// value, reassembled from the address-then-value pair on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SkinSample {
    pub address: SkinEvent,
    /// Raw ADC reading
    pub value: u16,
}

/// Inertial sample from the sensor-mounted IMU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ImuEvent {
    pub stamp: Stamp,
    /// Signed 16-bit sensor reading
    pub value: i16,
    /// Axis index: 0-2 accelerometer, 3-5 gyroscope, 6 temperature,
    /// 7-9 magnetometer (4-bit wire field)
    pub sensor: u8,
    pub channel: Channel,
}

/// Spike from an artificial neuron population (20-bit flat id).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct NeuronEvent {
    pub stamp: Stamp,
    pub neuron_id: u32,
}

/// Spike from a silicon cochlea frequency band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct EarEvent {
    pub stamp: Stamp,
    /// Frequency band index (10-bit wire field)
    pub frequency_band: u16,
    pub polarity: Polarity,
    pub channel: Channel,
}

/// Address event extended with a bounding box (e.g. a detected region).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BoxEvent {
    pub ae: AddressEvent,
    pub width: u16,
    pub height: u16,
}

/// Identifies the concrete variant of an [`Event`].
///
/// The discriminant doubles as the wire kind code embedded in the stamp
/// word on builds where the stamp leaves room for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventKind {
    /// Bare timestamp heartbeat
    Stamp = 0,
    Address = 1,
    Labelled = 2,
    Flow = 3,
    Gaussian = 4,
    Skin = 5,
    SkinSample = 6,
    Imu = 7,
    Neuron = 8,
    Ear = 9,
    Box = 10,
}

impl EventKind {
    /// Every kind, in wire-code order.
    pub const ALL: [EventKind; 11] = [
        EventKind::Stamp,
        EventKind::Address,
        EventKind::Labelled,
        EventKind::Flow,
        EventKind::Gaussian,
        EventKind::Skin,
        EventKind::SkinSample,
        EventKind::Imu,
        EventKind::Neuron,
        EventKind::Ear,
        EventKind::Box,
    ];

    /// Stable wire tag used to label batched groups of this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            EventKind::Stamp => "TS",
            EventKind::Address => "AE",
            EventKind::Labelled => "LAE",
            EventKind::Flow => "FLOW",
            EventKind::Gaussian => "GAE",
            EventKind::Skin => "SKE",
            EventKind::SkinSample => "SKS",
            EventKind::Imu => "IMU",
            EventKind::Neuron => "NEU",
            EventKind::Ear => "EAR",
            EventKind::Box => "BOX",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// Wire kind code (the enum discriminant).
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EventKind::Stamp),
            1 => Some(EventKind::Address),
            2 => Some(EventKind::Labelled),
            3 => Some(EventKind::Flow),
            4 => Some(EventKind::Gaussian),
            5 => Some(EventKind::Skin),
            6 => Some(EventKind::SkinSample),
            7 => Some(EventKind::Imu),
            8 => Some(EventKind::Neuron),
            9 => Some(EventKind::Ear),
            10 => Some(EventKind::Box),
            _ => None,
        }
    }
}

/// A decoded sensor event — the closed sum over every supported variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Stamp(Stamp),
    Address(AddressEvent),
    Labelled(LabelledAddressEvent),
    Flow(FlowEvent),
    Gaussian(GaussianEvent),
    Skin(SkinEvent),
    SkinSample(SkinSample),
    Imu(ImuEvent),
    Neuron(NeuronEvent),
    Ear(EarEvent),
    Box(BoxEvent),
}

impl Event {
    pub const fn kind(&self) -> EventKind {
        match self {
            Event::Stamp(_) => EventKind::Stamp,
            Event::Address(_) => EventKind::Address,
            Event::Labelled(_) => EventKind::Labelled,
            Event::Flow(_) => EventKind::Flow,
            Event::Gaussian(_) => EventKind::Gaussian,
            Event::Skin(_) => EventKind::Skin,
            Event::SkinSample(_) => EventKind::SkinSample,
            Event::Imu(_) => EventKind::Imu,
            Event::Neuron(_) => EventKind::Neuron,
            Event::Ear(_) => EventKind::Ear,
            Event::Box(_) => EventKind::Box,
        }
    }

    /// The wrapping hardware timestamp, whichever variant this is.
    pub const fn stamp(&self) -> Stamp {
        match self {
            Event::Stamp(s) => *s,
            Event::Address(e) => e.stamp,
            Event::Labelled(e) => e.ae.stamp,
            Event::Flow(e) => e.ae.stamp,
            Event::Gaussian(e) => e.lae.ae.stamp,
            Event::Skin(e) => e.stamp,
            Event::SkinSample(e) => e.address.stamp,
            Event::Imu(e) => e.stamp,
            Event::Neuron(e) => e.stamp,
            Event::Ear(e) => e.stamp,
            Event::Box(e) => e.ae.stamp,
        }
    }

    pub fn set_stamp(&mut self, stamp: Stamp) {
        match self {
            Event::Stamp(s) => *s = stamp,
            Event::Address(e) => e.stamp = stamp,
            Event::Labelled(e) => e.ae.stamp = stamp,
            Event::Flow(e) => e.ae.stamp = stamp,
            Event::Gaussian(e) => e.lae.ae.stamp = stamp,
            Event::Skin(e) => e.stamp = stamp,
            Event::SkinSample(e) => e.address.stamp = stamp,
            Event::Imu(e) => e.stamp = stamp,
            Event::Neuron(e) => e.stamp = stamp,
            Event::Ear(e) => e.stamp = stamp,
            Event::Box(e) => e.ae.stamp = stamp,
        }
    }

    /// The embedded pixel header, for variants that have one.
    pub const fn as_address(&self) -> Option<&AddressEvent> {
        match self {
            Event::Address(e) => Some(e),
            Event::Labelled(e) => Some(&e.ae),
            Event::Flow(e) => Some(&e.ae),
            Event::Gaussian(e) => Some(&e.lae.ae),
            Event::Box(e) => Some(&e.ae),
            _ => None,
        }
    }

    /// Pixel coordinates, for variants that carry them.
    pub fn pixel(&self) -> Option<(u16, u16)> {
        self.as_address().map(|ae| (ae.x, ae.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_masks_out_of_range_values() {
        let s = Stamp::new(MAX_STAMP + 7);
        assert_eq!(s.raw(), 7);
        assert!(Stamp::new(u32::MAX).raw() < MAX_STAMP);
    }

    #[test]
    fn tags_round_trip_through_lookup() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_tag(kind.tag()), Some(kind));
            assert_eq!(EventKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(EventKind::from_tag("NOPE"), None);
        assert_eq!(EventKind::from_code(42), None);
    }

    #[test]
    fn stamp_accessor_covers_every_variant() {
        let s = Stamp::new(1234);
        let ae = AddressEvent::new(s, 10, 20, Polarity::On);
        let events = [
            Event::Stamp(s),
            Event::Address(ae),
            Event::Labelled(LabelledAddressEvent { ae, id: 3 }),
            Event::Flow(FlowEvent {
                ae,
                vx: 1.0,
                vy: -1.0,
            }),
            Event::Gaussian(GaussianEvent {
                lae: LabelledAddressEvent { ae, id: 3 },
                sig_x2: 1.0,
                sig_y2: 2.0,
                sig_xy: 0.5,
            }),
            Event::Skin(SkinEvent {
                stamp: s,
                ..Default::default()
            }),
            Event::SkinSample(SkinSample {
                address: SkinEvent {
                    stamp: s,
                    ..Default::default()
                },
                value: 99,
            }),
            Event::Imu(ImuEvent {
                stamp: s,
                value: -5,
                sensor: 2,
                channel: Channel::Left,
            }),
            Event::Neuron(NeuronEvent {
                stamp: s,
                neuron_id: 77,
            }),
            Event::Ear(EarEvent {
                stamp: s,
                frequency_band: 31,
                polarity: Polarity::On,
                channel: Channel::Right,
            }),
            Event::Box(BoxEvent {
                ae,
                width: 8,
                height: 4,
            }),
        ];
        for mut ev in events {
            assert_eq!(ev.stamp(), s, "{:?}", ev.kind());
            ev.set_stamp(Stamp::new(9));
            assert_eq!(ev.stamp().raw(), 9, "{:?}", ev.kind());
        }
    }

    #[test]
    fn pixel_accessor_only_on_address_variants() {
        let ae = AddressEvent::new(Stamp::new(0), 3, 4, Polarity::Off);
        assert_eq!(Event::Address(ae).pixel(), Some((3, 4)));
        assert_eq!(Event::Box(BoxEvent { ae, width: 1, height: 1 }).pixel(), Some((3, 4)));
        assert_eq!(Event::Stamp(Stamp::new(0)).pixel(), None);
        assert_eq!(
            Event::Imu(ImuEvent::default()).pixel(),
            None
        );
    }
}
