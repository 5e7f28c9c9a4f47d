//! # AERIS Types
//!
//! Shared data types for the AERIS event-vision stack: the address-event
//! variants produced by neuromorphic sensors, the closed [`Event`] sum type
//! the rest of the system dispatches on, and the compile-time stamp-width
//! configuration.
//!
//! This crate is deliberately free of any processing logic — it is consumed
//! by `aeris_core` (codec, queues, windows, filters) and by driver or
//! transport crates that only need the message shapes.

pub mod event;
pub mod geometry;

pub use event::{
    AddressEvent, BoxEvent, Channel, EarEvent, Event, EventKind, FlowEvent, GaussianEvent,
    ImuEvent, LabelledAddressEvent, NeuronEvent, Polarity, SkinEvent, SkinSample, Stamp,
};
pub use geometry::{PixelRect, SensorGeometry};

#[cfg(all(feature = "stamp-25bit", feature = "stamp-31bit"))]
compile_error!("features `stamp-25bit` and `stamp-31bit` are mutually exclusive");

/// Bit width of the hardware timestamp counter for this build.
///
/// Fixed per sensor generation at design time: 24 bits by default, 25 or 31
/// via the `stamp-25bit` / `stamp-31bit` cargo features.
#[cfg(all(not(feature = "stamp-25bit"), not(feature = "stamp-31bit")))]
pub const STAMP_BITS: u32 = 24;
#[cfg(feature = "stamp-25bit")]
pub const STAMP_BITS: u32 = 25;
#[cfg(feature = "stamp-31bit")]
pub const STAMP_BITS: u32 = 31;

/// Modulus of the wrapping hardware counter. Stamps live in `[0, MAX_STAMP)`.
pub const MAX_STAMP: u32 = 1 << STAMP_BITS;

/// Half the counter range — the wrap-detection threshold. Two stamps more
/// than `HALF_STAMP` apart are assumed to straddle a counter rollover.
pub const HALF_STAMP: u32 = MAX_STAMP / 2;

/// Maximum allowed sensor dimension to prevent excessive memory allocation
/// in dense per-pixel structures. Far beyond any real event sensor.
pub const MAX_SENSOR_DIM: u32 = 32768;
