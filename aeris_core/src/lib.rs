//! # AERIS Core
//!
//! The event codec and temporal-queue core of the AERIS neuromorphic
//! vision stack. Transport, drivers and display live in surrounding
//! crates; this crate owns everything between raw sensor bytes and the
//! windowed event sets downstream algorithms consume:
//!
//! - **Codec**: tagged binary encoding/decoding of address-events into
//!   compact integer-word packets, driven by a static type registry
//! - **Stamps**: wrap-aware timestamp arithmetic and per-stream
//!   unwrapping of the rolling hardware counter
//! - **Queues**: ordered, sortable sequences of shared event handles
//! - **Windows & Surfaces**: bounded structures that admit new events
//!   and evict stale ones, plus dense per-pixel last-event maps
//! - **Filters**: salt-and-pepper noise suppression with per-pixel
//!   coincidence maps
//! - **Batching**: tag-grouped aggregation for outbound transport and a
//!   coarse-locked collector for producer/consumer handoff
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use aeris_core::{read_batch, EventBatch, TimeWindow};
//! use aeris_types::{AddressEvent, Event, Polarity, Stamp};
//!
//! // Encode a batch for transport...
//! let mut batch = EventBatch::new();
//! batch.push(&Event::Address(AddressEvent::new(
//!     Stamp::new(1000), 17, 23, Polarity::On,
//! )));
//!
//! // ...decode it on the far side and window the result.
//! let (events, stats) = read_batch(batch.groups());
//! assert_eq!(stats.decoded, 1);
//! let mut window = TimeWindow::from_duration(10_000).unwrap();
//! for event in events {
//!     window.add_event(Arc::new(event));
//! }
//! assert_eq!(window.len(), 1);
//! ```

pub mod batch;
pub mod codec;
pub mod error;
pub mod filters;
pub mod pairing;
pub mod queue;
pub mod rate;
pub mod stamp;
pub mod surface;
pub mod window;

pub use batch::{read_batch, Collector, DecodeStats, EventBatch};
pub use codec::raw::{RawStreamDecoder, TimedEvent};
pub use codec::{decode_one, encode, encode_into, info, info_for_tag, registry, EventTypeInfo};
pub use error::{AerisError, AerisResult};
pub use filters::{FilterConfig, NoiseFilter, RefractoryFilter, SpatialFilter, TemporalFilter};
pub use pairing::{SkinHalf, SkinSamplePairer};
pub use queue::{EventHandle, EventQueue};
pub use rate::RateStats;
pub use stamp::{wrap_cmp, wrap_delta, StampUnwrapper};
pub use surface::{DecayConfig, DecaySurface, EventSurface, PixelRecord};
pub use window::{CountWindow, RoiWindow, TimeWindow};

// Re-export the types crate so downstream users need only one dependency
pub use aeris_types;
