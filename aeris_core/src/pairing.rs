//! Skin address/value reassembly.
//!
//! Analog skin readings cross the wire in two halves: the announcing
//! address (a [`SkinEvent`] with `is_sample` set) followed by the 16-bit
//! value. The halves must strictly alternate; a repeated address without
//! an intervening value, or a value with no pending address, is a
//! protocol violation — reported and counted, never fatal. The unmatched
//! half is discarded and pairing resumes from the next address.

use aeris_types::{SkinEvent, SkinSample};

/// One half of a skin sample as it appears in the stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkinHalf {
    Address(SkinEvent),
    Value(u16),
}

/// Stateful address/value pairer for one skin stream.
#[derive(Debug, Clone, Default)]
pub struct SkinSamplePairer {
    pending: Option<SkinEvent>,
    mismatches: u64,
}

impl SkinSamplePairer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next half; returns a complete sample when a value meets
    /// its pending address.
    pub fn feed(&mut self, half: SkinHalf) -> Option<SkinSample> {
        match half {
            SkinHalf::Address(address) => {
                if let Some(dropped) = self.pending.replace(address) {
                    self.mismatches += 1;
                    log::warn!(
                        "skin pairing: address for taxel {} repeated before its value; dropping the first",
                        dropped.taxel
                    );
                }
                None
            }
            SkinHalf::Value(value) => match self.pending.take() {
                Some(address) => Some(SkinSample { address, value }),
                None => {
                    self.mismatches += 1;
                    log::warn!("skin pairing: value {value:#06x} with no pending address; dropped");
                    None
                }
            },
        }
    }

    /// Pairing violations observed so far.
    pub fn mismatches(&self) -> u64 {
        self.mismatches
    }

    /// True if an address is waiting for its value.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any half-finished pair, e.g. on stream restart.
    pub fn reset(&mut self) {
        self.pending = None;
    }
}
