//! Dense per-pixel surfaces.
//!
//! A surface indexes the *last* event per pixel so coincidence lookups are
//! O(1) instead of an O(n) queue scan. [`EventSurface`] stores the raw
//! most-recent record with no eviction — staleness is inferred by the
//! caller comparing stamps (wrap-aware) at query time. [`DecaySurface`]
//! is the leaky-integrator variant: per-pixel activity decays
//! exponentially and each event injects a fixed amount.

use serde::{Deserialize, Serialize};

use aeris_types::{AddressEvent, PixelRect, Polarity, SensorGeometry, Stamp};

/// Most-recent event attributes at one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PixelRecord {
    pub stamp: Stamp,
    pub polarity: Polarity,
    /// False until the pixel has seen its first event
    pub seen: bool,
}

/// Dense map of the most recent event per pixel.
#[derive(Debug, Clone)]
pub struct EventSurface {
    geometry: SensorGeometry,
    cells: Vec<PixelRecord>,
}

impl EventSurface {
    pub fn new(geometry: SensorGeometry) -> Self {
        Self {
            geometry,
            cells: vec![PixelRecord::default(); geometry.num_pixels()],
        }
    }

    /// Overwrite the stored record at the event's pixel. Returns false
    /// (and stores nothing) for out-of-bounds coordinates.
    pub fn update(&mut self, event: &AddressEvent) -> bool {
        if !self.geometry.contains(event.x, event.y) {
            return false;
        }
        self.cells[self.geometry.index(event.x, event.y)] = PixelRecord {
            stamp: event.stamp,
            polarity: event.polarity,
            seen: true,
        };
        true
    }

    /// Record at a pixel; `None` only for out-of-bounds queries. A pixel
    /// that never fired returns a record with `seen == false`.
    pub fn pixel(&self, x: u16, y: u16) -> Option<PixelRecord> {
        if !self.geometry.contains(x, y) {
            return None;
        }
        Some(self.cells[self.geometry.index(x, y)])
    }

    /// Row-major copy of a sub-region, clipped to the sensor bounds.
    pub fn region(&self, rect: PixelRect) -> Vec<PixelRecord> {
        let x_end = (rect.x as u32 + rect.width as u32).min(self.geometry.width);
        let y_end = (rect.y as u32 + rect.height as u32).min(self.geometry.height);
        let mut out = Vec::new();
        for y in rect.y as u32..y_end {
            for x in rect.x as u32..x_end {
                out.push(self.cells[self.geometry.index(x as u16, y as u16)]);
            }
        }
        out
    }

    pub fn geometry(&self) -> SensorGeometry {
        self.geometry
    }

    /// Forget everything, e.g. on a stream restart.
    pub fn reset(&mut self) {
        self.cells.fill(PixelRecord::default());
    }
}

/// Tuning for [`DecaySurface`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayConfig {
    /// Time constant of the exponential decay, in stamp ticks
    pub decay_rate: f64,
    /// Activity injected per event
    pub injection: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            decay_rate: 1_000_000.0,
            injection: 1.0,
        }
    }
}

/// Exponential-decay activity map (leaky integrator per pixel).
///
/// Works in *unwrapped* time (see
/// [`StampUnwrapper`](crate::stamp::StampUnwrapper)): decay spans can
/// exceed the stamp modulus during long idle periods, which wrapping
/// arithmetic cannot represent. Stored as `f64` so long idle decays
/// underflow gracefully instead of snapping to zero early.
#[derive(Debug, Clone)]
pub struct DecaySurface {
    geometry: SensorGeometry,
    config: DecayConfig,
    activity: Vec<f64>,
    last_update: Vec<u64>,
}

impl DecaySurface {
    pub fn new(geometry: SensorGeometry, config: DecayConfig) -> Self {
        Self {
            geometry,
            config,
            activity: vec![0.0; geometry.num_pixels()],
            last_update: vec![0; geometry.num_pixels()],
        }
    }

    /// Decay the pixel to `now`, then inject one event's worth of
    /// activity. Returns the pixel's new activity, or `None` for
    /// out-of-bounds coordinates.
    pub fn add_event(&mut self, x: u16, y: u16, now: u64) -> Option<f64> {
        if !self.geometry.contains(x, y) {
            return None;
        }
        let idx = self.geometry.index(x, y);
        self.decay_cell(idx, now);
        self.activity[idx] += self.config.injection;
        self.last_update[idx] = now;
        Some(self.activity[idx])
    }

    /// Activity a pixel would have at `now`, without mutating the map.
    pub fn activity_at(&self, x: u16, y: u16, now: u64) -> Option<f64> {
        if !self.geometry.contains(x, y) {
            return None;
        }
        let idx = self.geometry.index(x, y);
        let dt = now.saturating_sub(self.last_update[idx]) as f64;
        Some(self.activity[idx] * (-dt / self.config.decay_rate).exp())
    }

    fn decay_cell(&mut self, idx: usize, now: u64) {
        let dt = now.saturating_sub(self.last_update[idx]) as f64;
        if dt > 0.0 {
            self.activity[idx] *= (-dt / self.config.decay_rate).exp();
        }
    }

    pub fn geometry(&self) -> SensorGeometry {
        self.geometry
    }

    pub fn config(&self) -> DecayConfig {
        self.config
    }

    pub fn reset(&mut self) {
        self.activity.fill(0.0);
        self.last_update.fill(0);
    }
}
