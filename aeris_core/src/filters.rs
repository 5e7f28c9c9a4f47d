//! Salt-and-pepper noise filters.
//!
//! Event cameras emit spurious isolated events uncorrelated with scene
//! motion. These filters suppress them with per-pixel last-seen-timestamp
//! maps: the temporal filter rejects same-pixel repeats inside a dead
//! time, the spatial filter demands at least one fresh spatiotemporal
//! neighbor. Maps are kept per (channel, polarity) plane where the check
//! is polarity-sensitive, so stereo streams never alias each other.
//!
//! The spatial neighbor check is **self-exclusive**: the triggering
//! pixel's own cell never satisfies it. Both self-inclusive and
//! self-exclusive variants exist in the wild; self-exclusion is the
//! stricter reading and the one later filter generations settled on.

use serde::{Deserialize, Serialize};

use aeris_types::{AddressEvent, Channel, Polarity, SensorGeometry, Stamp};

use crate::error::{AerisError, AerisResult};
use crate::stamp::wrap_delta;

/// Tuning for [`NoiseFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Temporal coincidence threshold in stamp ticks
    pub t_param: u32,
    /// Spatial neighborhood radius in pixels (Chebyshev)
    pub s_param: u16,
    /// Enable the temporal (same-pixel dead time) stage
    pub temporal: bool,
    /// Enable the spatial (neighbor coincidence) stage
    pub spatial: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            t_param: 1000,
            s_param: 1,
            temporal: true,
            spatial: true,
        }
    }
}

type Plane = Vec<Option<Stamp>>;

/// Rejects an event when the same pixel fired the same polarity on the
/// same channel within `t_param` ticks. The last-seen map is updated on
/// every check, pass or fail.
#[derive(Debug, Clone)]
pub struct TemporalFilter {
    geometry: SensorGeometry,
    t_param: u32,
    planes: [Plane; 4],
}

impl TemporalFilter {
    pub fn new(geometry: SensorGeometry, t_param: u32) -> Self {
        let plane = vec![None; geometry.num_pixels()];
        Self {
            geometry,
            t_param,
            planes: [plane.clone(), plane.clone(), plane.clone(), plane],
        }
    }

    pub fn check(
        &mut self,
        x: u16,
        y: u16,
        polarity: Polarity,
        channel: Channel,
        stamp: Stamp,
    ) -> bool {
        if !self.geometry.contains(x, y) {
            return false;
        }
        let idx = self.geometry.index(x, y);
        let plane = &mut self.planes[plane_index(channel, polarity)];
        let previous = std::mem::replace(&mut plane[idx], Some(stamp));
        match previous {
            Some(prev) => wrap_delta(prev, stamp).unsigned_abs() >= self.t_param as u64,
            None => true,
        }
    }
}

/// Accepts an event only if a neighboring pixel (within `s_param`,
/// excluding the pixel itself) saw an event within `t_param` ticks on the
/// same channel. Polarity-agnostic: any-polarity neighbors count.
#[derive(Debug, Clone)]
pub struct SpatialFilter {
    geometry: SensorGeometry,
    t_param: u32,
    s_param: u16,
    planes: [Plane; 2],
}

impl SpatialFilter {
    pub fn new(geometry: SensorGeometry, s_param: u16, t_param: u32) -> Self {
        let plane = vec![None; geometry.num_pixels()];
        Self {
            geometry,
            t_param,
            s_param,
            planes: [plane.clone(), plane],
        }
    }

    pub fn check(&mut self, x: u16, y: u16, channel: Channel, stamp: Stamp) -> bool {
        if !self.geometry.contains(x, y) {
            return false;
        }
        let plane = &mut self.planes[channel.bit() as usize];

        let r = self.s_param as i32;
        let x_min = (x as i32 - r).max(0) as u16;
        let y_min = (y as i32 - r).max(0) as u16;
        let x_max = (x as i32 + r).min(self.geometry.width as i32 - 1) as u16;
        let y_max = (y as i32 + r).min(self.geometry.height as i32 - 1) as u16;

        let mut pass = false;
        'scan: for ny in y_min..=y_max {
            for nx in x_min..=x_max {
                if nx == x && ny == y {
                    continue; // self-exclusive
                }
                if let Some(neighbor) = plane[self.geometry.index(nx, ny)] {
                    if wrap_delta(neighbor, stamp).unsigned_abs() <= self.t_param as u64 {
                        pass = true;
                        break 'scan;
                    }
                }
            }
        }

        plane[self.geometry.index(x, y)] = Some(stamp);
        pass
    }
}

/// Per-pixel dead-time suppression regardless of polarity: after a pixel
/// fires, everything from it is dropped for `period` ticks. The map is
/// updated only when an event passes.
#[derive(Debug, Clone)]
pub struct RefractoryFilter {
    geometry: SensorGeometry,
    period: u32,
    planes: [Plane; 2],
}

impl RefractoryFilter {
    pub fn new(geometry: SensorGeometry, period: u32) -> Self {
        let plane = vec![None; geometry.num_pixels()];
        Self {
            geometry,
            period,
            planes: [plane.clone(), plane],
        }
    }

    pub fn check(&mut self, x: u16, y: u16, channel: Channel, stamp: Stamp) -> bool {
        if !self.geometry.contains(x, y) {
            return false;
        }
        let idx = self.geometry.index(x, y);
        let plane = &mut self.planes[channel.bit() as usize];
        if let Some(prev) = plane[idx] {
            if wrap_delta(prev, stamp).unsigned_abs() < self.period as u64 {
                return false;
            }
        }
        plane[idx] = Some(stamp);
        true
    }
}

/// Combined salt-and-pepper filter: the temporal stage runs first, and
/// the spatial stage only ever sees events the temporal stage passed.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    temporal: Option<TemporalFilter>,
    spatial: Option<SpatialFilter>,
}

impl NoiseFilter {
    pub fn new(geometry: SensorGeometry, config: FilterConfig) -> AerisResult<Self> {
        if !config.temporal && !config.spatial {
            return Err(AerisError::InvalidConfig(
                "noise filter needs at least one active stage".into(),
            ));
        }
        if config.spatial && config.s_param == 0 {
            // Radius zero with self-exclusion can never find a neighbor
            return Err(AerisError::InvalidConfig(
                "spatial stage needs s_param >= 1".into(),
            ));
        }
        Ok(Self {
            temporal: config
                .temporal
                .then(|| TemporalFilter::new(geometry, config.t_param)),
            spatial: config
                .spatial
                .then(|| SpatialFilter::new(geometry, config.s_param, config.t_param)),
        })
    }

    /// True = keep, false = reject as noise.
    pub fn check(
        &mut self,
        x: u16,
        y: u16,
        polarity: Polarity,
        channel: Channel,
        stamp: Stamp,
    ) -> bool {
        if let Some(temporal) = &mut self.temporal {
            if !temporal.check(x, y, polarity, channel, stamp) {
                return false;
            }
        }
        if let Some(spatial) = &mut self.spatial {
            return spatial.check(x, y, channel, stamp);
        }
        true
    }

    pub fn check_event(&mut self, event: &AddressEvent) -> bool {
        self.check(
            event.x,
            event.y,
            event.polarity,
            event.channel,
            event.stamp,
        )
    }
}

fn plane_index(channel: Channel, polarity: Polarity) -> usize {
    (channel.bit() * 2 + polarity.bit()) as usize
}
