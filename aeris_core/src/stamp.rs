//! Wrap-aware timestamp arithmetic and the per-stream unwrapper.
//!
//! Hardware counters roll over at [`MAX_STAMP`]; everything downstream
//! (sorting, windowing, filters) compares stamps through [`wrap_delta`] /
//! [`wrap_cmp`] instead of raw `<`. The heuristic assumes at most one
//! rollover between any two compared samples — burstier wrap patterns are
//! out of contract and produce a well-defined but wrong ordering.

use std::cmp::Ordering;

use aeris_types::{Stamp, HALF_STAMP, MAX_STAMP};

/// Signed circular distance from `from` to `to`, in `[-HALF_STAMP, HALF_STAMP]`.
///
/// Positive means `to` is logically later. Two stamps more than
/// `HALF_STAMP` apart are assumed to straddle exactly one counter
/// rollover, so the numerically smaller one is treated as post-wrap.
pub fn wrap_delta(from: Stamp, to: Stamp) -> i64 {
    let mut d = to.raw() as i64 - from.raw() as i64;
    if d > HALF_STAMP as i64 {
        d -= MAX_STAMP as i64;
    } else if d < -(HALF_STAMP as i64) {
        d += MAX_STAMP as i64;
    }
    d
}

/// Wrap-aware stamp comparator.
///
/// At a circular distance of exactly `HALF_STAMP` the wrap direction is
/// ambiguous; the comparator falls back to straight numeric order there so
/// that it stays a total order usable by a stable sort.
pub fn wrap_cmp(a: Stamp, b: Stamp) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let d = wrap_delta(a, b);
    if d.unsigned_abs() == HALF_STAMP as u64 {
        a.raw().cmp(&b.raw())
    } else if d > 0 {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Converts a wrapping counter into a monotonically non-decreasing 64-bit
/// time value by counting rollovers.
///
/// Stateful per source stream: one unwrapper must never be shared across
/// two independent event streams, or each stream's rollovers corrupt the
/// other's wrap count. Batch-internal stamps must arrive in
/// non-decreasing order — an out-of-order stamp is indistinguishable from
/// a rollover and inflates the count.
#[derive(Debug, Clone, Default)]
pub struct StampUnwrapper {
    last_stamp: u32,
    n_wraps: u64,
}

impl StampUnwrapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unwrap the next stamp of the stream.
    pub fn unwrap(&mut self, stamp: Stamp) -> u64 {
        let raw = stamp.raw();
        if raw < self.last_stamp {
            self.n_wraps += 1;
        }
        self.last_stamp = raw;
        raw as u64 + MAX_STAMP as u64 * self.n_wraps
    }

    /// Number of rollovers observed so far.
    pub fn n_wraps(&self) -> u64 {
        self.n_wraps
    }

    /// Forget all history, e.g. when the source device restarts.
    pub fn reset(&mut self) {
        self.last_stamp = 0;
        self.n_wraps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(raw: u32) -> Stamp {
        Stamp::new(raw)
    }

    #[test]
    fn delta_without_wrap() {
        assert_eq!(wrap_delta(s(100), s(150)), 50);
        assert_eq!(wrap_delta(s(150), s(100)), -50);
        assert_eq!(wrap_delta(s(7), s(7)), 0);
    }

    #[test]
    fn delta_across_wrap() {
        // 10 ticks before rollover -> 5 ticks after: 15 ticks forward
        assert_eq!(wrap_delta(s(MAX_STAMP - 10), s(5)), 15);
        assert_eq!(wrap_delta(s(5), s(MAX_STAMP - 10)), -15);
    }

    #[test]
    fn wrap_aware_orders_prewrap_before_postwrap() {
        let a = s(MAX_STAMP - 10);
        let b = s(5);
        assert_eq!(wrap_cmp(a, b), Ordering::Less);
        assert_eq!(wrap_cmp(b, a), Ordering::Greater);
        // Straight ordering disagrees
        assert!(b < a);
    }

    #[test]
    fn half_range_tie_orders_straight_and_stays_antisymmetric() {
        let a = s(0);
        let b = s(HALF_STAMP);
        assert_eq!(wrap_cmp(a, b), Ordering::Less);
        assert_eq!(wrap_cmp(b, a), Ordering::Greater);
    }

    #[test]
    fn unwrapper_is_monotonic_across_rollover() {
        let mut unwrapper = StampUnwrapper::new();
        let inputs = [MAX_STAMP - 5, MAX_STAMP - 1, 2, 3];
        let expected = [
            (MAX_STAMP - 5) as u64,
            (MAX_STAMP - 1) as u64,
            MAX_STAMP as u64 + 2,
            MAX_STAMP as u64 + 3,
        ];
        for (raw, want) in inputs.iter().zip(expected) {
            assert_eq!(unwrapper.unwrap(s(*raw)), want);
        }
        assert_eq!(unwrapper.n_wraps(), 1);
    }

    #[test]
    fn unwrapper_counts_every_rollover() {
        let mut unwrapper = StampUnwrapper::new();
        unwrapper.unwrap(s(MAX_STAMP - 1));
        unwrapper.unwrap(s(1));
        unwrapper.unwrap(s(MAX_STAMP - 1));
        unwrapper.unwrap(s(1));
        assert_eq!(unwrapper.n_wraps(), 2);
        assert_eq!(unwrapper.unwrap(s(2)), 2 * MAX_STAMP as u64 + 2);
    }

    #[test]
    fn unwrapper_reset_forgets_history() {
        let mut unwrapper = StampUnwrapper::new();
        unwrapper.unwrap(s(MAX_STAMP - 1));
        unwrapper.unwrap(s(3));
        unwrapper.reset();
        assert_eq!(unwrapper.unwrap(s(10)), 10);
        assert_eq!(unwrapper.n_wraps(), 0);
    }
}
