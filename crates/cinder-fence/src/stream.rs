//! # Stream Timeline Policy
//!
//! The engine's [`TimelineOps`] implementation: a monotonically advancing
//! "last completed" counter in the wrapping timestamp space, with sync
//! points watching fixed target timestamps.

use core::cmp::Ordering;
use core::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use cinder_core::Timestamp;
use cinder_sync::TimelineOps;
use spin::Mutex;

// =============================================================================
// STREAM TIMELINE
// =============================================================================

/// Authoritative "last completed" counter for one command-stream context.
///
/// Reads are lock-free; writes are serialized by a spin lock so concurrent
/// advances apply as a sequence of whole updates. Callers must advance in
/// non-decreasing wrapped order - the device's completion sequencing
/// guarantees this. An out-of-order advance is a precondition violation: the
/// engine applies last-write-wins and logs a warning.
pub struct StreamTimeline {
    /// Latest completed timestamp, initialized to zero at context creation
    last_completed: AtomicU32,
    /// Serializes advances; never held across a broadcast
    advance_lock: Mutex<()>,
}

impl StreamTimeline {
    /// Create a fresh timeline at timestamp zero
    pub fn new() -> Self {
        Self {
            last_completed: AtomicU32::new(Timestamp::ZERO.raw()),
            advance_lock: Mutex::new(()),
        }
    }

    /// Non-blocking snapshot of the last completed timestamp
    #[inline]
    pub fn current(&self) -> Timestamp {
        Timestamp::new(self.last_completed.load(AtomicOrdering::Acquire))
    }

    /// Record that work up to `timestamp` has completed.
    ///
    /// Bounded critical section; the caller is responsible for broadcasting
    /// on the owning [`SyncTimeline`](cinder_sync::SyncTimeline) afterwards.
    pub fn advance(&self, timestamp: Timestamp) {
        let _guard = self.advance_lock.lock();
        let previous = self.current();
        if timestamp.wrapping_cmp(previous) < 0 {
            log::warn!(
                "timeline advanced to {} after {}: out-of-order completion",
                timestamp,
                previous
            );
        }
        self.last_completed
            .store(timestamp.raw(), AtomicOrdering::Release);
    }
}

impl TimelineOps for StreamTimeline {
    type Point = Timestamp;

    const DRIVER_NAME: &'static str = "cinder-timeline";

    fn has_signaled(&self, point: &Timestamp) -> bool {
        self.current().reaches(*point)
    }

    fn compare(a: &Timestamp, b: &Timestamp) -> Ordering {
        a.ordering(*b)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let timeline = StreamTimeline::new();
        assert_eq!(timeline.current(), Timestamp::ZERO);
        assert!(timeline.has_signaled(&Timestamp::ZERO));
        assert!(!timeline.has_signaled(&Timestamp::new(1)));
    }

    #[test]
    fn test_advance_is_monotonic_for_watchers() {
        let timeline = StreamTimeline::new();
        let target = Timestamp::new(10);

        timeline.advance(Timestamp::new(9));
        assert!(!timeline.has_signaled(&target));

        timeline.advance(target);
        assert!(timeline.has_signaled(&target));

        // Later advances only move forward in wrapped order; the point
        // stays signaled.
        timeline.advance(Timestamp::new(11));
        assert!(timeline.has_signaled(&target));
    }

    #[test]
    fn test_regressing_advance_is_last_write_wins() {
        // Out-of-order advance violates the caller precondition. The engine
        // does not reject it: the observed behavior is last-write-wins (plus
        // a warning), and watchers of the regressed range read unsignaled
        // again until the device catches back up.
        let timeline = StreamTimeline::new();
        timeline.advance(Timestamp::new(10));
        timeline.advance(Timestamp::new(5));
        assert_eq!(timeline.current(), Timestamp::new(5));
        assert!(!timeline.has_signaled(&Timestamp::new(10)));
    }

    #[test]
    fn test_signaled_across_wraparound() {
        let timeline = StreamTimeline::new();
        let target = Timestamp::new(2);

        timeline.advance(Timestamp::new(0xFFFF_FFF0));
        assert!(!timeline.has_signaled(&target));

        // The counter wraps past zero and reaches the target.
        timeline.advance(Timestamp::new(3));
        assert!(timeline.has_signaled(&target));
    }

    #[test]
    fn test_compare_uses_wrapped_order() {
        let early = Timestamp::new(0xFFFF_FFFE);
        let late = Timestamp::new(1);
        assert_eq!(StreamTimeline::compare(&early, &late), Ordering::Less);
        assert_eq!(StreamTimeline::compare(&late, &early), Ordering::Greater);
    }
}
