//! # Sync Timeline
//!
//! The per-context anchor of the signaling machinery. Owns the driver policy
//! payload, hands out sync points against a bounded budget, and broadcasts
//! re-evaluation to attached fences when the driver signals progress.

use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;

use cinder_core::{Budget, Result};
use spin::Mutex;

use crate::fence::FenceInner;
use crate::ops::TimelineOps;
use crate::point::SyncPoint;

// =============================================================================
// SYNC TIMELINE
// =============================================================================

/// A timeline embedding driver policy `O`.
///
/// Shared by every sync point that references it; points hold only weak
/// back-references and never extend the timeline's lifetime beyond its
/// owning context.
pub struct SyncTimeline<O: TimelineOps> {
    /// Driver policy payload
    ops: O,
    /// Fences attached to this timeline, pruned lazily
    active: Mutex<Vec<Weak<FenceInner<O>>>>,
    /// Budget for outstanding sync points
    points: Arc<Budget>,
}

impl<O: TimelineOps> SyncTimeline<O> {
    /// Create a timeline with no practical limit on outstanding points
    pub fn new(ops: O) -> Arc<Self> {
        Self::with_point_capacity(ops, usize::MAX)
    }

    /// Create a timeline allowing at most `capacity` outstanding points
    pub fn with_point_capacity(ops: O, capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            ops,
            active: Mutex::new(Vec::new()),
            points: Budget::new("sync-points", capacity),
        })
    }

    /// Driver name for this timeline
    pub fn driver_name(&self) -> &'static str {
        O::DRIVER_NAME
    }

    /// Access the driver policy payload
    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Create a sync point watching `payload` on this timeline.
    ///
    /// Fails with `ResourceExhausted` once the point budget is spent.
    pub fn create_point(self: &Arc<Self>, payload: O::Point) -> Result<SyncPoint<O>> {
        let slot = self.points.reserve()?;
        Ok(SyncPoint::new(Arc::downgrade(self), payload, slot))
    }

    /// Broadcast a progress notification.
    ///
    /// Every attached fence re-derives its completion state; fences that
    /// transition to complete fire their waiters exactly once. Waiter
    /// callbacks run outside the timeline lock.
    pub fn signal(&self) {
        let fences: Vec<Arc<FenceInner<O>>> = {
            let mut active = self.active.lock();
            active.retain(|w| w.strong_count() > 0);
            active.iter().filter_map(Weak::upgrade).collect()
        };

        for fence in fences {
            fence.poll();
        }
    }

    /// Number of fences currently attached
    pub fn active_fences(&self) -> usize {
        let mut active = self.active.lock();
        active.retain(|w| w.strong_count() > 0);
        active.len()
    }

    /// Number of outstanding sync points
    pub fn outstanding_points(&self) -> usize {
        self.points.in_use()
    }

    /// Attach a fence so it is re-evaluated on every signal
    pub(crate) fn attach(&self, fence: Weak<FenceInner<O>>) {
        self.active.lock().push(fence);
    }
}

impl<O: TimelineOps> Drop for SyncTimeline<O> {
    fn drop(&mut self) {
        log::debug!("destroying {} timeline", O::DRIVER_NAME);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_ops::TestOps;
    use crate::SyncFence;

    #[test]
    fn test_point_budget_enforced() {
        let timeline = SyncTimeline::with_point_capacity(TestOps::new(), 2);
        let a = timeline.create_point(1).unwrap();
        let _b = timeline.create_point(2).unwrap();
        assert_eq!(timeline.outstanding_points(), 2);
        assert!(timeline.create_point(3).is_err());

        drop(a);
        assert_eq!(timeline.outstanding_points(), 1);
        let _c = timeline.create_point(3).unwrap();
    }

    #[test]
    fn test_signal_reaches_attached_fences() {
        let timeline = SyncTimeline::new(TestOps::new());
        let point = timeline.create_point(5).unwrap();
        let fence = SyncFence::new("test", point).unwrap();
        assert!(!fence.is_complete());

        timeline.ops().set(5);
        timeline.signal();
        assert!(fence.is_complete());
    }

    #[test]
    fn test_dropped_fences_are_pruned() {
        let timeline = SyncTimeline::new(TestOps::new());
        let fence = SyncFence::new("gone", timeline.create_point(1).unwrap()).unwrap();
        assert_eq!(timeline.active_fences(), 1);
        drop(fence);
        assert_eq!(timeline.active_fences(), 0);
        assert_eq!(timeline.outstanding_points(), 0);
    }
}
