//! # Sync Point
//!
//! A single-target watcher on a timeline. Immutable after creation; its
//! signaled state is re-derived from the timeline on every query, never
//! cached, so it can only move from unsignaled to signaled.

use alloc::sync::{Arc, Weak};
use core::cmp::Ordering;

use cinder_core::{BudgetReservation, Error, Result};

use crate::ops::TimelineOps;
use crate::timeline::SyncTimeline;

// =============================================================================
// SYNC POINT
// =============================================================================

/// A `(timeline, target)` pair with a derived signaled predicate.
///
/// Ownership: a point lives on its own until attached to a
/// [`SyncFence`](crate::SyncFence), at which moment it moves into the fence.
/// Dropping an unattached point releases its budget slot; an attached point
/// is released when its fence is.
pub struct SyncPoint<O: TimelineOps> {
    /// Weak back-reference: a point never extends its timeline's lifetime
    timeline: Weak<SyncTimeline<O>>,
    /// The watched target
    payload: O::Point,
    /// Slot in the timeline's point budget
    _slot: BudgetReservation,
}

impl<O: TimelineOps> SyncPoint<O> {
    pub(crate) fn new(
        timeline: Weak<SyncTimeline<O>>,
        payload: O::Point,
        slot: BudgetReservation,
    ) -> Self {
        Self {
            timeline,
            payload,
            _slot: slot,
        }
    }

    /// Whether the watched target has been reached.
    ///
    /// Returns false once the timeline has been torn down; teardown ordering
    /// is the context owner's responsibility.
    pub fn has_signaled(&self) -> bool {
        match self.timeline.upgrade() {
            Some(timeline) => timeline.ops().has_signaled(&self.payload),
            None => false,
        }
    }

    /// Duplicate the watch relationship.
    ///
    /// Produces a fresh point on the same timeline with the same target,
    /// taking its own budget slot. Used by fence merging; duplication copies
    /// no side effects.
    pub fn duplicate(&self) -> Result<Self> {
        let timeline = self.timeline.upgrade().ok_or(Error::TimelineDestroyed)?;
        timeline.create_point(self.payload.clone())
    }

    /// Order two points by their targets via the driver comparator
    pub fn compare(&self, other: &Self) -> Ordering {
        O::compare(&self.payload, &other.payload)
    }

    /// The watched target payload
    pub fn payload(&self) -> &O::Point {
        &self.payload
    }

    /// Upgrade the back-reference to the owning timeline, if still alive
    pub fn timeline(&self) -> Option<Arc<SyncTimeline<O>>> {
        self.timeline.upgrade()
    }

    /// Whether two points watch the same timeline
    pub fn same_timeline(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.timeline, &other.timeline)
    }
}

// =============================================================================
// TESTS
// =============================================================================
