//! # Timeline Policy Trait
//!
//! The plug-in point where a driver supplies its completion semantics to the
//! generic substrate.

use core::cmp::Ordering;

// =============================================================================
// TIMELINE OPS
// =============================================================================

/// Driver policy embedded in a [`SyncTimeline`](crate::SyncTimeline).
///
/// The substrate allocates the timeline already typed for the driver payload,
/// so no downcasting from a generic base record is ever needed. The payload
/// attached to each sync point is `Self::Point`; duplication of a point is
/// `Clone` on that payload and must copy only the watch relationship, never
/// side effects.
pub trait TimelineOps: Send + Sync + 'static {
    /// Per-point payload (the target a point watches)
    type Point: Clone + Send + Sync + 'static;

    /// Driver name reported in debug output
    const DRIVER_NAME: &'static str;

    /// Whether `point` has been reached on this timeline.
    ///
    /// Must be monotonic: once true for a given point it stays true for
    /// every later state of the timeline.
    fn has_signaled(&self, point: &Self::Point) -> bool;

    /// Order two point payloads.
    ///
    /// Used when merging fences to collapse points on the same timeline;
    /// must be consistent with [`Self::has_signaled`] (a `Greater` point is
    /// reached no earlier than a `Less` one).
    fn compare(a: &Self::Point, b: &Self::Point) -> Ordering;
}
