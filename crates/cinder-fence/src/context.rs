//! # Context
//!
//! A work-submission context and its timeline. The context owns the
//! timeline; sync points and fences only ever hold weak back-references,
//! so destroying the context is what ends the timeline's life.

use alloc::sync::Arc;

use cinder_core::{ContextId, Result, Timestamp};
use cinder_sync::{SyncPoint, SyncTimeline};

use crate::stream::StreamTimeline;

// =============================================================================
// CONTEXT
// =============================================================================

/// A command-stream context with its completion timeline
pub struct Context {
    id: ContextId,
    timeline: Arc<SyncTimeline<StreamTimeline>>,
}

impl Context {
    pub(crate) fn new(id: ContextId, point_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            id,
            timeline: SyncTimeline::with_point_capacity(StreamTimeline::new(), point_capacity),
        })
    }

    /// Context identifier
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The context's timeline
    pub fn timeline(&self) -> &Arc<SyncTimeline<StreamTimeline>> {
        &self.timeline
    }

    /// Last completed timestamp on this context
    pub fn last_completed(&self) -> Timestamp {
        self.timeline.ops().current()
    }

    /// Create a sync point watching `target` on this context's timeline
    pub fn create_point(&self, target: Timestamp) -> Result<SyncPoint<StreamTimeline>> {
        self.timeline.create_point(target)
    }

    /// Advance the timeline to `timestamp` and notify all attached fences.
    ///
    /// Precondition: the device's completion sequencing calls this in
    /// non-decreasing wrapped order per context.
    pub fn advance(&self, timestamp: Timestamp) {
        self.timeline.ops().advance(timestamp);
        self.timeline.signal();
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        log::debug!("destroying context {}", self.id.id());
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_sync::SyncFence;

    #[test]
    fn test_fresh_context_is_at_zero() {
        let context = Context::new(ContextId::new(1), 16);
        assert_eq!(context.last_completed(), Timestamp::ZERO);
    }

    #[test]
    fn test_advance_signals_fences() {
        let context = Context::new(ContextId::new(1), 16);
        let fence =
            SyncFence::new("ctx-fence", context.create_point(Timestamp::new(10)).unwrap())
                .unwrap();

        context.advance(Timestamp::new(9));
        assert!(!fence.is_complete());

        context.advance(Timestamp::new(10));
        assert!(fence.is_complete());
        assert_eq!(context.last_completed(), Timestamp::new(10));
    }
}
