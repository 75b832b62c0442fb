//! # Sync Fence
//!
//! Consumer-facing aggregate of one or more sync points. A fence completes
//! when every constituent point has signaled; completion is derived from the
//! points, with a one-way latch used only to guarantee that waiters are
//! notified at most once.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;

use cinder_core::{Error, Result};
use spin::Mutex;

use crate::ops::TimelineOps;
use crate::point::SyncPoint;

// =============================================================================
// FENCE INTERNALS
// =============================================================================

/// Waiter callback, invoked exactly once when the fence completes
type Waiter = Box<dyn FnOnce() + Send>;

struct WaitState {
    /// One-way latch; set on the first observed completion
    signaled: bool,
    /// Pending waiters, drained on the signaled transition
    waiters: Vec<Waiter>,
}

/// Shared fence state; timelines hold weak references to it
pub(crate) struct FenceInner<O: TimelineOps> {
    name: String,
    /// Points owned by this fence; never destroyed individually
    points: Vec<SyncPoint<O>>,
    state: Mutex<WaitState>,
}

impl<O: TimelineOps> FenceInner<O> {
    /// Re-derive completion; on the unsignaled-to-signaled transition fire
    /// all pending waiters outside the lock. Returns the completion state.
    pub(crate) fn poll(&self) -> bool {
        if self.state.lock().signaled {
            return true;
        }

        if !self.points.iter().all(SyncPoint::has_signaled) {
            return false;
        }

        let waiters = {
            let mut state = self.state.lock();
            if state.signaled {
                Vec::new()
            } else {
                state.signaled = true;
                core::mem::take(&mut state.waiters)
            }
        };

        for waiter in waiters {
            waiter();
        }
        true
    }
}

impl<O: TimelineOps> Drop for FenceInner<O> {
    fn drop(&mut self) {
        log::debug!("releasing fence '{}'", self.name);
    }
}

// =============================================================================
// SYNC FENCE
// =============================================================================

/// A waitable aggregate of sync points.
///
/// Cloning shares the underlying fence; the engine and the consumer each
/// hold a reference and the fence lives as long as the longest holder.
/// Releasing a handle is orthogonal to signaling: a fence may be dropped
/// before or after it completes.
pub struct SyncFence<O: TimelineOps> {
    inner: Arc<FenceInner<O>>,
}

impl<O: TimelineOps> core::fmt::Debug for SyncFence<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyncFence")
            .field("name", &self.inner.name)
            .field("points", &self.inner.points.len())
            .finish()
    }
}

impl<O: TimelineOps> Clone for SyncFence<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: TimelineOps> SyncFence<O> {
    /// Wrap a single sync point into a fence, transferring ownership of the
    /// point. Fails if the point's timeline has already been torn down, in
    /// which case the still-unattached point is released.
    pub fn new(name: &str, point: SyncPoint<O>) -> Result<Self> {
        if point.timeline().is_none() {
            return Err(Error::TimelineDestroyed);
        }
        Self::from_points(name, alloc::vec![point])
    }

    /// Merge two fences into one that completes when both would.
    ///
    /// Points are duplicated (watch relationship only); points on the same
    /// timeline collapse to the later target, so the merged fence holds at
    /// most one point per timeline.
    pub fn merge(name: &str, a: &Self, b: &Self) -> Result<Self> {
        let mut points: Vec<SyncPoint<O>> = Vec::new();

        for src in a.inner.points.iter().chain(b.inner.points.iter()) {
            let dup = src.duplicate()?;
            match points.iter_mut().find(|p| p.same_timeline(&dup)) {
                Some(existing) => {
                    if dup.compare(existing) == Ordering::Greater {
                        *existing = dup;
                    }
                }
                None => points.push(dup),
            }
        }

        Self::from_points(name, points)
    }

    fn from_points(name: &str, points: Vec<SyncPoint<O>>) -> Result<Self> {
        let inner = Arc::new(FenceInner {
            name: String::from(name),
            points,
            state: Mutex::new(WaitState {
                signaled: false,
                waiters: Vec::new(),
            }),
        });

        for point in &inner.points {
            let timeline = point.timeline().ok_or(Error::TimelineDestroyed)?;
            timeline.attach(Arc::downgrade(&inner));
        }

        let fence = Self { inner };
        // Targets may already be due at creation time.
        fence.inner.poll();
        Ok(fence)
    }

    /// Debug name of the fence
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Number of constituent points
    pub fn point_count(&self) -> usize {
        self.inner.points.len()
    }

    /// Whether every constituent point has signaled
    pub fn is_complete(&self) -> bool {
        self.inner.poll()
    }

    /// Run `callback` exactly once when the fence completes.
    ///
    /// If the fence is already complete the callback runs immediately on the
    /// calling thread; otherwise it runs on the thread that signals the last
    /// outstanding timeline.
    pub fn on_signal<F: FnOnce() + Send + 'static>(&self, callback: F) {
        if self.inner.poll() {
            callback();
            return;
        }

        let mut state = self.inner.state.lock();
        if state.signaled {
            drop(state);
            callback();
        } else {
            state.waiters.push(Box::new(callback));
        }
    }

    /// Spin until the fence completes.
    ///
    /// Convenience for tests and bring-up; production consumers wait on the
    /// installed handle through their own blocking primitive.
    pub fn wait(&self) {
        while !self.is_complete() {
            core::hint::spin_loop();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
