//! # Fence Handle Table
//!
//! The interface through which a fence is exposed to a consumer as an opaque
//! handle id, plus the default slot-map implementation. Releasing a handle
//! also drops the table's reference to the fence it wraps.

use core::sync::atomic::{AtomicU32, Ordering};

use cinder_core::{Error, FenceFd, Result};
use cinder_sync::SyncFence;
use hashbrown::HashMap;
use spin::Mutex;

use crate::stream::StreamTimeline;

// =============================================================================
// TABLE INTERFACE
// =============================================================================

/// A fence aggregated over the engine's stream timelines
pub type EngineFence = SyncFence<StreamTimeline>;

/// Handle table the engine installs fences into.
///
/// Allocation and installation are separate steps so a failure between them
/// can release just the id; publishing models the copy of the id into the
/// consumer's address space, which can fault after installation succeeded.
pub trait FenceHandleTable: Send + Sync {
    /// Reserve an unused handle id
    fn allocate(&self) -> Result<FenceFd>;

    /// Install `fence` into a previously allocated id
    fn install(&self, fd: FenceFd, fence: EngineFence) -> Result<()>;

    /// Make the id visible to the consumer
    fn publish(&self, fd: FenceFd) -> Result<()>;

    /// Release an id, dropping any fence installed in it
    fn release(&self, fd: FenceFd);

    /// Look up the fence installed in `fd`
    fn get(&self, fd: FenceFd) -> Option<EngineFence>;

    /// Number of ids currently allocated or installed
    fn occupied(&self) -> usize;
}

// =============================================================================
// SLOT TABLE
// =============================================================================

/// Default in-process handle table backed by a hash map.
///
/// Slots hold `None` between allocation and installation so a rolled-back
/// creation can release a bare id.
pub struct SlotHandleTable {
    slots: Mutex<HashMap<FenceFd, Option<EngineFence>>>,
    next: AtomicU32,
    capacity: usize,
}

impl SlotHandleTable {
    /// Create a table with at most `capacity` live handles
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            next: AtomicU32::new(1),
            capacity,
        }
    }
}

impl FenceHandleTable for SlotHandleTable {
    fn allocate(&self) -> Result<FenceFd> {
        let mut slots = self.slots.lock();
        if slots.len() >= self.capacity {
            return Err(Error::ResourceExhausted);
        }
        // The counter wraps over a long uptime; skip the null id and ids
        // still occupied by live slots.
        loop {
            let fd = FenceFd::new(self.next.fetch_add(1, Ordering::Relaxed));
            if !fd.is_null() && !slots.contains_key(&fd) {
                slots.insert(fd, None);
                return Ok(fd);
            }
        }
    }

    fn install(&self, fd: FenceFd, fence: EngineFence) -> Result<()> {
        match self.slots.lock().get_mut(&fd) {
            Some(slot) => {
                *slot = Some(fence);
                Ok(())
            }
            None => Err(Error::InvalidParameter),
        }
    }

    fn publish(&self, _fd: FenceFd) -> Result<()> {
        // In-process consumers see the id directly; nothing to copy.
        Ok(())
    }

    fn release(&self, fd: FenceFd) {
        self.slots.lock().remove(&fd);
    }

    fn get(&self, fd: FenceFd) -> Option<EngineFence> {
        self.slots.lock().get(&fd).and_then(Clone::clone)
    }

    fn occupied(&self) -> usize {
        self.slots.lock().len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
