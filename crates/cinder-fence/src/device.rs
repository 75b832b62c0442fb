//! # Device
//!
//! The engine's consumer surface: context management, the fence-creation
//! orchestrator, and the completion path that drives the event registry.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU32, Ordering};

use cinder_core::{ContextId, Error, FenceFd, Result, Timestamp};
use cinder_events::EventRegistry;
use cinder_sync::SyncFence;
use spin::Mutex;

use crate::bridge::{register_fence_event, FenceEventPayload};
use crate::context::Context;
use crate::handles::{FenceHandleTable, SlotHandleTable};

// =============================================================================
// DEVICE CONFIG
// =============================================================================

/// Capacity limits for one device
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Device name for debugging
    pub name: &'static str,
    /// Maximum concurrent pending completion events
    pub max_pending_events: usize,
    /// Maximum outstanding sync points per context
    pub point_capacity: usize,
    /// Maximum live consumer handles
    pub handle_capacity: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "cinder",
            max_pending_events: 1024,
            point_capacity: 1024,
            handle_capacity: 256,
        }
    }
}

// =============================================================================
// DEVICE
// =============================================================================

/// A command-stream device hosting contexts, fences, and completion events
pub struct Device {
    config: DeviceConfig,
    /// Live contexts by id
    contexts: Mutex<BTreeMap<ContextId, Arc<Context>>>,
    /// Next context id
    next_context: AtomicU32,
    /// Pending completion events
    events: EventRegistry,
    /// Consumer handle table
    handles: Box<dyn FenceHandleTable>,
}

impl Device {
    /// Create a device with the default in-process handle table
    pub fn new(config: DeviceConfig) -> Self {
        let table = SlotHandleTable::new(config.handle_capacity);
        Self::with_handle_table(config, Box::new(table))
    }

    /// Create a device installing fences into a caller-provided table
    pub fn with_handle_table(config: DeviceConfig, handles: Box<dyn FenceHandleTable>) -> Self {
        Self {
            events: EventRegistry::new(config.max_pending_events),
            contexts: Mutex::new(BTreeMap::new()),
            next_context: AtomicU32::new(1),
            config,
            handles,
        }
    }

    /// Device name
    pub fn name(&self) -> &'static str {
        self.config.name
    }

    /// Create a context with a fresh timeline at timestamp zero
    pub fn create_context(&self) -> Arc<Context> {
        let id = ContextId::new(self.next_context.fetch_add(1, Ordering::Relaxed));
        let context = Context::new(id, self.config.point_capacity);
        self.contexts.lock().insert(id, Arc::clone(&context));
        log::debug!("created context {} on {}", id.id(), self.config.name);
        context
    }

    /// Look up a live context
    pub fn context(&self, id: ContextId) -> Option<Arc<Context>> {
        self.contexts.lock().get(&id).cloned()
    }

    /// Destroy a context: cancel its pending events and drop its timeline.
    ///
    /// The owner must sequence this after the completion notifications it
    /// still expects; cancelled registrations never fire.
    pub fn destroy_context(&self, id: ContextId) -> Result<()> {
        let context = self
            .contexts
            .lock()
            .remove(&id)
            .ok_or(Error::ContextNotFound)?;
        self.events.cancel(id);
        drop(context);
        Ok(())
    }

    /// The event registry (for capacity introspection)
    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// The handle table the consumer resolves fence ids through
    pub fn handles(&self) -> &dyn FenceHandleTable {
        &*self.handles
    }

    /// Begin device teardown: no further event registrations are accepted
    pub fn shutdown(&self) {
        self.events.close();
    }

    // =========================================================================
    // COMPLETION PATH
    // =========================================================================

    /// Retire every completion event on `context` up to `timestamp`.
    ///
    /// Called from the device's completion notification path; each due
    /// registration fires once, advancing the context timeline through the
    /// bridge in wrapped timestamp order. Returns the number fired.
    pub fn retire(&self, context: ContextId, timestamp: Timestamp) -> Result<usize> {
        if self.context(context).is_none() {
            return Err(Error::ContextNotFound);
        }
        Ok(self.events.retire(context, timestamp))
    }

    // =========================================================================
    // FENCE CREATION
    // =========================================================================

    /// Create a fence that signals when `context` completes `timestamp`,
    /// installed in the handle table as a consumer-visible id.
    ///
    /// Five-step acquisition chain; a failure at any step releases exactly
    /// what earlier steps acquired, in reverse order:
    ///
    /// 1. reserve an event slot and allocate the bridge payload
    /// 2. create the sync point on the context timeline
    /// 3. wrap the point into a fence (the fence now owns the point)
    /// 4. allocate a handle id, install the fence, publish the id
    /// 5. register the bridge callback, handing it the payload
    pub fn create_fence(&self, context: ContextId, timestamp: Timestamp) -> Result<FenceFd> {
        let context = self.context(context).ok_or(Error::ContextNotFound)?;

        // Step 1: nothing to undo if this fails.
        let slot = self.events.reserve_slot()?;
        let payload = FenceEventPayload::new(Arc::clone(&context));

        // Step 2: on failure the slot and payload unwind by drop.
        let point = context.create_point(timestamp)?;

        // Step 3: an error here drops the still-unattached point; once this
        // succeeds the point belongs to the fence and is never destroyed
        // individually.
        let fence = SyncFence::new("cinder-fence", point)?;

        // Step 4: the id exists before the fence is reachable through it, so
        // each sub-failure releases through the table.
        let fd = self.handles.allocate()?;
        if let Err(err) = self.handles.install(fd, fence) {
            self.handles.release(fd);
            return Err(err);
        }
        if let Err(err) = self.handles.publish(fd) {
            self.handles.release(fd);
            return Err(err);
        }

        // Step 5: on failure the registry releases the slot and the payload;
        // the installed handle is rolled back as in step 4.
        if let Err(err) = register_fence_event(&self.events, slot, payload, timestamp) {
            self.handles.release(fd);
            return Err(err);
        }

        log::debug!(
            "fence installed as fd {} for context {} at {}",
            fd.id(),
            context.id().id(),
            timestamp
        );
        Ok(fd)
    }
}

// =============================================================================
// TESTS
// =============================================================================
