//! # Completion Event Bridge
//!
//! Adapts "the device finished timestamp T" into "advance this context's
//! timeline". The private payload holds the only strong reference the
//! bridge needs; it moves into the registered callback and is consumed by
//! the single invocation, so it is freed exactly once.

use alloc::boxed::Box;
use alloc::sync::Arc;

use cinder_core::{Result, Timestamp};
use cinder_events::{EventRegistry, EventSlot};

use crate::context::Context;

// =============================================================================
// BRIDGE PAYLOAD
// =============================================================================

/// Private per-registration state: the context whose timeline to advance
pub struct FenceEventPayload {
    context: Arc<Context>,
}

impl FenceEventPayload {
    /// Capture the context a registration will advance
    pub fn new(context: Arc<Context>) -> Box<Self> {
        Box::new(Self { context })
    }
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Register the bridge callback for `timestamp` on the payload's context.
///
/// On success, ownership of `payload` passes to the registration; the
/// callback advances the timeline, broadcasts to attached fences, and drops
/// the payload. On failure the payload and slot are released here, leaving
/// nothing registered.
pub fn register_fence_event(
    events: &EventRegistry,
    slot: EventSlot,
    payload: Box<FenceEventPayload>,
    timestamp: Timestamp,
) -> Result<()> {
    let context_id = payload.context.id();
    events.register(
        slot,
        context_id,
        timestamp,
        Box::new(move |completed| {
            payload.context.advance(completed);
        }),
    )
}

// =============================================================================
// TESTS
// =============================================================================
