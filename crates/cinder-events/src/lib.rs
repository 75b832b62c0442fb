//! # Cinder Events
//!
//! The device-side completion notification facility: callers register
//! interest in a timestamp on a context, and the device retires timestamps
//! as work completes, firing each registered callback exactly once, in
//! wrapped timestamp order.
//!
//! ## Dispatch Flow
//!
//! 1. A caller reserves an [`EventSlot`](registry::EventSlot) against the
//!    registry's capacity
//! 2. The slot, a context, a timestamp, and a one-shot callback are
//!    registered together
//! 3. The device calls [`EventRegistry::retire`](registry::EventRegistry::retire)
//!    when work completes; every due callback fires once and its slot is
//!    released
//! 4. Context teardown cancels that context's pending registrations

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod registry;

// Re-exports
pub use registry::{EventCallback, EventRegistry, EventSlot};
