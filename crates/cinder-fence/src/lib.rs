//! # Cinder Fence Engine
//!
//! The consumer-facing synchronization engine: per-context stream timelines,
//! completion event bridging, and the end-to-end fence creation path.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                       Fence Creation Path                         │
//! │                                                                   │
//! │  create_fence(ctx, ts)                                            │
//! │        │                                                          │
//! │        ▼                                                          │
//! │  ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌──────────────┐   │
//! │  │  Event   │──▶│   Sync    │──▶│  Fence   │──▶│ Handle Table │   │
//! │  │  Slot +  │   │   Point   │   │ (owns pt)│   │ (fd install) │   │
//! │  │ Payload  │   └───────────┘   └──────────┘   └──────┬───────┘   │
//! │  └────┬─────┘                                         │           │
//! │       │              ┌────────────────┐               ▼           │
//! │       └─────────────▶│ Event Registry │          fd returned      │
//! │         register     └───────┬────────┘                           │
//! │                              │ retire(ts)                         │
//! │                              ▼                                    │
//! │                   bridge: timeline.advance(ts) → fences signal    │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every step of the creation chain can fail; each failure path releases
//! exactly the resources acquired so far, in reverse order, through Rust
//! ownership rather than manual cleanup labels.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bridge;
pub mod context;
pub mod device;
pub mod handles;
pub mod stream;

// Re-exports
pub use context::Context;
pub use device::{Device, DeviceConfig};
pub use handles::{EngineFence, FenceHandleTable, SlotHandleTable};
pub use stream::StreamTimeline;

// The engine's consumer surface deals in these core types.
pub use cinder_core::{ContextId, Error, FenceFd, Result, Timestamp};
