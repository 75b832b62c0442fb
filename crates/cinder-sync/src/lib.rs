//! # Cinder Sync Substrate
//!
//! Generic timeline / sync point / fence machinery, independent of any
//! particular device. A driver plugs its completion policy in through the
//! [`TimelineOps`] trait; the substrate handles fence aggregation, waiter
//! notification, and lifetime bookkeeping.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Signaling Pipeline                        │
//! │                                                               │
//! │  ┌──────────────┐     ┌──────────────┐     ┌──────────────┐   │
//! │  │ SyncTimeline │────▶│  SyncPoint   │────▶│  SyncFence   │   │
//! │  │ (per context)│     │ (one target) │     │ (aggregate)  │   │
//! │  └──────┬───────┘     └──────────────┘     └──────┬───────┘   │
//! │         │  signal()                               │           │
//! │         └────────── re-evaluate ──────────────────┘           │
//! │                                          waiters fire once    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Signaling Flow
//!
//! 1. A driver creates a [`SyncTimeline`] embedding its policy payload
//! 2. Consumers create [`SyncPoint`]s watching one target each
//! 3. Points are attached to a [`SyncFence`] (ownership transfers)
//! 4. The driver calls [`SyncTimeline::signal`] as work completes
//! 5. Each attached fence re-derives completion and fires its waiters once

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod fence;
pub mod ops;
pub mod point;
pub mod timeline;

#[cfg(test)]
pub(crate) mod test_ops;

// Re-exports
pub use fence::SyncFence;
pub use ops::TimelineOps;
pub use point::SyncPoint;
pub use timeline::SyncTimeline;
