//! # Cinder Core
//!
//! Foundational types for the Cinder synchronization engine.
//!
//! This crate holds everything the rest of the stack agrees on:
//!
//! - [`Timestamp`] and its wraparound-safe comparator - the single ordering
//!   primitive every other component routes through
//! - [`Handle`] - type-safe opaque identifiers for contexts and fence handles
//! - [`Error`] / [`Result`] - the unified error surface
//! - [`Budget`] - counted resource reservations with RAII release
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      cinder-core                            │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Types     │  │   Error     │  │      Budget         │  │
//! │  │ (Timestamp, │  │  Handling   │  │  (reservations)     │  │
//! │  │  Handle)    │  │             │  │                     │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// =============================================================================
// MODULE EXPORTS
// =============================================================================

pub mod budget;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use budget::{Budget, BudgetReservation};
pub use error::{Error, Result};
pub use types::*;
