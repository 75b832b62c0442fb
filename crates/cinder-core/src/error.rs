//! # Cinder Error Handling
//!
//! Unified error types for the synchronization engine.
//!
//! Error handling in Cinder follows these principles:
//! - Errors are typed and categorized
//! - No panics in production code paths
//! - All failures are surfaced synchronously as result values
//! - Errors are `no_std` compatible

use core::fmt;

// =============================================================================
// RESULT TYPE
// =============================================================================

/// Cinder Result type alias
pub type Result<T> = core::result::Result<T, Error>;

// =============================================================================
// ERROR ENUM
// =============================================================================

/// Cinder unified error type
///
/// One failed operation never perturbs timelines, other fences, or in-flight
/// event registrations; none of these conditions is fatal to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An allocation step failed - payload, point, fence, or handle slot
    ResourceExhausted,
    /// Malformed request or misused interface
    InvalidParameter,
    /// Unknown context id
    ContextNotFound,
    /// Failure while publishing an already-installed handle to the consumer
    TransferFault,
    /// The owning timeline was torn down before the operation could complete
    TimelineDestroyed,
    /// The device is shutting down and no longer accepts registrations
    ShuttingDown,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceExhausted => write!(f, "resource exhausted"),
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::ContextNotFound => write!(f, "context not found"),
            Self::TransferFault => write!(f, "handle transfer fault"),
            Self::TimelineDestroyed => write!(f, "timeline destroyed"),
            Self::ShuttingDown => write!(f, "device shutting down"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
