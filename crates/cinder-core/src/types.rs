//! # Cinder Core Types
//!
//! Fundamental type definitions used across the synchronization engine.
//!
//! These types provide:
//! - Wraparound-safe ordering of completion timestamps
//! - Strong typing for opaque identifiers (contexts vs fence handles)

use core::fmt;
use core::hash::{Hash, Hasher};

// =============================================================================
// TIMESTAMP
// =============================================================================

/// A completion timestamp drawn from a 32-bit wrapping counter space.
///
/// Timestamps form a total order only within a window of half the counter
/// space (2^31): the device guarantees that the true separation between any
/// two timestamps of interest never exceeds that window. All ordering
/// decisions must route through [`Timestamp::wrapping_cmp`]; `Timestamp`
/// deliberately does not implement `Ord`, because native unsigned comparison
/// is wrong across a wrap boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Timestamp(u32);

static_assertions::assert_eq_size!(Timestamp, u32);

impl Timestamp {
    /// The initial timestamp of a fresh timeline
    pub const ZERO: Self = Self(0);

    /// Create a timestamp from its raw counter value
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw counter value
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Wraparound-safe comparison.
    ///
    /// Returns a negative value if `self` is before `other`, zero if equal,
    /// positive if after - correct across numeric wraparound as long as the
    /// true separation is at most half the counter space. Implemented as
    /// wrapping subtraction reinterpreted as a signed quantity; the sign of
    /// that reinterpretation is the answer.
    #[inline]
    pub const fn wrapping_cmp(self, other: Self) -> i32 {
        self.0.wrapping_sub(other.0) as i32
    }

    /// Whether this timestamp has reached or passed `target`.
    #[inline]
    pub const fn reaches(self, target: Self) -> bool {
        self.wrapping_cmp(target) >= 0
    }

    /// Wraparound-safe ordering, derived from [`Self::wrapping_cmp`].
    #[inline]
    pub fn ordering(self, other: Self) -> core::cmp::Ordering {
        self.wrapping_cmp(other).cmp(&0)
    }

    /// Advance by `delta` counter units, wrapping on overflow
    #[inline]
    pub const fn wrapping_add(self, delta: u32) -> Self {
        Self(self.0.wrapping_add(delta))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// HANDLE TYPES
// =============================================================================

/// Opaque handle to an engine resource
///
/// Handles are type-safe wrappers that prevent mixing different resource
/// kinds (a context id is never a fence handle). The trait impls are written
/// by hand so that `Handle<T>` is `Copy`/`Ord` regardless of the marker type.
#[repr(transparent)]
pub struct Handle<T> {
    id: u32,
    _marker: core::marker::PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Create a new handle
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self {
            id,
            _marker: core::marker::PhantomData,
        }
    }

    /// Create a null handle
    #[inline]
    pub const fn null() -> Self {
        Self::new(0)
    }

    /// Get the raw id
    #[inline]
    pub const fn id(self) -> u32 {
        self.id
    }

    /// Check if null
    #[inline]
    pub const fn is_null(self) -> bool {
        self.id == 0
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", core::any::type_name::<T>(), self.id)
    }
}

// Marker types for handles
/// Marker for context identifiers
pub struct ContextMarker;
/// Marker for consumer-visible fence handles
pub struct FenceMarker;

/// Identifier of a work-submission context
pub type ContextId = Handle<ContextMarker>;
/// Consumer-visible handle to an installed fence
pub type FenceFd = Handle<FenceMarker>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapping_cmp_plain() {
        let a = Timestamp::new(10);
        let b = Timestamp::new(20);
        assert!(a.wrapping_cmp(b) < 0);
        assert!(b.wrapping_cmp(a) > 0);
        assert_eq!(a.wrapping_cmp(a), 0);
    }

    #[test]
    fn test_wrapping_cmp_across_wrap() {
        // 5 came after 0xFFFF_FFF0: the counter wrapped in between.
        let late = Timestamp::new(5);
        let early = Timestamp::new(0xFFFF_FFF0);
        assert!(late.wrapping_cmp(early) > 0);
        assert!(early.wrapping_cmp(late) < 0);
        assert!(late.reaches(early));
        assert!(!early.reaches(late));
    }

    #[test]
    fn test_wrapping_cmp_window() {
        // Ordering holds for any separation strictly inside half the space.
        let base = Timestamp::new(u32::MAX - 100);
        let ahead = base.wrapping_add(0x7FFF_FFFF);
        assert!(ahead.wrapping_cmp(base) > 0);

        let just_behind = base.wrapping_add(1);
        assert!(just_behind.wrapping_cmp(base) > 0);
        assert!(base.wrapping_cmp(just_behind) < 0);
    }

    #[test]
    fn test_reaches_is_reflexive() {
        let t = Timestamp::new(0xDEAD_BEEF);
        assert!(t.reaches(t));
    }

    #[test]
    fn test_ordering_agrees_with_cmp() {
        use core::cmp::Ordering;
        let a = Timestamp::new(3);
        let b = Timestamp::new(0xFFFF_FFFE);
        assert_eq!(a.ordering(b), Ordering::Greater);
        assert_eq!(b.ordering(a), Ordering::Less);
        assert_eq!(a.ordering(a), Ordering::Equal);
    }

    #[test]
    fn test_handle_identity() {
        let a = ContextId::new(7);
        let b = ContextId::new(7);
        let c = ContextId::new(8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
        assert!(ContextId::null().is_null());
        assert!(!a.is_null());
    }
}
