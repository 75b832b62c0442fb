//! # Resource Budgets
//!
//! Counted reservations for fixed-capacity resources (sync points, pending
//! events, handle slots). A [`BudgetReservation`] releases its slot on drop,
//! so every exit path of a multi-step acquisition chain returns exactly the
//! slots it actually took.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::error::{Error, Result};

// =============================================================================
// BUDGET
// =============================================================================

/// A counted capacity for one kind of resource
#[derive(Debug)]
pub struct Budget {
    /// Budget name for debugging
    name: &'static str,
    /// Maximum concurrent reservations
    capacity: usize,
    /// Currently reserved slots
    used: AtomicUsize,
    /// High water mark
    peak: AtomicUsize,
    /// Total reservations ever granted
    total: AtomicU64,
}

impl Budget {
    /// Create a budget with the given capacity
    pub fn new(name: &'static str, capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            name,
            capacity,
            used: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            total: AtomicU64::new(0),
        })
    }

    /// Create a budget with no practical limit
    pub fn unlimited(name: &'static str) -> Arc<Self> {
        Self::new(name, usize::MAX)
    }

    /// Reserve one slot, failing with [`Error::ResourceExhausted`] at capacity
    pub fn reserve(self: &Arc<Self>) -> Result<BudgetReservation> {
        let cap = self.capacity;
        let prev = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                if used < cap { Some(used + 1) } else { None }
            })
            .map_err(|_| Error::ResourceExhausted)?;

        self.peak.fetch_max(prev + 1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);

        Ok(BudgetReservation {
            owner: Arc::clone(self),
        })
    }

    /// Budget name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Maximum concurrent reservations
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Currently reserved slots
    pub fn in_use(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    /// High water mark of concurrent reservations
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    /// Total reservations ever granted
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

// =============================================================================
// RESERVATION
// =============================================================================

/// A held slot in a [`Budget`], released on drop
#[derive(Debug)]
pub struct BudgetReservation {
    owner: Arc<Budget>,
}

impl BudgetReservation {
    /// The budget this reservation was taken from
    pub fn budget(&self) -> &Budget {
        &self.owner
    }
}

impl Drop for BudgetReservation {
    fn drop(&mut self) {
        self.owner.used.fetch_sub(1, Ordering::AcqRel);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_and_release() {
        let budget = Budget::new("points", 2);
        let a = budget.reserve().unwrap();
        let b = budget.reserve().unwrap();
        assert_eq!(budget.in_use(), 2);
        assert_eq!(budget.reserve().unwrap_err(), Error::ResourceExhausted);

        drop(a);
        assert_eq!(budget.in_use(), 1);
        let _c = budget.reserve().unwrap();
        assert_eq!(budget.in_use(), 2);
        drop(b);
        assert_eq!(budget.in_use(), 1);
    }

    #[test]
    fn test_stats() {
        let budget = Budget::new("events", 8);
        {
            let _r1 = budget.reserve().unwrap();
            let _r2 = budget.reserve().unwrap();
            assert_eq!(budget.peak(), 2);
        }
        let _r3 = budget.reserve().unwrap();
        assert_eq!(budget.peak(), 2);
        assert_eq!(budget.total(), 3);
        assert_eq!(budget.name(), "events");
    }

    #[test]
    fn test_zero_capacity() {
        let budget = Budget::new("none", 0);
        assert_eq!(budget.reserve().unwrap_err(), Error::ResourceExhausted);
        assert_eq!(budget.in_use(), 0);
    }
}
