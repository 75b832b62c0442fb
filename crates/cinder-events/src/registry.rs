//! # Event Registry
//!
//! Pending timestamp events keyed by context. Callbacks are `FnOnce`, so the
//! at-most-once invocation contract is structural: a fired or cancelled
//! event cannot be invoked again.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use cinder_core::{Budget, BudgetReservation, ContextId, Error, Result, Timestamp};
use spin::Mutex;

// =============================================================================
// EVENT TYPES
// =============================================================================

/// One-shot completion callback, invoked with the timestamp that became due
pub type EventCallback = Box<dyn FnOnce(Timestamp) + Send>;

/// A reserved slot in the registry's capacity.
///
/// Obtained before any other resource in a registration chain so that an
/// out-of-capacity condition aborts the chain with nothing to undo. Dropped
/// unregistered, it simply returns the slot.
pub struct EventSlot {
    _slot: BudgetReservation,
}

struct PendingEvent {
    timestamp: Timestamp,
    callback: EventCallback,
    /// Held until the event fires or is cancelled
    _slot: BudgetReservation,
}

// =============================================================================
// EVENT REGISTRY
// =============================================================================

/// Registry of pending completion events for one device
pub struct EventRegistry {
    /// Pending events per context
    pending: Mutex<BTreeMap<ContextId, Vec<PendingEvent>>>,
    /// Per-context dispatch locks, held across drain-and-fire so racing
    /// retirements for one context cannot reorder callback invocations
    dispatch: Mutex<BTreeMap<ContextId, Arc<Mutex<()>>>>,
    /// Capacity for concurrent registrations
    slots: Arc<Budget>,
    /// Set during device teardown; rejects new registrations
    closed: AtomicBool,
    /// Total callbacks fired
    fired: AtomicU64,
    /// Total registrations cancelled unfired
    cancelled: AtomicU64,
}

impl EventRegistry {
    /// Create a registry with at most `capacity` concurrent registrations
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(BTreeMap::new()),
            dispatch: Mutex::new(BTreeMap::new()),
            slots: Budget::new("pending-events", capacity),
            closed: AtomicBool::new(false),
            fired: AtomicU64::new(0),
            cancelled: AtomicU64::new(0),
        }
    }

    /// Reserve capacity for one registration.
    ///
    /// Fails with `ResourceExhausted` when the registry is full.
    pub fn reserve_slot(&self) -> Result<EventSlot> {
        Ok(EventSlot {
            _slot: self.slots.reserve()?,
        })
    }

    /// Register `callback` to fire when `timestamp` completes on `context`.
    ///
    /// Fails with `ShuttingDown` once the registry is closed; the slot (and
    /// anything owned by the callback) is released on failure.
    pub fn register(
        &self,
        slot: EventSlot,
        context: ContextId,
        timestamp: Timestamp,
        callback: EventCallback,
    ) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::ShuttingDown);
        }

        self.pending
            .lock()
            .entry(context)
            .or_default()
            .push(PendingEvent {
                timestamp,
                callback,
                _slot: slot._slot,
            });
        Ok(())
    }

    /// Retire every event on `context` whose timestamp `up_to` has reached.
    ///
    /// Due callbacks fire outside the pending-map lock, in wrapped timestamp
    /// order, each receiving its own timestamp. Racing retirements for the
    /// same context are serialized, so dispatch order across them is still
    /// non-decreasing: whichever retirement dispatches first drains every
    /// event due at its cutoff. Returns the number fired.
    pub fn retire(&self, context: ContextId, up_to: Timestamp) -> usize {
        let lock = Arc::clone(
            self.dispatch
                .lock()
                .entry(context)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );
        let _dispatch = lock.lock();

        let mut due: Vec<PendingEvent> = Vec::new();
        {
            let mut pending = self.pending.lock();
            if let Some(events) = pending.get_mut(&context) {
                let mut i = 0;
                while i < events.len() {
                    if up_to.reaches(events[i].timestamp) {
                        due.push(events.swap_remove(i));
                    } else {
                        i += 1;
                    }
                }
                if events.is_empty() {
                    pending.remove(&context);
                }
            }
        }

        due.sort_by(|a, b| a.timestamp.ordering(b.timestamp));

        let count = due.len();
        for event in due {
            (event.callback)(event.timestamp);
            self.fired.fetch_add(1, Ordering::Relaxed);
        }
        count
    }

    /// Drop every pending event on `context` without firing it.
    ///
    /// Part of context teardown, which the owner sequences after the
    /// retirements it still expects; callback-owned resources are released.
    pub fn cancel(&self, context: ContextId) -> usize {
        self.dispatch.lock().remove(&context);
        let dropped = self.pending.lock().remove(&context).unwrap_or_default();
        let count = dropped.len();
        if count > 0 {
            self.cancelled.fetch_add(count as u64, Ordering::Relaxed);
            log::debug!("cancelled {} pending events on {:?}", count, context);
        }
        count
    }

    /// Reject all further registrations
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Pending registrations for one context
    pub fn pending_for(&self, context: ContextId) -> usize {
        self.pending
            .lock()
            .get(&context)
            .map_or(0, |events| events.len())
    }

    /// Registrations currently holding slots (pending or mid-registration)
    pub fn in_flight(&self) -> usize {
        self.slots.in_use()
    }

    /// Total callbacks fired over the registry's lifetime
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    /// Total registrations cancelled unfired
    pub fn cancelled(&self) -> u64 {
        self.cancelled.load(Ordering::Relaxed)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicUsize;

    fn counting_callback(log: &Arc<Mutex<Vec<u32>>>) -> EventCallback {
        let log = Arc::clone(log);
        Box::new(move |timestamp| log.lock().push(timestamp.raw()))
    }

    #[test]
    fn test_retire_fires_due_events_in_order() {
        let registry = EventRegistry::new(16);
        let context = ContextId::new(1);
        let fired = Arc::new(Mutex::new(Vec::new()));

        // Registered out of order on purpose.
        for raw in [30u32, 10, 20, 40] {
            let slot = registry.reserve_slot().unwrap();
            registry
                .register(slot, context, Timestamp::new(raw), counting_callback(&fired))
                .unwrap();
        }

        assert_eq!(registry.retire(context, Timestamp::new(25)), 2);
        assert_eq!(*fired.lock(), [10, 20]);
        assert_eq!(registry.pending_for(context), 2);

        assert_eq!(registry.retire(context, Timestamp::new(40)), 2);
        assert_eq!(*fired.lock(), [10, 20, 30, 40]);
        assert_eq!(registry.in_flight(), 0);
        assert_eq!(registry.fired(), 4);
    }

    #[test]
    fn test_at_most_once_dispatch() {
        let registry = EventRegistry::new(4);
        let context = ContextId::new(2);
        let count = Arc::new(AtomicUsize::new(0));

        let observer = Arc::clone(&count);
        let slot = registry.reserve_slot().unwrap();
        registry
            .register(
                slot,
                context,
                Timestamp::new(5),
                Box::new(move |_| {
                    observer.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        assert_eq!(registry.retire(context, Timestamp::new(5)), 1);
        // Retiring again past the same timestamp finds nothing.
        assert_eq!(registry.retire(context, Timestamp::new(9)), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_contexts_are_independent() {
        let registry = EventRegistry::new(8);
        let a = ContextId::new(1);
        let b = ContextId::new(2);
        let fired = Arc::new(Mutex::new(Vec::new()));

        let slot = registry.reserve_slot().unwrap();
        registry
            .register(slot, a, Timestamp::new(1), counting_callback(&fired))
            .unwrap();
        let slot = registry.reserve_slot().unwrap();
        registry
            .register(slot, b, Timestamp::new(1), counting_callback(&fired))
            .unwrap();

        assert_eq!(registry.retire(a, Timestamp::new(1)), 1);
        assert_eq!(registry.pending_for(b), 1);
    }

    #[test]
    fn test_capacity_and_slot_release() {
        let registry = EventRegistry::new(1);
        let context = ContextId::new(1);

        let slot = registry.reserve_slot().unwrap();
        assert!(registry.reserve_slot().is_err());

        // An unused slot returns its capacity on drop.
        drop(slot);
        let slot = registry.reserve_slot().unwrap();
        registry
            .register(slot, context, Timestamp::new(1), Box::new(|_| {}))
            .unwrap();
        assert!(registry.reserve_slot().is_err());

        registry.cancel(context);
        assert_eq!(registry.cancelled(), 1);
        assert!(registry.reserve_slot().is_ok());
    }

    #[test]
    fn test_closed_registry_rejects_registration() {
        let registry = EventRegistry::new(4);
        let slot = registry.reserve_slot().unwrap();
        registry.close();

        let err = registry
            .register(slot, ContextId::new(1), Timestamp::new(1), Box::new(|_| {}))
            .unwrap_err();
        assert_eq!(err, Error::ShuttingDown);
        // The rejected registration gave its slot back.
        assert_eq!(registry.in_flight(), 0);
    }

    #[test]
    fn test_concurrent_retire_preserves_order() {
        use std::thread;

        let registry = Arc::new(EventRegistry::new(64));
        let context = ContextId::new(1);

        // Two retirements racing on one context: whichever dispatches first
        // must drain everything due at its cutoff, so the observed firing
        // order can never regress in wrapped time.
        for _ in 0..32 {
            let fired = Arc::new(Mutex::new(Vec::new()));
            for raw in [10u32, 20] {
                let slot = registry.reserve_slot().unwrap();
                registry
                    .register(slot, context, Timestamp::new(raw), counting_callback(&fired))
                    .unwrap();
            }

            let early = {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.retire(context, Timestamp::new(10)))
            };
            let late = {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.retire(context, Timestamp::new(20)))
            };
            assert_eq!(early.join().unwrap() + late.join().unwrap(), 2);

            let order = fired.lock();
            assert_eq!(order.len(), 2);
            assert!(Timestamp::new(order[1]).reaches(Timestamp::new(order[0])));
        }
        assert_eq!(registry.in_flight(), 0);
    }

    #[test]
    fn test_retire_across_wraparound() {
        let registry = EventRegistry::new(4);
        let context = ContextId::new(1);
        let fired = Arc::new(Mutex::new(Vec::new()));

        let slot = registry.reserve_slot().unwrap();
        registry
            .register(
                slot,
                context,
                Timestamp::new(u32::MAX),
                counting_callback(&fired),
            )
            .unwrap();
        let slot = registry.reserve_slot().unwrap();
        registry
            .register(slot, context, Timestamp::new(3), counting_callback(&fired))
            .unwrap();

        // 5 is after both u32::MAX and 3 in wrapped order.
        assert_eq!(registry.retire(context, Timestamp::new(5)), 2);
        assert_eq!(*fired.lock(), [u32::MAX, 3]);
    }
}
