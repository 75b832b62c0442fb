//! Minimal driver policy used by the substrate's own tests: a plain
//! non-wrapping counter with numeric point targets.

use core::cmp::Ordering;
use core::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use crate::ops::TimelineOps;

pub(crate) struct TestOps {
    value: AtomicU32,
}

impl TestOps {
    pub(crate) fn new() -> Self {
        Self {
            value: AtomicU32::new(0),
        }
    }

    pub(crate) fn set(&self, value: u32) {
        self.value.store(value, AtomicOrdering::Release);
    }
}

impl TimelineOps for TestOps {
    type Point = u32;

    const DRIVER_NAME: &'static str = "test-timeline";

    fn has_signaled(&self, point: &u32) -> bool {
        self.value.load(AtomicOrdering::Acquire) >= *point
    }

    fn compare(a: &u32, b: &u32) -> Ordering {
        a.cmp(b)
    }
}
