//! Single-slot hand-off between the intake listener and the controller.
//!
//! A background listener deposits exactly one value; the controller blocks
//! until it is available and consumes it exactly once. The predicate is
//! re-checked in a loop to survive spurious wakeups and deliveries that
//! arrive before the controller starts waiting.

use crate::error::{PipelineError, PipelineResult};
use std::sync::{Condvar, Mutex};

/// Bounded single-slot mailbox with an explicit "ready" predicate.
pub struct Mailbox<T> {
    slot: Mutex<Option<T>>,
    ready: Condvar,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self { slot: Mutex::new(None), ready: Condvar::new() }
    }

    /// Deposits one value. At-most-once per armed listener: a second delivery
    /// while the slot is occupied is rejected.
    pub fn deliver(&self, value: T) -> PipelineResult<()> {
        let mut slot = self.slot.lock().unwrap();
        if slot.is_some() {
            return Err(PipelineError::Intake(
                "a bundle was already delivered and not yet consumed".to_string(),
            ));
        }
        *slot = Some(value);
        self.ready.notify_one();
        Ok(())
    }

    /// Blocks until a value is available and takes it. No timeout: the
    /// listener is ready indefinitely.
    pub fn recv(&self) -> T {
        let mut slot = self.slot.lock().unwrap();
        loop {
            if let Some(value) = slot.take() {
                return value;
            }
            slot = self.ready.wait(slot).unwrap();
        }
    }
}
