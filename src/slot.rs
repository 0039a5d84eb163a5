use std::sync::{Mutex, MutexGuard, PoisonError};

/// Single-slot mailbox between a frame producer and its consumer.
///
/// The producer [`offer`](FrameSlot::offer)s decoded frames; a frame is only
/// stored when the slot is empty, otherwise the new frame is dropped and the
/// pending one is kept until the consumer [`take`](FrameSlot::take)s it.
/// The lock is only held while moving the value in or out.
#[derive(Debug)]
pub struct FrameSlot<T> {
    pending: Mutex<Option<T>>,
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameSlot<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(None),
        }
    }

    /// Stores `value` if the slot is empty. Returns whether it was stored.
    pub fn offer(&self, value: T) -> bool {
        let mut pending = self.lock();
        if pending.is_some() {
            return false;
        }
        *pending = Some(value);
        true
    }

    /// Removes and returns the pending value, if any.
    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    /// Drops the pending value, if any.
    pub fn clear(&self) {
        self.take();
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        // The guarded state is a plain `Option`, a panic elsewhere cannot
        // leave it half-written.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
