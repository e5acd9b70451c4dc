//! Uniqueness of the active presence manager.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use scenecast_common::PresenceError;

/// Admits at most one live manager at a time.
#[derive(Debug, Default)]
pub struct InstanceSlot {
    occupied: AtomicBool,
}

impl InstanceSlot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The process-wide slot used by [`PresenceManager::start`](super::PresenceManager::start).
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<InstanceSlot>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(InstanceSlot::new))
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied.load(Ordering::Acquire)
    }

    /// Claim the slot. The claim lasts until the returned guard is dropped.
    pub(crate) fn acquire(self: &Arc<Self>) -> Result<SlotGuard, PresenceError> {
        self.occupied
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PresenceError::DuplicateInstance)?;
        Ok(SlotGuard {
            slot: Arc::clone(self),
        })
    }
}

#[derive(Debug)]
pub(crate) struct SlotGuard {
    slot: Arc<InstanceSlot>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slot.occupied.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected() {
        let slot = InstanceSlot::new();
        let _first = slot.acquire().unwrap();
        assert_eq!(slot.acquire().unwrap_err(), PresenceError::DuplicateInstance);
        assert!(slot.is_occupied());
    }

    #[test]
    fn dropping_guard_frees_slot() {
        let slot = InstanceSlot::new();
        let guard = slot.acquire().unwrap();
        drop(guard);
        assert!(!slot.is_occupied());
        assert!(slot.acquire().is_ok());
    }

    #[test]
    fn global_is_shared() {
        assert!(Arc::ptr_eq(&InstanceSlot::global(), &InstanceSlot::global()));
    }
}
