use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Single-flight admission. The compositor drives one GUI application
/// instance; a second concurrent job would fight it over sentinel files
/// and the application itself, so admission never blocks and never
/// queues. Callers that miss the slot are told to come back later.
#[derive(Clone)]
pub struct AdmissionLock {
    semaphore: Arc<Semaphore>,
}

/// Held for the duration of one job. Dropping it frees the slot.
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionLock {
    pub fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
        }
    }

    /// Takes the slot if free, None if a job is already running.
    pub fn try_acquire(&self) -> Option<AdmissionPermit> {
        self.semaphore
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionPermit { _permit: permit })
    }

    pub fn is_busy(&self) -> bool {
        self.semaphore.available_permits() == 0
    }
}

impl Default for AdmissionLock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_rejected() {
        let lock = AdmissionLock::new();
        let permit = lock.try_acquire();
        assert!(permit.is_some());
        assert!(lock.is_busy());
        assert!(lock.try_acquire().is_none());
    }

    #[test]
    fn test_slot_frees_on_drop() {
        let lock = AdmissionLock::new();
        drop(lock.try_acquire().unwrap());
        assert!(!lock.is_busy());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let lock = AdmissionLock::new();
        let other = lock.clone();
        let _permit = lock.try_acquire().unwrap();
        assert!(other.try_acquire().is_none());
    }
}
