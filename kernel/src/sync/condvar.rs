//! The condition variable.

use core::ptr;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::external::scheduler;
use crate::sync::lock::Lock;

/// A condition variable used together with a companion [`Lock`].
///
/// `wait` follows the three-phase sleep pattern: record the waiter on
/// the wait channel, release the companion lock, then
/// sleep — in that order and without a gap, so a `signal`/`broadcast`
/// racing the call can never be lost. The generation counter additionally
/// guards against spurious wakeups: `wait` only returns once the counter
/// it observed at entry has actually changed.
pub struct CondVar {
    generation: AtomicU64,
}

impl CondVar {
    pub const fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
        }
    }

    fn chan(&self) -> usize {
        ptr::from_ref(&self.generation) as usize
    }

    /// Atomically releases `lock` and blocks the caller until woken by
    /// `signal` or `broadcast` on this condvar, then reacquires `lock`
    /// before returning.
    ///
    /// # Panics
    ///
    /// Panics if the caller does not hold `lock`.
    pub fn wait(&self, lock: &Lock) {
        assert!(lock.held_by_caller(), "cv_wait called without holding lock");
        let sched = scheduler();
        let start = self.generation.load(Ordering::Acquire);
        loop {
            sched.park(self.chan(), &mut || lock.release());
            if self.generation.load(Ordering::Acquire) != start {
                break;
            }
        }
        lock.acquire();
    }

    /// Wakes at most one thread waiting on this condvar.
    ///
    /// # Panics
    ///
    /// Panics if the caller does not hold `lock`.
    pub fn signal(&self, lock: &Lock) {
        assert!(
            lock.held_by_caller(),
            "cv_signal called without holding lock"
        );
        self.generation.fetch_add(1, Ordering::AcqRel);
        scheduler().wake_one(self.chan());
    }

    /// Wakes every thread waiting on this condvar.
    ///
    /// # Panics
    ///
    /// Panics if the caller does not hold `lock`.
    pub fn broadcast(&self, lock: &Lock) {
        assert!(
            lock.held_by_caller(),
            "cv_broadcast called without holding lock"
        );
        self.generation.fetch_add(1, Ordering::AcqRel);
        scheduler().wake_all(self.chan());
    }
}

impl Default for CondVar {
    fn default() -> Self {
        Self::new()
    }
}
