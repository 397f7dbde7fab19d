//! The blocking lock.

use core::ptr;

use crate::external::spin_lock::SpinLock;
use crate::external::{ThreadId, scheduler};

struct State {
    owner: Option<ThreadId>,
}

/// A mutex that parks the caller on a wait channel instead of spinning.
///
/// Acquiring a lock already held by the calling thread is a no-op rather
/// than a deadlock: there is no recursion depth counter, so the first
/// `release` call fully unlocks it regardless of how many redundant
/// `acquire` calls preceded it. Releasing a lock the caller does not
/// hold is silently ignored rather than panicking.
pub struct Lock {
    state: SpinLock<State>,
}

impl Lock {
    pub const fn new() -> Self {
        Self {
            state: SpinLock::new(State { owner: None }),
        }
    }

    fn chan(&self) -> usize {
        ptr::from_ref(self) as usize
    }

    /// Blocks until the lock is free, then takes it. A no-op if the
    /// calling thread already holds it.
    pub fn acquire(&self) {
        let sched = scheduler();
        let me = sched.current_thread();
        loop {
            let mut guard = self.state.lock();
            if guard.owner == Some(me) {
                return;
            }
            if guard.owner.is_none() {
                guard.owner = Some(me);
                return;
            }
            let mut guard = Some(guard);
            sched.park(self.chan(), &mut || {
                guard.take();
            });
        }
    }

    /// Releases the lock if the calling thread holds it.
    pub fn release(&self) {
        let sched = scheduler();
        let me = sched.current_thread();
        let mut guard = self.state.lock();
        if guard.owner != Some(me) {
            return;
        }
        guard.owner = None;
        drop(guard);
        sched.wake_one(self.chan());
    }

    /// Whether the calling thread currently holds this lock.
    pub fn held_by_caller(&self) -> bool {
        let sched = scheduler();
        self.state.lock().owner == Some(sched.current_thread())
    }
}

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}
