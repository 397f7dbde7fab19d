//! A typed wrapper pairing a [`Lock`] with the data it protects, the way
//! [`crate::external::spin_lock::SpinLock`] pairs a spinlock with its
//! data — except a blocking acquire, used wherever the critical section
//! may itself call into the VFS and block (an open-file's offset, a
//! process record's exit state).

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};

use crate::sync::lock::Lock;

pub struct Locked<T> {
    lock: Lock,
    data: UnsafeCell<T>,
}

// SAFETY: `lock` serializes all access to `data`.
unsafe impl<T: Send> Sync for Locked<T> {}

impl<T> Locked<T> {
    pub const fn new(data: T) -> Self {
        Self {
            lock: Lock::new(),
            data: UnsafeCell::new(data),
        }
    }

    pub fn lock(&self) -> LockedGuard<'_, T> {
        self.lock.acquire();
        LockedGuard { owner: self }
    }
}

pub struct LockedGuard<'a, T> {
    owner: &'a Locked<T>,
}

impl<T> Deref for LockedGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: holding the guard means `owner.lock` is held by us.
        unsafe { &*self.owner.data.get() }
    }
}

impl<T> DerefMut for LockedGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: see `deref`.
        unsafe { &mut *self.owner.data.get() }
    }
}

impl<T> Drop for LockedGuard<'_, T> {
    fn drop(&mut self) {
        self.owner.lock.release();
    }
}
