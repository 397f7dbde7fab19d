//! A short-duration busy-wait mutex.
//!
//! An atomic compare-exchange loop guarding an `UnsafeCell`, with a
//! `SpinLockGuard` that releases on drop. Disabling interrupts and
//! recording the owning hart for deadlock detection are properties of
//! the bare-metal interrupt controller this crate never touches, so
//! they are left to whatever embeds this crate rather than modeled
//! here.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use mutex_api::Mutex;

/// A spinlock guarding `T`.
///
/// Unlike [`crate::sync::Lock`], this never parks the caller on a wait
/// channel — a thread spinning on one is expected to hold it only long
/// enough to read or update a few fields.
pub struct SpinLock<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

// SAFETY: `locked` serializes all access to `data`.
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    pub const fn new(data: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(data),
        }
    }

    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        SpinLockGuard { lock: self }
    }

    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|()| SpinLockGuard { lock: self })
    }
}

impl<T> Mutex for SpinLock<T> {
    type Data = T;
    type Guard<'a>
        = SpinLockGuard<'a, T>
    where
        Self: 'a;

    fn new(data: Self::Data) -> Self {
        SpinLock::new(data)
    }

    fn lock(&self) -> Self::Guard<'_> {
        SpinLock::lock(self)
    }
}

/// RAII guard returned by [`SpinLock::lock`].
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: holding the guard means `locked` is true and we are its
        // sole owner.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: see `deref`.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
