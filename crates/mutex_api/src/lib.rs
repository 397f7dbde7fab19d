//! A minimal mutex trait.
//!
//! Lets the process/file-descriptor subsystem depend on "some mutual-exclusion
//! primitive" without committing to a concrete lock implementation. The
//! kernel crate supplies [`crate::sync::SpinLock`](../kernel/index.html) as
//! the concrete implementation; host-side tests may swap in any other type
//! that implements this trait.
#![no_std]

use core::ops::DerefMut;

/// A mutex.
pub trait Mutex {
    /// The type of the data that the mutex protects.
    type Data;

    /// The type of the guard that the `lock` method returns.
    type Guard<'a>: DerefMut<Target = Self::Data>
    where
        Self: 'a;

    /// Creates a new mutex.
    fn new(data: Self::Data) -> Self;

    /// Locks the mutex.
    fn lock(&self) -> Self::Guard<'_>;
}
