//! The reader/writer lock: writer-preferring, built out of a [`Lock`]
//! and two companion [`CondVar`]s.

use core::cell::UnsafeCell;

use crate::sync::condvar::CondVar;
use crate::sync::lock::Lock;

struct State {
    num_readers: usize,
    is_writing: bool,
    /// Set while a writer is waiting, so newly arriving readers queue
    /// behind it instead of starving it.
    hold_readers: bool,
}

/// A reader/writer lock.
///
/// Readers share access to the state as long as no writer holds or is
/// waiting for the lock; a waiting writer sets `hold_readers` so that new
/// readers queue up behind it rather than repeatedly renewing the
/// readers' majority and starving the writer out.
pub struct RwLock {
    m: Lock,
    read_cv: CondVar,
    write_cv: CondVar,
    state: UnsafeCell<State>,
}

// SAFETY: every access to `state` happens while `m` is held.
unsafe impl Sync for RwLock {}
unsafe impl Send for RwLock {}

impl RwLock {
    pub const fn new() -> Self {
        Self {
            m: Lock::new(),
            read_cv: CondVar::new(),
            write_cv: CondVar::new(),
            state: UnsafeCell::new(State {
                num_readers: 0,
                is_writing: false,
                hold_readers: false,
            }),
        }
    }

    /// # Safety
    ///
    /// Caller must hold `self.m`.
    #[allow(clippy::mut_from_ref)]
    fn state(&self) -> &mut State {
        unsafe { &mut *self.state.get() }
    }

    pub fn acquire_read(&self) {
        self.m.acquire();
        while self.state().is_writing || self.state().hold_readers {
            self.read_cv.wait(&self.m);
        }
        self.state().num_readers += 1;
        self.m.release();
    }

    pub fn release_read(&self) {
        self.m.acquire();
        let st = self.state();
        st.num_readers -= 1;
        if st.hold_readers && st.num_readers == 0 {
            st.hold_readers = false;
            self.read_cv.signal(&self.m);
            self.write_cv.signal(&self.m);
        } else if !st.hold_readers {
            self.read_cv.broadcast(&self.m);
        }
        self.m.release();
    }

    pub fn acquire_write(&self) {
        self.m.acquire();
        while self.state().is_writing || self.state().num_readers > 0 {
            self.state().hold_readers = true;
            self.write_cv.wait(&self.m);
        }
        self.state().hold_readers = false;
        self.state().is_writing = true;
        self.m.release();
    }

    pub fn release_write(&self) {
        self.m.acquire();
        self.state().is_writing = false;
        self.read_cv.signal(&self.m);
        self.write_cv.signal(&self.m);
        self.m.release();
    }
}

impl Default for RwLock {
    fn default() -> Self {
        Self::new()
    }
}
