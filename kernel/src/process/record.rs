//! The process record: everything the process-table and syscall layers
//! need per process besides the scheduler's own thread control block.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::cell::UnsafeCell;

use crate::external::{AddrSpace, TrapFrame, Vnode};
use crate::fd_table::FdTable;
use crate::sync::{CondVar, Lock, Locked};

struct ExitState {
    exited: bool,
    exit_code: i32,
}

/// One process's kernel-side bookkeeping.
///
/// `wait_lock`/`wait_cv`/`exit_state` implement the lock-release-sleep
/// three-phase wait pattern directly: `_exit` takes `wait_lock`, records
/// the exit code, and broadcasts; `waitpid` takes `wait_lock` and loops
/// on `wait_cv` until `exited` is set, so a child that exits before its
/// parent calls `waitpid` is never missed.
pub struct ProcessRecord {
    pid: i32,
    parent_pid: Locked<i32>,
    wait_lock: Lock,
    wait_cv: CondVar,
    exit_state: UnsafeCell<ExitState>,
    fd_table: Locked<FdTable>,
    cwd: Locked<Arc<dyn Vnode>>,
    addrspace: Locked<Box<dyn AddrSpace>>,
    saved_trapframe: Locked<Option<Box<dyn TrapFrame>>>,
}

// SAFETY: `exit_state` is only ever touched while `wait_lock` is held.
unsafe impl Sync for ProcessRecord {}

impl ProcessRecord {
    pub(crate) fn new(
        pid: i32,
        parent_pid: i32,
        fd_table: FdTable,
        cwd: Arc<dyn Vnode>,
        addrspace: Box<dyn AddrSpace>,
    ) -> Self {
        Self {
            pid,
            parent_pid: Locked::new(parent_pid),
            wait_lock: Lock::new(),
            wait_cv: CondVar::new(),
            exit_state: UnsafeCell::new(ExitState {
                exited: false,
                exit_code: 0,
            }),
            fd_table: Locked::new(fd_table),
            cwd: Locked::new(cwd),
            addrspace: Locked::new(addrspace),
            saved_trapframe: Locked::new(None),
        }
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn parent_pid(&self) -> i32 {
        *self.parent_pid.lock()
    }

    pub fn set_parent_pid(&self, parent_pid: i32) {
        *self.parent_pid.lock() = parent_pid;
    }

    pub fn fd_table(&self) -> crate::sync::locked::LockedGuard<'_, FdTable> {
        self.fd_table.lock()
    }

    pub fn cwd(&self) -> Arc<dyn Vnode> {
        Arc::clone(&self.cwd.lock())
    }

    pub fn set_cwd(&self, cwd: Arc<dyn Vnode>) {
        *self.cwd.lock() = cwd;
    }

    pub fn addrspace(&self) -> crate::sync::locked::LockedGuard<'_, Box<dyn AddrSpace>> {
        self.addrspace.lock()
    }

    /// Stores the trapframe `fork` saved for this (freshly created)
    /// child, to be handed to [`crate::syscall::process::enter_forked_process`]
    /// once the scheduler first dispatches it.
    pub fn install_saved_trapframe(&self, trapframe: Box<dyn TrapFrame>) {
        *self.saved_trapframe.lock() = Some(trapframe);
    }

    /// Takes this process's saved trapframe, if one was ever installed.
    /// Leaves `None` behind — a forked child's first-run continuation
    /// runs at most once.
    pub fn take_saved_trapframe(&self) -> Option<Box<dyn TrapFrame>> {
        self.saved_trapframe.lock().take()
    }

    /// Records this process's exit code and wakes every waiter. A second
    /// call is a no-op: `_exit` runs at most once per process.
    pub fn mark_exited(&self, exit_code: i32) {
        self.wait_lock.acquire();
        // SAFETY: `wait_lock` is held.
        let state = unsafe { &mut *self.exit_state.get() };
        if !state.exited {
            state.exited = true;
            state.exit_code = exit_code;
        }
        self.wait_cv.broadcast(&self.wait_lock);
        self.wait_lock.release();
    }

    pub fn has_exited(&self) -> bool {
        self.wait_lock.acquire();
        // SAFETY: `wait_lock` is held.
        let exited = unsafe { &*self.exit_state.get() }.exited;
        self.wait_lock.release();
        exited
    }

    /// Blocks until this process has exited and returns its exit code.
    pub fn wait_for_exit(&self) -> i32 {
        self.wait_lock.acquire();
        loop {
            // SAFETY: `wait_lock` is held.
            let state = unsafe { &*self.exit_state.get() };
            if state.exited {
                let code = state.exit_code;
                self.wait_lock.release();
                return code;
            }
            self.wait_cv.wait(&self.wait_lock);
        }
    }
}
