//! The process table: a fixed-size array indexed by pid.
//!
//! Slots 0 and 1 are reserved (boot and idle threads have no
//! `ProcessRecord` of their own); the first user process is pid 2. The
//! free-slot scan runs `2..MAX_RUNNING_PROCS` over an array sized
//! `MAX_RUNNING_PROCS`, so pids above `MAX_RUNNING_PROCS - 1` are never
//! handed out and `add` never walks past the end of the array.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::array;

use crate::external::{AddrSpace, Vnode};
use crate::fd_table::FdTable;
use crate::external::spin_lock::SpinLock;
use crate::param::{MAX_RUNNING_PROCS, NO_PARENT};
use crate::process::record::ProcessRecord;
use crate::{Error, Result};

/// The first pid handed to a user process.
pub const FIRST_USER_PID: i32 = 2;

pub struct ProcessTable {
    slots: SpinLock<[Option<Arc<ProcessRecord>>; MAX_RUNNING_PROCS]>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self {
            slots: SpinLock::new(array::from_fn(|_| None)),
        }
    }

    fn in_range(pid: i32) -> Option<usize> {
        usize::try_from(pid)
            .ok()
            .filter(|&pid| pid < MAX_RUNNING_PROCS)
    }

    /// Allocates the lowest-numbered free pid at or above
    /// [`FIRST_USER_PID`] and installs a new record there.
    pub fn add(
        &self,
        parent_pid: i32,
        fd_table: FdTable,
        cwd: Arc<dyn Vnode>,
        addrspace: Box<dyn AddrSpace>,
    ) -> Result<Arc<ProcessRecord>> {
        let mut slots = self.slots.lock();
        for pid in (FIRST_USER_PID as usize)..MAX_RUNNING_PROCS {
            if slots[pid].is_none() {
                let record = Arc::new(ProcessRecord::new(
                    pid as i32,
                    parent_pid,
                    fd_table,
                    cwd,
                    addrspace,
                ));
                slots[pid] = Some(Arc::clone(&record));
                return Ok(record);
            }
        }
        crate::klog!("process table exhausted, cannot fork child of pid {parent_pid}");
        Err(Error::OutOfMemory)
    }

    pub fn get(&self, pid: i32) -> Option<Arc<ProcessRecord>> {
        let pid = Self::in_range(pid)?;
        self.slots.lock()[pid].clone()
    }

    /// Removes `pid`'s record from the table, as `waitpid` does once it
    /// has collected the exit code.
    pub fn remove(&self, pid: i32) {
        if let Some(pid) = Self::in_range(pid) {
            self.slots.lock()[pid] = None;
        }
    }

    /// Reparents every live child of `old_parent` to [`NO_PARENT`], as
    /// `_exit` does for a process with outstanding children.
    pub fn reparent_children(&self, old_parent: i32) {
        // Collect the live records first and release the table's
        // spinlock before touching each one's own (blocking) parent_pid
        // lock, so we never hold a spinlock across a potential park.
        let children: alloc::vec::Vec<_> = self.slots.lock().iter().flatten().cloned().collect();
        for child in children {
            if child.parent_pid() == old_parent {
                child.set_parent_pid(NO_PARENT);
            }
        }
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}
