//! The per-process file-descriptor table: a fixed-size array of optional
//! open-file handles, descriptors 0-2 reserved for stdio. `install_stdio`
//! takes one independent vnode per stdio slot, so closing stdin and
//! reopening something else in its place can never alias stdout/stderr.

use alloc::sync::Arc;
use core::array;

use crate::external::Vnode;
use crate::file::OpenFile;
use crate::param::{FIRST_USER_FD, OPEN_MAX};
use crate::{Error, Result};

pub struct FdTable {
    slots: [Option<Arc<OpenFile>>; OPEN_MAX],
}

impl FdTable {
    pub fn new() -> Self {
        Self {
            slots: array::from_fn(|_| None),
        }
    }

    /// Installs one independent open-file object per stdio slot
    /// (0 = stdin, 1 = stdout, 2 = stderr), each wrapping its own vnode.
    pub fn install_stdio(&mut self, stdin: Arc<dyn Vnode>, stdout: Arc<dyn Vnode>, stderr: Arc<dyn Vnode>) {
        use crate::file::OpenFlags;
        self.slots[0] = Some(Arc::new(OpenFile::new(stdin, OpenFlags::empty())));
        self.slots[1] = Some(Arc::new(OpenFile::new(stdout, OpenFlags::WRONLY)));
        self.slots[2] = Some(Arc::new(OpenFile::new(stderr, OpenFlags::WRONLY)));
    }

    fn check_fd(fd: i32) -> Result<usize> {
        let fd = usize::try_from(fd).map_err(|_| Error::BadFileDescriptor)?;
        if fd >= OPEN_MAX {
            return Err(Error::BadFileDescriptor);
        }
        Ok(fd)
    }

    /// Returns the open-file object backing `fd`.
    pub fn get(&self, fd: i32) -> Result<&Arc<OpenFile>> {
        let fd = Self::check_fd(fd)?;
        self.slots[fd].as_ref().ok_or(Error::BadFileDescriptor)
    }

    /// Installs `file` in the lowest-numbered free slot at or above
    /// `FIRST_USER_FD`.
    pub fn add(&mut self, file: Arc<OpenFile>) -> Result<i32> {
        for fd in FIRST_USER_FD..OPEN_MAX {
            if self.slots[fd].is_none() {
                self.slots[fd] = Some(file);
                return Ok(fd as i32);
            }
        }
        crate::klog!("descriptor table full, cannot open another file");
        Err(Error::TooManyOpenFiles)
    }

    /// Drops the descriptor. Not idempotent: closing an already-closed
    /// fd (or one out of range) is a `BadFileDescriptor` error. Closing
    /// the same slot twice in a row, after it has been reused for a
    /// different `OpenFile`, never double-frees, because each slot owns
    /// its own `Arc` independently of any other copy of this table.
    pub fn close(&mut self, fd: i32) -> Result<()> {
        let fd = Self::check_fd(fd)?;
        self.slots[fd].take().ok_or(Error::BadFileDescriptor)?;
        Ok(())
    }

    /// Makes `new_fd` refer to the same open-file object as `old_fd`,
    /// closing whatever `new_fd` previously referred to first (POSIX
    /// `dup2` semantics). A no-op if `old_fd == new_fd` and both are
    /// valid.
    pub fn dup2(&mut self, old_fd: i32, new_fd: i32) -> Result<i32> {
        let old = Self::check_fd(old_fd)?;
        let new = Self::check_fd(new_fd)?;
        if self.slots[old].is_none() {
            return Err(Error::BadFileDescriptor);
        }
        if old == new {
            return Ok(new_fd);
        }
        self.slots[new] = self.slots[old].clone();
        Ok(new_fd)
    }

    /// Builds a child table for `fork`: every occupied slot gets its own
    /// descriptor pointing at the *same* open-file object, bumping its
    /// refcount — reads/writes/seeks through the parent's and child's
    /// copies of the descriptor observe each other, exactly like two
    /// descriptors from `dup2` in the same process.
    pub fn fork_clone(&self) -> Self {
        Self {
            slots: array::from_fn(|i| self.slots[i].clone()),
        }
    }
}

impl Default for FdTable {
    fn default() -> Self {
        Self::new()
    }
}
