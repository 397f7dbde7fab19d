//! The open-file object: a vnode handle, the access mode and append flag
//! fixed at `open` time, and an offset shared by every descriptor that
//! refers to this same object (e.g. after `dup2` or `fork`).
//!
//! The refcount is an ordinary `Arc` strong count and the vnode is closed
//! by an ordinary [`Drop`] impl, so "a vnode is closed exactly when the
//! last descriptor referring to it goes away" holds by construction
//! rather than by discipline.

use alloc::sync::Arc;

use crate::external::vfs::Vnode;
use crate::file::{AccessMode, OpenFlags};
use crate::sync::Locked;
use crate::{Error, Result};

/// `lseek`'s `whence` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

impl TryFrom<i32> for Whence {
    type Error = Error;

    /// Maps the raw `SEEK_*` constant `lseek` receives at the syscall
    /// ABI boundary. Any other value is `InvalidArgument`.
    fn try_from(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(Whence::Start),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// A single open instance of a vnode: `open` creates exactly one of
/// these and returns a descriptor referring to it; `dup2` and `fork`
/// create additional descriptors referring to the *same* instance, so
/// they share the one offset — seeking through one alias moves them all.
pub struct OpenFile {
    vnode: Arc<dyn Vnode>,
    access: AccessMode,
    append: bool,
    offset: Locked<u64>,
}

impl OpenFile {
    /// Creates a fresh open-file object over `vnode`, as `open` does.
    /// Always starts at offset 0, except `O_APPEND` which seeks to the
    /// vnode's current size before any write.
    pub fn new(vnode: Arc<dyn Vnode>, flags: OpenFlags) -> Self {
        Self {
            vnode,
            access: flags.access_mode(),
            append: flags.contains(OpenFlags::APPEND),
            offset: Locked::new(0),
        }
    }

    pub fn access_mode(&self) -> AccessMode {
        self.access
    }

    pub fn vnode(&self) -> &Arc<dyn Vnode> {
        &self.vnode
    }

    /// Reads into `buf` at the current offset and advances it by the
    /// number of bytes actually read.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if !self.access.readable() {
            return Err(Error::BadFileDescriptor);
        }
        let mut offset = self.offset.lock();
        let n = self.vnode.read(*offset, buf)?;
        *offset += n as u64;
        Ok(n)
    }

    /// Writes `buf` at the current offset (or at end-of-file if opened
    /// with `O_APPEND`) and advances the offset by the number of bytes
    /// actually written.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        if !self.access.writable() {
            return Err(Error::BadFileDescriptor);
        }
        let mut offset = self.offset.lock();
        if self.append {
            *offset = self.vnode.stat()?.size;
        }
        let n = self.vnode.write(*offset, buf)?;
        *offset += n as u64;
        Ok(n)
    }

    /// Repositions the offset per `whence`, as `lseek` does. Fails with
    /// `NotSeekable` on a vnode that does not support seeking, and with
    /// `InvalidArgument` if the resulting offset would be negative.
    pub fn seek(&self, pos: i64, whence: Whence) -> Result<u64> {
        if !self.vnode.is_seekable() {
            return Err(Error::NotSeekable);
        }
        let mut offset = self.offset.lock();
        let base: i64 = match whence {
            Whence::Start => 0,
            Whence::Current => i64::try_from(*offset).map_err(|_| Error::InvalidArgument)?,
            Whence::End => {
                i64::try_from(self.vnode.stat()?.size).map_err(|_| Error::InvalidArgument)?
            }
        };
        let new_offset = base
            .checked_add(pos)
            .ok_or(Error::InvalidArgument)?;
        if new_offset < 0 {
            return Err(Error::InvalidArgument);
        }
        *offset = new_offset as u64;
        Ok(*offset)
    }
}
