//! The virtual filesystem collaborator.
//!
//! `open`/`close`/`read`/`write`/`lseek`/`chdir`/`getcwd` all eventually
//! call down into a vnode looked up through here; this subsystem never
//! interprets a path itself beyond handing it to [`Vfs::open`] or
//! [`Vfs::chdir`].

use alloc::string::String;
use alloc::sync::Arc;

use crate::Result;
use crate::file::OpenFlags;

/// Metadata `fstat`-equivalent calls read off a vnode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub is_directory: bool,
}

/// A single open file in the backing store.
///
/// Every [`crate::file::OpenFile`] holds one of these behind an `Arc`; the
/// vnode itself only knows how to move bytes, not about file descriptors,
/// offsets, or open mode — those live in `OpenFile`.
pub trait Vnode: Send + Sync {
    /// Reads up to `buf.len()` bytes starting at `offset`. Returns the
    /// number of bytes actually read (short reads at end-of-file are not
    /// an error).
    fn read(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Writes `buf` starting at `offset`. Returns the number of bytes
    /// actually written.
    fn write(&self, offset: u64, buf: &[u8]) -> Result<usize>;

    fn stat(&self) -> Result<FileStat>;

    /// Whether `lseek` is meaningful on this vnode (false for pipes and
    /// console devices).
    fn is_seekable(&self) -> bool {
        true
    }
}

/// Path resolution and lookup.
pub trait Vfs: Send + Sync {
    /// Resolves `path` relative to `cwd`, honoring `flags` (`O_CREAT`,
    /// `O_EXCL`, `O_TRUNC`, ...), and returns the resulting vnode with one
    /// outstanding reference.
    fn open(&self, cwd: &Arc<dyn Vnode>, path: &str, flags: OpenFlags) -> Result<Arc<dyn Vnode>>;

    /// Resolves `path` relative to `cwd` and returns the directory vnode
    /// to install as the new working directory.
    fn chdir(&self, cwd: &Arc<dyn Vnode>, path: &str) -> Result<Arc<dyn Vnode>>;

    /// Renders `cwd`'s absolute path.
    fn getcwd(&self, cwd: &Arc<dyn Vnode>) -> Result<String>;

    /// The filesystem root, used to seed a new process's working
    /// directory.
    fn root(&self) -> Arc<dyn Vnode>;
}
