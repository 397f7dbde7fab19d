//! `open`/`close`/`read`/`write`/`lseek`/`dup2`/`chdir`/`getcwd`.
//!
//! Each syscall here takes the calling process's [`ProcessRecord`]
//! explicitly rather than reaching into a hidden "current process"
//! global.

use alloc::string::String;
use alloc::sync::Arc;

use crate::external::{UserSpace, Vfs, copyin, copyinstr, copyout};
use crate::file::{OpenFile, OpenFlags, open_file::Whence};
use crate::param::PATH_MAX;
use crate::process::ProcessRecord;
use crate::{Error, Result};

/// Opens `path` relative to the caller's working directory and installs
/// the result in the caller's lowest-numbered free descriptor.
pub fn open(proc: &ProcessRecord, vfs: &dyn Vfs, path: &str, flags: OpenFlags) -> Result<i32> {
    let cwd = proc.cwd();
    let vnode = vfs.open(&cwd, path, flags)?;
    let file = Arc::new(OpenFile::new(vnode, flags));
    proc.fd_table().add(file)
}

/// Copies the path in from user memory before calling [`open`], so a
/// bad or unterminated pointer is rejected before any VFS lookup runs.
pub fn open_syscall(
    proc: &ProcessRecord,
    vfs: &dyn Vfs,
    user: &dyn UserSpace,
    path_addr: usize,
    flags: OpenFlags,
) -> Result<i32> {
    let mut path_buf = [0u8; PATH_MAX];
    let len = copyinstr(user, path_addr, &mut path_buf)?;
    let path = core::str::from_utf8(&path_buf[..len]).map_err(|_| Error::InvalidArgument)?;
    open(proc, vfs, path, flags)
}

pub fn close(proc: &ProcessRecord, fd: i32) -> Result<()> {
    proc.fd_table().close(fd)
}

pub fn read(proc: &ProcessRecord, fd: i32, buf: &mut [u8]) -> Result<usize> {
    let file = Arc::clone(proc.fd_table().get(fd)?);
    file.read(buf)
}

/// Reads into a user buffer: reads into a kernel-side scratch buffer
/// first, then copies out, so a fault partway through a large read never
/// leaves the open-file's offset and the bytes actually delivered to the
/// caller out of sync.
pub fn read_syscall(
    proc: &ProcessRecord,
    user: &dyn UserSpace,
    fd: i32,
    buf_addr: usize,
    len: usize,
) -> Result<usize> {
    let mut scratch = alloc::vec![0u8; len];
    let n = read(proc, fd, &mut scratch)?;
    copyout(user, buf_addr, &scratch[..n])?;
    Ok(n)
}

pub fn write(proc: &ProcessRecord, fd: i32, buf: &[u8]) -> Result<usize> {
    let file = Arc::clone(proc.fd_table().get(fd)?);
    file.write(buf)
}

pub fn write_syscall(
    proc: &ProcessRecord,
    user: &dyn UserSpace,
    fd: i32,
    buf_addr: usize,
    len: usize,
) -> Result<usize> {
    let mut scratch = alloc::vec![0u8; len];
    copyin(user, buf_addr, &mut scratch)?;
    write(proc, fd, &scratch)
}

pub fn lseek(proc: &ProcessRecord, fd: i32, pos: i64, whence: Whence) -> Result<u64> {
    let file = Arc::clone(proc.fd_table().get(fd)?);
    file.seek(pos, whence)
}

/// Validates the raw `SEEK_*` constant from the syscall ABI before
/// calling [`lseek`], so an unrecognized `whence` fails with
/// `InvalidArgument` rather than panicking or being silently coerced.
pub fn lseek_syscall(proc: &ProcessRecord, fd: i32, pos: i64, raw_whence: i32) -> Result<u64> {
    let whence = Whence::try_from(raw_whence)?;
    lseek(proc, fd, pos, whence)
}

pub fn dup2(proc: &ProcessRecord, old_fd: i32, new_fd: i32) -> Result<i32> {
    proc.fd_table().dup2(old_fd, new_fd)
}

pub fn chdir(proc: &ProcessRecord, vfs: &dyn Vfs, path: &str) -> Result<()> {
    let cwd = proc.cwd();
    let new_cwd = vfs.chdir(&cwd, path)?;
    proc.set_cwd(new_cwd);
    Ok(())
}

pub fn getcwd(proc: &ProcessRecord, vfs: &dyn Vfs) -> Result<String> {
    vfs.getcwd(&proc.cwd())
}

/// Renders the caller's working directory and copies as much of it as
/// fits into the user buffer at `buf_addr..buf_addr+buflen`, returning
/// the number of bytes actually written. Too-short a buffer truncates
/// rather than erroring, matching every other `*_syscall` wrapper's
/// treatment of its caller-supplied length.
pub fn getcwd_syscall(
    proc: &ProcessRecord,
    vfs: &dyn Vfs,
    user: &dyn UserSpace,
    buf_addr: usize,
    buflen: usize,
) -> Result<usize> {
    let path = getcwd(proc, vfs)?;
    let n = path.len().min(buflen);
    copyout(user, buf_addr, &path.as_bytes()[..n])?;
    Ok(n)
}
