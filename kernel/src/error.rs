//! Errno-style error type shared by every syscall in this subsystem.

use strum::FromRepr;

/// An error returned by a syscall.
///
/// One variant per POSIX errno this subsystem raises, plus a handful
/// needed to pass through failures from the VFS/ELF/address-space
/// collaborators: a `#[repr(isize)]`, `FromRepr`, `thiserror::Error`
/// enum with one fieldless variant per errno.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, thiserror::Error)]
#[repr(isize)]
pub enum Error {
    /// ENOENT — no such file or directory.
    #[error("no such file or directory")]
    FsEntryNotFound = 2,
    /// ESRCH — no such process.
    #[error("no such process")]
    ProcessNotFound = 3,
    /// EIO — the underlying vnode reported an I/O error.
    #[error("input/output error")]
    IoError = 5,
    /// E2BIG — `execv`'s argument list exceeds `MAX_ARG` or overflows the
    /// user stack.
    #[error("argument list too long")]
    ArgumentListTooLong = 7,
    /// ENOEXEC — the ELF loader rejected the executable.
    #[error("exec format error")]
    InvalidExecutable = 8,
    /// EBADF — invalid fd, or fd open in the wrong mode for the call.
    #[error("bad file descriptor")]
    BadFileDescriptor = 9,
    /// ECHILD — pid is not a child of the caller.
    #[error("no child process")]
    NoChildProcess = 10,
    /// ENOMEM — allocation failure.
    #[error("cannot allocate memory")]
    OutOfMemory = 12,
    /// EFAULT — bad user pointer, misalignment, or kernel-space pointer.
    #[error("bad address")]
    BadAddress = 14,
    /// EEXIST — `O_CREAT | O_EXCL` target already exists.
    #[error("file exists")]
    AlreadyExists = 17,
    /// ENOTDIR — a path component is not a directory.
    #[error("not a directory")]
    NotADirectory = 20,
    /// EINVAL — bad `whence`, non-zero `options`, empty `progname`, ...
    #[error("invalid argument")]
    InvalidArgument = 22,
    /// EMFILE — the descriptor table is full.
    #[error("too many open files")]
    TooManyOpenFiles = 24,
    /// ENOSPC — the backing store is full.
    #[error("no space left on device")]
    StorageFull = 28,
    /// ESPIPE — the underlying vnode does not support seeking.
    #[error("illegal seek")]
    NotSeekable = 29,
    /// Anything else the VFS/ELF layer can report.
    #[error("unknown error")]
    Unknown = -1,
}

pub type Result<T> = core::result::Result<T, Error>;
