//! The open-file object and the flags `open` accepts.

pub mod open_file;

pub use open_file::OpenFile;

use bitflags::bitflags;

bitflags! {
    /// Flags `open` accepts. The access-mode bits (`WRONLY`/`RDWR`) are
    /// not independent flags but a two-bit field the way POSIX's
    /// `O_ACCMODE` is — absence of both means read-only — so
    /// [`OpenFlags::access_mode`] is the only correct way to read them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const WRONLY = 0x001;
        const RDWR   = 0x002;
        const APPEND = 0x008;
        const CREATE = 0x200;
        const TRUNC  = 0x400;
        const EXCL   = 0x800;
    }
}

/// The access mode encoded in the low bits of [`OpenFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn readable(self) -> bool {
        !matches!(self, AccessMode::WriteOnly)
    }

    pub fn writable(self) -> bool {
        !matches!(self, AccessMode::ReadOnly)
    }
}

impl OpenFlags {
    pub fn access_mode(self) -> AccessMode {
        if self.contains(OpenFlags::RDWR) {
            AccessMode::ReadWrite
        } else if self.contains(OpenFlags::WRONLY) {
            AccessMode::WriteOnly
        } else {
            AccessMode::ReadOnly
        }
    }
}
