//! Process, file-descriptor, and synchronization subsystem of a teaching
//! kernel.
//!
//! Covers the blocking lock / condition variable / reader-writer lock
//! primitives, the per-process file-descriptor table and open-file
//! objects, and the process table with `fork`/`execv`/`waitpid`/`_exit`.
//! The virtual filesystem, address-space manager, ELF loader,
//! thread/scheduler layer, and user/kernel copy primitives are external
//! collaborators, modeled here as traits in [`external`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
pub mod log;

pub mod error;
pub mod external;
pub mod fd_table;
pub mod file;
pub mod param;
pub mod process;
pub mod sync;
pub mod syscall;

#[cfg(test)]
pub mod testkit;

pub use error::{Error, Result};
