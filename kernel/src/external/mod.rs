//! External collaborators.
//!
//! The virtual filesystem, the address-space manager, the ELF loader, the
//! thread/scheduler layer, the trapframe/usermode transition, and the
//! user/kernel copy primitives are out of scope for this subsystem. Each
//! is modeled here as a trait so the syscall layer (`kernel::syscall`)
//! has something concrete to call; a real kernel embedding this crate
//! supplies the implementations, and `kernel::testkit` supplies
//! host-testable mocks of each.

pub mod addrspace;
pub mod elf;
pub mod scheduler;
pub mod spin_lock;
pub mod thread;
pub mod usercopy;
pub mod vfs;

pub use addrspace::AddrSpace;
pub use elf::ElfLoader;
pub use scheduler::{ChanId, Scheduler, ThreadId};
pub use spin_lock::{SpinLock, SpinLockGuard};
pub use thread::{Thread, TrapFrame};
pub use usercopy::{UserSpace, copyin, copyinstr, copyout};
pub use vfs::{FileStat, Vfs, Vnode};

use once_init::OnceInit;

/// The scheduler this subsystem's blocking primitives park on. Installed
/// once at boot by whatever embeds this crate (see `testkit::install` for
/// the test-only host scheduler).
pub static SCHEDULER: OnceInit<&'static dyn Scheduler> = OnceInit::new();

/// Returns the installed scheduler.
///
/// # Panics
///
/// Panics if no scheduler has been installed yet.
pub fn scheduler() -> &'static dyn Scheduler {
    *SCHEDULER.get()
}
