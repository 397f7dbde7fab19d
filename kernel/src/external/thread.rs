//! The trapframe/usermode-transition collaborator.

use alloc::boxed::Box;

/// Opaque saved user-mode register state. `execv` rewrites the program
/// counter, stack pointer, and argument registers in place; everything
/// else about its layout is the scheduler's business.
pub trait TrapFrame: Send {
    fn set_pc(&mut self, pc: usize);
    fn set_sp(&mut self, sp: usize);
    /// Sets the register the ABI uses to pass `argc` into `main`.
    fn set_arg0(&mut self, value: usize);
    /// Sets the register the ABI uses to pass `argv` into `main`.
    fn set_arg1(&mut self, value: usize);

    /// Returns a deep copy, for `fork` to save as the child's saved
    /// register state until the scheduler first dispatches it.
    fn try_clone_boxed(&self) -> Box<dyn TrapFrame>;

    /// Rewrites this trapframe the way a forked child's first return
    /// from `fork` must read: the return-value register zeroed and the
    /// error-flag register cleared (`fork`'s child always sees success
    /// and a `0` return), and the saved program counter advanced past
    /// the `fork` trap instruction so the child resumes after the call
    /// rather than re-entering it.
    fn enter_forked_child(&mut self);
}

/// The kernel-side control block of a running thread, as seen by this
/// subsystem: enough to reach the current process's trapframe when
/// `execv` needs to redirect it, and nothing about scheduling itself.
pub trait Thread {
    fn trapframe_mut(&mut self) -> &mut dyn TrapFrame;
}
