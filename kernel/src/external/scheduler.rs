//! The thread/scheduler collaborator: wait-channel sleep and wakeup, the
//! primitive the blocking lock, condition variable, and reader/writer
//! lock in [`crate::sync`] are all built on top of.

/// Identity of a wait channel: the address of some stable piece of kernel
/// memory (the counter inside a condition variable, say) used as the
/// channel token. Callers pass `core::ptr::from_ref(self) as usize` or
/// similar.
pub type ChanId = usize;

/// Opaque identity of the calling thread, used only for equality (recursive
/// acquire detection) and as a wakeup target is never addressed by thread,
/// only by channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadId(pub u64);

/// Blocks and wakes threads on wait channels.
///
/// This is the lower-level spinlock-and-wait-channel interface exposed
/// by the scheduler; this subsystem only ever calls it, never
/// implements it.
pub trait Scheduler: Sync {
    /// Identity of the calling thread.
    fn current_thread(&self) -> ThreadId;

    /// Blocks the calling thread on `chan` until a matching `wake_one` or
    /// `wake_all`.
    ///
    /// `release_outer` is called exactly once, after this channel has
    /// recorded the caller as a waiter and before the caller actually
    /// blocks — this is the three-phase "lock wchan, release outer lock,
    /// sleep" pattern that makes a concurrent wakeup impossible to lose.
    /// Implementations must call it even if they choose not to block
    /// (e.g. a wakeup raced in first), so the outer lock is always
    /// released before `park` returns.
    fn park(&self, chan: ChanId, release_outer: &mut dyn FnMut());

    /// Wakes at most one thread parked on `chan`.
    fn wake_one(&self, chan: ChanId);

    /// Wakes every thread parked on `chan`.
    fn wake_all(&self, chan: ChanId);
}
