//! Fixed limits. No dynamic resizing.

/// Maximum number of open file descriptors per process.
pub const OPEN_MAX: usize = 64;

/// First descriptor index available to `open`/`dup2`/`fork` beyond the
/// reserved stdio slots 0, 1, 2.
pub const FIRST_USER_FD: usize = 3;

/// Maximum number of concurrently live processes. Slots 0 and 1 are
/// reserved; the first user process receives pid 2.
pub const MAX_RUNNING_PROCS: usize = 256;

/// Maximum bytes in a copied-in path.
pub const PATH_MAX: usize = 1024;

/// Maximum number of `argv` pointers `execv` will copy in.
pub const MAX_ARG: usize = 128;

/// Sentinel `parent_pid` meaning "no parent" — the first user process's
/// initial value, and the value installed by reparenting when a parent
/// exits.
pub const NO_PARENT: i32 = 0;
