//! The process table and per-process record.

pub mod record;
pub mod table;

pub use record::ProcessRecord;
pub use table::{FIRST_USER_PID, ProcessTable};

use once_init::OnceInit;

/// The single global process table a real kernel embedding this crate
/// installs once at boot. Tests construct their own short-lived
/// `ProcessTable` values directly instead of going through this global,
/// since `OnceInit` cannot be reset between tests.
pub static PROCESS_TABLE: OnceInit<ProcessTable> = OnceInit::new();

pub fn process_table() -> &'static ProcessTable {
    PROCESS_TABLE.get()
}
